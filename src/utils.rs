// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::Write;

use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::Lines;

use crate::error::Fallible;

/// Print a prompt and read one trimmed line. `None` means end of input.
pub async fn prompt<R, W>(input: &mut Lines<R>, out: &mut W, label: &str) -> Fallible<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{label}")?;
    out.flush()?;
    let line = input.next_line().await?;
    Ok(line.map(|l| l.trim().to_string()))
}

#[cfg(test)]
pub async fn wait_for_server(host: &str, port: u16) -> Fallible<()> {
    use std::time::Duration;

    use tokio::net::TcpStream;
    use tokio::time::sleep;

    loop {
        if let Ok(stream) = TcpStream::connect(format!("{host}:{port}")).await {
            drop(stream);
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio::io::BufReader;

    use super::*;

    #[tokio::test]
    async fn test_prompt_reads_lines() -> Fallible<()> {
        let mut input = BufReader::new(&b"  alice \nsecond\n"[..]).lines();
        let mut out = Vec::new();
        let first = prompt(&mut input, &mut out, "Username: ").await?;
        assert_eq!(first.as_deref(), Some("alice"));
        let second = prompt(&mut input, &mut out, "> ").await?;
        assert_eq!(second.as_deref(), Some("second"));
        let end = prompt(&mut input, &mut out, "> ").await?;
        assert_eq!(end, None);
        assert_eq!(String::from_utf8_lossy(&out), "Username: > > ");
        Ok(())
    }
}
