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

use std::io::stdout;

use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::io::stdin;

use crate::cmd::Context;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::utils::prompt;

async fn password_or_prompt(password: Option<String>) -> Fallible<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let mut input = BufReader::new(stdin()).lines();
    prompt(&mut input, &mut stdout(), "Password: ")
        .await?
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ErrorReport::new("a password is required."))
}

pub async fn register(ctx: &Context, username: String, password: Option<String>) -> Fallible<()> {
    let password = password_or_prompt(password).await?;
    ctx.api.register(&username, &password).await?;
    println!("Registered {username}. Run `flipit login {username}` to sign in.");
    Ok(())
}

pub async fn login(ctx: &Context, username: String, password: Option<String>) -> Fallible<()> {
    let password = password_or_prompt(password).await?;
    let credential = ctx.api.login(&username, &password).await?;
    ctx.session.login(credential)?;
    log::info!("Stored credential for {username}");
    println!("Logged in as {username}.");
    Ok(())
}

pub fn logout(ctx: &Context) -> Fallible<()> {
    if ctx.session.logout()? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub fn status(ctx: &Context) {
    if ctx.session.is_authenticated() {
        println!("Logged in.");
    } else {
        println!("Not logged in.");
    }
    println!("Theme: {}", ctx.session.theme());
}
