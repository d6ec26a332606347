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

//! The in-flight/error signal the request client publishes.
//!
//! Presentation code subscribes to it and renders a loading indicator or the
//! last error. Concurrent calls share the one signal, so the last writer
//! wins.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestStatus {
    pub in_flight: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct StatusSignal {
    tx: Arc<watch::Sender<RequestStatus>>,
}

impl StatusSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(RequestStatus::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestStatus> {
        self.tx.subscribe()
    }

    #[cfg(test)]
    pub fn current(&self) -> RequestStatus {
        self.tx.borrow().clone()
    }

    /// Mark a call as started and clear the previous error. The flag drops
    /// back to false when the returned guard goes out of scope.
    pub(crate) fn begin(&self) -> InFlight<'_> {
        self.tx.send_modify(|status| {
            status.in_flight = true;
            status.error = None;
        });
        InFlight { signal: self }
    }

    pub(crate) fn surface(&self, message: &str) {
        self.tx.send_modify(|status| {
            status.error = Some(message.to_string());
        });
    }
}

impl Default for StatusSignal {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct InFlight<'a> {
    signal: &'a StatusSignal,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.signal.tx.send_modify(|status| {
            status.in_flight = false;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_clears_flag() {
        let signal = StatusSignal::new();
        signal.surface("old error");
        {
            let _guard = signal.begin();
            assert_eq!(
                signal.current(),
                RequestStatus {
                    in_flight: true,
                    error: None
                }
            );
            signal.surface("new error");
        }
        assert_eq!(
            signal.current(),
            RequestStatus {
                in_flight: false,
                error: Some("new error".to_string())
            }
        );
    }

    #[test]
    fn test_subscribers_see_changes() {
        let signal = StatusSignal::new();
        let mut rx = signal.subscribe();
        assert!(!rx.borrow_and_update().in_flight);
        let guard = signal.begin();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().in_flight);
        drop(guard);
        assert!(!rx.borrow_and_update().in_flight);
    }
}
