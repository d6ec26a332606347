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

//! The request client: the one path every command takes to the server.
//!
//! A call attaches the current credential, retries transient failures with
//! exponential backoff, and classifies whatever finally comes back. An
//! authentication failure clears the credential and is never retried.

pub mod status;
#[cfg(test)]
mod stub;
pub mod transport;

use std::sync::Arc;

use flipit_core::backoff::BackoffPolicy;
use flipit_core::backoff::RetryDecision;
use flipit_core::session::Credential;
use flipit_core::types::request::Failure;
use flipit_core::types::request::FailureKind;
use flipit_core::types::request::RequestDescriptor;
use flipit_core::types::request::RequestOutcome;
use serde_json::Value;
use tokio::time::sleep;

use crate::client::status::StatusSignal;
use crate::client::transport::HttpResponse;
use crate::client::transport::Transport;

/// Error text the server uses when a call arrives without a valid
/// credential. Status 401 is authoritative; this is the fallback for servers
/// that answer such calls with another status.
pub const AUTH_FAILURE_MARKER: &str = "Authentication required";

const GENERIC_FAILURE: &str = "API call failed";

/// Where the client reads the credential from, and what it clears when the
/// server stops accepting it.
pub trait CredentialSlot: Send + Sync {
    fn current(&self) -> Option<Credential>;
    fn clear(&self);
}

/// How one response should be handled.
#[derive(Debug, PartialEq)]
enum Classified {
    Success(Value),
    Retry(String),
    Terminal(Failure),
}

pub struct RequestClient<T> {
    transport: T,
    credentials: Arc<dyn CredentialSlot>,
    policy: BackoffPolicy,
    status: StatusSignal,
}

impl<T: Transport> RequestClient<T> {
    pub fn new(transport: T, credentials: Arc<dyn CredentialSlot>) -> Self {
        Self {
            transport,
            credentials,
            policy: BackoffPolicy::default(),
            status: StatusSignal::new(),
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn status(&self) -> &StatusSignal {
        &self.status
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn call(&self, descriptor: &RequestDescriptor) -> RequestOutcome {
        let _in_flight = self.status.begin();
        let mut attempt: u32 = 0;
        loop {
            // Read per attempt so a logout during a backoff is honoured.
            let credential = self.credentials.current();
            log::debug!(
                "{} {} (attempt {}/{})",
                descriptor.method(),
                descriptor.endpoint(),
                attempt + 1,
                self.policy.max_attempts()
            );
            let message = match self.transport.send(descriptor, credential.as_ref()).await {
                Ok(response) => match classify(response) {
                    Classified::Success(payload) => return RequestOutcome::Success(payload),
                    Classified::Terminal(failure) => return self.conclude(failure),
                    Classified::Retry(message) => message,
                },
                Err(e) => e.message().to_string(),
            };
            match self.policy.decide(attempt) {
                RetryDecision::Retry(delay) => {
                    log::warn!(
                        "{} {} failed: {message}; retrying in {delay:?}",
                        descriptor.method(),
                        descriptor.endpoint()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp => {
                    return self.conclude(Failure::new(FailureKind::Transient, message));
                }
            }
        }
    }

    fn conclude(&self, failure: Failure) -> RequestOutcome {
        if failure.is_auth_failure() {
            self.credentials.clear();
        }
        log::error!("API error: {}", failure.message());
        self.status.surface(failure.message());
        RequestOutcome::Failure(failure)
    }
}

fn classify(response: HttpResponse) -> Classified {
    let payload: Result<Value, serde_json::Error> =
        if response.body.iter().all(|b| b.is_ascii_whitespace()) {
            Ok(Value::Null)
        } else {
            serde_json::from_slice(&response.body)
        };

    if response.status == 401 {
        let message = payload
            .as_ref()
            .ok()
            .and_then(error_message)
            .unwrap_or(AUTH_FAILURE_MARKER);
        return Classified::Terminal(Failure::new(FailureKind::Authentication, message));
    }

    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => {
            return Classified::Terminal(Failure::new(
                FailureKind::Malformed,
                format!("malformed response (status {}): {e}", response.status),
            ));
        }
    };

    if response.is_success() {
        return Classified::Success(payload);
    }

    let message = error_message(&payload).unwrap_or(GENERIC_FAILURE);
    if message.contains(AUTH_FAILURE_MARKER) {
        Classified::Terminal(Failure::new(FailureKind::Authentication, message))
    } else if is_rejection(response.status) {
        Classified::Terminal(Failure::new(FailureKind::Rejected, message))
    } else {
        Classified::Retry(message.to_string())
    }
}

fn error_message(payload: &Value) -> Option<&str> {
    payload
        .get("error")
        .or_else(|| payload.get("message"))
        .and_then(Value::as_str)
}

/// Client errors the server will answer the same way every time. Timeouts
/// and rate limiting are worth another attempt.
fn is_rejection(status: u16) -> bool {
    (400..500).contains(&status) && !matches!(status, 408 | 429)
}
