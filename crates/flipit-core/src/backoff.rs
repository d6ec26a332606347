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

//! Retry spacing for failed requests.

use std::time::Duration;

/// Total number of attempts a call gets, the first one included.
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry. Each later retry doubles it.
pub const BASE_DELAY: Duration = Duration::from_millis(1000);

/// What to do after attempt `n` failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then try again.
    Retry(Duration),
    /// That was the last attempt.
    GiveUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl BackoffPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Attempt numbers are 0-based: a call may be retried after attempt `n`
    /// iff `n < max_attempts - 1`.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts
    }

    /// `base_delay * 2^attempt`, saturating instead of overflowing.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if self.should_retry(attempt) {
            RetryDecision::Retry(self.delay(attempt))
        } else {
            RetryDecision::GiveUp
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS, BASE_DELAY)
    }
}
