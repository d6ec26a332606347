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

//! flipit-core: Core library for the flipit flashcard client.
//!
//! This library is free of any transport or platform code, so it builds for
//! both the command-line client and the browser. It provides:
//! - The card and set data model
//! - The retry backoff policy used by the request client
//! - The quiz session state machine
//! - The session store holding the credential and theme

pub mod backoff;
pub mod error;
pub mod quiz;
pub mod session;
pub mod types;

// Re-exports for convenience
pub use backoff::{BackoffPolicy, RetryDecision};
pub use error::{ErrorReport, Fallible, fail};
pub use quiz::{Quiz, Status, Summary, Tally, Verdict};
pub use session::{Credential, MemoryStorage, SessionStore, Storage, Theme};
pub use types::card::{Card, CardId};
pub use types::request::{Failure, FailureKind, Method, RequestDescriptor, RequestOutcome};
pub use types::set::{CardSet, SetId, SetSummary};
