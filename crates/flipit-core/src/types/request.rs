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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;
use serde_json::Value;

use crate::error::Fallible;

/// The HTTP methods the remote store understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An endpoint/method/body triple. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    endpoint: String,
    method: Method,
    body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Delete, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, body: &impl Serialize) -> Fallible<Self> {
        Self::new(Method::Post, endpoint).with_body(body)
    }

    pub fn put(endpoint: impl Into<String>, body: &impl Serialize) -> Fallible<Self> {
        Self::new(Method::Put, endpoint).with_body(body)
    }

    fn with_body(mut self, body: &impl Serialize) -> Fallible<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Path relative to the API base, starting with `/`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// How a failed call was classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Network or server trouble that survived every retry.
    Transient,
    /// The server no longer accepts the credential.
    Authentication,
    /// The response body was not JSON.
    Malformed,
    /// A client error the server will keep refusing, so it is not retried.
    Rejected,
}

/// A classified, terminal failure. Only the message travels past the request
/// client; the kind exists so the one caller that cares can tell an ended
/// session apart from everything else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    message: String,
    kind: FailureKind,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn is_auth_failure(&self) -> bool {
        self.kind == FailureKind::Authentication
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RequestOutcome {
    Success(Value),
    Failure(Failure),
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }

    pub fn into_result(self) -> Result<Value, Failure> {
        match self {
            RequestOutcome::Success(payload) => Ok(payload),
            RequestOutcome::Failure(failure) => Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_descriptor_without_body() {
        let descriptor = RequestDescriptor::get("/sets");
        assert_eq!(descriptor.method(), Method::Get);
        assert_eq!(descriptor.endpoint(), "/sets");
        assert!(descriptor.body().is_none());
    }

    #[test]
    fn test_descriptor_serializes_body() -> Fallible<()> {
        #[derive(Serialize)]
        struct Draft<'a> {
            title: &'a str,
        }
        let descriptor = RequestDescriptor::post("/sets", &Draft { title: "Verbs" })?;
        assert_eq!(descriptor.method().to_string(), "POST");
        assert_eq!(descriptor.body(), Some(&json!({"title": "Verbs"})));
        Ok(())
    }

    #[test]
    fn test_outcome_into_result() {
        let ok = RequestOutcome::Success(json!({"x": 1}));
        assert!(ok.is_success());
        assert_eq!(ok.into_result(), Ok(json!({"x": 1})));

        let failure = Failure::new(FailureKind::Authentication, "Authentication required");
        assert!(failure.is_auth_failure());
        let err = RequestOutcome::Failure(failure.clone()).into_result();
        assert_eq!(err, Err(failure));
    }
}
