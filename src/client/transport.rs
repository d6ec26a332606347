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

use std::future::Future;
use std::time::Duration;

use flipit_core::session::Credential;
use flipit_core::types::request::Method;
use flipit_core::types::request::RequestDescriptor;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// Per-attempt timeout. A timeout counts as a network failure and is retried.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// A raw response: status code and unparsed body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one attempt of a call. An `Err` means no HTTP response arrived.
pub trait Transport {
    fn send(
        &self,
        descriptor: &RequestDescriptor,
        credential: Option<&Credential>,
    ) -> impl Future<Output = Fallible<HttpResponse>> + Send;
}

pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str) -> Fallible<Self> {
        let http = reqwest::Client::builder()
            .timeout(ATTEMPT_TIMEOUT)
            .build()
            .map_err(|e| ErrorReport::new(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for ReqwestTransport {
    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        credential: Option<&Credential>,
    ) -> Fallible<HttpResponse> {
        let url = format!("{}{}", self.base_url, descriptor.endpoint());
        let mut request = self
            .http
            .request(to_reqwest(descriptor.method()), url)
            .header(ACCEPT, "application/json");
        if let Some(credential) = credential {
            request = request.bearer_auth(credential.expose());
        }
        if let Some(body) = descriptor.body() {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ErrorReport::new(format!("network error: {e}")))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ErrorReport::new(format!("network error: {e}")))?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
