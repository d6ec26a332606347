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

//! Typed wrappers over the remote store's endpoints.

use flipit_core::session::Credential;
use flipit_core::types::card::Card;
use flipit_core::types::card::CardId;
use flipit_core::types::request::RequestDescriptor;
use flipit_core::types::request::RequestOutcome;
use flipit_core::types::set::CardSet;
use flipit_core::types::set::SetId;
use flipit_core::types::set::SetSummary;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::PercentEncode;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::RequestClient;
use crate::client::transport::Transport;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

#[derive(Serialize)]
struct AccountForm<'a> {
    username: &'a str,
    password: &'a str,
}

/// Servers answer a login with `token`, `user_id`, or both. `token` wins.
#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
    user_id: Option<String>,
}

/// Everything but the RFC 3986 unreserved characters gets escaped, so an ID
/// always stays a single path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn segment(id: &str) -> PercentEncode<'_> {
    utf8_percent_encode(id, SEGMENT)
}

fn set_path(set_id: &SetId) -> String {
    format!("/sets/{}", segment(set_id.as_str()))
}

fn card_path(set_id: &SetId, card_id: &CardId) -> String {
    format!("{}/cards/{}", set_path(set_id), segment(card_id.as_str()))
}

/// Fields of a new set.
#[derive(Clone, Debug, Serialize)]
pub struct SetDraft {
    pub title: String,
    pub description: String,
}

/// A partial set update. Absent fields are left alone by the server.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Both sides of a card, for creating or replacing one.
#[derive(Clone, Debug, Serialize)]
pub struct CardDraft {
    pub front: String,
    pub back: String,
}

pub struct Api<T> {
    client: RequestClient<T>,
}

impl<T: Transport> Api<T> {
    pub fn new(client: RequestClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RequestClient<T> {
        &self.client
    }

    async fn fetch<R: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Fallible<R> {
        match self.client.call(&descriptor).await {
            RequestOutcome::Success(payload) => serde_json::from_value(payload).map_err(|e| {
                ErrorReport::new(format!(
                    "unexpected response from {} {}: {e}",
                    descriptor.method(),
                    descriptor.endpoint()
                ))
            }),
            RequestOutcome::Failure(failure) => Err(failure.into()),
        }
    }

    async fn send(&self, descriptor: RequestDescriptor) -> Fallible<()> {
        self.client.call(&descriptor).await.into_result()?;
        Ok(())
    }

    pub async fn register(&self, username: &str, password: &str) -> Fallible<()> {
        let form = AccountForm { username, password };
        self.send(RequestDescriptor::post("/register", &form)?).await
    }

    /// Exchange a username and password for a credential.
    pub async fn login(&self, username: &str, password: &str) -> Fallible<Credential> {
        let form = AccountForm { username, password };
        let response: LoginResponse = self.fetch(RequestDescriptor::post("/login", &form)?).await?;
        match response.token.or(response.user_id) {
            Some(token) if !token.is_empty() => Ok(Credential::new(token)),
            _ => fail("login response carried no token."),
        }
    }

    pub async fn list_sets(&self) -> Fallible<Vec<SetSummary>> {
        self.fetch(RequestDescriptor::get("/sets")).await
    }

    pub async fn get_set(&self, set_id: &SetId) -> Fallible<CardSet> {
        self.fetch(RequestDescriptor::get(set_path(set_id))).await
    }

    pub async fn create_set(&self, draft: &SetDraft) -> Fallible<CardSet> {
        self.fetch(RequestDescriptor::post("/sets", draft)?).await
    }

    pub async fn update_set(&self, set_id: &SetId, patch: &SetPatch) -> Fallible<()> {
        self.send(RequestDescriptor::put(set_path(set_id), patch)?).await
    }

    pub async fn delete_set(&self, set_id: &SetId) -> Fallible<()> {
        self.send(RequestDescriptor::delete(set_path(set_id))).await
    }

    pub async fn add_card(&self, set_id: &SetId, draft: &CardDraft) -> Fallible<Card> {
        let endpoint = format!("{}/cards", set_path(set_id));
        self.fetch(RequestDescriptor::post(endpoint, draft)?).await
    }

    pub async fn update_card(
        &self,
        set_id: &SetId,
        card_id: &CardId,
        draft: &CardDraft,
    ) -> Fallible<()> {
        self.send(RequestDescriptor::put(card_path(set_id, card_id), draft)?).await
    }

    pub async fn delete_card(&self, set_id: &SetId, card_id: &CardId) -> Fallible<()> {
        self.send(RequestDescriptor::delete(card_path(set_id, card_id))).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use flipit_core::session::MemoryStorage;
    use flipit_core::types::request::Method;
    use serde_json::Value;
    use serde_json::json;

    use super::*;
    use crate::client::transport::HttpResponse;
    use crate::session::SharedSession;

    /// Answers every call with one canned response and remembers what was
    /// asked.
    struct Recorder {
        response: HttpResponse,
        seen: Mutex<Vec<(Method, String, Option<Value>)>>,
    }

    impl Transport for Recorder {
        async fn send(
            &self,
            descriptor: &RequestDescriptor,
            _credential: Option<&Credential>,
        ) -> Fallible<HttpResponse> {
            self.seen.lock().unwrap().push((
                descriptor.method(),
                descriptor.endpoint().to_string(),
                descriptor.body().cloned(),
            ));
            Ok(self.response.clone())
        }
    }

    fn api(status: u16, body: Value) -> Fallible<Api<Recorder>> {
        let session = SharedSession::open(MemoryStorage::new())?;
        let transport = Recorder {
            response: HttpResponse::new(status, body.to_string()),
            seen: Mutex::new(Vec::new()),
        };
        Ok(Api::new(RequestClient::new(transport, Arc::new(session))))
    }

    fn last_call(api: &Api<Recorder>) -> (Method, String, Option<Value>) {
        api.client.transport().seen.lock().unwrap().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_login_reads_user_id() -> Fallible<()> {
        let api = api(200, json!({"message": "Login successful", "user_id": "ab-cd"}))?;
        let credential = api.login("alice", "pw").await?;
        assert_eq!(credential, Credential::new("ab-cd"));
        assert_eq!(
            last_call(&api),
            (
                Method::Post,
                "/login".to_string(),
                Some(json!({"username": "alice", "password": "pw"}))
            )
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_login_reads_token() -> Fallible<()> {
        let api = api(200, json!({"token": "t-1"}))?;
        assert_eq!(api.login("alice", "pw").await?, Credential::new("t-1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_login_prefers_token_over_user_id() -> Fallible<()> {
        let api = api(200, json!({"user_id": "u-1", "token": "t-1"}))?;
        assert_eq!(api.login("alice", "pw").await?, Credential::new("t-1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_login_without_token() -> Fallible<()> {
        let api = api(200, json!({"message": "Login successful"}))?;
        let err = api.login("alice", "pw").await.unwrap_err();
        assert_eq!(err.message(), "login response carried no token.");
        Ok(())
    }

    #[tokio::test]
    async fn test_ids_stay_one_path_segment() -> Fallible<()> {
        let api = api(200, Value::Null)?;
        let set_id = SetId::new("a/b?c#d");
        api.delete_set(&set_id).await?;
        assert_eq!(last_call(&api).1, "/sets/a%2Fb%3Fc%23d");

        api.delete_card(&set_id, &CardId::new("x y")).await?;
        assert_eq!(last_call(&api).1, "/sets/a%2Fb%3Fc%23d/cards/x%20y");

        api.delete_set(&SetId::new("s-1.v2_~")).await?;
        assert_eq!(last_call(&api).1, "/sets/s-1.v2_~");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_set_path() -> Fallible<()> {
        let api = api(
            200,
            json!({"set_id": "s-1", "title": "Verbs", "cards": [{"card_id": "c-1", "front": "ser", "back": "to be"}]}),
        )?;
        let set = api.get_set(&SetId::new("s-1")).await?;
        assert_eq!(set.cards.len(), 1);
        assert_eq!(last_call(&api).1, "/sets/s-1");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_set_sends_only_given_fields() -> Fallible<()> {
        let api = api(200, json!({"set_id": "s-1", "title": "New"}))?;
        let patch = SetPatch {
            title: Some("New".to_string()),
            description: None,
        };
        api.update_set(&SetId::new("s-1"), &patch).await?;
        assert_eq!(
            last_call(&api),
            (
                Method::Put,
                "/sets/s-1".to_string(),
                Some(json!({"title": "New"}))
            )
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_card_endpoints() -> Fallible<()> {
        let api = api(200, json!({"card_id": "c-9", "front": "f", "back": "b"}))?;
        let set_id = SetId::new("s-1");
        let draft = CardDraft {
            front: "f".to_string(),
            back: "b".to_string(),
        };
        let card = api.add_card(&set_id, &draft).await?;
        assert_eq!(card.card_id, CardId::new("c-9"));
        assert_eq!(last_call(&api).1, "/sets/s-1/cards");

        api.update_card(&set_id, &card.card_id, &draft).await?;
        assert_eq!(last_call(&api).0, Method::Put);
        assert_eq!(last_call(&api).1, "/sets/s-1/cards/c-9");

        api.delete_card(&set_id, &card.card_id).await?;
        assert_eq!(
            last_call(&api),
            (Method::Delete, "/sets/s-1/cards/c-9".to_string(), None)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_becomes_error_report() -> Fallible<()> {
        let api = api(409, json!({"error": "Username already exists"}))?;
        let err = api.register("alice", "pw").await.unwrap_err();
        assert_eq!(err.message(), "Username already exists");
        assert_eq!(api.client.status().current().error.as_deref(), Some("Username already exists"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unexpected_shape() -> Fallible<()> {
        let api = api(200, json!({"nope": true}))?;
        let err = api.list_sets().await.unwrap_err();
        assert!(err.message().starts_with("unexpected response from GET /sets"));
        Ok(())
    }
}
