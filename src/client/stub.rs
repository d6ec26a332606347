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

//! A tiny stand-in for the remote store, for end-to-end client tests.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::routing::get;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;

use crate::error::ErrorReport;
use crate::error::Fallible;

const STUB_TOKEN: &str = "Bearer stub-token";

pub async fn start_stub(port: u16, flaky_hits: Arc<AtomicUsize>) -> Fallible<()> {
    let app = Router::new()
        .route("/sets", get(sets_handler))
        .route("/flaky", get(flaky_handler))
        .route("/expired", get(expired_handler))
        .route("/echo", post(echo_handler))
        .with_state(flaky_hits);
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ErrorReport::new(format!("stub server failed: {e}")))
}

async fn sets_handler(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(STUB_TOKEN);
    if authorized {
        let sets = json!([{"set_id": "s-1", "title": "Verbs", "description": "", "card_count": 2}]);
        (StatusCode::OK, Json(sets))
    } else {
        (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Authentication required"})),
        )
    }
}

async fn flaky_handler(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, Json<Value>) {
    let hit = hits.fetch_add(1, Ordering::SeqCst) + 1;
    if hit < 3 {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "temporarily unavailable"})),
        )
    } else {
        (StatusCode::OK, Json(json!({"ok": true})))
    }
}

async fn expired_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Session expired"})),
    )
}

async fn echo_handler(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}
