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

//! WASM bindings for flipit - runs quizzes and keeps the session in the
//! browser. The page does its own HTTP and hands the fetched cards over as
//! JSON.

use std::mem::take;

use wasm_bindgen::prelude::*;
use web_sys::console;

use flipit_core::error::ErrorReport;
use flipit_core::quiz::Quiz;
use flipit_core::quiz::SETTLE_DELAY;
use flipit_core::quiz::Status;
use flipit_core::session::Credential;
use flipit_core::session::SessionStore;
use flipit_core::types::card::Card;

mod storage;

use storage::LocalStorage;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console::log_1(&"flipit WASM initialized".into());
}

fn to_js(e: ErrorReport) -> JsValue {
    JsValue::from_str(e.message())
}

fn parse_cards(cards_json: &str) -> Result<Vec<Card>, ErrorReport> {
    serde_json::from_str(cards_json)
        .map_err(|e| ErrorReport::new(format!("Failed to parse cards JSON: {e}")))
}

fn status_name(status: Status) -> &'static str {
    match status {
        Status::Empty => "empty",
        Status::Active => "active",
        Status::Finished => "finished",
    }
}

/// The quiz and the saved session, driven from JavaScript.
#[wasm_bindgen]
pub struct FlipitApp {
    quiz: Quiz,
    session: SessionStore<LocalStorage>,
}

#[wasm_bindgen]
impl FlipitApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<FlipitApp, JsValue> {
        let session = SessionStore::open(LocalStorage::new()).map_err(to_js)?;
        Ok(Self {
            quiz: Quiz::Empty,
            session,
        })
    }

    /// Start a quiz over a JSON array of cards. Returns the deck size.
    #[wasm_bindgen]
    pub fn start_quiz(&mut self, cards_json: &str) -> Result<usize, JsValue> {
        let cards = parse_cards(cards_json).map_err(to_js)?;
        self.quiz = Quiz::new(cards);
        Ok(self.quiz.deck_len())
    }

    #[wasm_bindgen]
    pub fn flip(&mut self) {
        self.quiz = take(&mut self.quiz).flip();
    }

    /// Mark the revealed card. The page should call `advance` after
    /// `settle_delay_ms`.
    #[wasm_bindgen]
    pub fn answer(&mut self, correct: bool) {
        self.quiz = take(&mut self.quiz).answer(correct);
    }

    #[wasm_bindgen]
    pub fn advance(&mut self) {
        self.quiz = take(&mut self.quiz).advance();
    }

    #[wasm_bindgen]
    pub fn redo_incorrect(&mut self) {
        self.quiz = take(&mut self.quiz).redo_incorrect();
    }

    /// One of `empty`, `active` or `finished`.
    #[wasm_bindgen]
    pub fn status(&self) -> String {
        status_name(self.quiz.status()).to_string()
    }

    #[wasm_bindgen]
    pub fn is_revealed(&self) -> bool {
        self.quiz.is_revealed()
    }

    /// Whether an answered card is waiting for `advance`.
    #[wasm_bindgen]
    pub fn is_settling(&self) -> bool {
        self.quiz.pending_verdict().is_some()
    }

    #[wasm_bindgen]
    pub fn current_front(&self) -> Option<String> {
        self.quiz.current_card().map(|card| card.front.clone())
    }

    #[wasm_bindgen]
    pub fn current_back(&self) -> Option<String> {
        self.quiz.current_card().map(|card| card.back.clone())
    }

    #[wasm_bindgen]
    pub fn position(&self) -> usize {
        self.quiz.position()
    }

    #[wasm_bindgen]
    pub fn deck_len(&self) -> usize {
        self.quiz.deck_len()
    }

    #[wasm_bindgen]
    pub fn correct_count(&self) -> usize {
        self.quiz.tally().correct
    }

    #[wasm_bindgen]
    pub fn incorrect_count(&self) -> usize {
        self.quiz.tally().incorrect
    }

    #[wasm_bindgen]
    pub fn accuracy_percent(&self) -> u32 {
        self.quiz.tally().percent()
    }

    #[wasm_bindgen]
    pub fn can_redo(&self) -> bool {
        self.quiz.can_redo()
    }

    #[wasm_bindgen]
    pub fn settle_delay_ms(&self) -> u32 {
        SETTLE_DELAY.as_millis() as u32
    }

    /// The saved bearer token, for the page's `Authorization` header.
    #[wasm_bindgen]
    pub fn token(&self) -> Option<String> {
        self.session.credential().map(|c| c.expose().to_string())
    }

    #[wasm_bindgen]
    pub fn login(&mut self, token: &str) -> Result<(), JsValue> {
        self.session.login(Credential::new(token)).map_err(to_js)
    }

    /// Forget the token. Call this when a request fails authentication.
    #[wasm_bindgen]
    pub fn logout(&mut self) -> Result<bool, JsValue> {
        self.session.logout().map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn theme(&self) -> String {
        self.session.theme().as_str().to_string()
    }

    #[wasm_bindgen]
    pub fn toggle_theme(&mut self) -> Result<String, JsValue> {
        let theme = self.session.toggle_theme().map_err(to_js)?;
        Ok(theme.as_str().to_string())
    }
}
