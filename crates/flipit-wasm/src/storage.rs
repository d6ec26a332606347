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

//! Browser localStorage as a session [`Storage`] backend.

use flipit_core::error::ErrorReport;
use flipit_core::error::Fallible;
use flipit_core::session::Storage;
use wasm_bindgen::JsValue;
use web_sys::Storage as WebStorage;

/// Falls back to doing nothing when the page has no localStorage, e.g. in a
/// sandboxed frame.
pub struct LocalStorage {
    inner: Option<WebStorage>,
}

impl LocalStorage {
    pub fn new() -> Self {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        Self { inner }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn storage_error(e: JsValue) -> ErrorReport {
    ErrorReport::new(format!("localStorage error: {e:?}"))
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        match &self.inner {
            Some(storage) => storage.get_item(key).map_err(storage_error),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Fallible<()> {
        match &self.inner {
            Some(storage) => storage.set_item(key, value).map_err(storage_error),
            None => Ok(()),
        }
    }

    fn remove(&self, key: &str) -> Fallible<()> {
        match &self.inner {
            Some(storage) => storage.remove_item(key).map_err(storage_error),
            None => Ok(()),
        }
    }
}
