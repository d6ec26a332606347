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

//! Client-side session state: the bearer credential and the theme
//! preference. Both are read once when the store is opened and written
//! through to a [`Storage`] backend whenever they change.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Mutex;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// Storage key of the credential.
pub const CREDENTIAL_KEY: &str = "flipit_token";

/// Storage key of the theme preference.
pub const THEME_KEY: &str = "flipit_theme";

/// A string key/value store that survives restarts.
pub trait Storage {
    fn get(&self, key: &str) -> Fallible<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Fallible<()>;
    fn remove(&self, key: &str) -> Fallible<()>;
}

/// In-memory [`Storage`], for tests and for embedding without persistence.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Fallible<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ErrorReport::new("memory storage lock poisoned"))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Fallible<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Fallible<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// An opaque bearer token. Never parsed, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(..)")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Unknown values fall back to the light theme.
    pub fn parse(value: &str) -> Self {
        match value {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct SessionStore<S> {
    storage: S,
    credential: Option<Credential>,
    theme: Theme,
}

impl<S: Storage> SessionStore<S> {
    /// Load the persisted credential and theme.
    pub fn open(storage: S) -> Fallible<Self> {
        let credential = storage
            .get(CREDENTIAL_KEY)?
            .filter(|token| !token.is_empty())
            .map(Credential::new);
        let theme = storage
            .get(THEME_KEY)?
            .map(|value| Theme::parse(&value))
            .unwrap_or_default();
        Ok(Self {
            storage,
            credential,
            theme,
        })
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn login(&mut self, credential: Credential) -> Fallible<()> {
        self.storage.set(CREDENTIAL_KEY, credential.expose())?;
        self.credential = Some(credential);
        Ok(())
    }

    /// Forget the credential. Returns whether there was one to forget.
    pub fn logout(&mut self) -> Fallible<bool> {
        if self.credential.is_none() {
            return Ok(false);
        }
        self.storage.remove(CREDENTIAL_KEY)?;
        self.credential = None;
        Ok(true)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Fallible<()> {
        self.storage.set(THEME_KEY, theme.as_str())?;
        self.theme = theme;
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Fallible<Theme> {
        let theme = self.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
