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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use flipit_core::session::Credential;
use flipit_core::session::SessionStore;
use flipit_core::session::Storage;
use flipit_core::session::Theme;

use crate::client::CredentialSlot;
use crate::error::Fallible;

/// A session store shared between the request client, which reads and
/// clears the credential, and the commands, which log in and out.
pub struct SharedSession<S> {
    inner: Arc<Mutex<SessionStore<S>>>,
}

impl<S> Clone for SharedSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Storage> SharedSession<S> {
    pub fn open(storage: S) -> Fallible<Self> {
        let store = SessionStore::open(storage)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(store)),
        })
    }

    // Every critical section is a single store call, so a poisoned lock
    // still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, SessionStore<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn login(&self, credential: Credential) -> Fallible<()> {
        self.lock().login(credential)
    }

    pub fn logout(&self) -> Fallible<bool> {
        self.lock().logout()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    pub fn theme(&self) -> Theme {
        self.lock().theme()
    }

    pub fn set_theme(&self, theme: Theme) -> Fallible<()> {
        self.lock().set_theme(theme)
    }

    pub fn toggle_theme(&self) -> Fallible<Theme> {
        self.lock().toggle_theme()
    }
}

impl<S: Storage + Send> CredentialSlot for SharedSession<S> {
    fn current(&self) -> Option<Credential> {
        self.lock().credential().cloned()
    }

    fn clear(&self) {
        match self.lock().logout() {
            Ok(true) => log::info!("Server rejected the credential; logged out."),
            Ok(false) => {}
            Err(e) => log::warn!("Failed to remove the stored credential: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use flipit_core::session::CREDENTIAL_KEY;
    use flipit_core::session::MemoryStorage;

    use super::*;

    #[test]
    fn test_clear_is_seen_by_clones() -> Fallible<()> {
        let session = SharedSession::open(MemoryStorage::new())?;
        session.login(Credential::new("tok"))?;
        let other = session.clone();
        assert_eq!(other.current(), Some(Credential::new("tok")));

        other.clear();
        assert!(!session.is_authenticated());
        assert_eq!(session.current(), None);
        assert_eq!(session.lock().storage().get(CREDENTIAL_KEY)?, None);

        // Clearing twice is harmless.
        other.clear();
        assert!(!session.is_authenticated());
        Ok(())
    }

    #[test]
    fn test_theme_round_trip() -> Fallible<()> {
        let session = SharedSession::open(MemoryStorage::new())?;
        session.set_theme(Theme::Dark)?;
        assert_eq!(session.theme(), Theme::Dark);
        assert_eq!(session.toggle_theme()?, Theme::Light);
        Ok(())
    }
}
