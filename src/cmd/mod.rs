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

pub mod account;
pub mod quiz;
pub mod sets;
pub mod theme;

use std::sync::Arc;

use tokio::spawn;
use tokio::sync::watch::Receiver;

use crate::api::Api;
use crate::client::RequestClient;
use crate::client::status::RequestStatus;
use crate::client::transport::ReqwestTransport;
use crate::config::Config;
use crate::error::Fallible;
use crate::error::fail;
use crate::session::SharedSession;
use crate::storage::FileStorage;

/// What every command gets: the saved session and a client wired to it.
pub struct Context {
    pub session: SharedSession<FileStorage>,
    pub api: Api<ReqwestTransport>,
}

impl Context {
    pub fn new(config: &Config) -> Fallible<Self> {
        let session = SharedSession::open(FileStorage::new(config.state_file()))?;
        let transport = ReqwestTransport::new(&config.api_url)?;
        let client = RequestClient::new(transport, Arc::new(session.clone()));
        Ok(Self {
            session,
            api: Api::new(client),
        })
    }

    pub fn require_login(&self) -> Fallible<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            fail("not logged in. Run `flipit login <username>` first.")
        }
    }
}

/// Mirror the request status into the log.
pub fn spawn_status_reporter(mut rx: Receiver<RequestStatus>) {
    spawn(async move {
        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().clone();
            if status.in_flight {
                log::debug!("Request in flight");
            } else if let Some(error) = status.error {
                log::debug!("Request finished with error: {error}");
            } else {
                log::debug!("Request finished");
            }
        }
    });
}
