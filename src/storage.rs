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

//! File-backed key/value storage for the session store.

use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use flipit_core::session::Storage;

use crate::error::Fallible;

/// A flat JSON object on disk. Every write rewrites the whole file, which is
/// fine for the two keys it holds.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Fallible<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Fallible<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        let mut file = open_private(&self.path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Open for writing, truncated. The file holds the bearer token, so on Unix
/// only the owner may read it.
#[cfg(unix)]
fn open_private(path: &Path) -> Fallible<File> {
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::fs::PermissionsExt;

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files written by older builds.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> Fallible<File> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    Ok(file)
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Fallible<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Fallible<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use flipit_core::session::CREDENTIAL_KEY;
    use flipit_core::session::THEME_KEY;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_reads_empty() -> Fallible<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path().join("state.json"));
        assert_eq!(storage.get(CREDENTIAL_KEY)?, None);
        Ok(())
    }

    #[test]
    fn test_values_survive_reopen() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("state.json");
        let storage = FileStorage::new(path.clone());
        storage.set(CREDENTIAL_KEY, "tok")?;
        storage.set(THEME_KEY, "dark")?;

        let reopened = FileStorage::new(path.clone());
        assert_eq!(reopened.get(CREDENTIAL_KEY)?, Some("tok".to_string()));
        assert_eq!(reopened.get(THEME_KEY)?, Some("dark".to_string()));

        reopened.remove(CREDENTIAL_KEY)?;
        let content = fs::read_to_string(path)?;
        assert!(!content.contains(CREDENTIAL_KEY));
        assert!(content.contains(THEME_KEY));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_state_file_is_owner_only() -> Fallible<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let path = dir.path().join("state.json");
        fs::write(&path, "{}")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644))?;

        let storage = FileStorage::new(path.clone());
        storage.set(CREDENTIAL_KEY, "tok")?;
        let mode = fs::metadata(&path)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let fresh = dir.path().join("fresh.json");
        FileStorage::new(fresh.clone()).set(CREDENTIAL_KEY, "tok")?;
        let mode = fs::metadata(&fresh)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_an_error() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("state.json");
        fs::write(&path, "not json")?;
        let storage = FileStorage::new(path);
        assert!(storage.get(THEME_KEY).is_err());
        Ok(())
    }
}
