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

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";

const API_URL_VAR: &str = "FLIPIT_API_URL";
const HOME_VAR: &str = "FLIPIT_HOME";
const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.json";

/// The optional `config.toml` in the state directory.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL every endpoint path is appended to.
    pub api_url: String,
    /// Where `config.toml` and `state.json` live.
    pub state_dir: PathBuf,
}

/// The environment variables configuration reads, captured once.
#[derive(Debug, Default)]
struct Environment {
    api_url: Option<String>,
    flipit_home: Option<String>,
    home: Option<String>,
}

impl Environment {
    fn capture() -> Self {
        Self {
            api_url: env::var(API_URL_VAR).ok(),
            flipit_home: env::var(HOME_VAR).ok(),
            home: env::var("HOME").ok(),
        }
    }
}

impl Config {
    /// Resolve the configuration. Flags win over the environment, which wins
    /// over `config.toml`.
    pub fn resolve(api_url: Option<String>, state_dir: Option<String>) -> Fallible<Self> {
        Self::resolve_in(Environment::capture(), api_url, state_dir)
    }

    fn resolve_in(
        env: Environment,
        api_url: Option<String>,
        state_dir: Option<String>,
    ) -> Fallible<Self> {
        let state_dir = match state_dir.or(env.flipit_home) {
            Some(dir) => PathBuf::from(dir),
            None => default_state_dir(env.home)?,
        };
        let file = read_config_file(&state_dir.join(CONFIG_FILE))?;
        let api_url = api_url
            .or(env.api_url)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return fail(format!("API URL must be http or https: '{api_url}'."));
        }
        log::debug!("API base URL: {api_url}");
        log::debug!("State directory: {}", state_dir.display());
        Ok(Self { api_url, state_dir })
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE)
    }
}

fn default_state_dir(home: Option<String>) -> Fallible<PathBuf> {
    match home {
        Some(home) => Ok(PathBuf::from(home).join(".flipit")),
        None => fail("cannot locate the state directory: set FLIPIT_HOME or pass --state-dir."),
    }
}

fn read_config_file(path: &Path) -> Fallible<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        ErrorReport::new(format!("invalid config file {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn dir_string(dir: &tempfile::TempDir) -> Option<String> {
        Some(dir.path().display().to_string())
    }

    #[test]
    fn test_flag_wins_over_file() -> Fallible<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(CONFIG_FILE), "api_url = \"http://file.test/api\"\n")?;
        let config = Config::resolve(Some("http://flag.test/api".to_string()), dir_string(&dir))?;
        assert_eq!(config.api_url, "http://flag.test/api");
        Ok(())
    }

    fn write_config(dir: &tempfile::TempDir) -> Fallible<()> {
        fs::write(dir.path().join(CONFIG_FILE), "api_url = \"http://file.test/api\"\n")?;
        Ok(())
    }

    #[test]
    fn test_env_wins_over_file() -> Fallible<()> {
        let dir = tempdir()?;
        write_config(&dir)?;
        let env = Environment {
            api_url: Some("http://env.test/api".to_string()),
            ..Environment::default()
        };
        let config = Config::resolve_in(env, None, dir_string(&dir))?;
        assert_eq!(config.api_url, "http://env.test/api");
        Ok(())
    }

    #[test]
    fn test_flag_wins_over_env() -> Fallible<()> {
        let dir = tempdir()?;
        let env = Environment {
            api_url: Some("http://env.test/api".to_string()),
            ..Environment::default()
        };
        let flag = Some("http://flag.test/api".to_string());
        let config = Config::resolve_in(env, flag, dir_string(&dir))?;
        assert_eq!(config.api_url, "http://flag.test/api");
        Ok(())
    }

    #[test]
    fn test_file_wins_over_default() -> Fallible<()> {
        let dir = tempdir()?;
        write_config(&dir)?;
        let config = Config::resolve_in(Environment::default(), None, dir_string(&dir))?;
        assert_eq!(config.api_url, "http://file.test/api");
        Ok(())
    }

    #[test]
    fn test_default_api_url() -> Fallible<()> {
        let dir = tempdir()?;
        let config = Config::resolve_in(Environment::default(), None, dir_string(&dir))?;
        assert_eq!(config.api_url, DEFAULT_API_URL);
        Ok(())
    }

    #[test]
    fn test_flipit_home_picks_state_dir() -> Fallible<()> {
        let dir = tempdir()?;
        write_config(&dir)?;
        let env = Environment {
            flipit_home: dir_string(&dir),
            home: Some("/nonexistent-home".to_string()),
            ..Environment::default()
        };
        let config = Config::resolve_in(env, None, None)?;
        assert_eq!(config.state_dir, dir.path());
        assert_eq!(config.api_url, "http://file.test/api");
        Ok(())
    }

    #[test]
    fn test_state_dir_flag_wins_over_flipit_home() -> Fallible<()> {
        let flag_dir = tempdir()?;
        let env_dir = tempdir()?;
        let env = Environment {
            flipit_home: dir_string(&env_dir),
            ..Environment::default()
        };
        let config = Config::resolve_in(env, None, dir_string(&flag_dir))?;
        assert_eq!(config.state_dir, flag_dir.path());
        Ok(())
    }

    #[test]
    fn test_home_fallback() -> Fallible<()> {
        let home = tempdir()?;
        let env = Environment {
            home: dir_string(&home),
            ..Environment::default()
        };
        let config = Config::resolve_in(env, None, None)?;
        assert_eq!(config.state_dir, home.path().join(".flipit"));
        Ok(())
    }

    #[test]
    fn test_no_state_dir_at_all() {
        let result = Config::resolve_in(Environment::default(), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_state_file_location() -> Fallible<()> {
        let dir = tempdir()?;
        let config = Config::resolve(Some(DEFAULT_API_URL.to_string()), dir_string(&dir))?;
        assert_eq!(config.state_dir, dir.path());
        assert_eq!(config.state_file(), dir.path().join("state.json"));
        Ok(())
    }

    #[test]
    fn test_invalid_config_file() -> Fallible<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(CONFIG_FILE), "api_url = [")?;
        let result = Config::resolve_in(Environment::default(), None, dir_string(&dir));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_unknown_config_key() -> Fallible<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(CONFIG_FILE), "colour = \"red\"\n")?;
        let result = Config::resolve(Some(DEFAULT_API_URL.to_string()), dir_string(&dir));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_rejects_non_http_url() -> Fallible<()> {
        let dir = tempdir()?;
        let result = Config::resolve(Some("ftp://example.com".to_string()), dir_string(&dir));
        let err = result.err().unwrap();
        assert_eq!(
            err.to_string(),
            "error: API URL must be http or https: 'ftp://example.com'."
        );
        Ok(())
    }
}
