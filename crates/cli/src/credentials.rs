//! Token persistence between invocations.
//!
//! The token lives in a small JSON file (`{"token": "..."}`). A missing file
//! means "not logged in". On Unix the file is created with mode `0600`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use board::ApiToken;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    token: ApiToken,
}

/// File-backed store for the login token.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `configured`, or in the platform config directory.
    pub fn resolve(configured: Option<&Path>) -> Result<Self> {
        if let Some(path) = configured {
            return Ok(Self::new(path));
        }
        let dirs = ProjectDirs::from("", "", "dealboard")
            .context("cannot determine a config directory; set credentials_path")?;
        Ok(Self::new(dirs.config_dir().join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored token, or `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<ApiToken>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored credential");
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("cannot read {}", self.path.display()));
            }
        };
        let stored: StoredCredential = serde_json::from_str(&text)
            .with_context(|| format!("corrupt credential file {}", self.path.display()))?;
        Ok(Some(stored.token))
    }

    pub fn save(&self, token: &ApiToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let text = serde_json::to_string(&StoredCredential {
            token: token.clone(),
        })?;
        write_private(&self.path, &text)
            .with_context(|| format!("cannot write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "credential stored");
        Ok(())
    }

    /// Removes the stored token. Clearing an absent token is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("cannot remove {}", self.path.display())),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, text: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(text.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, text: &str) -> std::io::Result<()> {
    fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_means_no_token() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("nested/credentials.json"));
        let token = ApiToken::new("0123abcd").unwrap();

        store.save(&token).unwrap();
        assert_eq!(store.load().unwrap(), Some(token));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"token": ""}"#).unwrap();

        assert!(CredentialStore::new(&path).load().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        store.save(&ApiToken::new("t").unwrap()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn configured_path_wins() {
        let store = CredentialStore::resolve(Some(Path::new("/tmp/x.json"))).unwrap();
        assert_eq!(store.path(), Path::new("/tmp/x.json"));
    }
}
