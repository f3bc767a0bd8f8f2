//! Credential file persistence
//!
//! The credential file is a small TOML document with a single `[CONFIG]`
//! table holding the access/refresh token pair. It is read once when the
//! token store initializes from it and rewritten after every login and
//! every successful refresh. All writes use a temp file + rename in the
//! same directory so a crash never leaves a half-written file behind.

use std::path::{Path, PathBuf};

use common::Secret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{CREDENTIALS_DIR, CREDENTIALS_FILE};
use crate::error::{Error, Result};

/// An access/refresh token pair held in memory.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: Secret<String>,
    pub refresh_token: Secret<String>,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            refresh_token: Secret::new(refresh_token.into()),
        }
    }
}

/// On-disk layout. Section and key names match what earlier clients wrote.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(rename = "CONFIG", default, skip_serializing_if = "Option::is_none")]
    config: Option<TokenSection>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenSection {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: String,
}

/// Default credential file location: `~/.neuvuequeue/neuvuequeue.cfg`.
pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Io("cannot determine home directory".into()))?;
    Ok(home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE))
}

/// Read the token pair from `path`.
///
/// Returns `Ok(None)` when the file or its `[CONFIG]` table is missing.
/// A file that exists but is not valid TOML is an error rather than
/// "no credentials", so a corrupt file is never silently replaced.
pub async fn load(path: &Path) -> Result<Option<TokenPair>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "credential file not found");
            return Ok(None);
        }
        Err(e) => return Err(Error::Io(format!("reading credential file: {e}"))),
    };

    let file: CredentialFile = toml::from_str(&contents)
        .map_err(|e| Error::CredentialParse(format!("parsing credential file: {e}")))?;

    Ok(file
        .config
        .map(|section| TokenPair::new(section.access_token, section.refresh_token)))
}

/// Persist the token pair to `path`, creating the parent directory first.
pub async fn save(path: &Path, tokens: &TokenPair) -> Result<()> {
    let file = CredentialFile {
        config: Some(TokenSection {
            access_token: tokens.access_token.expose().clone(),
            refresh_token: tokens.refresh_token.expose().clone(),
        }),
    };
    let contents = toml::to_string_pretty(&file)
        .map_err(|e| Error::CredentialParse(format!("serializing credentials: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::Io(format!("creating credential directory: {e}")))?;

    write_atomic(path, dir, contents.as_bytes()).await
}

/// Write to a temp file next to `path`, restrict it to 0600 on unix, then
/// rename it over the target.
async fn write_atomic(path: &Path, dir: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = dir.join(format!(".{CREDENTIALS_FILE}.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp credential file: {e}")))?;

    debug!(path = %path.display(), "persisted credentials");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_returns_same_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuvuequeue.cfg");

        save(&path, &TokenPair::new("at_1", "rt_1")).await.unwrap();

        let loaded = load(&path).await.unwrap().unwrap();
        assert_eq!(loaded.access_token.expose(), "at_1");
        assert_eq!(loaded.refresh_token.expose(), "rt_1");
    }

    #[tokio::test]
    async fn file_uses_config_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuvuequeue.cfg");

        save(&path, &TokenPair::new("at_x", "rt_x")).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("[CONFIG]"), "got: {contents}");
        assert!(contents.contains("access_token = \"at_x\""), "got: {contents}");
        assert!(contents.contains("refresh_token = \"rt_x\""), "got: {contents}");
    }

    #[tokio::test]
    async fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(&dir.path().join("absent.cfg")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn missing_section_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuvuequeue.cfg");
        tokio::fs::write(&path, "[OTHER]\nkey = \"value\"\n")
            .await
            .unwrap();

        assert!(load(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuvuequeue.cfg");
        tokio::fs::write(&path, "[CONFIG\naccess_token = ")
            .await
            .unwrap();

        let err = load(&path).await.unwrap_err();
        assert!(matches!(err, Error::CredentialParse(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".neuvuequeue").join("neuvuequeue.cfg");
        assert!(!path.parent().unwrap().exists());

        save(&path, &TokenPair::new("at", "rt")).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn save_overwrites_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuvuequeue.cfg");

        save(&path, &TokenPair::new("at_old", "rt_old")).await.unwrap();
        save(&path, &TokenPair::new("at_new", "rt_old")).await.unwrap();

        let loaded = load(&path).await.unwrap().unwrap();
        assert_eq!(loaded.access_token.expose(), "at_new");

        // No temp files left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neuvuequeue.cfg");
        save(&path, &TokenPair::new("at", "rt")).await.unwrap();

        let mode = tokio::fs::metadata(&path).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "credential file must be 0600, got {mode:o}");
    }

    #[test]
    fn default_path_ends_with_credential_file() {
        if let Ok(path) = default_path() {
            assert!(path.ends_with(".neuvuequeue/neuvuequeue.cfg"), "got: {}", path.display());
        }
    }
}
