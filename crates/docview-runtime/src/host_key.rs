//! Persistent SSH host key.

use std::path::Path;

use russh::keys::ssh_key::LineEnding;
use russh::keys::ssh_key::rand_core::OsRng;
use russh::keys::{Algorithm, HashAlg, PrivateKey};
use tracing::info;

use crate::{Error, Result};

/// Load the host key at `path`, or generate an ed25519 key and store it
/// there (mode 0600 on unix) when the file does not exist yet.
pub fn load_or_create_host_key(path: &Path) -> Result<PrivateKey> {
    if path.exists() {
        let key = russh::keys::load_secret_key(path, None).map_err(|e| {
            Error::Config(format!("failed to load host key {}: {}", path.display(), e))
        })?;
        info!(
            path = %path.display(),
            fingerprint = %key.public_key().fingerprint(HashAlg::Sha256),
            "host key loaded"
        );
        return Ok(key);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519)
        .map_err(|e| Error::Config(format!("failed to generate host key: {}", e)))?;
    key.write_openssh_file(path, LineEnding::LF).map_err(|e| {
        Error::Config(format!("failed to write host key {}: {}", path.display(), e))
    })?;
    info!(
        path = %path.display(),
        fingerprint = %key.public_key().fingerprint(HashAlg::Sha256),
        "host key generated"
    );
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_host_key_is_generated_once_and_reused() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("keys/ssh_host_ed25519_key");

        let created = load_or_create_host_key(&path)?;
        assert!(path.exists());
        assert_eq!(created.algorithm(), Algorithm::Ed25519);

        let loaded = load_or_create_host_key(&path)?;
        assert_eq!(
            loaded.public_key().fingerprint(HashAlg::Sha256),
            created.public_key().fingerprint(HashAlg::Sha256)
        );
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_generated_host_key_is_private() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("ssh_host_ed25519_key");
        load_or_create_host_key(&path)?;

        let mode = std::fs::metadata(&path)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    #[test]
    fn test_unreadable_host_key_is_config_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("ssh_host_ed25519_key");
        std::fs::write(&path, "not a key")?;

        let err = load_or_create_host_key(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("failed to load host key"));
        Ok(())
    }
}
