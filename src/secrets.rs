use std::fmt;
use std::path::Path;

use crate::error::MountError;

/// Password for the file server. Shared read-only by every mount task.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Reads the password file, dropping exactly one trailing newline.
pub async fn load_secret(path: &Path) -> Result<Credential, MountError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MountError::Secret {
            path: path.to_path_buf(),
            source,
        })?;

    let password = contents.strip_suffix('\n').unwrap_or(&contents);
    tracing::debug!("Loaded password from {}", path.display());

    Ok(Credential::new(password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[tokio::test]
    async fn strips_single_trailing_newline() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(".naspass");
        std::fs::write(&path, "secret\n")?;

        assert_eq!(load_secret(&path).await?.expose(), "secret");
        Ok(())
    }

    #[tokio::test]
    async fn keeps_all_but_the_last_newline() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(".naspass");
        std::fs::write(&path, "secret\n\n")?;

        assert_eq!(load_secret(&path).await?.expose(), "secret\n");
        Ok(())
    }

    #[tokio::test]
    async fn password_without_newline_is_untouched() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(".naspass");
        std::fs::write(&path, " s3cr3t ")?;

        assert_eq!(load_secret(&path).await?.expose(), " s3cr3t ");
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_a_secret_error() -> Result<()> {
        let dir = tempdir()?;
        let err = load_secret(&dir.path().join(".naspass"))
            .await
            .err()
            .expect("should have failed");

        assert!(matches!(err, MountError::Secret { .. }));
        Ok(())
    }

    #[test]
    fn debug_output_hides_password() {
        let credential = Credential::new("hunter2");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }
}
