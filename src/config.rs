use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::MountError;

pub const DEFAULT_SERVER: &str = "nas";

/// Values taken from the process environment once at startup.
#[derive(Debug, Clone)]
pub struct Environment {
    pub home: PathBuf,
    pub user: String,
}

/// Contents of `~/.nas_mappings.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MountMappings {
    #[serde(rename = "nas.user", default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(rename = "nas.server", default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Remote share subpath -> destination relative to the home directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<BTreeMap<String, String>>,
}

/// One remote path bound to one local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountTask {
    pub remote_path: String,
    pub local_dir: PathBuf,
}

impl MountMappings {
    pub fn user<'a>(&'a self, env: &'a Environment) -> &'a str {
        self.user
            .as_deref()
            .filter(|user| !user.is_empty())
            .unwrap_or(&env.user)
    }

    pub fn server(&self) -> &str {
        self.server
            .as_deref()
            .filter(|server| !server.is_empty())
            .unwrap_or(DEFAULT_SERVER)
    }

    pub fn tasks(&self, env: &Environment) -> Result<Vec<MountTask>, MountError> {
        let paths = self.paths.as_ref().ok_or(MountError::MissingPaths)?;

        Ok(paths
            .iter()
            .map(|(remote, destination)| MountTask {
                remote_path: strip_leading_separator(remote).to_string(),
                local_dir: env.home.join(strip_leading_separator(destination)),
            })
            .collect())
    }
}

fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

pub async fn load_mappings(path: &Path) -> Result<MountMappings, MountError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MountError::Config {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

    let mappings: MountMappings =
        serde_json::from_str(&contents).map_err(|e| MountError::Config {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

    tracing::debug!(
        "Loaded {} mappings from {}",
        mappings.paths.as_ref().map(|p| p.len()).unwrap_or(0),
        path.display()
    );

    Ok(mappings)
}
