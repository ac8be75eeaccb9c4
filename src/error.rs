use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MountError {
    #[error("cannot read mapping file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("mapping file has no `paths` table")]
    MissingPaths,

    #[error("cannot read password file {}: {source}", .path.display())]
    Secret {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("{} is a file", .0.display())]
    NotAMountableTarget(PathBuf),

    #[error("cannot mount to {} as directory not empty", .0.display())]
    DirectoryNotEmpty(PathBuf),

    #[error("cannot inspect {}: {source}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("mount exited with code {code}")]
    MountProcess { code: i32 },

    #[error("mount was terminated by a signal")]
    Terminated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_failure_is_not_reported_as_spawn() {
        let err = MountError::Wait {
            program: "mount_smbfs".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Interrupted, "interrupted"),
        };

        let message = err.to_string();
        assert_eq!(message, "failed waiting for mount_smbfs: interrupted");
        assert!(!message.contains("spawn"));
    }
}
