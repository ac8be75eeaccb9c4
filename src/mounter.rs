use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::config::MountTask;
use crate::error::MountError;
use crate::secrets::Credential;
use crate::target::ensure_mountable;

pub const DEFAULT_MOUNT_PROGRAM: &str = "mount_smbfs";

/// External utility invoked as `<program> [options..] <remote> <local>`.
#[derive(Debug, Clone)]
pub struct MountCommand {
    pub program: String,
    pub options: Vec<String>,
}

impl Default for MountCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_MOUNT_PROGRAM.to_string(),
            options: Vec::new(),
        }
    }
}

/// `//user:password@server/path`
pub fn remote_address(user: &str, password: &str, server: &str, remote_path: &str) -> String {
    format!("//{}:{}@{}/{}", user, password, server, remote_path)
}

/// Mounts tasks against one server with one identity.
#[derive(Debug, Clone)]
pub struct Mounter {
    command: MountCommand,
    user: String,
    server: String,
    credential: Credential,
}

impl Mounter {
    pub fn new(command: MountCommand, user: String, server: String, credential: Credential) -> Self {
        Self {
            command,
            user,
            server,
            credential,
        }
    }

    /// Validates the destination, then runs the mount utility to completion.
    ///
    /// Output of the utility is forwarded to our stdout/stderr as it arrives.
    /// Resolves with the exit code, which is always 0 on success.
    pub async fn mount(&self, task: &MountTask) -> Result<i32, MountError> {
        ensure_mountable(&task.local_dir).await?;

        let address = remote_address(
            &self.user,
            self.credential.expose(),
            &self.server,
            &task.remote_path,
        );
        tracing::info!(
            "Mounting {} to {}",
            remote_address(&self.user, "***", &self.server, &task.remote_path),
            task.local_dir.display()
        );

        let spawn_error = |source| MountError::Spawn {
            program: self.command.program.clone(),
            source,
        };

        let mut child = Command::new(&self.command.program)
            .args(&self.command.options)
            .arg(&address)
            .arg(&task.local_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (status, _, _) = tokio::join!(
            child.wait(),
            forward_lines(stdout, false),
            forward_lines(stderr, true),
        );
        let status = status.map_err(|source| MountError::Wait {
            program: self.command.program.clone(),
            source,
        })?;

        match status.code() {
            Some(0) => {
                tracing::info!("Mounted {}", task.local_dir.display());
                Ok(0)
            }
            Some(code) => {
                tracing::warn!("Mount of {} exited with {}", task.local_dir.display(), code);
                Err(MountError::MountProcess { code })
            }
            None => Err(MountError::Terminated),
        }
    }
}

/// Copies the child's output to ours a line at a time, bytes that are not
/// UTF-8 included. The pipe is drained to EOF so the child never sees EPIPE.
async fn forward_lines<R: AsyncRead + Unpin>(reader: Option<R>, to_stderr: bool) {
    let Some(reader) = reader else {
        return;
    };

    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let decoded = String::from_utf8_lossy(&line);
                let text = decoded.strip_suffix('\n').unwrap_or(&decoded);
                if to_stderr {
                    eprintln!("{}", text);
                } else {
                    println!("{}", text);
                }
            }
            Err(e) => {
                tracing::warn!("Stopped forwarding mount output: {}", e);
                let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
                break;
            }
        }
    }
}
