use futures::future::join_all;

use crate::config::MountTask;
use crate::error::MountError;
use crate::mounter::Mounter;

#[derive(Debug)]
pub struct MountOutcome {
    pub task: MountTask,
    pub result: Result<i32, MountError>,
}

impl MountOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Starts every mount at once and waits for all of them to settle.
///
/// A failing task never cancels its siblings. Outcomes come back in task order.
pub async fn mount_all(mounter: &Mounter, tasks: Vec<MountTask>) -> Vec<MountOutcome> {
    let pending = tasks.into_iter().map(|task| async move {
        let result = mounter.mount(&task).await;
        MountOutcome { task, result }
    });

    join_all(pending).await
}

/// Reports each outcome to the operator and returns the number of successes.
pub fn summarize(outcomes: &[MountOutcome]) -> usize {
    for outcome in outcomes {
        match &outcome.result {
            Ok(_) => println!(
                "✓ {} mounted at {}",
                outcome.task.remote_path,
                outcome.task.local_dir.display()
            ),
            Err(e) => eprintln!(
                "✗ {} -> {}: {}",
                outcome.task.remote_path,
                outcome.task.local_dir.display(),
                e
            ),
        }
    }

    let succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
    println!("{} of {} mounts succeeded", succeeded, outcomes.len());
    succeeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mounter::MountCommand;
    use crate::secrets::Credential;
    use anyhow::Result;
    use tempfile::tempdir;

    fn mounter(script: &str) -> Mounter {
        Mounter::new(
            MountCommand {
                program: "sh".to_string(),
                options: vec!["-c".to_string(), script.to_string()],
            },
            "alice".to_string(),
            "nas".to_string(),
            Credential::new("pw"),
        )
    }

    #[tokio::test]
    async fn every_task_settles_in_order() -> Result<()> {
        let dir = tempdir()?;
        let music = dir.path().join("Music");
        let photos = dir.path().join("Photos");
        std::fs::create_dir(&music)?;
        std::fs::create_dir(&photos)?;

        let tasks = vec![
            MountTask {
                remote_path: "music".to_string(),
                local_dir: music.clone(),
            },
            MountTask {
                remote_path: "photos".to_string(),
                local_dir: photos.clone(),
            },
        ];

        let outcomes = mount_all(&mounter("exit 0"), tasks).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].task.local_dir, music);
        assert_eq!(outcomes[1].task.local_dir, photos);
        assert!(outcomes.iter().all(|o| matches!(o.result, Ok(0))));
        assert_eq!(summarize(&outcomes), 2);
        Ok(())
    }

    #[tokio::test]
    async fn failure_does_not_abort_siblings() -> Result<()> {
        let dir = tempdir()?;
        let busy = dir.path().join("Busy");
        let free = dir.path().join("Free");
        std::fs::create_dir(&busy)?;
        std::fs::write(busy.join("local.txt"), "")?;
        std::fs::create_dir(&free)?;

        let tasks = vec![
            MountTask {
                remote_path: "busy".to_string(),
                local_dir: busy,
            },
            MountTask {
                remote_path: "free".to_string(),
                local_dir: free,
            },
        ];

        let outcomes = mount_all(&mounter("exit 0"), tasks).await;

        assert!(matches!(
            outcomes[0].result,
            Err(MountError::DirectoryNotEmpty(_))
        ));
        assert!(outcomes[1].succeeded());
        assert_eq!(summarize(&outcomes), 1);
        Ok(())
    }

    #[tokio::test]
    async fn no_tasks_yields_no_outcomes() {
        let outcomes = mount_all(&mounter("exit 0"), Vec::new()).await;
        assert!(outcomes.is_empty());
    }
}
