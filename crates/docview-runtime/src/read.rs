//! Document reads bounded by a timeout.
//!
//! A read that outlives its timeout counts as failed and is left to finish
//! in the background; the session carries on with the error placeholder.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use docview_engine::content::read_document;

/// Read on the tokio blocking pool.
pub async fn read_bounded(
    path: PathBuf,
    max_bytes: u64,
    timeout: Duration,
) -> io::Result<Vec<u8>> {
    within(timeout, move || read_document(&path, max_bytes)).await
}

/// Read on a helper thread, for hosts that run outside a tokio runtime.
pub fn read_bounded_blocking(
    path: &Path,
    max_bytes: u64,
    timeout: Duration,
) -> io::Result<Vec<u8>> {
    let path = path.to_path_buf();
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("docview-read".to_string())
        .spawn(move || {
            let _ = tx.send(read_document(&path, max_bytes));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(timed_out(timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(io::Error::other("read thread exited without a result"))
        }
    }
}

pub(crate) async fn within<T, F>(timeout: Duration, work: F) -> io::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(io::Error::other(join.to_string())),
        Err(_) => Err(timed_out(timeout)),
    }
}

fn timed_out(timeout: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("timed out after {}ms", timeout.as_millis()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn fifo(dir: &Path) -> anyhow::Result<PathBuf> {
        let path = dir.join("stalled.md");
        let status = std::process::Command::new("mkfifo").arg(&path).status()?;
        anyhow::ensure!(status.success(), "mkfifo failed");
        Ok(path)
    }

    #[tokio::test]
    async fn test_read_bounded_returns_contents() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("doc.md");
        std::fs::write(&path, "# Doc")?;

        let bytes = read_bounded(path, 1024, Duration::from_secs(5)).await?;
        assert_eq!(bytes, b"# Doc");
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_bounded_times_out_on_stalled_path() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = fifo(temp_dir.path())?;

        let started = Instant::now();
        let err = read_bounded(path.clone(), 1024, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(err.to_string(), "timed out after 50ms");
        assert!(started.elapsed() < Duration::from_secs(5));

        // Unblock the reader left behind on the blocking pool.
        std::fs::write(&path, "")?;
        Ok(())
    }

    #[tokio::test]
    async fn test_within_reports_panicked_work() {
        let err = within(Duration::from_secs(5), || -> io::Result<()> {
            panic!("reader blew up")
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.to_string().contains("panicked"));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_bounded_blocking_times_out_on_stalled_path() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = fifo(temp_dir.path())?;

        let err = read_bounded_blocking(&path, 1024, Duration::from_millis(50)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(err.to_string(), "timed out after 50ms");

        std::fs::write(&path, "")?;
        Ok(())
    }

    #[test]
    fn test_read_bounded_blocking_passes_read_errors_through() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let err = read_bounded_blocking(
            &temp_dir.path().join("missing.md"),
            1024,
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        Ok(())
    }
}
