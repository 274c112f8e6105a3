//! Line input for the interactive client.
//!
//! Reads run on a detached OS thread, not tokio's blocking pool: a read
//! blocked on a quiet terminal must not hold up runtime shutdown.

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Forward lines from `source` to `lines` on a dedicated thread.
///
/// The channel closes when `source` reaches EOF or fails. The thread stops
/// on its next line once the receiver is gone.
pub fn spawn_line_reader<R>(source: R, lines: mpsc::Sender<String>) -> std::io::Result<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("ciphertalk-input".into())
        .spawn(move || {
            for line in source.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "Input read failed");
                        break;
                    }
                };
                if lines.blocking_send(line).is_err() {
                    break;
                }
            }
            debug!("Input closed");
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};
    use std::time::Duration;

    /// A source whose reads block until the paired sender is dropped.
    struct Quiet(std::sync::mpsc::Receiver<()>);

    impl Read for Quiet {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_lines_forwarded_until_eof() {
        let (tx, mut rx) = mpsc::channel(4);
        spawn_line_reader(Cursor::new("hello\n!secret bob\n"), tx).unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx.recv().await.as_deref(), Some("!secret bob"));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_runtime_drop_not_blocked_by_quiet_input() {
        let (_keep_quiet, quiet) = std::sync::mpsc::channel::<()>();
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let (tx, mut rx) = mpsc::channel(4);
                spawn_line_reader(BufReader::new(Quiet(quiet)), tx).unwrap();
                let waited = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
                assert!(waited.is_err());
            });
            drop(runtime);
            let _ = done_tx.send(());
        });

        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
