//! Watcher thread: notify events, debounced, forwarded as paths over mpsc.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};

use crate::error::{MemexError, Result};

/// Remove and return every pending path that has been quiet for at least the
/// debounce window. Paths still inside the window stay pending.
fn drain_quiet(
    pending: &mut HashMap<PathBuf, Instant>,
    now: Instant,
    debounce: Duration,
) -> Vec<PathBuf> {
    let mut quiet = Vec::new();
    pending.retain(|path, last_seen| {
        if now.duration_since(*last_seen) >= debounce {
            quiet.push(path.clone());
            false
        } else {
            true
        }
    });
    quiet
}

/// Watch `root` recursively and send debounced absolute paths over `tx`.
///
/// Rapid event bursts for the same path (editors write, truncate, and rename
/// in quick succession) collapse into one notification once the path has been
/// quiet for the debounce window. Returns when the receiver is dropped.
pub fn run_watcher_thread(root: &Path, debounce_ms: u64, tx: mpsc::Sender<PathBuf>) -> Result<()> {
    let debounce = Duration::from_millis(debounce_ms);
    let (event_tx, event_rx) = mpsc::channel::<Vec<PathBuf>>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = event_tx.send(event.paths);
        }
    })
    .map_err(|e| MemexError::Config(format!("failed to create watcher: {e}")))?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| MemexError::Config(format!("failed to watch {}: {e}", root.display())))?;

    let mut pending: HashMap<PathBuf, Instant> = HashMap::new();

    loop {
        match event_rx.recv_timeout(debounce) {
            Ok(paths) => {
                let now = Instant::now();
                for path in paths {
                    pending.insert(path, now);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                for path in drain_quiet(&mut pending, Instant::now(), debounce) {
                    if tx.send(path).is_err() {
                        return Ok(());
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_quiet_splits_on_window() {
        let debounce = Duration::from_millis(500);
        let now = Instant::now();

        let mut pending = HashMap::new();
        pending.insert(PathBuf::from("old.md"), now - Duration::from_millis(600));
        pending.insert(PathBuf::from("fresh.md"), now - Duration::from_millis(100));

        let quiet = drain_quiet(&mut pending, now, debounce);

        assert_eq!(quiet, vec![PathBuf::from("old.md")]);
        assert_eq!(pending.len(), 1);
        assert!(pending.contains_key(Path::new("fresh.md")));
    }

    #[test]
    fn test_drain_quiet_empty_pending() {
        let mut pending = HashMap::new();
        let quiet = drain_quiet(&mut pending, Instant::now(), Duration::from_millis(500));
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_drained_path_does_not_fire_twice() {
        let debounce = Duration::from_millis(500);
        let now = Instant::now();

        let mut pending = HashMap::new();
        pending.insert(PathBuf::from("note.md"), now - Duration::from_secs(1));

        assert_eq!(drain_quiet(&mut pending, now, debounce).len(), 1);
        assert!(drain_quiet(&mut pending, now, debounce).is_empty());
    }
}
