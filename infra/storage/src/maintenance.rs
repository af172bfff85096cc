use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

pub(crate) const TMP_MARKER: &str = ".trai-tmp.";
const STALE_AFTER: Duration = Duration::from_secs(300);

/// Removes leftover temp files older than five minutes and prunes empty shard dirs.
pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up temporary files");
        },
        Err(e) => {
            error!(error = %e, "Temp file cleanup task panicked");
        },
        _ => {},
    }
}

fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    for entry in WalkDir::new(root).contents_first(true).into_iter().flatten() {
        let path = entry.path();
        if path == root {
            continue;
        }

        if entry.file_type().is_file() {
            if is_tmp(&entry) && is_stale(&entry, now, threshold) {
                match std::fs::remove_file(path) {
                    Ok(()) => removed += 1,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to remove temp file");
                        failed += 1;
                    },
                }
            }
        } else if entry.file_type().is_dir() {
            // only succeeds for empty dirs
            let _ = std::fs::remove_dir(path);
        }
    }

    (removed, failed)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stale_temp_files_are_removed() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let keep = dir.path().join("photo.png");
        let tmp = dir.path().join(format!("photo.png{TMP_MARKER}7"));
        std::fs::write(&keep, b"k")?;
        std::fs::write(&tmp, b"t")?;

        let later = SystemTime::now() + Duration::from_secs(3600);
        let (removed, failed) = remove_stale(dir.path(), later, STALE_AFTER);

        assert_eq!((removed, failed), (1, 0));
        assert!(keep.exists());
        assert!(!tmp.exists());
        Ok(())
    }

    #[test]
    fn fresh_temp_files_survive() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let tmp = dir.path().join(format!("a.bin{TMP_MARKER}1"));
        std::fs::write(&tmp, b"t")?;

        let (removed, _) = remove_stale(dir.path(), SystemTime::now(), STALE_AFTER);
        assert_eq!(removed, 0);
        assert!(tmp.exists());
        Ok(())
    }
}
