//! Timestamped vault snapshots and atomic file writes.
//!
//! Backups are named after the local time they were taken, in ISO-8601
//! with `:` replaced by `.` so the name is valid on every filesystem:
//! `2026-10-19T14.03.27.json`. A second snapshot within the same second
//! gets a `-1`, `-2`, ... suffix.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use tracing::{debug, info};

use crate::error::Result;
use crate::model::Vault;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H.%M.%S";
const TIMESTAMP_LEN: usize = 19;
const BACKUP_EXTENSION: &str = "json";

/// Write `data` to `path` through a temporary sibling and a rename, so a
/// reader never sees a half-written file. Mode 0600 on Unix.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let written = options.open(&temp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&temp_path, path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Create the backup directory with restrictive permissions.
fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }

    Ok(())
}

/// File name for a backup taken at `now`, before collision suffixes.
pub fn backup_file_stem(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Pick a backup path under `dir` that sorts after every existing backup
/// taken in the same second, even when older ones have been pruned.
fn unique_backup_path(dir: &Path, stem: &str) -> Result<PathBuf> {
    let highest = list_backups(dir)?
        .iter()
        .filter_map(|path| {
            let name = path.file_stem()?.to_str()?;
            if name == stem {
                Some(0)
            } else {
                name.strip_prefix(stem)?.strip_prefix('-')?.parse::<u32>().ok()
            }
        })
        .max();

    let file_name = match highest {
        None => format!("{stem}.{BACKUP_EXTENSION}"),
        Some(seq) => format!("{stem}-{}.{BACKUP_EXTENSION}", seq + 1),
    };
    Ok(dir.join(file_name))
}

/// Write a full snapshot of `vault` into `dir`.
pub fn write_backup(dir: &Path, vault: &Vault) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = unique_backup_path(dir, &backup_file_stem(Local::now()))?;
    let json = serde_json::to_vec_pretty(vault)?;
    write_atomic(&path, &json)?;
    info!(path = %path.display(), "wrote vault backup");
    Ok(path)
}

/// Ordering key for a backup file: (timestamp, collision sequence).
/// Files that are not backups yield `None`.
fn backup_sort_key(path: &Path) -> Option<(NaiveDateTime, u32)> {
    if path.extension().and_then(|e| e.to_str()) != Some(BACKUP_EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.len() < TIMESTAMP_LEN || !stem.is_char_boundary(TIMESTAMP_LEN) {
        return None;
    }
    let (stamp, rest) = stem.split_at(TIMESTAMP_LEN);
    let taken = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    let seq = match rest {
        "" => 0,
        suffix => suffix.strip_prefix('-')?.parse().ok()?,
    };
    Some((taken, seq))
}

/// Backups in `dir`, oldest first. A missing directory has no backups.
pub fn list_backups(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(key) = backup_sort_key(&path) {
            backups.push((key, path));
        }
    }
    backups.sort();
    Ok(backups.into_iter().map(|(_, path)| path).collect())
}

/// Delete the oldest backups so that at most `keep` remain.
pub fn prune_backups(dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let backups = list_backups(dir)?;
    let excess = backups.len().saturating_sub(keep);
    let removed: Vec<PathBuf> = backups.into_iter().take(excess).collect();
    for path in &removed {
        debug!(path = %path.display(), "pruning old backup");
        fs::remove_file(path)?;
    }
    Ok(removed)
}
