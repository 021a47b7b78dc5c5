//! Drive-side (left/right-hand-drive) preference store.
//!
//! Holds the mirrored-layout flag the presentation layer keys off, persists
//! it to a small TOML preference file, and folds external edits of that file
//! back into the published value. Constructed once and handed to whoever
//! needs it; there is no global instance.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use tokio::sync::watch;

/// Default when no preference has been persisted.
const DEFAULT_LEFT_HAND_DRIVE: bool = true;

const KEY_IS_LHD: &str = "is_left_hand_drive";

#[derive(Debug, Deserialize)]
struct DriveSidePrefs {
    is_left_hand_drive: Option<bool>,
}

/// Injected holder of the drive-side flag.
pub struct DriveSideStore {
    tx: Arc<watch::Sender<bool>>,
    path: PathBuf,
    _watcher: Option<RecommendedWatcher>,
}

impl DriveSideStore {
    /// Open the store, reading the persisted flag when the file exists.
    pub fn open(path: PathBuf) -> Result<Self> {
        let initial = read_pref(&path)?.unwrap_or(DEFAULT_LEFT_HAND_DRIVE);
        let (tx, _) = watch::channel(initial);
        Ok(Self {
            tx: Arc::new(tx),
            path,
            _watcher: None,
        })
    }

    /// Observe the flag; the receiver always holds the latest value.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Current flag value.
    pub fn is_left_hand_drive(&self) -> bool {
        *self.tx.borrow()
    }

    /// Update the flag, persisting it to disk and publishing it.
    pub fn set(&self, value: bool) -> Result<()> {
        persist(&self.path, value)?;
        publish(&self.tx, value);
        Ok(())
    }

    /// Re-read the preference file and publish any change.
    pub fn reload(&self) {
        publish_from_file(&self.tx, &self.path);
    }

    /// Watch the preference file so external edits are picked up. The analog
    /// of a system-wide toggle broadcast: anything that rewrites the file
    /// flips the published flag.
    pub fn watch_file(&mut self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow::anyhow!("prefs path has no parent: {:?}", self.path))?;

        let tx = self.tx.clone();
        let path = self.path.clone();
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                match result {
                    Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                        if event.paths.iter().any(|p| p.ends_with(file_name(&path))) {
                            publish_from_file(&tx, &path);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "drive-side watch error"),
                }
            })
            .context("create drive-side watcher")?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("watch prefs dir {:?}", dir))?;
        self._watcher = Some(watcher);
        Ok(())
    }
}

fn file_name(path: &Path) -> &std::ffi::OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

fn publish(tx: &watch::Sender<bool>, value: bool) {
    tx.send_if_modified(|current| {
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    });
}

/// Fold the persisted value, if any, into the published flag.
fn publish_from_file(tx: &watch::Sender<bool>, path: &Path) {
    match read_pref(path) {
        Ok(Some(value)) => publish(tx, value),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "drive-side preference unreadable"),
    }
}

fn read_pref(path: &Path) -> Result<Option<bool>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).with_context(|| format!("read prefs {:?}", path))?;
    let prefs: DriveSidePrefs =
        toml::from_str(&raw).with_context(|| format!("parse prefs {:?}", path))?;
    Ok(prefs.is_left_hand_drive)
}

/// Rewrite the flag in place, preserving any other keys and formatting.
fn persist(path: &Path, value: bool) -> Result<()> {
    let raw = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("read prefs {:?}", path))?
    } else {
        String::new()
    };
    let mut doc = raw
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("parse prefs {:?}", path))?;
    doc[KEY_IS_LHD] = toml_edit::value(value);
    fs::write(path, doc.to_string()).with_context(|| format!("write prefs {:?}", path))?;
    Ok(())
}
