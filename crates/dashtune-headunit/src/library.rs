//! Local library scanning.
//!
//! Walks the media root, probes metadata, and yields the queue in title
//! order. Unreadable or untagged files degrade to filename metadata rather
//! than failing the scan.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, StandardTagKey};
use symphonia::core::probe::Hint;

use dashtune_types::LocalSong;

/// Source of locally stored songs for the controller.
#[async_trait]
pub trait LibraryScanner: Send + Sync {
    /// Enumerate local audio in play order; an empty list is a valid result.
    async fn scan(&self) -> Result<Vec<LocalSong>>;
}

/// Scanner over a filesystem media root.
pub struct FsLibraryScanner {
    root: PathBuf,
}

impl FsLibraryScanner {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl LibraryScanner for FsLibraryScanner {
    async fn scan(&self) -> Result<Vec<LocalSong>> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || scan_root(&root))
            .await
            .context("library scan task")?
    }
}

/// Walk the media root and build the song list.
fn scan_root(root: &Path) -> Result<Vec<LocalSong>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("canonicalize media root {:?}", root))?;
    if !root.is_dir() {
        return Err(anyhow::anyhow!("media root is not a directory: {:?}", root));
    }

    tracing::info!(root = %root.display(), "scanning local library");

    let mut found = Vec::new();
    scan_dir(&root, &root, &mut found)?;

    // Title order is the queue order handed to the session.
    found.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    let songs = found
        .into_iter()
        .enumerate()
        .map(|(index, file)| LocalSong {
            id: index as u64 + 1,
            title: file.title,
            artist: file.artist,
            album: file.album,
            duration_ms: file.duration_ms,
            content_uri: file.content_uri,
            art_uri: file.art_uri,
        })
        .collect::<Vec<_>>();

    tracing::info!(count = songs.len(), "library scan complete");
    Ok(songs)
}

struct ScannedFile {
    sort_key: String,
    title: String,
    artist: String,
    album: String,
    duration_ms: u64,
    content_uri: String,
    art_uri: Option<String>,
}

fn scan_dir(root: &Path, dir: &Path, found: &mut Vec<ScannedFile>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("read_dir {:?}", dir))? {
        let entry = entry.context("read_dir entry")?;
        let path = entry.path();
        if path.is_dir() {
            let canon = path
                .canonicalize()
                .with_context(|| format!("canonicalize {:?}", path))?;
            if canon.starts_with(root) {
                scan_dir(root, &canon, found)?;
            }
            continue;
        }
        if !path.is_file() {
            continue;
        }

        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or("")
            .to_ascii_lowercase();
        if !is_supported_extension(&ext) {
            continue;
        }

        found.push(probe_song(&path, &ext));
    }
    Ok(())
}

fn is_supported_extension(ext: &str) -> bool {
    matches!(
        ext,
        "flac" | "wav" | "aiff" | "aif" | "mp3" | "m4a" | "aac" | "alac" | "ogg" | "oga" | "opus"
    )
}

/// Probe one file; tag failures fall back to filename metadata.
fn probe_song(path: &Path, ext_hint: &str) -> ScannedFile {
    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("<unknown>")
        .to_string();

    let mut title = None;
    let mut artist = None;
    let mut album = None;
    let mut duration_ms = 0u64;
    let mut embedded_cover = false;

    match File::open(path) {
        Ok(file) => {
            let mut hint = Hint::new();
            if !ext_hint.is_empty() {
                hint.with_extension(ext_hint);
            }
            let mss = MediaSourceStream::new(Box::new(file), Default::default());
            match symphonia::default::get_probe().format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            ) {
                Ok(mut probed) => {
                    if let Some(track) = probed.format.default_track() {
                        let params = &track.codec_params;
                        if let (Some(frames), Some(rate)) = (params.n_frames, params.sample_rate) {
                            if rate > 0 {
                                duration_ms = frames.saturating_mul(1000) / rate as u64;
                            }
                        }
                    }
                    if let Some(rev) = probed.format.metadata().current() {
                        for tag in rev.tags() {
                            match tag.std_key {
                                Some(StandardTagKey::TrackTitle) => {
                                    if title.is_none() {
                                        title = Some(tag.value.to_string());
                                    }
                                }
                                Some(StandardTagKey::Artist) => {
                                    if artist.is_none() {
                                        artist = Some(tag.value.to_string());
                                    }
                                }
                                Some(StandardTagKey::Album) => {
                                    if album.is_none() {
                                        album = Some(tag.value.to_string());
                                    }
                                }
                                _ => {}
                            }
                        }
                        embedded_cover = !rev.visuals().is_empty();
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "metadata probe failed");
                }
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot open media file");
        }
    }

    let content_uri = file_uri(path);
    let art_uri = if embedded_cover {
        Some(format!("{content_uri}#cover"))
    } else {
        sidecar_cover(path)
    };

    let title = title.unwrap_or(stem);
    ScannedFile {
        sort_key: title.to_lowercase(),
        title,
        artist: artist.unwrap_or_else(|| "Unknown".to_string()),
        album: album.unwrap_or_else(|| "Unknown".to_string()),
        duration_ms,
        content_uri,
        art_uri,
    }
}

/// Artwork shipped next to the file, checked in preference order.
fn sidecar_cover(path: &Path) -> Option<String> {
    let dir = path.parent()?;
    for name in ["cover.jpg", "cover.png", "folder.jpg"] {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(file_uri(&candidate));
        }
    }
    None
}

fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "dashtune-library-{tag}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let _ = fs::create_dir_all(&root);
        root
    }

    #[test]
    fn is_supported_extension_accepts_known() {
        assert!(is_supported_extension("flac"));
        assert!(is_supported_extension("mp3"));
        assert!(is_supported_extension("opus"));
        assert!(!is_supported_extension("txt"));
        assert!(!is_supported_extension(""));
    }

    #[test]
    fn scan_skips_unsupported_files() {
        let root = temp_root("skip");
        let _ = fs::write(root.join("song.flac"), b"test");
        let _ = fs::write(root.join("notes.txt"), b"test");

        let songs = scan_root(&root).expect("scan");
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "song");
    }

    #[test]
    fn scan_sorts_by_title_with_sequential_ids() {
        let root = temp_root("sort");
        let _ = fs::write(root.join("Borealis.flac"), b"test");
        let _ = fs::write(root.join("arrival.mp3"), b"test");
        let sub = root.join("album");
        let _ = fs::create_dir_all(&sub);
        let _ = fs::write(sub.join("Crossing.flac"), b"test");

        let songs = scan_root(&root).expect("scan");
        let titles: Vec<&str> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["arrival", "Borealis", "Crossing"]);
        let ids: Vec<u64> = songs.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn unprobeable_file_degrades_to_filename_metadata() {
        let root = temp_root("degrade");
        let _ = fs::write(root.join("mystery.flac"), b"not a flac");

        let songs = scan_root(&root).expect("scan");
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "mystery");
        assert_eq!(songs[0].artist, "Unknown");
        assert_eq!(songs[0].duration_ms, 0);
        assert!(songs[0].content_uri.starts_with("file://"));
    }

    #[test]
    fn sidecar_cover_is_attached() {
        let root = temp_root("cover");
        let _ = fs::write(root.join("song.flac"), b"test");
        let _ = fs::write(root.join("cover.jpg"), b"jpg");

        let songs = scan_root(&root).expect("scan");
        let art = songs[0].art_uri.as_deref().expect("cover art");
        assert!(art.ends_with("cover.jpg"));
    }

    #[test]
    fn empty_root_yields_empty_list() {
        let root = temp_root("empty");
        let songs = scan_root(&root).expect("scan");
        assert!(songs.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = std::env::temp_dir().join("dashtune-library-missing-nonexistent");
        assert!(scan_root(&root).is_err());
    }

    #[tokio::test]
    async fn fs_scanner_runs_off_the_async_thread() {
        let root = temp_root("async");
        let _ = fs::write(root.join("song.flac"), b"test");

        let scanner = FsLibraryScanner::new(root);
        let songs = scanner.scan().await.expect("scan");
        assert_eq!(songs.len(), 1);
    }
}
