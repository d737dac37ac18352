// Writes recorded frames to disk as `frame000000.png`, `frame000001.png`, ...
//
// The export directory is treated as owned by the tool: after a successful export it holds
// exactly the current sequence. Old `frame*.png` entries are removed (once, before writing)
// after the caller agrees to it, even when the new sequence is shorter or empty.
//
// A failed write stops the export; frames written before it stay on disk.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageResult;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::types::FrameBuffer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub dir: PathBuf,
    pub written: usize,
    pub purged: usize,
}

pub fn frame_file_name(index: usize) -> String {
    format!("frame{index:06}.png")
}

fn is_frame_file(name: &str) -> bool {
    name.starts_with("frame") && name.ends_with(".png")
}

/// Export `frames` in order. `confirm` is only called when earlier frames exist and
/// `ask_overwrite` is set; returning false cancels without touching anything.
pub fn export_frames(
    frames: &[FrameBuffer],
    dir: &Path,
    ask_overwrite: bool,
    confirm: impl FnOnce() -> bool,
) -> Result<ExportSummary> {
    export_with(frames, dir, ask_overwrite, confirm, |frame, path| frame.to_rgb_image().save(path))
}

fn export_with(
    frames: &[FrameBuffer],
    dir: &Path,
    ask_overwrite: bool,
    confirm: impl FnOnce() -> bool,
    mut save: impl FnMut(&FrameBuffer, &Path) -> ImageResult<()>,
) -> Result<ExportSummary> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| Error::ExportDir { path: dir.to_path_buf(), source })?;
        info!("created export directory {}", dir.display());
    }

    let mut summary = ExportSummary { dir: dir.to_path_buf(), written: 0, purged: 0 };
    let existing = existing_frames(dir)?;
    if !existing.is_empty() {
        if ask_overwrite && !confirm() {
            info!("export to {} cancelled by user", dir.display());
            return Err(Error::ExportCancelled(dir.to_path_buf()));
        }
        for path in &existing {
            fs::remove_file(path).map_err(|source| Error::ExportPurge { path: path.clone(), source })?;
        }
        summary.purged = existing.len();
    }

    for (idx, frame) in frames.iter().enumerate() {
        let path = dir.join(frame_file_name(idx));
        if let Err(source) = save(frame, &path) {
            warn!("export stopped after {} of {} frames", summary.written, frames.len());
            return Err(Error::ExportWrite { path, source });
        }
        summary.written += 1;
    }

    info!(
        "exported {} frames to {} ({} old frames removed)",
        summary.written,
        dir.display(),
        summary.purged
    );
    Ok(summary)
}

fn existing_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::ExportDir { path: dir.to_path_buf(), source })?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::ExportDir { path: dir.to_path_buf(), source })?;
        if entry.file_name().to_str().is_some_and(is_frame_file) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    fn frames(n: usize) -> Vec<FrameBuffer> {
        (0..n).map(|i| FrameBuffer { width: 2, height: 2, pixels: vec![i as u32; 4] }).collect()
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(frame_file_name(0), "frame000000.png");
        assert_eq!(frame_file_name(1234567), "frame1234567.png");
    }

    #[test]
    fn export_into_empty_dir() {
        let dir = tempdir().unwrap();
        let asked = Cell::new(false);
        let summary = export_frames(&frames(3), dir.path(), true, || {
            asked.set(true);
            true
        })
        .unwrap();

        assert!(!asked.get());
        assert_eq!(summary.written, 3);
        assert_eq!(
            listing(dir.path()),
            vec!["frame000000.png", "frame000001.png", "frame000002.png"]
        );
    }

    #[test]
    fn missing_dir_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        export_frames(&frames(1), &nested, true, || true).unwrap();
        assert_eq!(listing(&nested), vec!["frame000000.png"]);
    }

    #[test]
    fn uncreatable_dir_fails_before_anything_else() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let err = export_frames(&frames(1), &blocker.join("sub"), true, || true).unwrap_err();
        assert!(matches!(err, Error::ExportDir { .. }));
    }

    #[test]
    fn declined_overwrite_leaves_dir_untouched() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("frame000000.png"), b"old").unwrap();

        let err = export_frames(&frames(3), dir.path(), true, || false).unwrap_err();
        assert!(matches!(err, Error::ExportCancelled(_)));
        assert_eq!(listing(dir.path()), vec!["frame000000.png"]);
        assert_eq!(fs::read(dir.path().join("frame000000.png")).unwrap(), b"old");
    }

    #[test]
    fn confirmed_overwrite_purges_all_old_frames_once() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(frame_file_name(i)), b"old").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        let calls = Cell::new(0);
        let summary = export_frames(&frames(2), dir.path(), true, || {
            calls.set(calls.get() + 1);
            true
        })
        .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(summary.purged, 5);
        assert_eq!(
            listing(dir.path()),
            vec!["frame000000.png", "frame000001.png", "notes.txt"]
        );
    }

    #[test]
    fn no_prompt_when_confirmation_disabled() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("frame_old.png"), b"old").unwrap();

        let summary = export_frames(&frames(1), dir.path(), false, || panic!("asked")).unwrap();
        assert_eq!(summary.purged, 1);
        assert_eq!(listing(dir.path()), vec!["frame000000.png"]);
    }

    #[test]
    fn repeated_export_is_idempotent() {
        let dir = tempdir().unwrap();
        let set = frames(4);
        export_frames(&set, dir.path(), false, || true).unwrap();
        let first = listing(dir.path());
        export_frames(&set, dir.path(), false, || true).unwrap();
        assert_eq!(listing(dir.path()), first);
    }

    #[test]
    fn written_png_holds_frame_pixels() {
        let dir = tempdir().unwrap();
        let frame = FrameBuffer { width: 1, height: 1, pixels: vec![0x00AA_BB_CC] };
        export_frames(&[frame], dir.path(), true, || true).unwrap();

        let img = image::open(dir.path().join("frame000000.png")).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0).0, [0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn empty_store_still_syncs_the_directory() {
        let dir = tempdir().unwrap();
        for i in 0..3 {
            fs::write(dir.path().join(frame_file_name(i)), b"old").unwrap();
        }

        let err = export_frames(&[], dir.path(), true, || false).unwrap_err();
        assert!(matches!(err, Error::ExportCancelled(_)));
        assert_eq!(listing(dir.path()).len(), 3);

        let summary = export_frames(&[], dir.path(), true, || true).unwrap();
        assert_eq!((summary.written, summary.purged), (0, 3));
        assert!(listing(dir.path()).is_empty());
    }

    #[test]
    fn failed_write_keeps_earlier_frames_and_stops() {
        let dir = tempdir().unwrap();
        let mut calls = 0;
        let err = export_with(&frames(3), dir.path(), false, || true, |frame, path| {
            calls += 1;
            if calls == 2 {
                return Err(image::ImageError::IoError(std::io::Error::other("disk full")));
            }
            frame.to_rgb_image().save(path)
        })
        .unwrap_err();

        match err {
            Error::ExportWrite { path, .. } => assert!(path.ends_with("frame000001.png")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls, 2);
        assert_eq!(listing(dir.path()), vec!["frame000000.png"]);
        assert!(!dir.path().join("frame000002.png").exists());
    }

    #[test]
    fn matching_directory_counts_as_collision() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("frame000001.png")).unwrap();

        let asked = Cell::new(false);
        let err = export_frames(&frames(3), dir.path(), true, || {
            asked.set(true);
            false
        })
        .unwrap_err();
        assert!(asked.get());
        assert!(matches!(err, Error::ExportCancelled(_)));
        assert_eq!(listing(dir.path()), vec!["frame000001.png"]);
    }

    #[test]
    fn unremovable_old_frame_fails_before_writing() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("frame000001.png")).unwrap();

        let err = export_frames(&frames(3), dir.path(), false, || true).unwrap_err();
        match err {
            Error::ExportPurge { path, .. } => assert!(path.ends_with("frame000001.png")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(listing(dir.path()), vec!["frame000001.png"]);
    }
}
