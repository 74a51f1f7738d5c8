//! Writing session contents out: loose files on disk or a zip archive.
//!
//! Loose files are staged through a named temporary file in the target
//! directory and only persisted after the full entry has been written, so
//! a failed extraction never leaves a partial file behind. Files persisted
//! by earlier iterations of the same call do stay on disk.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bon::Builder;
use enf_pak::PakArchive;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{Error, Result};
use crate::session::PakSession;

/// Options shared by all extraction entry points.
#[derive(Debug, Clone, Default, Builder)]
pub struct ExtractOptions {
    /// Replace files that already exist at the destination.
    #[builder(default)]
    pub overwrite: bool,
    /// Checked between entries; raising it aborts with
    /// [`Error::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ExtractOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|cancel| cancel.load(Ordering::Relaxed))
    }
}

/// Progress report emitted after each written entry.
#[derive(Debug, Clone)]
pub struct ExtractProgress {
    /// Entries written so far, this one included.
    pub current: usize,
    pub total: usize,
    pub path: String,
}

/// Extract every file of the session under `dest`, mirroring the tree
/// layout. Returns the number of files written.
pub fn extract_all(session: &mut PakSession, dest: &Path, options: &ExtractOptions) -> Result<usize> {
    extract_all_with(session, dest, options, |_| {})
}

/// [`extract_all`] with a progress callback.
#[instrument(skip_all, fields(dest = %dest.display()), err)]
pub fn extract_all_with(
    session: &mut PakSession,
    dest: &Path,
    options: &ExtractOptions,
    mut progress: impl FnMut(ExtractProgress),
) -> Result<usize> {
    let files = session.files();
    let total = files.len();
    let mut written = 0;

    for (path, file) in files {
        if options.is_cancelled() {
            return Err(Error::Cancelled { written });
        }
        let target = dest.join(&path);
        let bytes = session.read_file(file)?;
        persist_bytes(&bytes, &target, options)?;
        written += 1;
        debug!(%path, size = bytes.len(), "extracted");
        progress(ExtractProgress {
            current: written,
            total,
            path,
        });
    }

    Ok(written)
}

/// Extract one entry of an archive to `dest`.
#[instrument(skip(archive, options), err)]
pub fn extract_entry<R: Read + Seek>(
    archive: &mut PakArchive<R>,
    index: usize,
    dest: &Path,
    options: &ExtractOptions,
) -> Result<()> {
    let bytes = archive.read_entry(index)?;
    persist_bytes(&bytes, dest, options)
}

/// Write the session as a zip archive, entry names matching the tree
/// paths. Returns the number of entries written.
pub fn export_zip<W: Write + Seek>(
    session: &mut PakSession,
    writer: W,
    options: &ExtractOptions,
) -> Result<usize> {
    export_zip_with(session, writer, options, |_| {})
}

/// [`export_zip`] with a progress callback.
#[instrument(skip_all, err)]
pub fn export_zip_with<W: Write + Seek>(
    session: &mut PakSession,
    writer: W,
    options: &ExtractOptions,
    mut progress: impl FnMut(ExtractProgress),
) -> Result<usize> {
    let files = session.files();
    let total = files.len();
    let zip_options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(writer);
    let mut written = 0;
    for (path, file) in files {
        if options.is_cancelled() {
            return Err(Error::Cancelled { written });
        }
        let bytes = session.read_file(file)?;
        zip.start_file(path.clone(), zip_options)?;
        zip.write_all(&bytes)?;
        written += 1;
        debug!(%path, size = bytes.len(), "added to zip");
        progress(ExtractProgress {
            current: written,
            total,
            path,
        });
    }
    zip.finish()?;

    Ok(written)
}

/// Stage `bytes` next to `target` and move them into place.
fn persist_bytes(bytes: &[u8], target: &Path, options: &ExtractOptions) -> Result<()> {
    if !options.overwrite && target.exists() {
        return Err(Error::DestinationExists(target.to_path_buf()));
    }

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Staged in the target directory so the final rename stays on one
    // filesystem.
    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    staged
        .persist(target)
        .map_err(|error| Error::IOError(error.error))?;
    Ok(())
}

/// A background extraction with progress reporting and cancellation.
///
/// The session moves into the worker thread; [`ExtractTask::join`] returns
/// the written-entry count once the thread finishes.
#[derive(Debug)]
pub struct ExtractTask {
    handle: JoinHandle<Result<usize>>,
    progress: Receiver<ExtractProgress>,
    cancel: Arc<AtomicBool>,
}

impl ExtractTask {
    /// Run [`extract_all`] on a background thread.
    pub fn spawn_all(mut session: PakSession, dest: PathBuf, options: ExtractOptions) -> Self {
        let (options, cancel) = with_cancel(options);
        let (sender, progress) = mpsc::channel();
        let handle = thread::spawn(move || {
            extract_all_with(&mut session, &dest, &options, move |report| {
                let _ = sender.send(report);
            })
        });
        ExtractTask {
            handle,
            progress,
            cancel,
        }
    }

    /// Run [`export_zip`] to a new file at `dest` on a background thread.
    pub fn spawn_zip(mut session: PakSession, dest: PathBuf, options: ExtractOptions) -> Self {
        let (options, cancel) = with_cancel(options);
        let (sender, progress) = mpsc::channel();
        let handle = thread::spawn(move || {
            if !options.overwrite && dest.exists() {
                return Err(Error::DestinationExists(dest));
            }
            if let Some(parent) = dest.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let writer = BufWriter::new(File::create(&dest)?);
            export_zip_with(&mut session, writer, &options, move |report| {
                let _ = sender.send(report);
            })
        });
        ExtractTask {
            handle,
            progress,
            cancel,
        }
    }

    /// Progress reports, one per written entry.
    pub fn progress(&self) -> &Receiver<ExtractProgress> {
        &self.progress
    }

    /// Ask the worker to stop before its next entry.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Wait for the worker and return its written-entry count.
    pub fn join(self) -> Result<usize> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(Error::IOError(io::Error::new(
                io::ErrorKind::Other,
                "extraction worker panicked",
            ))),
        }
    }
}

/// Ensure the options carry a cancellation flag the task can expose.
fn with_cancel(mut options: ExtractOptions) -> (ExtractOptions, Arc<AtomicBool>) {
    let cancel = options
        .cancel
        .clone()
        .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
    options.cancel = Some(Arc::clone(&cancel));
    (options, cancel)
}
