//! A set of opened archives merged into one browsable tree.

use std::fs::File;
use std::path::{Path, PathBuf};

use bon::Builder;
use enf_pak::PakArchive;
use enf_script::ParsedScript;
use indexmap::IndexMap;
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::tree::{FileRef, PakNode, TreeBuilder, TreeConflict};

/// Whether `.c` entries are parsed as scripts when an archive is added.
///
/// Parsing can also be run later with [`PakSession::parse_scripts`], so
/// loading with [`ScriptParsing::Disabled`] loses nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptParsing {
    #[default]
    Disabled,
    Enabled,
}

/// Options controlling session behaviour.
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct SessionOptions {
    #[builder(default)]
    pub parsing: ScriptParsing,
}

/// One archive opened into a session.
#[derive(Debug)]
pub struct LoadedArchive {
    label: String,
    path: PathBuf,
    archive: PakArchive<File>,
}

impl LoadedArchive {
    /// Top-level directory name this archive's entries live under.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn archive(&self) -> &PakArchive<File> {
        &self.archive
    }

    pub fn archive_mut(&mut self) -> &mut PakArchive<File> {
        &mut self.archive
    }
}

/// A loaded set of archives, one merged tree over all of their entries and
/// the scripts parsed out of them.
///
/// Each archive's entries sit under a top-level directory named after the
/// archive's file stem; a second archive with the same stem gets a `_2`
/// suffix (then `_3`, …), so the same entry path in two archives is never
/// a conflict.
#[derive(Debug, Default)]
pub struct PakSession {
    options: SessionOptions,
    archives: Vec<LoadedArchive>,
    tree: TreeBuilder,
    scripts: IndexMap<String, ParsedScript>,
}

impl PakSession {
    pub fn new(options: SessionOptions) -> Self {
        PakSession {
            options,
            ..PakSession::default()
        }
    }

    /// Open every archive in `paths` into one session. Fails on the first
    /// archive that cannot be opened, naming it.
    #[instrument(skip_all, fields(archives = paths.len()), err)]
    pub fn load<P: AsRef<Path>>(paths: &[P], options: SessionOptions) -> Result<PakSession> {
        let mut session = PakSession::new(options);
        for path in paths {
            session.add_archive(path)?;
        }
        Ok(session)
    }

    /// Open one more archive into the session, returning its index. On
    /// failure the session is left exactly as it was.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn add_archive<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let archive = PakArchive::open(path).map_err(|source| Error::Archive {
            path: path.to_path_buf(),
            source,
        })?;

        let label = self.unique_label(path);
        let id = self.archives.len();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        for (entry, name) in names.iter().enumerate() {
            self.tree
                .insert(&format!("{label}/{name}"), FileRef { archive: id, entry });
        }
        debug!(%label, entries = names.len(), "archive merged into tree");

        self.archives.push(LoadedArchive {
            label,
            path: path.to_path_buf(),
            archive,
        });
        if self.options.parsing == ScriptParsing::Enabled {
            self.parse_archive_scripts(id);
        }
        Ok(id)
    }

    fn unique_label(&self, path: &Path) -> String {
        let stem = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => "pak".to_string(),
        };
        if !self.archives.iter().any(|a| a.label == stem) {
            return stem;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{stem}_{n}");
            if !self.archives.iter().any(|a| a.label == candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn archives(&self) -> &[LoadedArchive] {
        &self.archives
    }

    pub fn archive_mut(&mut self, id: usize) -> Option<&mut LoadedArchive> {
        self.archives.get_mut(id)
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Top-level nodes of the merged tree, one per archive label.
    pub fn tree(&self) -> &IndexMap<String, PakNode> {
        self.tree.root()
    }

    /// Paths that lost a collision while merging.
    pub fn conflicts(&self) -> &[TreeConflict] {
        self.tree.conflicts()
    }

    /// Look up a tree node by full path, label included.
    pub fn node(&self, path: &str) -> Option<&PakNode> {
        self.tree.get(path)
    }

    /// Every file in the tree with its full path.
    pub fn files(&self) -> Vec<(String, FileRef)> {
        self.tree.files()
    }

    /// Total number of files in the tree.
    pub fn file_count(&self) -> usize {
        self.tree.file_count()
    }

    /// Scripts parsed from `.c` entries, keyed by tree path.
    pub fn scripts(&self) -> &IndexMap<String, ParsedScript> {
        &self.scripts
    }

    pub fn script(&self, path: &str) -> Option<&ParsedScript> {
        self.scripts.get(path)
    }

    /// Materialize one file's bytes.
    ///
    /// # Panics
    ///
    /// Panics if `file` does not refer to an archive of this session.
    /// [`FileRef`]s obtained from this session's tree are always valid.
    pub fn read_file(&mut self, file: FileRef) -> Result<Vec<u8>> {
        let loaded = &mut self.archives[file.archive];
        loaded
            .archive
            .read_entry(file.entry)
            .map_err(|source| Error::Archive {
                path: loaded.path.clone(),
                source,
            })
    }

    /// Parse every `.c` entry in the session from scratch, replacing any
    /// previously parsed scripts. Returns the number of scripts parsed.
    /// Unreadable entries are skipped with a warning.
    #[instrument(skip_all)]
    pub fn parse_scripts(&mut self) -> usize {
        self.scripts.clear();
        for id in 0..self.archives.len() {
            self.parse_archive_scripts(id);
        }
        self.scripts.len()
    }

    fn parse_archive_scripts(&mut self, id: usize) {
        let loaded = &mut self.archives[id];
        let label = loaded.label.clone();
        let scripts: Vec<(usize, String)> = loaded
            .archive
            .file_names()
            .enumerate()
            .filter(|(_, name)| is_script_path(name))
            .map(|(entry, name)| (entry, name.to_string()))
            .collect();

        for (entry, name) in scripts {
            let bytes = match loaded.archive.read_entry(entry) {
                Ok(bytes) => bytes,
                Err(error) => {
                    warn!(%error, entry = %name, "skipping unreadable script entry");
                    continue;
                }
            };
            let source = String::from_utf8_lossy(&bytes);
            let parsed = enf_script::parse(&source);
            if !parsed.diagnostics.is_empty() {
                warn!(
                    entry = %name,
                    diagnostics = parsed.diagnostics.len(),
                    "script parsed with diagnostics"
                );
            }
            self.scripts.insert(format!("{label}/{name}"), parsed);
        }
    }
}

fn is_script_path(name: &str) -> bool {
    let Some((_, extension)) = name.rsplit_once('.') else {
        return false;
    };
    extension.eq_ignore_ascii_case("c")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn script_paths_match_case_insensitively() {
        assert!(is_script_path("scripts/world.c"));
        assert!(is_script_path("SCRIPTS/WORLD.C"));
        assert!(!is_script_path("scripts/world.cpp"));
        assert!(!is_script_path("scripts/world"));
        assert!(!is_script_path("config.bin"));
    }
}
