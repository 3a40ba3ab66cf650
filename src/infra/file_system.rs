use crate::core::file_selector::is_included;
use crate::domain::error::{PackError, Result};
use crate::domain::models::{FileSelection, RuleSet};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_excluded_dir(entry: &DirEntry, rules: &RuleSet) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| rules.excluded_dirs.contains(name))
            .unwrap_or(false)
}

/// Regular files, plus symlinks whose target is a regular file.
fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

/// Walks `root` and selects every regular file allowed by `rules`.
///
/// Excluded directories are pruned rather than descended into. Symlinked
/// files are selected under their link path; symlinked directories are not
/// descended into.
pub fn collect_default_selection(root: &Path, rules: &RuleSet) -> FileSelection {
    info!("Collecting files in: {}", root.display());
    debug!("Allowed extensions: {:?}", rules.allowed_extensions);
    debug!("Excluded dirs: {:?}", rules.excluded_dirs);
    debug!("Excluded files: {:?}", rules.excluded_files);

    let mut selection = FileSelection::new();
    let mut scanned = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, rules));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !is_regular_file(&entry) {
            continue;
        }

        scanned += 1;
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if is_included(relative, rules) {
            debug!("Found matching file: {}", relative.display());
            selection.insert(path.to_path_buf());
        }
    }

    info!(
        "Selected {} of {} files",
        selection.len(),
        scanned
    );
    selection
}

/// Reads a file as text, replacing invalid UTF-8 sequences.
pub fn read_file_contents(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn canonical_dir(path: &Path) -> Option<PathBuf> {
    let canonical = fs::canonicalize(path).ok()?;
    canonical.is_dir().then_some(canonical)
}

/// Canonical form of the source folder, or `InvalidRoot`.
pub fn validate_root(path: &Path) -> Result<PathBuf> {
    canonical_dir(path).ok_or_else(|| PackError::InvalidRoot {
        path: path.to_path_buf(),
    })
}

/// Canonical form of the destination folder, or `InvalidDestination`.
pub fn validate_destination(path: &Path) -> Result<PathBuf> {
    canonical_dir(path).ok_or_else(|| PackError::InvalidDestination {
        path: path.to_path_buf(),
    })
}

/// Turns a caller-supplied file list into a selection under `root`.
///
/// Relative entries are resolved against `root`. Every entry must exist, be a
/// regular file and lie inside `root`.
pub fn resolve_explicit_files<P: AsRef<Path>>(root: &Path, files: &[P]) -> Result<FileSelection> {
    let mut selection = FileSelection::new();

    for file in files {
        let file = file.as_ref();
        let candidate = if file.is_absolute() {
            file.to_path_buf()
        } else {
            root.join(file)
        };

        let canonical = fs::canonicalize(&candidate)
            .ok()
            .filter(|p| p.is_file())
            .ok_or_else(|| PackError::MissingFile {
                path: candidate.clone(),
            })?;

        if !canonical.starts_with(root) {
            return Err(PackError::OutsideRoot {
                path: candidate,
                root: root.to_path_buf(),
            });
        }

        if !selection.insert(canonical) {
            debug!("Ignoring duplicate selection: {}", file.display());
        }
    }

    info!("Using {} explicitly selected files", selection.len());
    Ok(selection)
}
