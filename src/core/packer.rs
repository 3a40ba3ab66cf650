//! Entry points for front ends: validate inputs, select, assemble, write.

use crate::core::context_generator::{build_named_context_output, project_name};
use crate::domain::error::{PackError, Result};
use crate::domain::models::{ContextOutput, FileSelection, FormatOptions, RuleSet};
use crate::infra::file_system::{
    collect_default_selection, read_file_contents, resolve_explicit_files, validate_destination,
    validate_root,
};
use crate::infra::output::write_output;
use chrono::{Local, NaiveDate};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Where the files to pack come from.
#[derive(Debug, Clone)]
pub enum SelectionSource {
    /// Walk the root and keep what the rules allow.
    Rules(RuleSet),
    /// Exactly these files, relative to the root or absolute.
    Files(Vec<PathBuf>),
}

#[derive(Debug, Clone)]
pub struct PackRequest {
    pub root: PathBuf,
    pub source: SelectionSource,
    pub options: FormatOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackReport {
    pub output_path: PathBuf,
    pub included_files: usize,
    pub skipped_files: usize,
    pub token_count: usize,
}

fn select(root: &Path, source: &SelectionSource) -> Result<FileSelection> {
    match source {
        SelectionSource::Rules(rules) => Ok(collect_default_selection(root, rules)),
        SelectionSource::Files(files) => resolve_explicit_files(root, files.as_slice()),
    }
}

/// Base name of the root as the caller spelled it, so a symlinked root keeps
/// its own name. Falls back to the resolved root for paths like `.`.
fn project_name_for(requested: &Path, root: &Path) -> String {
    requested
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| project_name(root))
}

/// Validates the root and selects files without writing anything.
pub fn resolve_selection(request: &PackRequest) -> Result<(PathBuf, FileSelection)> {
    let root = validate_root(&request.root)?;
    let selection = select(&root, &request.source)?;
    Ok((root, selection))
}

/// Assembles the document for `request` in memory.
pub fn preview(request: &PackRequest) -> Result<ContextOutput> {
    let (root, selection) = resolve_selection(request)?;
    debug!("Previewing {} files", selection.len());
    Ok(build_named_context_output(
        project_name_for(&request.root, &root),
        &root,
        &selection,
        &request.options,
        Local::now().date_naive(),
        read_file_contents,
    ))
}

/// Assembles the document and writes it into `dest` as
/// `<project>-<YYYYMMDD>.<md|txt>`, stamped with today's local date.
pub fn pack(request: &PackRequest, dest: &Path) -> Result<PackReport> {
    pack_on(request, dest, Local::now().date_naive())
}

pub fn pack_on(request: &PackRequest, dest: &Path, date: NaiveDate) -> Result<PackReport> {
    let root = validate_root(&request.root)?;
    let dest = validate_destination(dest)?;

    let selection = select(&root, &request.source)?;
    if selection.is_empty() {
        return Err(PackError::EmptySelection { root });
    }

    info!("Packing {} files from {}", selection.len(), root.display());
    let output = build_named_context_output(
        project_name_for(&request.root, &root),
        &root,
        &selection,
        &request.options,
        date,
        read_file_contents,
    );

    let file_name = output.file_name(&request.options);
    let output_path = write_output(&dest, &file_name, &output.text)?;

    Ok(PackReport {
        output_path,
        included_files: output.document.included_files,
        skipped_files: output.document.skipped_files,
        token_count: output.token_count,
    })
}
