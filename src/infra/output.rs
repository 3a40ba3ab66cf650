use crate::domain::error::{PackError, Result};
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait OutputWriter {
    fn write(&self, content: &str) -> Result<()>;
}

/// Writes through a temporary file in the target directory, then renames it
/// over the target. An existing file is replaced.
pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, content: &str) -> Result<()> {
        debug!("Writing output to file: {}", self.path.display());
        write_atomic(&self.path, content.as_bytes())?;
        info!("Output written to file: {}", self.path.display());
        Ok(())
    }
}

pub struct ConsoleWriter;

impl OutputWriter for ConsoleWriter {
    fn write(&self, content: &str) -> Result<()> {
        debug!("Writing output to console");
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| PackError::write("<stdout>", e))
    }
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| PackError::write(path, e))?;
    temp.write_all(bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| PackError::write(path, e))?;
    temp.persist(path)
        .map_err(|e| PackError::write(path, e.error))?;
    Ok(())
}

pub fn output_path(dest: &Path, file_name: &str) -> PathBuf {
    dest.join(file_name)
}

pub fn write_output(dest: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = output_path(dest, file_name);
    FileWriter::new(path.clone()).write(content)?;
    Ok(path)
}

pub fn print_generated(
    path: &Path,
    token_count: usize,
    included: usize,
    skipped: usize,
) -> io::Result<()> {
    let mut stdout = io::stdout();

    stdout.execute(SetForegroundColor(Color::Green))?;
    writeln!(stdout, "✓ File generated: {}", path.display())?;
    stdout.execute(ResetColor)?;
    writeln!(stdout, "  {} files, ~{} tokens", included, token_count)?;

    if skipped > 0 {
        stdout.execute(SetForegroundColor(Color::Yellow))?;
        writeln!(stdout, "  {} unreadable files skipped", skipped)?;
        stdout.execute(ResetColor)?;
    }
    Ok(())
}
