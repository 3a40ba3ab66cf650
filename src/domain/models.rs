use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::collections::btree_set;
use std::path::{Path, PathBuf};

/// Extension and exclusion policy deciding which files are eligible.
///
/// Extensions carry their leading dot (`.py`). All matching is exact and
/// case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub allowed_extensions: BTreeSet<String>,
    pub excluded_dirs: BTreeSet<String>,
    pub excluded_files: BTreeSet<String>,
}

impl RuleSet {
    pub fn new<I, J, K, S>(allowed_extensions: I, excluded_dirs: J, excluded_files: K) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_extensions: allowed_extensions.into_iter().map(Into::into).collect(),
            excluded_dirs: excluded_dirs.into_iter().map(Into::into).collect(),
            excluded_files: excluded_files.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub as_markdown: bool,
    pub include_heading: bool,
    /// Only honoured when `as_markdown` is set.
    pub use_code_block: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            as_markdown: true,
            include_heading: true,
            use_code_block: true,
        }
    }
}

impl FormatOptions {
    pub fn fenced(&self) -> bool {
        self.as_markdown && self.use_code_block
    }

    pub fn file_extension(&self) -> &'static str {
        if self.as_markdown { "md" } else { "txt" }
    }
}

/// Deduplicated set of absolute file paths, iterated in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: BTreeSet<PathBuf>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the path was already selected.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.files.insert(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, PathBuf> {
        self.files.iter()
    }
}

impl FromIterator<PathBuf> for FileSelection {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileSelection {
    type Item = &'a PathBuf;
    type IntoIter = btree_set::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// A file that was read successfully and is ready to be rendered.
#[derive(Debug, Clone)]
pub struct FileContext {
    pub path: PathBuf,
    pub relative_path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    ProjectHeader { project_name: String, date: NaiveDate },
    FileHeading { relative_path: String },
    Content(String),
    FencedContent { language: &'static str, content: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub project_name: String,
    pub date: NaiveDate,
    pub segments: Vec<Segment>,
    pub included_files: usize,
    pub skipped_files: usize,
}

#[derive(Debug, Clone)]
pub struct ContextOutput {
    pub document: RenderedDocument,
    pub text: String,
    pub token_count: usize,
}

impl ContextOutput {
    /// `<project>-<YYYYMMDD>.<md|txt>`
    pub fn file_name(&self, options: &FormatOptions) -> String {
        format!(
            "{}-{}.{}",
            self.document.project_name,
            self.document.date.format("%Y%m%d"),
            options.file_extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_requires_markdown() {
        let options = FormatOptions {
            as_markdown: false,
            include_heading: true,
            use_code_block: true,
        };
        assert!(!options.fenced());
        assert_eq!(options.file_extension(), "txt");
        assert!(FormatOptions::default().fenced());
    }

    #[test]
    fn test_selection_deduplicates_and_sorts() {
        let mut selection = FileSelection::new();
        assert!(selection.insert(PathBuf::from("/p/src/b.py")));
        assert!(selection.insert(PathBuf::from("/p/a.py")));
        assert!(!selection.insert(PathBuf::from("/p/a.py")));
        assert!(selection.contains(Path::new("/p/a.py")));
        assert_eq!(selection.len(), 2);

        let paths: Vec<_> = selection.iter().cloned().collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/p/a.py"), PathBuf::from("/p/src/b.py")]
        );
    }

    #[test]
    fn test_output_file_name() {
        let output = ContextOutput {
            document: RenderedDocument {
                project_name: "demo".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
                segments: Vec::new(),
                included_files: 0,
                skipped_files: 0,
            },
            text: String::new(),
            token_count: 0,
        };

        assert_eq!(output.file_name(&FormatOptions::default()), "demo-20240307.md");
        let text = FormatOptions {
            as_markdown: false,
            ..FormatOptions::default()
        };
        assert_eq!(output.file_name(&text), "demo-20240307.txt");
    }
}
