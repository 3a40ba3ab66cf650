use crate::domain::models::{FileContext, FileSelection, RuleSet};
use log::{debug, info};
use std::path::Path;

/// Decides whether a file is eligible under `rules`.
///
/// `path` is relative to the walk root: every one of its segments is checked
/// against the excluded directory names.
pub fn is_included(path: &Path, rules: &RuleSet) -> bool {
    let extension_allowed = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| rules.allowed_extensions.contains(&format!(".{}", e)))
        .unwrap_or(false);
    if !extension_allowed {
        return false;
    }

    let file_excluded = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| rules.excluded_files.contains(n))
        .unwrap_or(false);
    if file_excluded {
        return false;
    }

    !path.components().any(|segment| {
        segment
            .as_os_str()
            .to_str()
            .map(|s| rules.excluded_dirs.contains(s))
            .unwrap_or(false)
    })
}

/// Path of `path` relative to `root`, always with `/` separators.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reads every selected file, silently dropping the ones that cannot be read.
///
/// Returns the loaded files in selection order and the number skipped.
pub fn select_files(
    root: &Path,
    selection: &FileSelection,
    file_reader: impl Fn(&Path) -> std::io::Result<String>,
) -> (Vec<FileContext>, usize) {
    debug!("Loading {} selected files", selection.len());

    let mut selected_files = Vec::with_capacity(selection.len());
    let mut skipped = 0;
    for path in selection {
        match file_reader(path) {
            Ok(content) => selected_files.push(FileContext {
                path: path.clone(),
                relative_path: relative_display(root, path),
                content,
            }),
            Err(e) => {
                debug!("Skipping unreadable file {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }

    info!(
        "Loaded {} files ({} skipped)",
        selected_files.len(),
        skipped
    );
    (selected_files, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::path::PathBuf;

    fn rules() -> RuleSet {
        RuleSet::new(
            [".py", ".js", ".ts"],
            ["vendor", ".git", "node_modules"],
            [".env", "README.md", "secrets.py"],
        )
    }

    #[test]
    fn test_allowed_extension_is_included() {
        assert!(is_included(Path::new("a.py"), &rules()));
        assert!(is_included(Path::new("src/app/main.ts"), &rules()));
    }

    #[test]
    fn test_extension_outside_rules_is_excluded() {
        assert!(!is_included(Path::new("b.txt"), &rules()));
        assert!(!is_included(Path::new("Makefile"), &rules()));
        // Matching is case-sensitive.
        assert!(!is_included(Path::new("LEGACY.PY"), &rules()));
    }

    #[test]
    fn test_extension_needs_leading_dot_in_rules() {
        let rules = RuleSet::new(["py"], [], []);
        assert!(!is_included(Path::new("a.py"), &rules));
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        let rules = RuleSet::new([".env"], [], []);
        assert!(!is_included(Path::new(".env"), &rules));
    }

    #[test]
    fn test_excluded_file_name_wins_over_extension() {
        assert!(!is_included(Path::new("secrets.py"), &rules()));
        assert!(!is_included(Path::new("deep/dir/secrets.py"), &rules()));
    }

    #[test]
    fn test_excluded_directory_segment() {
        assert!(!is_included(Path::new("vendor/lib.js"), &rules()));
        assert!(!is_included(Path::new("web/node_modules/x/index.js"), &rules()));
        assert!(is_included(Path::new("vendored/lib.js"), &rules()));
    }

    #[test]
    fn test_empty_rule_set_includes_nothing() {
        assert!(!is_included(Path::new("a.py"), &RuleSet::default()));
    }

    #[test]
    fn test_relative_display_uses_forward_slashes() {
        let root = Path::new("/work/demo");
        let path = root.join("src").join("pkg").join("mod.py");
        assert_eq!(relative_display(root, &path), "src/pkg/mod.py");
    }

    #[test]
    fn test_select_files_skips_read_errors() {
        let root = PathBuf::from("/p");
        let mut contents = HashMap::new();
        contents.insert(root.join("a.py"), "print(1)".to_string());
        contents.insert(root.join("c.py"), "print(3)".to_string());

        let selection: FileSelection = ["a.py", "b.py", "c.py"]
            .iter()
            .map(|f| root.join(f))
            .collect();

        let reader = |path: &Path| -> io::Result<String> {
            contents
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        };

        let (files, skipped) = select_files(&root, &selection, reader);

        assert_eq!(skipped, 1);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].relative_path, "a.py");
        assert_eq!(files[1].relative_path, "c.py");
        assert_eq!(files[1].content, "print(3)");
    }

    #[test]
    fn test_select_files_with_empty_input() {
        let reader = |_: &Path| -> io::Result<String> { Ok(String::new()) };
        let (files, skipped) = select_files(Path::new("/p"), &FileSelection::new(), reader);
        assert!(files.is_empty());
        assert_eq!(skipped, 0);
    }
}
