use crate::core::file_selector::select_files;
use crate::domain::models::{
    ContextOutput, FileSelection, FormatOptions, RenderedDocument, Segment,
};
use chrono::NaiveDate;
use log::debug;
use std::path::Path;

const PROJECT_LABEL: &str = "Project";
const CHARS_PER_TOKEN: usize = 4;
const PREVIEW_RULE_WIDTH: usize = 40;

/// Crude token estimate: one token per four characters, rounded down.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

/// Code fence language for a file, empty when the extension is not known.
pub fn language_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => "python",
        Some("js") => "javascript",
        Some("ts") => "typescript",
        Some("php") => "php",
        Some("html") => "html",
        Some("css") => "css",
        _ => "",
    }
}

pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads the selection and lays it out as a sequence of segments.
pub fn build_document(
    root: &Path,
    selection: &FileSelection,
    options: &FormatOptions,
    date: NaiveDate,
    file_reader: impl Fn(&Path) -> std::io::Result<String>,
) -> RenderedDocument {
    build_named_document(project_name(root), root, selection, options, date, file_reader)
}

/// Like [`build_document`], with the project name supplied by the caller.
pub fn build_named_document(
    project_name: String,
    root: &Path,
    selection: &FileSelection,
    options: &FormatOptions,
    date: NaiveDate,
    file_reader: impl Fn(&Path) -> std::io::Result<String>,
) -> RenderedDocument {
    let (files, skipped_files) = select_files(root, selection, file_reader);

    let mut segments = Vec::with_capacity(1 + files.len() * 2);
    segments.push(Segment::ProjectHeader {
        project_name: project_name.clone(),
        date,
    });

    for file in &files {
        debug!(
            "Adding file {} ({} bytes)",
            file.relative_path,
            file.content.len()
        );
        if options.include_heading {
            segments.push(Segment::FileHeading {
                relative_path: file.relative_path.clone(),
            });
        }
        if options.fenced() {
            segments.push(Segment::FencedContent {
                language: language_for(&file.path),
                content: file.content.clone(),
            });
        } else {
            segments.push(Segment::Content(file.content.clone()));
        }
    }

    RenderedDocument {
        project_name,
        date,
        segments,
        included_files: files.len(),
        skipped_files,
    }
}

pub fn format_output(document: &RenderedDocument) -> String {
    let mut result = String::new();

    for segment in &document.segments {
        match segment {
            Segment::ProjectHeader { project_name, date } => {
                result.push_str(&format!(
                    "{}: {} - {}\n\n",
                    PROJECT_LABEL,
                    project_name,
                    date.format("%Y%m%d")
                ));
            }
            Segment::FileHeading { relative_path } => {
                result.push_str(&format!("## {}\n", relative_path));
            }
            Segment::Content(content) => {
                result.push_str(content);
                result.push_str("\n\n");
            }
            Segment::FencedContent { language, content } => {
                result.push_str(&format!("```{}\n{}\n```\n\n", language, content));
            }
        }
    }

    result
}

/// Assembles the full document for `selection` and estimates its size.
pub fn build_context_output(
    root: &Path,
    selection: &FileSelection,
    options: &FormatOptions,
    date: NaiveDate,
    file_reader: impl Fn(&Path) -> std::io::Result<String>,
) -> ContextOutput {
    let document = build_document(root, selection, options, date, file_reader);
    finish_output(document)
}

pub fn build_named_context_output(
    project_name: String,
    root: &Path,
    selection: &FileSelection,
    options: &FormatOptions,
    date: NaiveDate,
    file_reader: impl Fn(&Path) -> std::io::Result<String>,
) -> ContextOutput {
    let document =
        build_named_document(project_name, root, selection, options, date, file_reader);
    finish_output(document)
}

fn finish_output(document: RenderedDocument) -> ContextOutput {
    let text = format_output(&document);
    let token_count = estimate_tokens(&text);

    debug!(
        "Assembled {} files into {} characters (~{} tokens)",
        document.included_files,
        text.len(),
        token_count
    );

    ContextOutput {
        document,
        text,
        token_count,
    }
}

pub fn format_preview(output: &ContextOutput) -> String {
    format!(
        "Token estimate: {}\n{}\n{}",
        output.token_count,
        "=".repeat(PREVIEW_RULE_WIDTH),
        output.text
    )
}
