//! Pack a project's source files into one Markdown or plain-text document
//! suitable for pasting into an LLM prompt.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infra;

pub use crate::core::context_generator::{build_context_output, estimate_tokens, format_output};
pub use crate::core::file_selector::is_included;
pub use crate::core::packer::{PackReport, PackRequest, SelectionSource, pack, preview};
pub use crate::domain::error::{PackError, Result};
pub use crate::domain::models::{
    ContextOutput, FileSelection, FormatOptions, RenderedDocument, RuleSet,
};
pub use crate::infra::file_system::collect_default_selection;
pub use crate::infra::settings::Settings;
