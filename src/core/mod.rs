pub mod context_generator;
pub mod file_selector;
pub mod packer;
