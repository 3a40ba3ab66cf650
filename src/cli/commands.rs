use crate::core::context_generator::format_preview;
use crate::core::file_selector::relative_display;
use crate::core::packer::{PackRequest, SelectionSource, pack, preview, resolve_selection};
use crate::infra::logger::setup_logger;
use crate::infra::output::{ConsoleWriter, OutputWriter, print_generated};
use crate::infra::settings::{Settings, default_settings_path, parse_list};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "promptpack")]
#[command(about = "Pack project files into a single LLM prompt document", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (defaults to promptpack_settings.json next to the executable)
    #[arg(long = "settings", global = true)]
    pub settings_file: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct RuleArgs {
    /// Allowed extensions, comma separated, with leading dot
    #[arg(long)]
    pub ext: Option<String>,

    /// Directory names to skip, comma separated
    #[arg(long)]
    pub exclude_dirs: Option<String>,

    /// File names to skip, comma separated
    #[arg(long)]
    pub exclude_files: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    #[command(flatten)]
    pub rules: RuleArgs,

    /// Pack exactly these files (comma separated, relative to --path) instead of walking
    #[arg(long)]
    pub files: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct FormatArgs {
    #[arg(long, conflicts_with = "text")]
    pub markdown: bool,

    /// Plain text output (.txt), never fenced
    #[arg(long)]
    pub text: bool,

    #[arg(long, conflicts_with = "no_heading")]
    pub heading: bool,

    #[arg(long)]
    pub no_heading: bool,

    #[arg(long, conflicts_with = "no_code_block")]
    pub code_block: bool,

    #[arg(long)]
    pub no_code_block: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the packed document into a destination folder
    Generate {
        #[arg(long)]
        path: PathBuf,

        #[arg(long)]
        dest: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// Print the packed document with its token estimate
    Preview {
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// Print the files that would be packed
    List {
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Inspect or store the persisted defaults
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the effective settings
    Show,
    /// Store the given values over the current settings
    Save {
        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        format: FormatArgs,

        #[arg(long)]
        theme: Option<String>,
    },
}

fn toggle(on: bool, off: bool, current: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        current
    }
}

fn apply_rules(settings: &mut Settings, args: &RuleArgs) {
    if let Some(ext) = &args.ext {
        settings.allowed_exts = parse_list(ext);
    }
    if let Some(dirs) = &args.exclude_dirs {
        settings.excluded_dirs = parse_list(dirs);
    }
    if let Some(files) = &args.exclude_files {
        settings.excluded_files = parse_list(files);
    }
}

fn apply_format(settings: &mut Settings, args: &FormatArgs) {
    settings.as_markdown = toggle(args.markdown, args.text, settings.as_markdown);
    settings.include_heading = toggle(args.heading, args.no_heading, settings.include_heading);
    settings.use_code_block = toggle(args.code_block, args.no_code_block, settings.use_code_block);
}

fn build_request(path: &Path, settings: &Settings, selection: &SelectionArgs) -> PackRequest {
    let source = match &selection.files {
        Some(files) => {
            SelectionSource::Files(parse_list(files).into_iter().map(PathBuf::from).collect())
        }
        None => SelectionSource::Rules(settings.rule_set()),
    };

    PackRequest {
        root: path.to_path_buf(),
        source,
        options: settings.format_options(),
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;

    let settings_path = cli.settings_file.clone().unwrap_or_else(default_settings_path);
    debug!("Using settings file {}", settings_path.display());
    let mut settings = Settings::load(&settings_path);

    match cli.command {
        Commands::Generate {
            path,
            dest,
            selection,
            format,
        } => {
            info!("Starting generate command");
            apply_rules(&mut settings, &selection.rules);
            apply_format(&mut settings, &format);

            let request = build_request(&path, &settings, &selection);
            debug!("Generate request: {:?}, dest={}", request, dest.display());

            let report = pack(&request, &dest)?;
            print_generated(
                &report.output_path,
                report.token_count,
                report.included_files,
                report.skipped_files,
            )?;
        }
        Commands::Preview {
            path,
            selection,
            format,
        } => {
            info!("Starting preview command");
            apply_rules(&mut settings, &selection.rules);
            apply_format(&mut settings, &format);

            let output = preview(&build_request(&path, &settings, &selection))?;
            ConsoleWriter.write(&format_preview(&output))?;
        }
        Commands::List { path, selection } => {
            info!("Starting list command");
            apply_rules(&mut settings, &selection.rules);

            let (root, files) = resolve_selection(&build_request(&path, &settings, &selection))?;
            let mut listing = String::new();
            for file in &files {
                listing.push_str(&relative_display(&root, file));
                listing.push('\n');
            }
            ConsoleWriter.write(&listing)?;
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                let json = serde_json::to_string_pretty(&settings)?;
                ConsoleWriter.write(&format!("{}\n", json))?;
            }
            SettingsAction::Save {
                rules,
                format,
                theme,
            } => {
                apply_rules(&mut settings, &rules);
                apply_format(&mut settings, &format);
                if theme.is_some() {
                    settings.theme = theme;
                }
                settings.save(&settings_path).with_context(|| {
                    format!("Could not save settings to {}", settings_path.display())
                })?;
                info!("Settings saved to {}", settings_path.display());
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "promptpack",
            "generate",
            "--path",
            "./src",
            "--dest",
            "./out",
            "--ext",
            ".py,.js",
            "--text",
            "--no-heading",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Generate {
                path,
                dest,
                selection,
                format,
            } => {
                assert_eq!(path, PathBuf::from("./src"));
                assert_eq!(dest, PathBuf::from("./out"));
                assert_eq!(selection.rules.ext.as_deref(), Some(".py,.js"));
                assert!(selection.files.is_none());
                assert!(format.text);
                assert!(format.no_heading);
                assert!(!format.markdown);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_conflicting_format_flags() {
        let result = Cli::try_parse_from([
            "promptpack",
            "preview",
            "--path",
            ".",
            "--markdown",
            "--text",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_save_parsing() {
        let cli = Cli::try_parse_from([
            "promptpack",
            "--settings",
            "custom.json",
            "settings",
            "save",
            "--exclude-dirs",
            "target,.git",
            "--theme",
            "dark",
        ])
        .unwrap();

        assert_eq!(cli.settings_file, Some(PathBuf::from("custom.json")));
        match cli.command {
            Commands::Settings {
                action: SettingsAction::Save { rules, theme, .. },
            } => {
                assert_eq!(rules.exclude_dirs.as_deref(), Some("target,.git"));
                assert_eq!(theme.as_deref(), Some("dark"));
            }
            _ => panic!("expected settings save"),
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings::default();
        apply_rules(
            &mut settings,
            &RuleArgs {
                ext: Some(".rs, .toml".to_string()),
                ..RuleArgs::default()
            },
        );
        apply_format(
            &mut settings,
            &FormatArgs {
                text: true,
                no_code_block: true,
                ..FormatArgs::default()
            },
        );

        assert_eq!(settings.allowed_exts, vec![".rs", ".toml"]);
        assert_eq!(settings.excluded_dirs, Settings::default().excluded_dirs);
        assert!(!settings.as_markdown);
        assert!(settings.include_heading);
        assert!(!settings.use_code_block);
    }

    #[test]
    fn test_explicit_files_bypass_rules() {
        let selection = SelectionArgs {
            files: Some("a.py, lib/b.txt".to_string()),
            ..SelectionArgs::default()
        };
        let request = build_request(Path::new("/p"), &Settings::default(), &selection);

        match request.source {
            SelectionSource::Files(files) => {
                assert_eq!(files, vec![PathBuf::from("a.py"), PathBuf::from("lib/b.txt")]);
            }
            SelectionSource::Rules(_) => panic!("expected explicit files"),
        }
    }

    #[test]
    fn test_toggle() {
        assert!(toggle(true, false, false));
        assert!(!toggle(false, true, true));
        assert!(toggle(false, false, true));
    }
}
