use env_logger::Builder;
use log::{Level, debug};
use std::io::Write;

pub const LOG_LEVEL_ENV: &str = "PROMPTPACK_LOG_LEVEL";

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Filter directives for a `-v` count.
///
/// Dependencies stay at `warn` once `-v` is given; only this crate's modules
/// go down to `info` and `debug`.
fn filter_for(verbosity: u8) -> String {
    match verbosity {
        0 => "error".to_string(),
        1 => "warn".to_string(),
        2 => format!("warn,{}=info", CRATE_TARGET),
        _ => format!("warn,{}=debug", CRATE_TARGET),
    }
}

/// `promptpack::core::packer` → `core::packer`; foreign targets unchanged.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix(CRATE_TARGET)
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(target)
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Error => "31",
        Level::Warn => "33",
        Level::Info => "32",
        Level::Debug => "36",
        Level::Trace => "35",
    }
}

pub fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let default_filter = filter_for(verbosity);
    let env = env_logger::Env::default().filter_or(LOG_LEVEL_ENV, default_filter.as_str());

    Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "\x1B[{}m[{}]\x1B[0m [{}] {}: {}",
                level_color(record.level()),
                record.level(),
                buf.timestamp(),
                short_target(record.target()),
                record.args()
            )
        })
        .format_timestamp_secs()
        .try_init()?;

    debug!("Logger initialised with filter {:?}", default_filter);
    Ok(())
}
