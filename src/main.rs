use promptpack::cli::commands::run;

fn main() -> anyhow::Result<()> {
    run()
}
