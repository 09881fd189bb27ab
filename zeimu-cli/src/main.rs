use anyhow::Context;
use clap::Parser;
use tracing::debug;

use zeimu_cli::{Cli, logging};
use zeimu_data::CalculatorConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CalculatorConfig::load(path)
            .with_context(|| format!("cannot load config '{}'", path.display()))?,
        None => CalculatorConfig::default(),
    };

    let filter = logging::make_filter(&config.log.level, cli.verbose)?;
    let log_file = cli.log_file.as_deref().or(config.log.file.as_deref());
    logging::init(filter, log_file)?;

    debug!(command = ?cli.command, "starting");

    let output = zeimu_cli::run(&cli.command, &config)?;
    print!("{output}");

    Ok(())
}
