use std::io;

use brood::config::{BroodConfig, LogFormat};
use brood::coordinator::Coordinator;
use brood::logging;

fn main() -> anyhow::Result<()> {
    let config = BroodConfig::from_env()?;

    match config.log_format {
        LogFormat::Text => logging::init_default(),
        LogFormat::Json => logging::init_production(),
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Task failures are reported, not fatal: the exit status stays 0.
    Coordinator::new(config).run(&mut out)?;
    Ok(())
}
