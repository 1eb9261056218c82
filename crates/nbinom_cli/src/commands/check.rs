//! Check command implementation

use std::io::Write;

use tracing::info;

use super::{build_generator, resolve_params};
use crate::config::CliConfig;
use crate::Result;

/// Run the check command
///
/// Validates the parameters (if any) and confirms a generator can be built
/// from the effective configuration.
pub fn run(config: &CliConfig, r: Option<f64>, p: Option<f64>, out: &mut impl Write) -> Result<()> {
    info!("Checking configuration");
    let params = resolve_params(config, r, p)?;
    let rng = build_generator(config, params)?;

    writeln!(out, "log_level:    {}", config.log_level)?;
    writeln!(out, "seed:         {:?}", config.seed)?;
    match params {
        Some((r, p)) => writeln!(out, "params:       r = {}, p = {}", r, p)?,
        None => writeln!(out, "params:       unbound")?,
    }
    writeln!(
        out,
        "state_length: {}",
        rng.state_length().unwrap_or_default()
    )?;
    writeln!(out, "OK")?;
    Ok(())
}
