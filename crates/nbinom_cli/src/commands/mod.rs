//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod check;
pub mod sample;
pub mod state;

use nbinom_sampler::{Config, NegativeBinomial, Options};

use crate::config::CliConfig;
use crate::{CliError, Result};

/// Resolves `(r, p)` from flags, falling back to the configuration.
///
/// Returns `None` when neither source sets both parameters.
pub(crate) fn resolve_params(
    config: &CliConfig,
    r: Option<f64>,
    p: Option<f64>,
) -> Result<Option<(f64, f64)>> {
    match (r.or(config.r), p.or(config.p)) {
        (Some(r), Some(p)) => Ok(Some((r, p))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(CliError::InvalidArgument(
            "`r` is set but `p` is missing".to_string(),
        )),
        (None, Some(_)) => Err(CliError::InvalidArgument(
            "`p` is set but `r` is missing".to_string(),
        )),
    }
}

/// Builds a managed generator from the configuration.
pub(crate) fn build_generator(
    config: &CliConfig,
    params: Option<(f64, f64)>,
) -> Result<NegativeBinomial> {
    let mut options = Options::new();
    if let Some(seed) = config.seed {
        options = options.seed(seed);
    }
    let generator_config = match params {
        Some((r, p)) => Config::bound(r, p),
        None => Config::Unbound,
    };
    Ok(NegativeBinomial::new(generator_config.with_options(options))?)
}
