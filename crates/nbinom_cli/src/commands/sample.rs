//! Sample command implementation

use std::io::Write;
use std::path::Path;

use nbinom_sampler::{GeneratorJson, NegativeBinomial};
use tracing::{debug, info};

use super::{build_generator, resolve_params};
use crate::config::CliConfig;
use crate::{CliError, Result};

/// Run the sample command
///
/// With `record`, the generator is revived from a serialised generator and
/// `r`/`p` (when given) override its bound parameters for these draws.
pub fn run(
    config: &CliConfig,
    r: Option<f64>,
    p: Option<f64>,
    count: Option<usize>,
    record: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let count = count.unwrap_or(config.count);
    let params = resolve_params(config, r, p)?;

    let draws = match record {
        Some(path) => {
            let mut rng = load_record(path)?;
            match (params, rng.params()) {
                (Some((r, p)), _) => {
                    nbinom_sampler::validate(r, p)?;
                    (0..count).map(|_| rng.sample_with(r, p)).collect::<Vec<_>>()
                }
                (None, Some(_)) => rng.samples(count),
                (None, None) => return Err(missing_params()),
            }
        }
        None => {
            let params = params.ok_or_else(missing_params)?;
            build_generator(config, Some(params))?.samples(count)
        }
    };

    info!(count = draws.len(), "Sampling complete");
    for v in draws {
        writeln!(out, "{}", v)?;
    }
    Ok(())
}

/// Revives a generator from a serialised generator file
pub(crate) fn load_record(path: &Path) -> Result<NegativeBinomial> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    let record: GeneratorJson = serde_json::from_str(&text)?;
    debug!(path = %path.display(), params = ?record.params, "Loaded generator record");
    Ok(NegativeBinomial::from_json(&record)?)
}

fn missing_params() -> CliError {
    CliError::InvalidArgument("both `r` and `p` are required".to_string())
}
