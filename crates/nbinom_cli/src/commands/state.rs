//! State command implementation

use std::io::Write;
use std::path::Path;

use tracing::info;

use super::{build_generator, resolve_params};
use crate::config::CliConfig;
use crate::{CliError, Result};

/// Run the state command
///
/// Builds a generator, consumes `skip` draws, then writes its serialised
/// form to `output` or `out`.
pub fn run(
    config: &CliConfig,
    r: Option<f64>,
    p: Option<f64>,
    skip: usize,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let params = resolve_params(config, r, p)?;
    let mut rng = build_generator(config, params)?;
    if skip > 0 {
        let (r, p) = params.ok_or_else(|| {
            CliError::InvalidArgument("`--skip` needs `r` and `p`".to_string())
        })?;
        for _ in 0..skip {
            rng.sample_with(r, p);
        }
    }

    let record = rng
        .to_json()
        .ok_or_else(|| CliError::InvalidArgument("generator has no state".to_string()))?;
    let json = serde_json::to_string_pretty(&record)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!(path = %path.display(), skip, "Generator state written");
        }
        None => writeln!(out, "{}", json)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbinom_sampler::{GeneratorJson, NegativeBinomial};

    #[test]
    fn test_state_to_stdout() {
        let config = CliConfig {
            seed: Some(7),
            ..CliConfig::default()
        };
        let mut buf = Vec::new();
        run(&config, Some(2.0), Some(0.4), 3, None, &mut buf).unwrap();
        let record: GeneratorJson = serde_json::from_slice(&buf).unwrap();
        assert_eq!(record.record_type, "PRNG");
        assert_eq!(record.name, "negative-binomial");
        assert_eq!(record.params, vec![2.0, 0.4]);
        assert_eq!(record.state.data.len(), 631);
    }

    #[test]
    fn test_state_to_file_resumes_stream() {
        let config = CliConfig {
            seed: Some(7),
            ..CliConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rng.json");
        run(&config, Some(2.0), Some(0.4), 3, Some(path.as_path()), &mut Vec::new()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let record: GeneratorJson = serde_json::from_str(&text).unwrap();
        let mut revived = NegativeBinomial::from_json(&record).unwrap();

        let mut reference = build_generator(&config, Some((2.0, 0.4))).unwrap();
        reference.samples(3);
        assert_eq!(revived.samples(5), reference.samples(5));
    }

    #[test]
    fn test_unbound_state_and_skip() {
        let config = CliConfig::default();
        let mut buf = Vec::new();
        run(&config, None, None, 0, None, &mut buf).unwrap();
        let record: GeneratorJson = serde_json::from_slice(&buf).unwrap();
        assert!(record.params.is_empty());

        let err = run(&config, None, None, 1, None, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }
}
