//! Command line arguments of the `posegen` binary.

use std::path::PathBuf;

use clap::Parser;

use posegen::batch::enumerate::{Manifest, WorkUnitEnumerator};
use posegen::batch::resume::ResumePolicy;
use posegen::config::{
    validate_degrees, BatchConfig, RenderSettings, SweepConfig, DEFAULT_MANIFEST,
    DEFAULT_STEP_COUNT,
};
use posegen::errors::ConfigError;
use posegen::gfx::pivot::RotationStrategy;

/// Renders pose-labelled image sequences of rotated shapes.
#[derive(Parser, Debug)]
#[command(name = "posegen", version, about)]
pub struct Args {
    /// Rotation applied per step, in degrees
    #[arg(allow_negative_numbers = true)]
    pub degrees: f64,

    /// Model list, one `category/model-id` per line
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Directory the manifest identifiers are relative to
    #[arg(long, default_value = ".")]
    pub corpus_root: PathBuf,

    /// Dataset root
    #[arg(long, env = "POSEGEN_OUTPUT_DIR", default_value = "output")]
    pub output: PathBuf,

    /// Rotation steps rendered after the base frame
    #[arg(long, default_value_t = DEFAULT_STEP_COUNT)]
    pub steps: usize,

    /// How each rotation is applied to the pivot
    #[arg(long, default_value_t = RotationStrategy::default())]
    pub strategy: RotationStrategy,

    /// When an existing unit directory counts as done
    #[arg(long, default_value_t = ResumePolicy::default())]
    pub resume: ResumePolicy,

    /// Render generated shapes instead of corpus models
    #[arg(long)]
    pub sweep: bool,

    /// Largest extrusion count of the sweep
    #[arg(long, default_value_t = 10)]
    pub amounts: u32,

    /// Trials per extrusion count of the sweep
    #[arg(long, default_value_t = 1800)]
    pub trials: u32,

    /// Further sweep angle, may be repeated
    #[arg(long = "extra-angle", allow_negative_numbers = true)]
    pub extra_angles: Vec<f64>,
}

impl Args {
    /// Validates the arguments into a batch configuration and its units.
    ///
    /// In corpus mode the manifest is read here, so a missing manifest fails
    /// before any unit runs.
    pub fn batch(&self) -> Result<(BatchConfig, WorkUnitEnumerator), ConfigError> {
        let degrees = validate_degrees(self.degrees)?;

        let config = BatchConfig::new(&self.output)
            .with_corpus_root(&self.corpus_root)
            .with_manifest(&self.manifest)
            .with_step_count(self.steps)
            .with_strategy(self.strategy)
            .with_resume_policy(self.resume);

        if self.sweep {
            let mut angles = vec![degrees];
            for &angle in &self.extra_angles {
                angles.push(validate_degrees(angle)?);
            }
            let sweep = SweepConfig::new(angles, self.amounts, self.trials)?;
            let enumerator = WorkUnitEnumerator::Sweep {
                sweep,
                output_dir: config.output_dir.clone(),
            };
            Ok((config.with_render(RenderSettings::sweep()), enumerator))
        } else {
            let manifest = Manifest::load(&config.manifest_path)?;
            let enumerator = WorkUnitEnumerator::Corpus {
                manifest,
                angles: vec![degrees],
                output_dir: config.output_dir.clone(),
                corpus_root: config.corpus_root.clone(),
            };
            Ok((config.with_render(RenderSettings::corpus()), enumerator))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("posegen").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["45"]).unwrap();
        assert_eq!(args.degrees, 45.0);
        assert_eq!(args.steps, 7);
        assert_eq!(args.strategy, RotationStrategy::Reparent);
        assert_eq!(args.resume, ResumePolicy::AnyOutput);
        assert_eq!(args.manifest, PathBuf::from("directory.txt"));
        assert!(!args.sweep);
    }

    #[test]
    fn test_bad_degrees() {
        assert_eq!(parse(&[]).unwrap_err().kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(parse(&["forty"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert!(matches!(
            parse(&["NaN"]).unwrap().batch(),
            Err(ConfigError::InvalidDegrees(_))
        ));
    }

    #[test]
    fn test_help_is_not_a_failure() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("directory.txt");
        let args = parse(&["45", "--manifest", manifest.to_str().unwrap()]).unwrap();
        assert!(matches!(args.batch(), Err(ConfigError::ManifestNotFound(_))));
    }

    #[test]
    fn test_sweep_configuration() {
        let args = parse(&[
            "60",
            "--sweep",
            "--amounts",
            "2",
            "--trials",
            "5",
            "--extra-angle",
            "75",
            "--strategy",
            "premultiply",
        ])
        .unwrap();
        let (config, enumerator) = args.batch().unwrap();
        assert_eq!(enumerator.unit_count(), 2 * 2 * 5);
        assert_eq!(config.render, RenderSettings::sweep());
        assert_eq!(config.strategy, RotationStrategy::Premultiply);
    }

    #[test]
    fn test_sweep_amounts_bounded() {
        let args = parse(&["45", "--sweep", "--amounts", "300"]).unwrap();
        assert!(matches!(args.batch(), Err(ConfigError::InvalidSweep(_))));
    }
}
