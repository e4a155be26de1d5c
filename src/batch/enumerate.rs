//! # Work Unit Enumeration
//!
//! Expands the batch parameters into an ordered, finite stream of
//! [`WorkUnit`]s. Enumerating twice with the same inputs yields the same units
//! in the same order, so an interrupted batch restarts where the resume guard
//! lets it.
//!
//! Two shapes are supported:
//!
//! - **Corpus**: one unit per manifest line and rotation angle, written to
//!   `<output>/<angle>/<category>/<model-id>`.
//! - **Sweep**: one unit per angle × shape count × trial index, written to
//!   `<output>/<angle>/<amount>/<trial>`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

use crate::batch::seed::derive_seed;
use crate::config::{batch_name, corpus_mesh_path, SweepConfig};
use crate::errors::{ConfigError, UnitInputError};

/// Where a unit's shape comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitSource {
    /// A model imported from the mesh corpus.
    Corpus {
        /// Full manifest identifier, `category/model-id[/...]`.
        identifier: String,
        category: String,
        model_id: String,
        mesh_path: PathBuf,
    },
    /// A procedurally built shape.
    Shape { amount: u32, trial: u32 },
}

/// One base shape rotated by one increment. Immutable once enumerated.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkUnit {
    pub source: UnitSource,
    pub rotation_degrees: f64,
    pub output_dir: PathBuf,
}

impl WorkUnit {
    /// Stable identity the rotation seed is derived from.
    ///
    /// Corpus models use their model id. Shapes use six hex digits, two for
    /// the shape count and four for the trial index.
    pub fn identity(&self) -> String {
        match &self.source {
            UnitSource::Corpus { model_id, .. } => model_id.clone(),
            UnitSource::Shape { amount, trial } => format!("{:02x}{:04x}", amount, trial),
        }
    }

    pub fn seed(&self) -> i64 {
        derive_seed(&self.identity(), self.rotation_degrees)
    }
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            UnitSource::Corpus { identifier, .. } => {
                write!(f, "{} @ {}°", identifier, batch_name(self.rotation_degrees))
            }
            UnitSource::Shape { amount, trial } => write!(
                f,
                "shape {}/{} @ {}°",
                amount,
                trial,
                batch_name(self.rotation_degrees)
            ),
        }
    }
}

/// Model identifiers listed one per line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    entries: Vec<String>,
}

impl Manifest {
    /// Reads the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::ManifestNotFound(path.to_path_buf())
            } else {
                ConfigError::ManifestRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Ok(Self::from_lines(contents.lines()))
    }

    /// Builds a manifest from raw lines; surrounding whitespace is trimmed and
    /// blank lines are dropped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits `category/model-id[/...]` into its first two segments.
pub fn parse_identifier(identifier: &str) -> Result<(&str, &str), UnitInputError> {
    let mut segments = identifier.split('/');
    match (segments.next(), segments.next()) {
        (Some(category), Some(model_id)) if !category.is_empty() && !model_id.is_empty() => {
            Ok((category, model_id))
        }
        _ => Err(UnitInputError::MalformedIdentifier(identifier.to_string())),
    }
}

/// Source of the work units of one batch.
#[derive(Debug, Clone)]
pub enum WorkUnitEnumerator {
    Corpus {
        manifest: Manifest,
        angles: Vec<f64>,
        output_dir: PathBuf,
        corpus_root: PathBuf,
    },
    Sweep {
        sweep: SweepConfig,
        output_dir: PathBuf,
    },
}

impl WorkUnitEnumerator {
    /// Units in processing order. Malformed corpus identifiers are logged and
    /// left out.
    pub fn units(&self) -> Box<dyn Iterator<Item = WorkUnit> + '_> {
        match self {
            WorkUnitEnumerator::Corpus {
                manifest,
                angles,
                output_dir,
                corpus_root,
            } => Box::new(angles.iter().flat_map(move |&angle| {
                let batch_dir = output_dir.join(batch_name(angle));
                manifest.entries().iter().filter_map(move |identifier| {
                    corpus_unit(identifier, angle, &batch_dir, corpus_root)
                })
            })),
            WorkUnitEnumerator::Sweep { sweep, output_dir } => {
                Box::new(sweep.angles.iter().flat_map(move |&angle| {
                    let batch_dir = output_dir.join(batch_name(angle));
                    (1..=sweep.amount_count).flat_map(move |amount| {
                        let amount_dir = batch_dir.join(amount.to_string());
                        (0..sweep.rotate_num).map(move |trial| WorkUnit {
                            source: UnitSource::Shape { amount, trial },
                            rotation_degrees: angle,
                            output_dir: amount_dir.join(trial.to_string()),
                        })
                    })
                }))
            }
        }
    }

    /// Number of units [`units`](Self::units) yields.
    pub fn unit_count(&self) -> usize {
        match self {
            WorkUnitEnumerator::Corpus {
                manifest, angles, ..
            } => {
                let valid = manifest
                    .entries()
                    .iter()
                    .filter(|id| parse_identifier(id).is_ok())
                    .count();
                valid * angles.len()
            }
            WorkUnitEnumerator::Sweep { sweep, .. } => sweep.unit_count(),
        }
    }
}

fn corpus_unit(identifier: &str, angle: f64, batch_dir: &Path, corpus_root: &Path) -> Option<WorkUnit> {
    match parse_identifier(identifier) {
        Ok((category, model_id)) => Some(WorkUnit {
            source: UnitSource::Corpus {
                identifier: identifier.to_string(),
                category: category.to_string(),
                model_id: model_id.to_string(),
                mesh_path: corpus_mesh_path(corpus_root, identifier),
            },
            rotation_degrees: angle,
            output_dir: batch_dir.join(category).join(model_id),
        }),
        Err(e) => {
            warn!("Skipping manifest entry: {}", e);
            None
        }
    }
}
