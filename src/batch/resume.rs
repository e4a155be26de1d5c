//! Idempotent resume.
//!
//! A unit whose output directory already satisfies the active [`ResumePolicy`]
//! is skipped before any collaborator is touched. Re-running a finished batch
//! therefore renders nothing.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// File written into a unit directory after its last frame.
pub const COMPLETION_MARKER: &str = ".complete";

/// What counts as "already done" for a unit directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumePolicy {
    /// Any existing, non-empty directory. A unit that crashed after its first
    /// frame is also skipped.
    #[default]
    AnyOutput,
    /// Only directories carrying the completion marker.
    CompletionMarker,
}

impl fmt::Display for ResumePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumePolicy::AnyOutput => f.write_str("any-output"),
            ResumePolicy::CompletionMarker => f.write_str("marker"),
        }
    }
}

impl FromStr for ResumePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any-output" => Ok(ResumePolicy::AnyOutput),
            "marker" => Ok(ResumePolicy::CompletionMarker),
            other => Err(format!(
                "unknown resume policy '{}', expected 'any-output' or 'marker'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResumeGuard {
    pub policy: ResumePolicy,
}

impl ResumeGuard {
    pub fn new(policy: ResumePolicy) -> Self {
        Self { policy }
    }

    /// True if the unit writing to `output_dir` needs no work.
    ///
    /// Unreadable directories count as not done; the unit then fails later
    /// with a real IO error instead of being silently skipped.
    pub fn should_skip(&self, output_dir: &Path) -> bool {
        match self.policy {
            ResumePolicy::AnyOutput => has_entries(output_dir),
            ResumePolicy::CompletionMarker => output_dir.join(COMPLETION_MARKER).is_file(),
        }
    }
}

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Writes the completion marker listing `frames` in render order.
pub fn mark_complete(output_dir: &Path, frames: &[String]) -> io::Result<()> {
    let mut contents = frames.join("\n");
    contents.push('\n');
    fs::write(output_dir.join(COMPLETION_MARKER), contents)
}
