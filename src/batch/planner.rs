//! # Rotation Planning
//!
//! A work unit's rotations are drawn from its own seeded stream: one axis
//! draw and one sign draw per step, always in that order. Given the seed the
//! whole sequence is fixed, which is what lets a frame be re-created from its
//! file name alone.
//!
//! ## Frame names
//!
//! The unrotated frame is `base`. Every step appends `_X`, `_Y`, `_Z` (positive
//! rotation) or `_-X`, `_-Y`, `_-Z` (negative), so the name of frame *n* lists
//! all *n* rotations applied so far, in order:
//!
//! ```text
//! base
//! base_-Y
//! base_-Y_X
//! ```
//!
//! [`FramePath::parse`] and [`replay`] turn a name back into the world
//! orientation it labels.

use std::fmt;

use cgmath::{Deg, Matrix4, SquareMatrix};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::errors::FramePathError;

/// A world axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Draw order of the axis choice.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn symbol(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }

    /// Right-handed rotation about this axis.
    pub fn rotation(self, angle: Deg<f64>) -> Matrix4<f64> {
        match self {
            Axis::X => Matrix4::from_angle_x(angle),
            Axis::Y => Matrix4::from_angle_y(angle),
            Axis::Z => Matrix4::from_angle_z(angle),
        }
    }
}

/// Sign of a rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Negative,
    Positive,
}

impl Direction {
    /// Draw order of the sign choice.
    pub const CHOICES: [Direction; 2] = [Direction::Negative, Direction::Positive];

    pub fn sign(self) -> f64 {
        match self {
            Direction::Negative => -1.0,
            Direction::Positive => 1.0,
        }
    }
}

/// One discrete world-axis rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationStep {
    pub axis: Axis,
    pub direction: Direction,
    /// Unsigned magnitude; the unit's rotation increment.
    pub degrees: f64,
}

impl RotationStep {
    pub fn new(axis: Axis, direction: Direction, degrees: f64) -> Self {
        Self {
            axis,
            direction,
            degrees,
        }
    }

    pub fn signed_degrees(&self) -> f64 {
        self.direction.sign() * self.degrees
    }

    /// World-space rotation matrix of this step.
    pub fn matrix(&self) -> Matrix4<f64> {
        self.axis.rotation(Deg(self.signed_degrees()))
    }

    /// Path token without the leading separator, e.g. `-X`.
    pub fn token(&self) -> String {
        match self.direction {
            Direction::Negative => format!("-{}", self.axis.symbol()),
            Direction::Positive => self.axis.symbol().to_string(),
        }
    }
}

/// Running name of a frame: `base` followed by one token per rotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FramePath(String);

impl FramePath {
    pub const BASE: &'static str = "base";
    pub const EXTENSION: &'static str = "png";

    pub fn base() -> Self {
        Self(Self::BASE.to_string())
    }

    /// Appends the token of `step`.
    pub fn push(&mut self, step: &RotationStep) {
        self.0.push('_');
        self.0.push_str(&step.token());
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Image file name for this frame.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, Self::EXTENSION)
    }

    /// Decodes a frame name (with or without the `.png` extension) into the
    /// ordered axis/sign pairs it records.
    pub fn parse(name: &str) -> Result<Vec<(Axis, Direction)>, FramePathError> {
        let stem = name
            .strip_suffix(&format!(".{}", Self::EXTENSION))
            .unwrap_or(name);
        let rest = stem
            .strip_prefix(Self::BASE)
            .ok_or_else(|| FramePathError::MissingBase(name.to_string()))?;
        if rest.is_empty() {
            return Ok(Vec::new());
        }
        let tokens = rest
            .strip_prefix('_')
            .ok_or_else(|| FramePathError::MissingBase(name.to_string()))?;

        tokens
            .split('_')
            .map(|token| parse_token(token).ok_or_else(|| FramePathError::UnknownToken {
                name: name.to_string(),
                token: token.to_string(),
            }))
            .collect()
    }
}

impl fmt::Display for FramePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_token(token: &str) -> Option<(Axis, Direction)> {
    let (direction, symbol) = match token.strip_prefix('-') {
        Some(symbol) => (Direction::Negative, symbol),
        None => (Direction::Positive, token),
    };
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Axis::from_symbol(c).map(|axis| (axis, direction)),
        _ => None,
    }
}

/// World orientation reached by applying `tokens` in order, each rotated by
/// `degrees`, starting from the identity.
pub fn replay(tokens: &[(Axis, Direction)], degrees: f64) -> Matrix4<f64> {
    tokens.iter().fold(Matrix4::identity(), |acc, &(axis, direction)| {
        RotationStep::new(axis, direction, degrees).matrix() * acc
    })
}

/// Seeded source of rotation steps for one work unit.
///
/// Each unit owns its planner; nothing reads ambient random state. The
/// stream is ChaCha8 so a seed keeps mapping to the same steps across
/// dependency upgrades.
#[derive(Debug, Clone)]
pub struct RotationPlanner {
    rng: ChaCha8Rng,
    increment_degrees: f64,
}

impl RotationPlanner {
    pub fn new(seed: i64, increment_degrees: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed as u64),
            increment_degrees,
        }
    }

    /// Draws the next step: axis first, then sign.
    pub fn next_step(&mut self) -> RotationStep {
        let axis = Axis::ALL[self.rng.random_range(0..Axis::ALL.len())];
        let direction = Direction::CHOICES[self.rng.random_range(0..Direction::CHOICES.len())];
        RotationStep::new(axis, direction, self.increment_degrees)
    }

    /// Draws `step_count` steps for `seed`.
    pub fn plan(seed: i64, step_count: usize, increment_degrees: f64) -> RotationPlan {
        let steps = Self::new(seed, increment_degrees).take(step_count).collect();
        RotationPlan { steps }
    }
}

impl Iterator for RotationPlanner {
    type Item = RotationStep;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_step())
    }
}

/// A fully drawn rotation sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationPlan {
    pub steps: Vec<RotationStep>,
}

impl RotationPlan {
    /// Frame names in render order, starting with `base`.
    pub fn frame_paths(&self) -> Vec<FramePath> {
        let mut path = FramePath::base();
        let mut paths = Vec::with_capacity(self.steps.len() + 1);
        paths.push(path.clone());
        for step in &self.steps {
            path.push(step);
            paths.push(path.clone());
        }
        paths
    }

    /// Name of the last frame.
    pub fn final_path(&self) -> FramePath {
        let mut path = FramePath::base();
        for step in &self.steps {
            path.push(step);
        }
        path
    }

    /// Accumulated world rotation after every step.
    pub fn world_rotation(&self) -> Matrix4<f64> {
        self.steps
            .iter()
            .fold(Matrix4::identity(), |acc, step| step.matrix() * acc)
    }
}
