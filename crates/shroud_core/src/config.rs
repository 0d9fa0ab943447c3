//! Engine options.
//!
//! The options are owned by the caller and handed to a run; the engine only
//! reads them. They deserialize from the camelCase JSON shape the obfuscator
//! front end uses, with every field defaulted.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Strategy for final-form identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameMode {
    /// Random alphanumeric, six to eight characters.
    Randomized,
    /// `_0x` followed by uppercase hex digits.
    Hexadecimal,
    /// Short alphabetic sequence `a, b, …, Z, aa, ab, …`.
    Mangled,
    /// `var_1`, `var_2`, …
    Number,
    /// A keyword followed by zero-width non-joiners.
    ZeroWidth,
}

/// A single naming strategy or a weighted choice between several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentifierGenerator {
    Mode(NameMode),
    Weighted(BTreeMap<NameMode, f64>),
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        IdentifierGenerator::Mode(NameMode::Randomized)
    }
}

impl IdentifierGenerator {
    /// Picks the mode for one generated name.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> NameMode {
        match self {
            IdentifierGenerator::Mode(mode) => *mode,
            IdentifierGenerator::Weighted(weights) => {
                let total: f64 = weights.values().sum();
                let mut r = rng.r#gen::<f64>() * total;
                for (mode, weight) in weights {
                    if r < *weight {
                        return *mode;
                    }
                    r -= weight;
                }
                weights
                    .keys()
                    .next_back()
                    .copied()
                    .unwrap_or(NameMode::Randomized)
            }
        }
    }

    fn validate(&self) -> EngineResult<()> {
        let IdentifierGenerator::Weighted(weights) = self else {
            return Ok(());
        };
        if weights.is_empty() {
            return Err(EngineError::InvalidArgument(
                "identifierGenerator: weighted map is empty".into(),
            ));
        }
        if weights.values().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::InvalidArgument(
                "identifierGenerator: weights must be finite and non-negative".into(),
            ));
        }
        if weights.values().sum::<f64>() <= 0.0 {
            return Err(EngineError::InvalidArgument(
                "identifierGenerator: weights sum to zero".into(),
            ));
        }
        Ok(())
    }
}

/// Density knob: whether an eligible node is actually transformed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Probability {
    Flag(bool),
    /// Chance in `[0, 1]`.
    Fraction(f64),
}

impl Default for Probability {
    fn default() -> Self {
        Probability::Flag(false)
    }
}

impl Probability {
    /// Evaluates the knob once.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        match *self {
            Probability::Flag(on) => on,
            Probability::Fraction(p) if p <= 0.0 => false,
            Probability::Fraction(p) if p >= 1.0 => true,
            Probability::Fraction(p) => rng.r#gen::<f64>() < p,
        }
    }

    /// `false` only when the knob can never fire.
    pub fn is_enabled(&self) -> bool {
        match *self {
            Probability::Flag(on) => on,
            Probability::Fraction(p) => p > 0.0,
        }
    }

    fn validate(&self, field: &str) -> EngineResult<()> {
        match *self {
            Probability::Fraction(p) if !(0.0..=1.0).contains(&p) => Err(EngineError::InvalidArgument(
                format!("{field}: probability {p} is outside [0, 1]"),
            )),
            _ => Ok(()),
        }
    }
}

/// Options consumed by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Naming strategy for final-form names.
    pub identifier_generator: IdentifierGenerator,
    /// Externally significant names that are never virtualized or renamed.
    pub global_variables: BTreeSet<String>,
    /// Density of variable virtualization.
    pub virtualize: Probability,
    /// Attach `[Transform] text` comments to synthesized nodes.
    pub debug_comments: bool,
    /// Seed for the run's random generator; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Options {
    /// Parses and validates options from JSON.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let options: Options = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidArgument(format!("options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// Rejects out-of-range probabilities and degenerate weight maps.
    pub fn validate(&self) -> EngineResult<()> {
        self.identifier_generator.validate()?;
        self.virtualize.validate("virtualize")
    }

    /// `true` for names in `globalVariables`.
    pub fn is_global(&self, name: &str) -> bool {
        self.global_variables.contains(name)
    }
}
