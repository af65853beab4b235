//! Ruleset options.
//!
//! Options are an open, string-keyed flag table rather than an enum so that
//! new rulesets can add toggles without touching the engine. Unknown keys
//! read as `false`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Extreme range bracket for weapons.
pub const MAXTECH_RANGE: &str = "maxtech_range";
/// Disable through-armor critical effects.
pub const NO_TAC: &str = "no_tac";
/// Through-armor criticals re-roll the location they land on.
pub const FLOATING_CRITS: &str = "floating_crits";
/// Hidden deployment; carried for the driver, no engine effect.
pub const BLIND_DROP: &str = "blind_drop";

/// Named boolean ruleset toggles.
///
/// # Example RON
///
/// ```ron
/// GameOptions(
///     flags: {
///         "maxtech_range": true,
///         "floating_crits": false,
///     },
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GameOptions {
    #[serde(default)]
    flags: BTreeMap<String, bool>,
}

impl GameOptions {
    /// Options with every flag off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a flag.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.set(name, value);
        self
    }

    /// Set a flag.
    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    /// Read a flag; unknown names are `false`.
    #[must_use]
    pub fn boolean_option(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Parse options from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the text is not valid options RON.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: "game options".into(),
            message: e.to_string(),
        })
    }
}
