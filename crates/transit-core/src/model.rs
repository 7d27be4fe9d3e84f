//! Station identifiers and attributes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::literal::{self, Literal};

// ---------------------------------------------------------------------------
// StationKey
// ---------------------------------------------------------------------------

/// Unique identifier of a station: stop name plus line code.
///
/// Two stations sharing a stop name on different lines are distinct nodes
/// (`('Canal St', 'J Z')` vs `('Canal St', 'A C E')`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationKey {
    pub stop: String,
    pub line: String,
}

impl StationKey {
    pub fn new(stop: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            stop: stop.into(),
            line: line.into(),
        }
    }

    /// Parse a literal cell such as `('Times Sq-42 St', 'N Q R W')`.
    ///
    /// A bare string (quoted or not) is a stop name with an empty line code.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MalformedInput`] for tuples that are not
    /// exactly two strings, or for empty input.
    pub fn parse_literal(input: &str) -> Result<Self, AnalysisError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AnalysisError::malformed("empty station identifier"));
        }
        if !trimmed.starts_with(['(', '[', '\'', '"']) {
            return Ok(Self::new(trimmed, ""));
        }
        match literal::parse(trimmed)? {
            Literal::Str(stop) => Ok(Self::new(stop, "")),
            lit => match lit.items() {
                Some([Literal::Str(stop), Literal::Str(line)]) => {
                    Ok(Self::new(stop.as_str(), line.as_str()))
                }
                _ => Err(AnalysisError::malformed(format!(
                    "station identifier `{trimmed}` must be a (stop, line) pair of strings"
                ))),
            },
        }
    }

    /// Literal form used when writing tables back out.
    #[must_use]
    pub fn to_literal(&self) -> String {
        format!("('{}', '{}')", escape(&self.stop), escape(&self.line))
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

impl fmt::Display for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line.is_empty() {
            f.write_str(&self.stop)
        } else {
            write!(f, "{} [{}]", self.stop, self.line)
        }
    }
}

impl FromStr for StationKey {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_literal(s)
    }
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

/// A station node with its descriptive attributes.
///
/// Stations that appear only in edge tables carry empty attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub key: StationKey,
    /// `(latitude, longitude)`.
    pub location: Option<(f64, f64)>,
    pub borough: Option<String>,
    pub routes: BTreeSet<String>,
}

impl Station {
    /// A station with no attributes.
    #[must_use]
    pub const fn bare(key: StationKey) -> Self {
        Self {
            key,
            location: None,
            borough: None,
            routes: BTreeSet::new(),
        }
    }
}
