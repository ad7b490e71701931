//! Period granularity definitions.
//!
//! This module defines [`Granularity`], the level of the period hierarchy a
//! selection is made at (year, quarter or month).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// Level of the period hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Whole calendar years.
    Yearly,
    /// Calendar quarters (Q1-Q4).
    Quarterly,
    /// Calendar months.
    Monthly,
}

impl Granularity {
    /// All granularities, coarsest first.
    pub const ALL: [Self; 3] = [Self::Yearly, Self::Quarterly, Self::Monthly];

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Quarterly => "quarterly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yearly" | "year" => Ok(Self::Yearly),
            "quarterly" | "quarter" => Ok(Self::Quarterly),
            "monthly" | "month" => Ok(Self::Monthly),
            other => Err(FilterError::Parse(format!("unknown granularity: {other}"))),
        }
    }
}
