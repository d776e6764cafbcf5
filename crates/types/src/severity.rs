//! Report severity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How bad the reported problem is, as chosen by the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Low,
    /// No severity; omitted from the request body
    #[default]
    None,
}

impl Severity {
    /// Lower-case label sent to the report service, `None` for [`Severity::None`]
    #[must_use]
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Critical => Some("critical"),
            Self::High => Some("high"),
            Self::Low => Some("low"),
            Self::None => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("none"))
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            "none" | "" => Ok(Self::None),
            other => Err(format!(
                "invalid severity '{other}': must be one of critical, high, low, none"
            )),
        }
    }
}

impl clap::ValueEnum for Severity {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Critical, Self::High, Self::Low, Self::None]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Critical => clap::builder::PossibleValue::new("critical"),
            Self::High => clap::builder::PossibleValue::new("high"),
            Self::Low => clap::builder::PossibleValue::new("low"),
            Self::None => clap::builder::PossibleValue::new("none"),
        })
    }
}
