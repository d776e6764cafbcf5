#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for bugline
//!
//! This crate provides the types shared between the report pipeline, the
//! event system and the CLI: report severity, the report lifecycle state and
//! the JSON documents exchanged with the report service.

pub mod report;
pub mod severity;
pub mod state;

// Re-export commonly used types
pub use report::{CreateReportRequest, CreateReportResponse, UploadTarget};
pub use severity::Severity;
pub use state::ReportState;
pub use uuid::Uuid;

use serde::{Deserialize, Serialize};

/// Report identifier used to correlate events of one submission
pub type ReportId = Uuid;

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
