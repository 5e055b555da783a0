//! Two-phase conditional-caching probe harness.
//!
//! Phase 1 (`setup::discover`) lists studies and captures baseline validators
//! into an immutable `ProbeSet`. Phase 2 (`run`, `parallel`) replays the
//! validators as conditional requests across concurrent workers and checks
//! each response against the expected-status table in `scenario`.

mod parallel;
mod run;
mod scenario;
mod setup;

pub use parallel::{run_workers, WorkerOptions};
pub use run::{run_iteration, IterationOutcome, ProbeOptions};
pub use scenario::{Expected, OutcomeMode, Scenario};
pub use setup::discover;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::http::TransportError;

/// Which cache validator a run exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorKind {
    Etag,
    #[default]
    LastModified,
}

impl ValidatorKind {
    /// Response header the baseline capture reads.
    pub fn header_name(&self) -> &'static str {
        match self {
            ValidatorKind::Etag => "ETag",
            ValidatorKind::LastModified => "Last-Modified",
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

impl FromStr for ValidatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "etag" => Ok(ValidatorKind::Etag),
            "last-modified" => Ok(ValidatorKind::LastModified),
            other => Err(format!(
                "unknown validator kind {:?} (expected etag or last-modified)",
                other
            )),
        }
    }
}

/// Captured cache validator for one study. Non-empty by construction:
/// discovery aborts the run rather than record an empty value.
#[derive(Debug, Clone)]
pub struct Validator {
    pub kind: ValidatorKind,
    pub value: String,
}

/// One study with its baseline validator; the read-only unit of probing work.
#[derive(Debug, Clone)]
pub struct ProbeRecord {
    pub study_id: String,
    pub validator: Validator,
}

/// Immutable working set produced by discovery, shared by reference across
/// all workers. Discarded at run end; nothing is persisted.
#[derive(Debug, Clone)]
pub struct ProbeSet {
    pub kind: ValidatorKind,
    pub records: Vec<ProbeRecord>,
}

/// Fatal setup failure: the run aborts before any conditional probing,
/// since a probe without a trusted validator cannot test the conditional path.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("study listing failed")]
    Listing(#[source] ArchiveError),
    #[error("archive returned no studies to probe")]
    NoStudies,
    #[error("baseline GET for study {study} returned HTTP {status}")]
    BaselineStatus { study: String, status: u32 },
    #[error("baseline response for study {study} has no {kind} validator")]
    MissingValidator { study: String, kind: ValidatorKind },
    #[error("study {study} has an unparseable Last-Modified: {value:?}")]
    BadValidator { study: String, value: String },
    #[error("transport failure during setup")]
    Transport(#[from] TransportError),
}
