//! Expected-outcome table: which conditional header each scenario sends and
//! which response statuses it accepts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ProbeRecord, ValidatorKind};
use crate::http::Conditional;
use crate::http_date;

/// How strictly "fresh" conditional probes are judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeMode {
    /// Fresh probes must return 304.
    Strict,
    /// 200 or 304 both accepted (server may not implement conditional caching).
    Either,
    /// Expect 304 when the target is the default archive port, 200 otherwise.
    #[default]
    Auto,
}

impl FromStr for OutcomeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(OutcomeMode::Strict),
            "either" => Ok(OutcomeMode::Either),
            "auto" => Ok(OutcomeMode::Auto),
            other => Err(format!(
                "unknown outcome mode {:?} (expected strict, either or auto)",
                other
            )),
        }
    }
}

/// Allowed response statuses for one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Only(u32),
    Either(u32, u32),
}

impl Expected {
    pub fn matches(&self, status: u32) -> bool {
        match self {
            Expected::Only(a) => status == *a,
            Expected::Either(a, b) => status == *a || status == *b,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Only(a) => write!(f, "{}", a),
            Expected::Either(a, b) => write!(f, "{} or {}", a, b),
        }
    }
}

/// One conditional-caching check against a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Replay the captured validator against the unchanged resource.
    ValidatorMatch,
    /// `If-Match` with the captured ETag; the archive answers it like a
    /// freshness check.
    PreconditionMatch,
    /// `If-Modified-Since` at the current wall-clock time.
    FreshnessNow,
    /// `If-Modified-Since` one second before the captured timestamp.
    Stale,
    /// Plain GET; caching must not break normal retrieval.
    Unconditional,
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::ValidatorMatch => "validator-match",
            Scenario::PreconditionMatch => "precondition-match",
            Scenario::FreshnessNow => "freshness-now",
            Scenario::Stale => "stale",
            Scenario::Unconditional => "unconditional",
        }
    }

    /// Conditional header for this scenario, or None for the plain GET.
    pub fn conditional(&self, record: &ProbeRecord, now: DateTime<Utc>) -> Option<Conditional> {
        let value = &record.validator.value;
        match self {
            Scenario::Unconditional => None,
            Scenario::ValidatorMatch => Some(match record.validator.kind {
                ValidatorKind::Etag => Conditional::IfNoneMatch(value.clone()),
                ValidatorKind::LastModified => Conditional::IfModifiedSince(value.clone()),
            }),
            Scenario::PreconditionMatch => Some(Conditional::IfMatch(value.clone())),
            Scenario::FreshnessNow => Some(Conditional::IfModifiedSince(http_date::format(now))),
            Scenario::Stale => {
                // Parseability is enforced at capture; an unparseable value
                // degrades to a plain GET, which shares this scenario's 200.
                let captured = http_date::parse(value)?;
                Some(Conditional::IfModifiedSince(http_date::format(
                    captured - Duration::seconds(1),
                )))
            }
        }
    }

    /// Allowed statuses under the given outcome mode. `on_default_port` only
    /// matters for `OutcomeMode::Auto`.
    pub fn expected(&self, mode: OutcomeMode, on_default_port: bool) -> Expected {
        match self {
            Scenario::Unconditional | Scenario::Stale => Expected::Only(200),
            Scenario::ValidatorMatch | Scenario::PreconditionMatch | Scenario::FreshnessNow => {
                match mode {
                    OutcomeMode::Strict => Expected::Only(304),
                    OutcomeMode::Either => Expected::Either(200, 304),
                    OutcomeMode::Auto => {
                        Expected::Only(if on_default_port { 304 } else { 200 })
                    }
                }
            }
        }
    }

    /// Scenario set for the load phase: validator replay plus the sanity GET.
    pub fn load_set() -> Vec<Scenario> {
        vec![Scenario::ValidatorMatch, Scenario::Unconditional]
    }

    /// Conformance (smoke) set: adds the If-Match probe for ETag runs and the
    /// freshness/staleness pair for Last-Modified runs.
    pub fn conformance_set(kind: ValidatorKind) -> Vec<Scenario> {
        match kind {
            ValidatorKind::Etag => vec![
                Scenario::ValidatorMatch,
                Scenario::PreconditionMatch,
                Scenario::Unconditional,
            ],
            ValidatorKind::LastModified => vec![
                Scenario::ValidatorMatch,
                Scenario::FreshnessNow,
                Scenario::Stale,
                Scenario::Unconditional,
            ],
        }
    }
}
