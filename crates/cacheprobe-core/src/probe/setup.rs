//! Discovery and baseline capture (phase 1, runs once per run).
//!
//! Any gap here is fatal: a missing or empty validator means the conditional
//! path cannot be tested, so the whole run aborts instead of continuing with
//! partial data.

use std::time::Duration;

use super::{ProbeRecord, ProbeSet, SetupError, Validator, ValidatorKind};
use crate::archive::ArchiveClient;
use crate::http_date;

/// List studies and capture a baseline validator per study.
/// Blocking; call from `spawn_blocking` if used from async code.
pub fn discover(
    archive: &ArchiveClient,
    kind: ValidatorKind,
    pacing: Duration,
) -> Result<ProbeSet, SetupError> {
    match archive.system_name() {
        Ok(name) => tracing::info!(archive = %name, validator = %kind, "probing archive"),
        Err(err) => tracing::warn!(error = %err, "could not read archive identity"),
    }

    let studies = archive.list_studies().map_err(SetupError::Listing)?;
    if studies.is_empty() {
        return Err(SetupError::NoStudies);
    }

    let mut records = Vec::with_capacity(studies.len());
    for (index, study_id) in studies.iter().enumerate() {
        match archive.instance_count(study_id) {
            Ok(count) => {
                tracing::info!(study = %study_id, instances = count, "study #{}", index + 1)
            }
            Err(err) => tracing::warn!(study = %study_id, error = %err, "could not count instances"),
        }

        let res = archive.shared_tags(study_id, None)?;
        if res.status != 200 {
            return Err(SetupError::BaselineStatus {
                study: study_id.clone(),
                status: res.status,
            });
        }

        let value = match kind {
            ValidatorKind::Etag => res.headers.etag(),
            ValidatorKind::LastModified => res.headers.last_modified(),
        };
        let Some(value) = value else {
            return Err(SetupError::MissingValidator {
                study: study_id.clone(),
                kind,
            });
        };
        if kind == ValidatorKind::LastModified && http_date::parse(value).is_none() {
            return Err(SetupError::BadValidator {
                study: study_id.clone(),
                value: value.to_string(),
            });
        }

        tracing::debug!(study = %study_id, validator = %value, "captured baseline validator");
        records.push(ProbeRecord {
            study_id: study_id.clone(),
            validator: Validator {
                kind,
                value: value.to_string(),
            },
        });

        std::thread::sleep(pacing);
    }

    Ok(ProbeSet { kind, records })
}
