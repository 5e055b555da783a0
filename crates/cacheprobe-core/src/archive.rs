//! Typed bindings for the archive REST endpoints used by the probe.
//!
//! Endpoints: `/system` (identity, diagnostic only), `/studies` (listing),
//! `/studies/{id}/instances` (sub-item count, diagnostic only),
//! `/studies/{id}/shared-tags` (the probed resource, carries the cache
//! validators), `POST /instances` (DICOM import).
//! All calls are blocking; call from `spawn_blocking` if used from async code.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::http::{Conditional, HttpClient, HttpResponse, TransportError};

/// Port the archive listens on in a default deployment.
pub const DEFAULT_PORT: u16 = 8042;

/// Failure talking to an archive endpoint that must return a decodable body.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("GET {path} returned HTTP {status}")]
    Status { path: String, status: u32 },
    #[error("unexpected response body for {path}: {source}")]
    Body {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Deserialize)]
struct SystemInfo {
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    #[serde(rename = "ID")]
    id: String,
}

/// Client for one archive instance.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    http: HttpClient,
}

impl ArchiveClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Port the client targets (scheme default when the URL has none).
    pub fn port(&self) -> Option<u16> {
        self.http.port()
    }

    /// Server identity from `GET /system`. Diagnostic logging only.
    pub fn system_name(&self) -> Result<String, ArchiveError> {
        let info: SystemInfo = self.get_json("/system")?;
        Ok(info.name)
    }

    /// Study IDs from `GET /studies`.
    pub fn list_studies(&self) -> Result<Vec<String>, ArchiveError> {
        self.get_json("/studies")
    }

    /// Number of instances in a study. Diagnostic logging only.
    pub fn instance_count(&self, study_id: &str) -> Result<usize, ArchiveError> {
        let instances: Vec<serde_json::Value> =
            self.get_json(&format!("/studies/{}/instances", study_id))?;
        Ok(instances.len())
    }

    /// `GET /studies/{id}/shared-tags`, optionally conditional. Returns the
    /// raw response: 304 is a probe outcome here, not an error.
    pub fn shared_tags(
        &self,
        study_id: &str,
        conditional: Option<&Conditional>,
    ) -> Result<HttpResponse, TransportError> {
        self.http
            .get(&format!("/studies/{}/shared-tags", study_id), conditional)
    }

    /// Upload one DICOM file via `POST /instances`; returns the created ID.
    pub fn import_instance(&self, dicom: &[u8]) -> Result<String, ArchiveError> {
        let path = "/instances";
        let res = self.http.post(path, dicom, "application/dicom")?;
        if res.status != 200 {
            return Err(ArchiveError::Status {
                path: path.to_string(),
                status: res.status,
            });
        }
        let body: ImportResponse =
            serde_json::from_slice(&res.body).map_err(|source| ArchiveError::Body {
                path: path.to_string(),
                source,
            })?;
        Ok(body.id)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ArchiveError> {
        let res = self.http.get(path, None)?;
        if res.status != 200 {
            return Err(ArchiveError::Status {
                path: path.to_string(),
                status: res.status,
            });
        }
        serde_json::from_slice(&res.body).map_err(|source| ArchiveError::Body {
            path: path.to_string(),
            source,
        })
    }
}
