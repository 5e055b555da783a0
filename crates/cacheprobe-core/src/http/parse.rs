//! Parse HTTP response header lines into ResponseHeaders.

/// Cache-validator headers from a response, plus the raw header list.
///
/// ETag values are kept exactly as served (the archive emits unquoted ETags);
/// the conditional replay must send back what was captured, byte for byte.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    etag: Option<String>,
    last_modified: Option<String>,
    raw: Vec<(String, String)>,
}

impl ResponseHeaders {
    /// `ETag` value, if present and non-empty.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// `Last-Modified` value, if present and non-empty.
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// Case-insensitive lookup in the final header block.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.raw
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse collected header lines into ResponseHeaders.
///
/// A new `HTTP/` status line starts a new response block (redirect chain);
/// only the final block's headers are kept.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHeaders {
    let mut out = ResponseHeaders::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            out = ResponseHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("etag") && !value.is_empty() {
                out.etag = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("last-modified") && !value.is_empty() {
                out.last_modified = Some(value.to_string());
            }
            out.raw.push((name.to_string(), value.to_string()));
        }
    }
    out
}
