//! RFC 7231 HTTP date parsing and formatting.
//!
//! The archive emits `Last-Modified` in IMF-fixdate shape but without the
//! trailing `GMT`; both forms parse here. Formatting always emits IMF-fixdate.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Parse an HTTP date. Accepts IMF-fixdate (preferred), the archive's
/// GMT-less variant, RFC 850, asctime, and RFC 2822 as a last resort.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, IMF_FIXDATE) {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%a, %d %b %Y %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%A, %d-%b-%y %H:%M:%S GMT") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%a %b %e %H:%M:%S %Y") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// Format a timestamp as an IMF-fixdate header value.
pub fn format(t: DateTime<Utc>) -> String {
    t.format(IMF_FIXDATE).to_string()
}
