//! Minimal HTTP/1.1 stub of the archive REST API for integration tests.
//!
//! Serves the study listing, shared-tags with cache validators and
//! conditional-header handling, the system identity, instance listings and
//! DICOM import. One thread per connection; runs until the process exits.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use cacheprobe_core::http_date;

#[derive(Debug, Clone)]
pub struct StudyFixture {
    pub id: &'static str,
    pub etag: Option<&'static str>,
    pub last_modified: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct ArchiveServerOptions {
    pub studies: Vec<StudyFixture>,
    /// If false, GET /studies returns 500 (listing-failure path).
    pub listing_ok: bool,
    /// If false, conditional headers are ignored and GET always returns 200.
    pub conditional_support: bool,
}

impl Default for ArchiveServerOptions {
    fn default() -> Self {
        Self {
            studies: vec![
                StudyFixture {
                    id: "study-a",
                    etag: Some("v1"),
                    last_modified: Some("Mon, 01 Jan 2024 00:00:00 GMT"),
                },
                StudyFixture {
                    id: "study-b",
                    etag: Some("v2"),
                    last_modified: Some("Tue, 02 Jan 2024 00:00:00 GMT"),
                },
            ],
            listing_ok: true,
            conditional_support: true,
        }
    }
}

/// Starts the stub in a background thread. Returns the base URL
/// (e.g. "http://127.0.0.1:12345"). The server runs until the process exits.
pub fn start(opts: ArchiveServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let opts = Arc::new(opts);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let opts = Arc::clone(&opts);
            thread::spawn(move || handle(stream, &opts));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn handle(mut stream: TcpStream, opts: &ArchiveServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));

    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let head_end = loop {
        match stream.read(&mut chunk) {
            Ok(0) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_head_end(&buf) {
                    break pos;
                }
                if buf.len() > 64 * 1024 {
                    return;
                }
            }
            Err(_) => return,
        }
    };

    let head = match std::str::from_utf8(&buf[..head_end]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    // Drain the request body so the client finishes sending before the reply.
    if let Some(len) = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
    {
        let mut have = buf.len().saturating_sub(head_end + 4);
        while have < len {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => have += n,
            }
        }
    }

    route(&mut stream, opts, &method, &path, &headers);
}

fn route(
    stream: &mut TcpStream,
    opts: &ArchiveServerOptions,
    method: &str,
    path: &str,
    headers: &HashMap<String, String>,
) {
    if method == "POST" && path == "/instances" {
        return respond_json(stream, "200 OK", &[], "{\"ID\":\"inst-1\"}");
    }
    if method != "GET" {
        return respond(stream, "405 Method Not Allowed", &[], b"");
    }
    if path == "/system" {
        return respond_json(stream, "200 OK", &[], "{\"Name\":\"stub-archive\"}");
    }
    if path == "/studies" {
        if !opts.listing_ok {
            return respond(stream, "500 Internal Server Error", &[], b"");
        }
        let ids: Vec<String> = opts
            .studies
            .iter()
            .map(|s| format!("\"{}\"", s.id))
            .collect();
        return respond_json(stream, "200 OK", &[], &format!("[{}]", ids.join(",")));
    }
    if let Some(rest) = path.strip_prefix("/studies/") {
        if let Some(id) = rest.strip_suffix("/instances") {
            if opts.studies.iter().any(|s| s.id == id) {
                return respond_json(stream, "200 OK", &[], "[\"inst-1\",\"inst-2\"]");
            }
        }
        if let Some(id) = rest.strip_suffix("/shared-tags") {
            if let Some(study) = opts.studies.iter().find(|s| s.id == id) {
                return shared_tags(stream, opts, study, headers);
            }
        }
    }
    respond(stream, "404 Not Found", &[], b"");
}

fn shared_tags(
    stream: &mut TcpStream,
    opts: &ArchiveServerOptions,
    study: &StudyFixture,
    headers: &HashMap<String, String>,
) {
    let mut validators: Vec<(String, String)> = Vec::new();
    if let Some(etag) = study.etag {
        validators.push(("ETag".to_string(), etag.to_string()));
    }
    if let Some(lm) = study.last_modified {
        validators.push(("Last-Modified".to_string(), lm.to_string()));
    }

    if opts.conditional_support {
        if let (Some(inm), Some(etag)) = (headers.get("if-none-match"), study.etag) {
            if inm == etag {
                return respond(stream, "304 Not Modified", &validators, b"");
            }
        }
        // The archive answers a matching If-Match like a freshness check.
        if let (Some(im), Some(etag)) = (headers.get("if-match"), study.etag) {
            if im == etag {
                return respond(stream, "304 Not Modified", &validators, b"");
            }
        }
        if let (Some(ims), Some(lm)) = (headers.get("if-modified-since"), study.last_modified) {
            if let (Some(since), Some(modified)) = (http_date::parse(ims), http_date::parse(lm)) {
                if since >= modified {
                    return respond(stream, "304 Not Modified", &validators, b"");
                }
            }
        }
    }

    respond_json(
        stream,
        "200 OK",
        &validators,
        "{\"0010,0010\":{\"Name\":\"PatientName\",\"Value\":\"DOE^JANE\"}}",
    )
}

fn respond_json(stream: &mut TcpStream, status: &str, extra: &[(String, String)], body: &str) {
    let mut with_type = vec![("Content-Type".to_string(), "application/json".to_string())];
    with_type.extend_from_slice(extra);
    respond(stream, status, &with_type, body.as_bytes());
}

fn respond(stream: &mut TcpStream, status: &str, extra: &[(String, String)], body: &[u8]) {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (name, value) in extra {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
