// API client module: a small blocking HTTP client for the MobSF REST API.
//
// `ApiClient` knows how to reach the server. `ScanSession` adds the state of
// one artifact's workflow: upload first, which yields the scan hash, then any
// of the hash-dependent calls. Every call is a single synchronous request.

use crate::config::ClientConfig;
use crate::error::{Result, ScanError};
use crate::models::{
    Comparison, JsonReport, PdfReport, RecentScans, ScoreCard, ServerReply, UploadResponse,
    Uploaded,
};
use log::{debug, info, warn};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const UPLOAD: &str = "/api/v1/upload";
pub const SCAN: &str = "/api/v1/scan";
pub const DOWNLOAD_PDF: &str = "/api/v1/download_pdf";
pub const REPORT_JSON: &str = "/api/v1/report_json";
pub const DELETE_SCAN: &str = "/api/v1/delete_scan";
pub const SCANS: &str = "/api/v1/scans";
pub const SCORECARD: &str = "/api/v1/scorecard";
pub const COMPARE: &str = "/api/v1/compare";

/// Size of the buffer used when streaming the PDF report to disk.
pub const CHUNK_SIZE: usize = 1024;

pub const REPORT_JSON_FILE: &str = "report.json";

/// File name the PDF report for `hash` is saved under.
pub fn pdf_file_name(hash: &str) -> String {
    format!("static-{}.pdf", hash)
}

/// Holds a reqwest blocking client that sends the API key on every request,
/// the server base URL and the directory reports are written to.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    output_dir: PathBuf,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut key = HeaderValue::from_str(&config.api_key)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(ApiClient {
            client,
            base_url: config.server.trim_end_matches('/').to_string(),
            output_dir: config.output_dir.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn post_form<T: Serialize + ?Sized>(&self, endpoint: &'static str, form: &T) -> Result<Response> {
        debug!("POST {}", endpoint);
        let res = self.client.post(self.url(endpoint)).form(form).send()?;
        debug!("{} -> {}", endpoint, res.status());
        Ok(res)
    }

    fn post_hash(&self, endpoint: &'static str, hash: &str) -> Result<Response> {
        self.post_form(endpoint, &[("hash", hash)])
    }

    /// List scans known to the server. `page` and `page_size` are passed
    /// through as query parameters when given.
    pub fn recent_scans(&self, page: Option<u32>, page_size: Option<u32>) -> Result<RecentScans> {
        let query: Vec<(&str, u32)> = [("page", page), ("page_size", page_size)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();

        debug!("GET {} {:?}", SCANS, query);
        let mut req = self.client.get(self.url(SCANS));
        if !query.is_empty() {
            req = req.query(&query);
        }
        let res = req.send()?;
        let scans: RecentScans = decode(SCANS, res)?;
        info!("Server reported {} recent scans", scans.content.len());
        Ok(scans)
    }

    /// Compare two previously scanned artifacts by hash.
    pub fn compare(&self, first: &str, second: &str) -> Result<Comparison> {
        info!("Comparing {} with {}", first, second);
        let res = self.post_form(COMPARE, &[("hash1", first), ("hash2", second)])?;
        decode(COMPARE, res)
    }
}

/// Turn a non-200 response into a `Status` error carrying the raw body.
fn status_error(endpoint: &'static str, res: Response) -> ScanError {
    let status = res.status();
    let body = res.text().unwrap_or_default();
    warn!("{} failed with {}", endpoint, status);
    ScanError::Status {
        endpoint,
        status,
        body,
    }
}

/// Check for HTTP 200, then decode the body. The body is not parsed at all
/// when the status is anything else.
fn decode<T: DeserializeOwned>(endpoint: &'static str, res: Response) -> Result<T> {
    if res.status() != StatusCode::OK {
        return Err(status_error(endpoint, res));
    }
    let body = res.text()?;
    serde_json::from_str(&body).map_err(|source| ScanError::Decode { endpoint, source })
}

fn reply(endpoint: &'static str, res: Response) -> Result<ServerReply> {
    let status = res.status();
    let body = res.text()?;
    if status != StatusCode::OK {
        warn!("{} answered {}", endpoint, status);
    }
    Ok(ServerReply { status, body })
}

/// Create `path` and fill it with `fill`. If filling or flushing fails the
/// partial file is removed.
fn write_file_or_discard<T>(
    path: &Path,
    fill: impl FnOnce(&mut File) -> io::Result<T>,
) -> Result<T> {
    let mut file = File::create(path).map_err(|e| ScanError::io(path, e))?;
    let filled = fill(&mut file).and_then(|out| file.flush().map(|_| out));
    match filled {
        Ok(out) => Ok(out),
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(path);
            Err(ScanError::io(path, e))
        }
    }
}

/// Copy `reader` into a new file at `path` in fixed-size chunks.
fn stream_to_file<R: Read>(reader: &mut R, path: &Path) -> Result<u64> {
    write_file_or_discard(path, |file| {
        let mut buf = [0u8; CHUNK_SIZE];
        let mut total: u64 = 0;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => return Ok(total),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            file.write_all(&buf[..n])?;
            total += n as u64;
        }
    })
}

/// Write `value` with a 4-space indent. Object keys keep the order the
/// server sent them in.
fn write_pretty_json(value: &Value, path: &Path) -> Result<()> {
    write_file_or_discard(path, |file| {
        let mut writer = BufWriter::new(file);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
        value.serialize(&mut ser).map_err(io::Error::from)?;
        writer.flush()
    })
}

/// One artifact's scan workflow. The hash is set once by a successful
/// `upload` and never cleared, so a session is single-use.
#[derive(Debug)]
pub struct ScanSession {
    api: ApiClient,
    file_path: PathBuf,
    scan_hash: Option<String>,
}

impl ScanSession {
    pub fn new(api: ApiClient, file_path: impl Into<PathBuf>) -> Self {
        ScanSession {
            api,
            file_path: file_path.into(),
            scan_hash: None,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn scan_hash(&self) -> Option<&str> {
        self.scan_hash.as_deref()
    }

    fn require_hash(&self) -> Result<&str> {
        match self.scan_hash.as_deref() {
            Some(hash) if !hash.is_empty() => Ok(hash),
            _ => Err(ScanError::NoHash),
        }
    }

    /// Upload the artifact as multipart field `file` and remember the hash
    /// the server assigns to it.
    pub fn upload(&mut self) -> Result<Uploaded> {
        if let Some(hash) = &self.scan_hash {
            return Err(ScanError::AlreadyUploaded { hash: hash.clone() });
        }

        let path = &self.file_path;
        let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
        let len = file.metadata().map_err(|e| ScanError::io(path, e))?.len();
        // the server detects the file type from the extension, so keep it
        // even when the name is not valid UTF-8
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.apk".to_string());
        info!("Uploading {} ({} bytes)", path.display(), len);

        // reader_with_length streams the file with a known Content-Length
        let part = multipart::Part::reader_with_length(file, len)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new().part("file", part);

        debug!("POST {}", UPLOAD);
        let res = self.api.client.post(self.api.url(UPLOAD)).multipart(form).send()?;
        let status = res.status();
        let raw = res.text()?;

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(_) if status != StatusCode::OK => {
                return Err(ScanError::Status {
                    endpoint: UPLOAD,
                    status,
                    body: raw,
                })
            }
            Err(source) => {
                return Err(ScanError::Decode {
                    endpoint: UPLOAD,
                    source,
                })
            }
        };
        match value.get("hash").and_then(Value::as_str) {
            Some(hash) if !hash.is_empty() => {}
            _ => return Err(ScanError::MissingHash { body: raw }),
        }
        let response: UploadResponse = serde_json::from_value(value)
            .map_err(|source| ScanError::Decode {
                endpoint: UPLOAD,
                source,
            })?;

        info!("Upload accepted, hash {}", response.hash);
        self.scan_hash = Some(response.hash.clone());
        Ok(Uploaded { response, raw })
    }

    /// Ask the server to run static analysis on the uploaded artifact. The
    /// status is surfaced to the caller but not enforced.
    pub fn scan(&self) -> Result<ServerReply> {
        let hash = self.require_hash()?;
        info!("Scanning {}", hash);
        let res = self.api.post_hash(SCAN, hash)?;
        reply(SCAN, res)
    }

    /// Download the PDF report as `static-<hash>.pdf` in the output
    /// directory, overwriting any existing file.
    pub fn pdf(&self) -> Result<PdfReport> {
        let hash = self.require_hash()?;
        let mut res = self.api.post_hash(DOWNLOAD_PDF, hash)?;
        if res.status() != StatusCode::OK {
            return Err(status_error(DOWNLOAD_PDF, res));
        }

        let path = self.api.output_dir.join(pdf_file_name(hash));
        let bytes = stream_to_file(&mut res, &path)?;
        info!("Saved {} ({} bytes)", path.display(), bytes);
        Ok(PdfReport { path, bytes })
    }

    /// Fetch the JSON report and save it, pretty-printed, as `report.json`.
    pub fn report_json(&self) -> Result<JsonReport> {
        let hash = self.require_hash()?;
        let res = self.api.post_hash(REPORT_JSON, hash)?;
        let report: Value = decode(REPORT_JSON, res)?;

        let path = self.api.output_dir.join(REPORT_JSON_FILE);
        write_pretty_json(&report, &path)?;
        info!("Saved {}", path.display());
        Ok(JsonReport { path })
    }

    /// Remove the scan from the server. The reply is returned as-is.
    pub fn delete(&self) -> Result<ServerReply> {
        let hash = self.require_hash()?;
        info!("Deleting scan {}", hash);
        let res = self.api.post_hash(DELETE_SCAN, hash)?;
        reply(DELETE_SCAN, res)
    }

    /// Does not depend on this session's hash.
    pub fn recent_scans(&self, page: Option<u32>, page_size: Option<u32>) -> Result<RecentScans> {
        self.api.recent_scans(page, page_size)
    }

    pub fn score(&self) -> Result<ScoreCard> {
        let hash = self.require_hash()?;
        let res = self.api.post_hash(SCORECARD, hash)?;
        decode(SCORECARD, res)
    }

    /// Compare two scans by hash. Either may be this session's own hash.
    pub fn compare(&self, first: &str, second: &str) -> Result<Comparison> {
        self.api.compare(first, second)
    }
}
