// Typed records for the MobSF REST responses this client reads.
//
// Only the fields the client actually uses are modelled. Required fields are
// plain types so a missing one fails decoding with a clear error; fields the
// server may omit are `Option`.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Response of `POST /api/v1/upload`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub hash: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub scan_type: Option<String>,
    #[serde(default)]
    pub analyzer: Option<String>,
}

/// Outcome of a successful upload: the decoded record plus the raw body,
/// which is echoed back to the user.
#[derive(Debug, Clone)]
pub struct Uploaded {
    pub response: UploadResponse,
    pub raw: String,
}

/// Status and body of an endpoint whose answer is echoed rather than decoded
/// (`scan`, `delete_scan`).
#[derive(Debug, Clone)]
pub struct ServerReply {
    pub status: StatusCode,
    pub body: String,
}

impl ServerReply {
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfReport {
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonReport {
    pub path: PathBuf,
}

/// Response of `GET /api/v1/scans`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecentScans {
    pub content: Vec<ScanSummary>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub num_pages: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ScanSummary {
    pub file_name: String,
    pub analyzer: String,
    pub scan_type: String,
    pub app_name: String,
    pub package_name: String,
    pub version_name: String,
    pub md5: String,
    pub timestamp: String,
}

/// Severity levels of a score card, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Warning,
    Info,
    Secure,
    Hotspot,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::High,
        Severity::Warning,
        Severity::Info,
        Severity::Secure,
        Severity::Hotspot,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
            Severity::Secure => "Secure",
            Severity::Hotspot => "Hotspot",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Finding {
    pub title: String,
    pub description: String,
    pub section: String,
}

/// Response of `POST /api/v1/scorecard`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub security_score: Value,
    pub total_trackers: Value,
    pub trackers: Value,
    #[serde(default)]
    pub high: Option<Vec<Finding>>,
    #[serde(default)]
    pub warning: Option<Vec<Finding>>,
    #[serde(default)]
    pub info: Option<Vec<Finding>>,
    #[serde(default)]
    pub secure: Option<Vec<Finding>>,
    #[serde(default)]
    pub hotspot: Option<Vec<Finding>>,
}

impl ScoreCard {
    pub fn findings(&self, level: Severity) -> Option<&[Finding]> {
        let group = match level {
            Severity::High => &self.high,
            Severity::Warning => &self.warning,
            Severity::Info => &self.info,
            Severity::Secure => &self.secure,
            Severity::Hotspot => &self.hotspot,
        };
        group.as_deref()
    }

    /// Severity groups present in the response, in display order.
    pub fn severity_groups(&self) -> impl Iterator<Item = (Severity, &[Finding])> + '_ {
        Severity::ALL
            .into_iter()
            .filter_map(move |level| self.findings(level).map(|group| (level, group)))
    }
}

/// Response of `POST /api/v1/compare`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comparison {
    pub title: String,
    pub first_app: AppInfo,
    pub second_app: AppInfo,
    pub urls: Difference,
    pub android_api: Difference,
    pub permissions: Difference,
    pub browsable_activities: Difference,
    pub apkid: Difference,
}

impl Comparison {
    /// Diff categories with their display names, in display order.
    pub fn differences(&self) -> [(&'static str, &Difference); 5] {
        [
            ("URLs", &self.urls),
            ("Android APIs", &self.android_api),
            ("Permissions", &self.permissions),
            ("Browsable Activities", &self.browsable_activities),
            ("APKID", &self.apkid),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppInfo {
    pub name_ver: String,
    pub md5: String,
    pub file_name: String,
    pub size: Value,
    pub icon_path: Value,
    pub activities: Vec<String>,
    pub services: Vec<String>,
    pub providers: Vec<String>,
    pub receivers: Vec<String>,
    /// Kept in server order.
    pub exported_count: Map<String, Value>,
    /// Detector output keyed by dex file, then by check type.
    pub apkid: Map<String, Value>,
    pub cert_subject: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Difference {
    pub only_first: Vec<Value>,
    pub only_second: Vec<Value>,
}

/// Text form of a loosely typed JSON value: strings without quotes,
/// everything else as compact JSON.
pub fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Arrays as a comma separated list of their items, anything else as
/// `plain` text.
pub fn join_values(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(", "),
        other => plain(other),
    }
}
