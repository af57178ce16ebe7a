// Library root
// -----------
// A client for the MobSF REST API. The binary (`main.rs`) wires these
// modules into a command-line tool.
//
// Module responsibilities:
// - `api`: HTTP calls and the per-artifact `ScanSession` (upload, scan,
//   reports, score card, delete, recent scans, compare).
// - `models`: typed records for the JSON responses.
// - `render`: console formatting of score cards, scan lists, comparisons.
// - `ui`: one-shot command flows and the interactive menu.
// - `cli`, `config`, `logging`, `error`: argument parsing, settings,
//   log setup and the error type.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod render;
pub mod ui;

pub use api::{ApiClient, ScanSession};
pub use config::ClientConfig;
pub use error::ScanError;
