// UI layer: runs the scan workflow steps for the one-shot commands and for
// the interactive `dialoguer` menu. Each step shows a spinner while its
// request is in flight and prints its outcome; errors are reported here and
// never abort the menu.

use crate::api::{ApiClient, ScanSession};
use crate::error::ScanError;
use crate::render;
use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Extra steps to run after upload and scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extras {
    pub pdf: bool,
    pub json: bool,
    pub score: bool,
    pub delete: bool,
}

/// Show a spinner on stderr while `f` runs.
fn with_spinner<T>(msg: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}

/// Print a failed step. Precondition errors get the short message only.
fn report_error(action: &str, err: &ScanError) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match err {
        err if err.is_precondition() => writeln!(out, "{}", err),
        ScanError::Status { status, body, .. } => {
            writeln!(out, "{} failed.", action)?;
            render::write_status_error(&mut out, *status, body)
        }
        other => writeln!(out, "{} failed: {}", action, other),
    }
}

/// Returns whether the upload succeeded.
fn upload_step(session: &mut ScanSession) -> Result<bool> {
    let msg = format!("Uploading {}...", session.file_path().display());
    match with_spinner(&msg, || session.upload()) {
        Ok(uploaded) => {
            println!("Uploaded File: {}", uploaded.raw);
            Ok(true)
        }
        Err(e) => {
            report_error("Upload", &e)?;
            Ok(false)
        }
    }
}

fn scan_step(session: &ScanSession) -> Result<()> {
    match with_spinner("Scanning file...", || session.scan()) {
        Ok(reply) if reply.is_success() => println!("Successfully Scanned"),
        Ok(reply) => println!("Scan returned {}: {}", reply.status.as_u16(), reply.body),
        Err(e) => report_error("Scan", &e)?,
    }
    Ok(())
}

fn pdf_step(session: &ScanSession) -> Result<()> {
    match with_spinner("Generating PDF report...", || session.pdf()) {
        Ok(pdf) => println!("Report saved as {} ({} bytes)", pdf.path.display(), pdf.bytes),
        Err(e) => report_error("PDF report download", &e)?,
    }
    Ok(())
}

fn json_step(session: &ScanSession) -> Result<()> {
    match with_spinner("Generating JSON report...", || session.report_json()) {
        Ok(report) => println!("Report saved as {}", report.path.display()),
        Err(e) => report_error("JSON report", &e)?,
    }
    Ok(())
}

fn score_step(session: &ScanSession) -> Result<()> {
    match with_spinner("Fetching score card...", || session.score()) {
        Ok(card) => render::write_score_card(&mut io::stdout().lock(), &card)?,
        Err(e) => report_error("Score card", &e)?,
    }
    Ok(())
}

fn delete_step(session: &ScanSession) -> Result<()> {
    match with_spinner("Deleting scan...", || session.delete()) {
        Ok(reply) if reply.is_success() => println!("{}", reply.body),
        Ok(reply) => println!("Delete returned {}: {}", reply.status.as_u16(), reply.body),
        Err(e) => report_error("Delete", &e)?,
    }
    Ok(())
}

/// Print the server's recent scans.
pub fn show_recent(api: &ApiClient, page: Option<u32>, page_size: Option<u32>) -> Result<()> {
    match with_spinner("Fetching recent scans...", || api.recent_scans(page, page_size)) {
        Ok(scans) => render::write_recent_scans(&mut io::stdout().lock(), &scans)?,
        Err(e) => report_error("Listing scans", &e)?,
    }
    Ok(())
}

/// Print the comparison of two scans.
pub fn show_comparison(api: &ApiClient, first: &str, second: &str) -> Result<()> {
    match with_spinner("Comparing scans...", || api.compare(first, second)) {
        Ok(cmp) => render::write_comparison(&mut io::stdout().lock(), &cmp)?,
        Err(e) => report_error("Compare", &e)?,
    }
    Ok(())
}

/// Upload `file`, scan it, then run the requested extras in order:
/// PDF, JSON report, score card, delete.
pub fn run_scan(api: ApiClient, file: PathBuf, extras: Extras) -> Result<()> {
    let mut session = ScanSession::new(api, file);
    if !upload_step(&mut session)? {
        return Ok(());
    }
    scan_step(&session)?;
    if extras.pdf {
        pdf_step(&session)?;
    }
    if extras.json {
        json_step(&session)?;
    }
    if extras.score {
        score_step(&session)?;
    }
    if extras.delete {
        delete_step(&session)?;
    }
    Ok(())
}

/// Interactive menu. Asks for the file to upload when none was given, then
/// runs a select loop until the user chooses "Exit".
pub fn main_menu(api: ApiClient, file: Option<PathBuf>) -> Result<()> {
    let file = match file {
        Some(f) => f,
        None => {
            let path: String = Input::new().with_prompt("File to upload").interact_text()?;
            PathBuf::from(path)
        }
    };
    let mut session = ScanSession::new(api, file);

    let items = [
        "Upload",
        "Scan",
        "Download PDF report",
        "Save JSON report",
        "Score card",
        "Delete scan",
        "Recent scans",
        "Compare scans",
        "Exit",
    ];
    loop {
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => {
                upload_step(&mut session)?;
            }
            1 => scan_step(&session)?,
            2 => pdf_step(&session)?,
            3 => json_step(&session)?,
            4 => score_step(&session)?,
            5 => {
                if session.scan_hash().is_none() {
                    report_error("Delete", &ScanError::NoHash)?;
                    continue;
                }
                let confirmed = Confirm::new()
                    .with_prompt("Delete this scan from the server?")
                    .default(false)
                    .interact()?;
                if confirmed {
                    delete_step(&session)?;
                }
            }
            6 => show_recent(session.api(), None, None)?,
            7 => {
                let (first, second) = prompt_hashes(session.scan_hash())?;
                show_comparison(session.api(), &first, &second)?;
            }
            8 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Ask for the two hashes to compare, offering this session's hash as the
/// first one.
fn prompt_hashes(own: Option<&str>) -> Result<(String, String)> {
    let mut input = Input::<String>::new();
    input.with_prompt("First scan hash");
    if let Some(hash) = own {
        input.default(hash.to_string());
    }
    let first = input.interact_text()?;
    let second: String = Input::new().with_prompt("Second scan hash").interact_text()?;
    Ok((first, second))
}
