// Console formatting for the responses that are printed rather than saved:
// the score card, the recent scan list and the comparison of two scans.
// Every writer takes any `io::Write` so the output can be checked in tests.

use crate::models::{
    join_values, plain, AppInfo, Comparison, Difference, Finding, RecentScans, ScoreCard,
};
use crossterm::style::Stylize;
use reqwest::StatusCode;
use serde_json::Value;
use std::io::{self, Write};

fn heading<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{}", text.bold())
}

pub fn write_score_card<W: Write>(out: &mut W, card: &ScoreCard) -> io::Result<()> {
    heading(out, &format!("Security Score: {}", plain(&card.security_score)))?;
    writeln!(out, "Total Trackers: {}", plain(&card.total_trackers))?;
    writeln!(out, "Trackers: {}", plain(&card.trackers))?;

    for (level, findings) in card.severity_groups() {
        write_findings(out, level.label(), findings)?;
    }
    Ok(())
}

fn write_findings<W: Write>(out: &mut W, label: &str, findings: &[Finding]) -> io::Result<()> {
    writeln!(out)?;
    heading(out, &format!("[ {} ]", label))?;
    for finding in findings {
        writeln!(out)?;
        heading(out, &format!("< {} >", finding.title))?;
        writeln!(out, "{}", finding.description)?;
        writeln!(out, "({})", finding.section)?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_recent_scans<W: Write>(out: &mut W, scans: &RecentScans) -> io::Result<()> {
    writeln!(out)?;
    heading(out, "Recent Scans:")?;
    for scan in &scans.content {
        writeln!(out)?;
        writeln!(out, "File Name: {}", scan.file_name)?;
        writeln!(out, "Analyzer: {}", scan.analyzer)?;
        writeln!(out, "Scan Type: {}", scan.scan_type)?;
        writeln!(out, "App Name: {}", scan.app_name)?;
        writeln!(out, "Package Name: {}", scan.package_name)?;
        writeln!(out, "Version Name: {}", scan.version_name)?;
        writeln!(out, "MD5: {}", scan.md5)?;
        writeln!(out, "Timestamp: {}", scan.timestamp)?;
    }
    if scans.content.is_empty() {
        return Ok(());
    }
    if let (Some(count), Some(pages)) = (scans.count, scans.num_pages) {
        writeln!(out)?;
        writeln!(
            out,
            "{} in total, {}",
            counted(count, "scan"),
            counted(pages, "page")
        )?;
    }
    Ok(())
}

fn counted(n: u64, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

pub fn write_comparison<W: Write>(out: &mut W, cmp: &Comparison) -> io::Result<()> {
    heading(out, &format!("Title: {}", cmp.title))?;

    writeln!(out)?;
    heading(out, "First App:")?;
    write_app_info(out, &cmp.first_app)?;
    writeln!(out)?;
    heading(out, "Second App:")?;
    write_app_info(out, &cmp.second_app)?;

    writeln!(out)?;
    heading(out, "Differences:")?;
    for (category, diff) in cmp.differences() {
        write_difference(out, category, diff)?;
    }
    Ok(())
}

fn write_app_info<W: Write>(out: &mut W, app: &AppInfo) -> io::Result<()> {
    writeln!(out, "  Name and Version: {}", app.name_ver)?;
    writeln!(out, "  MD5: {}", app.md5)?;
    writeln!(out, "  File Name: {}", app.file_name)?;
    writeln!(out, "  Size: {}", plain(&app.size))?;
    writeln!(out, "  Icon Path: {}", plain(&app.icon_path))?;
    writeln!(out, "  Activities: {}", app.activities.join(", "))?;
    writeln!(out, "  Services: {}", app.services.join(", "))?;
    writeln!(out, "  Providers: {}", app.providers.join(", "))?;
    writeln!(out, "  Receivers: {}", app.receivers.join(", "))?;

    writeln!(out, "  Exported Count:")?;
    for (component, count) in &app.exported_count {
        writeln!(out, "    {}: {}", component, plain(count))?;
    }

    writeln!(out, "  APKID Information:")?;
    for (file, checks) in &app.apkid {
        match checks {
            Value::Object(checks) => {
                writeln!(out, "    {}:", file)?;
                for (check_type, results) in checks {
                    writeln!(out, "      {}: {}", check_type, join_values(results))?;
                }
            }
            other => writeln!(out, "    {}: {}", file, join_values(other))?,
        }
    }

    writeln!(out, "  Certificate Subject: {}", app.cert_subject)
}

fn write_difference<W: Write>(out: &mut W, category: &str, diff: &Difference) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}:", category)?;
    if !diff.only_first.is_empty() {
        writeln!(out, "  Only in First App:")?;
        for item in &diff.only_first {
            writeln!(out, "    - {}", plain(item))?;
        }
    }
    if !diff.only_second.is_empty() {
        writeln!(out, "  Only in Second App:")?;
        for item in &diff.only_second {
            writeln!(out, "    - {}", plain(item))?;
        }
    }
    Ok(())
}

/// Status code and raw body of a failed request.
pub fn write_status_error<W: Write>(out: &mut W, status: StatusCode, body: &str) -> io::Result<()> {
    writeln!(out, "Error: {}", status.as_u16())?;
    writeln!(out, "{}", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScanSummary;
    use serde_json::json;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_score_card_skips_absent_groups() {
        let card: ScoreCard = serde_json::from_value(json!({
            "security_score": 55,
            "total_trackers": 428,
            "trackers": 3,
            "high": [{
                "title": "Debug Enabled For App",
                "description": "Debugging was enabled on the app.",
                "section": "manifest"
            }],
            "hotspot": []
        }))
        .unwrap();

        let text = render(|out| write_score_card(out, &card));
        assert!(text.contains("Security Score: 55"));
        assert!(text.contains("Total Trackers: 428"));
        assert!(text.contains("Trackers: 3"));
        assert!(text.contains("[ High ]"));
        assert!(text.contains("< Debug Enabled For App >"));
        assert!(text.contains("(manifest)"));
        assert!(text.contains("[ Hotspot ]"));
        assert!(!text.contains("[ Warning ]"));
        assert!(!text.contains("[ Info ]"));
        assert!(!text.contains("[ Secure ]"));
    }

    #[test]
    fn test_score_card_groups_in_fixed_order() {
        let finding = json!([{"title": "t", "description": "d", "section": "s"}]);
        let card: ScoreCard = serde_json::from_value(json!({
            "security_score": 10,
            "total_trackers": 0,
            "trackers": 0,
            "secure": finding,
            "high": finding,
            "info": finding
        }))
        .unwrap();

        let text = render(|out| write_score_card(out, &card));
        let high = text.find("[ High ]").unwrap();
        let info = text.find("[ Info ]").unwrap();
        let secure = text.find("[ Secure ]").unwrap();
        assert!(high < info && info < secure);
    }

    #[test]
    fn test_recent_scans_empty_list_prints_header_only() {
        let scans = RecentScans {
            content: vec![],
            count: Some(0),
            num_pages: Some(0),
        };
        let text = render(|out| write_recent_scans(out, &scans));
        assert!(text.contains("Recent Scans:"));
        assert!(!text.contains("File Name:"));
        assert!(!text.contains("in total"));
    }

    #[test]
    fn test_recent_scans_one_block_per_record() {
        let summary = ScanSummary {
            file_name: "demo.apk".into(),
            analyzer: "static_analyzer".into(),
            scan_type: "apk".into(),
            app_name: "Demo".into(),
            package_name: "com.example.demo".into(),
            version_name: "2.1".into(),
            md5: "abc123".into(),
            timestamp: "2024-05-01T10:00:00Z".into(),
        };
        let scans = RecentScans {
            content: vec![summary.clone(), summary],
            count: Some(2),
            num_pages: Some(1),
        };
        let text = render(|out| write_recent_scans(out, &scans));
        assert_eq!(text.matches("File Name: demo.apk").count(), 2);
        assert!(text.contains("Package Name: com.example.demo"));
        assert!(text.contains("2 scans in total, 1 page\n"));
    }

    #[test]
    fn test_counted_pluralises() {
        assert_eq!(counted(1, "scan"), "1 scan");
        assert_eq!(counted(0, "page"), "0 pages");
        assert_eq!(counted(3, "page"), "3 pages");
    }

    #[test]
    fn test_app_info_keeps_server_order() {
        let app: AppInfo = serde_json::from_value(json!({
            "name_ver": "Demo - 1.0",
            "md5": "abc",
            "file_name": "demo.apk",
            "size": "1MB",
            "icon_path": "",
            "activities": [],
            "services": [],
            "providers": [],
            "receivers": [],
            "exported_count": {"exported_services": 1, "exported_activities": 2},
            "apkid": {"classes2.dex": {"obfuscator": ["DexGuard"]}, "classes.dex": {"compiler": ["r8"]}},
            "cert_subject": "CN=Demo"
        }))
        .unwrap();

        let text = render(|out| write_app_info(out, &app));
        let services = text.find("exported_services: 1").unwrap();
        let activities = text.find("exported_activities: 2").unwrap();
        assert!(services < activities);
        let second_dex = text.find("classes2.dex:").unwrap();
        let first_dex = text.find("    classes.dex:").unwrap();
        assert!(second_dex < first_dex);
        assert!(text.contains("      obfuscator: DexGuard"));
    }

    #[test]
    fn test_status_error_prints_code_and_body() {
        let text = render(|out| write_status_error(out, StatusCode::NOT_FOUND, "not here"));
        assert_eq!(text, "Error: 404\nnot here\n");
    }
}
