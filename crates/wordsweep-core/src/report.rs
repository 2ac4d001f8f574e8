//! 报告输出（文本 / JSON）
//!
//! 文本格式：
//! ```text
//! Forbidden word scan report:
//!
//! <path> | <size> bytes | <count> replacements
//! ...
//!
//! Scan completed at <timestamp>
//! ```
//! 无命中时文件行替换为单行 `no matches found`。
//! 写入先落到同目录临时文件，成功后再重命名，调用方要么看到完整报告，要么得到错误。
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::ScanError;
use crate::options::ReportFormat;
use crate::store::sort_outcomes;
use crate::types::FileOutcome;

pub const REPORT_HEADER: &str = "Forbidden word scan report:";
pub const NO_MATCHES: &str = "no matches found";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// JSON 报告结构
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    completed_at: String,
    no_matches: bool,
    results: &'a [FileOutcome],
}

/// 渲染文本报告（`results` 需已按替换次数降序排列）
pub fn render_text(results: &[FileOutcome], completed_at: &DateTime<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{REPORT_HEADER}");
    let _ = writeln!(out);
    for r in results {
        let _ = writeln!(out, "{} | {} bytes | {} replacements", r.path.display(), r.size, r.replacements);
    }
    if results.is_empty() {
        let _ = writeln!(out, "{NO_MATCHES}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Scan completed at {}", completed_at.format(TIMESTAMP_FORMAT));
    out
}

/// 以当前时间写出报告
pub fn write_report(results: &[FileOutcome], path: &Path, format: ReportFormat) -> Result<(), ScanError> {
    write_report_at(results, path, format, &Local::now())
}

/// 以指定完成时间写出报告；结果在写出前再做一次稳定降序排序
pub fn write_report_at(
    results: &[FileOutcome],
    path: &Path,
    format: ReportFormat,
    completed_at: &DateTime<Local>,
) -> Result<(), ScanError> {
    let mut sorted = results.to_vec();
    sort_outcomes(&mut sorted);

    let body = match format {
        ReportFormat::Text => render_text(&sorted, completed_at),
        ReportFormat::Json => {
            let report = JsonReport {
                completed_at: completed_at.to_rfc3339(),
                no_matches: sorted.is_empty(),
                results: &sorted,
            };
            serde_json::to_string_pretty(&report)?
        }
    };

    let report_err = |source| ScanError::Report { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(report_err)?;
    }

    let tmp = temp_path(path);
    let written = (|| {
        let mut out = BufWriter::new(File::create(&tmp)?);
        out.write_all(body.as_bytes())?;
        out.flush()?;
        fs::rename(&tmp, path)
    })();
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(report_err(err));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn outcome(path: &str, size: u64, replacements: usize) -> FileOutcome {
        FileOutcome { path: PathBuf::from(path), size, replacements }
    }

    #[test]
    fn renders_lines_in_order() {
        let results = vec![outcome("b.txt", 20, 7), outcome("a.txt", 10, 2)];
        let text = render_text(&results, &ts());
        let expected = "Forbidden word scan report:\n\
                        \n\
                        b.txt | 20 bytes | 7 replacements\n\
                        a.txt | 10 bytes | 2 replacements\n\
                        \n\
                        Scan completed at 2024-03-09 14:05:07\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn renders_no_matches_marker() {
        let text = render_text(&[], &ts());
        assert!(text.contains(NO_MATCHES));
        assert!(!text.contains(" | "));
        assert!(text.trim_end().ends_with("Scan completed at 2024-03-09 14:05:07"));
    }

    #[test]
    fn write_sorts_descending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Report.txt");
        let results = vec![outcome("low.txt", 1, 1), outcome("high.txt", 1, 9), outcome("mid.txt", 1, 4)];
        write_report_at(&results, &path, ReportFormat::Text, &ts()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let order: Vec<_> = text.lines().filter(|l| l.contains(" | ")).collect();
        assert_eq!(order.len(), 3);
        assert!(order[0].starts_with("high.txt"));
        assert!(order[1].starts_with("mid.txt"));
        assert!(order[2].starts_with("low.txt"));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn writes_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        write_report_at(&[outcome("x.log", 3, 2)], &path, ReportFormat::Json, &ts()).unwrap();

        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["no_matches"], false);
        assert_eq!(v["results"][0]["path"], "x.log");
        assert_eq!(v["results"][0]["size"], 3);
        assert_eq!(v["results"][0]["replacements"], 2);
    }

    #[test]
    fn failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // 目标路径是已存在的目录，重命名失败
        let path = dir.path().join("occupied");
        fs::create_dir_all(path.join("inner")).unwrap();
        let err = write_report_at(&[], &path, ReportFormat::Text, &ts()).unwrap_err();
        assert!(matches!(err, ScanError::Report { .. }));
        assert!(!temp_path(&path).exists());
    }
}
