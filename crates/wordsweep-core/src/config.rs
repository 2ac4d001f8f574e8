//! 配置文件加载（TOML）
//!
//! ```toml
//! [scan]
//! extensions = ["txt", "log", "cs"]
//! output_dir = "FilteredFiles"
//! report_path = "Report.txt"
//! report_format = "text"   # 或 "json"
//! layout = "flat"          # 或 "mirror"
//! throttle_ms = 50
//! mask = "*"
//! max_file_size = 5242880
//!
//! [words]
//! list = ["foo", "bar"]
//! file = "words.txt"       # 相对配置文件所在目录
//! ```
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ScanError;
use crate::options::{OutputLayout, ReportFormat, ScanOptions};
use crate::words::WordSet;

/// `[scan]` 段：全部可选，缺省沿用 `ScanOptions::default()`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanSection {
    pub extensions: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub report_format: Option<ReportFormat>,
    pub layout: Option<OutputLayout>,
    pub throttle_ms: Option<u64>,
    pub mask: Option<String>,
    pub max_file_size: Option<u64>,
}

/// `[words]` 段：内联列表与词表文件可同时给出，按“列表在前、文件在后”合并
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WordsSection {
    #[serde(default)]
    pub list: Vec<String>,
    pub file: Option<PathBuf>,
}

/// 顶层配置文件结构
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub words: WordsSection,
    /// 配置文件所在目录，用于解析相对路径
    #[serde(skip)]
    base_dir: PathBuf,
}

impl FileConfig {
    /// 从 TOML 文本解析；`origin` 为配置文件路径，其父目录用于解析 `words.file`
    pub fn parse(txt: &str, origin: &Path) -> Result<Self, ScanError> {
        let mut cfg: FileConfig = toml::from_str(txt).map_err(|e| ScanError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        if let Some(mask) = &cfg.scan.mask {
            if mask.chars().count() != 1 {
                return Err(ScanError::Config {
                    path: origin.to_path_buf(),
                    message: format!("mask must be a single character, got {mask:?}"),
                });
            }
        }
        cfg.base_dir = origin.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(cfg)
    }

    /// 读取并解析配置文件
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let txt = std::fs::read_to_string(path).map_err(|source| ScanError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&txt, path)
    }

    /// 将配置覆盖到扫描选项上（仅覆盖显式给出的字段）
    pub fn apply_to(&self, opts: &mut ScanOptions) {
        let s = &self.scan;
        if let Some(exts) = &s.extensions {
            opts.extensions = exts.clone();
        }
        if let Some(dir) = &s.output_dir {
            opts.output_dir = dir.clone();
        }
        if let Some(path) = &s.report_path {
            opts.report_path = path.clone();
        }
        if let Some(fmt) = s.report_format {
            opts.report_format = fmt;
        }
        if let Some(layout) = s.layout {
            opts.layout = layout;
        }
        if let Some(ms) = s.throttle_ms {
            opts.throttle = Duration::from_millis(ms);
        }
        if let Some(mask) = s.mask.as_deref().and_then(|m| m.chars().next()) {
            opts.mask = mask;
        }
        if s.max_file_size.is_some() {
            opts.max_file_size = s.max_file_size;
        }
    }

    /// 配置中声明的违禁词（内联列表 + 词表文件）
    pub fn words(&self) -> Result<WordSet, ScanError> {
        let mut set = WordSet::from_list(&self.words.list);
        if let Some(file) = &self.words.file {
            let path = if file.is_absolute() { file.clone() } else { self.base_dir.join(file) };
            set.extend(WordSet::from_file(&path)?);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_defaults() {
        let cfg = FileConfig::parse("", Path::new("wordsweep.toml")).unwrap();
        let mut opts = ScanOptions::default();
        cfg.apply_to(&mut opts);
        assert_eq!(opts.extensions, vec!["txt", "log", "cs"]);
        assert_eq!(opts.throttle, Duration::from_millis(50));
        assert!(cfg.words().unwrap().is_empty());
    }

    #[test]
    fn overrides_scan_section() {
        let txt = r##"
            [scan]
            extensions = ["md"]
            layout = "mirror"
            report_format = "json"
            throttle_ms = 0
            mask = "#"
            max_file_size = 1024

            [words]
            list = ["alpha", " beta ", ""]
        "##;
        let cfg = FileConfig::parse(txt, Path::new("cfg/wordsweep.toml")).unwrap();
        let mut opts = ScanOptions::default();
        cfg.apply_to(&mut opts);
        assert_eq!(opts.extensions, vec!["md"]);
        assert_eq!(opts.layout, OutputLayout::Mirror);
        assert_eq!(opts.report_format, ReportFormat::Json);
        assert_eq!(opts.throttle, Duration::ZERO);
        assert_eq!(opts.mask, '#');
        assert_eq!(opts.max_file_size, Some(1024));
        assert_eq!(cfg.words().unwrap().as_slice(), &["alpha", "beta"]);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = FileConfig::parse("[scan]\nthreads = 4\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
    }

    #[test]
    fn rejects_multi_char_mask() {
        let err = FileConfig::parse("[scan]\nmask = \"**\"\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
    }

    #[test]
    fn words_file_resolves_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("words.txt"), "gamma;delta").unwrap();
        let cfg_path = dir.path().join("wordsweep.toml");
        std::fs::write(&cfg_path, "[words]\nlist = [\"alpha\"]\nfile = \"words.txt\"\n").unwrap();

        let cfg = FileConfig::load(&cfg_path).unwrap();
        assert_eq!(cfg.words().unwrap().as_slice(), &["alpha", "gamma", "delta"]);
    }
}
