//! 扫描选项与统计信息（模块）
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::matcher::DEFAULT_MASK;

/// 默认输出目录（相对当前工作目录）
pub const DEFAULT_OUTPUT_DIR: &str = "FilteredFiles";
/// 默认报告路径（相对当前工作目录）
pub const DEFAULT_REPORT_PATH: &str = "Report.txt";
/// 默认允许扫描的扩展名
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["txt", "log", "cs"];
/// 默认文件间节流
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(50);

/// 遮盖副本的落盘布局
/// - Flat：仅保留文件名，不同子目录的同名文件会互相覆盖（记录冲突计数并告警）
/// - Mirror：在输出目录下镜像相对根目录的路径，不会冲突
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    #[default]
    Flat,
    Mirror,
}

/// 报告格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 扩展名白名单（不含点，忽略 ASCII 大小写）
    pub extensions: Vec<String>,
    /// 遮盖副本输出目录；首次命中时创建
    pub output_dir: PathBuf,
    pub layout: OutputLayout,
    pub report_path: PathBuf,
    pub report_format: ReportFormat,
    /// 文件间节流，降低磁盘与界面负载；取消可打断
    pub throttle: Duration,
    pub mask: char,
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            layout: OutputLayout::Flat,
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            report_format: ReportFormat::Text,
            throttle: DEFAULT_THROTTLE,
            mask: DEFAULT_MASK,
            max_file_size: None,
        }
    }
}

impl ScanOptions {
    /// 文件扩展名是否在白名单内
    pub fn is_eligible(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total_files: usize,
    pub processed: usize,
    pub matched_files: usize,
    pub replacements: usize,
    pub skipped: usize,
    pub errors: usize,
    /// Flat 布局下同名输出被覆盖的次数
    pub collisions: usize,
    /// 根目录以下被跳过的遍历错误
    pub enumeration_errors: usize,
}
