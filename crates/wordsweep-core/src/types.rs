//! 公共类型（对外暴露）
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// 单个有命中文件的记录；仅当替换次数 > 0 时创建
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// 原始文件大小（字节）
    pub size: u64,
    pub replacements: usize,
}

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// 超过 `max_file_size`
    TooLarge,
    /// 内容不是合法 UTF-8
    NotUtf8,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooLarge => f.write_str("file too large"),
            SkipReason::NotUtf8 => f.write_str("not valid UTF-8"),
        }
    }
}

/// 单文件处理结果；任何一种都不会中断批处理
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Processed { replacements: usize },
    Skipped { reason: SkipReason },
    Errored { message: String },
}

/// 每个文件处理完毕后发给观察者的报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_reason_reads_as_log_text() {
        assert_eq!(SkipReason::TooLarge.to_string(), "file too large");
        assert_eq!(SkipReason::NotUtf8.to_string(), "not valid UTF-8");
    }
}
