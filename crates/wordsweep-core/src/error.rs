//! 错误类型（对外暴露）
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 扫描会话中可能出现的错误
///
/// 单文件读写错误不在此列：它们被记录为 `FileStatus::Errored`，不会中断批处理。
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("forbidden word list is empty")]
    EmptyWordList,

    #[error("scan root is empty")]
    EmptyRoot,

    #[error("scan root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("scan root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    /// 根目录层面的遍历失败（子路径的遍历错误只计数、不致命）
    #[error("failed to enumerate {}: {source}", .path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read word list {}: {source}", .path.display())]
    WordsIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn scan worker: {0}")]
    Spawn(#[source] io::Error),

    #[error("scan worker panicked")]
    WorkerPanicked,
}
