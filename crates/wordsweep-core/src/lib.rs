//! 违禁词扫描与遮盖核心库
//!
//! 设计要点：
//! - 单线程扫描循环运行在后台线程；调用方通过三态控制信号（运行/暂停/取消）协作控制，
//!   信号只在文件之间被观察，不会打断正在处理的文件。
//! - 逐词、顺序相关的计数与遮盖：后一个词看到的是前一个词遮盖后的内容。
//! - 单文件错误记录为结果变体而非中断批处理；根目录级错误与报告写入错误单独上报。
//! - 报告按替换次数降序，正常结束才生成，取消不生成。

mod config;
mod control;
mod error;
mod matcher;
mod options;
mod prefilter;
mod report;
mod scan;
mod session;
mod store;
mod types;
mod words;

pub use config::{FileConfig, ScanSection, WordsSection};
pub use control::{ControlSignal, ControlState};
pub use error::ScanError;
pub use matcher::{apply, MaskResult, Matcher, DEFAULT_MASK};
pub use options::{
    OutputLayout, ReportFormat, ScanOptions, ScanStats, DEFAULT_EXTENSIONS, DEFAULT_OUTPUT_DIR,
    DEFAULT_REPORT_PATH, DEFAULT_THROTTLE,
};
pub use report::{render_text, write_report, write_report_at, NO_MATCHES, REPORT_HEADER};
pub use scan::{progress_percent, ScanObserver, ScanOutcome, ScanProgress, ScanSession};
pub use session::{start, validate, ScanEvent, ScanHandle, ScanRequest, SessionEnd};
pub use store::ResultStore;
pub use types::{FileOutcome, FileReport, FileStatus, SkipReason};
pub use words::WordSet;
