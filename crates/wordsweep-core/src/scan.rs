//! 扫描主流程（单线程扫描循环）
//!
//! 流程：
//! - 先完整遍历根目录，按文件名排序收集白名单扩展名的文件，确保处理顺序可复现。
//! - 逐文件：检查点（取消 → 立即停止；暂停 → 条件变量等待）→ 读取 → 遮盖 → 落盘 → 进度。
//! - 单文件错误只记录为 `FileStatus`，不中断批处理；根目录层面的遍历错误致命。
//! - 取消前已累积的结果全部保留，不回滚。
use std::collections::HashSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::control::{Checkpoint, ControlSignal};
use crate::error::ScanError;
use crate::matcher::Matcher;
use crate::options::{OutputLayout, ScanOptions, ScanStats};
use crate::store::ResultStore;
use crate::types::{FileOutcome, FileReport, FileStatus, SkipReason};
use crate::words::WordSet;

/// 扫描观察者：进度与单文件结果回调（均在扫描线程上调用）
pub trait ScanObserver {
    /// 每处理或跳过一个文件后调用，取值 `[0, 100]`，单调不减
    fn on_progress(&mut self, _percent: f64) {}
    fn on_file(&mut self, _report: &FileReport) {}
}

impl ScanObserver for () {}

/// 进度计数器；扫描线程写，调用方可随时读
#[derive(Debug, Default)]
pub struct ScanProgress {
    total: AtomicUsize,
    processed: AtomicUsize,
    done: AtomicBool,
}

impl ScanProgress {
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Acquire)
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Acquire)
    }

    /// 当前百分比；空会话在正常结束后为 100
    pub fn percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return if self.done.load(Ordering::Acquire) { 100.0 } else { 0.0 };
        }
        progress_percent(self.processed(), total)
    }

    fn start(&self, total: usize) {
        self.processed.store(0, Ordering::Release);
        self.done.store(false, Ordering::Release);
        self.total.store(total, Ordering::Release);
    }

    fn advance(&self) -> usize {
        self.processed.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn finish(&self) {
        self.done.store(true, Ordering::Release);
    }
}

/// `processed / total * 100`；`processed == total` 时恰为 100
pub fn progress_percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    processed as f64 / total as f64 * 100.0
}

/// 一次会话的结果
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// 有命中的文件，按替换次数降序
    pub results: Vec<FileOutcome>,
    /// 每个被访问文件的处理结果（按处理顺序）
    pub files: Vec<FileReport>,
    pub stats: ScanStats,
    pub cancelled: bool,
    /// 正常结束并写出报告后的报告路径
    pub report: Option<PathBuf>,
}

/// 单次扫描会话：根目录、词表快照、控制信号、计数器与结果存储
pub struct ScanSession {
    root: PathBuf,
    matcher: Matcher,
    signal: ControlSignal,
    options: ScanOptions,
    store: Arc<ResultStore>,
    progress: Arc<ScanProgress>,
}

impl ScanSession {
    pub fn new(root: impl Into<PathBuf>, words: WordSet, signal: ControlSignal, options: ScanOptions) -> Self {
        let matcher = Matcher::new(words, options.mask);
        Self {
            root: root.into(),
            matcher,
            signal,
            options,
            store: Arc::new(ResultStore::new()),
            progress: Arc::new(ScanProgress::default()),
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn store(&self) -> Arc<ResultStore> {
        Arc::clone(&self.store)
    }

    pub fn progress(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    /// 执行扫描循环；返回 Err 仅代表根目录层面的致命错误
    ///
    /// 每次调用都是独立的一轮：结果存储与进度在开始时清零。
    pub fn run(&self, observer: &mut dyn ScanObserver) -> Result<ScanOutcome, ScanError> {
        self.store.clear();
        self.progress.start(0);
        let (files, enumeration_errors) = enumerate(&self.root, &self.options)?;
        let total = files.len();
        self.progress.start(total);
        info!(root = %self.root.display(), total, words = self.matcher.words().len(), "starting scan");

        let mut stats = ScanStats { total_files: total, enumeration_errors, ..Default::default() };
        let mut reports = Vec::with_capacity(total);
        let mut written: HashSet<PathBuf> = HashSet::new();
        let mut cancelled = false;

        for (idx, path) in files.iter().enumerate() {
            if self.signal.checkpoint() == Checkpoint::Cancelled {
                cancelled = true;
                break;
            }

            let status = self.process_file(path, &mut written, &mut stats);
            match &status {
                FileStatus::Processed { replacements } => {
                    if *replacements > 0 {
                        stats.matched_files += 1;
                        stats.replacements += replacements;
                    }
                }
                FileStatus::Skipped { .. } => stats.skipped += 1,
                FileStatus::Errored { .. } => stats.errors += 1,
            }
            let report = FileReport { path: path.clone(), status };
            observer.on_file(&report);
            reports.push(report);

            stats.processed = self.progress.advance();
            observer.on_progress(progress_percent(stats.processed, total));

            // 最后一个文件之后不再节流
            if idx + 1 < total && self.signal.throttle(self.options.throttle) == Checkpoint::Cancelled {
                cancelled = true;
                break;
            }
        }

        if cancelled {
            info!(processed = stats.processed, total, "scan cancelled");
        } else {
            if total == 0 {
                observer.on_progress(100.0);
            }
            self.progress.finish();
            info!(
                processed = stats.processed,
                matched = stats.matched_files,
                replacements = stats.replacements,
                errors = stats.errors,
                "scan finished"
            );
        }

        Ok(ScanOutcome {
            results: self.store.snapshot(),
            files: reports,
            stats,
            cancelled,
            report: None,
        })
    }

    /// 处理单个文件；任何 I/O 错误都转为 `FileStatus`，不向上传播
    fn process_file(&self, path: &Path, written: &mut HashSet<PathBuf>, stats: &mut ScanStats) -> FileStatus {
        let meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) => return errored(path, "stat", &e),
        };
        if let Some(max) = self.options.max_file_size {
            if meta.len() > max {
                debug!(path = %path.display(), size = meta.len(), "skipped: too large");
                return FileStatus::Skipped { reason: SkipReason::TooLarge };
            }
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                debug!(path = %path.display(), "skipped: not utf-8");
                return FileStatus::Skipped { reason: SkipReason::NotUtf8 };
            }
            Err(e) => return errored(path, "read", &e),
        };

        let masked = self.matcher.apply(&content);
        if masked.replacements == 0 {
            debug!(path = %path.display(), "no matches");
            return FileStatus::Processed { replacements: 0 };
        }

        let dest = self.destination(path);
        if !written.insert(dest.clone()) {
            stats.collisions += 1;
            warn!(path = %path.display(), dest = %dest.display(), "output name collision, overwriting");
        }
        if let Err(e) = write_masked(&dest, &masked.content) {
            return errored(path, "write", &e);
        }

        self.store.add(FileOutcome {
            path: path.to_path_buf(),
            size: meta.len(),
            replacements: masked.replacements,
        });
        debug!(path = %path.display(), replacements = masked.replacements, "masked");
        FileStatus::Processed { replacements: masked.replacements }
    }

    /// 遮盖副本的落盘位置
    fn destination(&self, path: &Path) -> PathBuf {
        let name = path.file_name().map(PathBuf::from).unwrap_or_default();
        match self.options.layout {
            OutputLayout::Flat => self.options.output_dir.join(name),
            OutputLayout::Mirror => match path.strip_prefix(&self.root) {
                Ok(rel) => self.options.output_dir.join(rel),
                Err(_) => self.options.output_dir.join(name),
            },
        }
    }
}

fn errored(path: &Path, op: &str, err: &io::Error) -> FileStatus {
    warn!(path = %path.display(), error = %err, "{op} failed, file skipped");
    FileStatus::Errored { message: format!("{op} failed: {err}") }
}

fn write_masked(dest: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, content)
}

/// 递归遍历根目录，按文件名排序收集候选文件
/// - 根目录本身不可读：致命错误
/// - 子路径遍历错误：告警并计数后跳过
/// - 位于根目录下的输出目录不参与遍历
fn enumerate(root: &Path, opts: &ScanOptions) -> Result<(Vec<PathBuf>, usize), ScanError> {
    fs::read_dir(root).map_err(|source| ScanError::Enumeration { path: root.to_path_buf(), source })?;

    let output_dir = fs::canonicalize(&opts.output_dir).ok();
    let mut files: Vec<PathBuf> = vec![];
    let mut errors = 0usize;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_output_dir(e, output_dir.as_deref()));
    for entry in walker {
        match entry {
            Ok(e) => {
                // 指向普通文件的符号链接同样参与扫描
                let is_file = e.file_type().is_file() || (e.path_is_symlink() && e.path().is_file());
                if is_file && opts.is_eligible(e.path()) {
                    files.push(e.into_path());
                }
            }
            Err(err) if err.depth() == 0 => {
                return Err(ScanError::Enumeration { path: root.to_path_buf(), source: err.into() });
            }
            Err(err) => {
                errors += 1;
                warn!(path = ?err.path(), error = %err, "enumeration error, skipped");
            }
        }
    }

    Ok((files, errors))
}

fn is_output_dir(entry: &DirEntry, output_dir: Option<&Path>) -> bool {
    match output_dir {
        Some(out) if entry.file_type().is_dir() => {
            fs::canonicalize(entry.path()).map(|p| p == out).unwrap_or(false)
        }
        _ => false,
    }
}
