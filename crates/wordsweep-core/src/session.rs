//! 后台会话：参数校验、扫描线程、事件通道与控制句柄
//!
//! 调用方只通过 `ControlSignal` 与事件通道与扫描线程交互，
//! 从不直接修改扫描线程持有的状态。
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{self as channel, Receiver, Sender};
use tracing::{error, info};

use crate::control::{ControlSignal, ControlState};
use crate::error::ScanError;
use crate::options::ScanOptions;
use crate::report::write_report;
use crate::scan::{ScanObserver, ScanOutcome, ScanProgress, ScanSession};
use crate::store::ResultStore;
use crate::types::{FileOutcome, FileReport};
use crate::words::WordSet;

/// 启动参数：根目录 + 违禁词
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub root: PathBuf,
    pub words: WordSet,
}

/// 会话终态
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    Completed { report: PathBuf },
    Cancelled,
    Failed(String),
}

/// 扫描线程发出的事件
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Progress(f64),
    File(FileReport),
    Finished(SessionEnd),
}

/// 将回调转发到事件通道；接收端关闭后静默丢弃
struct ChannelObserver {
    tx: Sender<ScanEvent>,
}

impl ScanObserver for ChannelObserver {
    fn on_progress(&mut self, percent: f64) {
        let _ = self.tx.send(ScanEvent::Progress(percent));
    }

    fn on_file(&mut self, report: &FileReport) {
        let _ = self.tx.send(ScanEvent::File(report.clone()));
    }
}

/// 启动前校验：词表为空或根目录为空/无效时快速失败，不开始遍历
pub fn validate(request: &ScanRequest) -> Result<(), ScanError> {
    if request.words.is_empty() {
        return Err(ScanError::EmptyWordList);
    }
    if request.root.to_string_lossy().trim().is_empty() {
        return Err(ScanError::EmptyRoot);
    }
    if !request.root.exists() {
        return Err(ScanError::RootNotFound(request.root.clone()));
    }
    if !request.root.is_dir() {
        return Err(ScanError::RootNotDirectory(request.root.clone()));
    }
    Ok(())
}

/// 校验参数并在后台线程启动扫描
///
/// 扫描线程不会因事件堆积而阻塞；调用方应读取 [`ScanHandle::events`]。
pub fn start(request: ScanRequest, options: ScanOptions) -> Result<ScanHandle, ScanError> {
    validate(&request)?;

    let signal = ControlSignal::new();
    let session = ScanSession::new(request.root, request.words, signal.clone(), options);
    let store = session.store();
    let progress = session.progress();
    let (tx, rx) = channel::unbounded::<ScanEvent>();

    let worker = thread::Builder::new()
        .name("wordsweep-scan".into())
        .spawn(move || run_worker(session, tx))
        .map_err(ScanError::Spawn)?;

    Ok(ScanHandle { signal, store, progress, events: rx, worker })
}

/// 扫描线程主体：扫描 →（未取消时）写报告 → 发出终态事件
fn run_worker(session: ScanSession, tx: Sender<ScanEvent>) -> Result<ScanOutcome, ScanError> {
    let mut observer = ChannelObserver { tx: tx.clone() };
    let report_path = session.options().report_path.clone();
    let format = session.options().report_format;

    let result = session.run(&mut observer).and_then(|mut outcome| {
        if outcome.cancelled {
            return Ok(outcome);
        }
        write_report(&outcome.results, &report_path, format)?;
        info!(report = %report_path.display(), "report written");
        outcome.report = Some(report_path.clone());
        Ok(outcome)
    });

    let end = match &result {
        Ok(outcome) if outcome.cancelled => SessionEnd::Cancelled,
        Ok(_) => SessionEnd::Completed { report: report_path },
        Err(err) => {
            error!(error = %err, "scan failed");
            SessionEnd::Failed(err.to_string())
        }
    };
    let _ = tx.send(ScanEvent::Finished(end));
    result
}

/// 调用方持有的会话句柄
pub struct ScanHandle {
    signal: ControlSignal,
    store: Arc<ResultStore>,
    progress: Arc<ScanProgress>,
    events: Receiver<ScanEvent>,
    worker: JoinHandle<Result<ScanOutcome, ScanError>>,
}

impl ScanHandle {
    pub fn pause(&self) {
        self.signal.pause();
    }

    pub fn resume(&self) {
        self.signal.resume();
    }

    pub fn cancel(&self) {
        self.signal.cancel();
    }

    pub fn state(&self) -> ControlState {
        self.signal.state()
    }

    /// 控制信号的克隆，可交给其他线程（如读取终端输入的线程）
    pub fn control(&self) -> ControlSignal {
        self.signal.clone()
    }

    /// 事件接收端；扫描线程结束后通道关闭
    ///
    /// 通道无界，每个文件一条 `File` 事件；未读取的事件一直留在通道中，
    /// 直到被读取或句柄被丢弃。扫描大目录时调用方应持续读取。
    pub fn events(&self) -> &Receiver<ScanEvent> {
        &self.events
    }

    pub fn progress(&self) -> f64 {
        self.progress.percent()
    }

    /// 运行中的结果快照（按替换次数降序）
    pub fn snapshot(&self) -> Vec<FileOutcome> {
        self.store.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// 等待扫描线程结束
    pub fn join(self) -> Result<ScanOutcome, ScanError> {
        self.worker.join().map_err(|_| ScanError::WorkerPanicked)?
    }
}
