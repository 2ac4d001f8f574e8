use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info, warn};
use wordsweep_core::{
    start, ControlSignal, FileConfig, FileStatus, OutputLayout, ReportFormat, ScanEvent, ScanOptions,
    ScanRequest, SessionEnd, WordSet,
};

/// 取消时的退出码（与 SIGINT 惯例一致）
const EXIT_CANCELLED: u8 = 130;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "wordsweep", version, about = "Scan text files for forbidden words and write masked copies")]
struct Cli {
    /// 输出 debug 级别日志
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描目录，遮盖违禁词并生成报告
    ///
    /// 运行中可在标准输入键入 p / r / c（pause / resume / cancel）控制扫描。
    Scan(ScanArgs),
}

#[derive(clap::Args, Debug)]
struct ScanArgs {
    /// 扫描根目录（递归）
    #[arg(long)]
    root: PathBuf,

    /// 违禁词（以换行、逗号或分号分隔）
    #[arg(long)]
    words: Option<String>,

    /// 违禁词文件（UTF-8）
    #[arg(long)]
    words_file: Option<PathBuf>,

    /// 配置文件（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 遮盖副本输出目录，默认 ./FilteredFiles
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// 报告路径，默认 ./Report.txt
    #[arg(long)]
    report: Option<PathBuf>,

    /// 报告格式
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// 输出布局：flat 仅保留文件名；mirror 保留相对路径
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// 文件间节流（毫秒）
    #[arg(long)]
    throttle_ms: Option<u64>,

    /// 遮盖字符
    #[arg(long)]
    mask: Option<char>,

    /// 最大扫描文件大小（单位字节，例如 5242880 代表 5MB）
    #[arg(long)]
    max_file_size: Option<u64>,

    /// 不显示进度条
    #[arg(long)]
    no_progress: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Flat,
    Mirror,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Scan(args) => scan(args),
    }
}

fn scan(args: ScanArgs) -> Result<ExitCode> {
    let (options, words) = resolve(&args)?;
    info!(root = ?args.root, output_dir = ?options.output_dir, report = ?options.report_path, "starting scan");

    let handle = start(ScanRequest { root: args.root.clone(), words }, options).context("start scan")?;
    spawn_stdin_control(handle.control());

    let bar = if args.no_progress { ProgressBar::hidden() } else { progress_bar() };
    let mut end = None;
    for event in handle.events().iter() {
        match event {
            ScanEvent::Progress(p) => bar.set_position(p.round() as u64),
            ScanEvent::File(report) => match &report.status {
                FileStatus::Processed { replacements } if *replacements > 0 => {
                    bar.set_message(format!("{} ({replacements})", report.path.display()));
                }
                FileStatus::Errored { message } => {
                    bar.suspend(|| warn!(path = ?report.path, %message, "file error"));
                }
                FileStatus::Skipped { reason } => {
                    bar.suspend(|| debug!(path = ?report.path, %reason, "file skipped"));
                }
                _ => {}
            },
            ScanEvent::Finished(e) => end = Some(e),
        }
    }
    bar.finish_and_clear();

    let outcome = handle.join().context("scan failed")?;
    let stats = &outcome.stats;
    info!(
        files = stats.total_files,
        processed = stats.processed,
        matched = stats.matched_files,
        replacements = stats.replacements,
        skipped = stats.skipped,
        errors = stats.errors,
        collisions = stats.collisions,
        "scan finished"
    );

    match end {
        Some(SessionEnd::Completed { report }) => {
            println!(
                "Scan complete: {} of {} files matched, {} replacements. Report: {}",
                stats.matched_files,
                stats.total_files,
                stats.replacements,
                report.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(SessionEnd::Cancelled) => {
            println!("Scan cancelled after {} of {} files.", stats.processed, stats.total_files);
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
        Some(SessionEnd::Failed(msg)) => bail!(msg),
        None => bail!("scan worker exited without a result"),
    }
}

/// 合并默认值、配置文件与命令行参数（命令行优先）
fn resolve(args: &ScanArgs) -> Result<(ScanOptions, WordSet)> {
    let mut options = ScanOptions::default();
    let mut words = WordSet::default();

    if let Some(path) = &args.config {
        let cfg = FileConfig::load(path).context("load config")?;
        cfg.apply_to(&mut options);
        words.extend(cfg.words().context("load config word list")?);
    }
    if let Some(raw) = &args.words {
        words.extend(WordSet::parse(raw));
    }
    if let Some(path) = &args.words_file {
        words.extend(WordSet::from_file(path).context("load word list")?);
    }

    if let Some(dir) = &args.output_dir {
        options.output_dir = dir.clone();
    }
    if let Some(path) = &args.report {
        options.report_path = path.clone();
    }
    if let Some(fmt) = args.format {
        options.report_format = match fmt {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        };
    }
    if let Some(layout) = args.layout {
        options.layout = match layout {
            LayoutArg::Flat => OutputLayout::Flat,
            LayoutArg::Mirror => OutputLayout::Mirror,
        };
    }
    if let Some(ms) = args.throttle_ms {
        options.throttle = Duration::from_millis(ms);
    }
    if let Some(mask) = args.mask {
        options.mask = mask;
    }
    if args.max_file_size.is_some() {
        options.max_file_size = args.max_file_size;
    }

    Ok((options, words))
}

/// 控制命令（来自标准输入的一行）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlCommand {
    Pause,
    Resume,
    Cancel,
}

fn parse_command(line: &str) -> Option<ControlCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" => Some(ControlCommand::Pause),
        "r" | "resume" => Some(ControlCommand::Resume),
        "c" | "cancel" | "q" | "quit" => Some(ControlCommand::Cancel),
        _ => None,
    }
}

/// 后台读取标准输入并驱动控制信号；进程退出时随之结束
fn spawn_stdin_control(signal: ControlSignal) {
    let spawned = std::thread::Builder::new().name("wordsweep-stdin".into()).spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(ControlCommand::Pause) => {
                    info!("pausing");
                    signal.pause();
                }
                Some(ControlCommand::Resume) => {
                    info!("resuming");
                    signal.resume();
                }
                Some(ControlCommand::Cancel) => {
                    info!("cancelling");
                    signal.cancel();
                    break;
                }
                None => warn!(input = %line.trim(), "unknown command (use p / r / c)"),
            }
        }
    });
    if let Err(err) = spawned {
        warn!(%err, "stdin control unavailable");
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos:>3}% {wide_msg}") {
        bar.set_style(style);
    }
    bar
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
