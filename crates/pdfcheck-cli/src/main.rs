use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdfcheck_core::{load_signatures, scan_and_write, CheckOptions, Checker};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "pdfcheck", version, about = "Reject PDFs carrying scripts, forms, external actions or attachments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 检查一个或多个文件，逐行输出 OK / FAIL
    Check {
        /// 待检查的文件
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// 规则文件路径（TOML），不指定则使用内置规则
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// 扫描文件或目录并输出 JSON 数组
    Scan {
        /// 输入文件或目录
        #[arg(long)]
        input: PathBuf,

        /// 输出文件（JSON 数组）；不指定则写到标准输出
        #[arg(long)]
        output: Option<PathBuf>,

        /// 线程数（"auto"=CPU 核心数）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 最大检查文件大小（单位字节，例如 5242880 代表 5MB）
        #[arg(long)]
        max_file_size: Option<u64>,

        /// 递归子目录
        #[arg(short, long)]
        recursive: bool,

        /// 规则文件路径（TOML）
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    let res = match cli.command {
        Commands::Check { files, rules } => run_check(&files, rules),
        Commands::Scan { input, output, threads, max_file_size, recursive, rules } => {
            let opts = CheckOptions { max_file_size, recursive, rules_path: rules, threads: parse_threads(&threads) };
            run_scan(input, output, &opts).map(|_| ExitCode::SUCCESS)
        }
    };

    match res {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

/// 逐个检查文件；任一文件未通过则返回 1
fn run_check(files: &[PathBuf], rules: Option<PathBuf>) -> Result<ExitCode> {
    let opts = CheckOptions { rules_path: rules, ..CheckOptions::default() };
    let sigs = load_signatures(&opts)?;
    let checker = Checker::new(&sigs);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut all_ok = true;
    for path in files {
        let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        match checker.check(&data) {
            Ok(()) => writeln!(out, "OK {}", path.display())?,
            Err(e) => {
                all_ok = false;
                writeln!(out, "FAIL {}: {}", path.display(), e)?;
            }
        }
    }
    Ok(if all_ok { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

fn run_scan(input: PathBuf, output: Option<PathBuf>, opts: &CheckOptions) -> Result<()> {
    info!(?input, ?output, "starting scan");

    let mut out: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(File::create(path).context("create output file")?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let stats = scan_and_write(&input, &mut out, opts).context("scan and write failed")?;
    out.flush().context("flush output")?;

    info!(
        files_scanned = stats.files_scanned,
        passed = stats.passed,
        rejected = stats.rejected,
        skipped = stats.skipped,
        "scan finished"
    );
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 只放结果
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_argument() {
        assert_eq!(parse_threads("auto"), None);
        assert_eq!(parse_threads("AUTO"), None);
        assert_eq!(parse_threads("4"), Some(4));
        assert_eq!(parse_threads("0"), None);
        assert_eq!(parse_threads("x"), None);
    }

    #[test]
    fn cli_parses_scan() {
        let cli = Cli::try_parse_from(["pdfcheck", "scan", "--input", "docs", "--threads", "2", "-r"]).unwrap();
        match cli.command {
            Commands::Scan { input, threads, recursive, .. } => {
                assert_eq!(input, PathBuf::from("docs"));
                assert_eq!(threads, "2");
                assert!(recursive);
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn check_requires_a_file() {
        assert!(Cli::try_parse_from(["pdfcheck", "check"]).is_err());
    }
}
