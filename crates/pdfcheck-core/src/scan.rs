//! 批量扫描主流程与并行调度
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::check::Checker;
use crate::detectors::SignatureSet;
use crate::error::CheckError;
use crate::options::{CheckOptions, ScanStats};
use crate::rules::load_rule_set;
use crate::types::OutputItem;

/// 单个文件的处理结果：None 表示被跳过（超限或读取失败）
type Outcome = Option<Result<(), CheckError>>;

/// 按选项构建签名集合：有规则文件则加载并编译，否则借用进程内共享的内置集合
pub fn load_signatures(opts: &CheckOptions) -> Result<Cow<'static, SignatureSet>> {
    match &opts.rules_path {
        Some(path) => {
            let specs = load_rule_set(path)?.resolve();
            Ok(Cow::Owned(SignatureSet::from_specs(&specs)?))
        }
        None => Ok(Cow::Borrowed(SignatureSet::shared())),
    }
}

/// 目录遍历结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectedFiles {
    /// 待检查文件（按路径排序）
    pub files: Vec<PathBuf>,
    /// 无法检查的条目：遍历出错或指向非文件的符号链接（含断链）
    pub unreadable: usize,
}

/// 收集待检查文件，按路径排序保证输出稳定
/// - 指向文件的符号链接按文件处理；指向目录的符号链接不展开
pub fn collect_files(input: &Path, recursive: bool) -> Result<CollectedFiles> {
    if input.is_file() {
        return Ok(CollectedFiles { files: vec![input.to_path_buf()], unreadable: 0 });
    }
    anyhow::ensure!(input.is_dir(), "input path {} does not exist", input.display());

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut out = CollectedFiles::default();
    for entry in WalkDir::new(input).min_depth(1).max_depth(max_depth) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "unreadable directory entry, skipped");
                out.unreadable += 1;
                continue;
            }
        };
        let ft = entry.file_type();
        if ft.is_file() {
            out.files.push(entry.into_path());
        } else if ft.is_symlink() {
            // metadata 跟随链接
            match std::fs::metadata(entry.path()) {
                Ok(md) if md.is_file() => out.files.push(entry.into_path()),
                Ok(md) if md.is_dir() => {
                    debug!(path = %entry.path().display(), "symlinked directory not followed");
                }
                _ => {
                    warn!(path = %entry.path().display(), "symlink does not resolve to a file, skipped");
                    out.unreadable += 1;
                }
            }
        }
    }
    out.files.sort();
    Ok(out)
}

/// 读取并检查单个文件
fn check_file(path: &Path, max_file_size: Option<u64>, checker: &Checker<'_>) -> Outcome {
    if let Some(max) = max_file_size {
        if let Ok(md) = std::fs::metadata(path) {
            if md.len() > max {
                debug!(path = %path.display(), size = md.len(), "file exceeds size limit, skipped");
                return None;
            }
        }
    }
    match std::fs::read(path) {
        Ok(data) => Some(checker.check(&data)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "read failed, skipped");
            None
        }
    }
}

/// 写出单个结果并更新统计
struct JsonArrayWriter<'w> {
    out: &'w mut dyn Write,
    first: bool,
}

impl<'w> JsonArrayWriter<'w> {
    fn begin(out: &'w mut dyn Write) -> Result<Self> {
        write!(out, "[")?;
        Ok(Self { out, first: true })
    }

    fn push(&mut self, path: &Path, outcome: Outcome, stats: &mut ScanStats) -> Result<()> {
        let result = match outcome {
            Some(r) => r,
            None => {
                stats.skipped += 1;
                return Ok(());
            }
        };
        stats.files_scanned += 1;
        match result {
            Ok(()) => stats.passed += 1,
            Err(_) => stats.rejected += 1,
        }
        if !self.first { write!(self.out, ",")?; } else { self.first = false; }
        let path = path.display().to_string();
        serde_json::to_writer(&mut *self.out, &OutputItem::new(&path, result))?;
        Ok(())
    }

    fn finish(self) -> Result<()> {
        write!(self.out, "]")?;
        Ok(())
    }
}

/// 检查文件或目录，并将结果以 JSON 数组流式写入 `out`
/// 稳定性保证：文件按路径排序，并行模式下由 writer 按序号重排
pub fn scan_and_write(input: &Path, out: &mut dyn Write, opts: &CheckOptions) -> Result<ScanStats> {
    let sigs = load_signatures(opts)?;
    let checker = Checker::new(&sigs);
    let CollectedFiles { files, unreadable } = collect_files(input, opts.recursive)?;

    let threads = opts.threads.unwrap_or_else(num_cpus::get);
    debug!(files = files.len(), unreadable, threads, "scan planned");

    let mut stats = ScanStats { skipped: unreadable, ..ScanStats::default() };
    if threads > 1 && files.len() > 1 {
        scan_and_write_parallel(&files, out, opts, &checker, &mut stats, threads)?;
        return Ok(stats);
    }

    let mut writer = JsonArrayWriter::begin(out)?;
    for path in &files {
        let outcome = check_file(path, opts.max_file_size, &checker);
        writer.push(path, outcome, &mut stats)?;
    }
    writer.finish()?;
    Ok(stats)
}

/// 并行调度：
/// - Rayon 线程池并行读取与检查
/// - 当前线程作为 writer，按 idx 重排后流式写 JSON
fn scan_and_write_parallel(
    files: &[PathBuf],
    out: &mut dyn Write,
    opts: &CheckOptions,
    checker: &Checker<'_>,
    stats: &mut ScanStats,
    threads: usize,
) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("build rayon pool")?;
    let max_file_size = opts.max_file_size;

    // 通道用于 worker → writer 传递结果
    let (tx, rx) = channel::bounded::<(usize, Outcome)>(256);

    std::thread::scope(|s| {
        s.spawn(move || {
            pool.install(|| {
                files.par_iter().enumerate().for_each_with(tx, |tx, (idx, path)| {
                    // writer 提前退出时发送失败，忽略即可
                    let _ = tx.send((idx, check_file(path, max_file_size, checker)));
                });
            });
        });

        let mut writer = JsonArrayWriter::begin(out)?;
        let mut next_idx: usize = 0;
        let mut buffer: BTreeMap<usize, Outcome> = BTreeMap::new();

        // rx 随循环释放：writer 出错后 worker 的 send 立即失败
        for (idx, outcome) in rx {
            buffer.insert(idx, outcome);
            // 尝试从 next_idx 开始顺序冲刷
            while let Some(outcome) = buffer.remove(&next_idx) {
                writer.push(&files[next_idx], outcome, stats)?;
                next_idx += 1;
            }
        }
        writer.finish()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_error() {
        let err = collect_files(Path::new("/definitely/not/here"), false).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn builtin_when_no_rules_file() {
        let sigs = load_signatures(&CheckOptions::default()).unwrap();
        match sigs {
            Cow::Borrowed(set) => assert!(std::ptr::eq(set, SignatureSet::shared())),
            Cow::Owned(_) => panic!("built-in set should be borrowed, not cloned"),
        }
    }

    #[test]
    fn single_file_input_is_collected_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let got = collect_files(&path, false).unwrap();
        assert_eq!(got, CollectedFiles { files: vec![path], unreadable: 0 });
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_to_files_are_followed_and_dangling_ones_counted() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real.pdf");
        std::fs::write(&target, b"%PDF-1.4").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        symlink(&target, dir.path().join("link.pdf")).unwrap();
        symlink(dir.path().join("gone.pdf"), dir.path().join("dangling.pdf")).unwrap();
        symlink(dir.path().join("sub"), dir.path().join("sub_link")).unwrap();

        let got = collect_files(dir.path(), false).unwrap();
        let names: Vec<_> = got
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["link.pdf", "real.pdf"]);
        assert_eq!(got.unreadable, 1);
    }
}
