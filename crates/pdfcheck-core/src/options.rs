//! 批量扫描选项与统计信息
use std::path::PathBuf;

/// 批量扫描选项
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// 最大文件大小（字节）；超过则跳过，不送入检查引擎
    pub max_file_size: Option<u64>,
    /// 输入为目录时是否递归子目录
    pub recursive: bool,
    /// 规则文件路径（TOML）；为空则只使用内置规则
    pub rules_path: Option<PathBuf>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            max_file_size: None,
            recursive: false,
            rules_path: None,
            threads: None,
        }
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub passed: usize,
    pub rejected: usize,
    pub skipped: usize,
}
