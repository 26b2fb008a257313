//! PDF 危险特性检查库
//!
//! 设计要点：
//! - 不解析对象模型，只在原始字节上做正则级启发式匹配。
//! - 检测顺序固定：结构 → 脚本 → 表单 → 外部引用 → 嵌入文件，首个命中即返回。
//! - 脚本检测前剔除 `stream ... endstream` 负载并折叠空白，抵抗简单混淆。
//! - 签名集合编译一次后只读，可被任意数量的并发检查共享。
//! - 不提供任何改写/清理输入的能力。
//!
//! ```
//! use pdfcheck_core::{check, CheckError};
//!
//! assert_eq!(check(b"%PDF-1.4\n<</Type/Catalog>>"), Ok(()));
//! assert_eq!(check(b"%PDF-1.4\n<</S/JavaScript>>"), Err(CheckError::ScriptDetected));
//! ```

mod check;
mod detectors;
mod error;
mod features;
mod normalize;
mod options;
mod rules;
mod scan;
mod script;
mod structure;
mod types;

/// 当前版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use check::{check, Checker};
pub use detectors::SignatureSet;
pub use error::CheckError;
pub use features::{detect_embedded_files, detect_external_refs, detect_forms};
pub use normalize::{collapse_whitespace, strip_streams};
pub use options::{CheckOptions, ScanStats};
pub use rules::{builtin_specs, load_rule_set, parse_rule_set, Category, RuleMode, RuleSet, RuleSpec};
pub use scan::{collect_files, load_signatures, scan_and_write, CollectedFiles};
pub use script::detect_script;
pub use structure::{validate_structure, HEADER_WINDOW, PDF_MAGIC};
pub use types::OutputItem;
