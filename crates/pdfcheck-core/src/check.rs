//! 顶层检查流程
//!
//! 固定顺序：结构 → 脚本 → 表单 → 外部引用 → 嵌入文件。
//! 任一检测器命中即返回，后续检测器不再执行。
use crate::detectors::SignatureSet;
use crate::error::CheckError;
use crate::features::{detect_embedded_files, detect_external_refs, detect_forms};
use crate::script::detect_script;
use crate::structure::validate_structure;

/// 绑定一个只读签名集合的检查器
/// - 无内部可变状态，可在多线程间共享（`&Checker` 即可）
#[derive(Debug, Clone, Copy)]
pub struct Checker<'s> {
    sigs: &'s SignatureSet,
}

impl<'s> Checker<'s> {
    pub fn new(sigs: &'s SignatureSet) -> Self {
        Self { sigs }
    }

    /// 对一段字节执行完整检查
    pub fn check(&self, data: &[u8]) -> Result<(), CheckError> {
        validate_structure(data)?;
        detect_script(self.sigs, data)?;
        detect_forms(self.sigs, data)?;
        detect_external_refs(self.sigs, data)?;
        detect_embedded_files(self.sigs, data)?;
        Ok(())
    }
}

impl Default for Checker<'static> {
    fn default() -> Self {
        Self::new(SignatureSet::shared())
    }
}

/// 使用内置签名集合检查 PDF 内容
pub fn check(data: &[u8]) -> Result<(), CheckError> {
    Checker::default().check(data)
}
