//! 检查结果的错误分类（封闭集合，按身份比较而非按消息文本）
use thiserror::Error;

/// 单次检查的失败原因
/// - 每个检测器类别对应一个变体
/// - 多个违规同时存在时，只返回检测顺序中的第一个
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CheckError {
    /// 空输入，或前 1024 字节内找不到 `%PDF-`
    #[error("invalid PDF structure")]
    InvalidStructure,
    #[error("JavaScript detected in PDF")]
    ScriptDetected,
    #[error("interactive forms detected in PDF")]
    FormDetected,
    #[error("external references detected in PDF")]
    ExternalRefDetected,
    #[error("embedded files detected in PDF")]
    EmbeddedFileDetected,
}

impl CheckError {
    /// 稳定的机器可读标识（用于 JSON 输出）
    pub fn code(self) -> &'static str {
        match self {
            CheckError::InvalidStructure => "invalid_structure",
            CheckError::ScriptDetected => "script_detected",
            CheckError::FormDetected => "form_detected",
            CheckError::ExternalRefDetected => "external_ref_detected",
            CheckError::EmbeddedFileDetected => "embedded_file_detected",
        }
    }
}
