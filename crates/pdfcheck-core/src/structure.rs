//! 结构校验：非空 + 头部窗口内存在 `%PDF-`
use crate::error::CheckError;

/// PDF 魔数
pub const PDF_MAGIC: &[u8] = b"%PDF-";
/// 只在前 1024 字节内查找魔数（容忍部分生成器在前面写入的杂字节）
pub const HEADER_WINDOW: usize = 1024;

/// 校验输入是否像一个 PDF
pub fn validate_structure(data: &[u8]) -> Result<(), CheckError> {
    if data.is_empty() {
        return Err(CheckError::InvalidStructure);
    }
    let limit = HEADER_WINDOW.min(data.len());
    if !data[..limit].windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Err(CheckError::InvalidStructure);
    }
    Ok(())
}
