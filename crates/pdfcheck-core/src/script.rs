//! 脚本检测：直接签名 + 十六进制混淆启发式
//!
//! 宁可误报也不漏报：脚本词汇与十六进制数据同时出现即视为危险，
//! 不尝试解码十六进制内容。
use tracing::trace;

use crate::detectors::{first_match, SignatureSet, HEX_CONTEXT_WINDOW};
use crate::error::CheckError;
use crate::normalize::{collapse_whitespace, strip_streams};

/// 在剔除 stream 后的文本上检测脚本
pub fn detect_script(sigs: &SignatureSet, raw: &[u8]) -> Result<(), CheckError> {
    let no_streams = strip_streams(raw);
    let normalized = collapse_whitespace(&no_streams);

    if let Some(idx) = first_match(&sigs.script, &normalized) {
        trace!(rule = idx, "script signature matched");
        return Err(CheckError::ScriptDetected);
    }

    // `#xx` 编码片段：检查其前方窗口内是否出现脚本词汇
    for m in sigs.hex_run.find_iter(&no_streams) {
        let start = m.start();
        let from = start.saturating_sub(HEX_CONTEXT_WINDOW);
        if sigs.script_word.is_match(&no_streams[from..start]) {
            trace!(offset = start, "hex run preceded by script marker");
            return Err(CheckError::ScriptDetected);
        }
    }

    // `<hex>` 字符串与脚本词汇同时出现
    if sigs.hex_angle.is_match(&no_streams) && sigs.script_word.is_match(&no_streams) {
        trace!("hex string co-occurs with script marker");
        return Err(CheckError::ScriptDetected);
    }

    Ok(())
}
