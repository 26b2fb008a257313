//! 表单 / 外部引用 / 嵌入文件检测
use tracing::trace;

use crate::detectors::{first_match, SignatureSet};
use crate::error::CheckError;
use crate::normalize::collapse_whitespace;

/// 交互式表单（原始文本，不归一化）
pub fn detect_forms(sigs: &SignatureSet, raw: &[u8]) -> Result<(), CheckError> {
    match first_match(&sigs.forms, raw) {
        Some(idx) => {
            trace!(rule = idx, "form signature matched");
            Err(CheckError::FormDetected)
        }
        None => Ok(()),
    }
}

/// 外部引用与 URL（折叠空白，但保留 stream 内容）
pub fn detect_external_refs(sigs: &SignatureSet, raw: &[u8]) -> Result<(), CheckError> {
    let normalized = collapse_whitespace(raw);
    match first_match(&sigs.external, &normalized) {
        Some(idx) => {
            trace!(rule = idx, "external reference signature matched");
            Err(CheckError::ExternalRefDetected)
        }
        None => Ok(()),
    }
}

/// 嵌入文件与附件（原始文本）
pub fn detect_embedded_files(sigs: &SignatureSet, raw: &[u8]) -> Result<(), CheckError> {
    match first_match(&sigs.embedded, raw) {
        Some(idx) => {
            trace!(rule = idx, "embedded file signature matched");
            Err(CheckError::EmbeddedFileDetected)
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigs() -> &'static SignatureSet {
        SignatureSet::shared()
    }

    #[test]
    fn field_subtypes() {
        let cases: [&[u8]; 4] = [b"/FT/Tx", b"/FT /Ch", b"/ FT / Btn", b"/ft/sig"];
        for src in cases {
            assert_eq!(detect_forms(sigs(), src), Err(CheckError::FormDetected), "{:?}", src);
        }
    }

    #[test]
    fn forms_scan_stream_bodies_too() {
        let src = b"stream\n/AcroForm\nendstream";
        assert_eq!(detect_forms(sigs(), src), Err(CheckError::FormDetected));
    }

    #[test]
    fn uri_needs_word_boundary() {
        assert_eq!(detect_external_refs(sigs(), b"/URI (x)"), Err(CheckError::ExternalRefDetected));
        assert_eq!(detect_external_refs(sigs(), b"/URIs"), Ok(()));
    }

    #[test]
    fn url_schemes() {
        let cases: [&[u8]; 4] = [b"see http://a", b"HTTPS://a", b"ftp://a", b"file:///etc/passwd"];
        for src in cases {
            assert_eq!(
                detect_external_refs(sigs(), src),
                Err(CheckError::ExternalRefDetected),
                "{:?}",
                src
            );
        }
    }

    #[test]
    fn external_refs_inside_streams_still_count() {
        let src = b"stream\nhttp://x\nendstream";
        assert_eq!(detect_external_refs(sigs(), src), Err(CheckError::ExternalRefDetected));
    }

    #[test]
    fn embedded_markers() {
        assert_eq!(detect_embedded_files(sigs(), b"/Type /EmbeddedFile"), Err(CheckError::EmbeddedFileDetected));
        assert_eq!(detect_embedded_files(sigs(), b"/Subtype/FileAttachment"), Err(CheckError::EmbeddedFileDetected));
        assert_eq!(detect_embedded_files(sigs(), b"/Type/Filespec"), Err(CheckError::EmbeddedFileDetected));
        assert_eq!(detect_embedded_files(sigs(), b"/Type/Page"), Ok(()));
    }
}
