//! 文本归一化：剔除 stream 负载、折叠空白
//!
//! 两个函数都是纯函数，输入不变，按需返回新副本（无匹配时借用原文）。
use regex::bytes::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::OnceLock;

static STREAM_REGION: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

fn stream_region() -> &'static Regex {
    STREAM_REGION.get_or_init(|| {
        // 非贪婪：每个 stream 只吃到最近的 endstream
        RegexBuilder::new(r"stream\b.*?endstream")
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .unicode(false)
            .build()
            .expect("stream pattern")
    })
}

fn whitespace_run() -> &'static Regex {
    WHITESPACE_RUN.get_or_init(|| {
        RegexBuilder::new(r"[\t\n\x0C\r ]+")
            .unicode(false)
            .build()
            .expect("whitespace pattern")
    })
}

/// 将每个 `stream ... endstream` 区域替换为单个空格
pub fn strip_streams(text: &[u8]) -> Cow<'_, [u8]> {
    stream_region().replace_all(text, &b" "[..])
}

/// 将连续空白折叠为单个空格
pub fn collapse_whitespace(text: &[u8]) -> Cow<'_, [u8]> {
    whitespace_run().replace_all(text, &b" "[..])
}
