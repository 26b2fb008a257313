//! 签名集合：四个类别的已编译字节正则 + 十六进制混淆启发式
use anyhow::{Context, Result};
use regex::bytes::{Regex, RegexBuilder};
use std::sync::OnceLock;

use crate::rules::{builtin_specs, Category, RuleSpec};

/// 十六进制片段前的上下文窗口（字节）
pub(crate) const HEX_CONTEXT_WINDOW: usize = 80;

/// 已编译的签名集合
/// - 构建后只读，可在任意线程间共享，无需加锁
/// - 每个类别内按规则顺序匹配，先命中先返回
#[derive(Debug, Clone)]
pub struct SignatureSet {
    pub(crate) script: Vec<Regex>,
    pub(crate) forms: Vec<Regex>,
    pub(crate) external: Vec<Regex>,
    pub(crate) embedded: Vec<Regex>,
    /// `#` 前缀的连续十六进制字节对（至少 4 组）
    pub(crate) hex_run: Regex,
    /// 尖括号包裹的十六进制字符串（至少 4 位）
    pub(crate) hex_angle: Regex,
    /// 脚本词汇：javascript / js
    pub(crate) script_word: Regex,
}

static SHARED: OnceLock<SignatureSet> = OnceLock::new();

/// 统一的编译选项：大小写不敏感 + 关闭 Unicode（直接在原始字节上匹配）
pub(crate) fn compile(pat: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pat).case_insensitive(true).unicode(false).build()
}

/// 内置正则均为常量，编译失败只可能是代码错误
fn compile_fixed(pat: &str) -> Regex {
    compile(pat).unwrap_or_else(|e| panic!("built-in pattern {pat:?} failed to compile: {e}"))
}

impl SignatureSet {
    /// 从规则条目构建签名集合；任一规则编译失败即报错
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self> {
        let mut set = Self::empty();
        for r in specs {
            let rx = compile(r.pattern())
                .with_context(|| format!("compile rule `{}`", r.id))?;
            set.bucket_mut(r.category).push(rx);
        }
        tracing::debug!(
            script = set.script.len(),
            forms = set.forms.len(),
            external = set.external.len(),
            embedded = set.embedded.len(),
            "signature set compiled"
        );
        Ok(set)
    }

    /// 内置规则集
    pub fn builtin() -> Self {
        let specs = builtin_specs();
        let mut set = Self::empty();
        for r in &specs {
            set.bucket_mut(r.category).push(compile_fixed(r.pattern()));
        }
        set
    }

    /// 进程内共享的内置规则集（首次使用时编译一次）
    pub fn shared() -> &'static SignatureSet {
        SHARED.get_or_init(Self::builtin)
    }

    /// 类别对应的规则列表
    fn bucket_mut(&mut self, category: Category) -> &mut Vec<Regex> {
        match category {
            Category::Script => &mut self.script,
            Category::Forms => &mut self.forms,
            Category::External => &mut self.external,
            Category::Embedded => &mut self.embedded,
        }
    }

    fn empty() -> Self {
        Self {
            script: Vec::new(),
            forms: Vec::new(),
            external: Vec::new(),
            embedded: Vec::new(),
            hex_run: compile_fixed(r"#(?:[0-9A-F]{2}){4,}"),
            hex_angle: compile_fixed(r"<[0-9A-F]{4,}>"),
            script_word: compile_fixed(r"javascript|js"),
        }
    }

    /// 各类别的规则数量（script, forms, external, embedded）
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (self.script.len(), self.forms.len(), self.external.len(), self.embedded.len())
    }
}

impl Default for SignatureSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// 按顺序匹配，返回第一条命中规则的下标
pub(crate) fn first_match(patterns: &[Regex], text: &[u8]) -> Option<usize> {
    patterns.iter().position(|rx| rx.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matches_rule_table() {
        let set = SignatureSet::builtin();
        let from_specs = SignatureSet::from_specs(&builtin_specs()).unwrap();
        assert_eq!(set.counts(), from_specs.counts());
        assert_eq!(set.counts(), (11, 7, 9, 3));
    }

    #[test]
    fn builtin_and_from_specs_fill_same_lists() {
        let set = SignatureSet::builtin();
        let from_specs = SignatureSet::from_specs(&builtin_specs()).unwrap();
        let pats = |v: &[Regex]| v.iter().map(|r| r.as_str().to_string()).collect::<Vec<_>>();
        assert_eq!(pats(&set.script), pats(&from_specs.script));
        assert_eq!(pats(&set.forms), pats(&from_specs.forms));
        assert_eq!(pats(&set.external), pats(&from_specs.external));
        assert_eq!(pats(&set.embedded), pats(&from_specs.embedded));
        assert_eq!(set.script[0].as_str(), r"/\s*JavaScript");
        assert_eq!(set.embedded[2].as_str(), r"/\s*Filespec");
    }

    #[test]
    fn case_folding_is_ascii_only() {
        // 关闭 Unicode 后只折叠 ASCII 字母：U+017F (ſ) 不等同于 s
        let rx = compile(r"/\s*JS").unwrap();
        assert!(rx.is_match(b"/jS"));
        assert!(!rx.is_match("/J\u{17F}".as_bytes()));
    }

    #[test]
    fn shared_is_same_instance() {
        let a = SignatureSet::shared() as *const SignatureSet;
        let b = SignatureSet::shared() as *const SignatureSet;
        assert_eq!(a, b);
    }

    #[test]
    fn bad_rule_names_its_id() {
        let specs = vec![RuleSpec {
            id: "broken".to_string(),
            name: None,
            category: Category::Forms,
            pat: "(unclosed".to_string(),
        }];
        let err = SignatureSet::from_specs(&specs).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn patterns_are_case_insensitive_on_raw_bytes() {
        let rx = compile(r"/\s*JavaScript").unwrap();
        assert!(rx.is_match(b"\xff\xfe/ JAVASCRIPT"));
        assert!(rx.is_match(b"/javascript"));
        assert!(!rx.is_match(b"JavaScript"));
    }

    #[test]
    fn hex_heuristic_thresholds() {
        let set = SignatureSet::builtin();
        assert!(set.hex_run.is_match(b"#61707061"));
        assert!(!set.hex_run.is_match(b"#617070"));
        assert!(set.hex_angle.is_match(b"<6170>"));
        assert!(!set.hex_angle.is_match(b"<617>"));
    }

    #[test]
    fn first_match_respects_order() {
        let set = SignatureSet::builtin();
        // 同时命中 /GoToR 与 http://，返回靠前的规则
        let idx = first_match(&set.external, b"/GoToR http://x");
        assert_eq!(idx, Some(0));
        assert_eq!(first_match(&set.external, b"plain text"), None);
    }
}
