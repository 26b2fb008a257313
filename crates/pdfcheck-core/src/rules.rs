//! 签名规则：内置规则表 + TOML 规则文件加载
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// 规则所属的检测类别（决定由哪个检测器执行）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Script,
    Forms,
    External,
    Embedded,
}

/// 规则文件与内置规则的合并方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
    /// 追加到内置规则之后
    #[default]
    Extend,
    /// 完全替换内置规则
    Replace,
}

/// 单条规则的配置（支持 pattern 或 regex 字段）
#[derive(Debug, Clone, Deserialize)]
struct RuleEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
}

/// 顶层规则文件结构
#[derive(Debug, Clone, Deserialize)]
struct RuleFile {
    #[serde(default)]
    pub mode: RuleMode,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// 归一化后的规则规格
/// - 模式按大小写不敏感、非 Unicode 的字节正则编译
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub id: String,
    pub name: Option<String>,
    pub category: Category,
    pub pat: String,
}

impl RuleSpec {
    fn new(id: &str, category: Category, pat: &str) -> Self {
        Self { id: id.to_string(), name: None, category, pat: pat.to_string() }
    }

    pub fn pattern(&self) -> &str {
        &self.pat
    }
}

/// 已加载的规则集合（带合并方式）
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub mode: RuleMode,
    pub specs: Vec<RuleSpec>,
}

impl RuleSet {
    /// 按 mode 与内置规则合并，得到最终规则列表
    pub fn resolve(self) -> Vec<RuleSpec> {
        match self.mode {
            RuleMode::Replace => self.specs,
            RuleMode::Extend => {
                let mut all = builtin_specs();
                all.extend(self.specs);
                all
            }
        }
    }
}

/// 内置规则表，同一类别内的顺序即匹配优先级
pub fn builtin_specs() -> Vec<RuleSpec> {
    use Category::*;
    let table: &[(&str, Category, &str)] = &[
        // 脚本声明 / 脚本动作 / 自动执行
        ("js-name", Script, r"/\s*JavaScript"),
        ("js-action", Script, r"/\s*JS"),
        ("open-action", Script, r"/\s*OpenAction"),
        // 常见 Acrobat JS API 调用形态
        ("js-app-object", Script, r"app\s*\."),
        ("js-eval", Script, r"eval\s*\("),
        ("js-document-object", Script, r"document\s*\."),
        ("js-this-object", Script, r"this\s*\."),
        ("js-get-field", Script, r"getField\s*\("),
        ("js-submit-form", Script, r"submitForm\s*\("),
        ("js-import-data-object", Script, r"importDataObject\s*\("),
        ("js-hex-call", Script, r"JS\(\s*#[0-9A-Fa-f]{2,}"),
        // 交互式表单
        ("acroform", Forms, r"/\s*AcroForm"),
        ("xfa", Forms, r"/\s*XFA"),
        ("widget", Forms, r"/\s*Widget"),
        ("field-text", Forms, r"/\s*FT\s*/\s*Tx"),
        ("field-choice", Forms, r"/\s*FT\s*/\s*Ch"),
        ("field-button", Forms, r"/\s*FT\s*/\s*Btn"),
        ("field-signature", Forms, r"/\s*FT\s*/\s*Sig"),
        // 外部引用与网络动作
        ("goto-remote", External, r"/\s*GoToR"),
        ("launch", External, r"/\s*Launch"),
        ("import-data", External, r"/\s*ImportData"),
        ("submit-form", External, r"/\s*SubmitForm"),
        ("uri-action", External, r"/\s*URI\b"),
        ("uri-call", External, r"URI\s*\("),
        ("url-http", External, r"\bhttps?://"),
        ("url-file", External, r"\bfile://"),
        ("url-ftp", External, r"\bftp://"),
        // 嵌入文件
        ("embedded-file", Embedded, r"/\s*EmbeddedFile"),
        ("file-attachment", Embedded, r"/\s*FileAttachment"),
        ("filespec", Embedded, r"/\s*Filespec"),
    ];
    table.iter().map(|(id, cat, pat)| RuleSpec::new(id, *cat, pat)).collect()
}

/// 解析 TOML 规则文本
pub fn parse_rule_set(txt: &str) -> Result<RuleSet> {
    let parsed: RuleFile = toml::from_str(txt).context("parse rule file")?;
    let mut specs = Vec::new();

    for e in parsed.rules {
        // 兼容两种字段名：pattern 或 regex
        let pat = match (e.pattern, e.regex) {
            (Some(p), _) => p,
            (None, Some(r)) => r,
            _ => anyhow::bail!("rule `{}` has neither `pattern` nor `regex`", e.id),
        };
        specs.push(RuleSpec { id: e.id, name: e.name, category: e.category, pat });
    }

    Ok(RuleSet { mode: parsed.mode, specs })
}

/// 从 TOML 规则文件加载并归一化为 RuleSet
pub fn load_rule_set(path: &Path) -> Result<RuleSet> {
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("read rule file {}", path.display()))?;
    parse_rule_set(&txt)
}
