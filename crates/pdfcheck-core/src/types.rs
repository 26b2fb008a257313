//! 公共类型（对外暴露）
use serde::Serialize;

use crate::error::CheckError;

/// 输出项结构（JSON 数组中的单个元素）
#[derive(Debug, Clone, Serialize)]
pub struct OutputItem<'a> {
    pub path: &'a str,
    pub verdict: &'static str,
    pub reason: Option<&'static str>,
}

impl<'a> OutputItem<'a> {
    pub fn new(path: &'a str, result: Result<(), CheckError>) -> Self {
        match result {
            Ok(()) => Self { path, verdict: "pass", reason: None },
            Err(e) => Self { path, verdict: "fail", reason: Some(e.code()) },
        }
    }
}
