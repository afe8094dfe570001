//! 运行输入
//!
//! 命令行/环境变量的解析在外层完成，核心只接收已解析好的值。

use std::path::PathBuf;

use crate::signing::SignOptions;

/// 将多行输入拆分为去除空白后的非空行
///
/// ```rust
/// use artisign::parse_multiline;
///
/// assert_eq!(parse_multiline("dist/*\n\n  *.tar.gz  \n"), vec!["dist/*", "*.tar.gz"]);
/// ```
pub fn parse_multiline(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// 一次签名运行所需的全部输入
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignRequest {
    /// 已确定的工作目录
    pub work_dir: PathBuf,
    /// include 模式
    pub patterns: Vec<String>,
    /// exclude 模式
    pub excludes: Vec<String>,
    pub options: SignOptions,
}

impl SignRequest {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = excludes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_options(mut self, options: SignOptions) -> Self {
        self.options = options;
        self
    }
}
