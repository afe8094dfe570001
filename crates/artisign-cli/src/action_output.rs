//! GitHub Actions 输出
//!
//! 写入 `GITHUB_OUTPUT` 指向的文件。未设置或写入失败时退回旧的
//! `::set-output` 标准输出命令。

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use artisign::RunReport;

pub const SIGNED_COUNT: &str = "signed-count";
pub const SIGNATURES: &str = "signatures";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutput {
    file: Option<PathBuf>,
}

impl ActionOutput {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("GITHUB_OUTPUT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        )
    }

    /// 发布签名数量和签名文件列表
    pub fn publish(&self, report: &RunReport) {
        let signatures = report
            .signature_paths()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n");

        let mut stdout = io::stdout().lock();
        self.set(SIGNED_COUNT, &report.signed.len().to_string(), &mut stdout);
        self.set(SIGNATURES, &signatures, &mut stdout);
    }

    pub fn set(&self, name: &str, value: &str, fallback: &mut impl Write) {
        let Some(file) = &self.file else {
            write_legacy(fallback, name, value);
            return;
        };

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .and_then(|mut f| f.write_all(format_entry(name, value).as_bytes()));

        if let Err(e) = result {
            eprintln!(
                "Warning: failed to write to GITHUB_OUTPUT file {}: {}",
                file.display(),
                e
            );
            write_legacy(fallback, name, value);
        }
    }
}

/// 单行值写成 `name=value`，多行值使用 heredoc 分隔符
pub fn format_entry(name: &str, value: &str) -> String {
    if !value.contains('\n') {
        return format!("{}={}\n", name, value);
    }

    let mut delimiter = String::from("ARTISIGN_EOF");
    while value.lines().any(|line| line == delimiter) {
        delimiter.push('_');
    }
    format!("{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter)
}

fn write_legacy(out: &mut impl Write, name: &str, value: &str) {
    let escaped = value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    // 标准输出不可写时无处报告
    let _ = writeln!(out, "::set-output name={}::{}", name, escaped);
}
