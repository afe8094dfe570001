//! 签名编排
//!
//! 解析文件集合后按顺序逐个签名。第一个失败的文件会中止剩余的签名，
//! 已生成的签名产物保留在磁盘上。

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::{Result, SignError};
use crate::files::{FileFinder, FileSet, PatternMatcher};
use crate::inputs::SignRequest;
use crate::signing::{FileSigner, SignedArtifact};

/// 运行结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// 没有文件匹配，不视为错误
    NoMatches,
    /// 所有文件都已签名
    Completed,
    /// 部分文件签名后失败
    Partial,
    /// 第一个文件就失败
    Failed,
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::NoMatches | Self::Completed)
    }
}

/// 中止运行的文件及其错误
#[derive(Debug)]
pub struct FileFailure {
    pub file: PathBuf,
    pub error: SignError,
}

/// 一次运行的汇总
#[derive(Debug, Default)]
pub struct RunReport {
    pub matched: FileSet,
    pub signed: Vec<SignedArtifact>,
    pub failure: Option<FileFailure>,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        match (&self.failure, self.signed.is_empty()) {
            (Some(_), true) => RunStatus::Failed,
            (Some(_), false) => RunStatus::Partial,
            (None, _) if self.matched.is_empty() => RunStatus::NoMatches,
            (None, _) => RunStatus::Completed,
        }
    }

    /// 因 fail-fast 从未尝试签名的文件
    pub fn unattempted(&self) -> &[PathBuf] {
        let attempted = self.signed.len() + usize::from(self.failure.is_some());
        self.matched
            .as_slice()
            .get(attempted..)
            .unwrap_or_default()
    }

    pub fn signature_paths(&self) -> impl Iterator<Item = &Path> {
        self.signed.iter().map(|a| a.signature.as_path())
    }

    /// 有失败时返回带文件上下文的错误
    pub fn into_result(self) -> Result<Vec<SignedArtifact>> {
        match self.failure {
            Some(FileFailure { file, error }) => Err(error.for_file(file)),
            None => Ok(self.signed),
        }
    }
}

/// 串行签名编排器
///
/// 不持有密钥，只借用一个已初始化的签名器。
pub struct Orchestrator<'a> {
    signer: &'a dyn FileSigner,
    finder: &'a dyn FileFinder,
}

impl<'a> Orchestrator<'a> {
    pub fn new(signer: &'a dyn FileSigner) -> Self {
        Self {
            signer,
            finder: &PatternMatcher,
        }
    }

    pub fn with_finder(mut self, finder: &'a dyn FileFinder) -> Self {
        self.finder = finder;
        self
    }

    /// 执行一次签名运行
    ///
    /// 模式解析失败直接返回错误；签名失败记录在报告里。
    pub fn run(&self, request: &SignRequest) -> Result<RunReport> {
        let matched =
            self.finder
                .find_files(&request.work_dir, &request.patterns, &request.excludes)?;

        if matched.is_empty() {
            warn!(
                work_dir = %request.work_dir.display(),
                patterns = ?request.patterns,
                "没有文件匹配，跳过签名"
            );
            return Ok(RunReport::default());
        }

        let mode = request.options.mode();
        info!(count = matched.len(), mode = %mode, "开始签名");

        let mut report = RunReport {
            matched,
            ..Default::default()
        };

        for file in report.matched.iter() {
            debug!(file = %file.display(), "签名文件");
            match self.signer.sign_file(file, &request.options) {
                Ok(artifact) => {
                    info!(
                        file = %file.display(),
                        signature = %artifact.signature.display(),
                        "签名完成"
                    );
                    report.signed.push(artifact);
                }
                Err(e) => {
                    error!(file = %file.display(), error = %e, "签名失败，中止剩余文件");
                    report.failure = Some(FileFailure {
                        file: file.clone(),
                        error: e,
                    });
                    break;
                }
            }
        }

        if report.failure.is_none() {
            info!(count = report.signed.len(), "全部文件签名完成");
        }
        Ok(report)
    }
}
