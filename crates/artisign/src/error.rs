//! Sign Error Types
//!
//! 签名流程中所有可能的错误。
//!
//! # 错误分类
//!
//! | 错误类型 | 触发条件 | 处理策略 |
//! |---------|---------|---------|
//! | `InvalidPattern` | include 模式语法错误 | 签名开始前中止 |
//! | `KeyParse` | 私钥无法解析 | 签名开始前中止 |
//! | `UnsupportedKeyType` | 提供的是公钥或无可签名子密钥 | 签名开始前中止 |
//! | `WrongPassphrase` | 提供了口令但解锁失败 | 签名开始前中止 |
//! | `LockedKey` | 私钥受口令保护但未提供口令 | 签名开始前中止 |
//! | `BackendUnavailable` | 找不到或无法启动 gpg | 签名开始前中止 |
//! | `BackendExecution` | 外部 gpg 进程非零退出 | 中止剩余文件 |
//! | `FileIo` | 读写文件失败 | 中止剩余文件 |
//!
//! 所有错误都不会自动重试。

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SignError>;

#[derive(Debug, Error)]
pub enum SignError {
    /// include 模式无法被 glob 语法接受
    #[error("invalid glob pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("failed to parse private key: {0}")]
    KeyParse(String),

    #[error("unsupported key: {0}")]
    UnsupportedKeyType(String),

    /// 提供了口令，但口令不正确
    #[error("failed to unlock private key: {0}")]
    WrongPassphrase(String),

    /// 私钥受保护，但没有提供口令
    #[error("private key is locked but no passphrase provided")]
    LockedKey,

    #[error("{program} exited with {}: {stderr}", exit_code_label(.code))]
    BackendExecution {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// 外部程序不存在或无法启动
    #[error("{program} is not available: {reason}")]
    BackendUnavailable { program: String, reason: String },

    #[error("{}: {source}", .path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown signer backend: {0}")]
    UnknownBackend(String),

    /// 加密引擎生成签名失败
    #[error("failed to create signature: {0}")]
    Signing(String),

    /// 带失败文件上下文的包装错误
    #[error("failed to sign file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<SignError>,
    },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

impl SignError {
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }

    pub fn key_parse(reason: impl ToString) -> Self {
        Self::KeyParse(reason.to_string())
    }

    pub fn unsupported_key(reason: impl Into<String>) -> Self {
        Self::UnsupportedKeyType(reason.into())
    }

    pub fn wrong_passphrase(reason: impl ToString) -> Self {
        Self::WrongPassphrase(reason.to_string())
    }

    pub fn backend_execution(
        program: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::BackendExecution {
            program: program.into(),
            code,
            stderr: stderr.into(),
        }
    }

    pub fn backend_unavailable(program: impl Into<String>, reason: impl ToString) -> Self {
        Self::BackendUnavailable {
            program: program.into(),
            reason: reason.to_string(),
        }
    }

    pub fn file_io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::FileIo {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn signing(reason: impl ToString) -> Self {
        Self::Signing(reason.to_string())
    }

    /// 为错误附加失败文件的路径
    pub fn for_file(self, path: impl AsRef<Path>) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
            source: Box::new(self),
        }
    }

    /// 去掉 `File` 包装后的原始错误
    pub fn root(&self) -> &SignError {
        match self {
            Self::File { source, .. } => source.root(),
            other => other,
        }
    }

    /// 密钥初始化阶段的错误
    pub fn is_key_error(&self) -> bool {
        matches!(
            self.root(),
            Self::KeyParse(_)
                | Self::UnsupportedKeyType(_)
                | Self::WrongPassphrase(_)
                | Self::LockedKey
        )
    }

    pub fn is_pattern_error(&self) -> bool {
        matches!(self.root(), Self::InvalidPattern { .. })
    }
}
