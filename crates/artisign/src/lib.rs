//! Artisign - 发布产物签名核心库
//!
//! 按 glob 模式选出文件，并使用 OpenPGP 对其逐个签名。
//!
//! # 模块
//! - `files`: 模式解析，产出有序、去重的文件集合
//! - `signing`: 签名选项、输出路径推导、两种可互换的签名后端
//! - `process`: 可注入的子进程执行抽象
//! - `orchestrator`: 串行编排与 fail-fast 策略
//! - `inputs`: 已解析的运行输入

pub mod error;
pub mod files;
pub mod inputs;
pub mod orchestrator;
pub mod process;
pub mod signing;

pub use error::{Result, SignError};
pub use files::{FileFinder, FileSet, PatternMatcher};
pub use inputs::{parse_multiline, SignRequest};
pub use orchestrator::{FileFailure, Orchestrator, RunReport, RunStatus};
pub use process::{ProcessCommand, ProcessOutput, ProcessRunner, SystemProcessRunner};
pub use signing::{
    output_extension, output_path, FileSigner, GnupgConfig, GnupgSigner, NativeSigner,
    SignMode, SignOptions, SignedArtifact, Signer, SignerBackend,
};
