//! 命令行参数
//!
//! 每个参数都可以通过同名的环境变量提供，便于作为 CI 步骤运行。

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use artisign::{
    parse_multiline, GnupgConfig, SignOptions, SignRequest, SignerBackend,
};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};

use crate::build_info::BuildInfo;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "artisign",
    version,
    about = "Sign release artifacts selected by glob patterns with OpenPGP"
)]
pub struct ActionArgs {
    /// ASCII armored private key used for signing
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Passphrase for the private key
    #[arg(long, env = "PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Create ASCII armored output
    #[arg(
        long,
        env = "ARMOR",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub armor: bool,

    /// Make a detached signature
    #[arg(
        long,
        env = "DETACH_SIGN",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub detach_sign: bool,

    /// Make a clear text signature
    #[arg(
        long,
        env = "CLEAR_SIGN",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub clear_sign: bool,

    /// Files to sign (glob patterns, newline separated)
    #[arg(long, env = "FILES")]
    pub files: String,

    /// Files to exclude (glob patterns, newline separated)
    #[arg(long, env = "EXCLUDES", default_value = "")]
    pub excludes: String,

    /// Working directory for file operations
    #[arg(long, env = "WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Signer backend: native (in-process, default) or gnupg (system gpg)
    #[arg(long, env = "BACKEND", default_value = "native")]
    pub backend: String,

    /// gpg executable used by the gnupg backend
    #[arg(long, env = "GPG_PROGRAM", default_value = "gpg")]
    pub gpg_program: PathBuf,

    /// GNUPGHOME used by the gnupg backend
    #[arg(long, env = "GNUPG_HOME")]
    pub gnupg_home: Option<PathBuf>,

    /// Log level: debug, info, warn, error
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ActionArgs {
    /// 解析进程参数，`--version` 输出包含构建信息
    pub fn parse_with(build: &BuildInfo) -> Self {
        let matches = Self::command()
            .long_version(build.long_version())
            .get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    pub fn sign_options(&self) -> SignOptions {
        SignOptions {
            armor: self.armor,
            detach_sign: self.detach_sign,
            clear_sign: self.clear_sign,
        }
    }

    /// 空口令视为未提供
    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref().filter(|p| !p.is_empty())
    }

    pub fn backend(&self) -> artisign::Result<SignerBackend> {
        self.backend.parse()
    }

    pub fn gnupg_config(&self) -> GnupgConfig {
        GnupgConfig {
            program: self.gpg_program.clone(),
            home: self.gnupg_home.clone().filter(|h| !h.as_os_str().is_empty()),
        }
    }

    /// 按 `--workdir`、`GITHUB_WORKSPACE`、当前目录的顺序确定工作目录
    pub fn work_dir(&self) -> io::Result<PathBuf> {
        resolve_work_dir(
            self.workdir.as_deref(),
            std::env::var_os("GITHUB_WORKSPACE"),
            std::env::current_dir,
        )
    }

    pub fn to_request(&self, work_dir: PathBuf) -> SignRequest {
        SignRequest::new(work_dir)
            .with_patterns(parse_multiline(&self.files))
            .with_excludes(parse_multiline(&self.excludes))
            .with_options(self.sign_options())
    }
}

pub fn resolve_work_dir(
    explicit: Option<&Path>,
    github_workspace: Option<OsString>,
    current_dir: impl FnOnce() -> io::Result<PathBuf>,
) -> io::Result<PathBuf> {
    if let Some(dir) = explicit.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = github_workspace.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    current_dir()
}
