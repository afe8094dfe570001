//! 签名抽象层
//!
//! 两种可互换的签名后端实现同一个 `FileSigner` 契约：
//! - `native`: 进程内 OpenPGP 实现（sequoia-openpgp）
//! - `gnupg`: 调用外部 gpg 进程
//!
//! 签名模式优先级（两种后端一致）：
//! 1. 请求 detached 时生成分离签名，遵循 armor；忽略 clear_sign
//! 2. 否则请求 clear_sign 时生成明文签名，总是 armor
//! 3. 否则生成内联签名，遵循 armor

mod gnupg;
mod native;
mod output;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SignError};

pub use gnupg::{GnupgConfig, GnupgSigner};
pub use native::NativeSigner;
pub use output::{
    output_extension, output_path, ARMORED_EXTENSION, DETACHED_BINARY_EXTENSION,
    INLINE_BINARY_EXTENSION,
};

/// 签名选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SignOptions {
    /// 输出 ASCII armor
    pub armor: bool,
    /// 分离签名
    pub detach_sign: bool,
    /// 明文签名
    pub clear_sign: bool,
}

impl SignOptions {
    pub fn detached(armor: bool) -> Self {
        Self {
            armor,
            detach_sign: true,
            clear_sign: false,
        }
    }

    pub fn clear() -> Self {
        Self {
            armor: false,
            detach_sign: false,
            clear_sign: true,
        }
    }

    pub fn inline(armor: bool) -> Self {
        Self {
            armor,
            detach_sign: false,
            clear_sign: false,
        }
    }

    /// 按优先级得出实际签名模式
    pub fn mode(&self) -> SignMode {
        if self.detach_sign {
            SignMode::Detached { armored: self.armor }
        } else if self.clear_sign {
            SignMode::Clear
        } else {
            SignMode::Inline { armored: self.armor }
        }
    }
}

/// 实际生效的签名模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignMode {
    Detached { armored: bool },
    Clear,
    Inline { armored: bool },
}

impl SignMode {
    pub fn is_armored(&self) -> bool {
        match self {
            Self::Detached { armored } | Self::Inline { armored } => *armored,
            Self::Clear => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detached { .. } => "detached",
            Self::Clear => "clear",
            Self::Inline { .. } => "inline",
        }
    }
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一个已写入磁盘的签名产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedArtifact {
    pub input: PathBuf,
    pub signature: PathBuf,
    pub mode: SignMode,
}

/// 文件签名契约
///
/// 每次调用只写一个新文件，不修改输入文件。
pub trait FileSigner {
    fn sign_file(&self, path: &Path, options: &SignOptions) -> Result<SignedArtifact>;
}

/// 签名后端选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignerBackend {
    #[default]
    Native,
    Gnupg,
}

impl SignerBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Gnupg => "gnupg",
        }
    }
}

impl fmt::Display for SignerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SignerBackend {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "library" | "gopgp" => Ok(Self::Native),
            "gnupg" | "gpg" => Ok(Self::Gnupg),
            _ => Err(SignError::UnknownBackend(s.to_string())),
        }
    }
}

/// 运行期选定的签名后端
///
/// 构造时确定变体，之后对编排器透明。
pub enum Signer {
    Native(NativeSigner),
    Gnupg(GnupgSigner),
}

impl Signer {
    /// 按后端初始化签名器
    ///
    /// 密钥解析、解锁或导入失败时返回对应的密钥错误，签名尚未开始。
    pub fn new(
        backend: SignerBackend,
        armored_key: &str,
        passphrase: Option<&str>,
        gnupg: &GnupgConfig,
    ) -> Result<Self> {
        tracing::debug!(backend = %backend, has_passphrase = passphrase.is_some(), "创建签名器");
        match backend {
            SignerBackend::Native => Ok(Self::Native(NativeSigner::new(armored_key, passphrase)?)),
            SignerBackend::Gnupg => Ok(Self::Gnupg(GnupgSigner::with_system_runner(
                armored_key,
                passphrase,
                gnupg,
            )?)),
        }
    }

    pub fn backend(&self) -> SignerBackend {
        match self {
            Self::Native(_) => SignerBackend::Native,
            Self::Gnupg(_) => SignerBackend::Gnupg,
        }
    }
}

impl FileSigner for Signer {
    fn sign_file(&self, path: &Path, options: &SignOptions) -> Result<SignedArtifact> {
        match self {
            Self::Native(signer) => signer.sign_file(path, options),
            Self::Gnupg(signer) => signer.sign_file(path, options),
        }
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signer").field(&self.backend()).finish()
    }
}
