//! 进程内签名后端
//!
//! 基于 sequoia-openpgp，私钥在内存中解锁后持有，签名只在字节缓冲区上进行。

use sequoia_openpgp as openpgp;

use openpgp::armor;
use openpgp::cert::prelude::*;
use openpgp::crypto::Password;
use openpgp::packet::key::{SecretParts, UnspecifiedRole};
use openpgp::packet::Key;
use openpgp::parse::Parse;
use openpgp::policy::StandardPolicy;
use openpgp::serialize::stream::{Armorer, LiteralWriter, Message, Signer as StreamSigner};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use super::{output_path, FileSigner, SignMode, SignOptions, SignedArtifact};
use crate::error::{Result, SignError};

/// 进程内 OpenPGP 签名器
///
/// 持有已解锁的签名密钥，生命周期内独占。
pub struct NativeSigner {
    key: Key<SecretParts, UnspecifiedRole>,
}

impl NativeSigner {
    /// 解析并解锁 armor 格式的私钥
    ///
    /// - 解析失败: `KeyParse`
    /// - 不是私钥或没有可用于签名的私钥: `UnsupportedKeyType`
    /// - 提供了口令但解锁失败: `WrongPassphrase`
    /// - 私钥仍处于加密状态（未提供口令）: `LockedKey`
    pub fn new(armored_key: &str, passphrase: Option<&str>) -> Result<Self> {
        let cert = Cert::from_bytes(armored_key.as_bytes()).map_err(SignError::key_parse)?;

        if !cert.is_tsk() {
            return Err(SignError::unsupported_key(
                "provided key is not a private key",
            ));
        }

        let policy = StandardPolicy::new();
        let key = cert
            .keys()
            .with_policy(&policy, None)
            .alive()
            .revoked(false)
            .for_signing()
            .secret()
            .next()
            .map(|ka| ka.key().clone())
            .ok_or_else(|| SignError::unsupported_key("no valid signing-capable secret key"))?;

        let key = match passphrase {
            Some(passphrase) if !key.has_unencrypted_secret() => key
                .decrypt_secret(&Password::from(passphrase))
                .map_err(SignError::wrong_passphrase)?,
            Some(_) => {
                debug!("私钥未加密，忽略提供的口令");
                key
            }
            None => key,
        };

        if !key.has_unencrypted_secret() {
            return Err(SignError::LockedKey);
        }

        debug!(
            fingerprint = %key.fingerprint().to_hex(),
            "签名密钥已就绪"
        );

        Ok(Self { key })
    }

    /// 签名密钥指纹
    pub fn fingerprint(&self) -> String {
        self.key.fingerprint().to_hex()
    }

    /// 对字节数据签名，返回签名产物内容
    pub fn sign_bytes(&self, data: &[u8], mode: SignMode) -> Result<Vec<u8>> {
        let mut sink = Vec::new();
        self.write_signature(&mut sink, data, mode)
            .map_err(SignError::signing)?;
        Ok(sink)
    }

    fn write_signature(
        &self,
        sink: &mut Vec<u8>,
        data: &[u8],
        mode: SignMode,
    ) -> openpgp::Result<()> {
        let keypair = self.key.clone().into_keypair()?;
        let message = Message::new(sink);

        match mode {
            SignMode::Detached { armored } => {
                let message = if armored {
                    Armorer::new(message).kind(armor::Kind::Signature).build()?
                } else {
                    message
                };
                let mut signer = StreamSigner::new(message, keypair).detached().build()?;
                signer.write_all(data)?;
                signer.finalize()?;
            }
            SignMode::Clear => {
                // 明文签名自带 armor 框架，必须直接写在 Message 上
                let mut signer = StreamSigner::new(message, keypair).cleartext().build()?;
                signer.write_all(data)?;
                signer.finalize()?;
            }
            SignMode::Inline { armored } => {
                let message = if armored {
                    Armorer::new(message).build()?
                } else {
                    message
                };
                let signer = StreamSigner::new(message, keypair).build()?;
                let mut literal = LiteralWriter::new(signer).build()?;
                literal.write_all(data)?;
                literal.finalize()?;
            }
        }

        Ok(())
    }
}

impl FileSigner for NativeSigner {
    fn sign_file(&self, path: &Path, options: &SignOptions) -> Result<SignedArtifact> {
        let data = fs::read(path).map_err(|e| SignError::file_io(path, e))?;

        let mode = options.mode();
        let signature = self.sign_bytes(&data, mode)?;

        let output = output_path(path, options);
        fs::write(&output, signature).map_err(|e| SignError::file_io(&output, e))?;

        Ok(SignedArtifact {
            input: path.to_path_buf(),
            signature: output,
            mode,
        })
    }
}
