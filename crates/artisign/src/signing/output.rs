//! 签名产物路径
//!
//! 两种后端共用同一套命名规则，下游脚本依赖这些后缀：
//!
//! | clear_sign | armor | detach_sign | 后缀 |
//! |-----------|-------|-------------|------|
//! | true | (忽略) | (忽略) | `.asc` |
//! | false | true | 任意 | `.asc` |
//! | false | false | true | `.sig` |
//! | false | false | false | `.gpg` |
//!
//! 输出路径总是 `原路径 + 后缀`，原文件不会被覆盖或重命名。

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::SignOptions;

pub const ARMORED_EXTENSION: &str = ".asc";
pub const DETACHED_BINARY_EXTENSION: &str = ".sig";
pub const INLINE_BINARY_EXTENSION: &str = ".gpg";

/// 根据签名选项得到产物后缀
pub fn output_extension(options: &SignOptions) -> &'static str {
    // clear-sign 总是 ASCII armor
    if options.clear_sign || options.armor {
        ARMORED_EXTENSION
    } else if options.detach_sign {
        DETACHED_BINARY_EXTENSION
    } else {
        INLINE_BINARY_EXTENSION
    }
}

/// 根据原路径和签名选项得到产物路径
pub fn output_path(original: &Path, options: &SignOptions) -> PathBuf {
    let mut path = OsString::from(original.as_os_str());
    path.push(output_extension(options));
    PathBuf::from(path)
}
