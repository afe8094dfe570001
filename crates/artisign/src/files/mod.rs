//! 文件选择
//!
//! 将 include/exclude glob 模式解析为有序、去重、仅包含普通文件的集合。

mod exclude;
mod matcher;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use exclude::ExcludeSet;
pub use matcher::PatternMatcher;

/// 文件查找接口
///
/// 编排器只依赖该接口，测试中可以替换为固定结果。
pub trait FileFinder {
    fn find_files(
        &self,
        work_dir: &Path,
        patterns: &[String],
        excludes: &[String],
    ) -> Result<FileSet>;
}

/// 一次解析得到的文件集合
///
/// 顺序为首次出现顺序，路径唯一。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<PathBuf>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.iter().any(|f| f == path.as_ref())
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.files
    }
}

impl FromIterator<PathBuf> for FileSet {
    /// 保留首次出现的路径，丢弃后续重复项
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        let unique: indexmap::IndexSet<PathBuf> = iter.into_iter().collect();
        Self {
            files: unique.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl IntoIterator for FileSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// glob 匹配选项
///
/// `*` 不跨越路径分隔符；以 `.` 开头的文件名不做特殊处理。
pub(crate) fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// 去除首尾空白及前导 `./`，空模式返回 None
pub(crate) fn normalize_pattern(pattern: &str) -> Option<&str> {
    let mut pattern = pattern.trim();
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.trim_start_matches('/');
    }
    if pattern.is_empty() || pattern == "." {
        None
    } else {
        Some(pattern)
    }
}
