//! Pattern Matcher
//!
//! 将 include 模式解析为文件列表：
//! - 不含 `**` 的模式按单层 glob 匹配 `work_dir/pattern`
//! - 含 `**` 的模式拆成字面前缀和后缀，遍历 `work_dir/prefix` 整棵子树，
//!   后缀先匹配文件名，失败再匹配相对于遍历根目录的路径
//!
//! 目录、无法 stat 的条目会被静默跳过。

use glob::Pattern;
use ignore::WalkBuilder;
use indexmap::IndexSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::exclude::ExcludeSet;
use super::{match_options, normalize_pattern, FileFinder, FileSet};
use crate::error::{Result, SignError};

const RECURSIVE_WILDCARD: &str = "**";

/// 基于 glob 的文件查找器
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl PatternMatcher {
    pub fn new() -> Self {
        Self
    }

    /// 解析 include/exclude 模式
    ///
    /// 结果按 include 模式的声明顺序排列，同一路径只保留第一次出现。
    /// include 模式语法错误时返回 `InvalidPattern`。
    pub fn resolve(
        &self,
        work_dir: &Path,
        patterns: &[String],
        excludes: &[String],
    ) -> Result<FileSet> {
        let work_dir = if work_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            work_dir
        };

        let mut candidates: IndexSet<PathBuf> = IndexSet::new();
        for raw in patterns {
            let Some(pattern) = normalize_pattern(raw) else {
                continue;
            };

            let found = if pattern.contains(RECURSIVE_WILDCARD) {
                resolve_recursive(work_dir, pattern)?
            } else {
                resolve_flat(work_dir, pattern)?
            };
            debug!(pattern = %pattern, count = found.len(), "include 模式匹配完成");
            candidates.extend(found);
        }

        let exclude_set = ExcludeSet::new(work_dir, excludes);
        if exclude_set.is_empty() {
            return Ok(candidates.into_iter().collect());
        }

        let files = candidates
            .into_iter()
            .filter(|file| match exclude_set.matching_pattern(file) {
                Some(exclude) => {
                    debug!(file = %file.display(), exclude = %exclude, "文件被排除");
                    false
                }
                None => true,
            })
            .collect();

        Ok(files)
    }
}

impl FileFinder for PatternMatcher {
    fn find_files(
        &self,
        work_dir: &Path,
        patterns: &[String],
        excludes: &[String],
    ) -> Result<FileSet> {
        self.resolve(work_dir, patterns, excludes)
    }
}

/// stat 失败（不存在、无权限、竞态删除）一律视为非普通文件
fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// 以 `/` 开头的模式同样锚定在工作目录下
fn anchor(work_dir: &Path, pattern: &str) -> String {
    let base = work_dir.to_string_lossy();
    let base = base.trim_end_matches('/');
    format!(
        "{}/{}",
        Pattern::escape(base),
        pattern.trim_start_matches('/')
    )
}

/// 单层 glob 匹配
fn resolve_flat(work_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = anchor(work_dir, pattern);
    let entries = glob::glob_with(&full_pattern, match_options())
        .map_err(|e| SignError::invalid_pattern(pattern, e))?;

    let mut matches = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if is_regular_file(&path) => matches.push(path),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "跳过无法读取的条目"),
        }
    }
    Ok(matches)
}

/// 递归匹配 `prefix/**/suffix`
fn resolve_recursive(work_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let parts: Vec<&str> = pattern.split(RECURSIVE_WILDCARD).collect();
    if parts.len() != 2 {
        // 多个 `**` 时退化为单层匹配
        return resolve_flat(work_dir, &pattern.replace(RECURSIVE_WILDCARD, "*"));
    }

    let prefix = parts[0].trim_matches('/');
    let suffix = parts[1].trim_start_matches('/');

    let suffix_pattern = if suffix.is_empty() {
        None
    } else {
        Some(Pattern::new(suffix).map_err(|e| SignError::invalid_pattern(pattern, e))?)
    };

    let search_dir = if prefix.is_empty() {
        work_dir.to_path_buf()
    } else {
        work_dir.join(prefix)
    };

    let options = match_options();
    let mut matches = Vec::new();

    let walker = WalkBuilder::new(&search_dir)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "跳过无法访问的路径");
                continue;
            }
        };

        if entry.file_type().map_or(true, |t| t.is_dir()) {
            continue;
        }

        let path = entry.path();
        if !is_regular_file(path) {
            continue;
        }

        if let Some(suffix_pattern) = &suffix_pattern {
            let base_name = entry.file_name().to_string_lossy();
            let relative = path.strip_prefix(&search_dir).unwrap_or(path);
            if !suffix_pattern.matches_with(&base_name, options)
                && !suffix_pattern.matches_path_with(relative, options)
            {
                continue;
            }
        }

        matches.push(path.to_path_buf());
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_files(dir: &TempDir, files: &[&str]) {
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, b"test").unwrap();
        }
    }

    fn standard_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        create_test_files(
            &dir,
            &[
                "file1.txt",
                "file2.txt",
                "file.bin",
                "data.json",
                "subdir/file3.txt",
                "subdir/file4.bin",
                "dist/release.tar.gz",
                "dist/release.sha256",
            ],
        );
        dir
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn resolve(dir: &TempDir, patterns: &[&str], excludes: &[&str]) -> Vec<PathBuf> {
        PatternMatcher::new()
            .resolve(dir.path(), &strings(patterns), &strings(excludes))
            .unwrap()
            .into_vec()
    }

    fn paths(dir: &TempDir, files: &[&str]) -> Vec<PathBuf> {
        files.iter().map(|f| dir.path().join(f)).collect()
    }

    #[test]
    fn test_single_pattern() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["*.txt"], &[]),
            paths(&dir, &["file1.txt", "file2.txt"])
        );
    }

    #[test]
    fn test_multiple_patterns_keep_declaration_order() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["*.txt", "*.bin"], &[]),
            paths(&dir, &["file1.txt", "file2.txt", "file.bin"])
        );
        assert_eq!(
            resolve(&dir, &["*.bin", "*.txt"], &[]),
            paths(&dir, &["file.bin", "file1.txt", "file2.txt"])
        );
    }

    #[test]
    fn test_pattern_with_subdirectory() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["subdir/*.txt"], &[]),
            paths(&dir, &["subdir/file3.txt"])
        );
    }

    #[test]
    fn test_pattern_with_exclusion() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["dist/*"], &["*.sha256"]),
            paths(&dir, &["dist/release.tar.gz"])
        );
    }

    #[test]
    fn test_exclude_by_filename() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["*.txt"], &["file1.txt"]),
            paths(&dir, &["file2.txt"])
        );
    }

    #[test]
    fn test_no_matches_and_empty_patterns() {
        let dir = standard_tree();
        assert!(resolve(&dir, &["*.nonexistent"], &[]).is_empty());
        assert!(resolve(&dir, &[], &[]).is_empty());
        assert!(resolve(&dir, &["", "   "], &[]).is_empty());
    }

    #[test]
    fn test_recursive_pattern_matches_all_depths() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["**/*.txt"], &[]),
            paths(&dir, &["file1.txt", "file2.txt", "subdir/file3.txt"])
        );
    }

    #[test]
    fn test_recursive_pattern_with_prefix() {
        let dir = standard_tree();
        create_test_files(&dir, &["subdir/deep/er/file5.txt"]);
        assert_eq!(
            resolve(&dir, &["subdir/**/*.txt"], &[]),
            paths(&dir, &["subdir/deep/er/file5.txt", "subdir/file3.txt"])
        );
    }

    #[test]
    fn test_recursive_pattern_suffix_matches_relative_path() {
        let dir = standard_tree();
        create_test_files(&dir, &["pkg/linux/app.bin", "pkg/darwin/app.bin"]);
        assert_eq!(
            resolve(&dir, &["pkg/**/linux/*.bin"], &[]),
            paths(&dir, &["pkg/linux/app.bin"])
        );
    }

    #[test]
    fn test_recursive_pattern_with_empty_suffix_takes_whole_subtree() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["dist/**"], &[]),
            paths(&dir, &["dist/release.sha256", "dist/release.tar.gz"])
        );
    }

    #[test]
    fn test_recursive_pattern_missing_root_is_empty() {
        let dir = standard_tree();
        assert!(resolve(&dir, &["missing/**/*.txt"], &[]).is_empty());
    }

    #[test]
    fn test_recursive_exclude() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["**/*.txt"], &["subdir/**"]),
            paths(&dir, &["file1.txt", "file2.txt"])
        );
    }

    #[test]
    fn test_directories_never_match() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("matches.txt")).unwrap();
        create_test_files(&dir, &["file.txt"]);

        assert_eq!(
            resolve(&dir, &["*.txt"], &[]),
            paths(&dir, &["file.txt"])
        );
        assert_eq!(
            resolve(&dir, &["**/*.txt"], &[]),
            paths(&dir, &["file.txt"])
        );
    }

    #[test]
    fn test_no_duplicates() {
        let dir = TempDir::new().unwrap();
        create_test_files(&dir, &["file.txt"]);

        let files = resolve(&dir, &["*.txt", "file.*", "file.txt", "**/file.txt"], &[]);
        assert_eq!(files, paths(&dir, &["file.txt"]));
    }

    #[test]
    fn test_leading_dot_slash_is_normalized() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["./dist/*.tar.gz", "dist/*.tar.gz"], &[]),
            paths(&dir, &["dist/release.tar.gz"])
        );
    }

    #[test]
    fn test_invalid_include_pattern_fails() {
        let dir = standard_tree();
        let err = PatternMatcher::new()
            .resolve(dir.path(), &strings(&["*.txt", "[invalid"]), &[])
            .unwrap_err();
        assert!(err.is_pattern_error());
        assert!(err.to_string().contains("[invalid"));

        let err = PatternMatcher::new()
            .resolve(dir.path(), &strings(&["**/[invalid"]), &[])
            .unwrap_err();
        assert!(matches!(err, SignError::InvalidPattern { ref pattern, .. } if pattern == "**/[invalid"));
    }

    #[test]
    fn test_invalid_exclude_pattern_is_ignored() {
        let dir = standard_tree();
        assert_eq!(
            resolve(&dir, &["*.txt"], &["[invalid"]),
            paths(&dir, &["file1.txt", "file2.txt"])
        );
    }

    #[test]
    fn test_work_dir_with_glob_metacharacters() {
        let root = TempDir::new().unwrap();
        let work_dir = root.path().join("build[1]");
        fs::create_dir_all(&work_dir).unwrap();
        fs::write(work_dir.join("a.txt"), b"a").unwrap();

        let files = PatternMatcher::new()
            .resolve(&work_dir, &strings(&["*.txt"]), &[])
            .unwrap();
        assert_eq!(files.into_vec(), vec![work_dir.join("a.txt")]);
    }

    #[test]
    fn test_absolute_patterns_stay_under_work_dir() {
        let dir = standard_tree();
        let outside = TempDir::new().unwrap();
        create_test_files(&outside, &["d/secret.txt"]);

        let flat = format!("{}/d/*.txt", outside.path().display());
        let recursive = format!("{}/**/*.txt", outside.path().display());
        for pattern in [flat.as_str(), recursive.as_str()] {
            let files = resolve(&dir, &[pattern], &[]);
            assert!(
                files.iter().all(|f| f.starts_with(dir.path())),
                "{pattern}: {files:?}"
            );
        }

        assert_eq!(
            resolve(&dir, &["/dist/*.tar.gz"], &[]),
            paths(&dir, &["dist/release.tar.gz"])
        );
        assert_eq!(
            resolve(&dir, &["/subdir/**/*.bin"], &[]),
            paths(&dir, &["subdir/file4.bin"])
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let dir = standard_tree();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("link.txt"))
            .unwrap();
        assert_eq!(
            resolve(&dir, &["*.txt"], &[]),
            paths(&dir, &["file1.txt", "file2.txt"])
        );
    }
}
