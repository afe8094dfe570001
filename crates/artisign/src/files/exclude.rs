//! 排除规则
//!
//! exclude 模式常被写成裸文件名、相对 glob 或递归 glob，这里对三种写法一视同仁。
//! 任意一条规则命中即排除：
//!
//! 1. 匹配相对于工作目录的路径
//! 2. 匹配文件名
//! 3. 含 `**` 时，去掉 `**` 后的简化模式匹配文件名或相对路径
//! 4. 与工作目录拼接后匹配完整路径
//!
//! 语法错误的 exclude 模式视为永不匹配。

use glob::Pattern;
use std::path::{Path, PathBuf};

use super::{match_options, normalize_pattern};

#[derive(Debug)]
struct ExcludeRule {
    raw: String,
    relative: Option<Pattern>,
    simplified: Option<Pattern>,
    anchored: Option<Pattern>,
}

impl ExcludeRule {
    fn compile(work_dir: &Path, raw: &str) -> Self {
        let relative = compile_lenient(raw);

        let simplified = if raw.contains("**") {
            let simple = raw.replace("**/", "").replace("**", "");
            if simple.is_empty() {
                None
            } else {
                compile_lenient(&simple)
            }
        } else {
            None
        };

        let anchored = compile_lenient(&format!(
            "{}/{}",
            Pattern::escape(work_dir.to_string_lossy().trim_end_matches('/')),
            raw.trim_start_matches('/')
        ));

        Self {
            raw: raw.to_string(),
            relative,
            simplified,
            anchored,
        }
    }

    fn matches(&self, file: &Path, relative: &Path, base_name: &str) -> bool {
        let options = match_options();

        if let Some(pattern) = &self.relative {
            if pattern.matches_path_with(relative, options) || pattern.matches_with(base_name, options)
            {
                return true;
            }
        }

        if let Some(pattern) = &self.simplified {
            if pattern.matches_with(base_name, options) || pattern.matches_path_with(relative, options)
            {
                return true;
            }
        }

        self.anchored
            .as_ref()
            .is_some_and(|pattern| pattern.matches_path_with(file, options))
    }
}

fn compile_lenient(pattern: &str) -> Option<Pattern> {
    match Pattern::new(pattern) {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::debug!(pattern = %pattern, error = %e, "exclude 模式无效，忽略");
            None
        }
    }
}

/// 编译后的 exclude 模式集合
#[derive(Debug)]
pub struct ExcludeSet {
    work_dir: PathBuf,
    rules: Vec<ExcludeRule>,
}

impl ExcludeSet {
    pub fn new(work_dir: impl AsRef<Path>, excludes: &[String]) -> Self {
        let work_dir = work_dir.as_ref().to_path_buf();
        let rules = excludes
            .iter()
            .filter_map(|e| normalize_pattern(e))
            .map(|e| ExcludeRule::compile(&work_dir, e))
            .collect();
        Self { work_dir, rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 判断文件是否被任意 exclude 模式命中
    pub fn is_excluded(&self, file: &Path) -> bool {
        self.matching_pattern(file).is_some()
    }

    /// 返回第一个命中的原始 exclude 模式
    pub fn matching_pattern(&self, file: &Path) -> Option<&str> {
        if self.rules.is_empty() {
            return None;
        }

        let relative = file.strip_prefix(&self.work_dir).unwrap_or(file);
        let base_name = file
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        self.rules
            .iter()
            .find(|rule| rule.matches(file, relative, &base_name))
            .map(|rule| rule.raw.as_str())
    }
}
