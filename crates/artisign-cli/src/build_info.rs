//! 构建信息
//!
//! 启动时构造一次，只用于版本输出。

use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    /// 构建时通过 `ARTISIGN_REVISION` 注入
    pub revision: Option<&'static str>,
    /// 构建时通过 `ARTISIGN_BUILD_DATE` 注入
    pub build_date: Option<&'static str>,
    pub started_at: DateTime<Local>,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            revision: option_env!("ARTISIGN_REVISION").filter(|s| !s.is_empty()),
            build_date: option_env!("ARTISIGN_BUILD_DATE").filter(|s| !s.is_empty()),
            started_at: Local::now(),
        }
    }

    /// `--version` 输出
    pub fn long_version(&self) -> String {
        let build_date = match self.build_date {
            Some(date) => date.to_string(),
            None => self.started_at.format("%Y-%m-%d").to_string(),
        };
        format!(
            "{}\nrevision: {}\nbuild date: {}",
            self.version,
            self.revision.unwrap_or("unknown"),
            build_date
        )
    }
}
