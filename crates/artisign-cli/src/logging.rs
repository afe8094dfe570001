//! 日志初始化
//!
//! 级别来自 `--log-level` / `LOG_LEVEL`，设置了 `RUST_LOG` 时以其为准。

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// 将输入的级别名映射为过滤指令，未知值按 info 处理
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

pub fn env_filter(level: &str) -> EnvFilter {
    let directive = level_directive(level);
    match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => {
            EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(directive))
        }
        _ => EnvFilter::new(directive),
    }
}

pub fn init(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stdout)
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use test_case::test_case;

    #[test_case("debug" => "debug" ; "debug")]
    #[test_case("INFO" => "info" ; "uppercase")]
    #[test_case("warn" => "warn" ; "warn")]
    #[test_case("warning" => "warn" ; "warning alias")]
    #[test_case(" error " => "error" ; "padded")]
    #[test_case("verbose" => "info" ; "unknown falls back")]
    #[test_case("" => "info" ; "empty falls back")]
    fn test_level_directive(level: &str) -> &'static str {
        level_directive(level)
    }

    #[test]
    #[serial]
    fn test_env_filter_uses_level_without_rust_log() {
        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(env_filter("debug").to_string(), "debug");
            assert_eq!(env_filter("bogus").to_string(), "info");
        });
    }

    #[test]
    #[serial]
    fn test_rust_log_overrides_level() {
        temp_env::with_var("RUST_LOG", Some("artisign=trace"), || {
            assert_eq!(env_filter("error").to_string(), "artisign=trace");
        });
    }

    #[test]
    #[serial]
    fn test_blank_rust_log_is_ignored() {
        temp_env::with_var("RUST_LOG", Some("  "), || {
            assert_eq!(env_filter("warn").to_string(), "warn");
        });
    }
}
