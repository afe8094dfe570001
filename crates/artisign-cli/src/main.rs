//! artisign 命令行入口
//!
//! 退出码：0 全部签名成功或没有匹配文件；1 任何错误；2 参数错误。

mod action_output;
mod build_info;
mod cli;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use artisign::{Orchestrator, RunStatus, Signer};
use tracing::{debug, error, warn};

use crate::action_output::ActionOutput;
use crate::build_info::BuildInfo;
use crate::cli::ActionArgs;

fn main() -> ExitCode {
    let build = BuildInfo::current();
    let args = ActionArgs::parse_with(&build);
    logging::init(&args.log_level);

    match run(&args, &build) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "执行失败");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &ActionArgs, build: &BuildInfo) -> anyhow::Result<()> {
    debug!(
        version = build.version,
        backend = %args.backend,
        armor = args.armor,
        detach_sign = args.detach_sign,
        clear_sign = args.clear_sign,
        has_passphrase = args.passphrase().is_some(),
        "启动签名"
    );

    let backend = args.backend()?;
    let signer = Signer::new(
        backend,
        &args.private_key,
        args.passphrase(),
        &args.gnupg_config(),
    )
    .context("failed to create signer")?;
    debug!(backend = %signer.backend(), "签名器已创建");

    let work_dir = args
        .work_dir()
        .context("failed to determine working directory")?;
    debug!(work_dir = %work_dir.display(), "工作目录已确定");

    let request = args.to_request(work_dir);
    debug!(patterns = ?request.patterns, excludes = ?request.excludes, "文件模式");

    let report = Orchestrator::new(&signer)
        .run(&request)
        .context("failed to find files")?;

    ActionOutput::from_env().publish(&report);

    if report.status() == RunStatus::Partial {
        warn!(
            signed = report.signed.len(),
            unattempted = report.unattempted().len(),
            "部分文件已签名，剩余文件未处理"
        );
    }

    report.into_result()?;
    Ok(())
}
