//! 子进程执行
//!
//! 外部签名后端通过 `ProcessRunner` 调用 gpg，测试中可替换为假实现，
//! 不需要真正启动可执行文件。调用是阻塞的，没有超时。

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

/// 一次进程调用
#[derive(Clone, Default)]
pub struct ProcessCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// 额外设置的环境变量
    pub env: Vec<(OsString, OsString)>,
    /// 写入标准输入的内容，写完后关闭
    pub stdin: Option<Vec<u8>>,
}

impl ProcessCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// 参数中 `flag` 之后紧跟的值
    pub fn arg_value(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

// stdin 可能包含口令或私钥，只输出长度
impl fmt::Debug for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env)
            .field("stdin_len", &self.stdin.as_ref().map(Vec::len))
            .finish()
    }
}

/// 进程执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// 退出码，被信号终止时为 None
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// 子进程执行接口
pub trait ProcessRunner: Send + Sync {
    fn run(&self, command: &ProcessCommand) -> io::Result<ProcessOutput>;
}

/// 基于 `std::process::Command` 的默认实现
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, command: &ProcessCommand) -> io::Result<ProcessOutput> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k, v)))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = cmd.spawn()?;
        let stdin = child.stdin.take();

        // stdin 在独立线程写入，同时读取输出，避免双方都阻塞在满管道上
        thread::scope(|scope| {
            let writer = match (&command.stdin, stdin) {
                (Some(input), Some(mut pipe)) => Some(scope.spawn(move || {
                    match pipe.write_all(input) {
                        // 子进程可能在读完前就退出了，退出状态会说明原因
                        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                        _ => Ok(()),
                    }
                })),
                _ => None,
            };

            let output = child.wait_with_output()?;

            if let Some(writer) = writer {
                writer
                    .join()
                    .map_err(|_| io::Error::other("stdin writer thread panicked"))??;
            }

            Ok(ProcessOutput {
                code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            })
        })
    }
}

/// 在 PATH 中查找可执行文件，带路径分隔符的程序名原样返回
pub fn resolve_program(program: &Path) -> Result<PathBuf, which::Error> {
    if program.components().count() > 1 || program.is_absolute() {
        return Ok(program.to_path_buf());
    }
    which::which(program)
}
