use nix::errno::Errno;
use nix::sys::resource::{setrlimit, Resource};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::{setpgid, Pid};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tempfile::NamedTempFile;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::{Child, Command},
    task::JoinHandle,
    time::{self, Duration},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::SandboxConfig, error::Error, types::ResourceLimits};

/// Minimal PATH for the child; the interpreter itself is resolved beforehand.
const SAFE_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// How long to wait for output pipes to close once the child has exited
const PIPE_CLOSE_WAIT: Duration = Duration::from_secs(1);

/// Captured result of a process that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Single-use execution environment for one submission
pub struct Sandbox {
    /// Directory for the source unit, also the child's cwd and HOME
    work_dir: PathBuf,
    limits: ResourceLimits,
    kill_grace: Duration,
    /// Unique ID for this sandbox instance
    id: String,
}

impl Sandbox {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            work_dir: config.work_dir(),
            limits: config.limits.clone(),
            kill_grace: config.kill_grace,
            id: Uuid::new_v4().to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Write `code` to a fresh temporary source unit.
    ///
    /// The file is removed when the returned handle is dropped, whichever
    /// way the caller exits.
    pub fn write_source(&self, code: &str, extension: &str) -> Result<NamedTempFile, Error> {
        let mut file = tempfile::Builder::new()
            .prefix("demo-")
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.work_dir)?;
        file.write_all(code.as_bytes())?;
        file.flush()?;
        debug!(sandbox = %self.id, path = %file.path().display(), "wrote source unit");
        Ok(file)
    }

    /// Run `program args...` until it exits or `timeout` elapses.
    ///
    /// The child leads its own process group, so on timeout the whole
    /// subtree is signalled, not just the direct child.
    pub async fn execute(
        &self,
        program: &Path,
        args: &[OsString],
        env: &[(&str, &str)],
        input: Option<&str>,
        timeout: Duration,
    ) -> Result<ProcessOutput, Error> {
        debug!(sandbox = %self.id, ?program, ?args, "spawning");

        let mut command = Command::new(program);
        command
            .args(args)
            .env_clear()
            .envs(env.iter().copied())
            .env("PATH", SAFE_PATH)
            .env("HOME", &self.work_dir)
            .current_dir(&self.work_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        let cpu_time = self.limits.cpu_time;
        let file_size = self.limits.file_size;

        unsafe {
            command.pre_exec(move || {
                setpgid(Pid::from_raw(0), Pid::from_raw(0))?;
                setrlimit(Resource::RLIMIT_CPU, cpu_time, cpu_time)?;
                setrlimit(Resource::RLIMIT_FSIZE, file_size, file_size)?;
                Ok(())
            });
        }

        let mut child = command.spawn().map_err(Error::Spawn)?;
        // Must drop before `child` if this future is cancelled
        let mut group = ProcessGroup::new(child.id());

        let max_output = self.limits.max_output;
        let stdout_task = tokio::spawn(drain(child.stdout.take(), max_output));
        let stderr_task = tokio::spawn(drain(child.stderr.take(), max_output));
        let stdin_task = feed_stdin(&mut child, input);

        let waited = time::timeout(timeout, child.wait()).await;

        let status = match waited {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                self.terminate(&mut child, &mut group).await;
                abort_all(&[&stdout_task, &stderr_task], stdin_task.as_ref());
                return Err(Error::Sandbox(format!("Process error: {}", e)));
            }
            Err(_) => {
                warn!(sandbox = %self.id, "timed out after {:?}, terminating", timeout);
                self.terminate(&mut child, &mut group).await;
                abort_all(&[&stdout_task, &stderr_task], stdin_task.as_ref());
                return Err(Error::Timeout(timeout));
            }
        };

        // Background descendants would otherwise outlive the call and keep
        // the output pipes open.
        group.kill();
        if let Some(task) = stdin_task {
            task.abort();
        }

        let stdout = join_output(stdout_task).await?;
        let stderr = join_output(stderr_task).await?;

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code: exit_code(status),
        })
    }

    /// SIGTERM the group, give it `kill_grace`, then SIGKILL and reap.
    async fn terminate(&self, child: &mut Child, group: &mut ProcessGroup) {
        group.signal(Signal::SIGTERM);
        time::sleep(self.kill_grace).await;
        group.kill();
        if let Err(e) = child.kill().await {
            debug!(sandbox = %self.id, "reaping child failed: {}", e);
        }
    }
}

/// Process group led by the spawned child, SIGKILLed at most once.
///
/// Dropping it kills the group, so every exit from [`Sandbox::execute`],
/// including cancellation of its future, leaves no member running.
struct ProcessGroup {
    pgid: Option<Pid>,
}

impl ProcessGroup {
    fn new(leader: Option<u32>) -> Self {
        Self {
            pgid: leader.map(|id| Pid::from_raw(id as i32)),
        }
    }

    fn signal(&self, signal: Signal) {
        if let Some(pgid) = self.pgid {
            signal_group(pgid, signal);
        }
    }

    /// SIGKILL the group and disarm.
    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            signal_group(pgid, Signal::SIGKILL);
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

fn signal_group(pgid: Pid, signal: Signal) {
    match killpg(pgid, signal) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!("Failed to send {:?} to process group {}: {}", signal, pgid, e),
    }
}

fn feed_stdin(child: &mut Child, input: Option<&str>) -> Option<JoinHandle<()>> {
    let data = input?.to_owned();
    let mut stdin = child.stdin.take()?;
    Some(tokio::spawn(async move {
        if let Err(e) = stdin.write_all(data.as_bytes()).await {
            // The program is free to exit without reading its input
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                debug!("Failed to write input: {}", e);
            }
        }
        // Dropping stdin closes the pipe and signals EOF
    }))
}

/// Read a pipe to EOF, keeping at most `limit` bytes.
async fn drain<R>(pipe: Option<R>, limit: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        (&mut pipe).take(limit as u64).read_to_end(&mut buf).await?;
        // Keep the writer unblocked until it exits
        tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await?;
    }
    Ok(buf)
}

async fn join_output(mut task: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<String, Error> {
    let joined = match time::timeout(PIPE_CLOSE_WAIT, &mut task).await {
        Ok(joined) => joined,
        Err(_) => {
            // A descendant left the process group and still holds the pipe
            task.abort();
            return Err(Error::Sandbox(
                "output pipe held open after the program exited".to_string(),
            ));
        }
    };
    let bytes = joined.map_err(|e| Error::Sandbox(format!("Output reader failed: {}", e)))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn abort_all<T>(readers: &[&JoinHandle<T>], stdin: Option<&JoinHandle<()>>) {
    for reader in readers {
        reader.abort();
    }
    if let Some(stdin) = stdin {
        stdin.abort();
    }
}

/// Exit code, or `128 + signo` for a signal death as a shell reports it.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
