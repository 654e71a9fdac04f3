pub mod defaults {
    use crate::{CodeExecutionService, Result, SandboxConfig};
    use std::path::Path;
    use tokio::time::Duration;

    pub fn test_config(work_dir: &Path) -> SandboxConfig {
        SandboxConfig::default()
            .with_work_dir(work_dir)
            .with_timeout(default_timeout())
    }

    pub async fn setup_test_service(work_dir: &Path) -> Result<CodeExecutionService> {
        CodeExecutionService::new(test_config(work_dir)).await
    }

    pub fn default_timeout() -> Duration {
        Duration::from_secs(5)
    }

    pub fn short_timeout() -> Duration {
        Duration::from_secs(1)
    }
}

pub mod process {
    use std::path::Path;
    use tokio::time::{sleep, Duration, Instant};

    /// True while `pid` exists and is not a zombie
    #[cfg(target_os = "linux")]
    pub fn process_alive(pid: i32) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            // Format: pid (comm) state ...
            Ok(stat) => match stat.rsplit_once(')') {
                Some((_, rest)) => !rest.trim_start().starts_with('Z'),
                None => true,
            },
            Err(_) => false,
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn process_alive(pid: i32) -> bool {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;
        kill(Pid::from_raw(pid), None).is_ok()
    }

    /// Poll until `pid` is gone; signal delivery is asynchronous.
    pub async fn wait_until_gone(pid: i32, within: Duration) -> bool {
        let deadline = Instant::now() + within;
        while Instant::now() < deadline {
            if !process_alive(pid) {
                return true;
            }
            sleep(Duration::from_millis(20)).await;
        }
        !process_alive(pid)
    }

    /// Poll `/proc` for a live process whose cwd is `dir`.
    #[cfg(target_os = "linux")]
    pub async fn wait_for_pid_in(dir: &Path, within: Duration) -> Option<i32> {
        let deadline = Instant::now() + within;
        loop {
            let found = std::fs::read_dir("/proc").ok().and_then(|entries| {
                entries
                    .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse::<i32>().ok())
                    .find(|pid| {
                        std::fs::read_link(format!("/proc/{}/cwd", pid))
                            .map(|cwd| cwd == dir)
                            .unwrap_or(false)
                    })
            });
            if found.is_some() || Instant::now() >= deadline {
                return found;
            }
            sleep(Duration::from_millis(20)).await;
        }
    }

    pub fn read_pid(path: &Path) -> i32 {
        std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("pid file {}: {}", path.display(), e))
            .trim()
            .parse()
            .expect("pid file holds a number")
    }

    pub fn dir_is_empty(path: &Path) -> bool {
        std::fs::read_dir(path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false)
    }
}
