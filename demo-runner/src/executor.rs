use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::{
    config::SandboxConfig,
    error::Error,
    languages::executor_for,
    sandbox::Sandbox,
    types::{ExecutionRequest, ExecutionResult, Language, Outcome},
};

/// Runs one submission end to end and classifies how it ended
pub struct CodeExecutor {
    config: SandboxConfig,
}

impl CodeExecutor {
    /// Create a new code executor, making sure the work directory exists
    pub async fn new(config: SandboxConfig) -> Result<Self, Error> {
        config.validate()?;

        let work_dir = config.work_dir();
        fs::create_dir_all(&work_dir).await.map_err(|e| {
            Error::Sandbox(format!(
                "Failed to create work directory {}: {}",
                work_dir.display(),
                e
            ))
        })?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Execute a submission. Every failure is reported through
    /// [`ExecutionResult::outcome`]; this never errors.
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let language: Language = match request.language.parse() {
            Ok(language) => language,
            Err(reason) => {
                warn!("Rejected submission: {}", reason);
                return ExecutionResult::rejected(reason);
            }
        };
        let executor = executor_for(language);

        if let Err(violation) = executor.validate(&request.code) {
            warn!(%language, "Rejected submission: {}", violation);
            return ExecutionResult::rejected(violation.to_string());
        }

        let program = match executor.resolve_command() {
            Ok(program) => program,
            Err(e) => {
                warn!(%language, "{}", e);
                return ExecutionResult::failed(Outcome::RuntimeUnavailable, Duration::ZERO);
            }
        };

        let sandbox = Sandbox::new(&self.config);
        let source = match sandbox.write_source(&request.code, executor.file_extension()) {
            Ok(source) => source,
            Err(e) => {
                error!(sandbox = sandbox.id(), "Failed to write source unit: {}", e);
                return ExecutionResult::failed(
                    Outcome::InternalError(e.to_string()),
                    Duration::ZERO,
                );
            }
        };

        let start = Instant::now();
        let run = sandbox
            .execute(
                &program,
                &executor.run_args(source.path()),
                &executor.env_vars(),
                request.input.as_deref(),
                self.config.timeout,
            )
            .await;
        let elapsed = start.elapsed();

        // Drop would remove it too; closing surfaces the error for the log
        if let Err(e) = source.close() {
            warn!(sandbox = sandbox.id(), "Failed to remove source unit: {}", e);
        }

        let result = match run {
            Ok(output) => ExecutionResult::completed(
                output.stdout,
                output.stderr,
                output.exit_code,
                elapsed,
            ),
            Err(Error::Timeout(_)) => ExecutionResult::failed(Outcome::TimedOut, elapsed),
            Err(e) if e.is_runtime_missing() => {
                warn!(%language, "{}", e);
                ExecutionResult::failed(Outcome::RuntimeUnavailable, elapsed)
            }
            Err(e) => {
                error!(sandbox = sandbox.id(), "Code execution failed: {}", e);
                ExecutionResult::failed(Outcome::InternalError(e.to_string()), elapsed)
            }
        };

        match &result.outcome {
            Outcome::Completed => info!(
                sandbox = sandbox.id(),
                %language,
                exit_code = ?result.exit_code,
                execution_time = %result.execution_time,
                "Code execution completed"
            ),
            other => debug!(sandbox = sandbox.id(), %language, outcome = ?other, "Code execution ended"),
        }

        result
    }
}
