use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::{
    config::SandboxConfig,
    error::Error,
    executor::CodeExecutor,
    types::{catalog, ExecutionRequest, ExecutionResult, LanguageInfo, Outcome},
};

/// What the HTTP layer needs from an execution backend
#[async_trait]
pub trait CodeRunner: Send + Sync {
    /// Run one submission; failures are reported in the result's outcome
    async fn run(&self, request: ExecutionRequest) -> ExecutionResult;

    /// Wall-clock budget applied to each run
    fn timeout(&self) -> Duration;

    fn languages(&self) -> Vec<LanguageInfo> {
        catalog()
    }
}

#[derive(Clone)]
pub struct CodeExecutionService {
    executor: Arc<CodeExecutor>,
    semaphore: Arc<Semaphore>,
}

impl CodeExecutionService {
    pub async fn new(config: SandboxConfig) -> Result<Self, Error> {
        let max_concurrent = config.max_concurrent;
        let executor = CodeExecutor::new(config).await?;

        Ok(Self {
            executor: Arc::new(executor),
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        })
    }

    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        // Acquire execution permit
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                error!("Failed to acquire execution permit: {}", e);
                return ExecutionResult::failed(
                    Outcome::InternalError(format!("Failed to acquire execution permit: {}", e)),
                    Duration::ZERO,
                );
            }
        };

        debug!(
            "Starting code execution for language: {:?}",
            request.language
        );

        self.executor.execute(request).await
    }

    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn config(&self) -> &SandboxConfig {
        self.executor.config()
    }
}

#[async_trait]
impl CodeRunner for CodeExecutionService {
    async fn run(&self, request: ExecutionRequest) -> ExecutionResult {
        self.execute(request).await
    }

    fn timeout(&self) -> Duration {
        self.config().timeout
    }
}
