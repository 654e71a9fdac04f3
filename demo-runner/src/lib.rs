//! # Demo Runner
//!
//! Executes small, untrusted Python and JavaScript snippets in a child process
//! bounded by a wall-clock timeout and gated by an import/function denylist.
//!
//! The denylist is a best-effort mitigation. It is pattern based and can be
//! bypassed (aliasing through `getattr`, string-built module names,
//! reflection). Anything beyond a demo needs a real isolation boundary
//! around the child: a restricted user, mount and network namespaces, a
//! cgroup, or an interpreter with no host module access at all.

mod config;
mod denylist;
mod error;
mod executor;
mod languages;
mod sandbox;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::SandboxConfig;
pub use denylist::Violation;
pub use error::Error;
pub use executor::CodeExecutor;
pub use service::{CodeExecutionService, CodeRunner};
pub use types::{
    catalog, ExecutionRequest, ExecutionResult, Language, LanguageInfo, Outcome, ResourceLimits,
};

/// Result type for code execution operations
pub type Result<T> = std::result::Result<T, Error>;
