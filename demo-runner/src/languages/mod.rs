//! Language-specific executor implementations

mod javascript;
mod python;

pub use javascript::JavaScriptExecutor;
pub use python::PythonExecutor;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use which::which;

use crate::{denylist::Violation, error::Error, types::Language};

/// Per-runtime behaviour of the sandbox
pub trait LanguageExecutor: Send + Sync {
    fn language(&self) -> Language;

    /// Get the file extension for source files
    fn file_extension(&self) -> &str;

    /// Binaries able to run the code, in order of preference
    fn run_commands(&self) -> &[&str];

    /// Arguments for the run command; the source file is the only one
    fn run_args(&self, source_file: &Path) -> Vec<OsString> {
        vec![source_file.as_os_str().to_owned()]
    }

    /// Extra environment for the child, which otherwise starts empty
    fn env_vars(&self) -> Vec<(&str, &str)> {
        Vec::new()
    }

    /// Reject source that reaches for host resources
    fn validate(&self, source: &str) -> Result<(), Violation>;

    /// Locate the interpreter on the host
    fn resolve_command(&self) -> Result<PathBuf, Error> {
        self.run_commands()
            .iter()
            .find_map(|cmd| which(cmd).ok())
            .ok_or_else(|| Error::RuntimeNotFound(self.run_commands().join(" or ")))
    }
}

static PYTHON: PythonExecutor = PythonExecutor;
static JAVASCRIPT: JavaScriptExecutor = JavaScriptExecutor;

pub(crate) fn executor_for(language: Language) -> &'static dyn LanguageExecutor {
    match language {
        Language::Python => &PYTHON,
        Language::JavaScript => &JAVASCRIPT,
    }
}

#[cfg(test)]
pub(crate) fn skip_if_not_available(tools: &[&str]) -> bool {
    let missing: Vec<_> = tools
        .iter()
        .filter(|tool| which(**tool).is_err())
        .map(|s| (*s).to_string())
        .collect();

    if !missing.is_empty() {
        eprintln!("Skipping test: {} not available", missing.join(", "));
        return true;
    }
    false
}
