use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Languages the runner can actually execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    /// Rejection reason for tags that do not name a runnable language.
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        match tag.as_str() {
            "python" | "python3" | "py" => Ok(Language::Python),
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            _ => match CATALOG.iter().find(|(code, _)| *code == tag) {
                Some((_, name)) => Err(format!("{} execution not implemented", name)),
                None => Err(format!("unsupported language '{}'", s.trim())),
            },
        }
    }
}

/// Languages the dashboard knows about, runnable or not
const CATALOG: [(&str, &str); 7] = [
    ("python", "Python"),
    ("javascript", "JavaScript"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("csharp", "C#"),
    ("go", "Go"),
    ("rust", "Rust"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub name: &'static str,
    /// True when snippets in this language can be executed
    pub demo_support: bool,
}

/// The language list served to clients. `demo_support` is derived from
/// [`Language`] parsing, so it cannot drift from what actually runs.
pub fn catalog() -> Vec<LanguageInfo> {
    CATALOG
        .iter()
        .map(|&(code, name)| LanguageInfo {
            code,
            name,
            demo_support: code.parse::<Language>().is_ok(),
        })
        .collect()
}

/// Code execution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Raw language tag, parsed by the executor
    pub language: String,
    /// Source code to execute
    pub code: String,
    /// Data written to the program's stdin
    #[serde(default)]
    pub input: Option<String>,
}

impl ExecutionRequest {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            input: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }
}

/// Terminal state of one execution attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Rejected(String),
    TimedOut,
    RuntimeUnavailable,
    InternalError(String),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    /// Human-readable reason why no program output was produced.
    pub fn describe(&self) -> Option<String> {
        match self {
            Outcome::Completed => None,
            Outcome::Rejected(reason) => Some(reason.clone()),
            Outcome::TimedOut => Some("code execution timed out".to_string()),
            Outcome::RuntimeUnavailable => {
                Some("language runtime not found on this host".to_string())
            }
            Outcome::InternalError(message) => Some(format!("execution failed: {}", message)),
        }
    }
}

/// Execution result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Program output (stdout)
    pub stdout: String,
    /// Program errors (stderr), `None` when nothing was written
    pub stderr: Option<String>,
    /// Exit status, only set for [`Outcome::Completed`]
    pub exit_code: Option<i32>,
    /// Wall-clock duration, e.g. `"0.04s"`
    pub execution_time: String,
    pub outcome: Outcome,
}

impl ExecutionResult {
    pub fn completed(stdout: String, stderr: String, exit_code: i32, elapsed: Duration) -> Self {
        Self {
            stdout,
            stderr: if stderr.is_empty() { None } else { Some(stderr) },
            exit_code: Some(exit_code),
            execution_time: format_elapsed(elapsed),
            outcome: Outcome::Completed,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::failed(Outcome::Rejected(reason.into()), Duration::ZERO)
    }

    pub fn failed(outcome: Outcome, elapsed: Duration) -> Self {
        Self {
            stdout: String::new(),
            stderr: None,
            exit_code: None,
            execution_time: format_elapsed(elapsed),
            outcome,
        }
    }
}

pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// Resource limits applied to the child process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    /// Maximum CPU time (seconds)
    pub cpu_time: u64,
    /// Maximum size of any file the child writes (bytes)
    pub file_size: u64,
    /// Bytes kept from each of stdout and stderr; the rest is discarded
    pub max_output: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            cpu_time: 15,
            file_size: 10 * 1024 * 1024, // 10MB
            max_output: 1024 * 1024,     // 1MB
        }
    }
}
