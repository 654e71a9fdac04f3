use crate::{
    denylist::{self, Violation},
    languages::LanguageExecutor,
    types::Language,
};

pub struct JavaScriptExecutor;

impl LanguageExecutor for JavaScriptExecutor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn file_extension(&self) -> &str {
        "js"
    }

    fn run_commands(&self) -> &[&str] {
        // Older Debian releases ship the binary as `nodejs`
        &["node", "nodejs"]
    }

    fn validate(&self, source: &str) -> Result<(), Violation> {
        denylist::check_javascript(source)
    }
}
