use crate::{
    denylist::{self, Violation},
    languages::LanguageExecutor,
    types::Language,
};

pub struct PythonExecutor;

impl LanguageExecutor for PythonExecutor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_extension(&self) -> &str {
        "py"
    }

    fn run_commands(&self) -> &[&str] {
        &["python3", "python"]
    }

    fn env_vars(&self) -> Vec<(&str, &str)> {
        vec![
            // No __pycache__ next to the temporary source
            ("PYTHONDONTWRITEBYTECODE", "1"),
            ("PYTHONIOENCODING", "utf-8"),
        ]
    }

    fn validate(&self, source: &str) -> Result<(), Violation> {
        denylist::check_python(source)
    }
}
