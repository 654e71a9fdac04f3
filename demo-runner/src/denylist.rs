//! Source-level denylist applied before anything touches the host.
//!
//! Matching is purely textual. It blocks the obvious routes to the host
//! (OS, process, filesystem and module-loading APIs) and nothing more:
//! `getattr(__builtins__, "ev" + "al")` and friends get through. Treat a
//! pass as "not obviously hostile", never as "safe".

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Why a submission was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("import '{0}' not allowed")]
    Import(String),

    #[error("function '{0}' not allowed")]
    Function(String),

    #[error("module '{0}' not allowed")]
    Module(String),
}

/// OS interface, process spawning, filesystem paths, dynamic loading, shells
pub(crate) const PYTHON_BLOCKED_MODULES: &[&str] = &[
    "os",
    "sys",
    "subprocess",
    "shutil",
    "pathlib",
    "importlib",
    "pty",
    "multiprocessing",
    "posix",
    "nt",
    "_posixsubprocess",
    "ctypes",
];

pub(crate) const JS_BLOCKED_MODULES: &[&str] = &["fs", "child_process", "os", "path", "crypto"];

// Statement starts: line start, after `;`, or after the `:` of a one-line
// compound statement (`if x: import os`). Form feed counts as indentation.
static PY_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[;:])[ \t\x0c]*import[ \t\x0c]+([^\n;#]+)").unwrap()
});

static PY_FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[;:])[ \t\x0c]*from[ \t\x0c]+([\w.]+)[ \t\x0c]+import\b").unwrap()
});

static PY_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(eval|exec|compile|open|__import__)\s*\(").unwrap());

// require('fs'), require(`node:fs`), import('fs/promises')
static JS_REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*['"`](?:node:)?([\w-]+)(?:/[^'"`]*)?['"`]\s*\)"#)
        .unwrap()
});

// import fs from 'fs', import { a } from "node:os", import 'path'
static JS_IMPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*(?:[^;'"`()]*?\bfrom\s*)?['"`](?:node:)?([\w-]+)(?:/[^'"`]*)?['"`]"#)
        .unwrap()
});

/// Check Python source against the import and call denylists.
pub fn check_python(source: &str) -> Result<(), Violation> {
    let source = logical_lines(source);

    let mut imports: Vec<(usize, String)> = Vec::new();
    for caps in PY_IMPORT.captures_iter(&source) {
        let names = &caps[1];
        let start = caps.get(1).map_or(0, |m| m.start());
        for item in names.split(',') {
            if let Some(module) = top_level_module(item.trim().trim_start_matches('(')) {
                imports.push((start, module.to_string()));
            }
        }
    }
    for caps in PY_FROM_IMPORT.captures_iter(&source) {
        let start = caps.get(1).map_or(0, |m| m.start());
        if let Some(module) = top_level_module(&caps[1]) {
            imports.push((start, module.to_string()));
        }
    }
    imports.sort_by_key(|(pos, _)| *pos);

    if let Some((_, module)) = imports
        .into_iter()
        .find(|(_, module)| PYTHON_BLOCKED_MODULES.contains(&module.as_str()))
    {
        return Err(Violation::Import(module));
    }

    if let Some(caps) = PY_CALL.captures(&source) {
        return Err(Violation::Function(caps[1].to_string()));
    }

    Ok(())
}

/// Check JavaScript source against the module denylist.
pub fn check_javascript(source: &str) -> Result<(), Violation> {
    let mut hits: Vec<(usize, &str)> = JS_REQUIRE
        .captures_iter(source)
        .chain(JS_IMPORT_FROM.captures_iter(source))
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str()))
        .filter(|(_, module)| JS_BLOCKED_MODULES.contains(module))
        .collect();
    hits.sort_by_key(|(pos, _)| *pos);

    match hits.first() {
        Some((_, module)) => Err(Violation::Module(module.to_string())),
        None => Ok(()),
    }
}

/// `os.path as p` -> `os`; relative imports have no top-level module.
fn top_level_module(item: &str) -> Option<&str> {
    let dotted = item.split_whitespace().next()?;
    let top = dotted.split('.').next()?;
    if top.is_empty() {
        None
    } else {
        Some(top)
    }
}

/// Python ends a line at `\n`, `\r\n` or a lone `\r`; fold all three to
/// `\n`, then splice backslash continuations.
fn logical_lines(source: &str) -> String {
    source
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace("\\\n", " ")
}
