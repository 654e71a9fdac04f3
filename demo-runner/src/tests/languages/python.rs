use super::super::fixtures::{code_samples::*, failures::*, hostile::*, runaway::*};
use super::*;
use crate::languages::skip_if_not_available;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_python_basic() -> Result<()> {
    if skip_if_not_available(&["python3"]) {
        return Ok(());
    }
    test_language_execution("python", PYTHON_HELLO).await
}

#[tokio::test]
async fn test_python_print_hi() -> Result<()> {
    if skip_if_not_available(&["python3"]) {
        return Ok(());
    }
    let result = run("python", "print('hi')").await?;
    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.stdout, "hi\n");
    assert_eq!(result.exit_code, Some(0));
    Ok(())
}

#[tokio::test]
async fn test_python_multiline() -> Result<()> {
    if skip_if_not_available(&["python3"]) {
        return Ok(());
    }
    let result = run("python", PYTHON_MULTILINE).await?;
    assert_eq!(result.stdout, "Factorial of 5 is 120\n");
    Ok(())
}

#[tokio::test]
async fn test_python_input() -> Result<()> {
    if skip_if_not_available(&["python3"]) {
        return Ok(());
    }
    let result = run_with(
        |c| c,
        ExecutionRequest::new("python", PYTHON_WITH_INPUT).with_input("test user\n"),
    )
    .await?;
    assert_eq!(result.stdout, "Hello, test user!\n");
    assert_eq!(result.stderr, None);
    Ok(())
}

#[tokio::test]
async fn test_python_empty_source() -> Result<()> {
    if skip_if_not_available(&["python3"]) {
        return Ok(());
    }
    let result = run("python", "").await?;
    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.stdout, "");
    assert_eq!(result.exit_code, Some(0));
    Ok(())
}

#[tokio::test]
async fn test_python_nonzero_exit() -> Result<()> {
    if skip_if_not_available(&["python3"]) {
        return Ok(());
    }
    let result = run("python", PYTHON_EXIT_3).await?;
    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.stdout, "partial\n");
    assert_eq!(result.exit_code, Some(3));
    Ok(())
}

#[tokio::test]
async fn test_python_traceback_in_stderr() -> Result<()> {
    if skip_if_not_available(&["python3"]) {
        return Ok(());
    }
    let result = run("python", PYTHON_DIVIDE_BY_ZERO).await?;
    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.exit_code, Some(1));
    let stderr = result.stderr.expect("traceback on stderr");
    assert!(stderr.contains("ZeroDivisionError"));
    Ok(())
}

#[tokio::test]
async fn test_python_timeout() -> Result<()> {
    if skip_if_not_available(&["python3"]) {
        return Ok(());
    }
    test_language_timeout("python", PYTHON_BUSY_LOOP).await?;
    test_language_timeout("python", PYTHON_SLEEP).await
}

#[tokio::test]
async fn test_python_denylist() -> Result<()> {
    // Rejection happens before the interpreter is looked up
    test_language_rejected("python", PYTHON_OS, "import 'os' not allowed").await?;
    test_language_rejected("python", PYTHON_ALIASED, "import 'subprocess' not allowed").await?;
    test_language_rejected("python", PYTHON_EVAL, "function 'eval' not allowed").await?;
    test_language_rejected("python", PYTHON_OS_AFTER_CR, "import 'os' not allowed").await?;
    test_language_rejected("python", PYTHON_POSIX, "import 'posix' not allowed").await
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_python_timeout_kills_interpreter() -> Result<()> {
    use super::super::utils::process::{wait_for_pid_in, wait_until_gone};
    use std::time::Duration;

    if skip_if_not_available(&["python3"]) {
        return Ok(());
    }
    let dir = TempDir::new().unwrap();
    let work_dir = dir.path().canonicalize()?;
    let service =
        crate::CodeExecutionService::new(test_config(&work_dir).with_timeout(short_timeout()))
            .await?;

    let run = tokio::spawn(async move {
        service
            .execute(ExecutionRequest::new("python", PYTHON_BUSY_LOOP))
            .await
    });

    // The interpreter is the only process whose cwd is this work dir
    let pid = wait_for_pid_in(&work_dir, Duration::from_secs(2))
        .await
        .expect("interpreter never started");

    let result = run.await.unwrap();
    assert_eq!(result.outcome, Outcome::TimedOut);
    assert!(
        wait_until_gone(pid, Duration::from_secs(2)).await,
        "interpreter {} survived the timeout",
        pid
    );
    Ok(())
}

#[tokio::test]
async fn test_python_requirements() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    use crate::languages::{LanguageExecutor, PythonExecutor};
    assert_ok!(PythonExecutor.resolve_command());
}
