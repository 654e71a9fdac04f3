use super::super::fixtures::{code_samples::*, failures::*, hostile::*, runaway::*};
use super::*;
use crate::languages::skip_if_not_available;

#[tokio::test]
async fn test_javascript_basic() -> Result<()> {
    if skip_if_not_available(&["node"]) {
        return Ok(());
    }
    test_language_execution("javascript", JS_HELLO).await
}

#[tokio::test]
async fn test_javascript_input() -> Result<()> {
    if skip_if_not_available(&["node"]) {
        return Ok(());
    }
    let result = run_with(
        |c| c,
        ExecutionRequest::new("javascript", JS_WITH_INPUT).with_input("shout\n"),
    )
    .await?;
    assert_eq!(result.stdout, "SHOUT\n");
    Ok(())
}

#[tokio::test]
async fn test_javascript_empty_source() -> Result<()> {
    if skip_if_not_available(&["node"]) {
        return Ok(());
    }
    let result = run("javascript", "").await?;
    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.stdout, "");
    assert_eq!(result.stderr, None);
    assert_eq!(result.exit_code, Some(0));
    Ok(())
}

#[tokio::test]
async fn test_javascript_nonzero_exit() -> Result<()> {
    if skip_if_not_available(&["node"]) {
        return Ok(());
    }
    let result = run("javascript", JS_EXIT_2).await?;
    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.exit_code, Some(2));
    assert_eq!(result.stderr.as_deref(), Some("bad input\n"));
    Ok(())
}

#[tokio::test]
async fn test_javascript_timeout() -> Result<()> {
    if skip_if_not_available(&["node"]) {
        return Ok(());
    }
    test_language_timeout("javascript", JS_BUSY_LOOP).await?;
    test_language_timeout("javascript", JS_WITH_TIMEOUT).await
}

#[tokio::test]
async fn test_javascript_denylist() -> Result<()> {
    test_language_rejected("javascript", JS_FS, "module 'fs' not allowed").await?;
    test_language_rejected("js", JS_CHILD_PROCESS, "module 'child_process' not allowed").await
}
