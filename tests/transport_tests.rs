#![cfg(unix)]

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Result;
use indesign_mcp::{
    classify::{self, ExecutionOutcome},
    script::ScriptPayload,
    transport::CommandHost,
    Bridge, Transport, TransportError,
};

/// A stand-in engine: `/bin/sh -c <body> <script_path>`, so `$0` is the scratch file.
fn sh(body: &str, dir: &Path) -> Transport {
    let host = CommandHost::new(
        "/bin/sh",
        vec!["-c".into(), body.into(), "{{script_path}}".into()],
    );
    Transport::new(Arc::new(host), dir)
}

fn payload() -> ScriptPayload {
    ScriptPayload::from_source("\"hello\";\n")
}

fn is_empty(dir: &Path) -> Result<bool> {
    Ok(std::fs::read_dir(dir)?.next().is_none())
}

#[tokio::test]
async fn test_success_returns_stdout_and_cleans_up() -> Result<()> {
    let dir = tempfile::tempdir()?;
    // the file exists while the host runs and carries the guard
    let transport = sh(
        "grep -q 'catch (e)' \"$0\" && grep -q hello \"$0\" && echo 'Created 2 page(s)'",
        dir.path(),
    );
    let raw = transport.execute(&payload(), Duration::from_secs(10)).await?;
    assert_eq!(raw.trim(), "Created 2 page(s)");
    assert_eq!(
        classify::classify_text(&raw),
        ExecutionOutcome::Success("Created 2 page(s)".into())
    );
    assert!(is_empty(dir.path())?);
    Ok(())
}

#[tokio::test]
async fn test_scratch_file_is_a_jsx_with_prefix() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let transport = sh("basename \"$0\"", dir.path());
    let name = transport.execute(&payload(), Duration::from_secs(10)).await?;
    let name = name.trim();
    assert!(name.starts_with("indesign-mcp-"), "{}", name);
    assert!(name.ends_with(".jsx"), "{}", name);
    Ok(())
}

#[tokio::test]
async fn test_engine_error_is_classified() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let bridge = Bridge::new(sh("echo 'ERROR: Object is invalid (Line: 12)'", dir.path()));
    let outcome = bridge.run(payload(), Duration::from_secs(10)).await;
    assert_eq!(
        outcome,
        ExecutionOutcome::EngineError {
            message: "Object is invalid".into(),
            line: Some(12),
        }
    );
    assert!(is_empty(dir.path())?);
    Ok(())
}

#[tokio::test]
async fn test_non_zero_exit_is_a_transport_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let transport = sh("echo 'execution error: InDesign got an error' >&2; exit 1", dir.path());
    let err = transport
        .execute(&payload(), Duration::from_secs(10))
        .await
        .expect_err("exit 1 must fail");
    match &err {
        TransportError::Exit { status, diagnostic, .. } => {
            assert_eq!(status, "code 1");
            assert!(diagnostic.contains("InDesign got an error"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(is_empty(dir.path())?);

    let outcome = classify::classify(Err(err));
    assert!(matches!(outcome, ExecutionOutcome::TransportError(d) if d.contains("InDesign got an error")));
    Ok(())
}

#[tokio::test]
async fn test_timeout_kills_host_and_cleans_up() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let transport = sh("sleep 5; echo late", dir.path());
    let started = std::time::Instant::now();
    let err = transport
        .execute(&payload(), Duration::from_millis(200))
        .await
        .expect_err("must time out");
    assert!(matches!(err, TransportError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(is_empty(dir.path())?);
    Ok(())
}

#[tokio::test]
async fn test_spawn_failure_cleans_up() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let host = CommandHost::new("/nonexistent/indesign-host", vec![]);
    let transport = Transport::new(Arc::new(host), dir.path());
    let err = transport
        .execute(&payload(), Duration::from_secs(1))
        .await
        .expect_err("missing program must fail");
    assert!(matches!(err, TransportError::Spawn { .. }));
    assert!(is_empty(dir.path())?);
    Ok(())
}

#[tokio::test]
async fn test_scratch_dir_is_created_on_demand() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let nested = dir.path().join("a").join("b");
    let transport = sh("echo ok", &nested);
    assert_eq!(transport.execute(&payload(), Duration::from_secs(10)).await?.trim(), "ok");
    assert!(is_empty(&nested)?);
    Ok(())
}
