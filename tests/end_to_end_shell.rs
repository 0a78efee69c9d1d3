// tests/end_to_end_shell.rs
//
// End-to-end coverage with real shell processes. Unix only: the commands
// under test rely on `sh`, `printf`, `printenv` and `sleep`.

#![cfg(unix)]

use std::error::Error;
use std::time::Instant;

use tokio::sync::mpsc;

use outwatch::engine::{DispatchEvent, Dispatcher, DispatcherOptions};
use outwatch::exec::RealSpawner;
use outwatch::pattern::MatchExpr;
use outwatch::quote::escape_single_quotes;
use outwatch_test_utils::capture::CapturingRelay;
use outwatch_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const SHELL: &str = "/bin/sh";

/// Spawn the primary and run the full dispatcher loop against real
/// processes, returning the exit code and the capturing relay.
async fn run_session(
    command: &str,
    matchexpr: &str,
    execute: &str,
    options: DispatcherOptions,
) -> Result<(i32, CapturingRelay), Box<dyn Error>> {
    let matcher = MatchExpr::parse(matchexpr)?;
    let (events_tx, events_rx) = mpsc::channel::<DispatchEvent>(64);

    let mut spawner = RealSpawner::new(SHELL.to_string(), events_tx);
    spawner.spawn_primary(command)?;

    let relay = CapturingRelay::new();
    let dispatcher = Dispatcher::new(
        matcher,
        execute.to_string(),
        options,
        relay.clone(),
        spawner,
        events_rx,
    );

    let code = with_timeout(dispatcher.run()).await?;
    Ok((code, relay))
}

#[tokio::test]
async fn primary_lines_then_secondary_output() -> TestResult {
    init_tracing();

    let (code, relay) = run_session(
        r"printf 'miss\nmiss\nhit\n'",
        "/hit/",
        "printenv OUTWATCH_LINE",
        DispatcherOptions::default(),
    )
    .await?;

    assert_eq!(code, 0);
    assert_eq!(relay.stdout_lines(), vec!["miss", "miss", "hit", "hit"]);

    Ok(())
}

#[tokio::test]
async fn nonzero_primary_exit_code_wins() -> TestResult {
    init_tracing();

    let (code, _relay) = run_session(
        r"printf 'hit\n'; exit 7",
        "/hit/",
        "true",
        DispatcherOptions::default(),
    )
    .await?;

    assert_eq!(code, 7);

    Ok(())
}

#[tokio::test]
async fn secondary_output_appears_after_primary_has_closed() -> TestResult {
    init_tracing();

    // The primary exits immediately; the execute command finishes later.
    // Its output must still make it into the combined stream.
    let (code, relay) = run_session(
        r"printf 'hit\n'",
        "/hit/",
        "sleep 0.2; printenv OUTWATCH_LINE",
        DispatcherOptions::default(),
    )
    .await?;

    assert_eq!(code, 0);
    assert_eq!(relay.stdout_lines(), vec!["hit", "hit"]);

    Ok(())
}

#[tokio::test]
async fn exit_on_match_terminates_a_long_running_primary() -> TestResult {
    init_tracing();

    let started = Instant::now();
    let options = DispatcherOptions {
        exit_on_match: true,
        ..Default::default()
    };
    let (code, relay) = run_session(
        r"printf 'hit\n'; sleep 4; printf 'late\n'",
        "/hit/",
        "true",
        options,
    )
    .await?;

    // The session ends as soon as the triggered execute finishes; the
    // primary is killed rather than allowed to keep producing.
    assert_eq!(code, 0);
    assert_eq!(relay.stdout_lines(), vec!["hit"]);
    assert!(started.elapsed().as_secs() < 4, "primary was not terminated early");

    Ok(())
}

#[tokio::test]
async fn primary_stderr_is_relayed_to_stderr() -> TestResult {
    init_tracing();

    let (code, relay) = run_session(
        r"printf 'oops hit\n' 1>&2",
        "/hit/",
        "true",
        DispatcherOptions::default(),
    )
    .await?;

    assert_eq!(code, 0);
    assert!(relay.stdout_lines().is_empty());
    assert_eq!(relay.stderr_lines(), vec!["oops hit"]);

    Ok(())
}

#[tokio::test]
async fn matched_line_reaches_the_execute_command_byte_for_byte() -> TestResult {
    init_tracing();

    let nasty = r#"it's a "quoted" hit $HOME `date` ; & | *"#;
    let command = format!(r"printf '%s\n' '{}'", escape_single_quotes(nasty));

    let (code, relay) = run_session(
        &command,
        "/quoted/",
        "printenv OUTWATCH_LINE",
        DispatcherOptions::default(),
    )
    .await?;

    assert_eq!(code, 0);
    assert_eq!(relay.stdout_lines(), vec![nasty, nasty]);

    Ok(())
}
