use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn ringsim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ringsim"))
}

#[test]
fn test_single_philosopher_fails() {
    let output = ringsim()
        .args(["1", "100", "100"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("has to be >= 2"), "stderr: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_non_integer_argument_fails() {
    let output = ringsim()
        .args(["five", "100", "100"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_timed_run_reports_every_philosopher() {
    let output = ringsim()
        .args(["3", "20", "20", "--run-for", "100", "--quiet", "--seed", "4"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Stopping application..."));
    for id in 0..3 {
        assert!(
            stdout.contains(&format!("philosopher {} waited", id)),
            "missing report for {}: {}",
            id,
            stdout
        );
    }
    assert!(!stdout.contains("finished thinking"));
}

#[test]
fn test_closed_stdin_stops_the_run() {
    let output = ringsim()
        .args(["2", "15", "15"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    // A closed stdin reads as an empty line and stops immediately
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Enter any key to stop"));
    assert!(stdout.contains("philosopher 0 waited"));
    assert!(stdout.contains("philosopher 1 waited"));
}

#[test]
fn test_stdin_line_stops_the_run() {
    let mut child = ringsim()
        .args(["3", "20", "20"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(100));
    {
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(b"\n").unwrap();
    }
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("finished thinking"), "stdout: {}", stdout);
    assert!(stdout.contains("Stopping application..."));
    for id in 0..3 {
        assert!(stdout.contains(&format!("philosopher {} waited", id)), "stdout: {}", stdout);
    }
}

#[test]
fn test_closed_stdout_is_not_an_error() {
    let mut child = ringsim()
        .args(["5", "20", "20"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // Reader goes away while the philosophers keep printing
    drop(child.stdout.take());
    thread::sleep(Duration::from_millis(200));
    {
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(b"\n").unwrap();
    }
    let output = child.wait_with_output().unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "status: {:?}, stderr: {}", output.status, stderr);
    assert!(!stderr.contains("panicked"), "stderr: {}", stderr);
}

#[test]
fn test_cycle_limit_finishes_without_input() {
    let mut child = ringsim()
        .args(["3", "12", "12", "--cycles", "3", "--quiet"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    // stdin stays open; the run must end once every philosopher is done
    let _stdin = child.stdin.take();
    let deadline = Instant::now() + Duration::from_secs(30);
    while child.try_wait().unwrap().is_none() {
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("run with a cycle limit kept waiting for input");
        }
        thread::sleep(Duration::from_millis(20));
    }

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in 0..3 {
        assert!(stdout.contains(&format!("philosopher {} waited", id)));
        assert!(stdout.contains("(3 cycles)"));
    }
    assert!(!stdout.contains("Enter any key"));
}
