use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_entangled-pool"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute entangled-pool")
}

#[test]
fn test_cli_constant_entangled() {
    let output = run_cli(&["run", "--entangled", "--workers", "32", "--value", "21"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        panic!(
            "Command failed with status: {:?}\nstderr: {}\nstdout: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr),
            stdout
        );
    }

    assert!(
        stdout.contains("Workers: 32 (entangled: true"),
        "Should show pool settings"
    );
    assert_eq!(
        stdout.lines().filter(|l| l.trim_end().ends_with(")") && l.contains("-> 21")).count(),
        32,
        "Should print one line per worker"
    );
    assert!(stdout.contains("Shared best: 21"), "Should show shared best");
    assert!(stdout.contains("Run completed successfully."));
}

#[test]
fn test_cli_random_search_detached() {
    let output = run_cli(&[
        "run",
        "--task",
        "random-search",
        "--workers",
        "3",
        "--iterations",
        "500",
        "--seed",
        "42",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("Workers: 3 (entangled: false"));
    assert!(!stdout.contains("Shared best"));
    assert!(stdout.contains("Best result:"));
    assert!(stdout.contains("Total task time:"));
}

#[test]
fn test_cli_failing_task_exits_with_error() {
    let output = run_cli(&["run", "--task", "fail", "--message", "bad objective"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("bad objective"),
        "Should report the task error, got: {}",
        stderr
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Run completed successfully."));
}

#[test]
fn test_cli_requires_subcommand() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}
