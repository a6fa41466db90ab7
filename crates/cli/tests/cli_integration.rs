use std::process::{Command, Output};

fn demo() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_argbind-demo"));
    // keep the caller's environment from leaking into env fallbacks
    cmd.env_remove("ARGBIND_DEMO_CONFIG")
        .env_remove("ARGBIND_DEMO_QUIET")
        .env_remove("RUST_LOG")
        .current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

fn run(args: &[&str]) -> Output {
    demo()
        .args(args)
        .output()
        .expect("failed to run argbind-demo")
}

fn json(out: &Output) -> serde_json::Value {
    assert!(
        out.status.success(),
        "argbind-demo failed:\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
    serde_json::from_slice(&out.stdout).expect("report is not JSON")
}

#[test]
fn help_works() {
    let out = run(&["--help"]);
    assert!(out.status.success(), "status: {}", out.status);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("argbind-demo") && stdout.contains("add") && stdout.contains("rm"),
        "unexpected help output:\n{stdout}"
    );
    assert!(stdout.contains("[default: 30s]"), "unexpected help output:\n{stdout}");
}

#[test]
fn version_works() {
    let out = run(&["-v"]);
    assert!(out.status.success(), "status: {}", out.status);
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        concat!("v", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn defaults_without_arguments() {
    let report = json(&run(&[]));
    assert_eq!(report["command"], "none");
    assert_eq!(report["level"], 1);
    assert_eq!(report["timeout"], "30s");
    assert!(report.get("add").is_none());
}

#[test]
fn add_binds_options_and_positionals() {
    let report = json(&run(&[
        "-d", "-H", "a", "b", "--timeout", "1m", "add", "-p", "HIGH", "-T", "x", "milk", "eggs",
    ]));
    assert_eq!(report["command"], "add");
    assert_eq!(report["debug"], true);
    assert_eq!(report["headers"], serde_json::json!(["a", "b"]));
    assert_eq!(report["timeout"], "1m");
    assert_eq!(report["add"]["priority"], "high");
    assert_eq!(report["add"]["tags"], serde_json::json!(["x"]));
    assert_eq!(report["add"]["items"], serde_json::json!(["milk", "eggs"]));
}

#[test]
fn env_fills_and_overrides_config() {
    let out = demo()
        .env("ARGBIND_DEMO_CONFIG", "/etc/demo.toml")
        .output()
        .expect("failed to run argbind-demo");
    assert_eq!(json(&out)["config"], "/etc/demo.toml");

    let out = demo()
        .env("ARGBIND_DEMO_CONFIG", "/etc/demo.toml")
        .args(["--config", "local.toml"])
        .output()
        .expect("failed to run argbind-demo");
    assert_eq!(json(&out)["config"], "/etc/demo.toml");

    let out = run(&["--config", "local.toml"]);
    assert_eq!(json(&out)["config"], "local.toml");
}

#[test]
fn quiet_env_suppresses_report() {
    let out = demo()
        .env("ARGBIND_DEMO_QUIET", "1")
        .output()
        .expect("failed to run argbind-demo");
    assert!(out.status.success(), "status: {}", out.status);
    assert!(out.stdout.is_empty());
}

#[test]
fn once_violation_exits_with_hint() {
    let out = run(&["--level", "1", "--level", "2"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("more than once"), "unexpected output:\n{stdout}");
    assert!(stdout.contains("For more information try --help"));
}

#[test]
fn subcommand_validation_fails() {
    let out = run(&["add"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("add needs at least one item"), "unexpected output:\n{stdout}");
}

#[test]
fn remove_by_id_in_text_format() {
    let out = run(&["-f", "text", "rm", "--force", "42"]);
    assert!(out.status.success(), "status: {}", out.status);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("command: rm"), "unexpected output:\n{stdout}");
    assert!(stdout.contains("remove: 42 (force: true)"), "unexpected output:\n{stdout}");
}

#[test]
fn unknown_option_suggests() {
    let out = run(&["--timout", "5s"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Did you mean '--timeout'?"), "unexpected output:\n{stdout}");
}
