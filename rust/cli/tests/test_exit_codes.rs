use serial_test::serial;
use tempfile::tempdir;
use truco_cli::run;

fn run_capture(args: &[&str]) -> (i32, String, String) {
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(args, &mut out, &mut err);
    (
        code,
        String::from_utf8_lossy(&out).into_owned(),
        String::from_utf8_lossy(&err).into_owned(),
    )
}

#[test]
fn help_is_success() {
    let (code, out, _) = run_capture(&["truco", "--help"]);
    assert_eq!(code, 0);
    assert!(out.contains("sim"));
}

#[test]
fn unknown_command_lists_commands() {
    let (code, _, err) = run_capture(&["truco", "shuffle"]);
    assert_eq!(code, 2);
    assert!(err.contains("Commands:"));
    for c in ["sim", "deal", "verify", "cfg"] {
        assert!(err.contains(&format!("  {}", c)));
    }
}

#[test]
fn verify_without_input_fails() {
    let (code, _, err) = run_capture(&["truco", "verify"]);
    assert_eq!(code, 2);
    assert!(err.contains("input required"));
}

#[test]
fn unknown_bot_fails() {
    let (code, _, err) = run_capture(&["truco", "sim", "--seed", "1", "--bot", "oracle"]);
    assert_eq!(code, 2);
    assert!(err.contains("unknown bot"), "{}", err);
}

#[test]
#[serial]
fn interrupted_sim_exits_130() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hands.jsonl");
    unsafe {
        std::env::set_var("TRUCO_SIM_BREAK_AFTER", "1");
    }
    let (code, _, _) = run_capture(&[
        "truco",
        "sim",
        "--matches",
        "3",
        "--seed",
        "4",
        "--output",
        &path.to_string_lossy(),
    ]);
    unsafe {
        std::env::remove_var("TRUCO_SIM_BREAK_AFTER");
    }
    assert_eq!(code, 130);
    // The finished match is still on disk.
    assert!(!std::fs::read_to_string(&path).unwrap().is_empty());
}
