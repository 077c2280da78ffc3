use serial_test::serial;
use std::fs;
use tempfile::tempdir;
use truco_cli::run;

const VARS: &[&str] = &[
    "TRUCO_CONFIG",
    "TRUCO_SEED",
    "TRUCO_MATCH_POINT",
    "TRUCO_FLOR",
    "TRUCO_FALTA",
    "TRUCO_SIM_BREAK_AFTER",
];

fn clear_env() {
    for v in VARS {
        unsafe {
            std::env::remove_var(v);
        }
    }
}

fn cfg_json() -> (i32, serde_json::Value, String) {
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(["truco", "cfg"], &mut out, &mut err);
    let json = serde_json::from_slice(&out).unwrap_or(serde_json::Value::Null);
    (code, json, String::from_utf8_lossy(&err).into_owned())
}

#[test]
#[serial]
fn cfg_reports_defaults() {
    clear_env();
    let (code, json, _) = cfg_json();
    assert_eq!(code, 0);
    assert_eq!(json["match_point"]["value"], 15);
    assert_eq!(json["match_point"]["source"], "default");
    assert_eq!(json["flor"]["value"], true);
    assert_eq!(json["seed"]["value"], serde_json::Value::Null);
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("truco.toml");
    fs::write(&path, "seed = 7\nmatch_point = 30\nflor = false\n").unwrap();
    unsafe {
        std::env::set_var("TRUCO_CONFIG", &path);
        std::env::set_var("TRUCO_MATCH_POINT", "9");
        std::env::set_var("TRUCO_FALTA", "single");
    }

    let (code, json, err) = cfg_json();
    clear_env();
    assert_eq!(code, 0, "{}", err);
    assert_eq!(json["seed"]["value"], 7);
    assert_eq!(json["seed"]["source"], "file");
    assert_eq!(json["match_point"]["value"], 9);
    assert_eq!(json["match_point"]["source"], "env");
    assert_eq!(json["flor"]["value"], false);
    assert_eq!(json["flor"]["source"], "file");
    assert_eq!(json["falta_envido"]["source"], "env");
}

#[test]
#[serial]
fn invalid_env_value_exits_with_error() {
    clear_env();
    unsafe {
        std::env::set_var("TRUCO_MATCH_POINT", "abc");
    }
    let (code, _, err) = cfg_json();
    clear_env();
    assert_eq!(code, 2);
    assert!(err.contains("Invalid configuration"), "{}", err);
}

#[test]
#[serial]
fn out_of_range_match_point_rejects_sim() {
    clear_env();
    unsafe {
        std::env::set_var("TRUCO_MATCH_POINT", "31");
    }
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(["truco", "sim", "--seed", "1"], &mut out, &mut err);
    clear_env();
    assert_eq!(code, 2);
    assert!(String::from_utf8_lossy(&err).starts_with("Error: "));
}

#[test]
#[serial]
fn configured_seed_drives_deal() {
    clear_env();
    unsafe {
        std::env::set_var("TRUCO_SEED", "77");
    }
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(["truco", "deal"], &mut out, &mut err);
    clear_env();
    assert_eq!(code, 0);
    assert!(String::from_utf8_lossy(&out).starts_with("Seed: 77\n"));
}
