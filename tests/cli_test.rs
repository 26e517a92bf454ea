use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

fn btcqr() -> Command {
    let mut cmd = Command::new(cargo_bin!("btcqr"));
    cmd.env_remove("BTCQR_ADDRESS")
        .env_remove("BTCQR_TICK_MS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_uri_default_address() {
    btcqr()
        .args(["uri", "--amount", "0.001"])
        .assert()
        .success()
        .stdout("bitcoin:bc1qmrnkpa98xajxezxp2clqehavxxr55h8kfq9cjd?amount=0.001\n");
}

#[test]
fn test_cli_uri_address_from_env() {
    btcqr()
        .env("BTCQR_ADDRESS", "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
        .args(["uri", "--amount", "2.50000000"])
        .assert()
        .success()
        .stdout("bitcoin:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa?amount=2.5\n");
}

#[test]
fn test_cli_rejects_negative_amount() {
    btcqr()
        .args(["uri", "--amount", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount"));
}

#[test]
fn test_cli_generate_png_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("qr.png");

    btcqr()
        .args(["generate", "--amount", "0.001", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let image = image::open(&path)?;
    assert_eq!(image.width(), 300);
    assert_eq!(image.height(), 300);
    Ok(())
}

#[test]
fn test_cli_generate_svg_stdout() {
    btcqr()
        .args(["generate", "--amount", "0.001", "--format", "svg", "--dark", "#112233"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<svg"))
        .stdout(predicate::str::contains(r##"fill="#112233""##));
}

#[test]
fn test_cli_generate_data_uri() {
    btcqr()
        .args(["generate", "--amount", "0.5", "--data-uri"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("data:image/png;base64,iVBORw0KGgo"));
}

#[test]
fn test_cli_options_file_and_flag_precedence() -> Result<(), Box<dyn std::error::Error>> {
    let mut options = tempfile::NamedTempFile::new()?;
    writeln!(options, r#"{{"width": 200, "margin": 4, "format": "svg"}}"#)?;

    let output = btcqr()
        .args(["generate", "--amount", "1", "--width", "120", "--options"])
        .arg(options.path())
        .output()?;
    assert!(output.status.success());

    let svg = String::from_utf8(output.stdout)?;
    assert!(svg.contains(r#"width="120""#));
    Ok(())
}

#[test]
fn test_cli_bad_options_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut options = tempfile::NamedTempFile::new()?;
    writeln!(options, r#"{{"scale": 2}}"#)?;

    btcqr()
        .args(["generate", "--amount", "1", "--options"])
        .arg(options.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Serialization error"));
    Ok(())
}

#[test]
fn test_cli_generate_capacity_exceeded() {
    let address = "x".repeat(4000);
    btcqr()
        .args(["generate", "--amount", "1", "--address", &address])
        .assert()
        .failure()
        .stderr(predicate::str::contains("QR encoding failed"));
}

#[test]
fn test_cli_convert() {
    btcqr()
        .args(["convert", "--btc", "0.001"])
        .assert()
        .success()
        .stdout("62.00\n");

    btcqr()
        .args(["convert", "--usd", "100"])
        .assert()
        .success()
        .stdout("0.0016129\n");

    btcqr()
        .args(["convert", "--btc", "1", "--usd", "1"])
        .assert()
        .failure();
}

#[test]
fn test_cli_simulate_until_confirmed() {
    let output = btcqr()
        .args(["simulate", "--tick-ms", "10"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(
        lines[0],
        r#"{"event":"status_changed","status":"processing","confirmations":1}"#
    );
    assert_eq!(
        lines[5],
        r#"{"event":"status_changed","status":"confirmed","confirmations":6}"#
    );
    assert_eq!(lines[6], r#"{"event":"payment_confirmed","confirmations":6}"#);
}

#[test]
fn test_cli_simulate_failure() {
    btcqr()
        .args(["simulate", "--tick-ms", "200", "--fail-after", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status":"failed","confirmations":2"#))
        .stdout(predicate::str::contains("payment_confirmed").not());
}

#[test]
fn test_cli_simulate_rejects_zero_tick() {
    btcqr()
        .args(["simulate", "--tick-ms", "0"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());

    btcqr()
        .env("BTCQR_TICK_MS", "0")
        .arg("simulate")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_cli_simulate_fail_after_range() {
    for value in ["0", "6", "10"] {
        btcqr()
            .args(["simulate", "--tick-ms", "10", "--fail-after", value])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--fail-after"));
    }

    btcqr()
        .args(["simulate", "--tick-ms", "200", "--fail-after", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status":"failed","confirmations":5"#));
}

#[test]
fn test_cli_generate_rejects_oversized_image() {
    btcqr()
        .args(["generate", "--amount", "1", "--width", "4000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid render option"))
        .stderr(predicate::str::contains("panicked").not());

    btcqr()
        .args(["generate", "--amount", "1", "--margin", "100000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid render option"));
}
