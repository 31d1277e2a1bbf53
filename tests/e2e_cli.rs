
use assert_cmd::prelude::*;
use cli_helpers::{base_cmd, three_month_revenue, write_workbook};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn report_sample_no_color_when_piped() {
    let home = TempDir::new().expect("failed to create temp home");

    let mut cmd = base_cmd(&home);
    cmd.arg("report").arg("--no-color");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("jan/2024"))
        .stdout(predicate::str::contains("Totais"))
        .stdout(predicate::str::contains("R$ -155.716,33"))
        .stdout(predicate::str::contains("Compra de Ativo"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn report_workbook_with_parentheses() {
    let home = TempDir::new().expect("failed to create temp home");
    let path = write_workbook(home.path(), "dados.xlsx", &three_month_revenue(), &[])
        .expect("failed to write workbook");

    let mut cmd = base_cmd(&home);
    cmd.arg("--no-color")
        .arg("report")
        .arg(&path)
        .arg("--negative")
        .arg("parens");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("R$ (36.810,90)"))
        .stdout(predicate::str::contains("R$ 52.082,51"))
        .stdout(predicate::str::contains("Negativo"))
        .stdout(predicate::str::contains("Positivo"));
}

#[test]
fn report_json_is_parseable() {
    let home = TempDir::new().expect("failed to create temp home");

    let output = base_cmd(&home)
        .args(["report", "--json", "--supplementary", "prorate"])
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(value["months"].as_array().map(|m| m.len()), Some(9));
    assert_eq!(value["supplementary_policy"], "prorate");
    assert_eq!(value["totals"]["supplementary_share"], "40000.00");
}

#[test]
fn report_reads_config_file() {
    let home = TempDir::new().expect("failed to create temp home");
    let config = home.path().join("faturamento.toml");
    fs::write(&config, "negative_style = \"parens\"\nasset_purchases = \"0\"\nsupplies = \"0\"\n")
        .expect("failed to write config");

    let mut cmd = base_cmd(&home);
    cmd.args(["--no-color", "--config"]).arg(&config).arg("report");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("R$ (155.716,33)"))
        .stdout(predicate::str::contains("Compra de Ativo").not());
}

#[test]
fn report_bad_config_key_fails() {
    let home = TempDir::new().expect("failed to create temp home");
    let config = home.path().join("faturamento.toml");
    fs::write(&config, "cores = true\n").expect("failed to write config");

    let mut cmd = base_cmd(&home);
    cmd.arg("--config").arg(&config).arg("report");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}

#[test]
fn report_missing_file_fails() {
    let home = TempDir::new().expect("failed to create temp home");

    let mut cmd = base_cmd(&home);
    cmd.arg("report").arg(home.path().join("nao_existe.xlsx"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open workbook"));
}

#[test]
fn classify_shows_buckets() {
    let home = TempDir::new().expect("failed to create temp home");

    let mut cmd = base_cmd(&home);
    cmd.args(["--no-color", "classify", "Guia FGTS e DAS", "ISS Retido NF 12"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("FGTS"))
        .stdout(predicate::str::contains("ISSQN"));
}

#[test]
fn period_rejects_malformed_value() {
    let home = TempDir::new().expect("failed to create temp home");

    let mut cmd = base_cmd(&home);
    cmd.args(["period", "01/2024", "2024-13"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("malformed period"));
}

#[test]
fn period_json_normalizes() {
    let home = TempDir::new().expect("failed to create temp home");

    let output = base_cmd(&home)
        .args(["--json", "period", "Janeiro de 2024", "2024-02-15"])
        .output()
        .expect("failed to run binary");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(value[0]["period"], "2024-01");
    assert_eq!(value[1]["label"], "fev/2024");
}
