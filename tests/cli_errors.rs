#![cfg(feature = "cli")]

use predicates::prelude::*;

#[test]
fn cli_min_gas_for_one_hundred_feet() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.arg("min_gas").arg("100");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("41 cf"));
}

#[test]
fn cli_mod_for_ean32() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.arg("mod").arg("0.32");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("111 ft"));
}

#[test]
fn cli_fails_for_unknown_tank() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.arg("tank").arg("INVALID");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Tank 'INVALID' not found"));
}

#[test]
fn cli_rejects_negative_depth() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.arg("pressure").arg("-5");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Depth must not be negative"));
}

#[test]
fn cli_plan_as_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.arg("--json").arg("plan").arg("100");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"turn_pressure\""))
        .stdout(predicate::str::contains("\"minimum_gas\": 41.0"));
}

#[test]
fn cli_rock_bottom_with_explicit_stages() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args([
        "rock-bottom",
        "2xAL80",
        "--stage",
        "100:2",
        "--stage",
        "50:5",
        "--json",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"reserve_pressure\""));
}

#[test]
fn cli_reports_insufficient_gas() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["rock-bottom", "AL40", "100", "--start", "500"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Insufficient gas"));
}

#[test]
fn cli_reads_metric_assumptions_from_stdin() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    let doc = serde_json::json!({
        "units": "metric",
        "water": "salt",
        "sac_rate": 40.0
    })
    .to_string();

    cmd.arg("--assumptions")
        .arg("-")
        .arg("min-gas")
        .arg("30")
        .write_stdin(doc);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1100 L"));
}

#[test]
fn cli_reports_invalid_json_for_assumptions_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.arg("--assumptions-json")
        .arg("{not valid json}")
        .arg("min-gas")
        .arg("100");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON for --assumptions-json"));
}

#[test]
fn cli_reports_invalid_json_in_file() {
    use std::fs::File;
    use std::io::Write as _;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let file_path = dir.path().join("bad.json");
    let mut f = File::create(&file_path).unwrap();
    writeln!(f, "this is not json").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.arg("--assumptions").arg(file_path).arg("tanks");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON in assumptions document"));
}

#[test]
fn cli_rejects_negative_assumption_times() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.arg("--assumptions-json")
        .arg(r#"{"problem_solving_min": -5}"#)
        .arg("min-gas")
        .arg("10");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Problem-solving time must not be negative",
        ));
}

#[test]
fn cli_reports_negative_positionals_as_domain_errors() {
    let cases: [&[&str]; 4] = [
        &["gas-used", "20", "-5", "5"],
        &["min-gas", "-10"],
        &["end", "-30", "0.4"],
        &["plan", "-100"],
    ];
    for args in cases {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
        cmd.args(args);
        cmd.assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Depth must not be negative"));
    }

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["sac", "-400", "4", "5"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(
            "Volume consumed must not be negative",
        ));
}

#[test]
fn cli_end_names_the_helium_fraction() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["end", "100", "1.5"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("He fraction"));
}

#[test]
fn cli_end_and_ead() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["end", "100", "0.4"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("END for 40% He (salt): 46 ft"));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["ead", "100", "0.32"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("EAD for EAN32 (salt): 81 ft"));
}

#[test]
fn cli_blend_trimix_16_40() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["blend", "0.16", "0.40"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("For Trimix 16/40 to 3000"))
        .stdout(predicate::str::contains("add He: 1200"))
        .stdout(predicate::str::contains("add O2: 129"))
        .stdout(predicate::str::contains("fill with air: 1671"));
}

#[test]
fn cli_blend_heliox() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["blend", "0.07", "0.93"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("add He: 2790"))
        .stdout(predicate::str::contains("add O2: 210"))
        .stdout(predicate::str::contains("fill with air: 0"));
}

#[test]
fn cli_bottom_time_on_doubles() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["bottom-time", "100"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Bottom time on 2xAL80 at 100 ft: 18.3 min",
        ))
        .stdout(predicate::str::contains("Minimum gas: 41 cf (800 psi)"))
        .stdout(predicate::str::contains("Usable: 2200 psi"));
}

#[test]
fn cli_turn_by_rule() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["turn", "3000", "--rule", "half"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Turn pressure for 3000 at 0.5000: 1500",
        ));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gue_gas_rs");
    cmd.args(["turn", "3000"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("at 0.3333: 1000"));
}
