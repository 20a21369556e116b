use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_malformed_csv_handling() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("robustness_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(["op", "arg"]).unwrap();

    wtr.write_record(["init", "1 2 3"]).unwrap();
    // Unknown operation
    wtr.write_record(["refund", "1"]).unwrap();
    // Missing amount for pay
    wtr.write_record(["pay", ""]).unwrap();
    // Valid payment
    wtr.write_record(["pay", "2"]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("coinledger"));
    cmd.arg("replay").arg(&output_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation"))
        .stdout(predicate::str::contains(
            "Successfully paid 2\nMy current coins are [1, 3]",
        ));
}

#[test]
fn test_invalid_data_types() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("data_type_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(["op", "arg"]).unwrap();

    // Text among the coins
    wtr.write_record(["init", "1 two 3"]).unwrap();
    wtr.write_record(["init", "5 3"]).unwrap();
    // Text as the amount
    wtr.write_record(["pay", "not_a_number"]).unwrap();
    wtr.write_record(["pay", "4"]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("coinledger"));
    cmd.arg("replay").arg(&output_path);

    // 3 is spent whole, 5 is split and 4 is left.
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation").count(2))
        .stdout(predicate::str::contains(
            "Successfully paid 4\nMy current coins are [4]",
        ));
}

#[test]
fn test_missing_replay_file() {
    let mut cmd = Command::new(cargo_bin!("coinledger"));
    cmd.arg("replay").arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}
