mod common;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use serde_json::Value;

use common::{STUDY, TestWorkspace, fixture_path, fixture_text};

fn analyst() -> Command {
    Command::cargo_bin("csv-analyst").expect("binary exists")
}

fn study() -> String {
    fixture_path(STUDY).to_string_lossy().into_owned()
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

#[test]
fn profile_prints_one_row_per_column() {
    analyst()
        .args(["profile", "-i", &study()])
        .assert()
        .success()
        .stdout(contains("column").and(contains("std_dev")))
        .stdout(contains("hours").and(contains("numeric")))
        .stdout(contains("method").and(contains("categorical")));
}

#[test]
fn profile_json_reports_basic_stats() {
    let assert = analyst()
        .args(["profile", "-i", &study(), "--json"])
        .assert()
        .success();
    let profile = stdout_json(&assert.get_output().stdout);
    assert_eq!(profile["fileName"], "study.csv");
    assert_eq!(profile["rowCount"], 24);
    let hours = &profile["columns"][3];
    assert_eq!(hours["name"], "hours");
    assert_eq!(hours["datatype"], "numeric");
    assert_eq!(hours["count"], 23);
    assert_eq!(hours["missing"], 1);
    assert_eq!(hours["median"], 8.6);
    let passed = &profile["columns"][6];
    assert_eq!(passed["datatype"], "categorical");
    assert_eq!(passed["unique"], 2);
    assert_eq!(passed["top"], "yes");
}

#[test]
fn profile_overview_lists_sample_rows() {
    analyst()
        .args(["profile", "-i", &study(), "--overview"])
        .assert()
        .success()
        .stdout(contains("Filename: study.csv"))
        .stdout(contains("Number of rows: 24"))
        .stdout(contains("1, A, online, 2.4, 54, 49.0, no"));
}

#[test]
fn frequency_sorts_by_count() {
    analyst()
        .args(["frequency", "-i", &study(), "-c", "passed"])
        .assert()
        .success()
        .stdout(contains("yes        17   70.83%"))
        .stdout(contains("no          7   29.17%"));
}

#[test]
fn independent_t_test_prints_summary() {
    analyst()
        .args([
            "test",
            "independent-t-test",
            "-i",
            &study(),
            "--var1",
            "score",
            "--var2",
            "group",
        ])
        .assert()
        .success()
        .stdout(contains("Test: Independent Samples T-Test"))
        .stdout(contains("Degrees of Freedom (df): 21"))
        .stdout(contains("Cohen's d"))
        .stdout(contains("fail to reject the null hypothesis"));
}

#[test]
fn test_json_marks_missing_p_value() {
    let assert = analyst()
        .args([
            "test",
            "one-way-anova",
            "-i",
            &study(),
            "--var1",
            "score",
            "--var2",
            "method",
            "--json",
        ])
        .assert()
        .success();
    let result = stdout_json(&assert.get_output().stdout);
    assert_eq!(result["kind"], "one-way-anova");
    assert!(result["pValue"].is_null());
    assert!(result["limitation"].is_string());
    assert_eq!(result["df"]["between"], 2);
    assert_eq!(result["df"]["within"], 20);
}

#[test]
fn goodness_of_fit_accepts_proportions() {
    analyst()
        .args([
            "test",
            "chi-squared-gof",
            "-i",
            &study(),
            "--var1",
            "passed",
            "--proportion",
            "no=0.25",
            "--proportion",
            "yes=0.75",
        ])
        .assert()
        .success()
        .stdout(contains("Goodness-of-Fit Frequencies"))
        .stdout(contains("P-value").not());
}

#[test]
fn mismatched_proportions_fail() {
    analyst()
        .args([
            "test",
            "chi-squared-gof",
            "-i",
            &study(),
            "--var1",
            "passed",
            "--proportion",
            "yes=1.0",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid expected proportions"));
}

#[test]
fn one_sample_test_requires_mean() {
    analyst()
        .args(["test", "one-sample-t-test", "-i", &study(), "--var1", "score"])
        .assert()
        .failure()
        .stderr(contains("requires a hypothesized mean"));
}

#[test]
fn wilcoxon_is_reported_as_unsupported() {
    analyst()
        .args([
            "test",
            "wilcoxon-signed-rank",
            "-i",
            &study(),
            "--var1",
            "pre_score",
            "--var2",
            "score",
        ])
        .assert()
        .failure()
        .stderr(contains("Wilcoxon Signed-Rank Test is not supported"));
}

#[test]
fn show_log_appends_narrative_context() {
    analyst()
        .args([
            "test",
            "chi-squared",
            "-i",
            &study(),
            "--var1",
            "group",
            "--var2",
            "passed",
            "--show-log",
        ])
        .assert()
        .success()
        .stdout(contains("Dataset \"study.csv\" loaded."))
        .stdout(contains(
            "Performed Chi-Squared Test of Independence. Result Summary: Conclusion:",
        ));
}

#[test]
fn histogram_plot_is_json() {
    let assert = analyst()
        .args(["plot", "histogram", "-i", &study(), "--var1", "hours"])
        .assert()
        .success();
    let chart = stdout_json(&assert.get_output().stdout);
    assert_eq!(chart["type"], "histogram");
    let counts = chart["counts"].as_array().expect("counts");
    assert_eq!(counts.len(), 5);
    let total: u64 = counts.iter().filter_map(Value::as_u64).sum();
    assert_eq!(total, 23);
    assert_eq!(chart["labels"][0], "[2.40, 4.66)");
}

#[test]
fn scatter_plot_without_second_variable_fails() {
    analyst()
        .args(["plot", "scatter", "-i", &study(), "--var1", "hours"])
        .assert()
        .failure()
        .stderr(contains("requires a second variable"));
}

#[test]
fn regression_summary_interprets_slope() {
    analyst()
        .args(["regress", "-i", &study(), "-x", "hours", "-y", "score"])
        .assert()
        .success()
        .stdout(contains("Equation: Y = 4.0175 * X + 42.0447"))
        .stdout(contains("97% of the variance in 'score'"))
        .stdout(contains("predicted to increase by 4.0175 units."));
}

#[test]
fn tests_command_lists_eligible_columns() {
    analyst()
        .args(["tests", "-i", &study()])
        .assert()
        .success()
        .stdout(contains("mann-whitney-u"))
        .stdout(contains("categorical (2 groups): group, passed"))
        .stdout(contains("categorical (3+ groups): method"));
}

#[test]
fn reads_dataset_from_stdin() {
    analyst()
        .args(["frequency", "-i", "-", "-c", "method"])
        .write_stdin(fixture_text(STUDY))
        .assert()
        .success()
        .stdout(contains("online").and(contains("8")));
}

#[test]
fn decodes_legacy_encoding() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("cafes.csv", b"name,visits\ncaf\xe9,1\nbar,2\ncaf\xe9,3\n");
    analyst()
        .args([
            "frequency",
            "-i",
            path.to_str().expect("utf-8 path"),
            "-c",
            "name",
            "--input-encoding",
            "windows-1252",
        ])
        .assert()
        .success()
        .stdout(contains("café"));
}

#[test]
fn malformed_input_is_a_parse_error() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("bad.csv", "a,b\n1,2,3\n");
    analyst()
        .args(["profile", "-i", path.to_str().expect("utf-8 path")])
        .assert()
        .failure()
        .stderr(contains("Failed to parse dataset"));
}
