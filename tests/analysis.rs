mod common;

use csv_analyst::{
    columns::{grouped_numeric, get_paired_numeric_data},
    dataset::Dataset,
    eda::{ChartConfig, PlotKind, generate_plot},
    error::AnalysisError,
    hypothesis::{TestKind, TestOptions, TestRequest, VariableRole, eligible_columns},
    schema::ColumnType,
    session::Session,
};
use proptest::prelude::*;

use common::{STUDY, fixture_text};

fn study_session() -> Session {
    let mut session = Session::new();
    session
        .ingest(Some(STUDY), &fixture_text(STUDY))
        .expect("fixture parses");
    session
}

#[test]
fn fixture_types_are_inferred() {
    let session = study_session();
    let dataset = session.dataset().unwrap();
    let types = dataset.column_types().collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            ("student_id", ColumnType::Numeric),
            ("group", ColumnType::Categorical),
            ("method", ColumnType::Categorical),
            ("hours", ColumnType::Numeric),
            ("pre_score", ColumnType::Numeric),
            ("score", ColumnType::Numeric),
            ("passed", ColumnType::Categorical),
        ]
    );
    assert_eq!(
        eligible_columns(dataset, VariableRole::CategoricalTwoGroups),
        vec!["group", "passed"]
    );
}

#[test]
fn every_supported_test_runs_against_fixture() {
    let mut session = study_session();
    let options = TestOptions {
        hypothesized_mean: Some(70.0),
        proportions: Vec::new(),
    };
    let cases = [
        (TestKind::OneSampleTTest, "score", None),
        (TestKind::IndependentTTest, "score", Some("group")),
        (TestKind::PairedTTest, "pre_score", Some("score")),
        (TestKind::ChiSquaredGof, "method", None),
        (TestKind::ChiSquared, "group", Some("passed")),
        (TestKind::OneWayAnova, "score", Some("method")),
        (TestKind::PearsonCorrelation, "hours", Some("score")),
        (TestKind::MannWhitneyU, "score", Some("group")),
        (TestKind::KruskalWallis, "score", Some("method")),
    ];
    for (kind, first, second) in cases {
        let request =
            TestRequest::build(session.dataset().unwrap(), kind, first, second, &options).unwrap();
        assert_eq!(request.kind(), kind);
        let result = session.run_test(&request).unwrap();
        assert_eq!(result.kind, kind);
        assert!(result.summary.starts_with(&format!("Test: {}", kind.display_name())));
        match result.p_value {
            Some(_) => assert!(result.conclusion().starts_with("Conclusion:")),
            None => assert!(result.conclusion().starts_with("Note:")),
        }
    }
    let log = session.dataset().unwrap().analysis_log();
    assert_eq!(log.len(), cases.len() + 1);
    assert!(log[9].starts_with("Performed Kruskal-Wallis H Test."));
}

#[test]
fn pearson_reports_strong_positive_correlation() {
    let session = study_session();
    let dataset = session.dataset().unwrap();
    let result = csv_analyst::hypothesis::pearson_correlation(dataset, "hours", "score").unwrap();
    let correlation = result.correlation.expect("correlation");
    assert_eq!(correlation.n, 22);
    assert!(correlation.r > 0.98 && correlation.r <= 1.0);
    assert_eq!(result.p_value, None);
}

#[test]
fn group_count_is_checked_before_computing() {
    let session = study_session();
    let dataset = session.dataset().unwrap();
    assert!(matches!(
        csv_analyst::hypothesis::independent_t_test(dataset, "score", "method"),
        Err(AnalysisError::InvalidGroupCount { actual: 3, .. })
    ));
    assert!(matches!(
        csv_analyst::hypothesis::one_way_anova(dataset, "score", "group"),
        Err(AnalysisError::InvalidGroupCount { actual: 2, .. })
    ));
}

#[test]
fn unknown_columns_are_rejected_everywhere() {
    let session = study_session();
    let dataset = session.dataset().unwrap();
    let expect_invalid = |result: Result<(), AnalysisError>| {
        assert!(matches!(result, Err(AnalysisError::InvalidColumn { ref name }) if name == "nope"));
    };
    expect_invalid(get_paired_numeric_data(dataset, "hours", "nope").map(drop));
    expect_invalid(grouped_numeric(dataset, "nope", "group").map(drop));
    expect_invalid(generate_plot(dataset, PlotKind::Bar, "nope", None).map(drop));
    expect_invalid(csv_analyst::regression::linear_regression(dataset, "nope", "score").map(drop));
}

#[test]
fn box_plot_of_fixture_column() {
    let session = study_session();
    let chart = generate_plot(session.dataset().unwrap(), PlotKind::BoxPlot, "hours", None).unwrap();
    let ChartConfig::BoxPlot { boxes, .. } = chart else {
        panic!("expected box plot");
    };
    assert_eq!(boxes[0].min, 2.4);
    assert_eq!(boxes[0].median, 8.6);
    assert_eq!(boxes[0].max, 13.7);
    assert!(boxes[0].q1 <= boxes[0].median && boxes[0].median <= boxes[0].q3);
}

fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => (-1000i32..1000).prop_map(|v| v.to_string()),
        2 => (-100.0f64..100.0).prop_map(|v| format!("{v:.3}")),
        1 => Just(String::new()),
        1 => "[a-z]{1,4}",
    ]
}

fn csv_text(rows: &[(String, String)]) -> String {
    let mut text = String::from("left,right\n");
    for (left, right) in rows {
        text.push_str(&format!("{left},{right}\n"));
    }
    text
}

proptest! {
    #[test]
    fn paired_data_keeps_rows_where_both_parse(rows in prop::collection::vec((cell(), cell()), 1..60)) {
        let dataset = Dataset::parse(None, &csv_text(&rows)).unwrap();
        let paired = get_paired_numeric_data(&dataset, "left", "right").unwrap();
        let expected = rows
            .iter()
            .filter(|(l, r)| l.parse::<f64>().is_ok_and(f64::is_finite) && r.parse::<f64>().is_ok_and(f64::is_finite))
            .count();
        prop_assert_eq!(paired.first.len(), paired.second.len());
        prop_assert_eq!(paired.len(), expected);
    }

    #[test]
    fn histogram_counts_cover_every_value(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)) {
        let mut text = String::from("v\n");
        for value in &values {
            text.push_str(&format!("{value}\n"));
        }
        let dataset = Dataset::parse(None, &text).unwrap();
        let chart = generate_plot(&dataset, PlotKind::Histogram, "v", None).unwrap();
        let ChartConfig::Histogram { counts, labels, .. } = chart else {
            panic!("expected histogram");
        };
        prop_assert_eq!(counts.len(), labels.len());
        prop_assert_eq!(counts.iter().sum::<usize>(), values.len());
    }

    #[test]
    fn reingesting_is_idempotent(rows in prop::collection::vec((cell(), cell()), 1..40)) {
        let text = csv_text(&rows);
        let mut session = Session::new();
        let first = session.ingest(None, &text).unwrap().clone();
        let second = session.ingest(None, &text).unwrap();
        prop_assert_eq!(first.headers(), second.headers());
        prop_assert_eq!(first.row_count(), second.row_count());
        prop_assert_eq!(
            first.column_types().collect::<Vec<_>>(),
            second.column_types().collect::<Vec<_>>()
        );
    }
}
