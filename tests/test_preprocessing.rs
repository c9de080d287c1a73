//! Integration test: individual cleaning stages and their edge cases

use client_features::preprocessing::{
    missing_percentages, BooleanNormalizer, ClientAggregator, ClientRows, ColumnPruner,
    NominalEncoder, NumericImputer, OrdinalEncoder, Scaler, ScalerType, DEFAULT_ORDINAL_LEVELS,
};
use polars::prelude::*;

fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

fn i64_values(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
    df.column(name).unwrap().i64().unwrap().into_iter().collect()
}

#[test]
fn test_pruning_threshold_is_strict() {
    // 4 of 5 missing is exactly 80%, which is kept at the default threshold
    let df = df!(
        "edge" => &[Some(1.0), None, None, None, None],
        "full" => &[1.0, 2.0, 3.0, 4.0, 5.0],
        "gone" => &[None::<i64>, None, None, None, None],
    )
    .unwrap();

    let mut pruner = ColumnPruner::default();
    let out = pruner.transform(&df).unwrap();

    assert_eq!(out.height(), 5);
    assert!(out.column("edge").is_ok());
    assert!(out.column("full").is_ok());
    assert!(out.column("gone").is_err());
    assert_eq!(pruner.dropped(), &["gone".to_string()]);
}

#[test]
fn test_pruning_zero_threshold_keeps_complete_columns() {
    let df = df!(
        "a" => &[Some(1.0), None],
        "b" => &[1.0, 2.0],
    )
    .unwrap();

    let out = ColumnPruner::new(0.0).transform(&df).unwrap();
    assert_eq!(out.width(), 1);
    assert!(out.column("b").is_ok());
}

#[test]
fn test_pruning_empty_table_drops_nothing() {
    let df = df!(
        "a" => Vec::<f64>::new(),
        "b" => Vec::<String>::new(),
    )
    .unwrap();

    assert!(missing_percentages(&df).iter().all(|(_, pct)| pct.is_none()));
    let out = ColumnPruner::default().transform(&df).unwrap();
    assert_eq!(out.width(), 2);
}

#[test]
fn test_ordinal_lookup() {
    let df = df!(
        "level" => &[Some("very_low"), Some("moderate"), Some("high"), Some("extreme"), None],
    )
    .unwrap();

    let out = OrdinalEncoder::new(&["level"], &DEFAULT_ORDINAL_LEVELS)
        .transform(&df)
        .unwrap();

    assert_eq!(i64_values(&out, "level"), vec![Some(0), Some(3), Some(5), None, None]);
}

#[test]
fn test_one_hot_fill_uses_first_seen_mode() {
    let df = df!(
        "shape" => &[Some("x"), Some("y"), None, Some("y"), Some("x")],
        "other" => &[1, 2, 3, 4, 5],
    )
    .unwrap();

    let mut encoder = NominalEncoder::new(&["shape"]);
    let out = encoder.fit_transform(&df).unwrap();

    // x and y tie at two each; x was seen first and fills the gap
    let x: Vec<Option<bool>> = out.column("shape_x").unwrap().bool().unwrap().into_iter().collect();
    assert_eq!(x, vec![Some(true), Some(false), Some(true), Some(false), Some(true)]);
    assert!(out.column("shape").is_err());
    assert!(out.column("other").is_ok());
}

#[test]
fn test_boolean_normalizer_fills_with_mode() {
    let df = df!(
        "flag" => &[Some(true), None, Some(true), Some(false)],
        "amount" => &[1.0, 2.0, 3.0, 4.0],
    )
    .unwrap();

    let mut normalizer = BooleanNormalizer::new();
    let out = normalizer.transform(&df).unwrap();

    assert_eq!(i64_values(&out, "flag"), vec![Some(1), Some(1), Some(1), Some(0)]);
    assert_eq!(out.column("amount").unwrap().dtype(), &DataType::Float64);
    assert_eq!(normalizer.fill_values(), &[("flag".to_string(), true)]);
}

#[test]
fn test_imputer_mean_and_all_missing() {
    let df = df!(
        "a" => &[Some(1.0), None, Some(3.0)],
        "b" => &[None::<f64>, None, None],
        "label" => &["p", "q", "r"],
    )
    .unwrap();

    let mut imputer = NumericImputer::new();
    let out = imputer.fit_transform(&df).unwrap();

    assert_eq!(f64_values(&out, "a"), vec![Some(1.0), Some(2.0), Some(3.0)]);
    assert_eq!(f64_values(&out, "b"), vec![Some(0.0), Some(0.0), Some(0.0)]);
    assert_eq!(out.column("label").unwrap().dtype(), &DataType::String);
}

#[test]
fn test_aggregation_sums_contiguous_clients() {
    let df = df!(
        "ID" => &["A", "A", "B"],
        "v" => &[10.0, 20.0, 10.0],
        "note" => &["x", "y", "z"],
    )
    .unwrap();

    let mut aggregator = ClientAggregator::new("ID");
    let out = aggregator.transform(&df).unwrap();

    let ids: Vec<Option<&str>> = out.column("ID").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(ids, vec![Some("A"), Some("B")]);
    assert_eq!(f64_values(&out, "v"), vec![Some(30.0), Some(10.0)]);
    assert!(out.column("note").is_err());
}

#[test]
fn test_aggregation_split_client_gives_two_rows() {
    let df = df!(
        "ID" => &["A", "B", "A"],
        "v" => &[1.0, 2.0, 3.0],
    )
    .unwrap();

    let mut aggregator = ClientAggregator::new("ID");
    let out = aggregator.transform(&df).unwrap();

    assert_eq!(out.height(), 3);
    assert_eq!(aggregator.split_clients(), 1);
}

#[test]
fn test_client_rows_streams_without_lookahead() {
    let rows = vec![
        (Some("A".to_string()), vec![Some(1.0)]),
        (Some("A".to_string()), vec![Some(2.0)]),
        (Some("B".to_string()), vec![Some(5.0)]),
    ];

    let mut folded = ClientRows::new(rows.into_iter(), 1);
    let first = folded.next().unwrap();
    assert_eq!(first.client.as_deref(), Some("A"));
    assert_eq!(first.sums, vec![3.0]);
    assert_eq!(first.rows, 2);

    let second = folded.next().unwrap();
    assert_eq!(second.client.as_deref(), Some("B"));
    assert!(folded.next().is_none());
}

#[test]
fn test_standard_scaler_zero_mean_unit_variance() {
    let df = df!(
        "ID" => &["A", "B", "C", "D"],
        "v" => &[1.0, 2.0, 3.0, 4.0],
        "flat" => &[7.0, 7.0, 7.0, 7.0],
    )
    .unwrap();

    let mut scaler = Scaler::new(ScalerType::Standard).with_excluded(&["ID"]);
    let out = scaler.fit_transform(&df).unwrap();

    let v = out.column("v").unwrap().f64().unwrap();
    assert!(v.mean().unwrap().abs() < 1e-12);
    assert!((v.std(0).unwrap() - 1.0).abs() < 1e-12);

    assert_eq!(f64_values(&out, "flat"), vec![Some(0.0); 4]);
    assert_eq!(out.column("ID").unwrap().dtype(), &DataType::String);
}

#[test]
fn test_minmax_scaler_range() {
    let df = df!("v" => &[2.0, 4.0, 6.0]).unwrap();

    let out = Scaler::new(ScalerType::MinMax).fit_transform(&df).unwrap();
    assert_eq!(f64_values(&out, "v"), vec![Some(0.0), Some(0.5), Some(1.0)]);
}
