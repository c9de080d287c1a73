//! Integration test: full cleaning runs over the default transaction schema

use client_features::prelude::*;
use polars::prelude::*;

/// Six transactions for three clients, using the default column names
fn transactions() -> DataFrame {
    df!(
        "ID" => &["C1", "C1", "C2", "C3", "C3", "C3"],
        "Expenditure_AHF" => &["2021-03-01", "2021-03-05", "2021-04-11", "2021-05-02", "not a date", "2021-05-09"],
        "Infraction_CLH" => &[Some("low"), Some("high"), Some("very_high"), None, Some("moderate"), Some("low")],
        "Base_67254" => &[Some("very_low"), Some("very_low"), Some("moderate_low"), Some("moderate_high"), Some("high"), Some("low")],
        "Infraction_TEN" => &[Some("moderate"), Some("moderate"), Some("moderate"), Some("moderate"), Some("moderate"), Some("moderate")],
        "Infraction_YFSG" => &[Some("a"), Some("b"), None, Some("b"), Some("a"), Some("a")],
        "Infraction_DQLY" => &[Some("u"), None, Some("v"), Some("u"), Some("u"), Some("v")],
        "Is_Weekend" => &[Some(true), Some(false), None, Some(true), Some(true), Some(false)],
        "Amount" => &[Some(120.0), Some(80.0), Some(45.5), None, Some(10.0), Some(30.0)],
        "Sparse" => &[None, None, None, None, None, Some(1.0)],
        "Empty" => &[None::<f64>, None, None, None, None, None],
    )
    .unwrap()
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns().iter().map(|c| c.name().to_string()).collect()
}

#[test]
fn test_default_schema_end_to_end() {
    let output = CleaningPipeline::new().run(&transactions()).unwrap();
    let frame = &output.frame;

    assert_eq!(frame.height(), 3, "one row per client");
    assert_eq!(column_names(frame)[0], "ID");

    let ids: Vec<Option<&str>> = frame.column("ID").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(ids, vec![Some("C1"), Some("C2"), Some("C3")]);

    for col in frame.get_columns().iter().skip(1) {
        assert_eq!(col.dtype(), &DataType::Float64, "{} should be numeric", col.name());
        assert_eq!(col.null_count(), 0, "{} should have no missing values", col.name());
    }

    // Mostly-empty and empty columns are gone, the datetime column does not survive aggregation
    let names = column_names(frame);
    assert!(!names.contains(&"Sparse".to_string()));
    assert!(!names.contains(&"Empty".to_string()));
    assert!(!names.contains(&"Expenditure_AHF".to_string()));
    assert!(!names.contains(&"Infraction_YFSG".to_string()));
    assert!(names.contains(&"Infraction_YFSG_a".to_string()));
    assert!(names.contains(&"Infraction_DQLY_v".to_string()));
    assert!(names.contains(&"Is_Weekend".to_string()));
}

#[test]
fn test_report_describes_run() {
    let report = CleaningPipeline::new().run(&transactions()).unwrap().report;

    assert_eq!(report.stages.len(), 6);
    assert_eq!(report.stages[0].rows_in, 6);
    assert_eq!(report.stages[5].rows_out, 3);
    assert_eq!(report.dropped_columns, vec!["Sparse".to_string(), "Empty".to_string()]);
    assert_eq!(report.client_rows, 3);
    assert_eq!(report.split_clients, 0);
    assert!(report.boolean_fill_values.contains(&("Is_Weekend".to_string(), true)));
    assert!(report.total_secs() >= 0.0);
}

#[test]
fn test_unscaled_sums() {
    let config = PipelineConfig::new().with_scaler(ScalerType::None);
    let frame = CleaningPipeline::with_config(config).clean(&transactions()).unwrap();

    let amount: Vec<Option<f64>> = frame.column("Amount").unwrap().f64().unwrap().into_iter().collect();
    // C3's missing amount is the mean of the five observed ones: 285.5 / 5
    assert_eq!(amount[0], Some(200.0));
    assert_eq!(amount[1], Some(45.5));
    assert!((amount[2].unwrap() - 97.1).abs() < 1e-9);

    let ten: Vec<Option<f64>> = frame.column("Infraction_TEN").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(ten, vec![Some(6.0), Some(3.0), Some(9.0)]);

    // C2's missing nominal value takes the mode "a"
    let yfsg_a: Vec<Option<f64>> = frame.column("Infraction_YFSG_a").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(yfsg_a, vec![Some(1.0), Some(1.0), Some(2.0)]);
}

#[test]
fn test_scaled_columns_have_zero_mean_unit_variance() {
    let frame = CleaningPipeline::new().clean(&transactions()).unwrap();
    let unscaled = CleaningPipeline::with_config(PipelineConfig::new().with_scaler(ScalerType::None))
        .clean(&transactions())
        .unwrap();

    for col in frame.get_columns().iter().skip(1) {
        let values = col.as_materialized_series().f64().unwrap();
        let mean = values.mean().unwrap();
        let std = values.std(0).unwrap();
        assert!(mean.abs() < 1e-9, "{} mean was {}", col.name(), mean);

        let raw_std = unscaled.column(col.name()).unwrap().f64().unwrap().std(0).unwrap();
        if raw_std > 1e-9 {
            assert!((std - 1.0).abs() < 1e-9, "{} std was {}", col.name(), std);
        } else {
            assert!(values.into_iter().all(|v| v.unwrap().abs() < 1e-9), "{} should be all zeros", col.name());
        }
    }
}

#[test]
fn test_missing_default_column_is_schema_error() {
    let df = transactions().drop("Infraction_TEN").unwrap();
    let err = CleaningPipeline::new().run(&df).unwrap_err();
    assert!(matches!(err, CleanError::ColumnNotFound { .. }));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("transactions.parquet");
    let output = dir.path().join("clients.csv");

    let mut df = transactions();
    DataSaver::save(&mut df, &input).unwrap();

    let loaded = DataLoader::new().load(&input).unwrap();
    let mut cleaned = CleaningPipeline::new().clean(&loaded).unwrap();
    DataSaver::save(&mut cleaned, &output).unwrap();

    let reloaded = DataLoader::new().load(&output).unwrap();
    assert_eq!(reloaded.height(), 3);
    assert_eq!(reloaded.width(), cleaned.width());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = PipelineConfig::new()
        .with_missing_threshold(50.0)
        .with_aggregation(AggregationMode::Grouped)
        .with_schema(SchemaConfig::default().with_boolean_columns(&["Flag"]));
    config.to_json_file(&path).unwrap();

    let loaded = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);
}
