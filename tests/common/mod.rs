//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

/// Size/weight columns that get median-filled
pub const SIZE_COLUMNS: [&str; 4] = [
    "product_weight_g",
    "product_length_cm",
    "product_height_cm",
    "product_width_cm",
];

/// Create a synthetic order export with the columns of the real dataset
///
/// This DataFrame includes:
/// - `order_id`, `order_status`: text columns (dropped by numeric selection)
/// - five timestamp text columns
/// - `customer_zip_code_prefix`, `order_item_id`: identifier columns
/// - `price`, `freight_value`, `payment_value`, ...: numeric features
/// - the four size columns with roughly 3% missing values
/// - `review_comment_message`: text with roughly 40% missing values
/// - `review_score`: integer label 1-5 driven by price and freight
pub fn create_orders_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);

    let order_ids: Vec<String> = (0..rows).map(|i| format!("order_{:06}", i)).collect();
    let statuses: Vec<&str> = (0..rows)
        .map(|i| if i % 17 == 0 { "canceled" } else { "delivered" })
        .collect();
    let timestamp = |rng: &mut StdRng| {
        format!(
            "2017-{:02}-{:02} {:02}:{:02}:00",
            rng.gen_range(1..=12),
            rng.gen_range(1..=28),
            rng.gen_range(0..24),
            rng.gen_range(0..60)
        )
    };
    let timestamp_columns: Vec<(&str, Vec<String>)> = [
        "order_purchase_timestamp",
        "order_approved_at",
        "order_delivered_carrier_date",
        "order_delivered_customer_date",
        "order_estimated_delivery_date",
    ]
    .into_iter()
    .map(|name| (name, (0..rows).map(|_| timestamp(&mut rng)).collect()))
    .collect();

    let price: Vec<f64> = (0..rows).map(|_| rng.gen_range(10.0..200.0)).collect();
    let freight: Vec<f64> = (0..rows).map(|_| rng.gen_range(5.0..50.0)).collect();
    let installments: Vec<i64> = (0..rows).map(|_| rng.gen_range(1..=10)).collect();
    let payment_value: Vec<f64> = price
        .iter()
        .zip(&freight)
        .map(|(p, f)| p + f)
        .collect();
    let zip_prefix: Vec<i64> = (0..rows).map(|_| rng.gen_range(1000..99999)).collect();
    let order_item_id: Vec<i64> = (0..rows).map(|_| rng.gen_range(1..=3)).collect();
    let photos: Vec<f64> = (0..rows).map(|_| rng.gen_range(1..=6) as f64).collect();

    let mut size_column = |low: f64, high: f64| -> Vec<Option<f64>> {
        (0..rows)
            .map(|_| {
                if rng.gen_bool(0.03) {
                    None
                } else {
                    Some(rng.gen_range(low..high).round())
                }
            })
            .collect()
    };
    let weight = size_column(100.0, 5000.0);
    let length = size_column(10.0, 100.0);
    let height = size_column(2.0, 60.0);
    let width = size_column(8.0, 80.0);

    let reviews: Vec<Option<String>> = (0..rows)
        .map(|i| {
            if rng.gen_bool(0.4) {
                None
            } else {
                Some(format!("review text {}", i))
            }
        })
        .collect();

    let review_score: Vec<i64> = price
        .iter()
        .zip(&freight)
        .map(|(p, f)| {
            let noise: f64 = rng.gen_range(-0.75..0.75);
            let score = 3.0 + 0.01 * p - 0.05 * f + noise;
            score.round().clamp(1.0, 5.0) as i64
        })
        .collect();

    let order_ids: Vec<&str> = order_ids.iter().map(String::as_str).collect();
    let reviews: Vec<Option<&str>> = reviews.iter().map(|r| r.as_deref()).collect();

    let mut columns: Vec<Column> = vec![
        Column::new("order_id".into(), order_ids),
        Column::new("order_status".into(), statuses),
    ];
    for (name, values) in &timestamp_columns {
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        columns.push(Column::new((*name).into(), values));
    }
    columns.extend([
        Column::new("payment_installments".into(), installments),
        Column::new("payment_value".into(), payment_value),
        Column::new("customer_zip_code_prefix".into(), zip_prefix),
        Column::new("order_item_id".into(), order_item_id),
        Column::new("price".into(), price),
        Column::new("freight_value".into(), freight),
        Column::new("product_photos_qty".into(), photos),
        Column::new("product_weight_g".into(), weight),
        Column::new("product_length_cm".into(), length),
        Column::new("product_height_cm".into(), height),
        Column::new("product_width_cm".into(), width),
        Column::new("review_comment_message".into(), reviews),
        Column::new("review_score".into(), review_score),
    ]);

    DataFrame::new(columns).unwrap()
}

/// Small hand-written export with known medians
///
/// Medians of the non-missing values:
/// - product_weight_g: 300.0
/// - product_length_cm: 20.0
/// - product_height_cm: 10.0
/// - product_width_cm: 15.0
pub fn create_small_orders_dataframe() -> DataFrame {
    df! {
        "order_id" => ["a", "b", "c", "d", "e", "f"],
        "order_purchase_timestamp" => ["2017-10-02 10:56:33"; 6],
        "order_approved_at" => ["2017-10-02 11:07:15"; 6],
        "order_delivered_carrier_date" => ["2017-10-04 19:55:00"; 6],
        "order_delivered_customer_date" => ["2017-10-10 21:25:13"; 6],
        "order_estimated_delivery_date" => ["2017-10-18 00:00:00"; 6],
        "customer_zip_code_prefix" => [3149i64, 3366, 2290, 8775, 13056, 89254],
        "order_item_id" => [1i64, 1, 2, 1, 1, 3],
        "price" => [29.99f64, 118.7, 159.9, 45.0, 19.9, 147.9],
        "freight_value" => [8.72f64, 22.76, 19.22, 27.2, 8.72, 27.36],
        "product_weight_g" => [Some(500.0f64), None, Some(100.0), Some(300.0), Some(200.0), Some(800.0)],
        "product_length_cm" => [Some(19.0f64), Some(20.0), None, Some(30.0), Some(16.0), Some(40.0)],
        "product_height_cm" => [Some(8.0f64), Some(10.0), Some(12.0), None, None, None],
        "product_width_cm" => [None, Some(15.0f64), Some(14.0), Some(16.0), Some(11.0), Some(20.0)],
        "review_comment_message" => [Some("great"), None, Some("late"), None, Some("ok"), None],
        "review_score" => [5i64, 4, 2, 4, 5, 3],
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("orders.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("orders.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Column values as f64, nulls kept as None
pub fn column_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .iter()
        .collect()
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// Assert every column is numeric and has no nulls or non-finite values
pub fn assert_all_numeric_and_complete(df: &DataFrame) {
    for column in df.get_columns() {
        assert!(
            column.dtype().is_primitive_numeric(),
            "Column '{}' is not numeric: {}",
            column.name(),
            column.dtype()
        );
        let values = column_values(df, column.name().as_str());
        let missing = values
            .iter()
            .filter(|v| v.map_or(true, |x| !x.is_finite()))
            .count();
        assert_eq!(missing, 0, "Column '{}' has {} missing values", column.name(), missing);
    }
}
