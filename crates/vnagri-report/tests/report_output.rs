//! Reports built by the engine, written to disk and read back.

use chrono::NaiveDate;
use vnagri_model::{Column, ColumnRole, OutlierPolicy, PriceRecord, PriceTable};
use vnagri_report::{ReportFormat, export_rows_csv, write_report_file};
use vnagri_stats::{detect_outliers, summarize_dataset};

fn table() -> PriceTable {
    let mut table = PriceTable::new(
        "gia-ca.html",
        vec![
            Column::new("Tên_mặt_hàng", ColumnRole::ItemName),
            Column::new("Giá", ColumnRole::Price),
            Column::new("Ngày", ColumnRole::Date),
            Column::new("Đơn_vị_tính", ColumnRole::Unit),
        ],
    );
    let prices = [500.0, 2000.0, 2100.0, 2200.0, 2300.0, 2400.0, 50000.0];
    for (day, price) in prices.into_iter().enumerate() {
        let date = NaiveDate::from_ymd_opt(2023, 4, day as u32 + 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        table.push(PriceRecord::new("Khoai lang", price, date, "đ/kg"));
    }
    table
}

#[test]
fn yaml_report_round_trips_key_fields() {
    let report = summarize_dataset(&table(), &OutlierPolicy::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.yaml");
    write_report_file(&report, ReportFormat::Yaml, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(parsed["row_count"].as_u64(), Some(7));
    assert_eq!(parsed["column_count"].as_u64(), Some(4));

    let item = &parsed["items"][0];
    assert_eq!(item["name"].as_str(), Some("Khoai lang"));
    assert_eq!(item["first_update"].as_str(), Some("2023/04/01"));
    assert_eq!(item["last_update"].as_str(), Some("2023/04/07"));
    assert_eq!(item["outliers"]["outlier_count"].as_u64(), Some(2));
    assert_eq!(item["outliers"]["has_outliers"].as_bool(), Some(true));

    let date_column = &parsed["columns"]["Ngày"];
    assert_eq!(date_column["inferred_type"].as_str(), Some("datetime"));
    assert_eq!(date_column["summary_data"]["first"].as_str(), Some("2023/04/01"));
}

#[test]
fn json_report_round_trips_key_fields() {
    let report = summarize_dataset(&table(), &OutlierPolicy::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    write_report_file(&report, ReportFormat::Json, &path).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed["source"], "gia-ca.html");
    assert_eq!(parsed["price_stats"]["count"], 7);
    assert_eq!(parsed["items"]["0"]["outliers"]["q1"], 2050.0);
    assert_eq!(parsed["columns"]["Giá"]["inferred_type"], "float");
    assert_eq!(parsed["columns"]["Giá"]["summary_data"]["kind"], "numeric");
}

#[test]
fn outlier_rows_export_as_csv() {
    let table = table();
    let detection = detect_outliers(&table, &OutlierPolicy::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outliers.csv");
    let written = export_rows_csv(&table.columns, &detection.rows, &path).unwrap();
    assert_eq!(written, 2);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let prices: Vec<String> = reader
        .records()
        .map(|record| record.unwrap()[1].to_string())
        .collect();
    assert_eq!(prices, vec!["500", "50000"]);
}
