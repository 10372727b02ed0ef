//! End-to-end loading of UTF-16 HTML exports.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use vnagri_ingest::{IngestError, load_price_table};
use vnagri_model::{AnalysisOptions, ColumnNames};

fn utf16_file(html: &str) -> NamedTempFile {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in html.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(&bytes).expect("write fixture");
    file
}

fn export(rows: &[(&str, &str, &str)]) -> String {
    let mut html = String::from(
        "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-16\"></head><body>\
         <table border=\"1\">\
         <tr><th>STT</th><th>Tên_mặt_hàng</th><th>Giá</th><th>Ngày</th><th>Đơn_vị_tính</th><th>Loại_giá</th></tr>",
    );
    for (index, (item, price, date)) in rows.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{item}</td><td>{price}</td><td>{date}</td><td>đ/kg</td><td>Bán lẻ</td></tr>",
            index + 1
        ));
    }
    html.push_str("</table></body></html>");
    html
}

#[test]
fn loads_utf16_export() {
    let file = utf16_file(&export(&[
        ("Cà chua", "12,000", "01/15/2024 08:00:00 AM"),
        ("Bắp cải", "8000", "01/15/2024 08:00:00 AM"),
        ("Cà chua", "13000", "01/16/2024 08:00:00 AM"),
    ]));
    let table = load_price_table(file.path(), &AnalysisOptions::default()).expect("load table");

    assert_eq!(table.len(), 3);
    assert_eq!(table.column_count(), 6);
    assert_eq!(table.items(), vec!["Cà chua", "Bắp cải"]);
    assert_eq!(table.item_prices("Cà chua"), vec![12000.0, 13000.0]);
    assert_eq!(table.records[1].attributes, vec!["2", "Bán lẻ"]);
    assert_eq!(table.source, file.path().display().to_string());
}

#[test]
fn missing_path_is_not_found() {
    let err = load_price_table(
        Path::new("/definitely/not/here/Rau, qua"),
        &AnalysisOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
    assert!(!err.is_parse_error());
}

#[test]
fn malformed_date_rejects_the_load() {
    let file = utf16_file(&export(&[
        ("Cà chua", "12000", "01/15/2024 08:00:00 AM"),
        ("Cà chua", "12500", "16/01/2024 08:00:00"),
    ]));
    let err = load_price_table(file.path(), &AnalysisOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::InvalidDate { row: 2, .. }));
    assert!(err.is_parse_error());
}

#[test]
fn document_without_table_is_parse_error() {
    let file = utf16_file("<html><body><p>Không có dữ liệu</p></body></html>");
    let err = load_price_table(file.path(), &AnalysisOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::NoTable { .. }));
}

#[test]
fn custom_column_names_are_honoured() {
    let html = "<table><tr><td>item</td><td>price</td><td>date</td><td>unit</td></tr>\
                <tr><td>Tiêu</td><td>150000</td><td>06/01/2023 09:15:00 AM</td><td>đ/kg</td></tr></table>";
    let file = utf16_file(html);
    let options = AnalysisOptions::default().with_columns(ColumnNames {
        item_name: "item".to_string(),
        price: "price".to_string(),
        date: "date".to_string(),
        unit: "unit".to_string(),
    });
    let table = load_price_table(file.path(), &options).expect("load table");
    assert_eq!(table.items(), vec!["Tiêu"]);

    let err = load_price_table(file.path(), &AnalysisOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn { .. }));
}
