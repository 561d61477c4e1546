//! Shared chunk generators for integration tests.

#![allow(dead_code)]

use s3select_core::schema::{ColumnSpec, DataType};

/// `id: Int64, region: Utf8, amount: Float64`
pub fn sales_spec() -> ColumnSpec {
    ColumnSpec::from_pairs([
        ("id", DataType::Int64),
        ("region", DataType::Utf8),
        ("amount", DataType::Float64),
    ])
    .expect("valid spec")
}

/// Render rows the way the service does with `QuoteFields: ALWAYS`.
pub fn quoted_csv(rows: &[&[&str]]) -> Vec<u8> {
    let mut out = String::new();
    for row in rows {
        let fields: Vec<String> = row
            .iter()
            .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out.into_bytes()
}

/// `n` sales rows starting at `first_id`.
pub fn sales_chunk(first_id: i64, n: usize) -> Vec<u8> {
    let rows: Vec<Vec<String>> = (0..n as i64)
        .map(|i| {
            let id = first_id + i;
            vec![
                id.to_string(),
                format!("region-{}", id % 3),
                format!("{}.25", id * 10),
            ]
        })
        .collect();
    let refs: Vec<Vec<&str>> = rows
        .iter()
        .map(|r| r.iter().map(String::as_str).collect())
        .collect();
    let slices: Vec<&[&str]> = refs.iter().map(Vec::as_slice).collect();
    quoted_csv(&slices)
}

/// One JSON document per line, newline terminated.
pub fn jsonl(values: &[serde_json::Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        out.extend_from_slice(v.to_string().as_bytes());
        out.push(b'\n');
    }
    out
}
