use criterion::{criterion_group, criterion_main, Criterion};
use s3select_core::schema::{ColumnSpec, DataType};
use s3select_io::{JsonLinesReader, Reader, RowReader, TabularReader};

fn spec() -> ColumnSpec {
    ColumnSpec::from_pairs([
        ("id", DataType::Int64),
        ("region", DataType::Utf8),
        ("amount", DataType::Float64),
    ])
    .unwrap()
}

fn make_csv(rows: usize) -> Vec<u8> {
    let mut out = String::with_capacity(rows * 32);
    for i in 0..rows {
        out.push_str(&format!("\"{}\",\"region-{}\",\"{}.5\"\n", i, i % 4, i * 3));
    }
    out.into_bytes()
}

fn make_jsonl(rows: usize) -> Vec<u8> {
    let mut out = String::with_capacity(rows * 48);
    for i in 0..rows {
        out.push_str(&format!(
            "{{\"id\":{},\"region\":\"region-{}\",\"amount\":{}.5}}\n",
            i,
            i % 4,
            i * 3
        ));
    }
    out.into_bytes()
}

fn bench_tabular(c: &mut Criterion) {
    let chunks: Vec<Vec<u8>> = (0..8).map(|_| make_csv(1024)).collect();
    let cols = spec();
    let lenient = TabularReader::lenient();
    let strict = TabularReader::strict();
    c.bench_function("tabular_lenient_8x1024", |b| {
        b.iter(|| {
            let _ = lenient
                .read_all(chunks.iter().map(Vec::as_slice), &cols)
                .unwrap();
        })
    });
    c.bench_function("tabular_strict_8x1024", |b| {
        b.iter(|| {
            let _ = strict
                .read_all(chunks.iter().map(Vec::as_slice), &cols)
                .unwrap();
        })
    });
}

fn bench_rows(c: &mut Criterion) {
    let chunks: Vec<Vec<u8>> = (0..8).map(|_| make_csv(1024)).collect();
    let cols = spec();
    c.bench_function("rows_8x1024", |b| {
        b.iter(|| {
            let rows = RowReader
                .read_all(chunks.iter().map(Vec::as_slice), &cols)
                .unwrap();
            assert_eq!(rows.count(), 8 * 1024);
        })
    });
}

fn bench_jsonl(c: &mut Criterion) {
    let chunks: Vec<Vec<u8>> = (0..8).map(|_| make_jsonl(1024)).collect();
    let cols = spec();
    c.bench_function("jsonl_8x1024", |b| {
        b.iter(|| {
            let values = JsonLinesReader
                .read_all(chunks.iter().map(Vec::as_slice), &cols)
                .unwrap();
            assert_eq!(values.count(), 8 * 1024);
        })
    });
}

criterion_group!(decode, bench_tabular, bench_rows, bench_jsonl);
criterion_main!(decode);
