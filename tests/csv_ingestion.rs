use vacancy_stats::ingestion::csv::{csv_records_from_path, csv_records_from_reader};
use vacancy_stats::types::PostingColumns;

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes())
}

#[test]
fn csv_fixture_skips_structurally_invalid_rows() {
    let mut records = csv_records_from_path("tests/fixtures/vacancies.csv", &PostingColumns::default()).unwrap();
    assert_eq!(records.header()[0], "employer_name");

    let rows: Vec<_> = records.by_ref().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].row, 2);
    assert_eq!(rows[0].get("name"), Some("Программист"));
    assert_eq!(rows[0].get("area_name"), Some("Москва"));
    // quoted field with an embedded comma stays one field
    assert_eq!(rows[5].get("name"), Some("Программист, C++"));
    assert_eq!(rows[5].row, 9);

    let stats = records.stats();
    assert_eq!(stats.rows_read, 8);
    assert_eq!(stats.rows_skipped, 2);
    assert_eq!(stats.rows_accepted(), 6);
}

#[test]
fn csv_allows_reordered_and_extra_columns() {
    let input = "published_at,area_name,id,salary_currency,salary_to,salary_from,name\n\
                 2019-01-01,Омск,17,RUR,2000,1000,Dev\n";
    let rows: Vec<_> = csv_records_from_reader(reader(input), &PostingColumns::default())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("salary_from"), Some("1000"));
    assert_eq!(rows[0].get("id"), Some("17"));
    assert_eq!(rows[0].len(), 7);
}

#[test]
fn csv_errors_on_missing_required_column() {
    let input = "name,salary_from,salary_to,salary_currency,published_at\nDev,1,2,RUR,2019-01-01\n";
    let err = csv_records_from_reader(reader(input), &PostingColumns::default())
        .err()
        .unwrap();
    let msg = err.to_string();
    assert!(msg.contains("schema mismatch"));
    assert!(msg.contains("missing required column 'area_name'"));
}

#[test]
fn csv_custom_column_names() {
    let columns = PostingColumns {
        name: "title".to_string(),
        area_name: "city".to_string(),
        ..Default::default()
    };
    let input = "title,salary_from,salary_to,salary_currency,city,published_at\nDev,1,2,RUR,Омск,2019-01-01\n";
    let rows: Vec<_> = csv_records_from_reader(reader(input), &columns)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows[0].get("city"), Some("Омск"));
}

#[test]
fn csv_header_only_yields_nothing() {
    let input = "name,salary_from,salary_to,salary_currency,area_name,published_at\n";
    let mut records = csv_records_from_reader(reader(input), &PostingColumns::default()).unwrap();
    assert!(records.next().is_none());
    assert_eq!(records.stats().rows_read, 0);
}

#[test]
fn csv_row_numbers_follow_physical_lines() {
    let input = "name,salary_from,salary_to,salary_currency,area_name,published_at\n\
                 \"Senior\nDev\",1,2,RUR,Омск,2019-01-01\n\
                 QA,3,4,RUR,Омск,2020-01-01\n";
    let rows: Vec<_> = csv_records_from_reader(reader(input), &PostingColumns::default())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows[0].row, 2);
    assert_eq!(rows[0].get("name"), Some("Senior\nDev"));
    // the quoted field spans lines 2 and 3
    assert_eq!(rows[1].row, 4);
}
