use rust_event_selection::AnalysisError;
use rust_event_selection::source::{CsvSource, RecordSource};
use rust_event_selection::store::ValueStore;

fn event_store() -> ValueStore {
    let mut store = ValueStore::new();
    store.insert::<i32>("Run").unwrap();
    store.insert::<i64>("EvNbr").unwrap();
    store.insert::<f64>("E1").unwrap();
    store
}

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn csv_source_reads_fixture_from_path() {
    let mut store = ValueStore::new();
    let run = store.insert::<i32>("Run").unwrap();
    let z1 = store.insert::<f64>("Z1").unwrap();
    let mut source = CsvSource::from_path("tests/fixtures/events.csv", fields(&["Z1", "Run"])).unwrap();
    source.bind(&store).unwrap();

    let mut seen = Vec::new();
    while source.next_record(&mut store).unwrap() {
        seen.push((store.read(run).unwrap(), store.read(z1).unwrap()));
    }
    assert_eq!(seen, vec![(100, 1.0), (100, 1.0), (101, 0.8), (101, 3.0)]);
    assert_eq!(source.rows_read(), 4);
}

#[test]
fn csv_source_errors_on_missing_required_column() {
    let store = event_store();
    let mut source = CsvSource::from_reader("Run,E1\n1,2.0\n".as_bytes(), fields(&["Run", "EvNbr", "E1"]));
    let msg = source.bind(&store).unwrap_err().to_string();
    assert!(msg.contains("schema mismatch"));
    assert!(msg.contains("missing required column 'EvNbr'"));
}

#[test]
fn csv_source_errors_on_unregistered_field() {
    let store = event_store();
    let mut source = CsvSource::from_reader("Spill\n1\n".as_bytes(), fields(&["Spill"]));
    assert!(matches!(source.bind(&store), Err(AnalysisError::SchemaMismatch { .. })));
}

#[test]
fn csv_source_errors_on_type_parse() {
    let mut store = event_store();
    let input = "Run,EvNbr,E1\n1,10,0.5\n2,not_a_long,0.7\n";
    let mut source = CsvSource::from_reader(input.as_bytes(), fields(&["Run", "EvNbr", "E1"]));
    source.bind(&store).unwrap();

    assert!(source.next_record(&mut store).unwrap());
    let msg = source.next_record(&mut store).unwrap_err().to_string();
    assert!(msg.contains("failed to parse value"));
    assert!(msg.contains("record 3"));
    assert!(msg.contains("field 'EvNbr'"));
}

#[test]
fn csv_source_rejects_empty_cells() {
    let mut store = event_store();
    let mut source = CsvSource::from_reader("Run,E1\n1,\n".as_bytes(), fields(&["Run", "E1"]));
    source.bind(&store).unwrap();
    match source.next_record(&mut store) {
        Err(AnalysisError::ParseError { record, field, .. }) => {
            assert_eq!(record, 2);
            assert_eq!(field, "E1");
        }
        other => panic!("unexpected result {other:?}"),
    }
}
