use std::path::Path;

use arrow::array::{Array, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    cell_value, ColumnPresence, RawRecord, RawTable, ABSTRACT, AUTHORS, JOURNAL, PUBLISH_TIME,
    SOURCE_COLUMNS, TITLE,
};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a metadata table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` (or anything unrecognised) – comma-delimited with a header row
/// * `.tsv` / `.tab` – tab-delimited with a header row
/// * `.json` – `[{ "title": ..., "abstract": ..., ... }, ...]`
/// * `.parquet` – any column Arrow can cast to text, named as in the CSV
///
/// Only `title` is mandatory.  Extra columns are ignored.
pub fn load_file(path: &Path) -> Result<RawTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "tsv" | "tab" => load_delimited(path, b'\t')?,
        _ => load_delimited(path, b',')?,
    };

    if !table.present.title {
        return Err(LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: TITLE,
        });
    }
    for column in table.present.missing_optional() {
        log::warn!("{}: column '{column}' not present, treating it as empty", path.display());
    }

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

/// Header position of each recognised column.
#[derive(Debug, Default)]
struct ColumnIndex {
    title: Option<usize>,
    abstract_text: Option<usize>,
    authors: Option<usize>,
    journal: Option<usize>,
    publish_time: Option<usize>,
    source: Option<usize>,
}

impl ColumnIndex {
    fn new(headers: &[String]) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            title: find(TITLE),
            abstract_text: find(ABSTRACT),
            authors: find(AUTHORS),
            journal: find(JOURNAL),
            publish_time: find(PUBLISH_TIME),
            source: SOURCE_COLUMNS.iter().find_map(|c| find(*c)),
        }
    }

    fn positions(&self) -> impl Iterator<Item = usize> {
        [
            self.title,
            self.abstract_text,
            self.authors,
            self.journal,
            self.publish_time,
            self.source,
        ]
        .into_iter()
        .flatten()
    }

    /// Build a record by looking each recognised column up through `cell`.
    fn record(&self, cell: impl Fn(usize) -> Option<String>) -> RawRecord {
        let get = |idx: Option<usize>| idx.and_then(&cell);
        RawRecord {
            title: get(self.title),
            abstract_text: get(self.abstract_text),
            authors: get(self.authors),
            journal: get(self.journal),
            publish_time: get(self.publish_time),
            source: get(self.source),
        }
    }
}

// ---------------------------------------------------------------------------
// Delimited (CSV / TSV) loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: u8) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| io_or_csv(path, 0, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|_| LoadError::MalformedHeader(path.to_path_buf()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::MalformedHeader(path.to_path_buf()));
    }

    let index = ColumnIndex::new(&headers);
    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        // +2: one for the header line, one for 1-based numbering
        let record = result.map_err(|e| io_or_csv(path, row_no + 2, e))?;
        records.push(index.record(|i| record.get(i).and_then(cell_value)));
    }

    Ok(RawTable {
        records,
        present: ColumnPresence::from_headers(&headers),
        column_names: headers,
    })
}

fn io_or_csv(path: &Path, row: usize, err: csv::Error) -> LoadError {
    if let csv::ErrorKind::Io(source) = err.kind() {
        return LoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(source.kind(), source.to_string()),
        };
    }
    LoadError::Csv {
        path: path.to_path_buf(),
        row,
        source: err,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "...", "abstract": null, "journal": "Nature", "publish_time": "2020-03-15" },
///   ...
/// ]
/// ```
///
/// The header is the union of keys across all records.
fn load_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| LoadError::json(path, format!("parsing JSON: {e}")))?;

    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::json(path, "expected a top-level JSON array"))?;

    let mut objects = Vec::with_capacity(rows.len());
    let mut headers: Vec<String> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::json(path, format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    // One source column for the whole table, as with CSV and Parquet.
    let source_key = SOURCE_COLUMNS
        .iter()
        .copied()
        .find(|c| headers.iter().any(|h| h == c));

    let records = objects
        .into_iter()
        .map(|obj| {
            let field = |name: &str| obj.get(name).and_then(json_to_text);
            RawRecord {
                title: field(TITLE),
                abstract_text: field(ABSTRACT),
                authors: field(AUTHORS),
                journal: field(JOURNAL),
                publish_time: field(PUBLISH_TIME),
                source: source_key.and_then(field),
            }
        })
        .collect();

    if headers.is_empty() && !rows.is_empty() {
        return Err(LoadError::MalformedHeader(path.to_path_buf()));
    }

    Ok(RawTable {
        records,
        present: ColumnPresence::from_headers(&headers),
        column_names: headers,
    })
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => cell_value(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the metadata table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  Every recognised column is cast to
/// `Utf8` first, so categoricals (dictionary-encoded), string views, dates
/// and numbers all read as text.  A `Date32` renders as `YYYY-MM-DD`.
fn load_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| LoadError::parquet(path, format!("reading parquet metadata: {e}")))?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    if headers.is_empty() {
        return Err(LoadError::MalformedHeader(path.to_path_buf()));
    }

    let reader = builder
        .build()
        .map_err(|e| LoadError::parquet(path, format!("building parquet reader: {e}")))?;

    let index = ColumnIndex::new(&headers);
    let mut warned = vec![false; headers.len()];
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| LoadError::parquet(path, format!("reading record batch: {e}")))?;

        let mut text: Vec<Option<StringArray>> = vec![None; batch.num_columns()];
        for col in index.positions() {
            match text_column(&batch, col) {
                Ok(array) => text[col] = Some(array),
                Err(message) if Some(col) == index.title => {
                    return Err(LoadError::parquet(path, message));
                }
                Err(message) => {
                    if !warned[col] {
                        log::warn!("{}: {message}, treating it as empty", path.display());
                        warned[col] = true;
                    }
                }
            }
        }

        for row in 0..batch.num_rows() {
            records.push(index.record(|col| {
                text.get(col)?
                    .as_ref()
                    .filter(|a| a.is_valid(row))
                    .and_then(|a| cell_value(a.value(row)))
            }));
        }
    }

    Ok(RawTable {
        records,
        present: ColumnPresence::from_headers(&headers),
        column_names: headers,
    })
}

/// Column `col` of `batch` cast to `Utf8`.
fn text_column(batch: &RecordBatch, col: usize) -> Result<StringArray, String> {
    let name = batch.schema().field(col).name().clone();
    let column = batch.column(col);
    let text = cast(column, &DataType::Utf8).map_err(|e| {
        format!(
            "column '{name}' of type {} cannot be read as text: {e}",
            column.data_type()
        )
    })?;
    text.as_string_opt::<i32>()
        .cloned()
        .ok_or_else(|| format!("column '{name}' did not cast to a string array"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Date32Array, DictionaryArray, Float64Array, Int64Array};
    use arrow::datatypes::{Field, Int32Type, Schema};
    use parquet::arrow::ArrowWriter;

    fn write_parquet(batch: &RecordBatch) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        (dir, path)
    }

    fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn csv_reads_known_columns_and_ignores_extras() {
        let (_dir, path) = write_temp(
            "metadata.csv",
            "cord_uid,title,abstract,authors,journal,publish_time,source_x\n\
             x1,Novel Coronavirus Study,,,Nature,2020-03-15,PMC\n\
             x2,,Some abstract,\"Doe, J.\",NA,2019,Medline\n",
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.present.source);
        assert_eq!(table.column_names.len(), 7);

        let first = &table.records[0];
        assert_eq!(first.title.as_deref(), Some("Novel Coronavirus Study"));
        assert_eq!(first.abstract_text, None);
        assert_eq!(first.authors, None);
        assert_eq!(first.journal.as_deref(), Some("Nature"));
        assert_eq!(first.source.as_deref(), Some("PMC"));

        let second = &table.records[1];
        assert_eq!(second.title, None);
        assert_eq!(second.authors.as_deref(), Some("Doe, J."));
        assert_eq!(second.journal, None);
    }

    #[test]
    fn short_rows_read_as_null() {
        let (_dir, path) = write_temp("short.csv", "title,journal,publish_time\nOnly Title\n");
        let table = load_file(&path).unwrap();
        assert_eq!(table.records[0].title.as_deref(), Some("Only Title"));
        assert_eq!(table.records[0].journal, None);
        assert_eq!(table.records[0].publish_time, None);
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let (_dir, path) = write_temp("metadata.tsv", "title\tjournal\nA, B and C\tLancet\n");
        let table = load_file(&path).unwrap();
        assert_eq!(table.records[0].title.as_deref(), Some("A, B and C"));
        assert_eq!(table.records[0].journal.as_deref(), Some("Lancet"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn empty_file_has_no_header() {
        let (_dir, path) = write_temp("empty.csv", "");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MalformedHeader(_)), "{err}");
    }

    #[test]
    fn missing_title_column_is_fatal() {
        let (_dir, path) = write_temp("notitle.csv", "abstract,journal\nx,y\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: "title", .. }));
    }

    #[test]
    fn json_records() {
        let (_dir, path) = write_temp(
            "metadata.json",
            r#"[{"title": "A", "abstract": null, "journal": "Cell", "publish_time": 2020},
                {"title": "", "authors": "Roe"}]"#,
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].publish_time.as_deref(), Some("2020"));
        assert_eq!(table.records[0].abstract_text, None);
        assert_eq!(table.records[1].title, None);
        assert!(table.present.authors);
        assert!(!table.present.source);
    }

    #[test]
    fn json_must_be_array() {
        let (_dir, path) = write_temp("bad.json", r#"{"title": "A"}"#);
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    #[test]
    fn json_source_column_is_chosen_per_table() {
        let (_dir, path) = write_temp(
            "metadata.json",
            r#"[{"title": "A", "source_x": null, "source": "PMC"},
                {"title": "B", "source_x": "Medline"}]"#,
        );
        let table = load_file(&path).unwrap();
        assert!(table.present.source);
        assert_eq!(table.records[0].source, None);
        assert_eq!(table.records[1].source.as_deref(), Some("Medline"));
    }

    #[test]
    fn parquet_round_trip() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, true),
            Field::new("publish_time", DataType::Date32, true),
            Field::new("year_hint", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("A"), None])),
                // 18336 days after the epoch is 2020-03-15
                Arc::new(Date32Array::from(vec![Some(18336), None])),
                Arc::new(Int64Array::from(vec![Some(2020), Some(2021)])),
            ],
        )
        .unwrap();
        let (_dir, path) = write_parquet(&batch);

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].title.as_deref(), Some("A"));
        assert_eq!(table.records[0].publish_time.as_deref(), Some("2020-03-15"));
        assert_eq!(table.records[1].title, None);
        assert_eq!(table.column_names, vec!["title", "publish_time", "year_hint"]);
    }

    #[test]
    fn parquet_dictionary_columns_read_as_text() {
        let dictionary = || DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
        let schema = Arc::new(Schema::new(vec![
            Field::new("title", dictionary(), true),
            Field::new("journal", dictionary(), true),
            Field::new("score", DataType::Float64, true),
        ]));
        let titles: DictionaryArray<Int32Type> =
            vec![Some("Novel Coronavirus Study"), Some("Masks"), None]
                .into_iter()
                .collect();
        let journals: DictionaryArray<Int32Type> =
            vec![Some("Nature"), Some("Nature"), Some("Cell")].into_iter().collect();
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(titles),
                Arc::new(journals),
                Arc::new(Float64Array::from(vec![0.5, 1.0, 2.0])),
            ],
        )
        .unwrap();
        let (_dir, path) = write_parquet(&batch);

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0].title.as_deref(), Some("Novel Coronavirus Study"));
        assert_eq!(table.records[1].title.as_deref(), Some("Masks"));
        assert_eq!(table.records[2].title, None);
        assert_eq!(table.records[2].journal.as_deref(), Some("Cell"));
    }
}
