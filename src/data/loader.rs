use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::clean::clean;
use super::model::{RawVehicleRecord, VehicleTable};
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Source description
// ---------------------------------------------------------------------------

/// Where the listings come from. Fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// CSV served over HTTP(S).
    Remote(String),
    /// Local `.csv` or `.parquet` file.
    File(PathBuf),
}

impl DataSource {
    /// Interpret a configured location: anything with an http(s) scheme is
    /// remote, everything else is a local path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Remote(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch, parse and clean the listings dataset.
///
/// Remote sources are parsed as CSV. Local files dispatch by extension:
/// * `.csv`             – header row with the listing columns
/// * `.parquet` / `.pq` – one column per listing field, cast as needed
pub fn load_dataset(source: &DataSource, timeout: Duration) -> Result<VehicleTable, DataLoadError> {
    let raw = match source {
        DataSource::Remote(url) => read_csv(fetch(url, timeout)?)?,
        DataSource::File(path) => read_file(path)?,
    };
    log::debug!("Read {} raw listings from {source}", raw.len());
    clean(raw)
}

fn read_file(path: &Path) -> Result<Vec<RawVehicleRecord>, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(std::fs::File::open(path)?),
        "parquet" | "pq" => read_parquet(path),
        _ => Err(DataLoadError::UnsupportedSource(path.display().to_string())),
    }
}

fn fetch(url: &str, timeout: Duration) -> Result<impl Read, DataLoadError> {
    let client = reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(5).min(timeout))
        .timeout(timeout)
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Columns are matched by header name; extra columns are ignored and empty
/// cells become `None`.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawVehicleRecord>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawVehicleRecord>() {
        rows.push(result?);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Works with files written by Pandas (`df.to_parquet()`) and Polars. Numeric
/// and boolean columns are cast to Float64, everything else to Utf8; a
/// column absent from the schema reads as all-null.
fn read_parquet(path: &Path) -> Result<Vec<RawVehicleRecord>, DataLoadError> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        let columns = BatchColumns::new(&batch)?;
        for row in 0..batch.num_rows() {
            rows.push(columns.row(row));
        }
    }
    Ok(rows)
}

/// The listing columns of one record batch, cast to the reader's types.
struct BatchColumns {
    price: Option<Float64Array>,
    model_year: Option<Float64Array>,
    model: Option<StringArray>,
    condition: Option<StringArray>,
    cylinders: Option<Float64Array>,
    fuel: Option<StringArray>,
    odometer: Option<Float64Array>,
    transmission: Option<StringArray>,
    vehicle_type: Option<StringArray>,
    paint_color: Option<StringArray>,
    is_4wd: Option<Float64Array>,
    date_posted: Option<StringArray>,
}

impl BatchColumns {
    fn new(batch: &RecordBatch) -> Result<Self, DataLoadError> {
        Ok(BatchColumns {
            price: float_column(batch, "price")?,
            model_year: float_column(batch, "model_year")?,
            model: string_column(batch, "model")?,
            condition: string_column(batch, "condition")?,
            cylinders: float_column(batch, "cylinders")?,
            fuel: string_column(batch, "fuel")?,
            odometer: float_column(batch, "odometer")?,
            transmission: string_column(batch, "transmission")?,
            vehicle_type: string_column(batch, "type")?,
            paint_color: string_column(batch, "paint_color")?,
            is_4wd: float_column(batch, "is_4wd")?,
            date_posted: string_column(batch, "date_posted")?,
        })
    }

    fn row(&self, i: usize) -> RawVehicleRecord {
        RawVehicleRecord {
            price: float_at(&self.price, i),
            model_year: float_at(&self.model_year, i),
            model: string_at(&self.model, i),
            condition: string_at(&self.condition, i),
            cylinders: float_at(&self.cylinders, i),
            fuel: string_at(&self.fuel, i),
            odometer: float_at(&self.odometer, i),
            transmission: string_at(&self.transmission, i),
            vehicle_type: string_at(&self.vehicle_type, i),
            paint_color: string_at(&self.paint_color, i),
            is_4wd: float_at(&self.is_4wd, i),
            date_posted: string_at(&self.date_posted, i),
        }
    }
}

fn cast_column(batch: &RecordBatch, name: &str, to: &DataType) -> Result<Option<ArrayRef>, DataLoadError> {
    let Ok(idx) = batch.schema().index_of(name) else {
        return Ok(None);
    };
    Ok(Some(cast(batch.column(idx).as_ref(), to)?))
}

fn float_column(batch: &RecordBatch, name: &str) -> Result<Option<Float64Array>, DataLoadError> {
    let Some(array) = cast_column(batch, name, &DataType::Float64)? else {
        return Ok(None);
    };
    Ok(array.as_any().downcast_ref::<Float64Array>().cloned())
}

fn string_column(batch: &RecordBatch, name: &str) -> Result<Option<StringArray>, DataLoadError> {
    let Some(array) = cast_column(batch, name, &DataType::Utf8)? else {
        return Ok(None);
    };
    Ok(array.as_any().downcast_ref::<StringArray>().cloned())
}

fn float_at(col: &Option<Float64Array>, i: usize) -> Option<f64> {
    col.as_ref().filter(|c| c.is_valid(i)).map(|c| c.value(i))
}

fn string_at(col: &Option<StringArray>, i: usize) -> Option<String> {
    col.as_ref()
        .filter(|c| c.is_valid(i))
        .map(|c| c.value(i).to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;

    const SAMPLE_CSV: &str = "\
price,model_year,model,condition,cylinders,fuel,odometer,transmission,type,paint_color,is_4wd,date_posted,days_listed
9400,2011.0,bmw x5,good,6.0,gas,145000.0,automatic,SUV,,1.0,2018-06-23,19
25500,,ford f-150,good,6.0,gas,88705.0,automatic,pickup,white,1.0,2018-10-19,50
5500,2013.0,hyundai sonata,like new,4.0,gas,110000.0,automatic,sedan,red,,2019-02-07,79
1500,2003.0,ford f-150,fair,8.0,gas,,automatic,pickup,,,2019-03-22,9
";

    #[test]
    fn source_scheme_decides_remote_or_file() {
        assert_eq!(
            DataSource::parse("https://example.com/vehicles.csv"),
            DataSource::Remote("https://example.com/vehicles.csv".into())
        );
        assert_eq!(
            DataSource::parse(" data/vehicles.csv "),
            DataSource::File(PathBuf::from("data/vehicles.csv"))
        );
    }

    #[test]
    fn csv_rows_keep_gaps_as_none() {
        let rows = read_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].paint_color, None);
        assert_eq!(rows[0].vehicle_type.as_deref(), Some("SUV"));
        assert_eq!(rows[1].model_year, None);
        assert_eq!(rows[2].is_4wd, None);
        assert_eq!(rows[3].odometer, None);
    }

    #[test]
    fn csv_file_loads_and_cleans() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();

        let source = DataSource::File(file.path().to_path_buf());
        let table = load_dataset(&source, Duration::from_secs(1)).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.records[0].model, "BMW x5");
        assert_eq!(table.records[0].paint_color, "unknown");
        // Same raw group ("ford f-150") supplies the missing values.
        assert_eq!(table.records[1].model_year, 2003.0);
        assert_eq!(table.records[3].odometer, 88705.0);
        assert_eq!(table.models, vec!["BMW x5", "Ford f-150", "Hyundai sonata"]);
    }

    #[test]
    fn boolean_words_in_is_4wd_are_flags() {
        let text = "\
price,model_year,model,condition,cylinders,fuel,odometer,transmission,type,paint_color,is_4wd,date_posted
9000,2012,jeep wrangler,good,6,gas,90000,automatic,SUV,black,true,2018-07-01
8000,2011,jeep wrangler,fair,6,gas,120000,manual,SUV,,False,2018-08-01
7000,2010,jeep wrangler,fair,6,gas,130000,manual,SUV,,,2018-09-01
";
        let rows = read_csv(text.as_bytes()).unwrap();
        assert_eq!(rows[0].is_4wd, Some(1.0));
        assert_eq!(rows[1].is_4wd, Some(0.0));
        assert_eq!(rows[2].is_4wd, None);

        let table = clean(rows).unwrap();
        let flags: Vec<bool> = table.records.iter().map(|r| r.is_4wd).collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn unreadable_flags_are_csv_errors() {
        let text = "price,model,is_4wd\n100,ford focus,maybe\n";
        assert!(matches!(
            read_csv(text.as_bytes()).unwrap_err(),
            DataLoadError::Csv(_)
        ));
    }

    /// Serve one HTTP response on a loopback port and return its URL.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        use std::io::{BufRead, BufReader};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
        });
        format!("http://{addr}/vehicles_us.csv")
    }

    #[test]
    fn remote_csv_is_fetched_and_cleaned() {
        let url = serve_once("200 OK", SAMPLE_CSV);
        let source = DataSource::parse(&url);
        assert!(matches!(source, DataSource::Remote(_)));

        let table = load_dataset(&source, Duration::from_secs(10)).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.records[1].model, "Ford f-150");
        assert_eq!(table.records[1].model_year, 2003.0);
    }

    #[test]
    fn remote_error_status_is_an_http_error() {
        let url = serve_once("404 Not Found", "missing");
        let err = load_dataset(&DataSource::Remote(url), Duration::from_secs(10)).unwrap_err();
        match err {
            DataLoadError::Http(e) => assert_eq!(e.status(), Some(reqwest::StatusCode::NOT_FOUND)),
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        let source = DataSource::File(PathBuf::from("vehicles.xlsx"));
        let err = load_dataset(&source, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedSource(_)));
    }

    #[test]
    fn missing_files_surface_io_errors() {
        let source = DataSource::File(PathBuf::from("/definitely/not/here.csv"));
        let err = load_dataset(&source, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }

    #[test]
    fn malformed_numbers_are_csv_errors() {
        let text = "price,model,condition,fuel,transmission,type,date_posted\n\
                    cheap,ford focus,good,gas,manual,sedan,2019-01-01\n";
        assert!(matches!(
            read_csv(text.as_bytes()).unwrap_err(),
            DataLoadError::Csv(_)
        ));
    }

    #[test]
    fn parquet_columns_are_cast_to_listing_fields() {
        use arrow::array::{BooleanArray, Int64Array};
        use arrow::datatypes::{Field, Schema};
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("price", DataType::Int64, false),
            Field::new("model_year", DataType::Float64, true),
            Field::new("model", DataType::Utf8, false),
            Field::new("condition", DataType::Utf8, false),
            Field::new("fuel", DataType::Utf8, false),
            Field::new("odometer", DataType::Float64, true),
            Field::new("transmission", DataType::Utf8, false),
            Field::new("type", DataType::Utf8, false),
            Field::new("is_4wd", DataType::Boolean, true),
            Field::new("date_posted", DataType::Utf8, false),
            Field::new("cylinders", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![12000, 8000])),
                Arc::new(Float64Array::from(vec![Some(2014.0), None])),
                Arc::new(StringArray::from(vec!["toyota camry", "toyota camry"])),
                Arc::new(StringArray::from(vec!["excellent", "good"])),
                Arc::new(StringArray::from(vec!["gas", "gas"])),
                Arc::new(Float64Array::from(vec![Some(60000.0), Some(90000.0)])),
                Arc::new(StringArray::from(vec!["automatic", "automatic"])),
                Arc::new(StringArray::from(vec!["sedan", "sedan"])),
                Arc::new(BooleanArray::from(vec![Some(true), None])),
                Arc::new(StringArray::from(vec!["2018-05-01", "2019-01-15"])),
                Arc::new(Float64Array::from(vec![Some(4.0), Some(4.0)])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.as_file().try_clone().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let source = DataSource::File(file.path().to_path_buf());
        let table = load_dataset(&source, Duration::from_secs(1)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].price, 12000.0);
        assert!(table.records[0].is_4wd);
        assert!(!table.records[1].is_4wd);
        assert_eq!(table.records[1].model_year, 2014.0);
        assert_eq!(table.records[0].paint_color, "unknown");
        assert_eq!(table.records[0].model, "Toyota camry");
    }
}
