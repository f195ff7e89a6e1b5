use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::Sweep;

/// Source column holding the applied voltage (matched case-insensitively).
pub const VOLTAGE_COLUMN: &str = "voltage";
/// Source column holding the measured displacement (matched case-insensitively).
pub const DISPLACEMENT_COLUMN: &str = "displacement";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sweep from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – worksheet `sheet`, header in the first row
/// * `.csv`     – header row with `voltage` and `displacement` columns
/// * `.json`    – `[{ "voltage": 0.0, "displacement": 0.0 }, ...]`
/// * `.parquet` – numeric `voltage` and `displacement` columns
///
/// `sheet` is only consulted for spreadsheet formats.
pub fn load_file(path: &Path, sheet: &str) -> Result<Sweep> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let sweep = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_spreadsheet(path, sheet),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!("Loaded {sweep}");
    Ok(sweep)
}

/// Find the voltage and displacement columns in a header row.
///
/// Names are compared after lower-casing, so `Voltage`, `VOLTAGE` and
/// `voltage` all match. Every other column is ignored.
fn locate_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<(usize, usize)> {
    let lowered: Vec<String> = headers
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let v_idx = lowered
        .iter()
        .position(|h| h == VOLTAGE_COLUMN)
        .with_context(|| format!("missing '{VOLTAGE_COLUMN}' column (found {lowered:?})"))?;
    let x_idx = lowered
        .iter()
        .position(|h| h == DISPLACEMENT_COLUMN)
        .with_context(|| format!("missing '{DISPLACEMENT_COLUMN}' column (found {lowered:?})"))?;
    Ok((v_idx, x_idx))
}

/// Parse a textual cell. Blank text is a missing value.
fn parse_number(s: &str, row: usize, col: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path, sheet: &str) -> Result<Sweep> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("reading worksheet '{sheet}'"))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .context("worksheet is empty")?
        .iter()
        .map(|c| c.to_string())
        .collect();
    let (v_idx, x_idx) = locate_columns(header.iter().map(String::as_str))?;

    let mut voltage = Vec::new();
    let mut displacement = Vec::new();
    for (row_no, row) in rows.enumerate() {
        voltage.push(cell_to_f64(row.get(v_idx), row_no, VOLTAGE_COLUMN)?);
        displacement.push(cell_to_f64(row.get(x_idx), row_no, DISPLACEMENT_COLUMN)?);
    }

    let source = format!("{} [{sheet}]", path.display());
    Ok(Sweep::from_columns(&voltage, &displacement, source))
}

fn cell_to_f64(cell: Option<&Data>, row: usize, col: &str) -> Result<f64> {
    match cell {
        None | Some(Data::Empty) => Ok(f64::NAN),
        Some(Data::Float(f)) => Ok(*f),
        Some(Data::Int(i)) => Ok(*i as f64),
        Some(Data::String(s)) => parse_number(s, row, col),
        Some(other) => bail!("Row {row}, {col}: unsupported cell value {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Sweep> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let (v_idx, x_idx) = locate_columns(headers.iter())?;

    let mut voltage = Vec::new();
    let mut displacement = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        voltage.push(parse_number(record.get(v_idx).unwrap_or(""), row_no, VOLTAGE_COLUMN)?);
        displacement.push(parse_number(
            record.get(x_idx).unwrap_or(""),
            row_no,
            DISPLACEMENT_COLUMN,
        )?);
    }

    Ok(Sweep::from_columns(&voltage, &displacement, path.display().to_string()))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Voltage": 0.0, "Displacement": 0.12 },
///   ...
/// ]
/// ```
///
/// A record without one of the keys (or with `null`) contributes a missing
/// value; a key that no record carries is a schema error.
fn load_json(path: &Path) -> Result<Sweep> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut voltage = Vec::with_capacity(records.len());
    let mut displacement = Vec::with_capacity(records.len());
    let mut seen = (false, false);

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut v = f64::NAN;
        let mut x = f64::NAN;
        for (key, val) in obj {
            match key.trim().to_lowercase().as_str() {
                VOLTAGE_COLUMN => {
                    seen.0 = true;
                    v = json_to_f64(val, i, VOLTAGE_COLUMN)?;
                }
                DISPLACEMENT_COLUMN => {
                    seen.1 = true;
                    x = json_to_f64(val, i, DISPLACEMENT_COLUMN)?;
                }
                _ => {}
            }
        }
        voltage.push(v);
        displacement.push(x);
    }

    if !records.is_empty() {
        if !seen.0 {
            bail!("missing '{VOLTAGE_COLUMN}' column");
        }
        if !seen.1 {
            bail!("missing '{DISPLACEMENT_COLUMN}' column");
        }
    }

    Ok(Sweep::from_columns(&voltage, &displacement, path.display().to_string()))
}

fn json_to_f64(val: &JsonValue, row: usize, col: &str) -> Result<f64> {
    match val {
        JsonValue::Null => Ok(f64::NAN),
        JsonValue::Number(n) => n
            .as_f64()
            .with_context(|| format!("Row {row}, {col}: {n} is out of range")),
        JsonValue::String(s) => parse_number(s, row, col),
        other => bail!("Row {row}, {col}: expected a number, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one row per sample.
///
/// `voltage` and `displacement` may be any numeric Arrow type; they are cast
/// to Float64. Nulls become missing values. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Sweep> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut voltage = Vec::new();
    let mut displacement = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let (v_idx, x_idx) = locate_columns(schema.fields().iter().map(|f| f.name().as_str()))?;

        voltage.extend(column_as_f64(batch.column(v_idx)).context(VOLTAGE_COLUMN)?);
        displacement.extend(column_as_f64(batch.column(x_idx)).context(DISPLACEMENT_COLUMN)?);
    }

    Ok(Sweep::from_columns(&voltage, &displacement, path.display().to_string()))
}

/// Cast a numeric Arrow column to `Vec<f64>`, mapping nulls to `NaN`.
fn column_as_f64(col: &dyn Array) -> Result<Vec<f64>> {
    if !col.data_type().is_numeric() {
        bail!("expected a numeric column, got {:?}", col.data_type());
    }
    let casted = cast(col, &DataType::Float64).context("casting to Float64")?;
    Ok(casted
        .as_primitive::<Float64Type>()
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_columns_match_case_insensitively() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            temp_dir.path(),
            "loop.csv",
            "Time,VOLTAGE,Displacement\n0,0.0,0.5\n1,1.5,0.25\n2,,1.0\n",
        );

        let sweep = load_file(&path, "Sheet1").unwrap();
        assert_eq!(sweep.len(), 3);
        assert_eq!(sweep.samples()[1].voltage, 1.5);
        assert_eq!(sweep.samples()[1].displacement, 0.25);
        assert!(sweep.samples()[2].voltage.is_nan());
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "loop.csv", "voltage,strain\n0.0,0.5\n");

        let err = load_file(&path, "Sheet1").unwrap_err();
        assert!(format!("{err:#}").contains("displacement"));
    }

    #[test]
    fn csv_malformed_cell_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "loop.csv", "voltage,displacement\nabc,0.5\n");

        assert!(load_file(&path, "Sheet1").is_err());
    }

    #[test]
    fn json_records_with_nulls() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            temp_dir.path(),
            "loop.json",
            r#"[{"Voltage": 0.5, "displacement": 1.0}, {"voltage": null, "displacement": 2}]"#,
        );

        let sweep = load_file(&path, "Sheet1").unwrap();
        assert_eq!(sweep.len(), 2);
        assert_eq!(sweep.samples()[0].voltage, 0.5);
        assert!(sweep.samples()[1].voltage.is_nan());
        assert_eq!(sweep.samples()[1].displacement, 2.0);
    }

    #[test]
    fn json_without_displacement_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "loop.json", r#"[{"voltage": 0.5}]"#);

        assert!(load_file(&path, "Sheet1").is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "loop.txt", "voltage,displacement\n");

        let err = load_file(&path, "Sheet1").unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hyster4.xlsx");

        assert!(load_file(&path, "Sheet1").is_err());
    }

    fn workbook_fixture() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/hyster4.xlsx")
    }

    #[test]
    fn workbook_sheet_loads_with_mixed_case_headers() {
        // Header row: Time, VOLTAGE, Displacement.
        let sweep = load_file(&workbook_fixture(), "Sheet1").unwrap();
        assert_eq!(sweep.len(), 11);
        assert!(sweep.source.ends_with("[Sheet1]"));
        assert_eq!(sweep.samples()[1], crate::data::model::Sample::new(1.0, -0.3));
        assert_eq!(sweep.samples()[7], crate::data::model::Sample::new(-2.0, -2.0));

        use crate::analysis::regions::{Region, RegionKind, partition};
        let part = partition(&sweep, 0.1);
        assert_eq!(part.n1, Ok(Region::new(RegionKind::N1, 0, 2)));
        assert_eq!(part.p1, Ok(Region::new(RegionKind::P1, 3, 5)));
        assert_eq!(part.p2, Ok(Region::new(RegionKind::P2, 6, 7)));
        assert_eq!(part.n2, Ok(Region::new(RegionKind::N2, 8, 10)));
    }

    #[test]
    fn workbook_missing_sheet_names_the_sheet() {
        let err = load_file(&workbook_fixture(), "Nope").unwrap_err();
        assert!(format!("{err:#}").contains("'Nope'"));
    }

    #[test]
    fn spreadsheet_cells_convert_to_floats() {
        assert_eq!(cell_to_f64(Some(&Data::Int(3)), 0, "voltage").unwrap(), 3.0);
        assert_eq!(cell_to_f64(Some(&Data::Float(0.25)), 0, "voltage").unwrap(), 0.25);
        assert!(cell_to_f64(Some(&Data::Empty), 0, "voltage").unwrap().is_nan());
        assert!(cell_to_f64(None, 0, "voltage").unwrap().is_nan());
        assert_eq!(
            cell_to_f64(Some(&Data::String(" 1.5 ".into())), 0, "voltage").unwrap(),
            1.5
        );
        assert!(cell_to_f64(Some(&Data::Bool(true)), 0, "voltage").is_err());
    }
}
