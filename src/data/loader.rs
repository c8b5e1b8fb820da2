use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::filter::filter_by_radius;
use super::model::{Material, Measurement, MeasurementSet, WideRow};
use crate::error::ScreenError;

pub const WAVELENGTH_COLUMN: &str = "wavelength_nm";
pub const RADIUS_COLUMN: &str = "radius_nm";

/// Header spellings accepted for the wavelength column.
const WAVELENGTH_ALIASES: [&str; 2] = ["lambda", WAVELENGTH_COLUMN];
/// Header spellings accepted for the radius column.
const RADIUS_ALIASES: [&str; 2] = ["radius (nm)", RADIUS_COLUMN];

/// A dataset whose largest transmission exceeds this is taken to be in percent.
pub const PERCENT_DETECTION_LIMIT: f64 = 1.5;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load, reshape, normalise and radius-filter a measurement file.
pub fn load_measurements(path: &Path, max_radius_nm: f64) -> Result<MeasurementSet> {
    let rows = load_file(path).with_context(|| format!("loading {}", path.display()))?;
    log::info!("Read {} wide rows from {}", rows.len(), path.display());

    let mut dataset = melt(&rows);
    if normalize_percentages(&mut dataset) {
        log::info!("Transmission given in percent; scaled to fractions");
    }
    Ok(filter_by_radius(dataset, max_radius_nm))
}

/// Read the wide table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – title row, header row, then one row per (wavelength, radius)
/// * `.parquet` – the same columns, no title row
pub fn load_file(path: &Path) -> Result<Vec<WideRow>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(ScreenError::UnsupportedFormat(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// Reshaping
// ---------------------------------------------------------------------------

/// Unpivot wide rows into long form: all rows for `Fe` first, then
/// `Fe2O3`, then `Fe3O4`, each block in input row order.
pub fn melt(rows: &[WideRow]) -> MeasurementSet {
    let measurements = Material::ALL
        .iter()
        .enumerate()
        .flat_map(|(k, &material)| {
            rows.iter().map(move |row| Measurement {
                wavelength_nm: row.wavelength_nm,
                radius_nm: row.radius_nm,
                material,
                transmission: row.transmission[k],
            })
        })
        .collect();
    MeasurementSet::new(measurements)
}

/// Divide every transmission by 100 when the dataset-wide maximum exceeds
/// [`PERCENT_DETECTION_LIMIT`].  Returns whether scaling was applied.
pub fn normalize_percentages(dataset: &mut MeasurementSet) -> bool {
    let Some((_, max)) = dataset.transmission_range() else {
        return false;
    };
    if max <= PERCENT_DETECTION_LIMIT {
        return false;
    }
    for m in &mut dataset.measurements {
        m.transmission /= 100.0;
    }
    true
}

// ---------------------------------------------------------------------------
// Column lookup
// ---------------------------------------------------------------------------

/// Positions of the wavelength, radius and material columns in a header.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    wavelength: usize,
    radius: usize,
    materials: [usize; 3],
}

impl ColumnIndex {
    /// Header names are compared after trimming surrounding whitespace.
    fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, ScreenError> {
        let find = |aliases: &[&str], canonical: &str| {
            headers
                .iter()
                .position(|h| aliases.contains(&h.as_ref().trim()))
                .ok_or_else(|| ScreenError::MissingColumn(canonical.to_string()))
        };

        let wavelength = find(&WAVELENGTH_ALIASES, WAVELENGTH_COLUMN)?;
        let radius = find(&RADIUS_ALIASES, RADIUS_COLUMN)?;
        let mut materials = [0; 3];
        for (slot, material) in materials.iter_mut().zip(Material::ALL) {
            *slot = headers
                .iter()
                .position(|h| h.as_ref().parse::<Material>() == Ok(material))
                .ok_or_else(|| ScreenError::MissingColumn(material.to_string()))?;
        }
        Ok(Self {
            wavelength,
            radius,
            materials,
        })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: an ignorable title row, the header row, then numeric rows.
/// Rows where every cell is blank are skipped.
fn load_csv(path: &Path) -> Result<Vec<WideRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;

    let mut records = reader.records();
    // Title row.
    records
        .next()
        .ok_or(ScreenError::MissingHeader)?
        .context("reading CSV title row")?;
    let header = records
        .next()
        .ok_or(ScreenError::MissingHeader)?
        .context("reading CSV header row")?;
    let headers: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (row_no, result) in records.enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            log::warn!("Skipping blank CSV row {row_no}");
            continue;
        }

        let cell = |idx: usize| parse_cell(record.get(idx).unwrap_or(""), row_no, &headers[idx]);
        let mut transmission = [0.0; 3];
        for (t, &idx) in transmission.iter_mut().zip(&columns.materials) {
            *t = cell(idx)?;
        }
        rows.push(WideRow {
            wavelength_nm: cell(columns.wavelength)?,
            radius_nm: cell(columns.radius)?,
            transmission,
        });
    }
    Ok(rows)
}

fn parse_cell(s: &str, row: usize, column: &str) -> Result<f64, ScreenError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| ScreenError::InvalidNumber {
            row,
            column: column.to_string(),
            value: s.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the wide table.
///
/// Every required column must be Int32, Int64, Float32 or Float64.
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Vec<WideRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let columns = ColumnIndex::from_headers(&names)?;
        let offset = rows.len();

        let value = |col_idx: usize, row: usize| -> Result<f64> {
            extract_f64(batch.column(col_idx), row)
                .with_context(|| format!("Row {}: failed to read '{}'", offset + row, names[col_idx]))
        };

        for row in 0..batch.num_rows() {
            let mut transmission = [0.0; 3];
            for (t, &idx) in transmission.iter_mut().zip(&columns.materials) {
                *t = value(idx, row)?;
            }
            let wide = WideRow {
                wavelength_nm: value(columns.wavelength, row)?,
                radius_nm: value(columns.radius, row)?,
                transmission,
            };
            rows.push(wide);
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

/// Extract one numeric cell as `f64`.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    anyhow::ensure!(!col.is_null(row), "null value in numeric column");

    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        other => anyhow::bail!("Expected a numeric column, got {other:?}"),
    };
    value.context("column data does not match its declared type")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::ArrayRef;

    use super::*;

    const HEADER: &str = "lambda , radius (nm),Fe,Fe2O3 ,Fe3O4";

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        write!(file, "{body}").unwrap();
        file.flush().unwrap();
        file
    }

    fn row(wavelength_nm: f64, radius_nm: f64, t: [f64; 3]) -> WideRow {
        WideRow {
            wavelength_nm,
            radius_nm,
            transmission: t,
        }
    }

    #[test]
    fn percent_row_melts_into_three_fractions() {
        let file = write_csv(&format!(
            "Iron transmission data,,,,\n{HEADER}\n500,10,95,80,60\n"
        ));
        let set = load_measurements(file.path(), 30.0).unwrap();

        let got: Vec<(f64, f64, Material, f64)> = set
            .measurements
            .iter()
            .map(|m| (m.wavelength_nm, m.radius_nm, m.material, m.transmission))
            .collect();
        let expected = [
            (500.0, 10.0, Material::Fe, 0.95),
            (500.0, 10.0, Material::Fe2O3, 0.80),
            (500.0, 10.0, Material::Fe3O4, 0.60),
        ];
        assert_eq!(got.len(), expected.len());
        for (g, e) in got.iter().zip(expected.iter()) {
            assert_eq!((g.0, g.1, g.2), (e.0, e.1, e.2));
            assert!((g.3 - e.3).abs() < 1e-9);
        }
    }

    #[test]
    fn row_count_is_three_per_wide_row_minus_filtered() {
        let file = write_csv(&format!(
            "title\n{HEADER}\n400,10,90,80,70\n400,30,91,81,71\n400,40,92,82,72\n500,50,93,83,73\n,,,,\n"
        ));
        let wide = load_file(file.path()).unwrap();
        assert_eq!(wide.len(), 4);

        let set = load_measurements(file.path(), 30.0).unwrap();
        assert_eq!(set.len(), wide.len() * 3 - 2 * 3);
        assert!(set.measurements.iter().all(|m| m.radius_nm <= 30.0));
        assert!(set
            .measurements
            .iter()
            .all(|m| (0.0..=1.0).contains(&m.transmission)));
    }

    #[test]
    fn fractional_data_is_left_alone() {
        let mut set = melt(&[row(500.0, 10.0, [0.9, 1.2, 0.1])]);
        assert!(!normalize_percentages(&mut set));
        assert_eq!(set.measurements[1].transmission, 1.2);
    }

    #[test]
    fn normalization_is_decided_from_the_global_maximum() {
        let mut set = melt(&[
            row(500.0, 10.0, [0.9, 0.8, 0.7]),
            row(510.0, 10.0, [90.0, 80.0, 70.0]),
        ]);
        assert!(normalize_percentages(&mut set));
        // Every row is scaled, including rows that were already fractions.
        assert!((set.measurements[0].transmission - 0.009).abs() < 1e-12);
        assert!((set.measurements[1].transmission - 0.9).abs() < 1e-12);
    }

    #[test]
    fn melt_orders_by_material_block() {
        let set = melt(&[row(400.0, 5.0, [1.0, 2.0, 3.0]), row(410.0, 5.0, [4.0, 5.0, 6.0])]);
        let order: Vec<(Material, f64)> = set
            .measurements
            .iter()
            .map(|m| (m.material, m.wavelength_nm))
            .collect();
        assert_eq!(
            order,
            vec![
                (Material::Fe, 400.0),
                (Material::Fe, 410.0),
                (Material::Fe2O3, 400.0),
                (Material::Fe2O3, 410.0),
                (Material::Fe3O4, 400.0),
                (Material::Fe3O4, 410.0),
            ]
        );
    }

    #[test]
    fn missing_material_column_is_named_in_the_error() {
        let file = write_csv("title\nlambda,radius (nm),Fe,Fe3O4\n500,10,95,60\n");
        let err = load_file(file.path()).unwrap_err();
        match err.downcast_ref::<ScreenError>() {
            Some(ScreenError::MissingColumn(name)) => assert_eq!(name, "Fe2O3"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn canonical_column_names_are_accepted() {
        let file = write_csv("title\nwavelength_nm,radius_nm,Fe,Fe2O3,Fe3O4\n500,10,0.9,0.8,0.6\n");
        let wide = load_file(file.path()).unwrap();
        assert_eq!(wide, vec![row(500.0, 10.0, [0.9, 0.8, 0.6])]);
    }

    #[test]
    fn non_numeric_cell_fails_fast() {
        let file = write_csv(&format!("title\n{HEADER}\n500,ten,95,80,60\n"));
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScreenError>(),
            Some(ScreenError::InvalidNumber { row: 0, .. })
        ));
    }

    #[test]
    fn file_without_header_is_rejected() {
        let file = write_csv("only a title\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScreenError>(),
            Some(ScreenError::MissingHeader)
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("measurements.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScreenError>(),
            Some(ScreenError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    // -- Parquet --

    fn write_parquet(columns: Vec<(&str, ArrayRef)>) -> tempfile::NamedTempFile {
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .unwrap();
        let out = std::fs::File::create(file.path()).unwrap();
        let mut writer = ArrowWriter::try_new(out, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn parquet_with_mixed_numeric_types_is_melted() {
        let file = write_parquet(vec![
            ("lambda", Arc::new(Int64Array::from(vec![500, 500])) as ArrayRef),
            ("radius (nm)", Arc::new(Float64Array::from(vec![10.0, 40.0])) as ArrayRef),
            ("Fe", Arc::new(Int32Array::from(vec![95, 90])) as ArrayRef),
            ("Fe2O3", Arc::new(Float32Array::from(vec![80.0f32, 70.0])) as ArrayRef),
            ("Fe3O4", Arc::new(Float64Array::from(vec![60.0, 50.0])) as ArrayRef),
        ]);

        let wide = load_file(file.path()).unwrap();
        assert_eq!(wide.len(), 2);
        assert_eq!(wide[1].radius_nm, 40.0);

        let set = load_measurements(file.path(), 30.0).unwrap();
        let expected = [
            (Material::Fe, 0.95),
            (Material::Fe2O3, 0.80),
            (Material::Fe3O4, 0.60),
        ];
        assert_eq!(set.len(), expected.len());
        for (m, (material, t)) in set.measurements.iter().zip(expected) {
            assert_eq!((m.wavelength_nm, m.radius_nm, m.material), (500.0, 10.0, material));
            assert!((m.transmission - t).abs() < 1e-9);
        }
    }

    #[test]
    fn parquet_text_column_is_rejected() {
        use arrow::array::StringArray;

        let file = write_parquet(vec![
            ("lambda", Arc::new(StringArray::from(vec!["500"])) as ArrayRef),
            ("radius (nm)", Arc::new(Float64Array::from(vec![10.0])) as ArrayRef),
            ("Fe", Arc::new(Float64Array::from(vec![0.9])) as ArrayRef),
            ("Fe2O3", Arc::new(Float64Array::from(vec![0.8])) as ArrayRef),
            ("Fe3O4", Arc::new(Float64Array::from(vec![0.7])) as ArrayRef),
        ]);

        let err = load_file(file.path()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("numeric"), "{msg}");
        assert!(msg.contains("lambda"), "{msg}");
    }

    #[test]
    fn parquet_missing_material_is_named_in_the_error() {
        let file = write_parquet(vec![
            ("wavelength_nm", Arc::new(Float64Array::from(vec![500.0])) as ArrayRef),
            ("radius_nm", Arc::new(Float64Array::from(vec![10.0])) as ArrayRef),
            ("Fe", Arc::new(Float64Array::from(vec![0.9])) as ArrayRef),
            ("Fe3O4", Arc::new(Float64Array::from(vec![0.7])) as ArrayRef),
        ]);

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScreenError>(),
            Some(ScreenError::MissingColumn(name)) if name == "Fe2O3"
        ));
    }
}
