use std::path::{Path, PathBuf};

use activitydb_data::{ActivityColumn, ActivityTable};
use log::warn;

use crate::error::{ActivityDbError, Result};

/// File name of the shipped reference table.
pub const DATA_FILE_NAME: &str = "WaterActivityH2SO4.csv";

/// Environment variable overriding the data-file search directory.
pub const DATA_DIR_ENV: &str = "ACTIVITYDB_DATA_DIR";

const HEADER_LABEL: &str = "Temperature";

/// Parse a semicolon-delimited, comma-decimal activity table.
///
/// The header row is `Temperature` followed by numeric mole-fraction
/// labels; each data row is a temperature sample followed by one activity
/// value per column. Non-numeric column labels are skipped with a warning;
/// malformed data rows are rejected.
pub fn parse_csv(text: &str) -> Result<ActivityTable> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| ActivityDbError::DataError("empty table file".to_string()))?;
    let labels: Vec<&str> = header.split(';').map(str::trim).collect();

    if labels.first().copied() != Some(HEADER_LABEL) {
        return Err(ActivityDbError::DataError(format!(
            "expected '{HEADER_LABEL}' as first header field, got '{}'",
            labels.first().copied().unwrap_or("")
        )));
    }

    // Field position and fraction key of every usable column
    let mut kept: Vec<(usize, f64)> = Vec::new();
    for (pos, label) in labels.iter().enumerate().skip(1) {
        match parse_number(label) {
            Some(fraction) => kept.push((pos, fraction)),
            None => warn!("skipping non-numeric column label '{label}'"),
        }
    }

    let mut temperatures = Vec::new();
    let mut columns: Vec<ActivityColumn> = kept
        .iter()
        .map(|&(_, fraction)| ActivityColumn {
            fraction,
            values: Vec::new(),
        })
        .collect();

    for (row, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        if fields.len() != labels.len() {
            return Err(ActivityDbError::DataError(format!(
                "row {}: expected {} fields, got {}",
                row + 1,
                labels.len(),
                fields.len()
            )));
        }

        let temperature = parse_number(fields[0]).ok_or_else(|| {
            ActivityDbError::DataError(format!(
                "row {}: malformed temperature '{}'",
                row + 1,
                fields[0]
            ))
        })?;
        temperatures.push(temperature);

        for (col, &(pos, fraction)) in kept.iter().enumerate() {
            let value = parse_number(fields[pos]).ok_or_else(|| {
                ActivityDbError::DataError(format!(
                    "row {}, column {fraction}: malformed value '{}'",
                    row + 1,
                    fields[pos]
                ))
            })?;
            columns[col].values.push(value);
        }
    }

    let table = ActivityTable {
        temperatures,
        columns,
    };
    validate(&table)?;
    Ok(table)
}

/// Parse a numeric field written with either a comma or a dot decimal
/// separator. Returns `None` for anything that is not a finite number;
/// `NaN` and infinities count as malformed data, never as grid values.
fn parse_number(field: &str) -> Option<f64> {
    field
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn validate(table: &ActivityTable) -> Result<()> {
    if table.temperatures.is_empty() {
        return Err(ActivityDbError::EmptyTable);
    }
    for pair in table.temperatures.windows(2) {
        if pair[1] <= pair[0] {
            return Err(ActivityDbError::DataError(format!(
                "temperature axis not strictly increasing at {} -> {}",
                pair[0], pair[1]
            )));
        }
    }
    for (i, a) in table.columns.iter().enumerate() {
        if a.values.len() != table.temperatures.len() {
            return Err(ActivityDbError::DataError(format!(
                "column {} has {} values for {} temperature rows",
                a.fraction,
                a.values.len(),
                table.temperatures.len()
            )));
        }
        for b in &table.columns[i + 1..] {
            if a.fraction == b.fraction {
                return Err(ActivityDbError::DataError(format!(
                    "duplicate mole-fraction column {}",
                    a.fraction
                )));
            }
        }
    }
    if table.columns.is_empty() {
        warn!("activity table has no mole-fraction columns; all queries will use the default");
    }
    Ok(())
}

/// Read and parse a table file from an explicit path.
pub fn read_table(path: &Path) -> Result<ActivityTable> {
    if !path.exists() {
        return Err(ActivityDbError::DataFileNotFound(
            path.display().to_string(),
        ));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| ActivityDbError::DataError(format!("{}: {e}", path.display())))?;
    parse_csv(&text)
}

/// Ordered candidate locations for a data file, checked front to back.
pub fn candidate_paths(name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        paths.push(Path::new(&dir).join(name));
    }
    paths.push(Path::new("data").join(name));
    paths.push(PathBuf::from(name));
    // Development checkout: data/ next to the workspace manifest
    paths.push(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("data")
            .join(name),
    );
    paths
}

/// First existing candidate path for `name`, if any.
pub fn resolve_data_file(name: &str) -> Option<PathBuf> {
    candidate_paths(name).into_iter().find(|p| p.exists())
}

/// Minimal built-in table used when no data file can be located: four
/// temperature rows, three composition columns, each column constant over
/// temperature.
pub fn builtin_table() -> ActivityTable {
    let constant = |fraction: f64, value: f64| ActivityColumn {
        fraction,
        values: vec![value; 4],
    };
    ActivityTable {
        temperatures: vec![0.0, 25.0, 50.0, 100.0],
        columns: vec![
            constant(0.1, 1.0),
            constant(0.5, 0.8),
            constant(0.9, 0.6),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Temperature;0,1;0,5;0,9\n\
                          0;1,0;0,8;0,6\n\
                          25;0,99;0,79;0,59\n\
                          50;0,98;0,78;0,58\n";

    #[test]
    fn test_parse_comma_decimals() {
        let table = parse_csv(SAMPLE).unwrap();
        assert_eq!(table.temperatures, vec![0.0, 25.0, 50.0]);
        assert_eq!(table.n_columns(), 3);
        assert_eq!(table.columns[1].fraction, 0.5);
        assert_eq!(table.columns[1].values, vec![0.8, 0.79, 0.78]);
    }

    #[test]
    fn test_parse_skips_non_numeric_labels() {
        let text = "Temperature;0,1;comment;0,9\n0;1,0;x;0,6\n25;0,9;y;0,5\n";
        let table = parse_csv(text).unwrap();
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.columns[1].fraction, 0.9);
        assert_eq!(table.columns[1].values, vec![0.6, 0.5]);
    }

    #[test]
    fn test_parse_rejects_bad_header() {
        let text = "Temp;0,1\n0;1,0\n";
        assert!(matches!(
            parse_csv(text),
            Err(ActivityDbError::DataError(_))
        ));
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let text = "Temperature;0,1;0,5\n0;1,0\n";
        assert!(matches!(
            parse_csv(text),
            Err(ActivityDbError::DataError(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unsorted_temperatures() {
        let text = "Temperature;0,1\n25;1,0\n0;0,9\n";
        assert!(matches!(
            parse_csv(text),
            Err(ActivityDbError::DataError(_))
        ));
    }

    #[test]
    fn test_parse_rejects_duplicate_columns() {
        let text = "Temperature;0,1;0,1\n0;1,0;0,9\n";
        assert!(matches!(
            parse_csv(text),
            Err(ActivityDbError::DataError(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_finite_cells() {
        let text = "Temperature;0,1\n0;NaN\n25;0,9\n";
        assert!(matches!(
            parse_csv(text),
            Err(ActivityDbError::DataError(_))
        ));

        let text = "Temperature;0,1\n0;1,0\n25;inf\n";
        assert!(matches!(
            parse_csv(text),
            Err(ActivityDbError::DataError(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_finite_temperature() {
        let text = "Temperature;0,1\nNaN;1,0\n25;0,9\n";
        assert!(matches!(
            parse_csv(text),
            Err(ActivityDbError::DataError(_))
        ));
    }

    #[test]
    fn test_parse_skips_non_finite_labels() {
        let text = "Temperature;0,1;NaN\n0;1,0;0,5\n25;0,9;0,4\n";
        let table = parse_csv(text).unwrap();
        assert_eq!(table.n_columns(), 1);
        assert_eq!(table.columns[0].fraction, 0.1);
    }

    #[test]
    fn test_parse_rejects_empty_file() {
        assert!(parse_csv("").is_err());
        assert!(parse_csv("Temperature;0,1\n").is_err());
    }

    #[test]
    fn test_builtin_shape() {
        let table = builtin_table();
        assert_eq!(table.n_rows(), 4);
        assert_eq!(table.n_columns(), 3);
        for column in &table.columns {
            assert_eq!(column.values.len(), 4);
        }
    }

    #[test]
    fn test_read_table_missing_file() {
        let missing = Path::new("definitely/not/here.csv");
        assert!(matches!(
            read_table(missing),
            Err(ActivityDbError::DataFileNotFound(_))
        ));
    }
}
