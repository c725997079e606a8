//! Reading and writing one-integer-per-line CSV files.
//!
//! Input files have no header row. Each record must hold exactly one field,
//! which is trimmed and parsed as an `i64`; blank lines are skipped. Output
//! files are written in the same shape, one value per line.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::CliError;

/// Read every integer from `path`.
pub fn read_values(path: &Path) -> Result<Vec<i64>, CliError> {
    let file = File::open(path).map_err(|e| CliError::io(path, e))?;
    read_values_from(file, path)
}

/// Read integers from any reader. `origin` only labels errors.
pub fn read_values_from<R: Read>(reader: R, origin: &Path) -> Result<Vec<i64>, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| CliError::Csv {
            path: origin.to_path_buf(),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() > 1 {
            return Err(CliError::ExtraFields {
                path: origin.to_path_buf(),
                line,
                record: record.iter().collect::<Vec<_>>().join(","),
            });
        }
        let text = match record.get(0) {
            Some(field) if !field.is_empty() => field,
            _ => continue,
        };
        let value = text.parse::<i64>().map_err(|_| CliError::NotAnInteger {
            path: origin.to_path_buf(),
            line,
            text: text.to_string(),
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Create or truncate `path` and write one value per line.
pub fn write_values(path: &Path, values: &[i64]) -> Result<(), CliError> {
    let file = File::create(path).map_err(|e| CliError::io(path, e))?;
    write_values_to(file, values, path)
}

pub fn write_values_to<W: Write>(writer: W, values: &[i64], origin: &Path) -> Result<(), CliError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for value in values {
        writer
            .write_record([value.to_string()])
            .map_err(|source| CliError::Csv {
                path: origin.to_path_buf(),
                source,
            })?;
    }
    writer.flush().map_err(|e| CliError::io(origin, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Vec<i64>, CliError> {
        read_values_from(text.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn reads_one_value_per_line() {
        assert_eq!(parse("5\n2\n-1\n0\n").unwrap(), vec![5, 2, -1, 0]);
    }

    #[test]
    fn trims_whitespace_and_skips_blank_lines() {
        assert_eq!(parse("  7 \n\n   \n-3\r\n12").unwrap(), vec![7, -3, 12]);
    }

    #[test]
    fn empty_input() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn reports_line_of_bad_value() {
        match parse("1\n2\nthree\n4\n").unwrap_err() {
            CliError::NotAnInteger { line, text, .. } => {
                assert_eq!(line, 3);
                assert_eq!(text, "three");
            }
            other => panic!("expected NotAnInteger, got {:?}", other),
        }
    }

    #[test]
    fn rejects_more_than_one_value_per_line() {
        match parse("1,2\n3\n").unwrap_err() {
            CliError::ExtraFields { line, record, .. } => {
                assert_eq!(line, 1);
                assert_eq!(record, "1,2");
            }
            other => panic!("expected ExtraFields, got {:?}", other),
        }
    }

    #[test]
    fn rejects_extra_field_after_single_values() {
        assert!(parse("1\n2\n3, 4\n").is_err());
    }

    #[test]
    fn writes_newline_terminated_values() {
        let mut buf = Vec::new();
        write_values_to(&mut buf, &[-1, 0, 20], Path::new("out.csv")).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "-1\n0\n20\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_values(Path::new("/nonexistent/slowsort/input.csv")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
