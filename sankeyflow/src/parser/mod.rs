//! Delimited text loader with encoding and delimiter auto-detection.
//!
//! Each column becomes a stage, each data row a record. Cells matching one of
//! the configured missing-value markers become absent.

use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{Cell, Table};

/// Markers read as "no value at this stage" unless the caller overrides them.
pub const DEFAULT_NA_VALUES: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: Table,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    pub headers: Vec<String>,
}

/// How to read a file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Explicit delimiter; auto-detected when `None`
    pub delimiter: Option<char>,
    /// Cell values treated as absent (compared after trimming)
    pub na_values: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "utf-8-sig" | "ascii" => match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        // WHATWG maps the latin1 labels onto windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        other => {
            let enc = encoding_rs::Encoding::for_label(other.as_bytes())
                .ok_or_else(|| CsvError::EncodingError(format!("unsupported encoding '{}'", other)))?;
            enc.decode(bytes).0.into_owned()
        }
    };

    Ok(decoded)
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text into a [`Table`].
///
/// # Example
/// ```ignore
/// use sankeyflow::parser::parse_table;
///
/// let table = parse_table("Calc1,Calc2\nA,B\nC,", ',', &["".into()]).unwrap();
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.rows()[1][1], None);
/// ```
pub fn parse_table(content: &str, delimiter: char, na_values: &[String]) -> CsvResult<Table> {
    parse_with_headers(content, delimiter, na_values).map(|(table, _)| table)
}

fn parse_with_headers(content: &str, delimiter: char, na_values: &[String]) -> CsvResult<(Table, Vec<String>)> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    if !delimiter.is_ascii() {
        return Err(CsvError::ParseError {
            line: 1,
            message: format!("delimiter '{}' is not a single-byte character", delimiter),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CsvError::ParseError { line: 1, message: e.to_string() })?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| CsvError::ParseError {
            line: e.position().map(|p| p.line() as usize).unwrap_or(0),
            message: e.to_string(),
        })?;

        // Whitespace-only line
        if record.len() == 1 && headers.len() > 1 && record[0].is_empty() {
            continue;
        }

        let row: Vec<Cell> = (0..headers.len())
            .map(|i| {
                let value = record.get(i).unwrap_or("");
                if value.is_empty() || na_values.iter().any(|na| na == value) {
                    None
                } else {
                    Some(value.to_string())
                }
            })
            .collect();

        rows.push(row);
    }

    let table = Table::new(headers.clone(), rows)?;
    Ok((table, headers))
}

/// Parse a file with encoding auto-detection.
///
/// The delimiter is detected unless `options.delimiter` is set.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P, options: &LoadOptions) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes, options)
}

/// Parse bytes with encoding auto-detection.
pub fn parse_bytes_auto(bytes: &[u8], options: &LoadOptions) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(&content));

    let (table, headers) = parse_with_headers(&content, delimiter, &options.na_values)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
        headers,
    })
}
