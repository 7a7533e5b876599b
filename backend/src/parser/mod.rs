//! CSV decoding with encoding and delimiter auto-detection.
//!
//! Turns the raw bytes of a sheet export into a [`RawTable`]. Nothing
//! sheet-specific happens here: header labels are kept as they appear
//! (outer whitespace trimmed) and every cell is kept as empty or verbatim
//! text by [`CellValue::from_field`].

use std::path::Path;

use serde::Serialize;

use crate::error::{CsvError, CsvResult};
use crate::models::{CellValue, RawRow, RawTable};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: RawTable,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl ParseResult {
    pub fn info(&self) -> CsvInfo {
        CsvInfo {
            encoding: self.encoding.clone(),
            delimiter: format_delimiter(self.delimiter).to_string(),
            headers: self.table.headers().to_vec(),
            row_count: self.table.len(),
        }
    }
}

/// CSV file information, as reported to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: String,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Invalid UTF-8 is decoded lossily; a leading byte-order mark is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8(bytes.to_vec()).map_err(|_| {
                CsvError::EncodingError(format!("unsupported encoding '{}'", encoding))
            })?,
        },
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to `,` (what published sheets emit) when nothing else wins.
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

/// Format delimiter for display
pub fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

/// Parse CSV text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use fuelmap::parser::parse_csv_str;
///
/// let table = parse_csv_str("Site Name,lat\nS1,24.7", ',').unwrap();
/// assert_eq!(table.headers(), ["Site Name", "lat"]);
/// assert_eq!(table.len(), 1);
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> CsvResult<RawTable> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(RawRow::new(record.iter().map(CellValue::from_field).collect()));
    }

    Ok(RawTable::new(headers, rows))
}

fn csv_error(e: csv::Error) -> CsvError {
    CsvError::ParseError {
        line: e.position().map(|p| p.line() as usize).unwrap_or(0),
        message: e.to_string(),
    }
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let table = parse_csv_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}
