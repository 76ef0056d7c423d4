//! CSV transaction loading.
//!
//! One transaction per line, items separated by commas, optional
//! surrounding whitespace around each item. Duplicate items within a line
//! are removed at ingest.

use crate::errors::Result;
use std::io::Read;
use std::path::Path;

/// Load transactions from a CSV file at `path`: each row is one
/// transaction, its fields the (unparsed) item names.
///
/// Uses `csv`'s flexible reader directly over raw records rather than a
/// fixed-column schema, since a transaction row may have any number of
/// items.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let file = std::fs::File::open(path)?;
    read_transactions(file)
}

/// Same as [`load_csv`] but over any `Read`, for tests and piped input.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Vec<String>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut transactions = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut items: Vec<String> = Vec::with_capacity(record.len());
        for field in record.iter() {
            let trimmed = field.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !items.iter().any(|i| i == trimmed) {
                items.push(trimmed.to_string());
            }
        }
        if !items.is_empty() {
            transactions.push(items);
        }
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_rows_and_dedupes() {
        let input = "a, b, a , c\nd,e\n";
        let transactions = read_transactions(input.as_bytes()).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0], vec!["a", "b", "c"]);
        assert_eq!(transactions[1], vec!["d", "e"]);
    }

    #[test]
    fn blank_rows_are_skipped() {
        let input = "a,b\n\nc,d\n";
        let transactions = read_transactions(input.as_bytes()).unwrap();
        assert_eq!(transactions.len(), 2);
    }
}
