use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, warn};

const SYMBOL_COLUMN: &str = "Symbol";

/// Sorted, de-duplicated ticker symbols from a CSV with a "Symbol" column
///
/// The list is optional: a missing or unreadable file gives an empty list.
pub fn load_symbols(path: &Path) -> Vec<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No symbol list at {}", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Failed to open symbol list {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match read_symbols(file) {
        Ok(symbols) => {
            debug!("Loaded {} symbols from {}", symbols.len(), path.display());
            symbols
        }
        Err(e) => {
            warn!("Failed to read symbol list {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn read_symbols<R: Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let Some(column) = reader.headers()?.iter().position(|h| h == SYMBOL_COLUMN) else {
        warn!("Symbol list has no '{}' column", SYMBOL_COLUMN);
        return Ok(Vec::new());
    };

    let mut symbols = BTreeSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(symbol) = record.get(column).filter(|s| !s.is_empty()) {
            symbols.insert(symbol.to_string());
        }
    }

    Ok(symbols.into_iter().collect())
}
