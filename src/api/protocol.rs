//! Record grammar and decoder for the status line.
//!
//! One response line carries `|`-separated records of `;`-separated
//! fields, e.g. (abridged from a real `summary` reply):
//!
//! ```text
//! NAME=cpuminer-opt;VER=3.8.8.1;API=1.0;ALGO=sha256d;CPUS=2;KHS=125.20;UPTIME=60;TS=1520000000|
//! ```
//!
//! The grammar is permissive and the decoder never fails: every non-empty
//! `|` segment becomes a record, every `;` token becomes a field, and a
//! field without `=` is stored under its position in the record. Record
//! and field order is preserved exactly as received - downstream display
//! code iterates the maps in wire order.

use indexmap::IndexMap;

/// One decoded record: field key to raw text value, in wire order.
///
/// A keyed field (`TEMP=65`) is stored under its key; a bare field
/// (`GPU0`) is stored under its zero-based position rendered as a string.
/// The position counter advances for every field, keyed or not, so bare
/// and keyed fields can interleave without colliding.
pub type Record = IndexMap<String, String>;

/// One decoded response: disambiguated record name to [`Record`], in
/// encounter order.
pub type RecordSet = IndexMap<String, Record>;

/// Decode one response line into its ordered records.
///
/// A record is named after its first field: `key=value` collapses to the
/// key and value concatenated (the `=` is dropped), a bare field names
/// itself, and an empty name falls back to `"null"`. A name already
/// present in the set gets the smallest positive integer suffix that is
/// still free (`name1`, `name2`, ...), assigned in encounter order.
///
/// Empty input yields an empty set, never an error.
pub fn decode(line: &str) -> RecordSet {
    let mut records = RecordSet::new();
    for raw in line.split('|') {
        // Trailing '|' leaves an empty segment; nothing to record.
        if raw.is_empty() {
            continue;
        }
        let first = raw.split(';').next().unwrap_or_default();
        let key = unique_name(&records, record_name(first));

        let mut record = Record::new();
        for (index, field) in raw.split(';').enumerate() {
            // Only the first '=' splits key from value; later ones are
            // part of the value.
            match field.split_once('=') {
                Some((name, value)) => record.insert(name.to_owned(), value.to_owned()),
                None => record.insert(index.to_string(), field.to_owned()),
            };
        }
        records.insert(key, record);
    }
    records
}

fn record_name(first: &str) -> String {
    let name = match first.split_once('=') {
        Some((key, value)) => format!("{key}{value}"),
        None => first.to_owned(),
    };
    if name.is_empty() {
        "null".to_owned()
    } else {
        name
    }
}

/// Suffix `name` with the smallest positive integer that keeps it unique
/// within `records`. The search always starts at 1 and counts up; the
/// resulting key sequence is part of the output contract.
fn unique_name(records: &RecordSet, name: String) -> String {
    if !records.contains_key(&name) {
        return name;
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{name}{n}");
        if !records.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────
