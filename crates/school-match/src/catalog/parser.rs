use super::headers::HeaderIndex;
use super::normalizer::parse_number;
use std::io::Read;

/// A header row plus trimmed data rows. Rows may be shorter than the header.
#[derive(Debug, Default)]
pub(crate) struct RawTable {
    pub(crate) headers: HeaderIndex,
    pub(crate) rows: Vec<Vec<String>>,
}

impl RawTable {
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn row(&self, index: usize) -> Option<TableRow<'_>> {
        self.rows.get(index).map(|cells| TableRow {
            headers: &self.headers,
            cells,
        })
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows.iter().map(move |cells| TableRow {
            headers: &self.headers,
            cells,
        })
    }
}

/// Column access for a single data row through the table's header aliases.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableRow<'a> {
    headers: &'a HeaderIndex,
    cells: &'a [String],
}

impl<'a> TableRow<'a> {
    /// Cell under the first alias present in the header; empty cells read as `None`.
    pub(crate) fn text<S: AsRef<str>>(&self, aliases: &[S]) -> Option<&'a str> {
        let column = self.headers.resolve(aliases)?;
        self.cells
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// First non-empty cell across every alias present in the header.
    pub(crate) fn first_text<S: AsRef<str>>(&self, aliases: &[S]) -> Option<&'a str> {
        self.headers
            .resolve_all(aliases)
            .into_iter()
            .filter_map(|column| self.cells.get(column))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }

    pub(crate) fn number<S: AsRef<str>>(&self, aliases: &[S]) -> Option<f64> {
        self.text(aliases).and_then(parse_number)
    }
}

/// Reads a comma-delimited table whose first record is the header. Quoted fields are
/// honored and an input with no records yields an empty table. Empty lines are
/// skipped by the reader, but a record of empty cells (`,,`) is kept as a row so
/// positional pairing with a second table stays aligned.
pub(crate) fn parse_table<R: Read>(reader: R) -> Result<RawTable, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let headers = match records.next() {
        Some(header) => {
            let header = header?;
            HeaderIndex::new(header.iter())
        }
        None => return Ok(RawTable::default()),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}
