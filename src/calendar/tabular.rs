//! CSV exchange format: `ID,Date,Time,Title,Description,Recurrence`.
//!
//! End dates and tags are not part of this format.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, info, warn};

use super::reminder::{Recurrence, ReminderFields, ReminderRecord, DATE_FORMAT};
use super::store::Store;
use crate::error::{Error, Result, SkipReason};

pub const HEADER: [&str; 6] = ["ID", "Date", "Time", "Title", "Description", "Recurrence"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the source, header included.
    pub line: u64,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "Imported {} reminder{}, skipped {}",
            self.imported,
            if self.imported == 1 { "" } else { "s" },
            self.skipped.len()
        )
    }

    fn skip(&mut self, line: u64, reason: SkipReason) {
        warn!(line, %reason, "skipping csv row");
        self.skipped.push(SkippedRow { line, reason });
    }
}

/// Writes every reminder in date/time order. Returns the row count.
pub fn export<W: io::Write>(store: &Store, writer: W) -> Result<usize> {
    let mut out = WriterBuilder::new().from_writer(writer);
    out.write_record(HEADER)?;

    let mut rows: Vec<_> = store.iter().collect();
    rows.sort_by_key(|(date, r)| (*date, r.time));

    for (date, r) in &rows {
        let time = r.time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default();
        let recurrence = match r.recurrence {
            Recurrence::None => "",
            rule => rule.as_str(),
        };
        let date = date.format(DATE_FORMAT).to_string();
        let row: [&str; 6] = [
            r.id.as_str(),
            &date,
            &time,
            &r.title,
            &r.description,
            recurrence,
        ];
        out.write_record(row)?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(rows.len())
}

pub fn export_to_path(store: &Store, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let count = export(store, file)?;
    info!(path = %path.display(), count, "reminders exported");
    Ok(count)
}

/// Column positions, from the header when it names every column, otherwise
/// the legacy positional layout without an id column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    id: Option<usize>,
    date: usize,
    time: usize,
    title: usize,
    description: usize,
    recurrence: usize,
}

impl Columns {
    const POSITIONAL: Self = Self {
        id: None,
        date: 0,
        time: 1,
        title: 2,
        description: 3,
        recurrence: 4,
    };

    fn from_header(header: &StringRecord) -> Self {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        match (
            find("ID"),
            find("Date"),
            find("Time"),
            find("Title"),
            find("Description"),
            find("Recurrence"),
        ) {
            (Some(id), Some(date), Some(time), Some(title), Some(description), Some(recurrence)) => {
                Self {
                    id: Some(id),
                    date,
                    time,
                    title,
                    description,
                    recurrence,
                }
            }
            _ => Self::POSITIONAL,
        }
    }

    fn min_len(&self) -> usize {
        [
            self.id.unwrap_or(0),
            self.date,
            self.time,
            self.title,
            self.description,
            self.recurrence,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }

    fn record(&self, row: &StringRecord) -> ReminderRecord {
        let cell = |i: usize| row.get(i).unwrap_or_default().to_string();
        let raw_recurrence = cell(self.recurrence);
        let recurrence = match Recurrence::parse(&raw_recurrence) {
            Some(rule) => rule.as_str().to_string(),
            None => {
                debug!(value = %raw_recurrence, "unknown recurrence imported as none");
                String::new()
            }
        };
        ReminderRecord {
            id: self.id.map(cell).unwrap_or_default(),
            fields: ReminderFields {
                date: cell(self.date),
                time: Some(cell(self.time)),
                title: cell(self.title),
                description: cell(self.description),
                recurrence,
                end_date: None,
                tags: Vec::new(),
            },
        }
    }
}

/// Imports rows into `store`. Bad rows are skipped with a reason; the
/// import as a whole only fails if the source cannot be read at all.
pub fn import<R: io::Read>(store: &mut Store, reader: R) -> Result<ImportReport> {
    let mut rows = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_header(rows.headers()?);
    let min_len = columns.min_len();
    let mut report = ImportReport::default();

    for (i, row) in rows.records().enumerate() {
        let fallback_line = i as u64 + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                let line = e.position().map_or(fallback_line, |p| p.line());
                report.skip(line, SkipReason::Malformed(e.to_string()));
                continue;
            }
        };
        let line = row.position().map_or(fallback_line, |p| p.line());

        if row.len() < min_len {
            report.skip(
                line,
                SkipReason::ShortRow {
                    expected: min_len,
                    found: row.len(),
                },
            );
            continue;
        }

        match store.insert_record(&columns.record(&row)) {
            Ok(_) => report.imported += 1,
            Err(Error::Validation(v)) => report.skip(line, SkipReason::Invalid(v)),
            Err(Error::DuplicateId(id)) => report.skip(line, SkipReason::DuplicateId(id)),
            Err(other) => report.skip(line, SkipReason::Malformed(other.to_string())),
        }
    }

    info!(
        imported = report.imported,
        skipped = report.skipped.len(),
        "csv import finished"
    );
    Ok(report)
}

pub fn import_from_path(store: &mut Store, path: &Path) -> Result<ImportReport> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    import(store, file)
}
