// dqa-core/src/infrastructure/codec/results.rs

use std::io::{Read, Write};

use crate::domain::error::DomainError;
use crate::domain::results::{ColumnMap, ResultRecord, SchemaVersion};
use crate::error::DqaError;
use crate::infrastructure::codec::universal::UniversalReader;

/// Reads result records, resolving columns by header name.
///
/// The layout is detected from the header; every record carries it.
pub struct ResultReader<R: Read> {
    csv: csv::Reader<UniversalReader<R>>,
    columns: Option<ColumnMap>,
}

impl<R: Read> ResultReader<R> {
    /// Reads and checks the header. An empty stream has no header and yields
    /// no records.
    pub fn new(reader: R) -> Result<Self, DqaError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(UniversalReader::new(reader));

        let mut header = csv::StringRecord::new();
        let columns = if csv.read_record(&mut header)? {
            let cells: Vec<&str> = header.iter().map(str::trim).collect();
            Some(ColumnMap::from_header(&cells)?)
        } else {
            None
        };

        Ok(Self { csv, columns })
    }

    /// Layout of the stream; the newest one when the stream was empty.
    pub fn version(&self) -> SchemaVersion {
        self.columns
            .as_ref()
            .map(ColumnMap::version)
            .unwrap_or(SchemaVersion::LATEST)
    }

    /// Next record, or `None` at end of stream.
    pub fn read(&mut self) -> Result<Option<ResultRecord>, DqaError> {
        let Some(columns) = &self.columns else {
            return Ok(None);
        };

        let mut row = csv::StringRecord::new();
        if !self.csv.read_record(&mut row)? {
            return Ok(None);
        }

        if row.len() != columns.width() {
            return Err(DomainError::WrongColumnCount {
                line: row.position().map(|p| p.line()).unwrap_or_default(),
                expected: columns.width(),
                found: row.len(),
            }
            .into());
        }

        let cells: Vec<&str> = row.iter().map(str::trim_start).collect();
        Ok(Some(columns.decode(&cells)))
    }

    pub fn read_all(mut self) -> Result<Vec<ResultRecord>, DqaError> {
        let mut records = Vec::new();
        while let Some(record) = self.read()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Reads a whole stream: its layout and its records.
pub fn read_records<R: Read>(reader: R) -> Result<(SchemaVersion, Vec<ResultRecord>), DqaError> {
    let reader = ResultReader::new(reader)?;
    let version = reader.version();
    Ok((version, reader.read_all()?))
}

/// Writes records in one layout. The header goes out once, before the first
/// record (or on flush when nothing was written).
pub struct ResultWriter<W: Write> {
    csv: csv::Writer<W>,
    version: SchemaVersion,
    header_written: bool,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(writer: W, version: SchemaVersion) -> Self {
        Self {
            csv: csv::Writer::from_writer(writer),
            version,
            header_written: false,
        }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    fn write_header(&mut self) -> Result<(), DqaError> {
        if !self.header_written {
            self.csv.write_record(self.version.header())?;
            self.header_written = true;
        }
        Ok(())
    }

    pub fn write(&mut self, record: &ResultRecord) -> Result<(), DqaError> {
        self.write_header()?;
        self.csv.write_record(self.version.encode(record))?;
        Ok(())
    }

    pub fn write_all<'a, I>(&mut self, records: I) -> Result<(), DqaError>
    where
        I: IntoIterator<Item = &'a ResultRecord>,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DqaError> {
        self.write_header()?;
        self.csv.flush()?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(mut self) -> Result<W, DqaError> {
        self.write_header()?;
        self.csv
            .into_inner()
            .map_err(|e| DqaError::from(e.into_error()))
    }
}

pub fn write_records<'a, W, I>(writer: W, version: SchemaVersion, records: I) -> Result<W, DqaError>
where
    W: Write,
    I: IntoIterator<Item = &'a ResultRecord>,
{
    let mut writer = ResultWriter::new(writer, version);
    writer.write_all(records)?;
    writer.into_inner()
}
