//! Streaming reader for the person-level census microdata file.
//!
//! The file is far too large to materialize as text, so rows are parsed
//! straight into narrow typed buffers and flushed to a DataFrame every
//! `chunk_size` rows. Each chunk gets its derived categorical columns before
//! it is appended to the running table.

use std::{fs::File, io::{BufReader, Read}, path::Path, str::FromStr};

use csv::ByteRecord;
use encoding_rs::Encoding;
use log::{debug, info};
use polars::prelude::*;

use crate::{
    census::{columns, AgeBand, SexCategory},
    common,
    config::CensusOptions,
    error::{Error, Result},
};

/// Source header → canonical column. Every other column in the file is skipped.
pub const CENSUS_COLUMNS: [(&str, &str); 5] = [
    ("REGION", columns::REGION_ID),
    ("COMUNA", columns::COMUNA_ID),
    ("P08", columns::SEX),
    ("P09", columns::AGE),
    ("ESCOLARIDAD", columns::ESCOLARIDAD),
];

/// Load the census file at `path` into a single person table.
pub fn load_census(path: &Path, options: &CensusOptions) -> Result<DataFrame> {
    common::require_file_exists(path)?;
    let file = File::open(path)
        .map_err(|e| Error::io(format!("opening census file {}", path.display()), e))?;

    info!("[census] streaming {} in chunks of {} rows", path.display(), options.chunk_size);
    let df = read_census(BufReader::new(file), options, path)?;
    info!("[census] loaded {} person records", df.height());
    Ok(df)
}

/// Read census rows from any byte source. `source` is only used in error messages.
pub fn read_census<R: Read>(reader: R, options: &CensusOptions, source: &Path) -> Result<DataFrame> {
    let encoding = Encoding::for_label(options.encoding.trim().as_bytes())
        .ok_or_else(|| Error::Config(format!("unknown encoding {:?}", options.encoding)))?;
    if !options.delimiter.is_ascii() {
        return Err(Error::Config(format!("delimiter {:?} is not a single byte", options.delimiter)));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter as u8)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = reader.byte_headers()?
        .iter()
        .map(|field| encoding.decode(field).0.trim().to_string())
        .collect::<Vec<_>>();
    let positions = ColumnPositions::locate(&headers, source)?;

    let chunk_size = options.chunk_size.max(1);
    let mut table: Option<DataFrame> = None;
    let mut buffer = ChunkBuffer::with_capacity(chunk_size);
    let mut record = ByteRecord::new();
    let mut chunks = 0usize;

    while reader.read_byte_record(&mut record)? {
        buffer.push(&record, &positions)?;
        if buffer.len() >= chunk_size {
            let chunk = std::mem::replace(&mut buffer, ChunkBuffer::with_capacity(chunk_size));
            append(&mut table, chunk.into_dataframe()?)?;
            chunks += 1;
            debug!("[census] chunk {chunks} appended ({} rows so far)", table.as_ref().map_or(0, |df| df.height()));
        }
    }
    if !buffer.is_empty() || table.is_none() {
        append(&mut table, buffer.into_dataframe()?)?;
    }

    table.ok_or_else(|| Error::Config("census reader produced no table".into()))
}

fn append(table: &mut Option<DataFrame>, chunk: DataFrame) -> Result<()> {
    match table {
        Some(df) => { df.vstack_mut(&chunk)?; }
        None => *table = Some(chunk),
    }
    Ok(())
}

/// Field index of each whitelisted column in the header row.
struct ColumnPositions {
    region: usize,
    comuna: usize,
    sex: usize,
    age: usize,
    escolaridad: usize,
}

impl ColumnPositions {
    fn locate(headers: &[String], source: &Path) -> Result<Self> {
        let find = |name: &str| headers.iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn { path: source.to_path_buf(), column: name.to_string() });
        let [region, comuna, sex, age, escolaridad] = CENSUS_COLUMNS.map(|(name, _)| name);
        Ok(Self {
            region: find(region)?,
            comuna: find(comuna)?,
            sex: find(sex)?,
            age: find(age)?,
            escolaridad: find(escolaridad)?,
        })
    }
}

/// Column-oriented staging area for one chunk of rows.
struct ChunkBuffer {
    region: Vec<i8>,
    comuna: Vec<i32>,
    sex: Vec<u8>,
    age: Vec<u8>,
    escolaridad: Vec<Option<u8>>,
}

impl ChunkBuffer {
    fn with_capacity(n: usize) -> Self {
        Self {
            region: Vec::with_capacity(n),
            comuna: Vec::with_capacity(n),
            sex: Vec::with_capacity(n),
            age: Vec::with_capacity(n),
            escolaridad: Vec::with_capacity(n),
        }
    }

    #[inline] fn len(&self) -> usize { self.region.len() }

    #[inline] fn is_empty(&self) -> bool { self.region.is_empty() }

    fn push(&mut self, record: &ByteRecord, at: &ColumnPositions) -> Result<()> {
        let line = record.position().map_or(0, |p| p.line());
        let [region, comuna, sex, age, escolaridad] = CENSUS_COLUMNS.map(|(name, _)| name);

        // Parse the whole row before touching the buffers so they stay aligned.
        let row = (
            parse_required::<i8>(record, at.region, region, line)?,
            parse_required::<i32>(record, at.comuna, comuna, line)?,
            parse_required::<u8>(record, at.sex, sex, line)?,
            parse_required::<u8>(record, at.age, age, line)?,
            parse_optional::<u8>(record, at.escolaridad, escolaridad, line)?,
        );
        self.region.push(row.0);
        self.comuna.push(row.1);
        self.sex.push(row.2);
        self.age.push(row.3);
        self.escolaridad.push(row.4);
        Ok(())
    }

    /// Build the chunk's DataFrame under canonical names, with derived columns.
    fn into_dataframe(self) -> Result<DataFrame> {
        let sex_category = self.sex.iter()
            .map(|&code| SexCategory::from_code(code).map(SexCategory::label))
            .collect::<Vec<_>>();
        let age_band = self.age.iter()
            .map(|&age| AgeBand::from_age(i64::from(age)).map(AgeBand::label))
            .collect::<Vec<_>>();

        Ok(DataFrame::new(vec![
            Column::new(columns::REGION_ID.into(), self.region),
            Column::new(columns::COMUNA_ID.into(), self.comuna),
            Column::new(columns::SEX.into(), self.sex),
            Column::new(columns::AGE.into(), self.age),
            Column::new(columns::ESCOLARIDAD.into(), self.escolaridad),
            Column::new(columns::SEX_CATEGORY.into(), sex_category),
            Column::new(columns::AGE_BAND.into(), age_band),
        ])?)
    }
}

fn field_text<'r>(record: &'r ByteRecord, pos: usize, column: &str, line: u64) -> Result<&'r str> {
    let bytes = record.get(pos).ok_or_else(|| parse_error(line, column, "field missing"))?;
    std::str::from_utf8(bytes)
        .map(str::trim)
        .map_err(|_| parse_error(line, column, "non-numeric bytes"))
}

fn parse_required<T>(record: &ByteRecord, pos: usize, column: &str, line: u64) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text = field_text(record, pos, column, line)?;
    text.parse::<T>().map_err(|e| parse_error(line, column, &format!("{text:?}: {e}")))
}

fn parse_optional<T>(record: &ByteRecord, pos: usize, column: &str, line: u64) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text = field_text(record, pos, column, line)?;
    if text.is_empty() { return Ok(None) }
    text.parse::<T>().map(Some).map_err(|e| parse_error(line, column, &format!("{text:?}: {e}")))
}

fn parse_error(line: u64, column: &str, message: &str) -> Error {
    Error::Parse { line, column: column.to_string(), message: message.to_string() }
}
