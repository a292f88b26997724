//! CSV output for summary tables.

use std::{fs::File, io::Write, path::Path};

use polars::prelude::{CsvWriter, DataFrame, SerWriter};

use crate::error::{Error, Result};

/// Write a DataFrame to a CSV file.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::io(format!("failed to create {}", path.display()), e))?;
    write_csv_to(df, file)
}

/// Write a DataFrame as CSV into any writer.
pub fn write_csv_to<W: Write>(df: &DataFrame, writer: W) -> Result<()> {
    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut df.clone())?;
    Ok(())
}
