//! File-backed persistence of monthly archives.
//!
//! One CSV file per forecast kind per month, laid out as
//! `<data_dir>/<YYYY>/<YYYY>_<M><suffix>.csv` with a header row. Reading goes
//! through polars with every column taken as text, so values such as
//! `baseTime = "0200"` survive untouched.

use crate::archive::error::ArchiveError;
use crate::archive::forecast_archive::ForecastArchive;
use crate::types::forecast_kind::ForecastKind;
use crate::types::forecast_record::ForecastRecord;
use crate::utils::{ensure_dir_exists, zero_pad_time};
use log::{info, warn};
use polars::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;

/// Column order of every archive file this crate writes.
pub const ARCHIVE_COLUMNS: [&str; 8] = [
    "baseDate",
    "baseTime",
    "category",
    "fcstDate",
    "fcstTime",
    "fcstValue",
    "nx",
    "ny",
];

/// Loads and saves the archive of one forecast kind for one month.
#[allow(async_fn_in_trait)]
pub trait ArchiveStore {
    /// Where the archive for `kind` in `year`/`month` lives.
    fn archive_path(&self, kind: ForecastKind, year: i32, month: u32) -> PathBuf;

    /// Returns the stored archive, or an empty one if none was written yet.
    /// A file that exists but cannot be read as an archive is an error.
    async fn load(
        &self,
        kind: ForecastKind,
        year: i32,
        month: u32,
    ) -> Result<ForecastArchive, ArchiveError>;

    /// Replaces the stored archive with `archive` in a single write.
    async fn save(
        &self,
        kind: ForecastKind,
        year: i32,
        month: u32,
        archive: &ForecastArchive,
    ) -> Result<PathBuf, ArchiveError>;
}

#[derive(Debug, Clone)]
pub struct CsvArchiveStore {
    data_dir: PathBuf,
}

impl CsvArchiveStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn read_csv(path: &Path) -> Result<ForecastArchive, ArchiveError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| ArchiveError::Corrupt(path.to_path_buf(), e))?
            .finish()
            .map_err(|e| ArchiveError::Corrupt(path.to_path_buf(), e))?;

        frame_to_archive(&df, path)
    }

    fn write_csv(path: &Path, archive: &ForecastArchive) -> Result<(), ArchiveError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut df = archive_to_frame(archive).map_err(|e| ArchiveError::Encode(path.to_path_buf(), e))?;

        // Write next to the target and rename over it, so a crash never leaves
        // a half-written archive behind.
        let mut temp_file =
            NamedTempFile::new_in(dir).map_err(|e| ArchiveError::Write(path.to_path_buf(), e))?;
        CsvWriter::new(temp_file.as_file_mut())
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| ArchiveError::Encode(path.to_path_buf(), e))?;
        temp_file
            .persist(path)
            .map_err(|e| ArchiveError::Write(path.to_path_buf(), e.error))?;
        Ok(())
    }
}

impl ArchiveStore for CsvArchiveStore {
    fn archive_path(&self, kind: ForecastKind, year: i32, month: u32) -> PathBuf {
        self.data_dir
            .join(year.to_string())
            .join(format!("{}_{}{}.csv", year, month, kind.archive_file_suffix()))
    }

    async fn load(
        &self,
        kind: ForecastKind,
        year: i32,
        month: u32,
    ) -> Result<ForecastArchive, ArchiveError> {
        let path = self.archive_path(kind, year, month);

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.len() == 0 => {
                warn!("Archive {:?} has no header row", path);
                return Err(ArchiveError::Empty(path));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No archive at {:?} yet, starting from no rows", path);
                return Ok(ForecastArchive::empty());
            }
            Err(e) => return Err(ArchiveError::Read(path, e)),
        }

        let archive = task::spawn_blocking(move || Self::read_csv(&path)).await??;
        info!("Loaded {} archived {} rows", archive.len(), kind);
        Ok(archive)
    }

    async fn save(
        &self,
        kind: ForecastKind,
        year: i32,
        month: u32,
        archive: &ForecastArchive,
    ) -> Result<PathBuf, ArchiveError> {
        let path = self.archive_path(kind, year, month);
        if let Some(dir) = path.parent() {
            ensure_dir_exists(dir)
                .await
                .map_err(|e| ArchiveError::DirCreation(dir.to_path_buf(), e))?;
        }

        let archive = archive.clone();
        let target = path.clone();
        task::spawn_blocking(move || Self::write_csv(&target, &archive)).await??;
        info!("Saved {} archive to {:?}", kind, path);
        Ok(path)
    }
}

fn archive_to_frame(archive: &ForecastArchive) -> PolarsResult<DataFrame> {
    let records = archive.records();
    let text = |field: fn(&ForecastRecord) -> String| -> Vec<String> {
        records.iter().map(field).collect()
    };

    df!(
        "baseDate" => text(|r| r.base_date.clone()),
        "baseTime" => text(|r| r.base_time.clone()),
        "category" => text(|r| r.category.clone()),
        "fcstDate" => text(|r| r.fcst_date.clone()),
        "fcstTime" => text(|r| r.fcst_time.clone()),
        "fcstValue" => text(|r| r.fcst_value.clone()),
        "nx" => records.iter().map(|r| r.nx).collect::<Vec<i32>>(),
        "ny" => records.iter().map(|r| r.ny).collect::<Vec<i32>>()
    )
}

fn frame_to_archive(df: &DataFrame, path: &Path) -> Result<ForecastArchive, ArchiveError> {
    let mut columns: Vec<&StringChunked> = Vec::with_capacity(ARCHIVE_COLUMNS.len());
    for name in ARCHIVE_COLUMNS {
        let column = df.column(name).map_err(|_| ArchiveError::MissingColumn {
            path: path.to_path_buf(),
            column: name,
        })?;
        let strings = column
            .str()
            .map_err(|e| ArchiveError::Corrupt(path.to_path_buf(), e))?;
        columns.push(strings);
    }

    let text = |col: usize, row: usize| columns[col].get(row).unwrap_or("").trim().to_string();
    let grid = |col: usize, row: usize| -> Result<i32, ArchiveError> {
        let value = text(col, row);
        value.parse::<i32>().map_err(|_| ArchiveError::InvalidRow {
            path: path.to_path_buf(),
            row,
            reason: format!("{} is not an integer: {:?}", ARCHIVE_COLUMNS[col], value),
        })
    };

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        records.push(ForecastRecord {
            base_date: text(0, row),
            base_time: zero_pad_time(&text(1, row)),
            category: text(2, row),
            fcst_date: text(3, row),
            fcst_time: zero_pad_time(&text(4, row)),
            fcst_value: text(5, row),
            nx: grid(6, row)?,
            ny: grid(7, row)?,
        });
    }
    Ok(ForecastArchive::new(records))
}
