//! One scheduled collection run: resolve the window, skip what the archive
//! already covers, fetch the rest cell by cell, and persist once.

use crate::archive::completeness::CompletenessChecker;
use crate::archive::forecast_archive::ForecastArchive;
use crate::archive::store::ArchiveStore;
use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::forecast::client::ForecastSource;
use crate::forecast::error::CellError;
use crate::forecast::normalizer::RecordNormalizer;
use crate::issuance::IssuanceWindowResolver;
use crate::regions::region_list::RegionList;
use crate::types::forecast_kind::ForecastKind;
use crate::types::forecast_record::ForecastRecord;
use crate::types::grid_cell::GridCell;
use crate::types::issuance_window::IssuanceWindow;
use chrono::{DateTime, Datelike, TimeZone, Timelike};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::fmt;
use std::path::PathBuf;

/// Counters of a run that reached the issuance window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub kind: ForecastKind,
    pub window: IssuanceWindow,
    pub archive_path: PathBuf,
    /// Distinct grid cells considered.
    pub cells_total: usize,
    /// Cells the archive already covered.
    pub skipped_complete: usize,
    /// Cells that produced at least one row.
    pub collected: usize,
    /// Cells fetched successfully that had no row of the kept category.
    pub empty: usize,
    /// Cells whose fetch or normalization failed.
    pub failed: usize,
    /// Rows the archive grew by after deduplication.
    pub rows_added: usize,
    pub persisted: bool,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} cells, {} already complete, {} collected, {} empty, {} failed, {} rows added{}",
            self.kind,
            self.window,
            self.cells_total,
            self.skipped_complete,
            self.collected,
            self.empty,
            self.failed,
            self.rows_added,
            if self.persisted { "" } else { " (archive untouched)" }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Short-term runs only do work in a publication hour; nothing was read,
    /// fetched or written.
    OutsidePublicationWindow { kind: ForecastKind, hour: u32 },
    Completed(RunReport),
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::OutsidePublicationWindow { .. } => None,
        }
    }
}

/// Drives collection runs over a fixed set of grid cells.
///
/// The forecast source and the archive store are injected, which is how the
/// tests below run full scenarios without network or disk.
pub struct Collector<C, S> {
    source: C,
    store: S,
    cells: Vec<GridCell>,
    resolver: IssuanceWindowResolver,
    normalizer: RecordNormalizer,
    checker: CompletenessChecker,
    show_progress: bool,
}

impl<C: ForecastSource, S: ArchiveStore> Collector<C, S> {
    pub fn new(source: C, store: S, regions: &RegionList, config: &CollectorConfig) -> Self {
        Self {
            source,
            store,
            cells: regions.distinct_cells(),
            resolver: IssuanceWindowResolver::new(config.schedule.clone()),
            normalizer: RecordNormalizer::new(config.category.clone()),
            checker: CompletenessChecker::default(),
            show_progress: config.show_progress,
        }
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one collection of `kind` as of `now`, which must be expressed in
    /// the service's local time.
    ///
    /// Only archive errors abort the run. A cell that cannot be fetched or
    /// normalized is logged, counted as failed, and left for the next run.
    pub async fn run<Tz: TimeZone>(
        &self,
        kind: ForecastKind,
        now: &DateTime<Tz>,
    ) -> Result<RunOutcome, CollectorError> {
        if kind == ForecastKind::ShortTerm && !self.resolver.is_publication_hour(now) {
            info!(
                "Hour {:02} is not a {} publication hour, skipping run",
                now.hour(),
                kind
            );
            return Ok(RunOutcome::OutsidePublicationWindow {
                kind,
                hour: now.hour(),
            });
        }

        let window = self.resolver.resolve(now, kind);
        let (year, month) = (now.year(), now.month());
        info!(
            "Starting {} run for {} over {} grid cells",
            kind,
            window,
            self.cells.len()
        );

        let archive = self.store.load(kind, year, month).await?;
        let mut report = RunReport {
            kind,
            window,
            archive_path: self.store.archive_path(kind, year, month),
            cells_total: self.cells.len(),
            skipped_complete: 0,
            collected: 0,
            empty: 0,
            failed: 0,
            rows_added: 0,
            persisted: false,
        };

        let counts = archive.window_counts(&window);
        let progress = self.progress_bar(kind);
        let mut pending: Vec<Vec<ForecastRecord>> = Vec::new();
        for &cell in &self.cells {
            progress.inc(1);
            if self.checker.is_covered(&counts, cell, kind) {
                debug!("Cell {} already complete for {}", cell, window);
                report.skipped_complete += 1;
                continue;
            }

            match self.collect_cell(cell, &window, kind).await {
                Ok(records) if records.is_empty() => {
                    debug!("Cell {} returned no {} rows", cell, self.normalizer.category());
                    report.empty += 1;
                }
                Ok(records) => {
                    report.collected += 1;
                    pending.push(records);
                }
                Err(e) => {
                    warn!(
                        "Failed to collect nx={} ny={} base_date={} base_time={}: {}",
                        cell.x,
                        cell.y,
                        window.base_date(),
                        window.base_time(),
                        e
                    );
                    report.failed += 1;
                }
            }
        }
        progress.finish_and_clear();

        if pending.is_empty() {
            info!("Nothing new to archive for {} {}", kind, window);
        } else {
            let merged: ForecastArchive = archive.merge(&pending);
            report.rows_added = merged.len().saturating_sub(archive.len());
            report.archive_path = self.store.save(kind, year, month, &merged).await?;
            report.persisted = true;
        }

        info!("Finished run: {}", report);
        Ok(RunOutcome::Completed(report))
    }

    /// Runs ultra-short, then short-term, for the same instant. Each kind has
    /// its own archive, so a fatal error in one does not stop the other.
    pub async fn run_all<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Vec<(ForecastKind, Result<RunOutcome, CollectorError>)> {
        let mut outcomes = Vec::with_capacity(ForecastKind::ALL.len());
        for kind in ForecastKind::ALL {
            outcomes.push((kind, self.run(kind, now).await));
        }
        outcomes
    }

    async fn collect_cell(
        &self,
        cell: GridCell,
        window: &IssuanceWindow,
        kind: ForecastKind,
    ) -> Result<Vec<ForecastRecord>, CellError> {
        let raw = self.source.fetch(cell, window, kind).await?;
        Ok(self.normalizer.normalize(&raw)?)
    }

    fn progress_bar(&self, kind: ForecastKind) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(self.cells.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(kind.to_string());
        pb
    }
}
