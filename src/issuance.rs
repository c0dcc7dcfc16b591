//! Resolves which forecast publication cycle ("issuance window") is the most
//! recent one available at a given wall-clock instant.
//!
//! The upstream service does not answer "give me the latest forecast"; every
//! request names a `base_date`/`base_time`. Asking for a cycle that is not yet
//! published yields no data, so the collector has to work out the right cycle
//! itself, including around midnight where the latest cycle belongs to the
//! previous calendar day.
//!
//! Resolution is a pure function of the instant passed in. Nothing here reads
//! the system clock, so day and hour rollovers can be tested by constructing
//! arbitrary instants.

use crate::types::forecast_kind::ForecastKind;
use crate::types::issuance_window::IssuanceWindow;
use bon::bon;
use chrono::{DateTime, NaiveDate, TimeZone, Timelike};

/// Publication hours of the short-term forecast, in local time.
pub const DEFAULT_SHORT_TERM_SLOT_HOURS: [u32; 8] = [2, 5, 8, 11, 14, 17, 20, 23];

/// Minutes after the top of the hour at which an ultra-short cycle is available.
pub const DEFAULT_ULTRA_SHORT_DELAY_MINUTES: u32 = 10;

/// The publication timetable of both forecast products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationSchedule {
    short_term_slot_hours: Vec<u32>,
    ultra_short_delay_minutes: u32,
}

#[bon]
impl PublicationSchedule {
    /// Builds a schedule. Slot hours are sorted and deduplicated, hours outside
    /// `0..24` are dropped, and an empty slot list falls back to the default
    /// eight short-term slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use kma_collector::PublicationSchedule;
    ///
    /// let schedule = PublicationSchedule::builder()
    ///     .short_term_slot_hours(vec![23, 2, 11, 2, 30])
    ///     .build();
    /// assert_eq!(schedule.short_term_slot_hours(), &[2, 11, 23]);
    /// assert_eq!(schedule.ultra_short_delay_minutes(), 10);
    /// ```
    #[builder]
    pub fn new(
        short_term_slot_hours: Option<Vec<u32>>,
        ultra_short_delay_minutes: Option<u32>,
    ) -> Self {
        let mut slots: Vec<u32> = short_term_slot_hours
            .unwrap_or_default()
            .into_iter()
            .filter(|hour| *hour < 24)
            .collect();
        slots.sort_unstable();
        slots.dedup();
        if slots.is_empty() {
            slots = DEFAULT_SHORT_TERM_SLOT_HOURS.to_vec();
        }

        Self {
            short_term_slot_hours: slots,
            ultra_short_delay_minutes: ultra_short_delay_minutes
                .unwrap_or(DEFAULT_ULTRA_SHORT_DELAY_MINUTES)
                .min(59),
        }
    }

    pub fn short_term_slot_hours(&self) -> &[u32] {
        &self.short_term_slot_hours
    }

    pub fn ultra_short_delay_minutes(&self) -> u32 {
        self.ultra_short_delay_minutes
    }
}

impl Default for PublicationSchedule {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Maps wall-clock instants to issuance windows according to a
/// [`PublicationSchedule`].
#[derive(Debug, Clone, Default)]
pub struct IssuanceWindowResolver {
    schedule: PublicationSchedule,
}

impl IssuanceWindowResolver {
    pub fn new(schedule: PublicationSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &PublicationSchedule {
        &self.schedule
    }

    /// Returns the most recent issuance window of `kind` published at `now`.
    ///
    /// `now` must already be expressed in the service's civil time zone; the
    /// local date and hour of the instant are used as-is.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{FixedOffset, NaiveDate, TimeZone};
    /// use kma_collector::{ForecastKind, IssuanceWindowResolver};
    ///
    /// let kst = FixedOffset::east_opt(9 * 3600).unwrap();
    /// let resolver = IssuanceWindowResolver::default();
    ///
    /// // 01:30 is before the first short-term slot, so yesterday's 23:00 cycle applies.
    /// let now = kst.with_ymd_and_hms(2024, 3, 1, 1, 30, 0).unwrap();
    /// let window = resolver.resolve(&now, ForecastKind::ShortTerm);
    /// assert_eq!(window.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    /// assert_eq!(window.base_time(), "2300");
    /// ```
    pub fn resolve<Tz: TimeZone>(&self, now: &DateTime<Tz>, kind: ForecastKind) -> IssuanceWindow {
        match kind {
            ForecastKind::ShortTerm => self.resolve_short_term(now),
            ForecastKind::UltraShort => self.resolve_ultra_short(now),
        }
    }

    /// Whether the local hour of `now` is one of the short-term publication slots.
    pub fn is_publication_hour<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.schedule.short_term_slot_hours.contains(&now.hour())
    }

    fn resolve_short_term<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> IssuanceWindow {
        let hour = now.hour();
        let today = now.date_naive();

        match self
            .schedule
            .short_term_slot_hours
            .iter()
            .rev()
            .find(|slot| **slot <= hour)
        {
            Some(slot) => IssuanceWindow::new(today, *slot),
            None => {
                // Before the first slot of the day: the last slot of yesterday.
                let last_slot = self
                    .schedule
                    .short_term_slot_hours
                    .last()
                    .copied()
                    .unwrap_or(23);
                IssuanceWindow::new(previous_day(today), last_slot)
            }
        }
    }

    fn resolve_ultra_short<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> IssuanceWindow {
        let hour = now.hour();
        let today = now.date_naive();

        if now.minute() >= self.schedule.ultra_short_delay_minutes {
            IssuanceWindow::new(today, hour)
        } else if hour == 0 {
            IssuanceWindow::new(previous_day(today), 23)
        } else {
            IssuanceWindow::new(today, hour - 1)
        }
    }
}

fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}
