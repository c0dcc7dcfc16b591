//! Defines the two forecast products collected from the KMA village forecast
//! service and the per-product constants the rest of the crate keys off.

use std::fmt;
use std::str::FromStr;

/// The forecast product a collection run targets.
///
/// The two products are published on different cadences and cover different
/// lead-time horizons, so they are scheduled, archived and checked for
/// completeness independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastKind {
    /// Ultra-short-term forecast (`getUltraSrtFcst`). Issued every hour, roughly
    /// ten minutes past the hour, covering the next six lead hours.
    UltraShort,
    /// Short-term "village" forecast (`getVilageFcst`). Issued eight times a day
    /// at fixed slots, covering three days at one-hour resolution.
    ShortTerm,
}

impl ForecastKind {
    pub const ALL: [ForecastKind; 2] = [ForecastKind::UltraShort, ForecastKind::ShortTerm];

    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            ForecastKind::UltraShort => "ultra-short",
            ForecastKind::ShortTerm => "short-term",
        }
    }

    /// Suffix appended to the monthly archive file name. Kept identical to the
    /// names the collector has always written so existing archives are picked up.
    pub(crate) fn archive_file_suffix(&self) -> &'static str {
        match self {
            ForecastKind::UltraShort => "_ultra",
            ForecastKind::ShortTerm => "_short_term",
        }
    }

    /// Upstream API operation name for this product.
    pub(crate) fn operation(&self) -> &'static str {
        match self {
            ForecastKind::UltraShort => "getUltraSrtFcst",
            ForecastKind::ShortTerm => "getVilageFcst",
        }
    }
}

/// Allows formatting a `ForecastKind` using its `path_segment`.
///
/// # Examples
///
/// ```
/// use kma_collector::ForecastKind;
///
/// assert_eq!(ForecastKind::UltraShort.to_string(), "ultra-short");
/// assert_eq!(format!("{}", ForecastKind::ShortTerm), "short-term");
/// ```
impl fmt::Display for ForecastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

impl FromStr for ForecastKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "ultra-short" | "ultra" => Ok(ForecastKind::UltraShort),
            "short-term" | "short" => Ok(ForecastKind::ShortTerm),
            other => Err(format!("unknown forecast kind '{other}'")),
        }
    }
}
