//! Forecast locations in the KMA projected grid, and the region entries that
//! point at them.

use std::fmt;

/// A forecast location in the upstream API's Lambert-conformal integer grid.
///
/// This is not a latitude/longitude pair: `x` and `y` are the `nx`/`ny` grid
/// indices the API expects. Cells are compared by value.
///
/// # Examples
///
/// ```
/// use kma_collector::GridCell;
///
/// let seoul = GridCell::new(60, 127);
/// assert_eq!(seoul, GridCell { x: 60, y: 127 });
/// assert_eq!(seoul.to_string(), "(60, 127)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One row of the region reference list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Administrative region code, if the reference list carries one.
    pub code: Option<String>,
    /// Grid cell the region's forecasts are published for.
    pub cell: GridCell,
}
