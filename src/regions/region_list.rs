//! The reference list of administrative regions and the grid cells they map to.

use crate::regions::error::RegionListError;
use crate::types::grid_cell::{GridCell, Region};
use bon::bon;
use log::{info, warn};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::task;

pub const DEFAULT_GRID_X_COLUMN: &str = "격자 X";
pub const DEFAULT_GRID_Y_COLUMN: &str = "격자 Y";
pub const DEFAULT_REGION_CODE_COLUMN: &str = "행정구역코드";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column names to read from a region list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionColumns {
    grid_x: String,
    grid_y: String,
    region_code: String,
}

#[bon]
impl RegionColumns {
    #[builder]
    pub fn new(
        #[builder(into)] grid_x: Option<String>,
        #[builder(into)] grid_y: Option<String>,
        #[builder(into)] region_code: Option<String>,
    ) -> Self {
        Self {
            grid_x: grid_x.unwrap_or_else(|| DEFAULT_GRID_X_COLUMN.to_string()),
            grid_y: grid_y.unwrap_or_else(|| DEFAULT_GRID_Y_COLUMN.to_string()),
            region_code: region_code.unwrap_or_else(|| DEFAULT_REGION_CODE_COLUMN.to_string()),
        }
    }

    pub fn grid_x(&self) -> &str {
        &self.grid_x
    }

    pub fn grid_y(&self) -> &str {
        &self.grid_y
    }

    pub fn region_code(&self) -> &str {
        &self.region_code
    }
}

impl Default for RegionColumns {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Regions in file order. Several regions may share one grid cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionList {
    regions: Vec<Region>,
}

impl RegionList {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Builds a list straight from grid cells, without region codes.
    pub fn from_cells(cells: impl IntoIterator<Item = GridCell>) -> Self {
        Self {
            regions: cells
                .into_iter()
                .map(|cell| Region { code: None, cell })
                .collect(),
        }
    }

    /// Reads a region list CSV. A UTF-8 byte order mark is tolerated, the
    /// region code column is optional.
    pub async fn load(path: &Path, columns: &RegionColumns) -> Result<Self, RegionListError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RegionListError::Read(path.to_path_buf(), e))?;
        let path_owned = path.to_path_buf();
        let columns = columns.clone();

        let list = task::spawn_blocking(move || parse_region_csv(bytes, &path_owned, &columns))
            .await??;
        info!(
            "Loaded {} regions ({} distinct grid cells) from {:?}",
            list.len(),
            list.distinct_cells().len(),
            path
        );
        Ok(list)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Grid cells in the order they first appear in the list, each once.
    pub fn distinct_cells(&self) -> Vec<GridCell> {
        let mut seen = HashSet::with_capacity(self.regions.len());
        self.regions
            .iter()
            .map(|region| region.cell)
            .filter(|cell| seen.insert(*cell))
            .collect()
    }
}

fn parse_region_csv(
    mut bytes: Vec<u8>,
    path: &Path,
    columns: &RegionColumns,
) -> Result<RegionList, RegionListError> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| RegionListError::CsvReadPolars(path.to_path_buf(), e))?;

    let grid_x = string_column(&df, columns.grid_x(), path)?.ok_or_else(|| missing(path, columns.grid_x()))?;
    let grid_y = string_column(&df, columns.grid_y(), path)?.ok_or_else(|| missing(path, columns.grid_y()))?;
    let codes = string_column(&df, columns.region_code(), path)?;
    if codes.is_none() {
        warn!(
            "Region list {:?} has no '{}' column, regions will carry no code",
            path,
            columns.region_code()
        );
    }

    let grid_value = |values: &StringChunked, row: usize| -> Result<i32, RegionListError> {
        let raw = values.get(row).unwrap_or("").trim();
        // Spreadsheet exports sometimes write integers as "60.0".
        raw.parse::<i32>()
            .ok()
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.fract() == 0.0)
                    .map(|v| v as i32)
            })
            .ok_or_else(|| RegionListError::InvalidGridValue {
                path: path.to_path_buf(),
                row,
                value: raw.to_string(),
            })
    };

    let mut regions = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let code = codes
            .and_then(|values| values.get(row))
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string);
        let cell = GridCell::new(grid_value(grid_x, row)?, grid_value(grid_y, row)?);
        regions.push(Region { code, cell });
    }
    Ok(RegionList::new(regions))
}

/// Looks a column up by name, ignoring surrounding whitespace in the header.
fn string_column<'a>(
    df: &'a DataFrame,
    name: &str,
    path: &Path,
) -> Result<Option<&'a StringChunked>, RegionListError> {
    let Some(column) = df
        .get_columns()
        .iter()
        .find(|column| column.name().trim() == name)
    else {
        return Ok(None);
    };
    column
        .str()
        .map(Some)
        .map_err(|e| RegionListError::CsvReadPolars(path.to_path_buf(), e))
}

fn missing(path: &Path, column: &str) -> RegionListError {
    RegionListError::MissingColumn {
        path: PathBuf::from(path),
        column: column.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn load_str(contents: &[u8]) -> Result<RegionList, RegionListError> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("regions.csv");
        std::fs::write(&path, contents).unwrap();
        RegionList::load(&path, &RegionColumns::default()).await
    }

    #[tokio::test]
    async fn loads_regions_with_codes() {
        let list = load_str(
            "행정구역코드,1단계,격자 X,격자 Y\n\
             1100000000,서울특별시,60,127\n\
             2600000000,부산광역시,98,76\n"
                .as_bytes(),
        )
        .await
        .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.regions()[0].code.as_deref(), Some("1100000000"));
        assert_eq!(list.regions()[1].cell, GridCell::new(98, 76));
    }

    #[tokio::test]
    async fn tolerates_byte_order_mark_and_missing_code_column() {
        let mut contents = UTF8_BOM.to_vec();
        contents.extend_from_slice("격자 X,격자 Y\n60,127\n".as_bytes());

        let list = load_str(&contents).await.unwrap();
        assert_eq!(list.regions(), &[Region { code: None, cell: GridCell::new(60, 127) }]);
    }

    #[tokio::test]
    async fn distinct_cells_keep_first_occurrence_order() {
        let list = load_str(
            "행정구역코드,격자 X,격자 Y\n\
             1,60,127\n\
             2,98,76\n\
             3,60,127\n\
             4,55,124\n"
                .as_bytes(),
        )
        .await
        .unwrap();

        assert_eq!(list.len(), 4);
        assert_eq!(
            list.distinct_cells(),
            vec![GridCell::new(60, 127), GridCell::new(98, 76), GridCell::new(55, 124)]
        );
    }

    #[tokio::test]
    async fn float_formatted_grid_values_are_accepted() {
        let list = load_str("격자 X,격자 Y\n60.0,127\n".as_bytes()).await.unwrap();
        assert_eq!(list.distinct_cells(), vec![GridCell::new(60, 127)]);
    }

    #[tokio::test]
    async fn missing_grid_column_is_an_error() {
        let result = load_str("격자 X,lat\n60,37.5\n".as_bytes()).await;
        assert!(matches!(
            result,
            Err(RegionListError::MissingColumn { column, .. }) if column == DEFAULT_GRID_Y_COLUMN
        ));
    }

    #[tokio::test]
    async fn non_numeric_grid_value_is_an_error() {
        let result = load_str("격자 X,격자 Y\n60,north\n".as_bytes()).await;
        assert!(matches!(result, Err(RegionListError::InvalidGridValue { row: 0, .. })));
    }

    #[tokio::test]
    async fn custom_column_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cells.csv");
        std::fs::write(&path, "nx,ny\n61,128\n").unwrap();
        let columns = RegionColumns::builder().grid_x("nx").grid_y("ny").build();

        let list = RegionList::load(&path, &columns).await.unwrap();
        assert_eq!(list.distinct_cells(), vec![GridCell::new(61, 128)]);
    }

    #[test]
    fn from_cells_builds_codeless_regions() {
        let list = RegionList::from_cells([GridCell::new(1, 2), GridCell::new(1, 2)]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.distinct_cells().len(), 1);
    }
}
