use crate::forecast::error::NormalizeError;
use crate::types::forecast_record::{ForecastRecord, RawRecord};
use crate::utils::zero_pad_time;
use serde_json::Value;

/// Category tag of the sky-condition observation, the only one archived.
pub const SKY_CATEGORY: &str = "SKY";

/// Turns raw API items into archive rows.
///
/// Items of other categories are dropped without looking at their other
/// fields. Kept items must carry every field an archive row needs, otherwise
/// the batch is rejected as a whole; their time fields are padded to four
/// digits (`"200"` becomes `"0200"`). An item without a category at all also
/// rejects the batch.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    category: String,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(SKY_CATEGORY)
    }
}

impl RecordNormalizer {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn normalize(&self, items: &[RawRecord]) -> Result<Vec<ForecastRecord>, NormalizeError> {
        let mut records = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let category = text_field(item, index, "category")?;
            if category != self.category {
                continue;
            }
            records.push(ForecastRecord {
                base_date: text_field(item, index, "baseDate")?,
                base_time: zero_pad_time(&text_field(item, index, "baseTime")?),
                category,
                fcst_date: text_field(item, index, "fcstDate")?,
                fcst_time: zero_pad_time(&text_field(item, index, "fcstTime")?),
                fcst_value: text_field(item, index, "fcstValue")?,
                nx: int_field(item, index, "nx")?,
                ny: int_field(item, index, "ny")?,
            });
        }
        Ok(records)
    }
}

fn text_field(item: &RawRecord, index: usize, field: &'static str) -> Result<String, NormalizeError> {
    match item.get(field) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Null) | None => Err(NormalizeError::MissingField { index, field }),
        Some(other) => Err(NormalizeError::InvalidField {
            index,
            field,
            value: other.to_string(),
        }),
    }
}

fn int_field(item: &RawRecord, index: usize, field: &'static str) -> Result<i32, NormalizeError> {
    let text = text_field(item, index, field)?;
    text.parse::<i32>().map_err(|_| NormalizeError::InvalidField {
        index,
        field,
        value: text,
    })
}
