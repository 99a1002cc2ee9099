use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::range::MonthRange;
use crate::schema::{ActivitySpec, Category};

pub const NAME_FIELD: &str = "Common Name";
pub const LIGHT_FIELD: &str = "Light";
pub const CUTTING_TYPE_FIELD: &str = "Cutting Type";

/// One row of a category's source table.
///
/// `row` is the zero-based position in the source and is the stable identity
/// of the record. Display names are not guaranteed to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub row: usize,

    pub name: String,

    pub category: Category,

    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl PlantRecord {
    pub fn new(row: usize, name: String, category: Category) -> Self {
        Self {
            row,
            name,
            category,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), value.to_string());
        self
    }

    /// Trimmed field value; empty cells count as absent.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn light(&self) -> Option<&str> {
        self.field(LIGHT_FIELD)
    }

    pub fn cutting_type(&self) -> Option<&str> {
        self.field(CUTTING_TYPE_FIELD)
    }

    pub fn month_range(&self, spec: &ActivitySpec) -> Option<MonthRange> {
        let start = self.field(spec.start_field)?;
        let end = self.field(spec.end_field)?;
        MonthRange::from_cells(start, end)
    }
}
