//! The read-only item catalog.
//!
//! The catalog is process-wide reference data with no lifecycle tied to any
//! session: the full table of scored behavioral test items, each bucketed
//! into one `(domain, age-group)` cell of the ladder. The builtin catalog is
//! the complete 261-item WS/T 580 table embedded at compile time.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::domain::error::{Result, ScaleError};
use crate::domain::item::Domain;
use crate::ladder;

/// One scored behavioral test item.
///
/// Immutable; supplied by the catalog. `description` is the short table
/// entry, `method` and `pass_criteria` are the administration notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestItem {
    /// Unique positive identifier.
    pub id: u32,
    /// Age-group (ladder rung, in months) this item belongs to.
    pub age_months: u32,
    /// Developmental domain this item measures.
    pub domain: Domain,
    /// Short description of the behavior.
    pub description: String,
    /// How the examiner administers the item.
    pub method: String,
    /// What counts as a pass.
    pub pass_criteria: String,
}

/// Indexed, validated collection of [`TestItem`] records.
#[derive(Debug, Clone)]
pub struct ItemCatalog {
    items: Vec<TestItem>,
    by_id: HashMap<u32, usize>,
    by_cell: HashMap<(Domain, usize), Vec<usize>>,
}

static BUILTIN: LazyLock<ItemCatalog> = LazyLock::new(|| {
    let items: Vec<TestItem> =
        serde_json::from_str(include_str!("../data/items.json")).expect("builtin catalog parses");
    ItemCatalog::new(items).expect("builtin catalog is well-formed")
});

impl ItemCatalog {
    /// Build a catalog from a list of items.
    ///
    /// Validates that ids are positive and unique and that every item sits
    /// on a defined ladder rung. Multiple items may share a `(domain,
    /// age-group)` cell and cells may be empty.
    pub fn new(items: Vec<TestItem>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut by_cell: HashMap<(Domain, usize), Vec<usize>> = HashMap::new();

        for (pos, item) in items.iter().enumerate() {
            if item.id == 0 {
                return Err(ScaleError::InvalidCatalog(
                    "item ids must be positive".to_string(),
                ));
            }
            if by_id.insert(item.id, pos).is_some() {
                return Err(ScaleError::InvalidCatalog(format!(
                    "duplicate item id {}",
                    item.id
                )));
            }
            let rung = ladder::ladder_index(item.age_months).ok_or_else(|| {
                ScaleError::InvalidCatalog(format!(
                    "item {} has age {} which is not a ladder rung",
                    item.id, item.age_months
                ))
            })?;
            by_cell.entry((item.domain, rung)).or_default().push(pos);
        }

        Ok(Self {
            items,
            by_id,
            by_cell,
        })
    }

    /// Parse a catalog from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let items: Vec<TestItem> = serde_json::from_str(json)?;
        Self::new(items)
    }

    /// Load a catalog from a JSON file on disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// The full embedded WS/T 580 item table, parsed once per process.
    pub fn builtin() -> &'static ItemCatalog {
        &BUILTIN
    }

    /// Look up an item by id.
    pub fn item(&self, id: u32) -> Option<&TestItem> {
        self.by_id.get(&id).map(|&pos| &self.items[pos])
    }

    /// Whether the id exists in the catalog.
    pub fn contains(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Items in one `(domain, ladder rung)` cell, in catalog order.
    pub fn cell_items(&self, domain: Domain, rung: usize) -> Vec<&TestItem> {
        self.by_cell
            .get(&(domain, rung))
            .map(|positions| positions.iter().map(|&pos| &self.items[pos]).collect())
            .unwrap_or_default()
    }

    /// Number of items in one `(domain, ladder rung)` cell.
    pub fn cell_len(&self, domain: Domain, rung: usize) -> usize {
        self.by_cell
            .get(&(domain, rung))
            .map_or(0, |positions| positions.len())
    }

    /// Whether a `(domain, ladder rung)` cell has no items.
    pub fn cell_is_empty(&self, domain: Domain, rung: usize) -> bool {
        self.cell_len(domain, rung) == 0
    }

    /// Total number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over every item in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &TestItem> {
        self.items.iter()
    }
}
