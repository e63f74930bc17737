//! Per-category ledger summary.

use std::collections::BTreeMap;

use apkfetch_schema::{LedgerRecord, LedgerResult};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{CellAlignment, Table};

/// Counts for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub found: usize,
    pub not_found: usize,
    pub errors: usize,
}

impl CategoryCounts {
    pub fn attempted(&self) -> usize {
        self.found + self.not_found + self.errors
    }
}

/// Groups ledger rows by category, sorted by category name.
pub fn tally(records: &[LedgerRecord]) -> BTreeMap<String, CategoryCounts> {
    let mut by_category: BTreeMap<String, CategoryCounts> = BTreeMap::new();
    for record in records {
        let counts = by_category
            .entry(record.category.as_str().to_string())
            .or_default();
        match record.result {
            LedgerResult::Found => counts.found += 1,
            LedgerResult::NotFound => counts.not_found += 1,
            LedgerResult::Error => counts.errors += 1,
        }
    }
    by_category
}

pub fn render(counts: &BTreeMap<String, CategoryCounts>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(vec!["category", "found", "attempted", "not found", "errors", "rate"]);

    let mut total = CategoryCounts::default();
    for (category, c) in counts {
        total.found += c.found;
        total.not_found += c.not_found;
        total.errors += c.errors;
        table.add_row(row(category, c));
    }
    table.add_row(row("total", &total));

    for column in 1..=5 {
        if let Some(col) = table.column_mut(column) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

fn row(label: &str, c: &CategoryCounts) -> Vec<String> {
    let rate = if c.attempted() == 0 {
        "-".to_string()
    } else {
        format!("{:.0}%", 100.0 * c.found as f64 / c.attempted() as f64)
    };
    vec![
        label.to_string(),
        c.found.to_string(),
        c.attempted().to_string(),
        c.not_found.to_string(),
        c.errors.to_string(),
        rate,
    ]
}
