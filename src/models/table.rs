//! Column-oriented view over output records.

use serde_json::Value;

/// A record that can be laid out as one row of a named-column table.
///
/// `COLUMNS` fixes the column order used by every output shape; `values`
/// must yield exactly one value per column, in the same order.
pub trait TableRow {
    const COLUMNS: &'static [&'static str];

    /// Stable index label of the row (position in its source table).
    fn index(&self) -> usize;

    fn values(&self) -> Vec<Value>;
}
