//! Classification of continuous values into fixed, half-open ranges.
//!
//! A [RangeTable] describes the ranges for one column. A [Distribution] counts how many values fall
//! into each range of a table. The same table also generates the SQL `CASE` expression used by the
//! database-backed store, so both aggregation paths agree on every boundary.

use crate::error::QuakeVizError;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// An ordered set of half-open ranges over a single numeric column.
///
/// Range `i` covers `bounds[i - 1] <= value < bounds[i]`. The first range is unbounded below and
/// the last is unbounded above.
#[derive(Debug, PartialEq)]
pub struct RangeTable {
    /// Column the ranges apply to.
    pub column: &'static str,
    /// Exclusive upper bounds in ascending order.
    pub bounds: &'static [f64],
    /// One label per range, so always one longer than `bounds`.
    pub labels: &'static [&'static str],
}

/// Earthquake magnitude ranges.
pub static MAGNITUDE: RangeTable = RangeTable {
    column: "magnitude",
    bounds: &[1.0, 2.0, 3.0, 4.0, 5.0],
    labels: &["Below 1", "1 to 2", "2 to 3", "3 to 4", "4 to 5", "Above 5"],
};

/// Earthquake depth ranges in kilometres.
pub static DEPTH: RangeTable = RangeTable {
    column: "depth",
    bounds: &[5.0, 10.0, 15.0, 20.0],
    labels: &["0-5 km", "5-10 km", "10-15 km", "15-20 km", "Above 20 km"],
};

impl RangeTable {
    /// Returns the number of ranges in the table.
    pub fn num_ranges(&self) -> usize {
        self.labels.len()
    }

    /// Returns the index of the range containing `value`.
    ///
    /// NaN compares false against every bound and lands in the last range, which is also where
    /// PostgreSQL sorts it.
    pub fn classify(&self, value: f64) -> usize {
        self.bounds
            .iter()
            .position(|bound| value < *bound)
            .unwrap_or(self.bounds.len())
    }

    /// Returns the label of the range containing `value`.
    pub fn label(&self, value: f64) -> &'static str {
        self.labels[self.classify(value)]
    }

    /// Returns the index of the range with the given label.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| *l == label)
    }

    /// Returns an SQL `CASE` expression mapping the table's column to range labels.
    pub fn sql_case(&self) -> String {
        let mut sql = String::from("CASE");
        for (bound, label) in self.bounds.iter().zip(self.labels) {
            sql.push_str(&format!(
                " WHEN {} < {} THEN {}",
                self.column,
                bound,
                sql_literal(label)
            ));
        }
        if let Some(last) = self.labels.last() {
            sql.push_str(&format!(" ELSE {}", sql_literal(last)));
        }
        sql.push_str(" END");
        sql
    }
}

/// Quote a string as an SQL literal.
fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Number of values falling into each range of a [RangeTable].
///
/// Serialises as a JSON object keyed by range label, in table order, with every range present.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    table: &'static RangeTable,
    counts: Vec<u64>,
}

impl Distribution {
    /// Returns a distribution with every count set to zero.
    pub fn empty(table: &'static RangeTable) -> Self {
        Self {
            table,
            counts: vec![0; table.num_ranges()],
        }
    }

    /// Count `values` in a single pass.
    pub fn from_values<I>(table: &'static RangeTable, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut distribution = Self::empty(table);
        for value in values {
            distribution.record(value);
        }
        distribution
    }

    /// Build a distribution from `(label, count)` rows as returned by a grouped SQL query.
    ///
    /// Ranges without a row count zero. A label that is not in the table is an error, since it
    /// means the query and the table disagree.
    pub fn from_counts<I, L>(table: &'static RangeTable, rows: I) -> Result<Self, QuakeVizError>
    where
        I: IntoIterator<Item = (L, i64)>,
        L: AsRef<str>,
    {
        let mut distribution = Self::empty(table);
        for (label, count) in rows {
            let label = label.as_ref();
            let index = table
                .index_of(label)
                .ok_or_else(|| QuakeVizError::UnknownBucket {
                    column: table.column,
                    label: label.to_string(),
                })?;
            distribution.counts[index] += u64::try_from(count)?;
        }
        Ok(distribution)
    }

    /// Count a single value.
    pub fn record(&mut self, value: f64) {
        self.counts[self.table.classify(value)] += 1;
    }

    /// Returns the table this distribution counts over.
    pub fn table(&self) -> &'static RangeTable {
        self.table
    }

    /// Returns the counts in table order.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Returns `(label, count)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.table.labels.iter().copied().zip(self.counts.iter().copied())
    }

    /// Returns the sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl Serialize for Distribution {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (label, count) in self.iter() {
            map.serialize_entry(label, &count)?;
        }
        map.end()
    }
}
