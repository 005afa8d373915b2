use std::path::Path;

use activitydb_data::ActivityTable;
use log::{info, warn};

use crate::error::Result;
use crate::interp::interp_one;
use crate::table;

/// Activity returned whenever no usable data resolves a query.
///
/// 1.0 is ideal behavior, so "no information" reads as "no deviation from
/// ideal". Callers cannot distinguish this from a genuine 1.0 through the
/// plain-`f64` API; use [`ActivityDb::estimate_activity_water_h2so4`] when
/// that matters.
pub const DEFAULT_ACTIVITY: f64 = 1.0;

/// How an activity query was answered.
///
/// The numeric contract is identical on every path; the variant records
/// whether the query hit a tabulated column exactly, interpolated between
/// two bracketing columns, or degraded to the default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivityEstimate {
    Exact(f64),
    Interpolated(f64),
    Default(f64),
}

impl ActivityEstimate {
    /// The activity value, regardless of how it was obtained.
    pub fn value(self) -> f64 {
        match self {
            Self::Exact(v) | Self::Interpolated(v) | Self::Default(v) => v,
        }
    }
}

/// The water-activity reference database.
///
/// Holds the immutable [`ActivityTable`] and answers queries against it.
/// Construct once at startup and share by reference; all queries are pure
/// functions of the table and their arguments.
pub struct ActivityDb {
    table: ActivityTable,
}

impl ActivityDb {
    /// Load the reference table through the candidate-path search.
    ///
    /// Never fails: if no data file is found, or the file found does not
    /// parse, the built-in minimal table substitutes and a warning is
    /// logged.
    pub fn load() -> Self {
        match table::resolve_data_file(table::DATA_FILE_NAME) {
            Some(path) => match table::read_table(&path) {
                Ok(loaded) => {
                    info!("loaded activity table from {}", path.display());
                    Self { table: loaded }
                }
                Err(e) => {
                    warn!(
                        "failed to load {}: {e}; using built-in fallback table",
                        path.display()
                    );
                    Self::fallback()
                }
            },
            None => {
                warn!(
                    "{} not found in any candidate location; using built-in fallback table",
                    table::DATA_FILE_NAME
                );
                Self::fallback()
            }
        }
    }

    /// Load the table from an explicit file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self {
            table: table::read_table(path)?,
        })
    }

    /// Parse the table from CSV text.
    pub fn from_csv(text: &str) -> Result<Self> {
        Ok(Self {
            table: table::parse_csv(text)?,
        })
    }

    /// The built-in minimal table, used when no data file resolves.
    pub fn fallback() -> Self {
        Self {
            table: table::builtin_table(),
        }
    }

    /// Access the underlying table.
    pub fn table(&self) -> &ActivityTable {
        &self.table
    }

    /// Water activity over a sulfuric-acid solution at the given
    /// temperature and water mole fraction.
    ///
    /// Total function: every input pair yields a number. Unresolvable
    /// queries return [`DEFAULT_ACTIVITY`] with a logged warning.
    /// Temperature uses the unit of the source table; out-of-range
    /// temperatures are clipped to the tabulated boundary.
    pub fn calc_activity_water_h2so4(&self, temperature: f64, water_fraction: f64) -> f64 {
        self.estimate_activity_water_h2so4(temperature, water_fraction)
            .value()
    }

    /// Same query as [`calc_activity_water_h2so4`], reporting which tier
    /// answered it.
    ///
    /// [`calc_activity_water_h2so4`]: Self::calc_activity_water_h2so4
    pub fn estimate_activity_water_h2so4(
        &self,
        temperature: f64,
        water_fraction: f64,
    ) -> ActivityEstimate {
        if let Some(index) = self.table.column_index(water_fraction) {
            return match self.value_at(temperature, index) {
                Some(value) => ActivityEstimate::Exact(value),
                None => {
                    warn!(
                        "column {water_fraction} unusable; returning default activity"
                    );
                    ActivityEstimate::Default(DEFAULT_ACTIVITY)
                }
            };
        }

        let (larger, smaller) = self.bracket_columns(water_fraction);
        let (Some(hi), Some(lo)) = (larger, smaller) else {
            warn!(
                "mole fraction {water_fraction} outside tabulated span; \
                 returning default activity"
            );
            return ActivityEstimate::Default(DEFAULT_ACTIVITY);
        };

        let (Some(value1), Some(value2)) = (
            self.value_at(temperature, hi),
            self.value_at(temperature, lo),
        ) else {
            warn!(
                "bracketing columns for {water_fraction} unusable; \
                 returning default activity"
            );
            return ActivityEstimate::Default(DEFAULT_ACTIVITY);
        };

        let larger = self.table.columns[hi].fraction;
        let smaller = self.table.columns[lo].fraction;
        let value =
            value2 + (water_fraction - smaller) * (value2 - value1) / (smaller - larger);
        if value.is_finite() {
            ActivityEstimate::Interpolated(value)
        } else {
            warn!(
                "degenerate bracket ({smaller}, {larger}) for {water_fraction}; \
                 returning default activity"
            );
            ActivityEstimate::Default(DEFAULT_ACTIVITY)
        }
    }

    /// Activity of column `index` at `temperature`, linearly interpolated
    /// along the temperature axis with boundary clipping. `None` when the
    /// table cannot answer (no temperature axis, incomplete column).
    fn value_at(&self, temperature: f64, index: usize) -> Option<f64> {
        let temps = &self.table.temperatures;
        let values = &self.table.columns.get(index)?.values;
        if temps.is_empty() || values.len() != temps.len() {
            return None;
        }
        Some(interp_one(temperature, temps, values))
    }

    /// Indices of the columns with the smallest fraction strictly greater
    /// than `target` and the largest strictly smaller. Either side is
    /// `None` when `target` lies outside the tabulated span.
    fn bracket_columns(&self, target: f64) -> (Option<usize>, Option<usize>) {
        let mut larger: Option<usize> = None;
        let mut smaller: Option<usize> = None;
        for (i, column) in self.table.columns.iter().enumerate() {
            let fraction = column.fraction;
            if !fraction.is_finite() {
                continue;
            }
            if fraction > target
                && larger.is_none_or(|j| fraction < self.table.columns[j].fraction)
            {
                larger = Some(i);
            }
            if fraction < target
                && smaller.is_none_or(|j| fraction > self.table.columns[j].fraction)
            {
                smaller = Some(i);
            }
        }
        (larger, smaller)
    }
}

impl Default for ActivityDb {
    fn default() -> Self {
        Self::load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_interior() {
        let db = ActivityDb::fallback();
        let (larger, smaller) = db.bracket_columns(0.3);
        assert_eq!(larger.map(|i| db.table.columns[i].fraction), Some(0.5));
        assert_eq!(smaller.map(|i| db.table.columns[i].fraction), Some(0.1));
    }

    #[test]
    fn test_bracket_outside_span() {
        let db = ActivityDb::fallback();
        assert_eq!(db.bracket_columns(2.0).0, None);
        assert_eq!(db.bracket_columns(0.01).1, None);
    }

    #[test]
    fn test_bracket_never_matches_exact_key() {
        let db = ActivityDb::fallback();
        let (larger, smaller) = db.bracket_columns(0.5);
        assert_eq!(larger.map(|i| db.table.columns[i].fraction), Some(0.9));
        assert_eq!(smaller.map(|i| db.table.columns[i].fraction), Some(0.1));
    }

    #[test]
    fn test_value_at_degenerate_column() {
        let mut db = ActivityDb::fallback();
        db.table.columns[0].values.pop();
        assert_eq!(db.value_at(25.0, 0), None);
        assert_eq!(
            db.estimate_activity_water_h2so4(25.0, 0.1),
            ActivityEstimate::Default(DEFAULT_ACTIVITY)
        );
    }
}
