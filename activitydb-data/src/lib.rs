#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// The tabulated water-activity reference grid.
///
/// One row per temperature sample, one column per tabulated water mole
/// fraction. Constructed once (from a CSV file or the built-in fallback)
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityTable {
    /// Temperature axis, strictly increasing, in the unit the source
    /// table uses (no conversion is performed anywhere).
    pub temperatures: Vec<f64>,
    /// One entry per tabulated water mole fraction.
    pub columns: Vec<ActivityColumn>,
}

/// A single tabulated composition: its mole-fraction key and one activity
/// value per temperature row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityColumn {
    pub fraction: f64,
    pub values: Vec<f64>,
}

impl ActivityTable {
    /// Number of temperature rows.
    pub fn n_rows(&self) -> usize {
        self.temperatures.len()
    }

    /// Number of mole-fraction columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Index of the column whose fraction key equals `fraction` exactly.
    pub fn column_index(&self, fraction: f64) -> Option<usize> {
        self.columns.iter().position(|c| c.fraction == fraction)
    }
}
