//! Tabular samples handed to oracles and resampled by the ensemble.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Continuous,
    Discrete,
    Mixed,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Continuous => "continuous",
            Self::Discrete => "discrete",
            Self::Mixed => "mixed",
        })
    }
}

/// Row-major samples. Discrete values are stored as category codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    pub variables: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub data_type: DataType,
}

impl DataSet {
    pub fn new(variables: Vec<String>, rows: Vec<Vec<f64>>, data_type: DataType) -> Self {
        Self {
            variables,
            rows,
            data_type,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|r| r.get(idx).copied()).collect())
    }

    /// New dataset holding the given rows, in the given order. Indices may
    /// repeat; out-of-range indices are skipped.
    pub fn subset_rows(&self, indices: &[usize]) -> DataSet {
        DataSet {
            variables: self.variables.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
            data_type: self.data_type,
        }
    }
}
