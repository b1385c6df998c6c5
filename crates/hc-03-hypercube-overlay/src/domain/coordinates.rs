use serde::{Deserialize, Serialize};

use super::errors::NodeStateError;

/// A node's place in the hypercube: its position and the region it covers.
///
/// Always read and replaced as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// One coordinate per dimension.
    pub position: Vec<f64>,
    /// Region boundaries or neighbor-coverage data.
    pub cover_map: Vec<f64>,
}

impl Coordinates {
    #[must_use]
    pub fn new(position: Vec<f64>, cover_map: Vec<f64>) -> Self {
        Self {
            position,
            cover_map,
        }
    }

    /// Check every value is finite and, when `dimensions` is set, that the
    /// position has exactly that many entries.
    pub fn validate(&self, dimensions: Option<usize>) -> Result<(), NodeStateError> {
        if let Some(expected) = dimensions {
            if self.position.len() != expected {
                return Err(NodeStateError::DimensionMismatch {
                    expected,
                    actual: self.position.len(),
                });
            }
        }
        check_finite("position", &self.position)?;
        check_finite("cover map", &self.cover_map)
    }
}

fn check_finite(vector: &'static str, values: &[f64]) -> Result<(), NodeStateError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(NodeStateError::NonFiniteCoordinate { vector, index }),
        None => Ok(()),
    }
}
