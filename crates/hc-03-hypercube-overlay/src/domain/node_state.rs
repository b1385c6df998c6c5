//! # Node State
//!
//! One instance per running node. Position and cover map sit behind a single
//! lock, so readers observe either the old pair or the new pair, never a mix.

use parking_lot::RwLock;
use shared_types::Endpoint;
use tracing::debug;

use super::coordinates::Coordinates;
use super::errors::NodeStateError;
use crate::ports::NodeStateReader;

#[derive(Debug)]
pub struct NodeState {
    self_endpoint: Endpoint,
    dimensions: Option<usize>,
    coordinates: RwLock<Coordinates>,
}

impl NodeState {
    /// Node at `self_endpoint` with empty position and cover map.
    #[must_use]
    pub fn new(self_endpoint: Endpoint) -> Self {
        Self {
            self_endpoint,
            dimensions: None,
            coordinates: RwLock::new(Coordinates::default()),
        }
    }

    /// Require every future position to have exactly `dimensions` entries.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Seed the initial coordinates, validated like any update.
    pub fn with_coordinates(
        self,
        position: Vec<f64>,
        cover_map: Vec<f64>,
    ) -> Result<Self, NodeStateError> {
        self.set_position_and_cover_map(position, cover_map)?;
        Ok(self)
    }

    #[must_use]
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Replace position and cover map together.
    ///
    /// # Errors
    ///
    /// `NodeStateError` if a value is non-finite or the position has the
    /// wrong dimensionality; the current pair is kept.
    pub fn set_position_and_cover_map(
        &self,
        position: Vec<f64>,
        cover_map: Vec<f64>,
    ) -> Result<(), NodeStateError> {
        let update = Coordinates::new(position, cover_map);
        update.validate(self.dimensions)?;

        debug!(
            node = %self.self_endpoint,
            dimensions = update.position.len(),
            cover_entries = update.cover_map.len(),
            "Replacing position and cover map"
        );
        *self.coordinates.write() = update;
        Ok(())
    }
}

impl NodeStateReader for NodeState {
    fn self_endpoint(&self) -> &Endpoint {
        &self.self_endpoint
    }

    fn current_position(&self) -> Vec<f64> {
        self.coordinates.read().position.clone()
    }

    fn current_cover_map(&self) -> Vec<f64> {
        self.coordinates.read().cover_map.clone()
    }

    fn snapshot(&self) -> Coordinates {
        self.coordinates.read().clone()
    }
}
