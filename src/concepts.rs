//! Core abstractions shared by the tension, game and selection rules.
//!
//! The rules in this crate never talk to a mesh directly. They operate on a
//! [CellPopulation] which exposes per-cell state as typed [CellRecord]s
//! together with a neighbor graph. Any host engine that can produce these two
//! views can drive the rules.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{DivisionError, IndexError};

/// Strategy played by a cell in the donation game.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Pays a cost to confer a benefit on every neighbor.
    Cooperator,
    /// Receives benefits without paying any cost.
    Defector,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Cooperator
    }
}

/// Typed per-cell state.
///
/// Replaces the string-keyed item maps of older implementations with named
/// fields so that misspelled keys become compile errors.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CellRecord {
    /// Demographic type of the cell. Indexes the rows and columns of a
    /// [CostMatrix](crate::parameters::CostMatrix).
    pub cell_type: usize,
    /// Strategy played in the donation game.
    pub strategy: Strategy,
    /// Current fitness. Overwritten by
    /// [DonationGame::update_fitness](crate::game::DonationGame::update_fitness).
    pub fitness: f64,
    /// Division flag set by selection and consumed at most once by the cycle
    /// model.
    pub divide: bool,
    /// Preferred apical area handed to the host engine. Not read by any rule
    /// in this crate.
    pub target_area: f64,
}

impl Default for CellRecord {
    fn default() -> Self {
        CellRecord {
            cell_type: 0,
            strategy: Strategy::default(),
            fitness: 1.0,
            divide: false,
            target_area: 1.0,
        }
    }
}

impl CellRecord {
    /// Creates a record with the given type and strategy and default values
    /// otherwise.
    pub fn new(cell_type: usize, strategy: Strategy) -> Self {
        CellRecord {
            cell_type,
            strategy,
            ..CellRecord::default()
        }
    }
}

/// A collection of cells together with their neighbor graph.
///
/// This is the seam between the rules of this crate and a host engine. The
/// index set is expected to be stable while a rule runs: [cell_indices](CellPopulation::cell_indices)
/// returns the same indices in the same ascending order on every call until
/// the population itself is modified. Selection and fitness sweeps rely on
/// this order for reproducibility.
pub trait CellPopulation {
    /// Number of cells currently contained in the population.
    fn n_cells(&self) -> usize;

    /// All valid cell indices in ascending order.
    fn cell_indices(&self) -> Vec<usize>;

    /// Immutable access to the record of one cell.
    fn record(&self, index: usize) -> Result<&CellRecord, IndexError>;

    /// Mutable access to the record of one cell.
    fn record_mut(&mut self, index: usize) -> Result<&mut CellRecord, IndexError>;

    /// Indices of all cells sharing an edge with the given cell.
    ///
    /// The returned set is sorted and free of duplicates and never contains
    /// `index` itself.
    fn neighbor_indices(&self, index: usize) -> Result<BTreeSet<usize>, IndexError>;
}

/// Contains all events which can arise during the cell cycle and need to be
/// communicated to the caller (see also [Cycle]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum CycleEvent {
    /// A cell-event which calls the [Cycle::divide] method which will spawn an
    /// additional cell and modify the existing one.
    Division,
}

/// This trait represents all cycles of a cell and works in tandem with the
/// [CycleEvent] enum.
///
/// The `update_cycle` function is designed to be called once per time step
/// and returns only something if a specific cycle event is supposed to be
/// occurring. Callers are responsible for invoking the corresponding
/// functions as needed.
pub trait Cycle<Cell, Float = f64> {
    /// Continuously updates cellular properties and may spawn a [CycleEvent]
    /// which then calls the corresponding functions (see also [CycleEvent]).
    #[must_use]
    fn update_cycle(
        rng: &mut rand_chacha::ChaCha8Rng,
        dt: &Float,
        cell: &mut Cell,
    ) -> Option<CycleEvent>;

    /// Performs division of the cell by modifying the existing one and
    /// spawning an additional cell. Corresponds to [CycleEvent::Division].
    #[must_use]
    fn divide(rng: &mut rand_chacha::ChaCha8Rng, cell: &mut Cell) -> Result<Cell, DivisionError>;
}
