//! In-memory honeycomb patch of cells.
//!
//! [HoneycombMonolayer] is the reference implementation of
//! [CellPopulation]: a rectangular patch of hexagonal cells as produced by
//! the usual honeycomb mesh generators. It carries no vertex geometry, only
//! the adjacency structure and the incidence sets of the perimeter edges,
//! which is all the rules of this crate consume.

use std::collections::{BTreeSet, HashMap};

use rand::Rng;

use crate::concepts::{CellPopulation, CellRecord, Cycle, Strategy};
use crate::cycle::FlagDrivenCycleModel;
use crate::errors::{CalcError, DivisionError, IndexError, SetupError};
use crate::parameters::Demographics;
use crate::tension::LineTension;

/// Offsets of the six neighbors in axial coordinates, counterclockwise
/// starting east. Consecutive entries (cyclically) point to mutually
/// adjacent cells, which the edge incidence construction relies on.
const AXIAL_DIRECTIONS: [(i64, i64); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Rectangular patch of hexagonal cells with full neighbor information.
///
/// Cells are stored row-major on an odd-r offset lattice (odd rows shifted
/// east), so index `row * nx + col` addresses the cell in column `col` of
/// row `row`. Interior cells have six neighbors, cells on the patch rim
/// fewer.
///
/// ```
/// use tissue_games::concepts::CellPopulation;
/// use tissue_games::monolayer::HoneycombMonolayer;
/// let patch = HoneycombMonolayer::new(3, 3).unwrap();
/// assert_eq!(patch.n_cells(), 9);
/// // the central cell is fully surrounded
/// assert_eq!(patch.neighbor_indices(4).unwrap().len(), 6);
/// ```
#[derive(Clone, Debug)]
pub struct HoneycombMonolayer {
    nx: usize,
    ny: usize,
    cells: Vec<CellRecord>,
    axial_index: HashMap<(i64, i64), usize>,
}

impl HoneycombMonolayer {
    /// Creates a patch of `nx` by `ny` default cells.
    pub fn new(nx: usize, ny: usize) -> Result<Self, SetupError> {
        if nx == 0 || ny == 0 {
            return Err(SetupError(format!(
                "honeycomb patch of {}x{} cells is empty",
                nx, ny
            )));
        }
        let cells = vec![CellRecord::default(); nx * ny];
        let mut axial_index = HashMap::with_capacity(nx * ny);
        for row in 0..ny {
            for col in 0..nx {
                let index = row * nx + col;
                axial_index.insert(axial_of(nx, index), index);
            }
        }
        Ok(HoneycombMonolayer {
            nx,
            ny,
            cells,
            axial_index,
        })
    }

    /// Number of columns of the patch.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of rows of the patch.
    pub fn ny(&self) -> usize {
        self.ny
    }

    fn axial(&self, index: usize) -> Result<(i64, i64), IndexError> {
        if index >= self.cells.len() {
            return Err(IndexError(format!(
                "no cell at index {} in a patch of {} cells",
                index,
                self.cells.len()
            )));
        }
        Ok(axial_of(self.nx, index))
    }

    /// Assigns every cell a demographic type drawn from the proportions.
    pub fn randomize_types(
        &mut self,
        demographics: &Demographics,
        rng: &mut rand_chacha::ChaCha8Rng,
    ) {
        for cell in self.cells.iter_mut() {
            cell.cell_type = demographics.sample_type(rng);
        }
    }

    /// Labels every cell a defector with the given probability.
    pub fn randomize_strategies(
        &mut self,
        defector_proportion: f64,
        rng: &mut rand_chacha::ChaCha8Rng,
    ) {
        let proportion = num::clamp(defector_proportion, 0.0, 1.0);
        for cell in self.cells.iter_mut() {
            cell.strategy = if rng.gen_range(0.0..1.0) < proportion {
                Strategy::Defector
            } else {
                Strategy::Cooperator
            };
        }
    }

    /// Incident-cell sets of the two endpoints of one perimeter edge.
    ///
    /// `direction` indexes the six hexagon edges of the cell
    /// counterclockwise starting east. Each endpoint vertex is incident to
    /// the cell itself, the neighbor across the edge and one of the two
    /// diagonal neighbors flanking it; neighbors outside the patch are
    /// simply absent from the sets. The intersection of the two sets is
    /// therefore the cell alone for a rim edge and the cell plus its
    /// neighbor for a shared edge.
    pub fn edge_vertex_incidence(
        &self,
        index: usize,
        direction: usize,
    ) -> Result<(BTreeSet<usize>, BTreeSet<usize>), IndexError> {
        if direction >= AXIAL_DIRECTIONS.len() {
            return Err(IndexError(format!(
                "direction {} is not one of the 6 hexagon edges",
                direction
            )));
        }
        let (q, r) = self.axial(index)?;
        let towards = |k: usize| -> Option<usize> {
            let (dq, dr) = AXIAL_DIRECTIONS[k];
            self.axial_index.get(&(q + dq, r + dr)).copied()
        };
        let previous = (direction + AXIAL_DIRECTIONS.len() - 1) % AXIAL_DIRECTIONS.len();
        let next = (direction + 1) % AXIAL_DIRECTIONS.len();

        let mut incident_a = BTreeSet::from([index]);
        incident_a.extend(towards(previous));
        incident_a.extend(towards(direction));

        let mut incident_b = BTreeSet::from([index]);
        incident_b.extend(towards(direction));
        incident_b.extend(towards(next));

        Ok((incident_a, incident_b))
    }

    /// Sums the tension coefficients over the perimeter traversal of every
    /// cell.
    ///
    /// Interior edges are visited once from either side, rim edges once in
    /// total, matching the traversal the per-visit halving of the
    /// type-dependent policies is calibrated for. For unit edge lengths the
    /// result is the line-tension energy of the patch.
    pub fn total_line_tension(&self, tension: &LineTension) -> Result<f64, CalcError> {
        let mut total = 0.0;
        for index in 0..self.cells.len() {
            for direction in 0..AXIAL_DIRECTIONS.len() {
                let (incident_a, incident_b) = self.edge_vertex_incidence(index, direction)?;
                total += tension.line_tension_parameter(&incident_a, &incident_b, self)?;
            }
        }
        Ok(total)
    }

    /// Divides the parent and lets the daughter overwrite one uniformly
    /// chosen neighbor, keeping the cell count constant.
    ///
    /// Returns the index of the displaced cell.
    pub fn replace_with_daughter_of(
        &mut self,
        parent: usize,
        rng: &mut rand_chacha::ChaCha8Rng,
    ) -> Result<usize, DivisionError> {
        let neighbors = self
            .neighbor_indices(parent)
            .map_err(|e| DivisionError(e.0))?;
        if neighbors.is_empty() {
            return Err(DivisionError(format!(
                "cell {} has no neighbor its daughter could displace",
                parent
            )));
        }
        let choice = rng.gen_range(0..neighbors.len());
        let target = neighbors
            .iter()
            .nth(choice)
            .copied()
            .ok_or(DivisionError(format!(
                "neighbor choice {} of cell {} out of range",
                choice, parent
            )))?;
        let parent_record = self.record_mut(parent).map_err(|e| DivisionError(e.0))?;
        let daughter = FlagDrivenCycleModel::divide(rng, parent_record)?;
        let target_record = self.record_mut(target).map_err(|e| DivisionError(e.0))?;
        *target_record = daughter;
        Ok(target)
    }
}

/// Axial coordinates of a cell on the odd-r offset lattice.
fn axial_of(nx: usize, index: usize) -> (i64, i64) {
    let row = (index / nx) as i64;
    let col = (index % nx) as i64;
    (col - (row - (row & 1)) / 2, row)
}

impl CellPopulation for HoneycombMonolayer {
    fn n_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_indices(&self) -> Vec<usize> {
        (0..self.cells.len()).collect()
    }

    fn record(&self, index: usize) -> Result<&CellRecord, IndexError> {
        self.cells.get(index).ok_or(IndexError(format!(
            "no cell at index {} in a patch of {} cells",
            index,
            self.cells.len()
        )))
    }

    fn record_mut(&mut self, index: usize) -> Result<&mut CellRecord, IndexError> {
        let n_cells = self.cells.len();
        self.cells.get_mut(index).ok_or(IndexError(format!(
            "no cell at index {} in a patch of {} cells",
            index, n_cells
        )))
    }

    fn neighbor_indices(&self, index: usize) -> Result<BTreeSet<usize>, IndexError> {
        let (q, r) = self.axial(index)?;
        Ok(AXIAL_DIRECTIONS
            .iter()
            .filter_map(|(dq, dr)| self.axial_index.get(&(q + dq, r + dr)).copied())
            .collect())
    }
}
