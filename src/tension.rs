//! Line-tension rules for the edges of a vertex mesh.
//!
//! The energy contribution of a mesh edge with length $l_{ij}$ is
//! \\begin{equation}
//!     E_{ij} = \\Lambda_{ij} l_{ij}
//! \\end{equation}
//! where the coefficient $\\Lambda_{ij}$ depends on the cells incident to
//! the edge. [LineTension] computes $\\Lambda_{ij}$; the host engine
//! supplies the incidence information and the edge lengths.
//!
//! A mesh traversal visits every interior edge once from either side, so the
//! type-dependent policies return half the configured coefficient per visit
//! and both visits together sum to it. Boundary edges are visited once and
//! receive the un-halved homotypic coefficient of their single incident
//! cell.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::concepts::{CellPopulation, Strategy};
use crate::errors::{CalcError, TopologyError};
use crate::parameters::CostMatrix;

/// Classification of a mesh edge by the cells incident to it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Edge {
    /// Tissue-boundary edge belonging to exactly one cell.
    Boundary(usize),
    /// Edge shared by exactly two cells, stored with ascending indices.
    Interior(usize, usize),
}

impl Edge {
    /// Classifies the edge between two vertices from their incident-cell
    /// sets.
    ///
    /// The shared cells are the intersection of both sets. One shared cell
    /// makes a [Edge::Boundary], two make a [Edge::Interior]. Any other
    /// count means the mesh incidence information is inconsistent and
    /// returns a [TopologyError].
    pub fn from_incident_cells(
        incident_a: &BTreeSet<usize>,
        incident_b: &BTreeSet<usize>,
    ) -> Result<Edge, TopologyError> {
        let shared: Vec<usize> = incident_a.intersection(incident_b).copied().collect();
        match shared.as_slice() {
            [] => Err(TopologyError(
                "edge endpoints do not share any incident cell".into(),
            )),
            [cell] => Ok(Edge::Boundary(*cell)),
            [first, second] => Ok(Edge::Interior(*first, *second)),
            _ => Err(TopologyError(format!(
                "edge endpoints share {} incident cells but at most 2 are possible",
                shared.len()
            ))),
        }
    }
}

/// Rule assigning a tension coefficient to a classified edge.
///
/// The default is the [Constant](LineTensionPolicy::Constant) rule with the
/// historical coefficients:
///
/// | Property | Default |
/// | --- | --- |
/// | `boundary` | `0.12` |
/// | `interior` | `0.06` |
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LineTensionPolicy {
    /// One coefficient per edge class, independent of the incident cells.
    /// Both values are used verbatim without any halving.
    Constant {
        /// Coefficient of tissue-boundary edges.
        boundary: f64,
        /// Per-visit coefficient of interior edges.
        interior: f64,
    },
    /// Coefficients looked up in a [CostMatrix] by the demographic types of
    /// the incident cells. Interior edges use half the entry per visit,
    /// boundary edges the diagonal entry of the single incident cell.
    FromCostMatrix(CostMatrix),
    /// Coefficients chosen by the strategy labels of the incident cells.
    /// [Defectors](Strategy::Defector) count as labelled. Interior edges use
    /// half the matching coefficient per visit, boundary edges the un-halved
    /// homotypic coefficient.
    BinaryLabel {
        /// Coefficient of edges between two unlabelled cells.
        wild: f64,
        /// Coefficient of edges between two labelled cells.
        differentiated: f64,
        /// Coefficient of edges between one labelled and one unlabelled
        /// cell.
        mixed: f64,
    },
}

impl Default for LineTensionPolicy {
    fn default() -> Self {
        LineTensionPolicy::Constant {
            boundary: 0.12,
            interior: 0.06,
        }
    }
}

/// Evaluates the line-tension coefficient of mesh edges under a
/// [LineTensionPolicy].
///
/// | Property | Default |
/// | --- | --- |
/// | `wild` | `0.12` |
/// | `differentiated` | `0.12` |
/// | `mixed` | `0.2` |
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineTension {
    /// The active policy.
    pub policy: LineTensionPolicy,
}

impl Default for LineTension {
    fn default() -> Self {
        LineTension {
            policy: LineTensionPolicy::BinaryLabel {
                wild: 0.12,
                differentiated: 0.12,
                mixed: 0.2,
            },
        }
    }
}

impl LineTension {
    /// Creates an evaluator for the given policy.
    pub fn new(policy: LineTensionPolicy) -> Self {
        LineTension { policy }
    }

    /// Tension coefficient of an already classified edge.
    pub fn edge_tension<P>(&self, edge: &Edge, population: &P) -> Result<f64, CalcError>
    where
        P: CellPopulation,
    {
        match &self.policy {
            LineTensionPolicy::Constant { boundary, interior } => match edge {
                Edge::Boundary(_) => Ok(*boundary),
                Edge::Interior(_, _) => Ok(*interior),
            },
            LineTensionPolicy::FromCostMatrix(costs) => match edge {
                Edge::Boundary(cell) => {
                    let cell_type = population.record(*cell)?.cell_type;
                    costs.get(cell_type, cell_type)
                }
                Edge::Interior(first, second) => {
                    let type_first = population.record(*first)?.cell_type;
                    let type_second = population.record(*second)?.cell_type;
                    Ok(costs.get(type_first, type_second)? / 2.0)
                }
            },
            LineTensionPolicy::BinaryLabel {
                wild,
                differentiated,
                mixed,
            } => match edge {
                Edge::Boundary(cell) => {
                    match population.record(*cell)?.strategy {
                        Strategy::Cooperator => Ok(*wild),
                        Strategy::Defector => Ok(*differentiated),
                    }
                }
                Edge::Interior(first, second) => {
                    let label_first = population.record(*first)?.strategy;
                    let label_second = population.record(*second)?.strategy;
                    let coefficient = match (label_first, label_second) {
                        (Strategy::Cooperator, Strategy::Cooperator) => wild,
                        (Strategy::Defector, Strategy::Defector) => differentiated,
                        _ => mixed,
                    };
                    Ok(coefficient / 2.0)
                }
            },
        }
    }

    /// Tension coefficient of the edge between two vertices given their
    /// incident-cell sets.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn line_tension_parameter<P>(
        &self,
        incident_a: &BTreeSet<usize>,
        incident_b: &BTreeSet<usize>,
        population: &P,
    ) -> Result<f64, CalcError>
    where
        P: CellPopulation,
    {
        let edge = Edge::from_incident_cells(incident_a, incident_b)?;
        self.edge_tension(&edge, population)
    }
}


#[cfg(test)]
mod test_policies {
    use super::*;
    use crate::monolayer::HoneycombMonolayer;
    use nalgebra::DMatrix;

    fn two_cell_population() -> HoneycombMonolayer {
        let mut population = HoneycombMonolayer::new(2, 1).unwrap();
        population.record_mut(0).unwrap().cell_type = 0;
        population.record_mut(1).unwrap().cell_type = 1;
        population
    }

    #[test]
    fn constant_policy_returns_fields_verbatim() {
        let population = two_cell_population();
        let tension = LineTension::new(LineTensionPolicy::Constant {
            boundary: 0.4,
            interior: 0.25,
        });
        let boundary = tension
            .edge_tension(&Edge::Boundary(0), &population)
            .unwrap();
        let interior = tension
            .edge_tension(&Edge::Interior(0, 1), &population)
            .unwrap();
        assert_eq!(boundary, 0.4);
        assert_eq!(interior, 0.25);
    }

    #[test]
    fn default_policy_uses_the_constant_coefficients() {
        let population = two_cell_population();
        let tension = LineTension::new(LineTensionPolicy::default());
        assert_eq!(
            tension.edge_tension(&Edge::Boundary(0), &population).unwrap(),
            0.12
        );
        assert_eq!(
            tension
                .edge_tension(&Edge::Interior(0, 1), &population)
                .unwrap(),
            0.06
        );
    }

    #[test]
    fn cost_matrix_policy_uses_diagonal_for_boundaries_and_halves_interior_entries() {
        let population = two_cell_population();
        let costs =
            CostMatrix::new(DMatrix::from_row_slice(2, 2, &[0.1, 0.3, 0.3, 0.2])).unwrap();
        let tension = LineTension::new(LineTensionPolicy::FromCostMatrix(costs));

        let boundary = tension
            .edge_tension(&Edge::Boundary(0), &population)
            .unwrap();
        assert_eq!(boundary, 0.1);

        let per_visit = tension
            .edge_tension(&Edge::Interior(0, 1), &population)
            .unwrap();
        assert_eq!(per_visit, 0.15);
        // both visits of the traversal together restore the entry
        assert_eq!(per_visit + per_visit, 0.3);
    }

    #[test]
    fn cost_matrix_policy_rejects_unconfigured_types() {
        let mut population = two_cell_population();
        population.record_mut(1).unwrap().cell_type = 5;
        let costs = CostMatrix::from_element(2, 0.1).unwrap();
        let tension = LineTension::new(LineTensionPolicy::FromCostMatrix(costs));
        assert!(tension
            .edge_tension(&Edge::Interior(0, 1), &population)
            .is_err());
    }

    #[test]
    fn binary_label_policy_distinguishes_the_three_pairings() {
        use crate::concepts::Strategy;
        let mut population = two_cell_population();
        let tension = LineTension::new(LineTensionPolicy::BinaryLabel {
            wild: 0.12,
            differentiated: 0.34,
            mixed: 0.2,
        });

        population.record_mut(0).unwrap().strategy = Strategy::Cooperator;
        population.record_mut(1).unwrap().strategy = Strategy::Cooperator;
        assert_eq!(
            tension
                .edge_tension(&Edge::Interior(0, 1), &population)
                .unwrap(),
            0.06
        );

        population.record_mut(0).unwrap().strategy = Strategy::Defector;
        assert_eq!(
            tension
                .edge_tension(&Edge::Interior(0, 1), &population)
                .unwrap(),
            0.1
        );

        population.record_mut(1).unwrap().strategy = Strategy::Defector;
        assert_eq!(
            tension
                .edge_tension(&Edge::Interior(0, 1), &population)
                .unwrap(),
            0.17
        );
    }

    #[test]
    fn binary_label_policy_boundary_edges_are_not_halved() {
        use crate::concepts::Strategy;
        let mut population = two_cell_population();
        let tension = LineTension::new(LineTensionPolicy::BinaryLabel {
            wild: 0.12,
            differentiated: 0.34,
            mixed: 0.2,
        });
        assert_eq!(
            tension.edge_tension(&Edge::Boundary(0), &population).unwrap(),
            0.12
        );
        population.record_mut(0).unwrap().strategy = Strategy::Defector;
        assert_eq!(
            tension.edge_tension(&Edge::Boundary(0), &population).unwrap(),
            0.34
        );
    }

    #[test]
    fn incidence_sets_feed_the_classification() {
        let population = two_cell_population();
        let tension = LineTension::new(LineTensionPolicy::Constant {
            boundary: 1.0,
            interior: 2.0,
        });
        let shared: BTreeSet<usize> = [0, 1].into_iter().collect();
        let single: BTreeSet<usize> = [0].into_iter().collect();
        assert_eq!(
            tension
                .line_tension_parameter(&shared, &shared, &population)
                .unwrap(),
            2.0
        );
        assert_eq!(
            tension
                .line_tension_parameter(&single, &shared, &population)
                .unwrap(),
            1.0
        );
    }
}
