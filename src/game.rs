//! Donation game played between neighboring cells.
//!
//! Every cell plays one round against each of its neighbors. A
//! [Cooperator](Strategy::Cooperator) pays a cost $c$ to confer a benefit
//! $b$ on the opponent, a [Defector](Strategy::Defector) pays nothing.
//! The accumulated payoff $P$ of a cell maps to its fitness via
//! \\begin{equation}
//!     F = (1 + \\delta)^P
//! \\end{equation}
//! with selection intensity $\\delta$. The fitness is strictly positive for
//! every finite payoff, which selection relies on.

use serde::{Deserialize, Serialize};

use crate::concepts::{CellPopulation, Strategy};
use crate::errors::CalcError;

/// Payoff and fitness parameters of the donation game.
///
/// | Parameter | Default |
/// | --- | --- |
/// | `benefit` | `10.0` |
/// | `cost` | `5.0` |
/// | `selection_intensity` | `0.01` |
///
/// # References
/// [1](https://doi.org/10.1038/nature02414)
/// Nowak, M., Sasaki, A., Taylor, C., Fudenberg, D.,
/// "Emergence of cooperation and evolutionary stability in finite
/// populations", Nature 428 (2004).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DonationGame {
    /// Benefit $b$ received from a cooperating opponent.
    pub benefit: f64,
    /// Cost $c$ paid by a cooperator per opponent.
    pub cost: f64,
    /// Selection intensity $\\delta$ of the fitness mapping.
    pub selection_intensity: f64,
}

impl Default for DonationGame {
    fn default() -> Self {
        DonationGame {
            benefit: 10.0,
            cost: 5.0,
            selection_intensity: 0.01,
        }
    }
}

impl DonationGame {
    /// Creates a game with the given payoff parameters.
    pub fn new(benefit: f64, cost: f64, selection_intensity: f64) -> Self {
        DonationGame {
            benefit,
            cost,
            selection_intensity,
        }
    }

    /// Payoff of the focal strategy against one opponent.
    ///
    /// | focal | opponent | payoff |
    /// | --- | --- | --- |
    /// | Cooperator | Cooperator | $b - c$ |
    /// | Defector | Cooperator | $b$ |
    /// | Cooperator | Defector | $-c$ |
    /// | Defector | Defector | $0$ |
    pub fn pairwise_payoff(&self, focal: Strategy, opponent: Strategy) -> f64 {
        match (focal, opponent) {
            (Strategy::Cooperator, Strategy::Cooperator) => self.benefit - self.cost,
            (Strategy::Defector, Strategy::Cooperator) => self.benefit,
            (Strategy::Cooperator, Strategy::Defector) => -self.cost,
            (Strategy::Defector, Strategy::Defector) => 0.0,
        }
    }

    /// Payoff of one cell accumulated over all of its neighbors.
    ///
    /// A cell without neighbors accumulates a payoff of zero.
    pub fn accumulated_payoff<P>(&self, population: &P, index: usize) -> Result<f64, CalcError>
    where
        P: CellPopulation,
    {
        let focal = population.record(index)?.strategy;
        let mut payoff = 0.0;
        for neighbor in population.neighbor_indices(index)? {
            let opponent = population.record(neighbor)?.strategy;
            payoff += self.pairwise_payoff(focal, opponent);
        }
        Ok(payoff)
    }

    /// Maps an accumulated payoff to a fitness value.
    pub fn fitness_of_payoff(&self, payoff: f64) -> f64 {
        (1.0 + self.selection_intensity).powf(payoff)
    }

    /// Fitness of one cell in its current neighborhood.
    pub fn fitness<P>(&self, population: &P, index: usize) -> Result<f64, CalcError>
    where
        P: CellPopulation,
    {
        Ok(self.fitness_of_payoff(self.accumulated_payoff(population, index)?))
    }

    /// Recomputes and stores the fitness of every cell.
    ///
    /// Cells are processed in [cell_indices](CellPopulation::cell_indices)
    /// order. Each fitness depends only on the strategies of the cell and
    /// its neighbors, never on previously written fitness values, so the
    /// result is independent of this order.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn update_fitness<P>(&self, population: &mut P) -> Result<(), CalcError>
    where
        P: CellPopulation,
    {
        for index in population.cell_indices() {
            let fitness = self.fitness(population, index)?;
            population.record_mut(index)?.fitness = fitness;
        }
        Ok(())
    }
}


#[cfg(test)]
mod test_fitness {
    use super::*;

    #[test]
    fn fitness_is_strictly_positive_for_any_payoff() {
        let game = DonationGame::default();
        for payoff in -40..=40 {
            assert!(game.fitness_of_payoff(payoff as f64) > 0.0);
        }
    }

    #[test]
    fn three_cooperating_neighbors_give_the_known_fitness() {
        let game = DonationGame::default();
        // payoff 3 * (b - c) = 15 at intensity 0.01
        let fitness = game.fitness_of_payoff(15.0);
        assert!((fitness - 1.1610).abs() < 1e-3);
    }

    #[test]
    fn one_payoff_unit_scales_fitness_by_one_plus_intensity() {
        let game = DonationGame::default();
        for payoff in [-10.0, -1.0, 0.0, 4.0, 25.0] {
            let ratio = game.fitness_of_payoff(payoff + 1.0) / game.fitness_of_payoff(payoff);
            assert!((ratio - 1.01).abs() < 1e-12);
        }
    }

    #[test]
    fn update_fitness_writes_every_record() {
        use crate::monolayer::HoneycombMonolayer;
        let mut population = HoneycombMonolayer::new(2, 1).unwrap();
        population.record_mut(1).unwrap().strategy = Strategy::Defector;
        let game = DonationGame::default();
        game.update_fitness(&mut population).unwrap();
        assert_eq!(
            population.record(0).unwrap().fitness,
            game.fitness_of_payoff(-5.0)
        );
        assert_eq!(
            population.record(1).unwrap().fitness,
            game.fitness_of_payoff(10.0)
        );
    }
}
