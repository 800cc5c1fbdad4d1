//! Fitness-proportional division selection.
//!
//! On a fixed period the controller recomputes all fitness values, draws one
//! cell with probability proportional to its fitness and marks it for
//! division by setting its [divide](crate::concepts::CellRecord::divide)
//! flag. The flag is consumed by
//! [FlagDrivenCycleModel](crate::cycle::FlagDrivenCycleModel) during the
//! following cycle sweep.
//!
//! Recomputing the fitness values is an independent per-cell map. The
//! selection itself is one cumulative pass over the population followed by a
//! single draw and has to stay sequential.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::concepts::CellPopulation;
use crate::errors::CalcError;
use crate::game::DonationGame;

/// Periodically selects one cell for division, proportional to fitness.
///
/// | Parameter | Default |
/// | --- | --- |
/// | `game` | [DonationGame::default] |
/// | `period` | `10.0` |
///
/// The period is measured in simulated time units and must be positive.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProliferationController {
    /// Game producing the fitness values.
    pub game: DonationGame,
    /// Time between two selection events.
    pub period: f64,
}

impl Default for ProliferationController {
    fn default() -> Self {
        ProliferationController {
            game: DonationGame::default(),
            period: 10.0,
        }
    }
}

impl ProliferationController {
    /// Creates a controller selecting every `period` time units.
    pub fn new(game: DonationGame, period: f64) -> Self {
        ProliferationController { game, period }
    }

    /// Checks whether a selection event falls on the current time step.
    ///
    /// The event at the multiple $k \\cdot T$ of the period fires on the one
    /// step whose time lies in the half-open window
    /// $(kT - \\Delta t / 2,\\, kT + \\Delta t / 2]$. Time zero counts as the
    /// zeroth multiple. Comparing against a window instead of the exact
    /// multiple keeps the trigger stable under accumulated floating-point
    /// drift of the time variable.
    pub fn is_due(&self, time: f64, dt: f64) -> bool {
        let nearest = (time / self.period).round();
        let offset = time - nearest * self.period;
        -0.5 * dt < offset && offset <= 0.5 * dt
    }

    /// Draws one cell with probability proportional to its stored fitness.
    ///
    /// Returns `Ok(None)` for an empty population. The fitness values are
    /// used as stored; call
    /// [update_fitness](DonationGame::update_fitness) first when they are
    /// stale.
    pub fn select_proportional_to_fitness<P>(
        &self,
        population: &P,
        rng: &mut rand_chacha::ChaCha8Rng,
    ) -> Result<Option<usize>, CalcError>
    where
        P: CellPopulation,
    {
        let indices = population.cell_indices();
        let mut total_fitness = 0.0;
        for &index in indices.iter() {
            total_fitness += population.record(index)?.fitness;
        }
        let sample = rng.gen_range(0.0..1.0);
        pick_by_cumulative(population, &indices, total_fitness, sample)
    }

    /// Runs the controller for the time step ending at `time`.
    ///
    /// Does nothing unless a selection event is due. Otherwise recomputes
    /// all fitness values, draws the dividing cell, sets its divide flag and
    /// returns its index.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn update_at_end_of_time_step<P>(
        &self,
        population: &mut P,
        time: f64,
        dt: f64,
        rng: &mut rand_chacha::ChaCha8Rng,
    ) -> Result<Option<usize>, CalcError>
    where
        P: CellPopulation,
    {
        if !self.is_due(time, dt) {
            return Ok(None);
        }
        self.game.update_fitness(population)?;
        match self.select_proportional_to_fitness(population, rng)? {
            Some(winner) => {
                population.record_mut(winner)?.divide = true;
                Ok(Some(winner))
            }
            None => Ok(None),
        }
    }
}

/// Scans the cumulative fitness distribution for the region containing the
/// sample.
///
/// Region $i$ covers $(c_{i-1}, c_i]$ with $c_i = \\sum_{j \\le i} f_j / F$
/// in [cell_indices](CellPopulation::cell_indices) order; the first region
/// additionally owns $0$. A sample on a region bound belongs to the lower
/// region. When rounding leaves $c_{n-1}$ below the sample the last region
/// wins.
fn pick_by_cumulative<P>(
    population: &P,
    indices: &[usize],
    total_fitness: f64,
    sample: f64,
) -> Result<Option<usize>, CalcError>
where
    P: CellPopulation,
{
    if indices.is_empty() {
        return Ok(None);
    }
    if !(total_fitness > 0.0) {
        return Err(CalcError(format!(
            "total fitness {} of {} cells is not positive",
            total_fitness,
            indices.len()
        )));
    }
    let mut cumulative = 0.0;
    for &index in indices.iter() {
        cumulative += population.record(index)?.fitness / total_fitness;
        if cumulative >= sample {
            return Ok(Some(index));
        }
    }
    Ok(indices.last().copied())
}

#[cfg(test)]
mod test_trigger {
    use super::*;

    #[test]
    fn time_zero_is_due() {
        let controller = ProliferationController::default();
        assert!(controller.is_due(0.0, 0.005));
    }

    #[test]
    fn each_period_multiple_fires_exactly_once() {
        let controller = ProliferationController::default();
        let dt = 0.005;
        let mut dues = 0;
        for step in 0..=4000 {
            let time = step as f64 * dt;
            if controller.is_due(time, dt) {
                dues += 1;
            }
        }
        // t = 0, 10 and 20
        assert_eq!(dues, 3);
    }

    #[test]
    fn times_between_multiples_are_not_due() {
        let controller = ProliferationController::default();
        assert!(!controller.is_due(5.0, 0.005));
        assert!(!controller.is_due(7.3, 0.005));
        assert!(!controller.is_due(9.99, 0.005));
    }

    #[test]
    fn custom_period_is_respected() {
        let controller = ProliferationController::new(DonationGame::default(), 2.5);
        assert!(controller.is_due(2.5, 0.01));
        assert!(controller.is_due(7.5, 0.01));
        assert!(!controller.is_due(10.1, 0.01));
    }
}

#[cfg(test)]
mod test_roulette {
    use super::*;
    use crate::concepts::CellRecord;
    use crate::errors::IndexError;
    use crate::monolayer::HoneycombMonolayer;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn sample_zero_selects_the_first_region() {
        let population = HoneycombMonolayer::new(2, 1).unwrap();
        let indices = population.cell_indices();
        let winner = pick_by_cumulative(&population, &indices, 2.0, 0.0).unwrap();
        assert_eq!(winner, Some(0));
    }

    #[test]
    fn sample_on_a_region_bound_selects_the_lower_region() {
        let population = HoneycombMonolayer::new(2, 1).unwrap();
        let indices = population.cell_indices();
        // equal fitness, the bound between both regions is exactly 0.5
        let winner = pick_by_cumulative(&population, &indices, 2.0, 0.5).unwrap();
        assert_eq!(winner, Some(0));
    }

    #[test]
    fn rounding_shortfall_clamps_to_the_last_region() {
        let population = HoneycombMonolayer::new(2, 1).unwrap();
        let indices = population.cell_indices();
        // an overestimated total leaves the last cumulative bound below the
        // sample, mimicking accumulated rounding errors
        let winner = pick_by_cumulative(&population, &indices, 4.0, 0.9).unwrap();
        assert_eq!(winner, Some(1));
    }

    #[test]
    fn non_positive_total_fitness_is_an_error() {
        let mut population = HoneycombMonolayer::new(2, 1).unwrap();
        population.record_mut(0).unwrap().fitness = 0.0;
        population.record_mut(1).unwrap().fitness = 0.0;
        let indices = population.cell_indices();
        assert!(pick_by_cumulative(&population, &indices, 0.0, 0.5).is_err());
    }

    #[test]
    fn draw_is_reproducible_for_a_fixed_seed() {
        let population = HoneycombMonolayer::new(4, 4).unwrap();
        let controller = ProliferationController::default();
        let first = {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
            controller
                .select_proportional_to_fitness(&population, &mut rng)
                .unwrap()
        };
        let second = {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
            controller
                .select_proportional_to_fitness(&population, &mut rng)
                .unwrap()
        };
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn draw_frequencies_approach_fitness_proportions() {
        let mut population = HoneycombMonolayer::new(2, 1).unwrap();
        population.record_mut(0).unwrap().fitness = 1.0;
        population.record_mut(1).unwrap().fitness = 3.0;
        let controller = ProliferationController::default();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        let n_draws = 10_000;
        let mut hits = 0;
        for _ in 0..n_draws {
            if controller
                .select_proportional_to_fitness(&population, &mut rng)
                .unwrap()
                == Some(1)
            {
                hits += 1;
            }
        }
        let frequency = hits as f64 / n_draws as f64;
        assert!((frequency - 0.75).abs() < 0.02);
    }

    #[test]
    fn empty_population_selects_nothing() {
        struct EmptyPopulation;
        impl CellPopulation for EmptyPopulation {
            fn n_cells(&self) -> usize {
                0
            }
            fn cell_indices(&self) -> Vec<usize> {
                Vec::new()
            }
            fn record(&self, index: usize) -> Result<&CellRecord, IndexError> {
                Err(IndexError(format!("no cell at index {index}")))
            }
            fn record_mut(&mut self, index: usize) -> Result<&mut CellRecord, IndexError> {
                Err(IndexError(format!("no cell at index {index}")))
            }
            fn neighbor_indices(
                &self,
                index: usize,
            ) -> Result<std::collections::BTreeSet<usize>, IndexError> {
                Err(IndexError(format!("no cell at index {index}")))
            }
        }
        let controller = ProliferationController::default();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let mut population = EmptyPopulation;
        let winner = controller
            .update_at_end_of_time_step(&mut population, 0.0, 0.005, &mut rng)
            .unwrap();
        assert_eq!(winner, None);
    }

    #[test]
    fn update_sets_exactly_one_divide_flag_when_due() {
        let mut population = HoneycombMonolayer::new(3, 3).unwrap();
        let controller = ProliferationController::default();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(5);
        let winner = controller
            .update_at_end_of_time_step(&mut population, 10.0, 0.005, &mut rng)
            .unwrap();
        let winner = winner.unwrap();
        let mut flagged = 0;
        for index in population.cell_indices() {
            if population.record(index).unwrap().divide {
                flagged += 1;
                assert_eq!(index, winner);
            }
        }
        assert_eq!(flagged, 1);
    }

    #[test]
    fn update_outside_the_period_is_a_no_op() {
        let mut population = HoneycombMonolayer::new(3, 3).unwrap();
        let controller = ProliferationController::default();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(5);
        let winner = controller
            .update_at_end_of_time_step(&mut population, 3.0, 0.005, &mut rng)
            .unwrap();
        assert_eq!(winner, None);
        for index in population.cell_indices() {
            assert!(!population.record(index).unwrap().divide);
        }
    }
}
