//! Cell cycle model coupling division to the selection controller.
//!
//! The model has no internal clock. It divides exactly when the
//! [divide](crate::concepts::CellRecord::divide) flag of a cell is set and
//! consumes the flag in the same call, so one selection event produces at
//! most one division.

use serde::{Deserialize, Serialize};

use crate::concepts::{CellRecord, Cycle, CycleEvent};
use crate::errors::DivisionError;

/// Divides a cell if and only if its divide flag is set.
///
/// The cycle durations are carried for configuration hand-off and the
/// parameter report. No rule in this crate reads them; timing is fully
/// determined by the selection period.
///
/// | Parameter | Default |
/// | --- | --- |
/// | `min_cell_cycle_duration` | `12.0` |
/// | `max_cell_cycle_duration` | `14.0` |
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FlagDrivenCycleModel {
    /// Shortest admissible cell cycle duration.
    pub min_cell_cycle_duration: f64,
    /// Longest admissible cell cycle duration.
    pub max_cell_cycle_duration: f64,
}

impl Default for FlagDrivenCycleModel {
    fn default() -> Self {
        FlagDrivenCycleModel {
            min_cell_cycle_duration: 12.0,
            max_cell_cycle_duration: 14.0,
        }
    }
}

impl FlagDrivenCycleModel {
    /// Creates a model with the given duration bounds.
    pub fn new(min_cell_cycle_duration: f64, max_cell_cycle_duration: f64) -> Self {
        FlagDrivenCycleModel {
            min_cell_cycle_duration,
            max_cell_cycle_duration,
        }
    }

    /// Mean of the two duration bounds.
    pub fn average_cell_cycle_time(&self) -> f64 {
        0.5 * (self.min_cell_cycle_duration + self.max_cell_cycle_duration)
    }
}

impl Cycle<CellRecord> for FlagDrivenCycleModel {
    fn update_cycle(
        _rng: &mut rand_chacha::ChaCha8Rng,
        _dt: &f64,
        cell: &mut CellRecord,
    ) -> Option<CycleEvent> {
        if cell.divide {
            cell.divide = false;
            return Some(CycleEvent::Division);
        }
        None
    }

    fn divide(
        _rng: &mut rand_chacha::ChaCha8Rng,
        cell: &mut CellRecord,
    ) -> Result<CellRecord, DivisionError> {
        cell.divide = false;
        cell.fitness = 1.0;
        // the daughter inherits type, strategy and target area
        Ok(cell.clone())
    }
}

#[cfg(test)]
mod test_flag_consumption {
    use super::*;
    use crate::concepts::Strategy;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn set_flag_triggers_exactly_one_division() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
        let mut cell = CellRecord::default();
        cell.divide = true;
        let dt = 0.005;
        assert_eq!(
            FlagDrivenCycleModel::update_cycle(&mut rng, &dt, &mut cell),
            Some(CycleEvent::Division)
        );
        assert!(!cell.divide);
        assert_eq!(
            FlagDrivenCycleModel::update_cycle(&mut rng, &dt, &mut cell),
            None
        );
    }

    #[test]
    fn unflagged_cell_never_divides() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
        let mut cell = CellRecord::default();
        let dt = 0.005;
        for _ in 0..100 {
            assert_eq!(
                FlagDrivenCycleModel::update_cycle(&mut rng, &dt, &mut cell),
                None
            );
        }
    }

    #[test]
    fn division_resets_parent_and_daughter() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
        let mut parent = CellRecord::new(1, Strategy::Defector);
        parent.fitness = 2.5;
        parent.divide = true;
        parent.target_area = 0.9;
        let daughter = FlagDrivenCycleModel::divide(&mut rng, &mut parent).unwrap();

        assert_eq!(parent.fitness, 1.0);
        assert!(!parent.divide);

        assert_eq!(daughter.cell_type, 1);
        assert_eq!(daughter.strategy, Strategy::Defector);
        assert_eq!(daughter.fitness, 1.0);
        assert!(!daughter.divide);
        assert_eq!(daughter.target_area, 0.9);
    }

    #[test]
    fn average_cycle_time_is_the_mean_of_the_bounds() {
        let model = FlagDrivenCycleModel::default();
        assert_eq!(model.average_cell_cycle_time(), 13.0);
    }
}
