#![deny(missing_docs)]
//! # tissue_games
//!
//! Evolutionary game dynamics coupled to cell proliferation for vertex-model
//! tissue simulations.
//!
//! Cells play a donation game against their neighbors, the resulting payoffs
//! map to fitness values and a periodic controller selects one cell for
//! division proportional to fitness. Line-tension rules translate the cell
//! types and strategies into mechanical edge coefficients a host engine can
//! consume. All rules operate on the [CellPopulation](concepts::CellPopulation)
//! seam, so they run against the bundled
//! [HoneycombMonolayer](monolayer::HoneycombMonolayer) as well as against an
//! external mesh.
//!
//! ```
//! use tissue_games::prelude::*;
//! use rand_chacha::rand_core::SeedableRng;
//!
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
//! let mut patch = HoneycombMonolayer::new(4, 4)?;
//! patch.randomize_strategies(0.1, &mut rng);
//!
//! let controller = ProliferationController::default();
//! let winner = controller.update_at_end_of_time_step(&mut patch, 0.0, 0.005, &mut rng)?;
//! assert!(winner.is_some());
//! # Ok::<(), tissue_games::errors::SimulationError>(())
//! ```

pub mod concepts;
pub mod cycle;
pub mod errors;
pub mod game;
pub mod monolayer;
pub mod parameters;
pub mod prelude;
pub mod report;
pub mod selection;
pub mod tension;
