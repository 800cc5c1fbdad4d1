//! Handy re-exports of all rules, populations and configuration objects.

pub use crate::concepts::*;
pub use crate::cycle::*;
pub use crate::errors::*;
pub use crate::game::*;
pub use crate::monolayer::*;
pub use crate::parameters::*;
pub use crate::report::*;
pub use crate::selection::*;
pub use crate::tension::*;
