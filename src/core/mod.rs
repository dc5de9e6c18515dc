//! Leaf functionality shared by every layer: math, constants, errors, logging.

#[macro_use]
#[path = "utils/safety.rs"]
pub mod safety;

pub mod constants;
pub mod error;
pub mod logging;
pub mod math;
