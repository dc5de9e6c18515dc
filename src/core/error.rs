use thiserror::Error;

use crate::domain::handle::ObjectId;

/// Errors raised when building or configuring a world.
///
/// The tick itself never fails: degenerate state is absorbed by the solver.
/// These errors only come from creation-time preconditions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// A handle does not name a live object of the expected kind.
    #[error("unknown entity {0}")]
    UnknownEntity(ObjectId),
    /// Both ends of a link, joint or segment refer to the same object.
    #[error("degenerate link: both ends refer to {0}")]
    DegenerateLink(ObjectId),
    /// Shape parameters that cannot collide (non-positive or non-finite radius).
    #[error("invalid shape: {0}")]
    InvalidShape(&'static str),
    /// Configuration values that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// Configuration JSON that does not parse.
    #[error("config parse error: {0}")]
    ConfigParse(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;
