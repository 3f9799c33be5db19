//! Planner error kinds.

use thiserror::Error;

/// Failures returned by the planning operations.
///
/// Every variant except [`PlanError::Internal`] describes rejected input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("coverage radius must be positive, got {0}")]
    InvalidRadius(f64),

    #[error("start point ({x}, {y}) is not valid (outside field or in obstacle)")]
    InvalidStartPoint { x: f64, y: f64 },

    #[error("unknown pattern '{0}', choose from: zigzag, spiral, custom")]
    UnknownPattern(String),

    #[error("could not generate a valid path: only {0} point(s) produced")]
    InsufficientPath(usize),

    #[error("no route from ({}, {}) to ({}, {})", start.0, start.1, end.0, end.1)]
    NoRoute {
        start: (usize, usize),
        end: (usize, usize),
    },

    #[error("internal planning error: {0}")]
    Internal(String),
}

impl PlanError {
    /// True for caller input problems, false for planner malfunctions.
    pub fn is_validation(&self) -> bool {
        !matches!(self, PlanError::Internal(_))
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
