//! Error types for request validation and service setup.
//!
//! An infeasible shipment is not an error: it is reported through
//! [`OptimizationStatus::Infeasible`](crate::domain::OptimizationStatus) on
//! a normal result. Everything here means the caller asked a malformed
//! question or the service could not start.

use crate::catalog::EntityType;

/// Errors raised by the routing engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("no {entity_type} with id {id}")]
    UnknownEntity { entity_type: EntityType, id: u32 },

    #[error("{0} entries have no fixed location")]
    UnlocatedEntityType(EntityType),

    #[error("quantity must be a positive integer, got {0}")]
    InvalidQuantity(i64),

    #[error("freshness life must be positive, got {0} hours")]
    InvalidFreshnessLife(f64),

    #[error("no transport candidates supplied")]
    NoCandidates,

    #[error("invalid transport option {id}: {reason}")]
    InvalidCandidate { id: u32, reason: String },

    #[error("number of orders must be between 1 and {}", crate::simulation::MAX_ORDERS)]
    InvalidOrderCount,

    #[error("configuration error: {0}")]
    Config(String),
}

impl RoutingError {
    /// Returns true when the error stems from caller input rather than the
    /// service itself.
    ///
    /// ```
    /// use perishable_routing::error::RoutingError;
    ///
    /// assert!(RoutingError::InvalidQuantity(0).is_invalid_input());
    /// assert!(!RoutingError::Config("bad port".into()).is_invalid_input());
    /// ```
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, RoutingError::Config(_))
    }
}
