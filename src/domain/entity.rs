//! Domain Layer - Core Entity Trait and Errors
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Mutation-level write failures never propagate past the sync engine;
/// they are converted into user-visible notices there. `Provisioning`
/// and `Subscription` are fatal to session start / the live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Identity or default-layout setup failed. Fatal to session start.
    Provisioning(String),
    /// The live collection stream failed. No automatic re-subscription.
    Subscription(String),
    /// An individual mutation's remote dispatch failed. Non-fatal.
    Write(String),
    /// The tray is full; the mutation was rejected before any write.
    CapacityExceeded,
    NotFound(String),
    Internal(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::Provisioning(msg) => write!(f, "Provisioning failed: {}", msg),
            DomainError::Subscription(msg) => write!(f, "Subscription failed: {}", msg),
            DomainError::Write(msg) => write!(f, "Write failed: {}", msg),
            DomainError::CapacityExceeded => write!(f, "Tray capacity exceeded"),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
