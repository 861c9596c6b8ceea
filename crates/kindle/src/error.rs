//! Error types for the world and its scheduler.

use thiserror::Error;

use crate::ecs::Entity;

/// Boxed error returned by [`System::init`](crate::ecs::System::init).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything the component store, global store, bus and scheduler can fail with.
#[derive(Debug, Error)]
pub enum EcsError {
    #[error("entity {0} is not alive")]
    InvalidEntity(Entity),

    #[error("entity {entity} has no `{component}` component")]
    ComponentMissing {
        entity: Entity,
        component: &'static str,
    },

    #[error("global `{0}` has not been set")]
    GlobalMissing(&'static str),

    #[error("system `{system}` failed to initialise: {reason}")]
    SystemInitFailure { system: String, reason: String },

    #[error("no system is currently running")]
    NoRunningSystem,
}

pub type Result<T, E = EcsError> = std::result::Result<T, E>;
