use crate::entities::Entity;
use thiserror::Error;

pub type EcsResult<T> = Result<T, EcsError>;

/// Recoverable lookup failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EcsError {
	/// The handle is stale, was never created, or its creation has not been applied yet.
	#[error("entity {0} not found")]
	EntityNotFound(Entity),

	/// The entity exists but its cluster has no such component.
	#[error("entity {entity} has no component {component}")]
	ComponentNotFound { entity: Entity, component: &'static str },
}
