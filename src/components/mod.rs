mod component_id;
mod component_type;
mod component_macros;

pub use component_id::*;
pub use component_type::*;
pub use cluster_ecs_derive::Component;
