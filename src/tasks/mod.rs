//! [Tasks](TaskContext) are the only way to mutate a [World](crate::world::World) concurrently.

mod query;
mod scheduler;
mod change_list;
mod task_context;

pub use query::*;
pub use scheduler::TaskMode;
pub use task_context::TaskContext;

pub(crate) use change_list::*;
pub(crate) use scheduler::ScheduleState;
