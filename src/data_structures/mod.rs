mod any_buffer;
mod staging_buffer;

pub(crate) use any_buffer::*;
pub(crate) use staging_buffer::*;
