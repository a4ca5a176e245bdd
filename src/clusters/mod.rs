//! [Clusters](Cluster) store all entities sharing one exact set of
//! [components](crate::components::Component) and [tags](crate::entities::Tag).

mod cluster;
mod cluster_registry;

pub use cluster::{Chunk, Cluster, ClusterId};

pub(crate) use cluster_registry::ClusterRegistry;
