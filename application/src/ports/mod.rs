//! Ports: interfaces between the application layer and the outside world

pub mod backend;
pub mod events;
pub mod registry;
pub mod store;
