//! Discussion entities and value objects

pub mod entities;
pub mod message;
pub mod record;
pub mod round;
pub mod stream;
