//! Use cases: the round engine

pub mod compact_record;
pub mod execute_round;
pub mod run_round;
