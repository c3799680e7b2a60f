//! Application layer for roundtable
//!
//! Use cases (round execution, record compaction, round orchestration)
//! and the ports they depend on. Adapters implementing the ports live in
//! the infrastructure layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    backend::{BackendError, ChatRequest, ModelBackend, StreamHandle},
    events::{RoundEvent, RoundEventTx},
    registry::ModelRegistry,
    store::{SessionStore, StoreError, TranscriptExporter},
};
pub use use_cases::{
    compact_record::CompactRecordUseCase,
    execute_round::{ExecuteRoundError, ExecuteRoundInput, ExecuteRoundUseCase},
    run_round::{RunRoundError, RunRoundInput, RunRoundUseCase},
};
