// Adapters layer: concrete implementations for external systems (storage, gradebook).

pub mod gradebook;
pub mod storage;
