//! Core domain types
//!
//! Read-only views of the entities owned by the orchestration service.
//! The client never mutates these; every fetch yields a fresh snapshot.

pub mod artifact;
pub mod event;
pub mod job;
