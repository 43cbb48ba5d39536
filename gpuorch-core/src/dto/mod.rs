//! Data Transfer Objects for the orchestration API
//!
//! Request bodies, query strings and response envelopes exchanged with
//! the service. Domain types carry the payloads themselves.

pub mod job;
