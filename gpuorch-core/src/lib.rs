//! GPU Orchestrator Core
//!
//! Core types shared by the orchestrator client and CLI.
//!
//! This crate contains:
//! - Domain types: job snapshots as reported by the orchestration service
//! - DTOs: request/response payloads exchanged with the service
//! - Spec: the typed job specification document and its YAML rendering

pub mod domain;
pub mod dto;
pub mod spec;
