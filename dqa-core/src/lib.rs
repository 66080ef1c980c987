// dqa-core/src/lib.rs

// 1. Documentation is not mandatory yet
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts for external collaborators (rule sources, catalog, resolver).
pub mod ports;

// 2. Domain (business core)
// Result records, schema versions, rule language, rank engine, conflicts.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (Adapters)
// CSV codec, config files, subprocess resolver, HTTP/filesystem sources.
pub mod infrastructure;

// 4. Application (Use Cases)
// Rank assignment, merge orchestration, templates, validation, migration.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use dqa_core::DqaError;
pub use error::DqaError;
