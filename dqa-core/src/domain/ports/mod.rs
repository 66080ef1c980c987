// src/domain/ports/mod.rs

pub mod schema;

pub use schema::SchemaProvider;
