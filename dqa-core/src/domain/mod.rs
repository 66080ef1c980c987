pub mod conflict;
pub mod error;
pub mod ident;
pub mod model;
pub mod ports;
pub mod project;
pub mod results;
pub mod rules;

// Re-exports for shorter imports elsewhere
pub use error::DomainError;
