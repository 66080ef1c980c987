pub mod model;
pub mod project;

pub use crate::domain::project::DqaConfig;
pub use model::load_data_model;
pub use project::{load_or_default, load_project_config};
