pub mod apply;
pub mod data;
pub mod import;
pub mod plan;
pub mod schema;
pub mod state;
pub mod validate;
