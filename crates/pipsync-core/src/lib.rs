pub mod execution;
pub mod installer;
pub mod manifest;
pub mod models;
pub mod plan;
