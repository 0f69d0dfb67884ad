pub mod app;
pub mod error;
pub mod logic;
pub mod model;
