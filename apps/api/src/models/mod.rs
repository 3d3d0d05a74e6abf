pub mod application;
pub mod consent;
