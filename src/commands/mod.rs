pub mod documents;
pub mod questions;
pub mod settings;
