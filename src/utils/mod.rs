// Utility functions

pub mod datauri;
pub mod logger;

pub use datauri::*;
pub use logger::*;
