pub mod download;
pub mod staging;

pub use staging::{ScratchDir, discard, promote};
