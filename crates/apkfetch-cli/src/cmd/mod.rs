pub mod completions;
pub mod fetch;
pub mod inspect;
pub mod summary;
