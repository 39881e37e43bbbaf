pub mod json_store;
pub mod memory;

pub use json_store::{JsonCourseStore, StoreError};
pub use memory::InMemoryCourseIndex;
