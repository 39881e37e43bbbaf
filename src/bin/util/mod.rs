pub mod report;

pub use report::{print_courses, print_outcome};
