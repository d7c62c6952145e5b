//! Course management.
//!
//! Courses are the aggregate that material records hang off.

mod error;
mod service;
mod types;

pub use error::CourseError;
pub use service::{CourseRepository, CourseService};
pub use types::Course;
