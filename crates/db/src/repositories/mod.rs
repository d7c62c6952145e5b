//! Repository abstractions for data access.
//!
//! Repositories implement the persistence traits from `coursekit-core`,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod course;
pub mod material;
pub mod user;

pub use course::CourseRepository;
pub use material::MaterialRepository;
pub use user::UserRepository;
