//! `SeaORM` entity definitions.

pub mod course_materials;
pub mod courses;
pub mod password_reset_tokens;
pub mod user_sessions;
pub mod users;

pub mod prelude {
    //! Entity re-exports.
    pub use super::course_materials::Entity as CourseMaterials;
    pub use super::courses::Entity as Courses;
    pub use super::password_reset_tokens::Entity as PasswordResetTokens;
    pub use super::user_sessions::Entity as UserSessions;
    pub use super::users::Entity as Users;
}
