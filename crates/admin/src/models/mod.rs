//! Domain models for the admin application.

pub mod product;
pub mod session;
pub mod user;

pub use product::{ImageRef, Product};
pub use session::{CurrentUser, session_keys};
pub use user::User;
