//! Application services: authentication, image hosting, product flow.

pub mod auth;
pub mod imagekit;
pub mod products;

pub use auth::{AuthError, AuthService};
pub use imagekit::{ImageHost, ImageHostError, ImageKitClient, UploadedImage};
pub use products::{ProductFlowError, ProductService};
