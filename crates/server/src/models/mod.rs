//! Domain models for the BookSearch server.

pub mod user;

pub use user::User;
