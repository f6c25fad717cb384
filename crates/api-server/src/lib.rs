#![warn(clippy::unwrap_used)]

pub mod rest;
pub mod server;
pub mod session;
pub mod swagger;

pub use rest::AppState;
pub use server::{router, ApiServer};
pub use swagger::ApiDoc;
