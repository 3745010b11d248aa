//! Gateway request handlers

pub mod link;
pub mod service;
pub mod upload;

pub use link::*;
pub use service::*;
pub use upload::*;
