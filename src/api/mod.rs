pub mod error;
pub mod page;
pub mod rest;

pub use rest::router;
