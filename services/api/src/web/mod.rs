pub mod ai;
pub mod auth;
pub mod collections;
pub mod envelope;
pub mod middleware;
pub mod practice;
pub mod questions;
pub mod rest;
pub mod state;

pub use rest::build_router;
