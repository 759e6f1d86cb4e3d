//! Routing module
//!
//! Static route table for the calculator and user endpoints.

pub mod matcher;

pub use matcher::{match_route, Endpoint, RouteMatch};
