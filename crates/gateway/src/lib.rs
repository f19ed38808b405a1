#![forbid(unsafe_code)]

//! Boundary to the quiz backend: fetch, grading and statistics.

pub mod api;
pub mod grading;
pub mod http;
pub mod in_memory;

pub use api::{GatewayError, Page, QuizGateway, RequestContext, StatsGateway};
pub use http::{ApiConfig, HttpGateway};
pub use in_memory::InMemoryGateway;
