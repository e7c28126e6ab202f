//! Order lifecycle
//!
//! - [`machine`] - pure transition functions and the create guard
//! - [`service`] - operations invoked by the HTTP handlers
//! - [`OrderError`] - state-machine rejections

pub mod error;
pub mod machine;
pub mod service;

pub use error::OrderError;
pub use machine::{OrderDraft, PlaceOrder, Transition, TransitionStep};
