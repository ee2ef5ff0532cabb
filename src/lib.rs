//! Jarvis brain: turns a task description into a time estimate and
//! breakdown from a hosted Claude model, inside a short-lived function
//! invocation.

pub mod client;
pub mod config;
pub mod consts;
pub mod context;
pub mod deadline;
pub mod error;
pub mod event;
pub mod handler;
pub mod inference;
pub mod local;
pub mod prompts;
pub mod response;

pub use error::{Error, Result};
pub use handler::Handler;
pub use response::{Envelope, format_response};
