//! Core functionality for task dispatch
//!
//! Contains the task table and the executor that walks a task's steps.

pub mod action;
pub mod dispatcher;

pub use action::{Action, Arg, Invocation, Removal, Step};
pub use dispatcher::Dispatcher;
