//! Async state store for the todo API.
//!
//! # Overview
//! `ApiGateway` pairs a `todo_api::TodoClient` with a `Transport` and turns
//! each endpoint into one awaitable call. `TodoStore` sits on top of it and
//! owns everything a todo view renders: the current page of todos, the
//! category list, filter and paging state, summary statistics and the
//! loading flag.
//!
//! # Design
//! - Readers take a `Snapshot` or `subscribe` to a `watch` channel.
//! - Only the most recently issued list request may write the todo list.
//! - Mutations reload the list after the server accepts them.
//! - `UreqTransport` is the default transport; tests plug in their own.

pub mod config;
pub mod gateway;
pub mod state;
pub mod store;
pub mod transport;

pub use config::{ConfigError, StoreConfig};
pub use gateway::ApiGateway;
pub use state::{FilterState, Snapshot};
pub use store::{Mutation, Refresh, TodoStore};
pub use transport::{Transport, UreqTransport};

pub use todo_api;
