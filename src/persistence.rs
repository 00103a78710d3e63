//! Loading and persisting the value store between check cycles.
//!
//! The store is loaded once before the services of a host are checked and persisted once
//! afterwards. Only one process may work on a stored file at a time.
mod error;
mod json;
mod persister;

pub use error::{Error, Result};
pub use json::JsonFilePersister;
pub use persister::StorePersister;
