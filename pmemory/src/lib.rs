//! Durable chat storage backends.
//!
//! ```rust
//! use pmemory::SqliteChatStore;
//!
//! let store = SqliteChatStore::new_in_memory().expect("in-memory store should open");
//! let _ = store;
//! ```

mod sqlite;

pub use sqlite::{default_sqlite_path, SqliteChatStore};

pub mod prelude {
    pub use crate::{default_sqlite_path, SqliteChatStore};
}
