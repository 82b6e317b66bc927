//! # slablru
//!
//! Fixed-capacity, thread-safe LRU cache with O(1) `put` and `get`.
//!
//! ## Architecture
//! - **Pool**: slab of entries reserved at construction, bump-allocated
//!   until full, then recycled from the LRU victim
//! - **Recency list**: doubly linked list over an index arena with head and
//!   tail sentinels (MRU after head, LRU before tail)
//! - **Index**: AHash map from key to slot (O(1))
//! - **Locking**: one `parking_lot::Mutex` per cache; reads promote, so
//!   there is no shared read path
//!
//! ```
//! use slablru::LruCache;
//!
//! let cache = LruCache::new(2)?;
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get("a");      // a is now most recently used
//! cache.put("c", 3);   // evicts b
//!
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.keys(), vec!["c", "a"]);
//! # Ok::<(), slablru::Error>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod index;
mod list;
mod pool;
mod stats;

pub use cache::LruCache;
pub use error::{Error, Result};
pub use stats::{CacheStats, StatsSnapshot};
