//! Query cache.
//!
//! - `key`: cache keys derived from operation name and parameters
//! - `store`: entries with stale-while-revalidate state
//! - `invalidation`: the event → stale-keys table

pub mod invalidation;
mod key;
mod store;

pub use invalidation::{CacheAction, CacheEvent, CacheRule, CacheScope, CacheTarget};
pub use key::{QueryKey, QueryKind};
pub use store::{CacheEntry, QueryCache, QueryStatus};
