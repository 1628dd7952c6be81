//! Query client: cached reads, mutations and their cache effects.

mod client;
mod mutation;

pub use client::{QueryClient, QueryState};
pub use mutation::{MutationHandle, MutationKind};
