//! he3x - WAX Mining Game Client
//!
//! This library provides the core functionality for he3x, a headless client
//! for a moon-mining game on the WAX blockchain. It fetches NFT metadata
//! from an AtomicAssets indexer and live game state from chain tables,
//! merges both into typed views behind a TTL cache, and builds the signed
//! transactions that mutate the game, invalidating exactly the cache slots
//! each action dirties.
//!
//! ## Architecture
//!
//! Reads and writes are split:
//! - [`client::GameClient`] owns the fetch/merge pipeline and never signs
//! - [`mutations::Mutator`] owns an [`actions::Signer`] plus the cache
//!   slots its actions dirty
//!
//! Both share one [`cache::Cache`], so a mutation's invalidation is visible
//! to the next view fetch.
//!
//! ## Usage
//!
//! ```bash
//! he3x --account miner.wam --view dashboard
//! ```

// Core modules
pub mod config;
pub mod constants;
pub mod token;
pub mod types;
pub mod util_json;

// Storage and transport
pub mod cache;
pub mod transport;

// Fetchers (indexer and chain tables, both cache-fronted)
pub mod atomic_api;
pub mod chain_api;

// View assembly and game predicates
pub mod aggregate;

// Transactions: builders, the signing seam, the mutation coordinator
pub mod actions;
pub mod mutations;

// Per-session facade over the fetchers
pub mod client;

// Re-export commonly used types
pub use cache::Cache;
pub use client::{Dashboard, FuelView, GameClient, Inventory, MineralsView};
pub use config::{Config, TtlPolicy, View};
pub use mutations::{MutationError, Mutator};
pub use token::Token;
pub use types::Session;
