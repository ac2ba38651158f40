//! Domain records
//!
//! The normalized shapes produced by the fetchers. Three of them describe the
//! same NFT from different angles: [`AssetTemplate`] (immutable collection
//! metadata), [`ToolConfig`] (per-template game parameters) and
//! [`ContractAsset`] (live per-instance state). `aggregate` merges them into
//! view types keyed by `template_id`.

use serde::{Deserialize, Serialize};

use crate::constants::chain;
use crate::token::Token;

/// Immutable template metadata from the AtomicAssets indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetTemplate {
    pub template_id: u32,
    pub name: String,
    pub img: String,
    pub rarity: String,
    pub schema_name: String,
}

/// An owned NFT as listed by the indexer (wallet inventory and minerals).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicAsset {
    pub asset_id: String,
    pub template_id: u32,
    pub name: String,
    pub img: String,
    pub rarity: String,
    pub schema_name: String,
    /// Mint number within the template run (1 = first minted).
    pub mint: u64,
}

/// Live per-instance state from the game contract's `machines` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAsset {
    pub asset_id: String,
    pub template_id: u32,
    pub owner: String,
    /// Seconds since epoch of the last reward claim.
    pub last_claim: i64,
    /// Per-instance claim delay override in seconds. `None` defers to the
    /// template's configured delay.
    pub delay: Option<u32>,
    pub power: Vec<Token>,
    /// Fuel currently deposited on the instance.
    pub token_reserve: Vec<Token>,
}

/// Tool category as stored in the `bconfigs` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Building,
    Machine,
}

/// Per-template game parameters from the `bconfigs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub template_id: u32,
    pub kind: ToolKind,
    /// Fuel required per claim cycle.
    pub token_input: Vec<Token>,
    /// Reward produced per claim cycle.
    pub token_output: Vec<Token>,
    /// Default claim delay in seconds.
    pub delay: u32,
    pub max_storage: Option<Token>,
    pub rarity_id: u32,
}

/// One shop entry: a mineral template purchasable for a resource price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopListing {
    pub template_id: u32,
    pub price: Token,
}

/// The signed-in wallet context, passed explicitly to everything that is
/// account-scoped. Nothing in the crate holds ambient login state.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: String,
    pub permission: String,
}

impl Session {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            permission: chain::DEFAULT_PERMISSION.to_string(),
        }
    }

    pub fn with_permission(account: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            permission: permission.into(),
        }
    }
}
