//! AtomicAssets indexer client
//!
//! Read side for everything NFT-shaped: template metadata for the whole
//! collection plus per-player wallet assets and minerals. Every fetch is
//! cache-first; the indexer is only hit when the slot is missing or stale.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cache::{keys, Cache};
use crate::config::TtlPolicy;
use crate::constants::schemas;
use crate::transport::Transport;
use crate::types::{AssetTemplate, AtomicAsset};
use crate::util_json;

/// Listing envelope returned by every indexer collection endpoint.
#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
}

/// Raw row from `/atomicassets/v1/templates`. The indexer serves
/// `template_id` as a string.
#[derive(Debug, Deserialize)]
struct TemplateRow {
    #[serde(deserialize_with = "util_json::u32_string_or_number")]
    template_id: u32,
    #[serde(default)]
    immutable_data: NftData,
    schema: SchemaRef,
}

#[derive(Debug, Default, Deserialize)]
struct NftData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    img: String,
    #[serde(default)]
    rarity: String,
}

#[derive(Debug, Deserialize)]
struct SchemaRef {
    schema_name: String,
}

/// Raw row from `/atomicassets/v1/assets`.
#[derive(Debug, Deserialize)]
struct AssetRow {
    #[serde(deserialize_with = "util_json::string_or_number")]
    asset_id: String,
    #[serde(default)]
    data: NftData,
    #[serde(default, deserialize_with = "util_json::u64_string_or_number")]
    template_mint: u64,
    template: Option<TemplateRef>,
    schema: SchemaRef,
}

#[derive(Debug, Deserialize)]
struct TemplateRef {
    #[serde(deserialize_with = "util_json::u32_string_or_number")]
    template_id: u32,
}

pub struct AtomicClient {
    base_url: String,
    collection: String,
    transport: Arc<dyn Transport>,
    cache: Cache,
    ttl: TtlPolicy,
}

impl AtomicClient {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        transport: Arc<dyn Transport>,
        cache: Cache,
        ttl: TtlPolicy,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            collection: collection.into(),
            transport,
            cache,
            ttl,
        }
    }

    /// Template metadata for the whole collection (first 1000 templates).
    pub async fn fetch_templates(&self) -> Result<Vec<AssetTemplate>> {
        if let Some(cached) = self.cache.get::<Vec<AssetTemplate>>(keys::TEMPLATES) {
            log::debug!("[atomic] templates served from cache ({})", cached.len());
            return Ok(cached);
        }

        let url = format!("{}/atomicassets/v1/templates", self.base_url);
        let query = [
            ("collection_name", self.collection.as_str()),
            ("page", "1"),
            ("limit", "1000"),
            ("order", "desc"),
            ("sort", "created"),
        ];
        let body = self.transport.get_json(&url, &query).await?;
        let page: Page<TemplateRow> =
            serde_json::from_value(body).context("unexpected template listing shape")?;

        let templates: Vec<AssetTemplate> = page
            .data
            .into_iter()
            .map(|row| AssetTemplate {
                template_id: row.template_id,
                name: row.immutable_data.name,
                img: row.immutable_data.img,
                rarity: row.immutable_data.rarity,
                schema_name: row.schema.schema_name,
            })
            .collect();

        log::info!("[atomic] fetched {} templates", templates.len());
        self.cache.set(keys::TEMPLATES, &templates, self.ttl.templates);
        Ok(templates)
    }

    /// Every collection NFT sitting in the player's wallet.
    pub async fn fetch_player_assets(&self, account: &str) -> Result<Vec<AtomicAsset>> {
        let key = keys::assets(account);
        if let Some(cached) = self.cache.get::<Vec<AtomicAsset>>(&key) {
            log::debug!("[atomic] assets.{account} served from cache ({})", cached.len());
            return Ok(cached);
        }

        let assets = self.fetch_owned(account, None).await?;
        log::info!("[atomic] fetched {} assets for {account}", assets.len());
        self.cache.set(&key, &assets, self.ttl.instances);
        Ok(assets)
    }

    /// Mineral NFTs only, filtered server-side by schema.
    pub async fn fetch_player_minerals(&self, account: &str) -> Result<Vec<AtomicAsset>> {
        let key = keys::minerals(account);
        if let Some(cached) = self.cache.get::<Vec<AtomicAsset>>(&key) {
            log::debug!("[atomic] minerals.{account} served from cache ({})", cached.len());
            return Ok(cached);
        }

        let minerals = self.fetch_owned(account, Some(schemas::MINERALS)).await?;
        log::info!("[atomic] fetched {} minerals for {account}", minerals.len());
        self.cache.set(&key, &minerals, self.ttl.instances);
        Ok(minerals)
    }

    async fn fetch_owned(&self, account: &str, schema: Option<&str>) -> Result<Vec<AtomicAsset>> {
        let url = format!("{}/atomicassets/v1/assets", self.base_url);
        let mut query = vec![
            ("collection_name", self.collection.as_str()),
            ("owner", account),
            ("page", "1"),
            ("limit", "1000"),
            ("order", "desc"),
            ("sort", "created"),
        ];
        if let Some(schema) = schema {
            query.push(("schema_name", schema));
        }

        let body = self.transport.get_json(&url, &query).await?;
        let page: Page<AssetRow> =
            serde_json::from_value(body).context("unexpected asset listing shape")?;

        let assets = page
            .data
            .into_iter()
            .filter_map(|row| {
                // templateless NFTs cannot join any game data
                let template = row.template?;
                Some(AtomicAsset {
                    asset_id: row.asset_id,
                    template_id: template.template_id,
                    name: row.data.name,
                    img: row.data.img,
                    rarity: row.data.rarity,
                    schema_name: row.schema.schema_name,
                    mint: row.template_mint,
                })
            })
            .collect();
        Ok(assets)
    }
}
