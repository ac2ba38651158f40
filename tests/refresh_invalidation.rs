//! Refresh cycle tests - mutations invalidate exactly the slots they dirty
//!
//! Drives a `GameClient` and a `Mutator` against one shared in-memory cache
//! and a canned network, then counts which endpoints are re-fetched after
//! each action. The contract under test: templates survive everything,
//! installed tools and wallet assets turn over on install/remove, tools
//! alone turn over on claim and fuel moves, minerals alone on mint/burn,
//! and a refused signature leaves every slot untouched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use he3x::actions::{SignOptions, SignReceipt, Signer, SignerError, Transaction};
use he3x::cache::{keys, Cache};
use he3x::client::GameClient;
use he3x::config::{Config, TtlPolicy, View};
use he3x::mutations::{MutationError, Mutator};
use he3x::token::parse_token;
use he3x::transport::Transport;
use he3x::types::Session;

const ACCOUNT: &str = "miner.wam";

/// Canned indexer and chain responses with per-endpoint hit counters.
struct GameNet {
    templates: AtomicUsize,
    assets: AtomicUsize,
    minerals: AtomicUsize,
    machines: AtomicUsize,
    bconfigs: AtomicUsize,
    shop: AtomicUsize,
    balances: AtomicUsize,
}

impl GameNet {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            templates: AtomicUsize::new(0),
            assets: AtomicUsize::new(0),
            minerals: AtomicUsize::new(0),
            machines: AtomicUsize::new(0),
            bconfigs: AtomicUsize::new(0),
            shop: AtomicUsize::new(0),
            balances: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Transport for GameNet {
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        if url.ends_with("/atomicassets/v1/templates") {
            self.templates.fetch_add(1, Ordering::SeqCst);
            return Ok(json!({ "data": [
                {
                    "template_id": "640001",
                    "immutable_data": { "name": "Helium Extractor", "img": "QmX1", "rarity": "Gold" },
                    "schema": { "schema_name": "machinephoe" }
                },
                {
                    "template_id": "640002",
                    "immutable_data": { "name": "Solar Array", "img": "QmX2", "rarity": "Silver" },
                    "schema": { "schema_name": "buildingphoe" }
                },
                {
                    "template_id": "640010",
                    "immutable_data": { "name": "Raw Helium", "img": "QmX3", "rarity": "Metal" },
                    "schema": { "schema_name": "moon.mineral" }
                }
            ] }));
        }
        if url.ends_with("/atomicassets/v1/assets") {
            if query.iter().any(|(k, _)| *k == "schema_name") {
                self.minerals.fetch_add(1, Ordering::SeqCst);
                return Ok(json!({ "data": [{
                    "asset_id": "987",
                    "data": {},
                    "template_mint": "5",
                    "template": { "template_id": "640010" },
                    "schema": { "schema_name": "moon.mineral" }
                }] }));
            }
            self.assets.fetch_add(1, Ordering::SeqCst);
            return Ok(json!({ "data": [
                {
                    "asset_id": "123",
                    "data": { "name": "Helium Extractor", "img": "QmX1", "rarity": "Gold" },
                    "template_mint": "12",
                    "template": { "template_id": "640001" },
                    "schema": { "schema_name": "machinephoe" }
                },
                {
                    "asset_id": "456",
                    "data": { "name": "Solar Array", "img": "QmX2", "rarity": "Silver" },
                    "template_mint": "3",
                    "template": { "template_id": "640002" },
                    "schema": { "schema_name": "buildingphoe" }
                }
            ] }));
        }
        anyhow::bail!("unexpected GET {url}")
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        anyhow::ensure!(
            url.ends_with("/v1/chain/get_table_rows"),
            "unexpected POST {url}"
        );
        match body["table"].as_str() {
            Some("machines") => {
                self.machines.fetch_add(1, Ordering::SeqCst);
                Ok(json!({ "rows": [{
                    "asset_id": "123",
                    "template_id": 640001,
                    "owner": ACCOUNT,
                    "last_claim": 1,
                    "power": [],
                    "token_in": ["5.0000 HTWO"]
                }], "more": false }))
            }
            Some("bconfigs") => {
                self.bconfigs.fetch_add(1, Ordering::SeqCst);
                Ok(json!({ "rows": [{
                    "template_id": 640001,
                    "type": "machine",
                    "token_in": ["1.0000 HTWO"],
                    "token_out": ["0.5000 HEL"],
                    "delay": 10,
                    "maxstorage": "100.0000 HTWO",
                    "rarity": 4
                }], "more": false }))
            }
            Some("shop") => {
                self.shop.fetch_add(1, Ordering::SeqCst);
                Ok(json!({ "rows": [
                    { "template_id": 640010, "price": "100.0000 HTWO" }
                ], "more": false }))
            }
            Some("balances") => {
                self.balances.fetch_add(1, Ordering::SeqCst);
                Ok(json!({ "rows": [
                    { "balance": "250.0000 HTWO" }
                ], "more": false }))
            }
            other => anyhow::bail!("unexpected table {other:?}"),
        }
    }
}

struct ApprovingSigner;

#[async_trait]
impl Signer for ApprovingSigner {
    async fn sign_transaction(
        &self,
        _tx: &Transaction,
        _opts: &SignOptions,
    ) -> Result<SignReceipt, SignerError> {
        Ok(SignReceipt::default())
    }
}

struct RefusingSigner;

#[async_trait]
impl Signer for RefusingSigner {
    async fn sign_transaction(
        &self,
        _tx: &Transaction,
        _opts: &SignOptions,
    ) -> Result<SignReceipt, SignerError> {
        Err(SignerError("user rejected the transaction".into()))
    }
}

fn test_config() -> Config {
    Config {
        account: Some(ACCOUNT.into()),
        permission: "active".into(),
        view: View::Dashboard,
        chain_url: "https://chain.test".into(),
        atomic_url: "https://indexer.test".into(),
        contract: "moonmhe3game".into(),
        collection: "moonminingh3".into(),
        http_timeout_ms: 8000,
        cache_dir: None,
        ttl: TtlPolicy::default(),
    }
}

fn harness(signer: Arc<dyn Signer>) -> (Arc<GameNet>, Cache, GameClient, Mutator, Session) {
    let net = GameNet::new();
    let cache = Cache::in_memory();
    let cfg = test_config();
    let client = GameClient::new(&cfg, net.clone(), cache.clone());
    let mutator = Mutator::new(cfg.contract.clone(), cache.clone(), signer);
    (net, cache, client, mutator, Session::new(ACCOUNT))
}

#[tokio::test]
async fn views_are_served_from_cache_until_invalidated() {
    let (net, _, client, _, _) = harness(Arc::new(ApprovingSigner));

    client.dashboard(ACCOUNT).await.unwrap();
    client.dashboard(ACCOUNT).await.unwrap();
    client.inventory(ACCOUNT).await.unwrap();

    assert_eq!(net.templates.load(Ordering::SeqCst), 1);
    assert_eq!(net.machines.load(Ordering::SeqCst), 1);
    assert_eq!(net.bconfigs.load(Ordering::SeqCst), 1);
    assert_eq!(net.assets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn remove_refetches_tools_and_assets_but_not_templates() {
    let (net, cache, client, mutator, session) = harness(Arc::new(ApprovingSigner));

    client.dashboard(ACCOUNT).await.unwrap();
    client.inventory(ACCOUNT).await.unwrap();

    let msg = mutator
        .remove_machine(&session, &["123".into()])
        .await
        .unwrap();
    assert_eq!(msg, "Asset removed successfully");

    assert!(cache.get::<Value>(&keys::tools(ACCOUNT)).is_none());
    assert!(cache.get::<Value>(&keys::assets(ACCOUNT)).is_none());
    assert!(cache.get::<Value>(keys::TEMPLATES).is_some());
    assert!(cache.get::<Value>(keys::TOOL_CONFIGS).is_some());

    client.dashboard(ACCOUNT).await.unwrap();
    client.inventory(ACCOUNT).await.unwrap();

    assert_eq!(net.machines.load(Ordering::SeqCst), 2);
    assert_eq!(net.assets.load(Ordering::SeqCst), 2);
    assert_eq!(net.templates.load(Ordering::SeqCst), 1);
    assert_eq!(net.bconfigs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn claim_turns_over_tools_alone() {
    let (net, cache, client, mutator, session) = harness(Arc::new(ApprovingSigner));

    let dash = client.dashboard(ACCOUNT).await.unwrap();
    client.inventory(ACCOUNT).await.unwrap();

    // last_claim=1 with a 10s delay is long past, and the reserve covers
    // the input, so machine 123 is claimable
    let msg = mutator.claim_ready(&session, &dash.machines).await.unwrap();
    assert_eq!(msg, "Rewards claimed successfully");

    assert!(cache.get::<Value>(&keys::tools(ACCOUNT)).is_none());
    assert!(cache.get::<Value>(&keys::assets(ACCOUNT)).is_some());

    client.dashboard(ACCOUNT).await.unwrap();
    assert_eq!(net.machines.load(Ordering::SeqCst), 2);
    assert_eq!(net.assets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn deposit_turns_over_tools_alone() {
    let (net, cache, client, mutator, session) = harness(Arc::new(ApprovingSigner));

    client.dashboard(ACCOUNT).await.unwrap();
    client.minerals(ACCOUNT).await.unwrap();

    let fuel = [parse_token("2.0000 HTWO")];
    mutator
        .deposit_assets(&session, "123", &fuel)
        .await
        .unwrap();

    assert!(cache.get::<Value>(&keys::tools(ACCOUNT)).is_none());
    assert!(cache.get::<Value>(&keys::minerals(ACCOUNT)).is_some());
    assert!(cache.get::<Value>(keys::SHOP_LISTINGS).is_some());

    client.dashboard(ACCOUNT).await.unwrap();
    assert_eq!(net.machines.load(Ordering::SeqCst), 2);
    assert_eq!(net.bconfigs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn burn_turns_over_minerals_alone() {
    let (net, cache, client, mutator, session) = harness(Arc::new(ApprovingSigner));

    client.minerals(ACCOUNT).await.unwrap();
    client.dashboard(ACCOUNT).await.unwrap();

    mutator.burn_mineral(&session, "987").await.unwrap();

    assert!(cache.get::<Value>(&keys::minerals(ACCOUNT)).is_none());
    assert!(cache.get::<Value>(&keys::tools(ACCOUNT)).is_some());
    assert!(cache.get::<Value>(keys::SHOP_LISTINGS).is_some());

    client.minerals(ACCOUNT).await.unwrap();
    assert_eq!(net.minerals.load(Ordering::SeqCst), 2);
    assert_eq!(net.shop.load(Ordering::SeqCst), 1);
    // balances ride along uncached on every minerals view
    assert_eq!(net.balances.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn refused_signature_leaves_every_slot_in_place() {
    let (net, cache, client, mutator, session) = harness(Arc::new(RefusingSigner));

    client.dashboard(ACCOUNT).await.unwrap();
    client.inventory(ACCOUNT).await.unwrap();

    let err = mutator
        .install_machine(&session, &["456".into()])
        .await
        .unwrap_err();
    match err {
        MutationError::Submit(msg) => assert_eq!(msg, "user rejected the transaction"),
        other => panic!("expected Submit, got {other:?}"),
    }

    assert!(cache.get::<Value>(&keys::tools(ACCOUNT)).is_some());
    assert!(cache.get::<Value>(&keys::assets(ACCOUNT)).is_some());

    client.dashboard(ACCOUNT).await.unwrap();
    client.inventory(ACCOUNT).await.unwrap();
    assert_eq!(net.machines.load(Ordering::SeqCst), 1);
    assert_eq!(net.assets.load(Ordering::SeqCst), 1);
}
