//! Mutation coordinator
//!
//! One protocol for every state-changing action: validate local
//! preconditions (no network on failure), build exactly one transaction,
//! submit it through the signer, and on success invalidate exactly the
//! cache slots the action dirtied before handing back a user-facing
//! message. Submission failures carry the wallet/chain message verbatim and
//! leave the cache untouched. There is no optimistic update and no retry:
//! invalidate-then-refetch is the only consistency mechanism.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::actions::{self, SignOptions, Signer, Transaction};
use crate::aggregate::{is_claim_ready_at, Tool};
use crate::cache::{keys, now_ms, Cache};
use crate::constants::shop;
use crate::token::Token;
use crate::types::{Session, ShopListing};

/// Why a mutation did not go through.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// A local precondition failed; nothing was submitted.
    #[error("{0}")]
    Rejected(String),
    /// The wallet or chain refused the transaction.
    #[error("{0}")]
    Submit(String),
    /// Another mutation is still in flight; submit again once it settles.
    #[error("another action is already in flight")]
    Busy,
}

pub struct Mutator {
    contract: String,
    cache: Cache,
    signer: Arc<dyn Signer>,
    in_flight: Mutex<()>,
}

impl Mutator {
    pub fn new(contract: impl Into<String>, cache: Cache, signer: Arc<dyn Signer>) -> Self {
        Self {
            contract: contract.into(),
            cache,
            signer,
            in_flight: Mutex::new(()),
        }
    }

    /// Install wallet NFTs as working machines.
    pub async fn install_machine(
        &self,
        session: &Session,
        asset_ids: &[String],
    ) -> Result<String, MutationError> {
        if asset_ids.is_empty() {
            return Err(MutationError::Rejected(
                "You must select at least 1 asset to install".into(),
            ));
        }
        let _guard = self.begin()?;
        self.sign(actions::install_machine(&self.contract, session, asset_ids))
            .await?;
        self.cache.clear(&keys::tools(&session.account));
        self.cache.clear(&keys::assets(&session.account));
        log::info!("[mutate] installed {} asset(s) for {}", asset_ids.len(), session.account);
        Ok("Asset installed successfully".into())
    }

    /// Uninstall machines back into the wallet.
    pub async fn remove_machine(
        &self,
        session: &Session,
        asset_ids: &[String],
    ) -> Result<String, MutationError> {
        if asset_ids.is_empty() {
            return Err(MutationError::Rejected(
                "You must select at least 1 asset to remove".into(),
            ));
        }
        let _guard = self.begin()?;
        self.sign(actions::remove_machine(&self.contract, session, asset_ids))
            .await?;
        self.cache.clear(&keys::tools(&session.account));
        self.cache.clear(&keys::assets(&session.account));
        log::info!("[mutate] removed {} asset(s) for {}", asset_ids.len(), session.account);
        Ok("Asset removed successfully".into())
    }

    /// Claim rewards from every currently ready tool.
    pub async fn claim_ready(
        &self,
        session: &Session,
        tools: &[Tool],
    ) -> Result<String, MutationError> {
        self.claim_ready_at(session, tools, now_ms()).await
    }

    /// [`Mutator::claim_ready`] with an explicit clock, for tests.
    pub async fn claim_ready_at(
        &self,
        session: &Session,
        tools: &[Tool],
        now_ms: i64,
    ) -> Result<String, MutationError> {
        let ready: Vec<String> = tools
            .iter()
            .filter(|t| is_claim_ready_at(t, now_ms))
            .map(|t| t.asset_id.clone())
            .collect();
        if ready.is_empty() {
            return Err(MutationError::Rejected(
                "No machines are ready to claim".into(),
            ));
        }
        let _guard = self.begin()?;
        self.sign(actions::claim_machines(&self.contract, session, &ready))
            .await?;
        self.cache.clear(&keys::tools(&session.account));
        log::info!("[mutate] claimed {} machine(s) for {}", ready.len(), session.account);
        Ok("Rewards claimed successfully".into())
    }

    /// Deposit resource balances onto a machine as fuel.
    pub async fn deposit_assets(
        &self,
        session: &Session,
        asset_id: &str,
        quantities: &[Token],
    ) -> Result<String, MutationError> {
        if !quantities.iter().any(|tok| tok.amount > 0.0) {
            return Err(MutationError::Rejected(
                "You must deposit at least 1 resource".into(),
            ));
        }
        let _guard = self.begin()?;
        self.sign(actions::deposit_tokens(&self.contract, session, asset_id, quantities))
            .await?;
        self.cache.clear(&keys::tools(&session.account));
        Ok("Tokens deposited successfully".into())
    }

    /// Withdraw fuel from a machine back into resource balances.
    pub async fn withdraw_assets(
        &self,
        session: &Session,
        asset_id: &str,
        quantities: &[Token],
    ) -> Result<String, MutationError> {
        if !quantities.iter().any(|tok| tok.amount > 0.0) {
            return Err(MutationError::Rejected(
                "You must withdraw at least 1 resource".into(),
            ));
        }
        let _guard = self.begin()?;
        self.sign(actions::withdraw_tokens(&self.contract, session, asset_id, quantities))
            .await?;
        self.cache.clear(&keys::tools(&session.account));
        Ok("Tokens withdrawn successfully".into())
    }

    /// Mint minerals from a shop listing by spending `amount` of the listed
    /// resource. Whole units only; the remainder stays in the balance.
    pub async fn mint_mineral(
        &self,
        session: &Session,
        listing: &ShopListing,
        amount: f64,
    ) -> Result<String, MutationError> {
        // NaN fails this comparison too
        if !(amount >= shop::MINERAL_UNIT_COST) {
            return Err(MutationError::Rejected(format!(
                "You need at least {:.0} {} to mint a mineral",
                shop::MINERAL_UNIT_COST,
                listing.price.symbol,
            )));
        }
        let quantity = (amount / shop::MINERAL_UNIT_COST).floor() as u32;
        let _guard = self.begin()?;
        self.sign(actions::buy_shop_listing(
            &self.contract,
            session,
            listing.template_id,
            quantity,
        ))
        .await?;
        self.cache.clear(&keys::minerals(&session.account));
        Ok("Mineral minted successfully".into())
    }

    /// Burn a mineral NFT.
    pub async fn burn_mineral(
        &self,
        session: &Session,
        asset_id: &str,
    ) -> Result<String, MutationError> {
        if asset_id.is_empty() {
            return Err(MutationError::Rejected("No mineral selected".into()));
        }
        let _guard = self.begin()?;
        self.sign(actions::burn_asset(session, asset_id)).await?;
        self.cache.clear(&keys::minerals(&session.account));
        Ok("Mineral burned successfully".into())
    }

    fn begin(&self) -> Result<MutexGuard<'_, ()>, MutationError> {
        self.in_flight.try_lock().map_err(|_| MutationError::Busy)
    }

    async fn sign(&self, tx: Transaction) -> Result<(), MutationError> {
        self.signer
            .sign_transaction(&tx, &SignOptions::default())
            .await
            .map(|_| ())
            .map_err(|err| MutationError::Submit(err.0))
    }
}
