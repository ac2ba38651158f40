//! Transaction vocabulary
//!
//! Typed wire shapes for signed transactions plus one builder per game
//! action. The payload field names (including the contract ABI's
//! `quantitys` spelling) are fixed by the deployed contracts and must be
//! constructed exactly. Builders are pure; preconditions and cache
//! invalidation live in `mutations`, keys stay behind [`Signer`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::chain;
use crate::token::{format_contract, Token};
use crate::types::Session;

/// Actor and permission authorizing one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub actor: String,
    pub permission: String,
}

/// One contract action inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub account: String,
    pub name: String,
    pub authorization: Vec<Authorization>,
    pub data: Value,
}

/// A full transaction request as wallet SDKs accept it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub actions: Vec<Action>,
}

/// Signing options shared by every game mutation. Wallet SDKs expect the
/// camelCase spellings on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOptions {
    pub broadcast: bool,
    pub blocks_behind: u32,
    pub expire_seconds: u32,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            broadcast: true,
            blocks_behind: 3,
            expire_seconds: 1800,
        }
    }
}

/// Receipt for a broadcast transaction.
#[derive(Debug, Clone, Default)]
pub struct SignReceipt {
    pub transaction_id: Option<String>,
}

/// Failure from the signing capability, carrying the wallet or chain
/// message verbatim.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SignerError(pub String);

/// External wallet capability. The core constructs transactions and hands
/// them over; it never touches key material.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign_transaction(
        &self,
        tx: &Transaction,
        opts: &SignOptions,
    ) -> Result<SignReceipt, SignerError>;
}

fn single_action(account: &str, session: &Session, name: &str, data: Value) -> Transaction {
    Transaction {
        actions: vec![Action {
            account: account.to_string(),
            name: name.to_string(),
            authorization: vec![Authorization {
                actor: session.account.clone(),
                permission: session.permission.clone(),
            }],
            data,
        }],
    }
}

/// `regmch`: install wallet NFTs as working machines.
pub fn install_machine(contract: &str, session: &Session, asset_ids: &[String]) -> Transaction {
    single_action(
        contract,
        session,
        "regmch",
        json!({ "asset_ids": asset_ids, "player": session.account }),
    )
}

/// `deregmch`: uninstall machines back into the wallet.
pub fn remove_machine(contract: &str, session: &Session, asset_ids: &[String]) -> Transaction {
    single_action(
        contract,
        session,
        "deregmch",
        json!({ "asset_ids": asset_ids, "player": session.account }),
    )
}

/// `claimmch`: collect rewards from the given machines.
pub fn claim_machines(contract: &str, session: &Session, asset_ids: &[String]) -> Transaction {
    single_action(contract, session, "claimmch", json!({ "asset_ids": asset_ids }))
}

fn reserve_transfer(
    contract: &str,
    session: &Session,
    name: &str,
    asset_id: &str,
    quantities: &[Token],
) -> Transaction {
    // zero rows would be rejected by the contract; NaN never passes > 0
    let quantitys: Vec<String> = quantities
        .iter()
        .filter(|tok| tok.amount > 0.0)
        .map(format_contract)
        .collect();
    single_action(
        contract,
        session,
        name,
        json!({
            "player": session.account,
            "asset_id": asset_id,
            "quantitys": quantitys,
        }),
    )
}

/// `deposittkn`: move resource balances onto a machine as fuel.
pub fn deposit_tokens(
    contract: &str,
    session: &Session,
    asset_id: &str,
    quantities: &[Token],
) -> Transaction {
    reserve_transfer(contract, session, "deposittkn", asset_id, quantities)
}

/// `withdraw`: move fuel back off a machine into balances.
pub fn withdraw_tokens(
    contract: &str,
    session: &Session,
    asset_id: &str,
    quantities: &[Token],
) -> Transaction {
    reserve_transfer(contract, session, "withdraw", asset_id, quantities)
}

/// `buyshopl`: mint minerals from a shop listing. `quantity` is in whole
/// mineral units, already divided by the unit cost.
pub fn buy_shop_listing(
    contract: &str,
    session: &Session,
    listing_template_id: u32,
    quantity: u32,
) -> Transaction {
    single_action(
        contract,
        session,
        "buyshopl",
        json!({
            "player": session.account,
            "id": listing_template_id,
            "quantity": quantity,
        }),
    )
}

/// `burnasset`: destroy a mineral NFT. Targets the AtomicAssets system
/// contract, not the game contract.
pub fn burn_asset(session: &Session, asset_id: &str) -> Transaction {
    single_action(
        chain::ATOMIC_CONTRACT,
        session,
        "burnasset",
        json!({ "asset_id": asset_id, "asset_owner": session.account }),
    )
}
