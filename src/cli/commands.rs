//! CLI commands for litesig
//!
//! Every command loads the saved snapshot, applies one operation against the
//! in-process host and saves the result. Operations that fail leave the
//! snapshot untouched on disk.

use crate::core::{Address, B256, U256};
use crate::crypto::{sha256, KeyPair, Secp256k1Recovery, Signature};
use crate::factory::{create2_address, DeploymentCode, FactoryConfig, WalletFactory};
use crate::multisig::{SignatureSet, SigningScheme, TransactionRequest, WalletConfig};
use crate::storage::{KeyStore, Snapshot, Storage, StorageConfig};
use chrono::Duration;
use std::path::PathBuf;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub snapshot: Snapshot,
    pub storage: Storage,
    pub keystore: KeyStore,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize application state
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };

        let storage = Storage::new(storage_config)?;
        let keystore = KeyStore::new(&data_dir.join("keys"))?;
        let snapshot = storage.load_or_default()?;

        Ok(Self {
            snapshot,
            storage,
            keystore,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.snapshot)?;
        Ok(())
    }
}

/// Salt given directly, or the SHA-256 of a seed phrase
pub fn resolve_salt(salt: Option<B256>, seed: Option<&str>) -> CliResult<B256> {
    match (salt, seed) {
        (Some(salt), None) => Ok(salt),
        (None, Some(seed)) => Ok(sha256(seed.as_bytes())),
        (None, None) => Ok(B256::ZERO),
        (Some(_), Some(_)) => Err("Pass either --salt or --seed, not both".into()),
    }
}

/// Parse an optional 0x-prefixed hex payload
pub fn parse_payload(data: Option<&str>) -> CliResult<Vec<u8>> {
    match data {
        Some(data) => Ok(hex::decode(data.trim_start_matches("0x"))?),
        None => Ok(Vec::new()),
    }
}

/// Generate or import a signer key
pub fn cmd_keygen(state: &AppState, label: Option<&str>, import: Option<&str>) -> CliResult<()> {
    let info = match import {
        Some(private_key) => {
            let key = KeyPair::from_private_key_hex(private_key)?;
            state.keystore.import(&key, label)?
        }
        None => state.keystore.generate(label)?.1,
    };

    println!("🔐 Signer key stored");
    println!("   📍 Address: {}", info.checksum);
    if let Some(l) = &info.label {
        println!("   🏷️  Label: {}", l);
    }
    println!("\n   ⚠️  The private key is stored unencrypted in {:?}", state.data_dir.join("keys"));

    Ok(())
}

/// List stored signer keys
pub fn cmd_keys(state: &AppState) -> CliResult<()> {
    let keys = state.keystore.list()?;

    if keys.is_empty() {
        println!("📭 No keys found. Create one with: litesig keygen");
        return Ok(());
    }

    println!("📋 Keys (ascending):");
    for key in &keys {
        println!("   {} ({})", key.checksum, key.label.as_deref().unwrap_or("-"));
    }

    Ok(())
}

/// Show the address a salt will deploy to
pub fn cmd_predict(
    state: &AppState,
    salt: &B256,
    deployer: Option<Address>,
    init_code: Option<&str>,
) -> CliResult<()> {
    let address = match (deployer, init_code) {
        (Some(deployer), Some(code)) => create2_address(&deployer, salt, &parse_payload(Some(code))?),
        (None, None) => state.snapshot.factory()?.predict_address(salt),
        _ => return Err("--deployer and --init-code must be given together".into()),
    };

    println!("🎯 Predicted address for salt {}", salt);
    println!("   {}", address.to_checksum(None));

    Ok(())
}

/// Show the hash owners must sign
pub fn cmd_digest(
    state: &AppState,
    wallet: &Address,
    tx: &TransactionRequest,
    nonce: Option<U256>,
    submitter: Option<Address>,
) -> CliResult<()> {
    let wallet = state.snapshot.wallet(wallet)?;
    let nonce = nonce.unwrap_or(wallet.nonce());
    let hash = wallet.message_hash_at(tx, &nonce, submitter.as_ref())?;

    println!("🧾 Message hash at nonce {}", nonce);
    println!("   {}", hash);

    Ok(())
}

/// Sign a transaction with stored keys
///
/// Signatures are printed in ascending signer order, ready for `wallet submit`.
pub fn cmd_sign(
    state: &AppState,
    wallet: &Address,
    tx: &TransactionRequest,
    nonce: Option<U256>,
    submitter: Option<Address>,
    signers: &[Address],
) -> CliResult<()> {
    let wallet = state.snapshot.wallet(wallet)?;
    let nonce = nonce.unwrap_or(wallet.nonce());
    let hash = wallet.message_hash_at(tx, &nonce, submitter.as_ref())?;

    let mut keys = signers
        .iter()
        .map(|address| state.keystore.load(address))
        .collect::<Result<Vec<_>, _>>()?;
    keys.sort_by_key(|k| k.address());

    println!("✍️  Signatures over {} (nonce {})", hash, nonce);
    for key in &keys {
        let signature = key.sign_digest(&hash)?;
        println!("   {}  # {}", signature, key.address().to_checksum(None));
    }

    Ok(())
}

/// Deploy the factory
pub fn cmd_factory_init(
    state: &mut AppState,
    address: Address,
    logic: Address,
    owner: Address,
    config: FactoryConfig,
) -> CliResult<()> {
    if state.snapshot.factory.is_some() {
        println!("⚠️  A factory already exists in {:?}", state.data_dir);
        return Ok(());
    }

    let factory = WalletFactory::new(address, logic, owner, config)?;
    println!("🏭 Factory deployed at {}", address.to_checksum(None));
    println!("   ├─ Logic: {}", logic.to_checksum(None));
    println!("   ├─ Owner: {}", owner.to_checksum(None));
    println!("   └─ Init code hash: {}", factory.init_code_hash());

    state.snapshot.factory = Some(factory);
    state.save()
}

pub fn cmd_factory_add_admin(state: &mut AppState, caller: Address, admin: Address) -> CliResult<()> {
    let ctx = state.snapshot.host.context(caller);
    let factory = state.snapshot.factory_mut()?;
    let event = factory.add_admin(&ctx, admin)?;
    let emitter = factory.address();
    state.snapshot.host.record(emitter, [event]);

    println!("✅ {} is now an administrator", admin.to_checksum(None));
    state.save()
}

pub fn cmd_factory_remove_admin(
    state: &mut AppState,
    caller: Address,
    admin: Address,
) -> CliResult<()> {
    let ctx = state.snapshot.host.context(caller);
    let factory = state.snapshot.factory_mut()?;
    let event = factory.remove_admin(&ctx, &admin)?;
    let emitter = factory.address();
    state.snapshot.host.record(emitter, [event]);

    println!("✅ {} is no longer an administrator", admin.to_checksum(None));
    state.save()
}

pub fn cmd_factory_transfer_ownership(
    state: &mut AppState,
    caller: Address,
    new_owner: Address,
) -> CliResult<()> {
    let ctx = state.snapshot.host.context(caller);
    let factory = state.snapshot.factory_mut()?;
    let event = factory.transfer_ownership(&ctx, new_owner)?;
    let emitter = factory.address();
    state.snapshot.host.record(emitter, [event]);

    println!("✅ Factory ownership transferred to {}", new_owner.to_checksum(None));
    state.save()
}

/// Create and initialize a wallet through the factory
pub fn cmd_factory_create(
    state: &mut AppState,
    caller: Address,
    salt: &B256,
    owners: Vec<Address>,
    threshold: usize,
    chain_id: U256,
) -> CliResult<()> {
    let ctx = state.snapshot.host.context(caller);
    let factory = state.snapshot.factory_mut()?;
    let (wallet, event) = factory.create_wallet(&ctx, salt, owners, threshold, chain_id)?;
    let emitter = factory.address();

    println!("🆕 Wallet created at {}", wallet.address().to_checksum(None));
    println!("   ├─ Quorum: {}-of-{}", wallet.required_signatures(), wallet.owner_list().len());
    println!("   ├─ Chain id: {}", chain_id);
    println!("   └─ Salt: {}", salt);

    state.snapshot.host.record(emitter, [event]);
    state.snapshot.wallets.insert(wallet.address(), wallet);
    state.save()
}

pub fn cmd_factory_info(state: &AppState) -> CliResult<()> {
    let factory = state.snapshot.factory()?;

    println!("🏭 Factory {}", factory.address().to_checksum(None));
    println!("   ├─ Owner: {}", factory.owner().to_checksum(None));
    println!("   ├─ Logic: {}", factory.logic().to_checksum(None));
    println!("   ├─ Init code hash: {}", factory.init_code_hash());
    println!("   ├─ Administrators:");
    for admin in factory.admins().admins() {
        println!("   │  └─ {}", admin.to_checksum(None));
    }
    println!("   └─ Wallets created: {}", factory.deployed().count());

    Ok(())
}

pub fn cmd_wallet_info(state: &AppState, address: &Address) -> CliResult<()> {
    let wallet = state.snapshot.wallet(address)?;
    let host = &state.snapshot.host;

    println!("👛 Wallet {}", address.to_checksum(None));
    println!("   ├─ State: {:?}", wallet.state());
    println!("   ├─ Quorum: {}-of-{}", wallet.required_signatures(), wallet.owner_list().len());
    for owner in wallet.owner_list() {
        println!("   │  └─ {}", owner.to_checksum(None));
    }
    println!("   ├─ Nonce: {}", wallet.nonce());
    if let Some(separator) = wallet.domain_separator() {
        println!("   ├─ Domain separator: {}", separator);
    }
    println!("   ├─ Balance: {}", host.balance_of(address));

    if let (Some(started), Some(unlocks)) =
        (wallet.recovery_start_time(), wallet.recovery_unlocks_at())
    {
        println!("   ├─ Recovery started {}", started.format("%Y-%m-%d %H:%M:%S"));
        println!("   │  ├─ Unlocks {}", unlocks.format("%Y-%m-%d %H:%M:%S"));
        for owner in wallet.recovery_owner_list() {
            println!("   │  └─ {}", owner.to_checksum(None));
        }
    }

    let events = host.events_for(address);
    println!("   └─ Events: {}", events.len());
    for logged in events.iter().rev().take(10) {
        println!(
            "      └─ {} {:?}",
            logged.timestamp.format("%Y-%m-%d %H:%M:%S"),
            logged.event
        );
    }

    Ok(())
}

/// Credit native value to a wallet
pub fn cmd_wallet_deposit(state: &mut AppState, address: &Address, amount: U256) -> CliResult<()> {
    state.snapshot.wallet(address)?;
    state.snapshot.host.deposit(*address, amount)?;

    println!("💰 Deposited {} into {}", amount, address.to_checksum(None));
    println!("   Balance: {}", state.snapshot.host.balance_of(address));
    state.save()
}

/// Submit a signed transaction
pub fn cmd_wallet_submit(
    state: &mut AppState,
    address: &Address,
    caller: Address,
    tx: &TransactionRequest,
    signatures: &[Signature],
) -> CliResult<()> {
    let Snapshot { wallets, host, .. } = &mut state.snapshot;
    let ctx = host.context(caller);
    let wallet = wallets
        .get_mut(address)
        .ok_or_else(|| format!("Unknown wallet {}", address))?;

    let signatures: SignatureSet = signatures.iter().copied().collect();
    let receipt = wallet.submit(&ctx, &signatures, tx, &Secp256k1Recovery::new(), host)?;
    host.record(*address, receipt.events.iter().cloned());

    if receipt.is_success() {
        println!("✅ Transaction {} executed", receipt.nonce);
    } else {
        println!("⚠️  Transaction {} accepted but the call failed", receipt.nonce);
    }
    println!("   ├─ To: {}", receipt.destination.to_checksum(None));
    println!("   ├─ Value: {}", receipt.value);
    println!("   ├─ Signers: {}", receipt.signers.len());
    println!("   └─ Outcome: {:?}", receipt.outcome);
    if !receipt.events.is_empty() {
        println!("\n   Pending recovery was canceled");
    }

    state.save()
}

pub fn cmd_wallet_start_recover(
    state: &mut AppState,
    address: &Address,
    caller: Address,
    new_owners: Vec<Address>,
) -> CliResult<()> {
    let ctx = state.snapshot.host.context(caller);
    let wallet = state.snapshot.wallet_mut(address)?;
    let events = wallet.start_recover(&ctx, new_owners)?;
    let unlocks = wallet.recovery_unlocks_at();
    state.snapshot.host.record(*address, events);

    println!("🛟 Recovery started by {}", caller.to_checksum(None));
    if let Some(unlocks) = unlocks {
        println!("   Can be finalized from {}", unlocks.format("%Y-%m-%d %H:%M:%S"));
    }
    state.save()
}

pub fn cmd_wallet_cancel_recover(
    state: &mut AppState,
    address: &Address,
    caller: Address,
) -> CliResult<()> {
    let ctx = state.snapshot.host.context(caller);
    let events = state.snapshot.wallet_mut(address)?.cancel_recover(&ctx)?;
    state.snapshot.host.record(*address, events);

    println!("🛑 Recovery canceled by {}", caller.to_checksum(None));
    state.save()
}

pub fn cmd_wallet_finalize_recover(
    state: &mut AppState,
    address: &Address,
    caller: Address,
) -> CliResult<()> {
    let ctx = state.snapshot.host.context(caller);
    let events = state.snapshot.wallet_mut(address)?.finalize_recover(&ctx)?;
    state.snapshot.host.record(*address, events);

    println!("🔁 Recovery finalized, owner set replaced");
    state.save()
}

/// Move the host clock forward
pub fn cmd_clock_advance(state: &mut AppState, days: i64, seconds: i64) -> CliResult<()> {
    state
        .snapshot
        .host
        .advance(Duration::days(days) + Duration::seconds(seconds));

    println!(
        "⏩ Host time is now {}",
        state.snapshot.host.now().format("%Y-%m-%d %H:%M:%S")
    );
    state.save()
}

/// Build a wallet configuration from CLI flags
///
/// The recovery delay may only be lengthened past the 180 day default.
pub fn wallet_config(
    recovery_delay_days: Option<u64>,
    eth_signed: bool,
    bind_submitter: bool,
) -> CliResult<WalletConfig> {
    let mut config = WalletConfig::default();
    if let Some(days) = recovery_delay_days {
        config.recovery_delay_secs = days
            .checked_mul(SECONDS_PER_DAY)
            .ok_or("--recovery-delay-days is too large")?;
    }
    if eth_signed {
        config.signing_scheme = SigningScheme::EthSignedMessage;
    }
    config.bind_submitter = bind_submitter;
    config.validate()?;
    Ok(config)
}

/// Build the deployment scheme from CLI flags
pub fn deployment_code(creation_code: Option<&str>, constructor_arg: bool) -> CliResult<DeploymentCode> {
    Ok(match creation_code {
        None => DeploymentCode::MinimalProxy,
        Some(code) => {
            let creation_code = parse_payload(Some(code))?;
            if constructor_arg {
                DeploymentCode::ConstructorProxy { creation_code }
            } else {
                DeploymentCode::Direct { creation_code }
            }
        }
    })
}
