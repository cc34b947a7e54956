//! litesig CLI Application
//!
//! A command-line interface for deploying and operating threshold wallets
//! against a persisted in-process host.

use clap::{Args, Parser, Subcommand};
use litesig::cli::{self, AppState};
use litesig::core::{Address, B256, U256};
use litesig::crypto::Signature;
use litesig::factory::FactoryConfig;
use litesig::multisig::TransactionRequest;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "litesig")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Threshold multi-signature wallets with deterministic deployment", long_about = None)]
struct Cli {
    /// Data directory for state and keys
    #[arg(short, long, default_value = ".litesig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate or import a signer key
    Keygen {
        /// Optional label for the key
        #[arg(short, long)]
        label: Option<String>,

        /// Import this private key (hex) instead of generating one
        #[arg(long)]
        import: Option<String>,
    },

    /// List stored signer keys
    Keys,

    /// Predict a deployment address
    Predict {
        #[command(flatten)]
        salt: SaltArgs,

        /// Deployer address (defaults to the stored factory)
        #[arg(long)]
        deployer: Option<Address>,

        /// Init code (hex), required with --deployer
        #[arg(long)]
        init_code: Option<String>,
    },

    /// Show the hash owners must sign for a transaction
    Digest {
        #[command(flatten)]
        tx: TxArgs,
    },

    /// Sign a transaction with stored keys
    Sign {
        #[command(flatten)]
        tx: TxArgs,

        /// Signer addresses (repeatable)
        #[arg(short, long = "signer", required = true)]
        signers: Vec<Address>,
    },

    /// Factory operations
    Factory {
        #[command(subcommand)]
        action: FactoryCommands,
    },

    /// Wallet operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },

    /// Host clock operations
    Clock {
        #[command(subcommand)]
        action: ClockCommands,
    },
}

#[derive(Args)]
struct SaltArgs {
    /// 32-byte salt (hex)
    #[arg(long)]
    salt: Option<B256>,

    /// Derive the salt as SHA-256 of this text
    #[arg(long)]
    seed: Option<String>,
}

#[derive(Args)]
struct TxArgs {
    /// Wallet address
    #[arg(short, long)]
    wallet: Address,

    /// Destination address
    #[arg(long)]
    to: Address,

    /// Native value to send
    #[arg(long, default_value = "0")]
    value: U256,

    /// Call payload (hex)
    #[arg(long)]
    data: Option<String>,

    /// Nonce to sign for (defaults to the wallet's current nonce)
    #[arg(long)]
    nonce: Option<U256>,

    /// Account the signatures are bound to
    #[arg(long)]
    submitter: Option<Address>,
}

impl TxArgs {
    fn request(&self) -> cli::CliResult<TransactionRequest> {
        Ok(TransactionRequest::new(
            self.to,
            self.value,
            cli::parse_payload(self.data.as_deref())?,
        ))
    }
}

#[derive(Subcommand)]
enum FactoryCommands {
    /// Deploy the factory
    Init {
        /// Factory address
        #[arg(long)]
        address: Address,

        /// Wallet logic address
        #[arg(long)]
        logic: Address,

        /// Registry owner
        #[arg(long)]
        owner: Address,

        /// Wallet creation code (hex); minimal proxies are used when omitted
        #[arg(long)]
        creation_code: Option<String>,

        /// Append the logic address as a constructor argument
        #[arg(long, requires = "creation_code")]
        constructor_arg: bool,

        /// Recovery time lock in days, at least 180
        #[arg(long)]
        recovery_delay_days: Option<u64>,

        /// Owners sign with the Ethereum signed-message prefix
        #[arg(long)]
        eth_signed: bool,

        /// Signatures commit to the submitting account
        #[arg(long)]
        bind_submitter: bool,
    },

    /// Grant administrator rights
    AddAdmin {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        admin: Address,
    },

    /// Revoke administrator rights
    RemoveAdmin {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        admin: Address,
    },

    /// Hand the factory to a new owner
    TransferOwnership {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        new_owner: Address,
    },

    /// Create a wallet
    Create {
        #[arg(long)]
        caller: Address,

        #[command(flatten)]
        salt: SaltArgs,

        /// Owner addresses in ascending order (repeatable)
        #[arg(short, long = "owner", required = true)]
        owners: Vec<Address>,

        /// Required signatures
        #[arg(short, long)]
        threshold: usize,

        /// Chain identifier
        #[arg(long, default_value = "1")]
        chain_id: U256,
    },

    /// Show factory information
    Info,
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Show wallet state
    Info {
        #[arg(short, long)]
        wallet: Address,
    },

    /// Credit native value to a wallet
    Deposit {
        #[arg(short, long)]
        wallet: Address,
        #[arg(short, long)]
        amount: U256,
    },

    /// Submit a signed transaction
    Submit {
        #[command(flatten)]
        tx: TxArgs,

        /// Submitting account
        #[arg(long)]
        caller: Address,

        /// 65-byte signatures (hex) in ascending signer order (repeatable)
        #[arg(long = "sig")]
        signatures: Vec<Signature>,
    },

    /// Propose a replacement owner set
    StartRecover {
        #[arg(short, long)]
        wallet: Address,
        #[arg(long)]
        caller: Address,
        /// New owners in ascending order (repeatable)
        #[arg(short, long = "owner", required = true)]
        owners: Vec<Address>,
    },

    /// Cancel a pending recovery
    CancelRecover {
        #[arg(short, long)]
        wallet: Address,
        #[arg(long)]
        caller: Address,
    },

    /// Finalize a recovery after its time lock
    FinalizeRecover {
        #[arg(short, long)]
        wallet: Address,
        #[arg(long)]
        caller: Address,
    },
}

#[derive(Subcommand)]
enum ClockCommands {
    /// Move host time forward
    Advance {
        #[arg(long, default_value = "0")]
        days: i64,
        #[arg(long, default_value = "0")]
        seconds: i64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Keygen { label, import } => {
            cli::cmd_keygen(&state, label.as_deref(), import.as_deref())?;
        }

        Commands::Keys => {
            cli::cmd_keys(&state)?;
        }

        Commands::Predict {
            salt,
            deployer,
            init_code,
        } => {
            let salt = cli::resolve_salt(salt.salt, salt.seed.as_deref())?;
            cli::cmd_predict(&state, &salt, deployer, init_code.as_deref())?;
        }

        Commands::Digest { tx } => {
            cli::cmd_digest(&state, &tx.wallet, &tx.request()?, tx.nonce, tx.submitter)?;
        }

        Commands::Sign { tx, signers } => {
            cli::cmd_sign(
                &state,
                &tx.wallet,
                &tx.request()?,
                tx.nonce,
                tx.submitter,
                &signers,
            )?;
        }

        Commands::Factory { action } => match action {
            FactoryCommands::Init {
                address,
                logic,
                owner,
                creation_code,
                constructor_arg,
                recovery_delay_days,
                eth_signed,
                bind_submitter,
            } => {
                let config = FactoryConfig {
                    deployment: cli::deployment_code(creation_code.as_deref(), constructor_arg)?,
                    wallet: cli::wallet_config(recovery_delay_days, eth_signed, bind_submitter)?,
                };
                cli::cmd_factory_init(&mut state, address, logic, owner, config)?;
            }
            FactoryCommands::AddAdmin { caller, admin } => {
                cli::cmd_factory_add_admin(&mut state, caller, admin)?;
            }
            FactoryCommands::RemoveAdmin { caller, admin } => {
                cli::cmd_factory_remove_admin(&mut state, caller, admin)?;
            }
            FactoryCommands::TransferOwnership { caller, new_owner } => {
                cli::cmd_factory_transfer_ownership(&mut state, caller, new_owner)?;
            }
            FactoryCommands::Create {
                caller,
                salt,
                owners,
                threshold,
                chain_id,
            } => {
                let salt = cli::resolve_salt(salt.salt, salt.seed.as_deref())?;
                cli::cmd_factory_create(&mut state, caller, &salt, owners, threshold, chain_id)?;
            }
            FactoryCommands::Info => {
                cli::cmd_factory_info(&state)?;
            }
        },

        Commands::Wallet { action } => match action {
            WalletCommands::Info { wallet } => {
                cli::cmd_wallet_info(&state, &wallet)?;
            }
            WalletCommands::Deposit { wallet, amount } => {
                cli::cmd_wallet_deposit(&mut state, &wallet, amount)?;
            }
            WalletCommands::Submit {
                tx,
                caller,
                signatures,
            } => {
                cli::cmd_wallet_submit(&mut state, &tx.wallet, caller, &tx.request()?, &signatures)?;
            }
            WalletCommands::StartRecover {
                wallet,
                caller,
                owners,
            } => {
                cli::cmd_wallet_start_recover(&mut state, &wallet, caller, owners)?;
            }
            WalletCommands::CancelRecover { wallet, caller } => {
                cli::cmd_wallet_cancel_recover(&mut state, &wallet, caller)?;
            }
            WalletCommands::FinalizeRecover { wallet, caller } => {
                cli::cmd_wallet_finalize_recover(&mut state, &wallet, caller)?;
            }
        },

        Commands::Clock { action } => match action {
            ClockCommands::Advance { days, seconds } => {
                cli::cmd_clock_advance(&mut state, days, seconds)?;
            }
        },
    }

    Ok(())
}
