use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use swarmstate_core::config::EngineConfig;
use swarmstate_core::core_config::ConfigMessage;
use swarmstate_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use swarmstate_core::StateStore;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "swarmstate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Engine configuration file (TOML); defaults come from the environment
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the account id derived from a seed
    Identity {
        /// 32-byte seed or 64-byte secret key, hex encoded
        #[arg(long)]
        seed: String,
    },

    /// Merge a JSON array of swarm messages into the stored state
    Merge {
        #[arg(long)]
        seed: String,

        /// Dump file, created if missing
        #[arg(long)]
        state: String,

        /// JSON file with [{namespace, hash, timestamp_ms, data}], data in base64
        #[arg(long)]
        messages: String,

        /// Account the messages belong to; defaults to the seed's own account
        #[arg(long)]
        account: Option<String>,
    },

    /// Print the stored profile as JSON
    Profile {
        #[arg(long)]
        seed: String,

        #[arg(long)]
        state: String,
    },

    /// Set the profile name and write the dump back
    SetName {
        #[arg(long)]
        seed: String,

        #[arg(long)]
        state: String,

        /// New name; an empty string clears it
        name: String,
    },
}

#[derive(Serialize)]
struct ProfileView {
    account: String,
    name: Option<String>,
    pic_url: Option<String>,
    pic_key: Option<String>,
    blinded_msgreqs: i32,
    nts_priority: i64,
    nts_expiry: Option<i64>,
}

fn expand(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).with_context(|| format!("cannot expand path '{}'", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::from_file(expand(path)?)?),
        None => Ok(EngineConfig::from_env()?),
    }
}

fn init_logging(args: &Args, config: &EngineConfig) -> Result<()> {
    let mut log_config = LogConfig::try_from(&config.logging)?;
    if let Some(level) = &args.log_level {
        log_config.level = level.parse::<LogLevel>()?;
    }
    if args.json_logs {
        log_config = log_config.json_format(true);
    }
    init_logging_with_config(log_config)?;
    Ok(())
}

fn parse_seed(seed: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(seed.trim()).context("seed must be hex")?;
    if bytes.len() != 32 && bytes.len() != 64 {
        bail!("seed must be 32 or 64 bytes, got {}", bytes.len());
    }
    Ok(bytes)
}

fn open_store(seed: &[u8], state: &Path, config: &EngineConfig) -> Result<StateStore> {
    if state.exists() {
        let dump = fs::read(state).with_context(|| format!("cannot read {}", state.display()))?;
        debug!(path = %state.display(), bytes = dump.len(), "loading state");
        Ok(StateStore::with_dumps(seed, &dump, config.clone())?)
    } else {
        Ok(StateStore::new(seed, config.clone())?)
    }
}

fn save_store(store: &mut StateStore, state: &Path) -> Result<()> {
    let dump = store.dump(true);
    fs::write(state, &dump).with_context(|| format!("cannot write {}", state.display()))?;
    info!(path = %state.display(), bytes = dump.len(), "state written");
    Ok(())
}

fn run(command: Command, config: &EngineConfig) -> Result<()> {
    match command {
        Command::Identity { seed } => {
            let store = StateStore::new(&parse_seed(&seed)?, config.clone())?;
            println!("{}", store.account_id());
        }

        Command::Merge { seed, state, messages, account } => {
            let state = expand(&state)?;
            let mut store = open_store(&parse_seed(&seed)?, &state, config)?;

            let messages_path = expand(&messages)?;
            let raw = fs::read_to_string(&messages_path)
                .with_context(|| format!("cannot read {}", messages_path.display()))?;
            let messages: Vec<ConfigMessage> = serde_json::from_str(&raw).context("invalid messages file")?;

            let account = account.unwrap_or_else(|| store.account_id().to_string());
            let accepted = store.merge(&account, &messages)?;
            info!(received = messages.len(), accepted = accepted.len(), "merged messages");

            save_store(&mut store, &state)?;
            println!("{}", serde_json::to_string(&accepted)?);
        }

        Command::Profile { seed, state } => {
            let store = open_store(&parse_seed(&seed)?, &expand(&state)?, config)?;
            let pic = store.profile_pic();
            let view = ProfileView {
                account: store.account_id().to_string(),
                name: store.profile_name().map(str::to_string),
                pic_url: pic.as_ref().map(|p| p.url.clone()),
                pic_key: pic.as_ref().map(|p| hex::encode(p.key)),
                blinded_msgreqs: store.blinded_msgreqs(),
                nts_priority: store.nts_priority(),
                nts_expiry: store.nts_expiry(),
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }

        Command::SetName { seed, state, name } => {
            let state = expand(&state)?;
            let mut store = open_store(&parse_seed(&seed)?, &state, config)?;
            let changed = store.set_profile_name(Some(name.as_str()).filter(|n| !n.is_empty()))?;
            if changed {
                save_store(&mut store, &state)?;
            }
            println!("{}", if changed { "updated" } else { "unchanged" });
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_logging(&args, &config)?;

    debug!(command = ?args.command, "swarmstate started");
    run(args.command, &config)
}
