//! hdsk: symmetric hierarchical deterministic key CLI
//!
//! Commands:
//!   secret generate           - print a random hex secret
//!   master                    - derive the master key from the secret
//!   derive <path>             - derive the node key at a schema-checked path
//!   child --parent <f> <idx>  - derive one child from an exported key
//!   verify --child <f> ...    - check that a key is the direct child of another
//!   schema check [<schema>]   - parse and print a schema
//!   path parse <path>         - resolve a path against the schema
//!   config show               - print the merged configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use hdsk_core::{HashAlgorithm, HdskConfig, LogFormat};
use hdsk_crypto::{ExportedKey, HashFunction, HdKey, Schema};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "hdsk",
    version,
    about = "Symmetric hierarchical deterministic keys",
    long_about = "hdsk: derive a tree of symmetric keys from one secret with HMAC and HKDF"
)]
struct Cli {
    /// Path to hdsk.toml configuration file
    #[arg(long, short = 'c', env = "HDSK_CONFIG", default_value = "hdsk.toml")]
    config: PathBuf,

    /// Hash function (sha256, sha512, sha3-256, blake2b); overrides config
    #[arg(long, env = "HDSK_HASH")]
    hash: Option<HashAlgorithm>,

    /// Derivation path schema; overrides config
    #[arg(long, env = "HDSK_SCHEMA")]
    schema: Option<String>,

    /// Hex-encoded secret
    #[arg(long, env = "HDSK_SECRET", hide_env_values = true, global = true)]
    secret: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides config
    #[arg(long, env = "HDSK_LOG")]
    log: Option<String>,

    /// Print keys as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Secret management
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },

    /// Derive the master key from the secret
    Master,

    /// Derive the key at a derivation path (e.g. m/42/0/1/0)
    Derive {
        /// Derivation path, validated against the schema
        path: String,
    },

    /// Derive a single child of an exported key
    Child {
        /// Parent key file (JSON, as printed with --json)
        #[arg(long)]
        parent: PathBuf,
        /// Child index: a u32, or a label of letters and hyphens
        index: String,
    },

    /// Verify that a key is the direct child of a parent key
    ///
    /// Exits with status 1 when the lineage does not hold.
    Verify {
        /// Child key file (JSON)
        #[arg(long)]
        child: PathBuf,
        /// Parent key file (JSON)
        #[arg(long, conflicts_with = "parent_key", required_unless_present = "parent_key")]
        parent: Option<PathBuf>,
        /// Parent key as hex, instead of a key file
        #[arg(long)]
        parent_key: Option<String>,
        /// Expected fingerprint as hex (default: the child's own)
        #[arg(long)]
        fingerprint: Option<String>,
    },

    /// Schema inspection
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },

    /// Path inspection
    Path {
        #[command(subcommand)]
        action: PathAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum SecretAction {
    /// Print a new random secret as hex
    Generate {
        /// Secret length in bytes
        #[arg(long, default_value_t = 32)]
        bytes: usize,
    },
}

#[derive(Subcommand, Debug)]
enum SchemaAction {
    /// Parse a schema (default: the configured one) and print its levels
    Check { schema: Option<String> },
}

#[derive(Subcommand, Debug)]
enum PathAction {
    /// Resolve a path against the schema and print its indices
    Parse { path: String },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

/// Dispatch a generic command function over the configured hash.
macro_rules! with_hash {
    ($alg:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $alg {
            HashAlgorithm::Sha256 => $func::<sha2::Sha256>($($arg),*),
            HashAlgorithm::Sha512 => $func::<sha2::Sha512>($($arg),*),
            HashAlgorithm::Sha3_256 => $func::<sha3::Sha3_256>($($arg),*),
            HashAlgorithm::Blake2b => $func::<blake2::Blake2b512>($($arg),*),
        }
    };
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, found) = load_config(&cli.config)?;
    if let Some(hash) = cli.hash {
        config.derivation.hash = hash;
    }
    if let Some(schema) = &cli.schema {
        config.derivation.schema = schema.clone();
    }
    if let Some(level) = &cli.log {
        config.log.level = level.clone();
    }

    init_logging(&config.log.level, config.log.format);
    if !found {
        tracing::warn!("config file not found: {}  (using defaults)", cli.config.display());
    }
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        hash = %config.derivation.hash,
        config = %cli.config.display(),
        "hdsk starting"
    );

    let secret = cli.secret.map(SecretString::from);
    let hash = config.derivation.hash;
    let json = cli.json;

    match cli.command {
        Commands::Secret { action: SecretAction::Generate { bytes } } => cmd_secret_generate(bytes),
        Commands::Master => {
            let secret = decode_secret(secret.as_ref())?;
            with_hash!(hash, cmd_master(&secret, json))
        }
        Commands::Derive { path } => {
            let secret = decode_secret(secret.as_ref())?;
            let schema = load_schema(&config.derivation.schema)?;
            with_hash!(hash, cmd_derive(&secret, &schema, &path, json))
        }
        Commands::Child { parent, index } => with_hash!(hash, cmd_child(&parent, &index, json)),
        Commands::Verify { child, parent, parent_key, fingerprint } => {
            let holds = with_hash!(
                hash,
                cmd_verify(&child, parent.as_deref(), parent_key.as_deref(), fingerprint.as_deref())
            )?;
            if !holds {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Schema { action: SchemaAction::Check { schema } } => {
            cmd_schema_check(schema.as_deref().unwrap_or(&config.derivation.schema))
        }
        Commands::Path { action: PathAction::Parse { path } } => {
            let schema = load_schema(&config.derivation.schema)?;
            with_hash!(hash, cmd_path_parse(&schema, &path))
        }
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Load the config file, or defaults when it is absent. The flag reports
/// whether the file existed; the warning is logged by the caller once the
/// subscriber is installed.
fn load_config(path: &Path) -> Result<(HdskConfig, bool)> {
    let loaded = HdskConfig::load(path)
        .with_context(|| format!("loading config: {}", path.display()))?;
    Ok(match loaded {
        Some(config) => (config, true),
        None => (HdskConfig::default(), false),
    })
}

// ── Input helpers ─────────────────────────────────────────────────────────────

/// Decode the hex secret into bytes that are wiped on drop.
fn decode_secret(secret: Option<&SecretString>) -> Result<Zeroizing<Vec<u8>>> {
    let secret = secret.context(
        "secret not set\n\
         Pass --secret <hex> or set the HDSK_SECRET environment variable.\n\
         Generate one with: hdsk secret generate",
    )?;
    let bytes = Zeroizing::new(
        hex::decode(secret.expose_secret().trim())
            .map_err(|_| anyhow::anyhow!("secret is not valid hex"))?,
    );
    if bytes.is_empty() {
        anyhow::bail!("secret must not be empty");
    }
    Ok(bytes)
}

fn load_schema(text: &str) -> Result<Schema> {
    Schema::parse(text).with_context(|| format!("parsing schema {text:?}"))
}

fn read_key(path: &Path) -> Result<HdKey> {
    let content = Zeroizing::new(
        std::fs::read_to_string(path).with_context(|| format!("reading key: {}", path.display()))?,
    );
    let exported: ExportedKey = serde_json::from_str(&content)
        .with_context(|| format!("parsing key: {}", path.display()))?;
    HdKey::try_from(&exported).with_context(|| format!("loading key: {}", path.display()))
}

fn decode_hex_arg(name: &str, value: &str) -> Result<Zeroizing<Vec<u8>>> {
    hex::decode(value.trim())
        .map(Zeroizing::new)
        .map_err(|_| anyhow::anyhow!("--{name} is not valid hex"))
}

fn print_key(key: &HdKey, json: bool) -> Result<()> {
    let exported = key.export();
    if json {
        let text = Zeroizing::new(serde_json::to_string_pretty(&exported)?);
        println!("{}", text.as_str());
    } else {
        println!("key:         {}", exported.key);
        println!("chain_code:  {}", exported.chain_code);
        println!("depth:       {}", exported.depth);
        println!("fingerprint: {}", exported.fingerprint);
    }
    Ok(())
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_secret_generate(len: usize) -> Result<()> {
    if len == 0 {
        anyhow::bail!("--bytes must be at least 1");
    }
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    rand::thread_rng().fill_bytes(&mut bytes);
    let encoded = Zeroizing::new(hex::encode(bytes.as_slice()));
    println!("{}", encoded.as_str());
    Ok(())
}

fn cmd_master<D: HashFunction>(secret: &[u8], json: bool) -> Result<()> {
    let master = hdsk_crypto::master::<D>(secret).context("deriving master key")?;
    print_key(&master, json)
}

fn cmd_derive<D: HashFunction>(secret: &[u8], schema: &Schema, path: &str, json: bool) -> Result<()> {
    let path = schema
        .parse_path::<D>(path)
        .with_context(|| format!("parsing path {path:?}"))?;
    let master = hdsk_crypto::master::<D>(secret).context("deriving master key")?;
    let node = hdsk_crypto::node::<D>(&master, &path)
        .with_context(|| format!("deriving node at {path}"))?;
    print_key(&node, json)
}

fn cmd_child<D: HashFunction>(parent: &Path, index: &str, json: bool) -> Result<()> {
    let parent = read_key(parent)?;
    let child = hdsk_crypto::child_from_str::<D>(&parent, index)
        .with_context(|| format!("deriving child at index {index:?}"))?;
    print_key(&child, json)
}

fn cmd_verify<D: HashFunction>(
    child: &Path,
    parent: Option<&Path>,
    parent_key: Option<&str>,
    fingerprint: Option<&str>,
) -> Result<bool> {
    let child = read_key(child)?;
    let parent_bytes = match (parent, parent_key) {
        (Some(path), _) => Zeroizing::new(read_key(path)?.key().to_vec()),
        (None, Some(hex_key)) => decode_hex_arg("parent-key", hex_key)?,
        (None, None) => anyhow::bail!("either --parent or --parent-key is required"),
    };
    let expected = match fingerprint {
        Some(fp) => decode_hex_arg("fingerprint", fp)?,
        None => Zeroizing::new(child.fingerprint().to_vec()),
    };

    let recomputed = hdsk_crypto::fingerprint::<D>(&parent_bytes, child.key())
        .context("recomputing fingerprint")?;
    let holds = hdsk_crypto::verify_fingerprint(&expected, &recomputed)
        .context("comparing fingerprints")?;

    tracing::info!(holds, depth = child.depth(), "lineage verified");
    println!("{}", if holds { "lineage: valid" } else { "lineage: INVALID" });
    Ok(holds)
}

fn cmd_schema_check(text: &str) -> Result<()> {
    let schema = load_schema(text)?;
    println!("{schema}");
    for (position, segment) in schema.segments().iter().enumerate() {
        println!("  {position:>3}  {:<24} {}", segment.label, segment.kind);
    }
    Ok(())
}

fn cmd_path_parse<D: HashFunction>(schema: &Schema, text: &str) -> Result<()> {
    let path = schema
        .parse_path::<D>(text)
        .with_context(|| format!("parsing path {text:?}"))?;
    println!("{path}");
    for (position, (index, segment)) in path.indices().iter().zip(schema.segments()).enumerate() {
        println!("  {position:>3}  {:<24} {index}", segment.label);
    }
    Ok(())
}

fn cmd_config_show(config: &HdskConfig, config_path: &Path) -> Result<()> {
    println!("# hdsk configuration (from {})", config_path.display());
    print!("{}", config.to_toml_string()?);
    Ok(())
}
