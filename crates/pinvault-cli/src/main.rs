//! pinvault: encrypted IPFS file vault CLI
//!
//! Local crypto:
//!   encrypt <file> [-o out]   - encrypt a file into a pinvault envelope
//!   decrypt <file> [-o out]   - decrypt an envelope back into the file
//!
//! Library:
//!   upload <file>             - pin a file (optionally encrypted) and record it
//!   list / fetch / rm         - browse, download and delete uploads
//!   folder create|list|rm     - manage the virtual folder tree
//!   stats                     - library analytics
//!
//! Sharing:
//!   share <cid>               - print gateway and decrypt links for an upload
//!   open <link>               - run the decrypt-link flow for a shared file

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pinvault_core::config::{expand_tilde, PinvaultConfig};
use pinvault_core::{format_size, FileMetadata};
use pinvault_crypto::{CryptoError, FileCipher, KdfParams};
use pinvault_library::folder::{folder_name, normalize};
use pinvault_library::{breadcrumbs, Library, LibraryStats, UploadService, ENCRYPTED_SUFFIX};
use pinvault_share::{
    DecryptLinkWorkflow, FailureReason, LinkParams, ShareError, ShareLink, ShareResult,
    WorkflowState, DEFAULT_FILENAME,
};
use pinvault_storage::{
    build_from_core_config, build_http_client, check_health, ContentStore, GatewayChoice,
    GatewayClient, Gateways,
};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "pinvault",
    version,
    about = "Encrypted file vault on IPFS",
    long_about = "pinvault: encrypt files client-side, pin them to IPFS and share password-protected decrypt links"
)]
struct Cli {
    /// Path to config.toml
    #[arg(
        long,
        short = 'c',
        env = "PINVAULT_CONFIG",
        default_value = "~/.config/pinvault/config.toml"
    )]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides log.level
    #[arg(long, env = "PINVAULT_LOG")]
    log: Option<String>,

    /// Log format; overrides log.format
    #[arg(long, env = "PINVAULT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a local file with a password
    Encrypt {
        input: PathBuf,
        /// Output path (default: <input>.encrypted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Read the password from this environment variable instead of prompting
        #[arg(long)]
        password_env: Option<String>,
    },

    /// Decrypt a pinvault envelope
    Decrypt {
        input: PathBuf,
        /// Output path (default: <input> without .encrypted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[arg(long)]
        password_env: Option<String>,
    },

    /// Upload a file and record it in the library
    ///
    /// Uploads go to Pinata when PINATA_JWT (or storage.pinata_jwt) is set,
    /// otherwise to the local simulated store.
    Upload {
        file: PathBuf,
        /// Destination folder
        #[arg(long, short = 'f', default_value = "/")]
        folder: String,
        /// Encrypt before uploading
        #[arg(long, short = 'e')]
        encrypt: bool,
        #[arg(long)]
        password_env: Option<String>,
    },

    /// List uploads in a folder
    List {
        #[arg(long, short = 'f', default_value = "/")]
        folder: String,
        /// Case-insensitive filter on the file name
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Download an upload, decrypting it if needed
    Fetch {
        cid: String,
        /// Output path (default: the upload's original name)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[arg(long)]
        password_env: Option<String>,
    },

    /// Unpin an upload and remove it from the library
    Rm { cid: String },

    /// Folder management
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },

    /// Print links for an upload
    Share {
        cid: String,
        #[arg(long, short = 'g', value_enum, default_value_t = GatewayArg::Auto)]
        gateway: GatewayArg,
    },

    /// Open a decrypt link: fetch, ask for the password and save the file
    Open {
        link: String,
        /// Output path (default: the name carried by the link)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[arg(long)]
        password_env: Option<String>,
    },

    /// Library statistics
    Stats,

    /// Show storage backend and library status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum FolderAction {
    /// Create a folder under a parent
    Create {
        name: String,
        #[arg(long, short = 'p', default_value = "/")]
        parent: String,
    },
    /// List subfolders of a folder
    List {
        #[arg(long, short = 'p', default_value = "/")]
        parent: String,
    },
    /// Delete a folder, its subfolders and every upload inside them
    Rm { path: String },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (secrets redacted)
    Show,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum GatewayArg {
    /// Dedicated gateway when configured, otherwise public
    Auto,
    Pinata,
    Public,
}

impl From<GatewayArg> for GatewayChoice {
    fn from(arg: GatewayArg) -> Self {
        match arg {
            GatewayArg::Auto => GatewayChoice::Auto,
            GatewayArg::Pinata => GatewayChoice::Pinata,
            GatewayArg::Public => GatewayChoice::Public,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let config = PinvaultConfig::load(&config_path)
        .with_context(|| format!("loading config: {}", config_path.display()))?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| log_format_from_config(&config.log.format));
    init_logging(&level, &format);

    match cli.command {
        Commands::Encrypt { input, output, password_env } => {
            cmd_encrypt(&config, &input, output, password_env.as_deref()).await
        }
        Commands::Decrypt { input, output, password_env } => {
            cmd_decrypt(&config, &input, output, password_env.as_deref()).await
        }
        Commands::Upload { file, folder, encrypt, password_env } => {
            cmd_upload(&config, &file, &folder, encrypt, password_env.as_deref()).await
        }
        Commands::List { folder, search } => cmd_list(&config, &folder, search.as_deref()),
        Commands::Fetch { cid, output, password_env } => {
            cmd_fetch(&config, &cid, output, password_env.as_deref()).await
        }
        Commands::Rm { cid } => cmd_rm(&config, &cid).await,
        Commands::Folder { action: FolderAction::Create { name, parent } } => {
            cmd_folder_create(&config, &parent, &name)
        }
        Commands::Folder { action: FolderAction::List { parent } } => {
            cmd_folder_list(&config, &parent)
        }
        Commands::Folder { action: FolderAction::Rm { path } } => {
            cmd_folder_rm(&config, &path).await
        }
        Commands::Share { cid, gateway } => cmd_share(&config, &cid, gateway.into()),
        Commands::Open { link, output, password_env } => {
            cmd_open(&config, &link, output, password_env.as_deref()).await
        }
        Commands::Stats => cmd_stats(&config),
        Commands::Status => cmd_status(&config).await,
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &config_path),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output, logs go to stderr
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

fn log_format_from_config(value: &str) -> LogFormat {
    if value.eq_ignore_ascii_case("json") {
        LogFormat::Json
    } else {
        LogFormat::Text
    }
}

// ── Shared construction ───────────────────────────────────────────────────────

/// Pinning JWT from the environment; overrides storage.pinata_jwt.
fn jwt_from_env() -> Option<SecretString> {
    std::env::var("PINATA_JWT")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

fn build_store(config: &PinvaultConfig) -> Result<Arc<dyn ContentStore>> {
    build_from_core_config(&config.storage, jwt_from_env()).context("building content store")
}

fn build_cipher(config: &PinvaultConfig) -> FileCipher {
    FileCipher::new(KdfParams {
        iterations: config.crypto.kdf_iterations,
    })
}

fn open_library(config: &PinvaultConfig) -> Result<Library> {
    let path = expand_tilde(&config.library.path);
    Library::open(&path, &config.library.owner)
        .with_context(|| format!("opening library: {}", path.display()))
}

fn make_spinner(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ── Passwords ─────────────────────────────────────────────────────────────────

fn read_password(password_env: Option<&str>, prompt: &str) -> Result<SecretString> {
    if let Some(var) = password_env {
        let value = std::env::var(var)
            .with_context(|| format!("password variable {var} is not set"))?;
        return Ok(SecretString::from(value));
    }
    let value = rpassword::prompt_password(prompt).context("reading password")?;
    Ok(SecretString::from(value))
}

/// Password for a new envelope: length-checked, and typed twice when prompting.
fn read_new_password(password_env: Option<&str>, min_len: usize) -> Result<SecretString> {
    let password = read_password(password_env, "Encryption password: ")?;
    check_password(&password, min_len)?;
    if password_env.is_none() {
        let confirm = read_password(None, "Confirm password: ")?;
        if confirm.expose_secret() != password.expose_secret() {
            bail!("Passwords do not match");
        }
    }
    Ok(password)
}

fn check_password(password: &SecretString, min_len: usize) -> Result<()> {
    let len = password.expose_secret().chars().count();
    if len == 0 {
        bail!("Password is required");
    }
    if len < min_len {
        bail!("Password must be at least {min_len} characters long");
    }
    Ok(())
}

// ── Output paths ──────────────────────────────────────────────────────────────

fn encrypted_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(ENCRYPTED_SUFFIX);
    PathBuf::from(name)
}

fn decrypted_output(input: &Path) -> PathBuf {
    let s = input.to_string_lossy();
    match s.strip_suffix(ENCRYPTED_SUFFIX) {
        Some(stem) if !stem.is_empty() && !stem.ends_with('/') => PathBuf::from(stem),
        _ => PathBuf::from(format!("{s}.decrypted")),
    }
}

/// Local file name for a name that came from a record or a link.
///
/// Only the final component is kept so a crafted name cannot write outside
/// the working directory.
fn safe_file_name(name: &str) -> PathBuf {
    Path::new(name)
        .file_name()
        .filter(|n| !n.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILENAME))
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("not a file path: {}", path.display()))
}

// ── `pinvault encrypt` / `decrypt` ────────────────────────────────────────────

async fn cmd_encrypt(
    config: &PinvaultConfig,
    input: &Path,
    output: Option<PathBuf>,
    password_env: Option<&str>,
) -> Result<()> {
    let plaintext = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let password = read_new_password(password_env, config.crypto.min_password_len)?;
    let metadata = FileMetadata::for_file(file_name_of(input)?, plaintext.len() as u64);
    let output = output.unwrap_or_else(|| encrypted_output(input));

    let pb = make_spinner("encrypt");
    pb.set_message(format!("{} (deriving key)", input.display()));
    let cipher = build_cipher(config);
    let encrypted =
        tokio::task::spawn_blocking(move || cipher.encrypt(&plaintext, &password, metadata))
            .await
            .context("encryption task failed")??;
    pb.finish_and_clear();

    tokio::fs::write(&output, &encrypted.envelope)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    println!("Encrypted {} → {}", input.display(), output.display());
    println!(
        "  {} → {}",
        format_size(encrypted.metadata.size),
        format_size(encrypted.envelope.len() as u64)
    );
    println!("  name and type are not stored in the envelope; keep them alongside it");
    Ok(())
}

async fn cmd_decrypt(
    config: &PinvaultConfig,
    input: &Path,
    output: Option<PathBuf>,
    password_env: Option<&str>,
) -> Result<()> {
    let envelope = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let password = read_password(password_env, "Password: ")?;
    check_password(&password, 1)?;
    let output = output.unwrap_or_else(|| decrypted_output(input));

    let pb = make_spinner("decrypt");
    pb.set_message(format!("{}", input.display()));
    let cipher = build_cipher(config);
    let result = tokio::task::spawn_blocking(move || cipher.decrypt(&envelope, &password))
        .await
        .context("decryption task failed")?;
    pb.finish_and_clear();

    let plaintext = match result {
        Ok(bytes) => bytes,
        Err(CryptoError::DecryptionFailed) => {
            bail!("{}: {}", input.display(), CryptoError::DecryptionFailed)
        }
        Err(e) => return Err(e.into()),
    };

    tokio::fs::write(&output, &plaintext)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "Decrypted {} → {} ({})",
        input.display(),
        output.display(),
        format_size(plaintext.len() as u64)
    );
    Ok(())
}

// ── `pinvault upload` ─────────────────────────────────────────────────────────

async fn cmd_upload(
    config: &PinvaultConfig,
    file: &Path,
    folder: &str,
    encrypt: bool,
    password_env: Option<&str>,
) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let name = file_name_of(file)?;
    let password = if encrypt {
        Some(read_new_password(password_env, config.crypto.min_password_len)?)
    } else {
        None
    };

    let store = build_store(config)?;
    let service = UploadService::new(store.clone(), build_cipher(config));
    let mut library = open_library(config)?;

    let pb = make_spinner("upload");
    pb.set_message(format!("{name} → {}", store.backend_name()));
    let result = match password {
        Some(password) => {
            service
                .upload_encrypted(&mut library, &name, bytes, password, folder)
                .await
        }
        None => service.upload(&mut library, &name, bytes, folder).await,
    };
    pb.finish_and_clear();
    let record = result.with_context(|| format!("uploading {}", file.display()))?;
    library.flush().context("saving library")?;

    println!("Uploaded {} → {}", file.display(), record.folder);
    println!("  cid:       {}", record.cid);
    println!("  size:      {}", format_size(record.size));
    println!("  encrypted: {}", if record.encrypted { "yes" } else { "no" });
    if record.is_real_ipfs {
        let gateways = Gateways::from_config(&config.storage);
        println!("  gateway:   {}", gateways.url_for(&record.cid, GatewayChoice::Auto));
    } else {
        println!("  stored in the local simulated store (set PINATA_JWT to pin to IPFS)");
    }
    if record.encrypted {
        println!("  share with: pinvault share {}", record.cid);
    }
    Ok(())
}

// ── `pinvault list` ───────────────────────────────────────────────────────────

fn cmd_list(config: &PinvaultConfig, folder: &str, search: Option<&str>) -> Result<()> {
    let library = open_library(config)?;
    let folder = normalize(folder);
    if !library.folder_exists(&folder) {
        bail!("folder not found: {folder}");
    }

    let records = match search {
        Some(term) => library.search(&folder, term),
        None => library.list_folder(&folder),
    };
    let subfolders = library.subfolders(&folder);

    println!("{}", trail(&folder));
    for sub in &subfolders {
        println!("  {:<44}  {:>10}  folder", format!("{}/", folder_name(sub)), "-");
    }
    for record in &records {
        let lock = if record.encrypted { " [encrypted]" } else { "" };
        println!(
            "  {:<44}  {:>10}  {}{lock}",
            record.display_name(),
            format_size(record.display_size()),
            record.display_mime(),
        );
        println!("    {}  {}", record.cid, record.uploaded_at.format("%Y-%m-%d %H:%M"));
    }
    if records.is_empty() && subfolders.is_empty() {
        match search {
            Some(term) => println!("  (nothing matches \"{term}\")"),
            None => println!("  (empty)"),
        }
    }
    Ok(())
}

/// "Home / docs / 2024" style trail for a folder path
fn trail(path: &str) -> String {
    breadcrumbs(path)
        .into_iter()
        .map(|b| b.name)
        .collect::<Vec<_>>()
        .join(" / ")
}

// ── `pinvault fetch` / `rm` ───────────────────────────────────────────────────

async fn cmd_fetch(
    config: &PinvaultConfig,
    cid: &str,
    output: Option<PathBuf>,
    password_env: Option<&str>,
) -> Result<()> {
    let library = open_library(config)?;
    let record = library
        .get(cid)
        .cloned()
        .with_context(|| format!("no upload with CID {cid} in the library"))?;
    let password = if record.encrypted {
        let password = read_password(password_env, "Password: ")?;
        check_password(&password, 1)?;
        Some(password)
    } else {
        None
    };

    let service = UploadService::new(build_store(config)?, build_cipher(config));
    let pb = make_spinner("fetch");
    pb.set_message(record.display_name().to_string());
    let result = service.fetch(&record, password).await;
    pb.finish_and_clear();
    let fetched = result.with_context(|| format!("fetching {cid}"))?;

    let output = output.unwrap_or_else(|| safe_file_name(&fetched.metadata.name));
    tokio::fs::write(&output, &fetched.bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "Fetched {} → {} ({}, {})",
        cid,
        output.display(),
        fetched.metadata.mime_type,
        format_size(fetched.bytes.len() as u64)
    );
    Ok(())
}

async fn cmd_rm(config: &PinvaultConfig, cid: &str) -> Result<()> {
    let service = UploadService::new(build_store(config)?, build_cipher(config));
    let mut library = open_library(config)?;
    let record = service
        .delete(&mut library, cid)
        .await
        .with_context(|| format!("deleting {cid}"))?;
    library.flush().context("saving library")?;
    println!("Deleted {} ({})", record.display_name(), record.cid);
    Ok(())
}

// ── `pinvault folder` ─────────────────────────────────────────────────────────

fn cmd_folder_create(config: &PinvaultConfig, parent: &str, name: &str) -> Result<()> {
    let mut library = open_library(config)?;
    let path = library
        .create_folder(parent, name)
        .with_context(|| format!("creating folder {name:?} in {parent}"))?;
    library.flush().context("saving library")?;
    println!("Created {path}");
    Ok(())
}

fn cmd_folder_list(config: &PinvaultConfig, parent: &str) -> Result<()> {
    let library = open_library(config)?;
    let parent = normalize(parent);
    if !library.folder_exists(&parent) {
        bail!("folder not found: {parent}");
    }
    println!("{}", trail(&parent));
    let subfolders = library.subfolders(&parent);
    if subfolders.is_empty() {
        println!("  (no subfolders)");
    }
    for sub in subfolders {
        let files = library.list_folder(sub).len();
        println!("  {:<44}  {files} file(s)", format!("{}/", folder_name(sub)));
    }
    Ok(())
}

async fn cmd_folder_rm(config: &PinvaultConfig, path: &str) -> Result<()> {
    let service = UploadService::new(build_store(config)?, build_cipher(config));
    let mut library = open_library(config)?;
    let removal = service
        .delete_folder(&mut library, path)
        .await
        .with_context(|| format!("deleting folder {path}"))?;
    library.flush().context("saving library")?;
    println!(
        "Deleted {} folder(s) and {} upload(s); now in {}",
        removal.folders.len(),
        removal.records.len(),
        removal.parent
    );
    Ok(())
}

// ── `pinvault share` ──────────────────────────────────────────────────────────

fn cmd_share(config: &PinvaultConfig, cid: &str, choice: GatewayChoice) -> Result<()> {
    let library = open_library(config)?;
    let record = library
        .get(cid)
        .with_context(|| format!("no upload with CID {cid} in the library"))?;
    let gateways = Gateways::from_config(&config.storage);

    if !record.is_real_ipfs {
        println!("warning: {cid} lives in the local simulated store; gateways cannot serve it");
    }
    println!("{}", record.display_name());
    println!("  gateway: {}", gateways.url_for(cid, choice));
    if record.encrypted {
        let link = ShareLink::new(cid, gateways.base_for(choice), record.display_name());
        println!("  decrypt: {}", link.to_url(&config.share.base_url));
        println!("  send the password over a different channel than the link");
    }
    Ok(())
}

// ── `pinvault open` ───────────────────────────────────────────────────────────

async fn cmd_open(
    config: &PinvaultConfig,
    link: &str,
    output: Option<PathBuf>,
    password_env: Option<&str>,
) -> Result<()> {
    let params = LinkParams::parse_with_default_gateway(link, &config.storage.public_gateway)
        .context("parsing decrypt link")?;
    if params.cid.is_none() {
        bail!("link has no CID");
    }
    let client = build_http_client(config.storage.request_timeout_secs)?;
    let gateway = GatewayClient::new(client, config.storage.enforce_tls);
    let mut workflow = DecryptLinkWorkflow::new(params, gateway, build_cipher(config));

    println!("{}", workflow.params().name);
    loop {
        let password = read_password(password_env, "Password: ")?;
        workflow.set_password(password)?;

        let pb = make_spinner("open");
        let mut phases = workflow.subscribe();
        let follower = {
            let pb = pb.clone();
            tokio::spawn(async move {
                while phases.changed().await.is_ok() {
                    let phase = *phases.borrow_and_update();
                    pb.set_message(phase.to_string());
                }
            })
        };
        let result = workflow.submit().await;
        follower.abort();
        pb.finish_and_clear();

        match next_step(result, password_env.is_none())? {
            OpenStep::Done => break,
            OpenStep::Reprompt { message, retry } => {
                eprintln!("{message}");
                if retry {
                    workflow.retry()?;
                }
            }
        }
    }

    let file = workflow
        .file()
        .context("decrypted file missing after success")?;
    let output = output.unwrap_or_else(|| safe_file_name(&file.name));
    tokio::fs::write(&output, &file.bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    println!("Decrypted → {}", output.display());
    println!("  type:    {}", file.mime_type);
    println!("  size:    {}", format_size(file.size));
    if file.preview.is_previewable() {
        println!("  preview: {}", file.preview);
    } else {
        println!("  preview: not available for this type");
    }
    Ok(())
}

/// What `open` does after one submit.
#[derive(Debug, PartialEq, Eq)]
enum OpenStep {
    Done,
    /// Ask for the password again; `retry` when the run ended in `Failed`
    Reprompt { message: String, retry: bool },
}

fn next_step(result: ShareResult<&WorkflowState>, interactive: bool) -> Result<OpenStep> {
    match result {
        Ok(WorkflowState::Success(_)) => Ok(OpenStep::Done),
        Ok(WorkflowState::Failed {
            reason: FailureReason::DecryptionFailed,
            message,
        }) if interactive => Ok(OpenStep::Reprompt {
            message: format!("{message}; try again"),
            retry: true,
        }),
        Ok(WorkflowState::Failed { message, .. }) => bail!("{message}"),
        Ok(other) => bail!("unexpected workflow state: {}", other.phase()),
        // refused without a state change, the workflow still awaits a password
        Err(ShareError::PasswordRequired) if interactive => Ok(OpenStep::Reprompt {
            message: "Please enter a password".into(),
            retry: false,
        }),
        Err(e) => Err(e.into()),
    }
}

// ── `pinvault stats` ──────────────────────────────────────────────────────────

fn cmd_stats(config: &PinvaultConfig) -> Result<()> {
    let library = open_library(config)?;
    let stats = LibraryStats::compute(
        library.records(),
        library.folders().len(),
        Local::now(),
        config.library.storage_quota_bytes,
    );

    println!("Library ({})", library.owner());
    println!(
        "  files:     {} ({} encrypted, {} public)",
        stats.total_files, stats.encrypted_files, stats.public_files
    );
    println!("  folders:   {}", stats.folder_count);
    println!(
        "  storage:   {} of {} ({:.1}%)",
        format_size(stats.total_size),
        format_size(stats.quota_bytes),
        stats.storage_percent
    );
    let t = &stats.types;
    println!(
        "  types:     {} images, {} videos, {} audio, {} documents, {} other",
        t.images, t.videos, t.audio, t.documents, t.other
    );

    println!("  last 7 days:");
    for (day, count) in stats.activity() {
        println!("    {day}  {:>3} {}", count, "#".repeat(count.min(40)));
    }

    if !stats.recent.is_empty() {
        println!("  recent:");
        for r in &stats.recent {
            println!("    {}  {}", r.uploaded_at.format("%Y-%m-%d %H:%M"), r.display_name());
        }
        println!("  largest:");
        for r in &stats.largest {
            println!("    {:>10}  {}", format_size(r.size), r.display_name());
        }
    }
    Ok(())
}

// ── `pinvault status` ─────────────────────────────────────────────────────────

async fn cmd_status(config: &PinvaultConfig) -> Result<()> {
    let store = build_store(config)?;
    let library = open_library(config)?;
    let gateways = Gateways::from_config(&config.storage);

    println!("pinvault v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  storage:  {} ({})",
        store.backend_name(),
        if store.is_real_ipfs() { "IPFS" } else { "simulated" }
    );

    let pb = make_spinner("status");
    pb.set_message("checking storage");
    let health = check_health(&*store).await;
    pb.finish_and_clear();
    match health {
        Ok(()) => println!("  health:   ok"),
        Err(e) => println!("  health:   unreachable ({e})"),
    }

    println!("  gateway:  {}", gateways.base_for(GatewayChoice::Auto));
    println!("  library:  {}", library.path().display());
    println!("  owner:    {}", library.owner());
    println!(
        "  uploads:  {} in {} folder(s)",
        library.records().len(),
        library.folders().len()
    );
    Ok(())
}

// ── `pinvault config show` ────────────────────────────────────────────────────

fn cmd_config_show(config: &PinvaultConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = config
        .to_redacted_toml()
        .context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}
