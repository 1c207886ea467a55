use clap::{crate_version, Parser, Subcommand};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use shamir::codec::{extract_shares, SHARE_TAG};
use shamir::config::{ShamirConfig, DEFAULT_CONFIG_FILE};
use shamir::field::{FieldCache, GaloisField};
use shamir::polynomials;
use shamir::reconstruct::recover_all;
use shamir::share::{Share, ShareRecord};
use shamir::split::{split_secret_with, RandomSource, Secret};

#[derive(Debug, Parser)]
#[command(name = "shamir")]
#[command(version = crate_version!())]
#[command(
    about = "An implementation of Shamir's secret sharing scheme.",
    long_about = "Divides a secret S into n shares. Any k of those n shares can be used to reconstruct S. Having k-1 or fewer shares provides no information about the secret other than its length. Shares are plain text lines of the form shamir-<id>-<polynomial>-<x>-<base64> and can be stored in files, printed, or pasted into other documents; reconstruction finds them wherever they appear."
)]
struct Opt {
    /// Configuration file, `shamir.toml` in the working directory by default.
    #[clap(long, short)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Distribute a secret S into n shares, where any k shares can reconstruct S.
    Distribute {
        /// Number of shares to produce.
        #[clap(long, short = 'n')]
        nshares: usize,

        /// Number of shares needed to reconstruct the secret.
        #[clap(long, short = 'k')]
        threshold: usize,

        /// Primitive polynomial of the field, hex (0x11d) or decimal.
        #[clap(long, short = 'p', value_parser = polynomials::parse)]
        primitive: Option<u32>,

        /// Save each share in a separate txt file.
        #[clap(long)]
        file: bool,

        /// Print a JSON manifest of the shares.
        #[clap(long)]
        json: bool,

        #[clap(subcommand)]
        input: SecretInput,
    },

    /// Reconstruct secrets from shares given as strings or found in files.
    Reconstruct {
        #[clap(subcommand)]
        source: ShareSource,
    },

    /// Manage the configuration file.
    Config {
        #[clap(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum SecretInput {
    /// Distribute a string given on the command line.
    String { secret: String },

    /// Distribute the contents of a file.
    File { path: PathBuf },
}

#[derive(Debug, Subcommand)]
enum ShareSource {
    /// Reconstruct from shares embedded in the arguments.
    String { shares: Vec<String> },

    /// Search a directory for files prefixed with `shamir` and reconstruct every secret found.
    File {
        /// Directory to search and save results to.
        #[clap(long, short)]
        directory: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Write the default configuration.
    Init { path: Option<PathBuf> },
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let opt = Opt::parse();

    match opt.command {
        CliCommand::Config {
            action: ConfigAction::Init { path },
        } => {
            let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            ShamirConfig::write_default(&path)?;
            println!("📝 Default configuration written to {}", path.display());
        }

        CliCommand::Distribute {
            nshares,
            threshold,
            primitive,
            file,
            json,
            input,
        } => {
            let config = ShamirConfig::load(opt.config.as_deref())?;
            let polynomial = polynomials::validate(primitive.unwrap_or(config.primitive_polynomial))?;
            let secret = match input {
                SecretInput::String { secret } => secret.into_bytes(),
                SecretInput::File { path } => fs::read(&path)
                    .map_err(|err| format!("error reading {}: {err}", path.display()))?,
            };

            let field = GaloisField::new(polynomial)?;
            debug!("Using {}", field);
            let mut source = RandomSource::os(config.random_retries);
            let split = split_secret_with(&field, &secret, threshold, nshares, &mut source)?;

            if json {
                let records: Vec<ShareRecord> = split.shares().iter().map(ShareRecord::from).collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{split}");
            }

            if file {
                write_share_files(&split, &config.output_directory)?;
            }
        }

        CliCommand::Reconstruct { source } => {
            let config = ShamirConfig::load(opt.config.as_deref())?;
            match source {
                ShareSource::String { shares: args } => {
                    let mut shares = Vec::new();
                    for arg in &args {
                        shares.extend(extract_shares(arg)?);
                    }

                    if shares.is_empty() {
                        println!("No valid shares specified. Exiting.");
                        return Ok(());
                    }
                    for share in &shares {
                        println!("Found {}", share.label());
                    }

                    println!("Attempting to reconstruct secrets from shares that were found...");
                    let mut cache = FieldCache::new();
                    for (id, secret) in recover_all(shares, &mut cache)? {
                        println!("{id}:\n{}", String::from_utf8_lossy(&secret));
                    }
                }
                ShareSource::File { directory } => {
                    let dir = directory.unwrap_or_else(|| config.output_directory.clone());
                    let dir = dir.canonicalize()?;
                    println!("Searching {} for files prefixed with {}...", dir.display(), SHARE_TAG);

                    let shares = read_share_files(&dir)?;
                    if shares.is_empty() {
                        println!("No shares found. Exiting.");
                        return Ok(());
                    }
                    println!("Found {} shares.", shares.len());

                    println!("Attempting to reconstruct secrets from shares that were found...");
                    let mut cache = FieldCache::new();
                    for (id, secret) in recover_all(shares, &mut cache)? {
                        let path = dir.join(format!("secret-{id}"));
                        fs::write(&path, secret)?;
                        println!("Secret {} saved to {}", id, path.display());
                    }
                }
            }
        }
    }

    Ok(())
}

/// Writes one read-only `<label>.txt` per share.
fn write_share_files(split: &Secret, dir: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    for share in split.shares() {
        let path = dir.join(format!("{}.txt", share.label()));
        fs::write(&path, share.encode())?;

        let mut permissions = fs::metadata(&path)?.permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions)?;

        println!("{}: text saved to {}", share.label(), path.display());
    }
    info!("wrote {} share files to {}", split.shares().len(), dir.display());
    Ok(())
}

/// Collects every share from the files in `dir` (not its subdirectories) whose name starts with
/// the share tag.
fn read_share_files(dir: &Path) -> Result<Vec<Share>, Box<dyn Error>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(SHARE_TAG))
        })
        .collect();
    paths.sort();

    let mut shares = Vec::new();
    for path in paths {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!("skipping {}: {}", path.display(), err);
                continue;
            }
        };
        let found = extract_shares(&text)?;
        debug!("{} share(s) in {}", found.len(), path.display());
        shares.extend(found);
    }
    Ok(shares)
}
