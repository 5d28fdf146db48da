use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lockbox_core::crypto::{MeterLabel, PasswordAnalysis};
use lockbox_core::{
    analyze_password, compute_health, generate_memorable_password, generate_random_password,
    load_entries, rotate_entries, save_entries, EncryptionKey, LockboxConfig,
    PasswordGeneratorConfig, SecretCipher,
};
use rpassword::prompt_password;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

/// Lockbox CLI - credential encryption and password health tools
#[derive(Parser)]
#[command(name = "lockbox")]
#[command(version, about = "Credential encryption and password health tools", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a secret into a stored blob
    Encrypt {
        /// Plaintext (will prompt if not provided)
        #[arg(long)]
        plaintext: Option<String>,
    },

    /// Decrypt a stored blob
    Decrypt {
        /// Blob as stored in the password field
        blob: String,
    },

    /// Score a password's strength
    Score {
        /// Password (will prompt if not provided)
        password: Option<String>,
    },

    /// Generate passwords
    Generate {
        /// Use random characters instead of words
        #[arg(long)]
        random: bool,

        /// Length of random passwords
        #[arg(long, default_value_t = 16)]
        length: usize,

        /// Leave symbols out of random passwords
        #[arg(long)]
        no_symbols: bool,

        /// Number of passwords to generate
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Report weak passwords in an exported entry file
    Health {
        /// JSON array of password entries
        entries: PathBuf,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-encrypt entries under the current key and format
    Rotate {
        /// JSON array of password entries
        entries: PathBuf,

        /// Where to write the rotated entries (defaults to overwriting the input)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print a fresh random encryption key
    Keygen,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LockboxConfig::load(path),
        None => LockboxConfig::load_default(),
    }
    .context("Failed to load configuration")?;

    init_logging(&config, cli.verbose)?;
    debug!("Blob format: {}", config.encryption.blob_format);

    match cli.command {
        Commands::Encrypt { plaintext } => {
            let cipher = build_cipher(&config)?;
            let plaintext = match plaintext {
                Some(p) => Zeroizing::new(p),
                None => Zeroizing::new(prompt_password("Secret to encrypt: ")?),
            };
            let blob = cipher.encrypt(&plaintext)?;
            println!("{}", blob);
        }
        Commands::Decrypt { blob } => {
            let cipher = build_cipher(&config)?;
            match cipher.decrypt(&blob) {
                Ok(plaintext) => {
                    let plaintext = Zeroizing::new(plaintext);
                    println!("{}", plaintext.as_str());
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Score { password } => {
            let password = match password {
                Some(p) => Zeroizing::new(p),
                None => Zeroizing::new(prompt_password("Password to score: ")?),
            };
            print_analysis(&analyze_password(&password));
        }
        Commands::Generate {
            random,
            length,
            no_symbols,
            count,
        } => {
            let generator = PasswordGeneratorConfig::default()
                .length(length)
                .with_symbols(!no_symbols);
            for _ in 0..count {
                let password = if random {
                    generate_random_password(&generator)?
                } else {
                    generate_memorable_password()
                };
                println!("{}", password);
            }
        }
        Commands::Health { entries, json } => {
            let cipher = build_cipher(&config)?;
            let list = load_entries(&entries)
                .with_context(|| format!("Failed to read entries from {}", entries.display()))?;

            let snapshot = compute_health(&cipher, &list);

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("Entries:       {}", snapshot.total);
                println!("Health:        {}%", snapshot.health_percent);
                println!("Weak:          {}", snapshot.weak_count);
                println!("Unreadable:    {}", snapshot.undecryptable_count);
                if !snapshot.has_weak_entries() {
                    println!();
                    println!("No weak passwords found.");
                }
                for alert in snapshot.alerts() {
                    println!();
                    println!("{} [{}]", alert.title, alert.entry_id);
                    println!("  {}", alert.description);
                }
            }
        }
        Commands::Rotate { entries, output } => {
            let cipher = build_cipher(&config)?;
            let mut list = load_entries(&entries)
                .with_context(|| format!("Failed to read entries from {}", entries.display()))?;

            let report = rotate_entries(&cipher, &mut list);

            let output = output.unwrap_or(entries);
            save_entries(&output, &list)
                .with_context(|| format!("Failed to write entries to {}", output.display()))?;
            info!("Wrote {} entries to {}", list.len(), output.display());

            println!("Rotated: {}", report.rotated.len());
            println!("Current: {}", report.current.len());
            println!("Failed:  {}", report.failed.len());
            for id in &report.failed {
                println!("  could not decrypt entry {}", id);
            }
        }
        Commands::Keygen => {
            let key = EncryptionKey::generate()?;
            println!("{}", key.to_hex().as_str());
        }
    }

    Ok(())
}

fn init_logging(config: &LockboxConfig, verbose: bool) -> Result<()> {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn build_cipher(config: &LockboxConfig) -> Result<SecretCipher> {
    let cipher = config.build_cipher()?;
    info!("Writing {} blobs", cipher.format());
    Ok(cipher)
}

fn print_analysis(analysis: &PasswordAnalysis) {
    let reset = "\x1b[0m";
    let color = analysis.label.color_code();

    println!(
        "Strength:   {}{}{} ({}/100)",
        color,
        analysis.label.as_str(),
        reset,
        analysis.meter
    );
    println!("Score:      {}/4 ({})", analysis.score(), analysis.strength.as_str());
    println!("Entropy:    {:.1} bits", analysis.entropy_bits);
    println!("Crack time: {}", analysis.crack_time_human());

    for warning in &analysis.warnings {
        println!("Warning:    {}", warning);
    }

    if !analysis.suggestions.is_empty() {
        println!();
        println!("Suggestions:");
        for suggestion in &analysis.suggestions {
            println!("  - {}", suggestion);
        }
    }

    if analysis.label != MeterLabel::Strong {
        println!();
        println!("Try `lockbox generate` for a strong password.");
    }
}
