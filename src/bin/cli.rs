//! memcsasl CLI Client
//!
//! Command-line interface for talking to a memcached server over the
//! binary protocol, optionally authenticating with SASL PLAIN first.

use std::io::Write;

use clap::{Parser, Subcommand};
use memcsasl::{Client, ClientConfig, Counter, MemcError};
use tracing_subscriber::{fmt, EnvFilter};

/// memcsasl CLI
#[derive(Parser, Debug)]
#[command(name = "memcsasl-cli")]
#[command(about = "CLI for memcached with SASL authentication")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "11211")]
    port: u16,

    /// SASL username (authenticates with PLAIN when set)
    #[arg(short, long, requires = "password")]
    user: Option<String>,

    /// SASL password
    #[arg(long)]
    password: Option<String>,

    /// Compress values written by set/add/replace
    #[arg(short, long)]
    compress: bool,

    /// Connect/read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List SASL mechanisms offered by the server
    Mechs,

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        key: String,
        value: String,
        /// Expiration in seconds (0 = never)
        #[arg(short, long, default_value = "0")]
        expiration: u32,
    },

    /// Store only if the key does not exist
    Add {
        key: String,
        value: String,
        #[arg(short, long, default_value = "0")]
        expiration: u32,
    },

    /// Store only if the key exists
    Replace {
        key: String,
        value: String,
        #[arg(short, long, default_value = "0")]
        expiration: u32,
    },

    /// Delete a key
    Delete {
        key: String,
    },

    /// Increment a counter
    Incr {
        key: String,
        #[arg(default_value = "1")]
        delta: u64,
        /// Value stored when the counter does not exist
        #[arg(long, default_value = "0")]
        initial: u64,
    },

    /// Decrement a counter
    Decr {
        key: String,
        #[arg(default_value = "1")]
        delta: u64,
        #[arg(long, default_value = "0")]
        initial: u64,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,memcsasl=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    }
}

/// Execute one command; `Ok(false)` means the server refused it
fn run(args: Args) -> Result<bool, MemcError> {
    let config = ClientConfig::builder()
        .compression(args.compress)
        .timeout_ms(args.timeout_ms)
        .build();

    let mut client = Client::new(config);
    client.connect(&args.host, args.port)?;
    tracing::debug!("Connected to {}:{}", args.host, args.port);

    if let (Some(user), Some(password)) = (&args.user, &args.password) {
        client.authenticate_plain(user, password)?;
    }

    let ok = match args.command {
        Commands::Mechs => {
            println!("{}", client.list_mechanisms()?.join(" "));
            true
        }
        Commands::Get { key } => match client.get(&key)? {
            Some(value) => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&value)?;
                stdout.write_all(b"\n")?;
                true
            }
            None => false,
        },
        Commands::Set {
            key,
            value,
            expiration,
        } => client.set(&key, &value, expiration)?,
        Commands::Add {
            key,
            value,
            expiration,
        } => client.add(&key, &value, expiration)?,
        Commands::Replace {
            key,
            value,
            expiration,
        } => client.replace(&key, &value, expiration)?,
        Commands::Delete { key } => client.delete(&key)?,
        Commands::Incr {
            key,
            delta,
            initial,
        } => {
            let counter = Counter {
                delta,
                initial,
                expiration: 0,
            };
            print_counter(client.increment_with(&key, counter)?)
        }
        Commands::Decr {
            key,
            delta,
            initial,
        } => {
            let counter = Counter {
                delta,
                initial,
                expiration: 0,
            };
            print_counter(client.decrement_with(&key, counter)?)
        }
    };

    if !ok {
        let status = client.last_status().unwrap_or_default();
        eprintln!(
            "not ok: status 0x{:04x} ({})",
            status,
            memcsasl::protocol::Status::describe(status)
        );
    }

    client.close();
    Ok(ok)
}

fn print_counter(value: Option<u64>) -> bool {
    match value {
        Some(value) => {
            println!("{}", value);
            true
        }
        None => false,
    }
}
