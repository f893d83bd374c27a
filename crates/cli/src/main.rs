//! BookSearch CLI - the terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password prompted on stdin)
//! booksearch register reader@example.com
//! booksearch login reader@example.com
//!
//! # Browse
//! booksearch search the left hand of darkness
//! booksearch details 1
//!
//! # Cart
//! booksearch cart add 1
//! booksearch cart show
//! booksearch cart checkout
//!
//! # Apply server database migrations
//! booksearch migrate
//! ```
//!
//! # Commands
//!
//! - `register`, `login`, `logout`, `whoami` - session
//! - `search`, `details` - catalog (requires sign-in)
//! - `cart` - cart drawer (requires sign-in)
//! - `migrate` - run server database migrations
//!
//! Session and cart are stored under `--home` / `BOOKSEARCH_HOME`, by
//! default the platform's local data directory.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use url::Url;

mod api;
mod commands;
mod storage;

use api::ApiClient;
use commands::Context;
use storage::FileStore;

#[derive(Parser)]
#[command(name = "booksearch")]
#[command(author, version, about = "Search OpenLibrary and keep a reading cart")]
struct Cli {
    /// BookSearch server URL
    #[arg(
        long,
        global = true,
        env = "BOOKSEARCH_API_URL",
        default_value = "http://localhost:5001"
    )]
    api_url: Url,

    /// Directory holding the session and cart
    #[arg(long, global = true, env = "BOOKSEARCH_HOME")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        email: String,

        /// Password (prompted on stdin if omitted)
        #[arg(long, env = "BOOKSEARCH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign in
    Login {
        email: String,

        /// Password (prompted on stdin if omitted)
        #[arg(long, env = "BOOKSEARCH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out (the cart is kept)
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Search the catalog
    Search {
        #[arg(required = true, num_args = 1..)]
        terms: Vec<String>,
    },
    /// Show details for a result number or work id
    Details {
        /// Result number from the last search, or a work id such as `OL45883W`
        target: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Run server database migrations
    Migrate,
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart contents and total
    Show,
    /// Add a result number or work id
    Add {
        /// Result number from the last search, or a work id
        target: String,
    },
    /// Remove a cart item number or work id
    Remove {
        /// Item number from `cart show`, or a work id
        target: String,
    },
    /// Empty the cart
    Clear,
    /// Confirm the purchase and empty the cart
    Checkout,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so they never mix with command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::debug!("Command failed: {e:?}");
        #[allow(clippy::print_stderr)]
        {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Migrations need no local state
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        command => {
            let ctx = context(cli.home, &cli.api_url)?;
            run_client(&ctx, command).await?;
        }
    }
    Ok(())
}

/// Open the state directory and build the API client.
fn context(home: Option<PathBuf>, api_url: &Url) -> Result<Context, Box<dyn std::error::Error>> {
    let home = home
        .or_else(FileStore::default_dir)
        .ok_or("Could not find a data directory; set BOOKSEARCH_HOME")?;
    Ok(Context {
        store: FileStore::open(home)?,
        api: ApiClient::new(api_url)?,
    })
}

async fn run_client(ctx: &Context, command: Commands) -> Result<(), commands::CommandError> {
    match command {
        Commands::Register { email, password } => {
            commands::auth::register(ctx, &email, password.map(SecretString::from)).await?;
        }
        Commands::Login { email, password } => {
            commands::auth::login(ctx, &email, password.map(SecretString::from)).await?;
        }
        Commands::Logout => commands::auth::logout(ctx)?,
        Commands::Whoami => commands::auth::whoami(ctx),
        Commands::Search { terms } => commands::books::search(ctx, &terms).await?,
        Commands::Details { target } => commands::books::details(ctx, &target).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(ctx)?,
            CartAction::Add { target } => commands::cart::add(ctx, &target).await?,
            CartAction::Remove { target } => commands::cart::remove(ctx, &target)?,
            CartAction::Clear => commands::cart::clear(ctx)?,
            CartAction::Checkout => commands::cart::checkout(ctx)?,
        },
        Commands::Migrate => commands::migrate::run().await?,
    }
    Ok(())
}
