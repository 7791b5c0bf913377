//! Petal CLI - command-line storefront client.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! petal products --page 2
//! petal search roses
//!
//! # Build a guest cart, then sign in (the guest cart is merged)
//! petal cart add 665f1c --quantity 2
//! petal login -e asha@example.com -p rosebud123
//!
//! # Check out
//! petal checkout --payment cod --address 0
//! ```
//!
//! # Environment Variables
//!
//! See `petal_storefront::config` for the full list; `PETAL_API_BASE_URL` is
//! required.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use petal_core::{CartItemId, PaymentMethod, ProductId};
use petal_storefront::config::StorefrontConfig;
use petal_storefront::{Storefront, StorefrontError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "petal")]
#[command(author, version, about = "Petal storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Search products
    Search {
        /// Search text
        query: String,
    },
    /// Show one product
    Product {
        /// Product ID
        id: String,
    },
    /// List categories
    Categories,
    /// Create an account
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        /// Ten-digit mobile number
        #[arg(long)]
        phone: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in profile
    Profile,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Check out the cart, or a single product with --product
    Checkout {
        /// Buy this product now instead of the cart
        #[arg(long)]
        product: Option<String>,
        /// Quantity for --product
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
        /// Size for --product
        #[arg(long)]
        size: Option<String>,
        /// Payment method (cod, online)
        #[arg(long, default_value = "cod")]
        payment: PaymentMethod,
        /// Index of the saved address to ship to
        #[arg(short, long, default_value_t = 0)]
        address: usize,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product ID
        product: String,
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
        #[arg(long)]
        size: Option<String>,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        /// Cart item ID
        item: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Cart item ID
        item: String,
    },
    /// Remove every line
    Clear,
    /// Apply a coupon (or voucher with --voucher)
    Coupon {
        #[arg(required_unless_present = "remove")]
        code: Option<String>,
        #[arg(long)]
        voucher: bool,
        /// Remove the applied discount instead
        #[arg(long, conflicts_with = "voucher")]
        remove: bool,
    },
    /// Check stock and pricing
    Validate,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Save a product
    Add { product: String },
    /// Save or unsave a product
    Toggle { product: String },
    /// Unsave a product
    Remove { product: String },
    /// Move a product to the cart
    Move {
        product: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Unsave everything
    Clear,
}

/// Initialize Sentry error tracking if DSN is configured.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(
    metadata: &tracing::Metadata<'_>,
) -> sentry::integrations::tracing::EventFilter {
    use sentry::integrations::tracing::EventFilter;

    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => EventFilter::Breadcrumb,
        tracing::Level::TRACE => EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "petal_storefront=info,petal_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry::integrations::tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        e.report();
        tracing::error!("Command failed: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), StorefrontError> {
    let storefront = Storefront::new(config)?;

    match cli.command {
        Commands::Products { page } => commands::catalog::products(&storefront, page).await?,
        Commands::Search { query } => commands::catalog::search(&storefront, &query).await?,
        Commands::Product { id } => {
            commands::catalog::product(&storefront, &ProductId::new(id)).await?;
        }
        Commands::Categories => commands::catalog::categories(&storefront).await?,
        Commands::Signup {
            first_name,
            last_name,
            email,
            phone,
            password,
            confirm_password,
        } => {
            let form = petal_storefront::services::SignupForm {
                first_name,
                last_name,
                email,
                phone,
                password,
                confirm_password,
            };
            commands::auth::signup(&storefront, &form).await?;
        }
        Commands::Login { email, password } => {
            commands::auth::login(&storefront, &email, &password).await?;
        }
        Commands::Logout => commands::auth::logout(&storefront).await,
        Commands::Profile => commands::auth::profile(&storefront).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront).await?,
            CartAction::Add {
                product,
                quantity,
                size,
            } => commands::cart::add(&storefront, ProductId::new(product), quantity, size).await?,
            CartAction::Set { item, quantity } => {
                commands::cart::set(&storefront, CartItemId::new(item), quantity).await?;
            }
            CartAction::Remove { item } => {
                commands::cart::remove(&storefront, CartItemId::new(item)).await?;
            }
            CartAction::Clear => commands::cart::clear(&storefront).await?,
            CartAction::Coupon {
                code,
                voucher,
                remove,
            } => commands::cart::discount(&storefront, code, voucher, remove).await?,
            CartAction::Validate => commands::cart::validate(&storefront).await?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&storefront).await?,
            WishlistAction::Add { product } => {
                commands::wishlist::add(&storefront, ProductId::new(product)).await?;
            }
            WishlistAction::Toggle { product } => {
                commands::wishlist::toggle(&storefront, ProductId::new(product)).await?;
            }
            WishlistAction::Remove { product } => {
                commands::wishlist::remove(&storefront, ProductId::new(product)).await?;
            }
            WishlistAction::Move { product, quantity } => {
                commands::wishlist::move_to_cart(&storefront, ProductId::new(product), quantity)
                    .await?;
            }
            WishlistAction::Clear => commands::wishlist::clear(&storefront).await?,
        },
        Commands::Checkout {
            product,
            quantity,
            size,
            payment,
            address,
        } => {
            let product = product.map(ProductId::new);
            commands::checkout::run(
                &storefront,
                product.as_ref(),
                quantity,
                size,
                payment,
                address,
            )
            .await?;
        }
    }
    Ok(())
}
