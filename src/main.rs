use clap::{Args, Parser, Subcommand};
use coursepay::application::signature::SignatureVerifier;
use coursepay::config::{Config, PaymentConfig, Secret};
use coursepay::domain::ports::{CourseStore, UserStore};
use coursepay::domain::user::{AccountType, UserId};
use coursepay::infrastructure::Stores;
use coursepay::infrastructure::gateway::LocalGateway;
use coursepay::infrastructure::mail::LogMailTransport;
use coursepay::interfaces::csv::catalog_reader::CatalogReader;
use coursepay::interfaces::http::auth::TokenAuthority;
use coursepay::interfaces::http::{AppState, router};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve(ServeArgs),
    /// Print the gateway signature for an order/payment pair
    SignPayment {
        order_id: String,
        payment_id: String,
        #[arg(long, env = "PAYMENT_KEY_SECRET", hide_env_values = true)]
        payment_secret: String,
    },
    /// Print a bearer token for a user
    IssueToken {
        user_id: String,
        #[arg(long, default_value = "student")]
        role: AccountType,
        #[arg(long, env = "AUTH_TOKEN_SECRET", hide_env_values = true)]
        auth_secret: String,
        /// Token lifetime in seconds
        #[arg(long, default_value_t = Config::DEFAULT_TOKEN_TTL_SECS)]
        ttl_secs: i64,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "COURSEPAY_BIND", default_value = "0.0.0.0:4000")]
    bind: String,

    /// Course catalog CSV (id,name,price,instructor,lessons)
    #[arg(long)]
    courses: Option<PathBuf>,

    /// User CSV (id,email,first_name,last_name,account_type)
    #[arg(long)]
    users: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[arg(long, env = "PAYMENT_KEY_SECRET", hide_env_values = true)]
    payment_secret: String,

    #[arg(long, env = "AUTH_TOKEN_SECRET", hide_env_values = true)]
    auth_secret: String,

    /// Lifetime of issued bearer tokens, in seconds
    #[arg(long, env = "AUTH_TOKEN_TTL_SECS", default_value_t = Config::DEFAULT_TOKEN_TTL_SECS)]
    token_ttl_secs: i64,

    #[arg(long, env = "PAYMENT_CURRENCY", default_value = Config::DEFAULT_CURRENCY)]
    currency: String,

    #[arg(long, default_value_t = Config::DEFAULT_NOTIFICATION_QUEUE)]
    notification_queue: usize,

    /// Origin allowed by CORS (repeatable)
    #[arg(long = "allowed-origin", default_value = "http://localhost:3000")]
    allowed_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::SignPayment {
            order_id,
            payment_id,
            payment_secret,
        } => {
            let config = PaymentConfig::new(Secret::new(payment_secret), Config::DEFAULT_CURRENCY);
            println!("{}", SignatureVerifier::new(&config).sign(&order_id, &payment_id));
            Ok(())
        }
        Command::IssueToken {
            user_id,
            role,
            auth_secret,
            ttl_secs,
        } => {
            let authority = TokenAuthority::new(Secret::new(auth_secret)).with_ttl(ttl_secs);
            println!("{}", authority.issue(&UserId::new(user_id), role));
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = Config {
        payment: PaymentConfig::new(Secret::new(args.payment_secret), args.currency),
        auth_secret: Secret::new(args.auth_secret),
        token_ttl_secs: args.token_ttl_secs,
        notification_queue: args.notification_queue,
        allowed_origins: args.allowed_origins,
    };

    let stores = open_stores(args.db_path.as_deref())?;
    if let Some(path) = &args.courses {
        seed_courses(&stores, path).await?;
    }
    if let Some(path) = &args.users {
        seed_users(&stores, path).await?;
    }

    let (state, worker) = AppState::build(
        &config,
        stores,
        Arc::new(LocalGateway::new()),
        Box::new(LogMailTransport::new()),
    );
    let app = router(state, &config.allowed_origins);

    let listener = TcpListener::bind(&args.bind).await.into_diagnostic()?;
    info!(address = %args.bind, currency = %config.payment.currency, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    // The router owned the last notification sender; let queued mail drain.
    let delivered = worker.await.into_diagnostic()?;
    info!(delivered, "Server stopped");
    Ok(())
}

fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            info!(path = %path.display(), "Using RocksDB storage");
            Stores::rocksdb(path).into_diagnostic()
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Stores::in_memory())
        }
        None => Ok(Stores::in_memory()),
    }
}

async fn seed_courses(stores: &Stores, path: &Path) -> Result<()> {
    let reader = CatalogReader::new(File::open(path).into_diagnostic()?);
    let mut loaded = 0;
    for course in reader.courses() {
        match course {
            Ok(course) => {
                stores.courses.store(course).await.into_diagnostic()?;
                loaded += 1;
            }
            Err(e) => warn!(error = %e, "Skipping course record"),
        }
    }
    info!(loaded, path = %path.display(), "Courses loaded");
    Ok(())
}

async fn seed_users(stores: &Stores, path: &Path) -> Result<()> {
    let reader = CatalogReader::new(File::open(path).into_diagnostic()?);
    let mut loaded = 0;
    for user in reader.users() {
        match user {
            Ok(user) => {
                stores.users.store(user).await.into_diagnostic()?;
                loaded += 1;
            }
            Err(e) => warn!(error = %e, "Skipping user record"),
        }
    }
    info!(loaded, path = %path.display(), "Users loaded");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
