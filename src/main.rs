use std::fs;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zarco::config::ServerConfig;
use zarco::server::{AppState, create_router};
use zarco::store::{SqliteStore, Store, seed::seed_catalog};

#[derive(Parser)]
#[command(name = "zarco")]
#[command(about = "A storefront server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Mark session cookies Secure. Enable when serving behind TLS.
        #[arg(long)]
        secure_cookies: bool,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create the database and seed the catalog)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("zarco.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let inserted = seed_catalog(&store)?;
    let total = store.count_products()?;

    println!("Database ready at {}", db_path.display());
    println!("Seeded {inserted} products ({total} in catalog)");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("zarco=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init { data_dir } => {
                run_init(data_dir)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            secure_cookies,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                secure_cookies,
            };

            fs::create_dir_all(&config.data_dir)?;
            let store = SqliteStore::new(config.db_path())?;

            // Schema and seed run before the listener binds; both are
            // idempotent, so a fresh or already-initialized data dir works.
            store.initialize()?;
            let seeded = seed_catalog(&store)?;
            if seeded > 0 {
                info!("Seeded {} catalog products", seeded);
            }

            let purged = store.delete_expired_sessions()?;
            if purged > 0 {
                info!("Purged {} expired sessions", purged);
            }

            let state = Arc::new(AppState {
                store: Arc::new(store),
                secure_cookies: config.secure_cookies,
            });

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
