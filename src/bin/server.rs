use std::{
    env,
    fs::OpenOptions,
    net::SocketAddr,
    sync::Arc,
};

use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use spendlog::{
    AppConfig, AppState, CategoryBudgets, PaginationConfig, build_router, graceful_shutdown,
    parse_budget_spec,
};

/// The expense tracking web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The number of expenses to show per page of the expense history.
    #[arg(long, default_value_t = 20)]
    page_size: u64,

    /// A monthly budget for overspending alerts, e.g. 'groceries=500'.
    /// May be given multiple times, once per category.
    #[arg(long = "budget")]
    budgets: Vec<String>,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let mut budgets = CategoryBudgets::default();
    for spec in &args.budgets {
        let (category, budget_cents) =
            parse_budget_spec(spec).unwrap_or_else(|error| panic!("bad --budget '{spec}': {error}"));
        budgets.set(category, budget_cents);
    }

    let conn = Connection::open(&args.db_path).expect("Could not open database");
    let state = AppState::new(
        conn,
        &secret,
        AppConfig::new(budgets),
        PaginationConfig {
            default_page: 1,
            default_page_size: args.page_size,
        },
    )
    .expect("Could not initialize the application state");

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}
