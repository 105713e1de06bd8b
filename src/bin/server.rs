use std::net::SocketAddr;

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gastos_rs::{
    AppState, DashboardConfig, DuplicatePolicy, PaginationConfig, YearBounds, build_router,
    graceful_shutdown, logging_middleware,
};

/// The web server for the gastos dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the dashboard from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "America/Argentina/Buenos_Aires".
    #[arg(long, default_value = "Etc/UTC")]
    local_timezone: String,

    /// What to do when an expense already exists for the same service and month.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::ConfirmUpdate)]
    duplicate_policy: DuplicatePolicy,

    /// The earliest year an expense may belong to.
    #[arg(long, default_value_t = 2000)]
    min_year: i32,

    /// How many years after the current year an expense may belong to.
    #[arg(long, default_value_t = 10)]
    years_ahead: u16,

    /// The number of expenses per page when the request does not say.
    #[arg(long, default_value_t = 20)]
    page_size: u64,

    /// Log the bodies of every request and response.
    #[arg(long)]
    log_bodies: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let year_bounds =
        YearBounds::for_local_timezone(args.min_year, args.years_ahead, &args.local_timezone)
            .expect("Could not determine the current year in the local timezone");
    let dashboard_config = DashboardConfig {
        duplicate_policy: args.duplicate_policy,
        year_bounds,
    };
    let pagination_config = PaginationConfig {
        default_page_size: args.page_size,
        ..Default::default()
    };

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let state = AppState::new(
        conn,
        &args.local_timezone,
        pagination_config,
        dashboard_config,
    )
    .expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let mut router = add_tracing_layer(build_router(state));

    if args.log_bodies {
        router = router.layer(middleware::from_fn(logging_middleware));
    }

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!(
        "HTTP server listening on {addr} (duplicates: {:?}, years {}-{})",
        dashboard_config.duplicate_policy,
        year_bounds.min,
        year_bounds.max
    );
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped with an error");
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gastos_rs=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Handlers log their own errors, so 5xx responses are not logged again here.
        .on_failure(());

    router.layer(tracing_layer)
}
