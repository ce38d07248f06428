//! OntoView — serve an interactive graph, hypergraph, list or node view.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use ontoview_core::ServerConfig;
use ontoview_server::routes;
use ontoview_server::{Dataset, LabelSearch, Session};

fn print_help() {
    println!("OntoView — explore large graphs one neighbourhood at a time");
    println!();
    println!("Usage: ontoview [command]");
    println!();
    println!("Commands:");
    println!("  serve [dataset.json]     Start the server, optionally loading a dataset");
    println!("  help                     Show this message");
    println!();
    println!("Environment:");
    println!("  ONTOVIEW_HOST            Bind address (default: 127.0.0.1)");
    println!("  ONTOVIEW_PORT            Port (default: 8000)");
    println!("  ONTOVIEW_HOPS            Default sample radius (default: 2)");
    println!("  ONTOVIEW_PAGE_SIZE       Default page size (default: 30)");
    println!("  RUST_LOG                 Log filter (default: info)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let dataset_path = match args.get(1).map(String::as_str) {
        None => None,
        Some("serve") => args.get(2).cloned(),
        Some("--help" | "-h" | "help") => {
            print_help();
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(1);
        }
    };

    let config = ServerConfig::from_env();
    let session = Arc::new(Session::new(config.clone()));
    session.register_search(LabelSearch::default());

    if let Some(path) = dataset_path {
        let storage = Dataset::from_path(&path)?.build(&config.defaults)?;
        session.replace(storage);
    } else {
        info!("No dataset given; POST one to /api/visualize");
    }

    let app = routes::build_router(session);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("OntoView listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
