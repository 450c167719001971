//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use fixflex_core::Session;

pub async fn cmd_serve(
    session: Session,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    cors_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting fixflex web server...");
    println!("   Listening: http://{}:{}", host, port);
    if session.is_empty() {
        println!("   No statements loaded (upload CSVs or load demo data from the UI)");
    } else {
        println!(
            "   Preloaded: {} transactions from {}",
            session.len(),
            session.sources().join(", ")
        );
    }
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !cors_origins.is_empty() {
        println!("   CORS origins: {}", cors_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let static_dir_str = static_dir
        .map(|p| {
            p.to_str()
                .with_context(|| format!("Static dir path is not valid UTF-8: {}", p.display()))
        })
        .transpose()?;
    let config = fixflex_server::ServerConfig {
        allowed_origins: cors_origins,
    };
    fixflex_server::serve(session, host, port, static_dir_str, config).await?;

    Ok(())
}
