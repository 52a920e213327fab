//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::open_db;

/// Split a comma-separated environment variable into trimmed, non-empty entries
pub fn env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16, no_auth: bool) -> Result<()> {
    println!("🚀 Starting Finsight web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let api_keys = env_list("FINSIGHT_API_KEYS");
    let allowed_origins = env_list("FINSIGHT_ALLOWED_ORIGINS");

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!(
            "   🔒 Authentication: {} header from your proxy",
            finsight_server::USER_HEADER
        );
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (FINSIGHT_API_KEYS)",
                api_keys.len()
            );
        }
    }
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} (FINSIGHT_ALLOWED_ORIGINS)",
            allowed_origins.join(", ")
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let config = finsight_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
    };

    finsight_server::serve_with_config(db, host, port, config).await
}
