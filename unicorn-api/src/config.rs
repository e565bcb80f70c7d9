use std::net::SocketAddr;

use clap::Parser;

/// Runtime configuration, read once at startup from flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "unicorn-api", version, about = "Serves the unicorn collection over HTTP")]
pub struct Config {
    /// MongoDB connection string.
    #[arg(long = "mongodb-uri", env = "MONGODB_DB_URI")]
    pub mongodb_uri: String,

    /// Database holding the unicorn collection.
    #[arg(long = "db-name", env = "DB_NAME")]
    pub db_name: String,

    /// Address the HTTP server listens on.
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,
}
