use clap::Parser;
use docrest::{
    backend::StoreConnectorBuilder, client::ResourceClient, mongodb::MongoDbConnector,
    session::SessionFactory,
};
use tokio::net::TcpListener;
use tracing::info;

use unicorn_api::{app, config::Config, telemetry::init_tracing, unicorn::unicorn_config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_tracing();

    let connector = MongoDbConnector::builder(&config.mongodb_uri).build().await?;
    let client = ResourceClient::new(
        SessionFactory::new(connector, config.db_name.as_str()),
        unicorn_config()?,
    );

    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, database = %config.db_name, "unicorn-api listening");

    axum::serve(listener, app(client))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
