use limousine::config::Config;
use limousine::db;
use limousine::engine::Engine;
use limousine::error::Error;
use limousine::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url, config.database_max_connections).await?;

    let engine = Engine::new(pool).await?;

    serve(engine, config.listen_addr).await
}
