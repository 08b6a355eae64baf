use std::io;

use admin_console::config::Config;
use admin_console::{build_server, create_pool, run_migrations, AppContext};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = create_pool(&config.database_url, config.db_pool_size)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    run_migrations(&pool).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let ctx = AppContext::from_pool(pool, &config);

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(ctx, &config.host, config.port)?.await
}
