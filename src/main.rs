use std::io;

use storefront::{bootstrap_admin, build_server, create_pool, run_migrations, Config};

fn other<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> io::Error + '_ {
    move |e| io::Error::other(format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(other("invalid configuration"))?;

    let pool = create_pool(&config.database_url).map_err(other("cannot open database"))?;
    run_migrations(&pool).map_err(other("cannot migrate database"))?;
    bootstrap_admin(&pool, &config).map_err(other("cannot create admin account"))?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(pool, &config, &config.host, config.port)?.await
}
