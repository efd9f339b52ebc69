use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use taskvault::auth::gateway::{HttpProviderGateway, ProviderGateway};
use taskvault::auth::{AuthMiddleware, IdentityReconciler, TokenCodec};
use taskvault::config::Config;
use taskvault::error::AppError;
use taskvault::routes;
use taskvault::store::{AccountStore, PgStore, TodoStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = sqlx::PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    // The signing key is read once here and lives inside the codec for the
    // rest of the process lifetime.
    let codec = Arc::new(TokenCodec::new(
        &config.jwt_secret,
        config.jwt_expire_seconds,
    ));

    let store = Arc::new(PgStore::new(pool));
    let accounts: Arc<dyn AccountStore> = store.clone();
    let todos: Arc<dyn TodoStore> = store;
    let reconciler = Arc::new(IdentityReconciler::new(accounts.clone()));
    let gateway: Arc<dyn ProviderGateway> = Arc::new(HttpProviderGateway::new(config.clone()));

    log::info!("Starting taskvault server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::from(codec.clone()))
            .app_data(web::Data::from(accounts.clone()))
            .app_data(web::Data::from(todos.clone()))
            .app_data(web::Data::from(reconciler.clone()))
            .app_data(web::Data::from(gateway.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(err.to_string()).into()
            }))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(codec.clone()))
            .service(routes::health::health)
            .configure(routes::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
