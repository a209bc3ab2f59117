#![allow(async_fn_in_trait)]

extern crate actix_web;
extern crate chrono;
extern crate dotenv;
extern crate env_logger;
extern crate hex;
extern crate jsonwebtoken;
extern crate lazy_static;
extern crate log;
extern crate rand;
extern crate regex;
extern crate serde;
extern crate serde_json;
extern crate sha2;
extern crate sqlx;
extern crate thiserror;
extern crate tokio;
extern crate uuid;

mod context;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
mod middlewares;
mod request;
mod response;

use actix_web::web::{delete, get, post, put, resource, scope, Data};
use actix_web::HttpServer;
use middlewares::jwt::{JWTMiddleware, JWT_SECRET};
use sqlx::postgres::PgPoolOptions;

#[derive(Debug, Clone)]
pub struct OrgConfig {
    pub domain: String,
    pub member_prefix: String,
}

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();
    std::env::set_var("RUST_LOG", "actix_web=info,zeh_portal=info");
    env_logger::init();
    let database_url = dotenv::var("DATABASE_URL").expect("environment variable DATABASE_URL not been set");
    let secret = dotenv::var(JWT_SECRET).expect("environment variable JWT_SECRET not been set");
    let config = OrgConfig {
        domain: dotenv::var("ORG_DOMAIN").unwrap_or_else(|_| "zehsscwu.org".to_owned()),
        member_prefix: dotenv::var("MEMBER_ID_PREFIX").unwrap_or_else(|_| "ZEH".to_owned()),
    };
    let bind_addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_owned());
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");
    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .service(
                scope("")
                    .service(resource("login").route(post().to(handlers::login)))
                    .service(
                        scope("")
                            .wrap(JWTMiddleware::new(secret.as_bytes().to_owned()))
                            .service(resource("stats").route(get().to(handlers::stats::system)))
                            .service(
                                scope("requests")
                                    .route("", post().to(handlers::enrollment::submit))
                                    .route("", get().to(handlers::enrollment::own_pending))
                                    .route("pending", get().to(handlers::enrollment::pending))
                                    .service(
                                        scope("{request_id}")
                                            .route("approve", post().to(handlers::enrollment::approve))
                                            .route("reject", post().to(handlers::enrollment::reject)),
                                    ),
                            )
                            .service(
                                scope("members")
                                    .route("", get().to(handlers::member::list))
                                    .route("", post().to(handlers::member::create))
                                    .route("next-id", get().to(handlers::enrollment::next_id))
                                    .route("me", get().to(handlers::member::me))
                                    .route("me", put().to(handlers::member::update_me))
                                    .service(
                                        scope("{member_id}")
                                            .route("", get().to(handlers::member::detail))
                                            .route("", put().to(handlers::member::update))
                                            .route("", delete().to(handlers::member::remove)),
                                    ),
                            )
                            .service(
                                scope("institutions")
                                    .route("", get().to(handlers::institution::list))
                                    .route("", post().to(handlers::institution::create))
                                    .service(
                                        scope("{institution_id}")
                                            .route("", get().to(handlers::institution::detail))
                                            .route("", put().to(handlers::institution::update))
                                            .route("", delete().to(handlers::institution::remove))
                                            .route("members", get().to(handlers::institution::members))
                                            .service(
                                                scope("works-councils")
                                                    .route("", get().to(handlers::works::council_list))
                                                    .route("", post().to(handlers::works::council_add)),
                                            )
                                            .service(
                                                scope("works-committees")
                                                    .route("", get().to(handlers::works::committee_list))
                                                    .route("", post().to(handlers::works::committee_add)),
                                            ),
                                    ),
                            )
                            .service(resource("works-councils/{row_id}").route(delete().to(handlers::works::council_remove)))
                            .service(resource("works-committees/{row_id}").route(delete().to(handlers::works::committee_remove))),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
