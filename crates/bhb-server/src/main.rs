use actix_web::{middleware::Logger, web, App, HttpServer};
use bhb_server::{
    api::{self, prelude::Success},
    Config, Secrets,
};
use std::convert::Infallible;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::get_config();
    let secrets = Secrets::from_env(&config);

    tracing::info!("allow CORS origins: {:?}", config.cors_origins);
    tracing::info!("secrets: {:?}", secrets);
    if secrets.rpc_url.is_none() {
        tracing::warn!("no RPC URL configured, chain routes will fail");
    }

    let http = reqwest::Client::new();

    let host = config.host.clone();
    let port = config.port;

    tracing::info!("listening on {:?} port {:?}", host, port);

    HttpServer::new(move || {
        let healthcheck = web::resource("/healthcheck")
            .route(web::get().to(|| async { Ok::<_, Infallible>(web::Json(Success)) }));
        let api = web::scope("/api")
            .service(api::pinata_upload::service(&config))
            .service(api::update_metadata::service(&config))
            .service(api::stats::service(&config));

        App::new()
            .wrap(Logger::new(r#""%r" %s %b %Dms"#).exclude("/healthcheck"))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(secrets.clone()))
            .app_data(web::Data::new(http.clone()))
            .service(api)
            .service(healthcheck)
    })
    .bind((host, port))?
    .run()
    .await
}
