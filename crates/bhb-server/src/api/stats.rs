use super::prelude::*;
use bhb_mint::MintStats;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;

pub fn service(config: &Config) -> impl HttpServiceFactory {
    web::resource("/stats")
        .wrap(config.cors())
        .route(web::get().to(stats))
}

async fn stats(config: web::Data<Config>, secrets: web::Data<Secrets>) -> Result<web::Json<MintStats>> {
    let rpc_url = secrets
        .rpc_url
        .clone()
        .ok_or(Error::MissingEnv(Secrets::SOLANA_RPC_URL))?;
    let rpc = RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed());
    let stats = bhb_mint::fetch_stats(&rpc, &config.mint.candy_machine).await?;
    Ok(web::Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_missing_rpc_url() {
        let config = Config::default();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config.clone()))
                .app_data(web::Data::new(Secrets::default()))
                .service(web::scope("/api").service(service(&config))),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/stats").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
