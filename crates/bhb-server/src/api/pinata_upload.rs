use super::prelude::*;
use pinata_client::{Pinata, PinnedFile};

pub fn service(config: &Config) -> impl HttpServiceFactory {
    web::resource("/pinata-upload")
        .app_data(json_config())
        .wrap(config.cors())
        .route(web::post().to(pinata_upload))
        .default_service(web::to(post_only))
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    /// Base64 file content.
    pub data: Option<String>,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

async fn pinata_upload(
    params: web::Json<Params>,
    config: web::Data<Config>,
    secrets: web::Data<Secrets>,
    http: web::Data<reqwest::Client>,
) -> Result<web::Json<PinnedFile>> {
    let (Some(data), Some(content_type)) =
        (non_empty(&params.data), non_empty(&params.content_type))
    else {
        return Err(Error::MissingUpload);
    };

    let jwt = secrets
        .pinata_jwt
        .clone()
        .ok_or(Error::MissingEnv(Secrets::PINATA_JWT))?;

    let bytes = base64::decode(data).map_err(|e| Error::invalid("data", e))?;
    let filename = non_empty(&params.filename).unwrap_or(config.pinata.default_filename.as_str());

    let pinata = Pinata::new(
        http.get_ref().clone(),
        jwt,
        &config.pinata.api_url,
        &config.pinata.gateway_url,
    )?;
    let pinned = pinata.pin_file(bytes, content_type, filename).await?;
    Ok(web::Json(pinned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    async fn call(secrets: Secrets, req: test::TestRequest) -> (StatusCode, serde_json::Value) {
        tracing_subscriber::fmt::try_init().ok();
        let config = Config::default();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config.clone()))
                .app_data(web::Data::new(secrets))
                .app_data(web::Data::new(reqwest::Client::new()))
                .service(web::scope("/api").service(service(&config))),
        )
        .await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        (status, test::read_body_json(resp).await)
    }

    fn with_jwt() -> Secrets {
        Secrets {
            pinata_jwt: Some("jwt".to_owned()),
            ..Secrets::default()
        }
    }

    #[actix_web::test]
    async fn test_missing_fields() {
        let req = test::TestRequest::post()
            .uri("/api/pinata-upload")
            .set_json(Params {
                data: Some("aGVsbG8=".to_owned()),
                ..Params::default()
            });
        let (status, body) = call(with_jwt(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing data or contentType");
    }

    #[actix_web::test]
    async fn test_missing_jwt() {
        let req = test::TestRequest::post()
            .uri("/api/pinata-upload")
            .set_json(Params {
                data: Some("aGVsbG8=".to_owned()),
                content_type: Some("image/png".to_owned()),
                filename: None,
            });
        let (status, body) = call(Secrets::default(), req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Missing PINATA_JWT env var");
    }

    #[actix_web::test]
    async fn test_bad_base64() {
        let req = test::TestRequest::post()
            .uri("/api/pinata-upload")
            .set_json(Params {
                data: Some("not base64!".to_owned()),
                content_type: Some("image/png".to_owned()),
                filename: None,
            });
        let (status, _) = call(with_jwt(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_invalid_content_type() {
        let req = test::TestRequest::post()
            .uri("/api/pinata-upload")
            .set_json(Params {
                data: Some("aGVsbG8=".to_owned()),
                content_type: Some("png".to_owned()),
                filename: None,
            });
        let (status, body) = call(with_jwt(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid contentType: png");
    }

    #[actix_web::test]
    async fn test_post_only() {
        let req = test::TestRequest::get().uri("/api/pinata-upload");
        let (status, body) = call(with_jwt(), req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "POST only");
    }
}
