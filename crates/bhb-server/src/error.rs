use actix_web::{error::JsonPayloadError, http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use solana_client::client_error::ClientError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("POST only")]
    MethodNotAllowed,
    #[error("Missing required fields")]
    MissingFields,
    #[error("Missing data or contentType")]
    MissingUpload,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Wallet does not hold this NFT")]
    NotHolder,
    #[error("Missing {0} env var")]
    MissingEnv(&'static str),
    #[error("invalid {field}: {msg}")]
    InvalidField { field: &'static str, msg: String },
    #[error("invalid update authority key: {0}")]
    AuthorityKey(String),
    #[error(transparent)]
    Json(#[from] JsonPayloadError),
    #[error(transparent)]
    Pinata(#[from] pinata_client::Error),
    #[error(transparent)]
    Mint(#[from] bhb_mint::Error),
    #[error(transparent)]
    Metadata(#[from] token_metadata_ix::Error),
    #[error("{}", bhb_mint::error::verbose_solana_error(.0))]
    SolanaClient(#[from] ClientError),
    #[error("{}", msg)]
    Custom { status: StatusCode, msg: String },
}

impl Error {
    pub fn custom<T: std::fmt::Display>(status: StatusCode, msg: T) -> Self {
        Error::Custom {
            status,
            msg: msg.to_string(),
        }
    }

    pub fn invalid<T: std::fmt::Display>(field: &'static str, msg: T) -> Self {
        Error::InvalidField {
            field,
            msg: msg.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn build<E: ResponseError>(e: &E) -> HttpResponse {
        HttpResponse::build(e.status_code()).json(ErrorBody {
            error: e.to_string(),
        })
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::MissingFields
            | Error::MissingUpload
            | Error::InvalidField { .. }
            | Error::Pinata(pinata_client::Error::ContentType(_))
            | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::InvalidSignature => StatusCode::UNAUTHORIZED,
            Error::NotHolder => StatusCode::FORBIDDEN,
            Error::Pinata(pinata_client::Error::Upstream { status, .. }) => {
                StatusCode::from_u16(status.as_u16())
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Error::Pinata(pinata_client::Error::UnexpectedResponse(_)) => StatusCode::BAD_GATEWAY,
            Error::Custom { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Error::Pinata(pinata_client::Error::Upstream { body, .. }) => {
                HttpResponse::build(self.status_code()).json(body)
            }
            _ => {
                if self.status_code().is_server_error() {
                    tracing::error!("{}", self);
                }
                ErrorBody::build(self)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::MissingFields.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(Error::NotHolder.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            Error::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            Error::MissingEnv("PINATA_JWT").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::MissingEnv("PINATA_JWT").to_string(),
            "Missing PINATA_JWT env var"
        );
    }

    #[test]
    fn test_upstream_passthrough() {
        let err = Error::Pinata(pinata_client::Error::Upstream {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: serde_json::json!({ "error": { "reason": "INVALID_CREDENTIALS" } }),
        });
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_failed_upload_is_not_success() {
        let err = Error::Pinata(pinata_client::Error::UnexpectedResponse(
            r#"{"PinSize":1}"#.to_owned(),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.error_response().status().is_server_error());

        let err = Error::Pinata(pinata_client::Error::Upstream {
            status: reqwest::StatusCode::OK,
            body: serde_json::json!({ "error": "unexpected response" }),
        });
        assert!(err.error_response().status().is_server_error());
    }

    #[test]
    fn test_content_type_is_bad_request() {
        let err = Error::Pinata(pinata_client::Error::ContentType("png".to_owned()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "invalid contentType: png");
    }
}
