pub mod pinata_upload;
pub mod stats;
pub mod update_metadata;

pub mod prelude {
    pub use crate::{
        error::{Error, Result},
        Config, Secrets,
    };
    pub use actix_web::{dev::HttpServiceFactory, http::StatusCode, web};
    pub use serde::{Deserialize, Serialize};

    pub struct Success;

    impl Serialize for Success {
        fn serialize<S>(&self, s: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            use serde::ser::SerializeStruct;
            let mut s = s.serialize_struct("Success", 1)?;
            s.serialize_field("success", &true)?;
            s.end()
        }
    }

    /// Empty strings count as missing.
    pub fn non_empty(s: &Option<String>) -> Option<&str> {
        s.as_deref().filter(|s| !s.is_empty())
    }

    /// Fallback for any method other than POST on a POST route.
    pub async fn post_only() -> Result<web::Json<Success>> {
        Err(Error::MethodNotAllowed)
    }

    /// Base64 images are sent inline.
    pub const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

    /// Body errors render as `{ "error": .. }` with a 400.
    pub fn json_config() -> web::JsonConfig {
        web::JsonConfig::default()
            .limit(MAX_BODY_SIZE)
            .error_handler(|error, _| Error::Json(error).into())
    }
}
