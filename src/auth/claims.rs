use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload. Only the subject is meaningful to the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,   // user ID
    pub iat: usize,  // issued at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>, // only present when an expiry is configured
}
