use serde::{Deserialize, Serialize};

/// Claims carried by the bearer token the auth provider issues.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub exp: usize,
}
