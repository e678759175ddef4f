// Token issuance
//
// The backend hands out a bearer token for HTTP Basic credentials at
// `GET /authorization`. The returned token is applied to the client;
// persisting it is the caller's decision.

use secrecy::SecretString;
use tracing::debug;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Error;
use crate::models::AuthorizationResponse;

/// Token issuance endpoint.
pub const AUTHORIZATION_PATH: &str = "/authorization";

impl ApiClient {
    /// Exchange username/password for a bearer token and start using it.
    pub async fn authorize(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        debug!(username, "requesting bearer token");

        let options = RequestOptions::default().basic_auth(username, password.clone());
        let resp: AuthorizationResponse = self
            .get(AUTHORIZATION_PATH, &options)
            .await?
            .into_data();

        self.set_token(resp.authorization.clone())?;
        Ok(SecretString::from(resp.authorization))
    }
}
