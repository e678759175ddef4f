// Data resources under the data base path.
//
// The backend keeps arbitrary JSON documents keyed by UUID in a bucket
// derived from the caller's credential.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Error;
use crate::models::CreatedData;

impl ApiClient {
    /// The collection URL (data base URL without its trailing slash).
    fn data_collection(&self) -> String {
        self.base_url().as_str().trim_end_matches('/').to_owned()
    }

    /// List the keys stored in the caller's bucket.
    pub async fn list_data(&self) -> Result<Vec<String>, Error> {
        let target = self.data_collection();
        let keys: Option<Vec<String>> = self
            .get(&target, &RequestOptions::default())
            .await?
            .into_data();
        Ok(keys.unwrap_or_default())
    }

    /// Fetch one stored document. `id` must be a UUID.
    pub async fn get_data(&self, id: &str) -> Result<Value, Error> {
        let id = parse_key(id)?;
        Ok(self
            .get(&id.to_string(), &RequestOptions::default())
            .await?
            .into_data())
    }

    /// Store a JSON document and return the key the backend assigned.
    pub async fn post_data<B: Serialize + ?Sized + Sync>(
        &self,
        document: &B,
    ) -> Result<Uuid, Error> {
        let target = self.data_collection();
        let created: CreatedData = self
            .post(&target, Some(document), &RequestOptions::default())
            .await?
            .into_data();
        Ok(created.id)
    }
}

fn parse_key(id: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(id.trim()).map_err(|_| Error::InvalidDataKey(id.to_owned()))
}
