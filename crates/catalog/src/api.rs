use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use resolve::ModelDescriptor;

use crate::{CatalogConfig, CatalogError, ModelCatalog};

/// Query parameter restricting the listing to embedding models.
const EMBED_MODEL_TYPE: &str = "embed";

#[derive(Deserialize)]
struct ModelListResponse {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

/// Lists embedding models from the remote control plane.
///
/// `GET {api_url}/models?type=embed` with `Api-Key` and
/// `X-Pinecone-API-Version` headers.
#[derive(Debug, Clone)]
pub struct HttpModelCatalog {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    api_version: String,
}

impl HttpModelCatalog {
    /// Builds a client honouring the configured timeout.
    pub fn new(cfg: &CatalogConfig) -> Result<Self, CatalogError> {
        cfg.validate()?;
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .connect_timeout(cfg.timeout().min(std::time::Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            client,
            url: cfg.models_url(),
            api_key: cfg.api_key.clone(),
            api_version: cfg.api_version.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ModelCatalog for HttpModelCatalog {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, CatalogError> {
        let mut request = self
            .client
            .get(&self.url)
            .query(&[("type", EMBED_MODEL_TYPE)])
            .header("X-Pinecone-API-Version", &self.api_version)
            .header("Accept", "application/json");
        if let Some(key) = self.api_key.as_deref() {
            request = request.header("Api-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let models = decode_model_list(&body)?;
        debug!(url = %self.url, count = models.len(), "catalog_listed");
        Ok(models)
    }
}

/// Parses a `{ "models": [...] }` listing.
pub(crate) fn decode_model_list(body: &str) -> Result<Vec<ModelDescriptor>, CatalogError> {
    let parsed: ModelListResponse = serde_json::from_str(body)?;
    Ok(parsed.models)
}
