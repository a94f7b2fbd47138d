//! API client for the household inventory REST service.
//!
//! Each method maps to exactly one endpoint and interprets the status codes
//! that endpoint is known to produce. No retries.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Credentials, NewProduct, Product, ProductPatch, TokenPair};

use super::ApiError;

// ============================================================================
// Endpoints
// ============================================================================

const TOKEN_PATH: &str = "/api/users/token/";
const REGISTER_PATH: &str = "/api/users/register/";
const PRODUCT_LIST_PATH: &str = "/api/products/list/";
const PRODUCT_CREATE_PATH: &str = "/api/products/create/";

fn product_update_path(id: i64) -> String {
    format!("/api/products/update/{}/", id)
}

fn product_destroy_path(id: i64) -> String {
    format!("/api/products/destroy/{}/", id)
}

/// Body of a 401 from the token endpoint
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Option<String>,
}

/// Body of a 400 from the registration endpoint
#[derive(Debug, Deserialize)]
struct RegistrationErrors {
    #[serde(default)]
    error: Vec<String>,
}

/// API client for the inventory service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Authentication =====

    /// Exchange credentials for a token pair
    pub async fn issue_token(&self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        let url = self.url(TOKEN_PATH);
        debug!(url = %url, "POST token");
        let response = self.client.post(&url).json(credentials).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            let detail = serde_json::from_str::<ErrorDetail>(&body)
                .ok()
                .and_then(|e| e.detail);
            debug!(has_detail = detail.is_some(), "Token request unauthorized");
            return Err(ApiError::Unauthorized { detail });
        }

        Self::parse_tokens(status, &body)
    }

    /// Create an account and return its first token pair
    pub async fn register(&self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        let url = self.url(REGISTER_PATH);
        debug!(url = %url, "POST register");
        let response = self.client.post(&url).json(credentials).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::BAD_REQUEST {
            let reason = serde_json::from_str::<RegistrationErrors>(&body)
                .ok()
                .and_then(|e| e.error.into_iter().next());
            debug!(has_reason = reason.is_some(), "Registration rejected");
            return Err(ApiError::Rejected { reason });
        }

        Self::parse_tokens(status, &body)
    }

    fn parse_tokens(status: StatusCode, body: &str) -> Result<TokenPair, ApiError> {
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                body = %ApiError::truncate_body(body),
                "Unexpected auth response"
            );
            return Err(ApiError::InvalidResponse);
        }
        serde_json::from_str(body).map_err(|e| {
            warn!(error = %e, "Auth response missing tokens");
            ApiError::InvalidResponse
        })
    }

    // ===== Products =====

    pub async fn list_products(&self, token: &str) -> Result<Vec<Product>, ApiError> {
        let url = self.url(PRODUCT_LIST_PATH);
        debug!(url = %url, "GET products");
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::expect_status(response, StatusCode::OK, "Failed to load products").await?;
        Self::parse_json(response).await
    }

    /// Create a product. The server answers 201 without a usable body, so
    /// callers re-list to learn the new id.
    pub async fn create_product(&self, token: &str, product: &NewProduct) -> Result<(), ApiError> {
        let url = self.url(PRODUCT_CREATE_PATH);
        debug!(url = %url, title = %product.title, "POST product");
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(product)
            .send()
            .await?;
        Self::expect_status(response, StatusCode::CREATED, "Failed to add product").await?;
        Ok(())
    }

    pub async fn update_product(
        &self,
        token: &str,
        id: i64,
        patch: &ProductPatch,
    ) -> Result<(), ApiError> {
        let url = self.url(&product_update_path(id));
        debug!(url = %url, id, "PATCH product");
        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        Self::expect_status(response, StatusCode::OK, "Failed to update product").await?;
        Ok(())
    }

    pub async fn delete_product(&self, token: &str, id: i64) -> Result<(), ApiError> {
        let url = self.url(&product_destroy_path(id));
        debug!(url = %url, id, "DELETE product");
        let response = self.client.delete(&url).bearer_auth(token).send().await?;
        Self::expect_status(response, StatusCode::NO_CONTENT, "Failed to delete product").await?;
        Ok(())
    }

    /// Pass the response through if it has exactly `expected` status.
    async fn expect_status(
        response: Response,
        expected: StatusCode,
        action: &'static str,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            expected = expected.as_u16(),
            body = %ApiError::truncate_body(&body),
            "{}",
            action
        );
        Err(ApiError::Server {
            action,
            status: status.as_u16(),
        })
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }
}
