//! HTTP client for the floor backend REST API

use crate::{ClientConfig, ClientError, ClientResult, FloorBackend, LinkedPayment};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::models::{LinkCreate, LinkRemove};
use shared::{
    ApiResponse, DiningTable, DiningTableUpdate, LinkGroup, Order, OrderItem, OrderStatus,
    TableBinding,
};

/// HTTP client for making network requests to the floor backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => request.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", t)),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let request = self.authorize(self.client.get(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse<T>> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        Self::handle_response(request.send().await?).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let request = self.authorize(self.client.post(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse<T>> {
        let request = self.authorize(self.client.put(self.url(path)).json(body));
        Self::handle_response(request.send().await?).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let request = self.authorize(self.client.delete(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// Handle the HTTP response
    ///
    /// Every body is an [`ApiResponse`] envelope. A non-zero `code` becomes
    /// [`ClientError::Api`] whatever the HTTP status was.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<ApiResponse<T>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
                && let Some(err) = envelope.to_error()
            {
                return Err(ClientError::Api(err));
            }
            tracing::debug!(status = %status, body = %text, "Backend returned non-envelope error");
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(text))
                }
                _ => Err(ClientError::Internal(text)),
            };
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&text)?;
        if let Some(err) = envelope.to_error() {
            return Err(ClientError::Api(err));
        }
        Ok(envelope)
    }

    /// Unwrap the `data` field of a success envelope
    fn data<T>(envelope: ApiResponse<T>, what: &str) -> ClientResult<T> {
        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {} data", what)))
    }
}

#[derive(Serialize)]
struct StatusBody {
    status: OrderStatus,
}

#[derive(Serialize)]
struct ChangeTableBody<'a> {
    table_number: &'a TableBinding,
}

#[async_trait]
impl FloorBackend for HttpClient {
    // ========== Tables API ==========

    async fn list_tables(&self) -> ClientResult<Vec<DiningTable>> {
        Self::data(self.get("api/tables").await?, "tables")
    }

    async fn get_table(&self, id: &str) -> ClientResult<DiningTable> {
        Self::data(self.get(&format!("api/tables/{}", id)).await?, "table")
    }

    async fn create_table(&self, table: &DiningTable) -> ClientResult<DiningTable> {
        Self::data(self.post("api/tables", table).await?, "table")
    }

    async fn update_table(&self, id: &str, update: &DiningTableUpdate) -> ClientResult<DiningTable> {
        Self::data(self.put(&format!("api/tables/{}", id), update).await?, "table")
    }

    async fn delete_table(&self, id: &str) -> ClientResult<()> {
        self.delete::<serde_json::Value>(&format!("api/tables/{}", id))
            .await?;
        Ok(())
    }

    // ========== Orders API ==========

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        Self::data(self.get("api/orders").await?, "orders")
    }

    async fn get_order(&self, id: &str) -> ClientResult<Order> {
        Self::data(self.get(&format!("api/orders/{}", id)).await?, "order")
    }

    async fn create_order(&self, order: &Order) -> ClientResult<Order> {
        Self::data(self.post("api/orders", order).await?, "order")
    }

    async fn update_order(&self, order: &Order) -> ClientResult<Order> {
        Self::data(self.put(&format!("api/orders/{}", order.id), order).await?, "order")
    }

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> ClientResult<Order> {
        let body = StatusBody { status };
        Self::data(self.put(&format!("api/orders/{}/status", id), &body).await?, "order")
    }

    async fn merge_orders(&self, source_id: &str, target_id: &str) -> ClientResult<Order> {
        let path = format!("api/orders/{}/merge/{}", source_id, target_id);
        Self::data(self.post_empty(&path).await?, "order")
    }

    async fn change_table(&self, order_id: &str, table: &TableBinding) -> ClientResult<Order> {
        let body = ChangeTableBody {
            table_number: table,
        };
        Self::data(self.put(&format!("api/orders/{}/table", order_id), &body).await?, "order")
    }

    // ========== Order items API ==========

    async fn list_items(&self, order_id: &str) -> ClientResult<Vec<OrderItem>> {
        Self::data(self.get(&format!("api/orders/{}/items", order_id)).await?, "items")
    }

    async fn create_item(&self, order_id: &str, item: &OrderItem) -> ClientResult<OrderItem> {
        Self::data(self.post(&format!("api/orders/{}/items", order_id), item).await?, "item")
    }

    // ========== Table links API ==========

    async fn create_link(&self, link: &LinkCreate) -> ClientResult<LinkGroup> {
        Self::data(self.post("api/table-links", link).await?, "link")
    }

    async fn get_link(&self, table_number: &str) -> ClientResult<Option<LinkGroup>> {
        let envelope: ApiResponse<LinkGroup> = self
            .get(&format!("api/table-links/table/{}", table_number))
            .await?;
        Ok(envelope.data)
    }

    async fn pay_linked(&self, table_number: &str) -> ClientResult<LinkedPayment> {
        let path = format!("api/table-links/table/{}/pay", table_number);
        Self::data(self.post_empty(&path).await?, "payment")
    }

    async fn unlink(&self, unlink: &LinkRemove) -> ClientResult<Option<LinkGroup>> {
        let envelope: ApiResponse<LinkGroup> = self.post("api/table-links/unlink", unlink).await?;
        Ok(envelope.data)
    }
}
