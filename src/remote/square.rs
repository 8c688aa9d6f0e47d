//! Commerce platform REST client.
//!
//! One explicitly constructed client per process, shared through `Arc`. The
//! transport timeout comes from configuration; nothing here retries.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::commerce::{CustomerDetails, CustomerRecord, NewOrder, NewPayment, PaymentRecord, RemoteOrder};
use super::wire::{into_entries, ListCatalogResponse, SearchCatalogResponse};
use super::{CatalogApi, CatalogPage, CommerceApi};
use crate::config::SquareConfig;
use crate::domain::catalog::{types_filter, CatalogObjectType};
use crate::{Result, StorefrontError};

pub struct SquareClient {
    client: Client,
    base_url: String,
    access_token: String,
    api_version: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct OrderEnvelope {
    order: RemoteOrder,
}

#[derive(Deserialize)]
struct OrdersEnvelope {
    #[serde(default)]
    orders: Vec<RemoteOrder>,
}

#[derive(Deserialize)]
struct PaymentEnvelope {
    payment: PaymentRecord,
}

#[derive(Deserialize)]
struct CustomerEnvelope {
    customer: CustomerRecord,
}

#[derive(Deserialize)]
struct CustomersEnvelope {
    #[serde(default)]
    customers: Vec<CustomerRecord>,
}

impl SquareClient {
    pub fn new(config: &SquareConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "Commerce API request");
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .header("Square-Version", &self.api_version)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        Ok(response.json().await?)
    }
}

async fn remote_error(response: Response) -> StorefrontError {
    let status = response.status();
    let text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) if !body.errors.is_empty() => body
            .errors
            .iter()
            .map(|e| match (&e.code, &e.detail) {
                (Some(code), Some(detail)) => format!("{code}: {detail}"),
                (Some(code), None) => code.clone(),
                (None, Some(detail)) => detail.clone(),
                (None, None) => "unspecified".to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => text,
    };
    StorefrontError::Remote { status, message }
}

#[async_trait]
impl CatalogApi for SquareClient {
    async fn list_catalog(
        &self,
        cursor: Option<String>,
        types: &[CatalogObjectType],
    ) -> Result<CatalogPage> {
        let mut query = vec![("types", types_filter(types))];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }
        let response: ListCatalogResponse =
            self.send(self.request(Method::GET, "/v2/catalog/list").query(&query)).await?;
        Ok(CatalogPage {
            entries: into_entries(response.objects),
            related: Vec::new(),
            cursor: response.cursor,
        })
    }

    async fn search_catalog(
        &self,
        cursor: Option<String>,
        types: &[CatalogObjectType],
        include_related: bool,
    ) -> Result<CatalogPage> {
        let body = json!({
            "object_types": types.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            "include_related_objects": include_related,
            "cursor": cursor,
        });
        let response: SearchCatalogResponse =
            self.send(self.request(Method::POST, "/v2/catalog/search").json(&body)).await?;
        Ok(CatalogPage {
            entries: into_entries(response.objects),
            related: into_entries(response.related_objects),
            cursor: response.cursor,
        })
    }
}

#[async_trait]
impl CommerceApi for SquareClient {
    async fn create_order(&self, order: &NewOrder, idempotency_key: &str) -> Result<RemoteOrder> {
        let body = json!({ "idempotency_key": idempotency_key, "order": order });
        let envelope: OrderEnvelope = self.send(self.request(Method::POST, "/v2/orders").json(&body)).await?;
        Ok(envelope.order)
    }

    async fn retrieve_order(&self, order_id: &str) -> Result<Option<RemoteOrder>> {
        let response = self
            .request(Method::GET, &format!("/v2/orders/{order_id}"))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        let envelope: OrderEnvelope = response.json().await?;
        Ok(Some(envelope.order))
    }

    async fn pay_order(
        &self,
        order_id: &str,
        payment_ids: &[String],
        idempotency_key: &str,
    ) -> Result<RemoteOrder> {
        let body = json!({ "idempotency_key": idempotency_key, "payment_ids": payment_ids });
        let envelope: OrderEnvelope = self
            .send(self.request(Method::POST, &format!("/v2/orders/{order_id}/pay")).json(&body))
            .await?;
        Ok(envelope.order)
    }

    async fn search_orders(&self, location_id: &str, customer_id: &str) -> Result<Vec<RemoteOrder>> {
        let body = json!({
            "location_ids": [location_id],
            "query": { "filter": { "customer_filter": { "customer_ids": [customer_id] } } },
        });
        let envelope: OrdersEnvelope =
            self.send(self.request(Method::POST, "/v2/orders/search").json(&body)).await?;
        Ok(envelope.orders)
    }

    async fn create_payment(&self, payment: &NewPayment, idempotency_key: &str) -> Result<PaymentRecord> {
        let mut body = serde_json::to_value(payment)
            .map_err(|e| StorefrontError::Validation(e.to_string()))?;
        body["idempotency_key"] = json!(idempotency_key);
        let envelope: PaymentEnvelope =
            self.send(self.request(Method::POST, "/v2/payments").json(&body)).await?;
        Ok(envelope.payment)
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<CustomerRecord>> {
        let body = json!({
            "query": { "filter": { "email_address": { "exact": email } } },
            "limit": 1,
        });
        let envelope: CustomersEnvelope =
            self.send(self.request(Method::POST, "/v2/customers/search").json(&body)).await?;
        Ok(envelope.customers.into_iter().next())
    }

    async fn create_customer(
        &self,
        customer: &CustomerDetails,
        idempotency_key: &str,
    ) -> Result<CustomerRecord> {
        let mut body = serde_json::to_value(customer)
            .map_err(|e| StorefrontError::Validation(e.to_string()))?;
        body["idempotency_key"] = json!(idempotency_key);
        let envelope: CustomerEnvelope =
            self.send(self.request(Method::POST, "/v2/customers").json(&body)).await?;
        Ok(envelope.customer)
    }

    async fn update_customer(
        &self,
        customer_id: &str,
        customer: &CustomerDetails,
    ) -> Result<CustomerRecord> {
        let envelope: CustomerEnvelope = self
            .send(self.request(Method::PUT, &format!("/v2/customers/{customer_id}")).json(customer))
            .await?;
        Ok(envelope.customer)
    }
}
