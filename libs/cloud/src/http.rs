//! HTTP implementation of [`CloudApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

use crate::api::CloudApi;
use crate::error::ApiError;
use crate::models::{
    Collection, Image, IpBlock, Label, Lan, LanProperties, Nic, NicProperties, Server,
    ServerCreate, Volume, VolumeProperties,
};
use crate::registry::Credentials;

/// Depth used for server lookups so that attached volumes are included.
const SERVER_DEPTH: u8 = 3;

/// Depth used for collection listings.
const LIST_DEPTH: u8 = 1;

/// Cloud API client authenticating with basic auth.
pub struct HttpCloudClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpCloudClient {
    /// Create a client against `base_url` (e.g. `https://api.ionos.com/cloudapi/v5`).
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, depth: u8) -> Result<T, ApiError> {
        debug!(path, depth, "GET");
        let response = self
            .request(reqwest::Method::GET, path)
            .query(&[("depth", depth)])
            .send()
            .await?;
        let response = check(path, response).await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        let response = check(path, response).await?;
        decode(response).await
    }

    async fn post_action(&self, path: &str) -> Result<(), ApiError> {
        debug!(path, "POST");
        let response = self.request(reqwest::Method::POST, path).send().await?;
        check(path, response).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!(path, "DELETE");
        let response = self.request(reqwest::Method::DELETE, path).send().await?;
        check(path, response).await?;
        Ok(())
    }
}

async fn check(path: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(path.to_string()));
    }

    error!(status = %status, body = %body, path, "Cloud API request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        message: body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl CloudApi for HttpCloudClient {
    async fn find_image(&self, image_id: &str) -> Result<Image, ApiError> {
        self.get(&format!("/images/{image_id}"), LIST_DEPTH).await
    }

    async fn create_volume(
        &self,
        datacenter_id: &str,
        properties: &VolumeProperties,
    ) -> Result<Volume, ApiError> {
        self.post(
            &format!("/datacenters/{datacenter_id}/volumes"),
            &json!({ "properties": properties }),
        )
        .await
    }

    async fn find_volume(&self, datacenter_id: &str, volume_id: &str) -> Result<Volume, ApiError> {
        self.get(
            &format!("/datacenters/{datacenter_id}/volumes/{volume_id}"),
            LIST_DEPTH,
        )
        .await
    }

    async fn delete_volume(&self, datacenter_id: &str, volume_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/datacenters/{datacenter_id}/volumes/{volume_id}"))
            .await
    }

    async fn add_volume_label(
        &self,
        datacenter_id: &str,
        volume_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Label, ApiError> {
        self.post(
            &format!("/datacenters/{datacenter_id}/volumes/{volume_id}/labels"),
            &Label::new(key, value),
        )
        .await
    }

    async fn create_server(
        &self,
        datacenter_id: &str,
        server: &ServerCreate,
    ) -> Result<Server, ApiError> {
        self.post(&format!("/datacenters/{datacenter_id}/servers"), server)
            .await
    }

    async fn find_server(&self, datacenter_id: &str, server_id: &str) -> Result<Server, ApiError> {
        self.get(
            &format!("/datacenters/{datacenter_id}/servers/{server_id}"),
            SERVER_DEPTH,
        )
        .await
    }

    async fn list_servers(&self, datacenter_id: &str) -> Result<Vec<Server>, ApiError> {
        let servers: Collection<Server> = self
            .get(&format!("/datacenters/{datacenter_id}/servers"), LIST_DEPTH)
            .await?;
        Ok(servers.items)
    }

    async fn delete_server(&self, datacenter_id: &str, server_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/datacenters/{datacenter_id}/servers/{server_id}"))
            .await
    }

    async fn start_server(&self, datacenter_id: &str, server_id: &str) -> Result<(), ApiError> {
        self.post_action(&format!(
            "/datacenters/{datacenter_id}/servers/{server_id}/start"
        ))
        .await
    }

    async fn stop_server(&self, datacenter_id: &str, server_id: &str) -> Result<(), ApiError> {
        self.post_action(&format!(
            "/datacenters/{datacenter_id}/servers/{server_id}/stop"
        ))
        .await
    }

    async fn add_server_label(
        &self,
        datacenter_id: &str,
        server_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Label, ApiError> {
        self.post(
            &format!("/datacenters/{datacenter_id}/servers/{server_id}/labels"),
            &Label::new(key, value),
        )
        .await
    }

    async fn list_server_labels(
        &self,
        datacenter_id: &str,
        server_id: &str,
    ) -> Result<Vec<Label>, ApiError> {
        let labels: Collection<Label> = self
            .get(
                &format!("/datacenters/{datacenter_id}/servers/{server_id}/labels"),
                LIST_DEPTH,
            )
            .await?;
        Ok(labels.items)
    }

    async fn create_nic(
        &self,
        datacenter_id: &str,
        server_id: &str,
        properties: &NicProperties,
    ) -> Result<Nic, ApiError> {
        self.post(
            &format!("/datacenters/{datacenter_id}/servers/{server_id}/nics"),
            &json!({ "properties": properties }),
        )
        .await
    }

    async fn find_nic(
        &self,
        datacenter_id: &str,
        server_id: &str,
        nic_id: &str,
    ) -> Result<Nic, ApiError> {
        self.get(
            &format!("/datacenters/{datacenter_id}/servers/{server_id}/nics/{nic_id}"),
            LIST_DEPTH,
        )
        .await
    }

    async fn find_ip_block(&self, ip_block_id: &str) -> Result<IpBlock, ApiError> {
        self.get(&format!("/ipblocks/{ip_block_id}"), LIST_DEPTH)
            .await
    }

    async fn create_lan(
        &self,
        datacenter_id: &str,
        properties: &LanProperties,
    ) -> Result<Lan, ApiError> {
        self.post(
            &format!("/datacenters/{datacenter_id}/lans"),
            &json!({ "properties": properties }),
        )
        .await
    }

    async fn list_lans(&self, datacenter_id: &str) -> Result<Vec<Lan>, ApiError> {
        let lans: Collection<Lan> = self
            .get(&format!("/datacenters/{datacenter_id}/lans"), LIST_DEPTH)
            .await?;
        Ok(lans.items)
    }

    async fn delete_lan(&self, datacenter_id: &str, lan_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/datacenters/{datacenter_id}/lans/{lan_id}"))
            .await
    }
}
