//! FortiOS REST API client
//!
//! Talks to `/api/v2/cmdb/<path>[/<mkey>]` with Bearer token authentication.
//! The vdom of a request is the per-call `vdomparam` when set, otherwise the
//! client default.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::{ApiResponse, CmdbPath, SystemStatus};
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode, Url};
use serde_json::{Map, Value};
use std::time::Duration;

const CMDB_PREFIX: [&str; 3] = ["api", "v2", "cmdb"];
const SYSTEM_STATUS: [&str; 5] = ["api", "v2", "monitor", "system", "status"];

/// FortiOS API client
#[derive(Clone)]
pub struct FortiClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    vdom: Option<String>,
    retries: u32,
    retry_delay: Duration,
}

impl FortiClient {
    /// Build a client. Reads the CA bundle when one is configured.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.hostname.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "hostname is required".to_string(),
            ));
        }
        if config.token.is_empty() {
            return Err(ClientError::InvalidConfig("token is required".to_string()));
        }

        let base_url = Url::parse(&config.base_url())
            .map_err(|e| ClientError::InvalidConfig(format!("invalid hostname: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidConfig(format!(
                "invalid hostname: {}",
                config.hostname
            )));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure);

        if let Some(path) = &config.cabundle_file {
            let pem = std::fs::read(path)?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
            tracing::debug!("Loaded CA bundle: {}", path.display());
        }

        if let Some(proxy) = config.http_proxy.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            token: config.token,
            vdom: config.vdom.filter(|v| !v.is_empty()),
            retries: config.retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Same client with a different retry count
    pub fn with_retries(&self, retries: u32) -> Self {
        Self {
            retries,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// vdom a call with this `vdomparam` is sent to
    pub fn effective_vdom<'a>(&'a self, vdomparam: &'a str) -> Option<&'a str> {
        if vdomparam.is_empty() {
            self.vdom.as_deref()
        } else {
            Some(vdomparam)
        }
    }

    /// POST a new object into a table
    pub async fn create(
        &self,
        path: &CmdbPath,
        obj: &Map<String, Value>,
        vdomparam: &str,
    ) -> Result<ApiResponse> {
        let url = self.cmdb_url(path, "", vdomparam, &[])?;
        let body = Value::Object(obj.clone());
        let (status, json) = self.send(Method::POST, url, Some(&body)).await?;
        check_response(status, json, path.as_str())
    }

    /// GET one object. `None` when the device reports it missing.
    ///
    /// An empty `mkey` reads a singleton table.
    pub async fn read(
        &self,
        path: &CmdbPath,
        mkey: &str,
        vdomparam: &str,
    ) -> Result<Option<Map<String, Value>>> {
        let url = self.cmdb_url(path, mkey, vdomparam, &[])?;
        let (status, json) = self.send(Method::GET, url, None).await?;

        match check_response(status, json, &object_label(path, mkey)) {
            Ok(response) => Ok(response.result_objects().into_iter().next()),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// PUT an existing object. An empty `mkey` updates a singleton table.
    pub async fn update(
        &self,
        path: &CmdbPath,
        obj: &Map<String, Value>,
        mkey: &str,
        vdomparam: &str,
    ) -> Result<ApiResponse> {
        let url = self.cmdb_url(path, mkey, vdomparam, &[])?;
        let body = Value::Object(obj.clone());
        let (status, json) = self.send(Method::PUT, url, Some(&body)).await?;
        check_response(status, json, &object_label(path, mkey))
    }

    /// DELETE one object. A missing object is `ClientError::NotFound`.
    pub async fn delete(&self, path: &CmdbPath, mkey: &str, vdomparam: &str) -> Result<()> {
        let url = self.cmdb_url(path, mkey, vdomparam, &[])?;
        let (status, json) = self.send(Method::DELETE, url, None).await?;
        check_response(status, json, &object_label(path, mkey)).map(|_| ())
    }

    /// GET every object of a table, optionally with a FortiOS `filter` expression
    pub async fn list(
        &self,
        path: &CmdbPath,
        filter: Option<&str>,
        vdomparam: &str,
    ) -> Result<Vec<Map<String, Value>>> {
        let query: Vec<(&str, &str)> = filter
            .filter(|f| !f.is_empty())
            .map(|f| vec![("filter", f)])
            .unwrap_or_default();
        let url = self.cmdb_url(path, "", vdomparam, &query)?;
        let (status, json) = self.send(Method::GET, url, None).await?;

        match check_response(status, json, path.as_str()) {
            Ok(response) => Ok(response.result_objects()),
            Err(ClientError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Device identity, used to verify the token
    pub async fn system_status(&self) -> Result<SystemStatus> {
        let mut url = self.base_url.clone();
        push_segments(&mut url, &SYSTEM_STATUS)?;
        let (status, json) = self.send(Method::GET, url, None).await?;
        let response = check_response(status, json, "monitor/system/status")?;
        Ok(SystemStatus::from_response(&response))
    }

    fn cmdb_url(
        &self,
        path: &CmdbPath,
        mkey: &str,
        vdomparam: &str,
        extra_query: &[(&str, &str)],
    ) -> Result<Url> {
        let mut segments: Vec<&str> = Vec::new();
        for segment in CMDB_PREFIX {
            segments.push(segment);
        }
        for segment in path.segments() {
            segments.push(segment);
        }
        if !mkey.is_empty() {
            segments.push(mkey);
        }

        let mut url = self.base_url.clone();
        push_segments(&mut url, &segments)?;

        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(vdom) = self.effective_vdom(vdomparam) {
            query.push(("vdom", vdom));
        }
        query.extend_from_slice(extra_query);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut attempt = 0;
        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&self.token)
                .header(ACCEPT, "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::debug!("{} {}", method, url.path());

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await?;
                    tracing::trace!("{} {} -> {}: {}", method, url.path(), status, text);
                    return Ok((status, parse_body(status, &text)?));
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        "{} {} failed ({}), retry {}/{}",
                        method,
                        url.path(),
                        e,
                        attempt,
                        self.retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl std::fmt::Debug for FortiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FortiClient")
            .field("base_url", &self.base_url.as_str())
            .field("vdom", &self.vdom)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

fn push_segments(url: &mut Url, segments: &[&str]) -> Result<()> {
    let mut path = url
        .path_segments_mut()
        .map_err(|_| ClientError::InvalidConfig("hostname is not a valid base URL".to_string()))?;
    path.pop_if_empty().extend(segments);
    Ok(())
}

fn object_label(path: &CmdbPath, mkey: &str) -> String {
    if mkey.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", path, mkey)
    }
}

fn parse_body(status: StatusCode, text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(text) {
        Ok(json) => Ok(json),
        Err(_) if !status.is_success() => Ok(Value::Null),
        Err(e) => Err(ClientError::InvalidResponse(format!(
            "response is not JSON: {}",
            e
        ))),
    }
}

/// Map HTTP status and envelope to a result
fn check_response(status: StatusCode, json: Value, object: &str) -> Result<ApiResponse> {
    let response: ApiResponse = match json {
        Value::Null => ApiResponse::default(),
        other => serde_json::from_value(other)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?,
    };

    let http_status = response.http_status.unwrap_or(status.as_u16());

    if status == StatusCode::NOT_FOUND || http_status == 404 {
        return Err(ClientError::NotFound(object.to_string()));
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Unauthorized(status.as_u16()));
    }
    if !status.is_success() || response.is_error() {
        let message = response.error_message().unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        return Err(ClientError::Api {
            http_status,
            code: response.error,
            message: format!("{}: {}", object, message),
        });
    }

    Ok(response)
}
