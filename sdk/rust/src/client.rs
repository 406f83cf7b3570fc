use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Caller key for `date` and `seed`, as the gateway computes it.
pub fn derive_key(date: NaiveDate, seed: &str) -> String {
    let input = format!("{}{}", date.format("%Y-%m-%d"), seed);
    URL_SAFE_NO_PAD.encode(crc32fast::hash(input.as_bytes()).to_le_bytes())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Pong {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// What the gateway sent back for a forward.
#[derive(Debug)]
pub struct ForwardReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ForwardReply {
    /// Rejection reason when the gateway refused the request.
    pub fn rejection(&self) -> Option<String> {
        if self.status != StatusCode::BAD_REQUEST {
            return None;
        }
        serde_json::from_slice::<ErrorBody>(&self.body)
            .ok()
            .map(|b| b.error)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One forward request, built up before sending.
#[derive(Debug, Clone)]
pub struct ForwardCall {
    method: String,
    url: String,
    secret_headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ForwardCall {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            secret_headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Ask the gateway to set `name` to the secret stored under `key_id`.
    pub fn secret_header(mut self, name: &str, key_id: &str) -> Self {
        self.secret_headers
            .push((name.to_string(), key_id.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

pub struct GatewayClient {
    client: Client,
    gateway_url: String,
    seed: Option<String>,
}

impl GatewayClient {
    pub fn new(gateway_url: &str) -> Self {
        Self {
            client: Client::new(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            seed: None,
        }
    }

    /// Send today's caller key (UTC) with every forward.
    pub fn with_seed(mut self, seed: &str) -> Self {
        self.seed = Some(seed.to_string());
        self
    }

    pub async fn ping(&self) -> Result<Pong, reqwest::Error> {
        self.client
            .get(format!("{}/v1/ping", self.gateway_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Perform a forward through the gateway.
    pub async fn forward(&self, call: ForwardCall) -> Result<ForwardReply, reqwest::Error> {
        let mut req = self
            .client
            .post(format!("{}/v1/forward", self.gateway_url))
            .header("X-Request-Method", call.method)
            .header("X-Request-URL", call.url);

        if let Some(seed) = &self.seed {
            let key = derive_key(chrono::Utc::now().date_naive(), seed);
            req = req.header("X-Request-Key", key);
        }
        for (name, key_id) in call.secret_headers {
            req = req.header(format!("X-Request-Key-{name}"), key_id);
        }

        let resp = req.body(call.body).send().await?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?.to_vec();

        Ok(ForwardReply {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_matches_gateway_derivation() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(derive_key(date, "abc"), "aMngDQ");
        assert_eq!(derive_key(date, "seed3"), "-Mt-Mw");
    }

    #[test]
    fn rejection_reads_error_body() {
        let reply = ForwardReply {
            status: StatusCode::BAD_REQUEST,
            content_type: Some("application/json".to_string()),
            body: br#"{"error":"invalid key"}"#.to_vec(),
        };
        assert_eq!(reply.rejection().as_deref(), Some("invalid key"));

        let ok = ForwardReply {
            status: StatusCode::OK,
            content_type: None,
            body: b"hello".to_vec(),
        };
        assert_eq!(ok.rejection(), None);
        assert_eq!(ok.text(), "hello");
    }
}
