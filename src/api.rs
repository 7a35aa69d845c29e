use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::debug;

pub const DEMO_TOKEN: &str = "Bearer demo-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    // nothing is removed through the UI yet
    #[cfg(test)]
    Delete,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            #[cfg(test)]
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub status_text: &'static str,
}

/// Fake REST client: logs the call, waits a fixed delay, always answers 200.
/// The services do the real work against the local store.
#[derive(Debug, Clone)]
pub struct MockApi {
    delay: Duration,
    authorization: Arc<RwLock<Option<String>>>,
}

impl MockApi {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            authorization: Arc::new(RwLock::new(None)),
        }
    }

    pub fn set_authorization(&self, token: Option<&str>) {
        if let Ok(mut auth) = self.authorization.write() {
            *auth = token.map(str::to_string);
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorization
            .read()
            .map(|auth| auth.is_some())
            .unwrap_or(false)
    }

    pub async fn get(&self, path: &str) -> MockResponse {
        self.request(Method::Get, path).await
    }

    pub async fn post(&self, path: &str) -> MockResponse {
        self.request(Method::Post, path).await
    }

    pub async fn patch(&self, path: &str) -> MockResponse {
        self.request(Method::Patch, path).await
    }

    #[cfg(test)]
    pub async fn delete(&self, path: &str) -> MockResponse {
        self.request(Method::Delete, path).await
    }

    async fn request(&self, method: Method, path: &str) -> MockResponse {
        debug!(
            method = method.as_str(),
            path,
            authorized = self.is_authorized(),
            "mock api call"
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        MockResponse {
            status: 200,
            status_text: "OK",
        }
    }
}
