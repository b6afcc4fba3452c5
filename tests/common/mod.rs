//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::routing::get;
use axum::Router;
use simple_rest_server::config::ServerConfig;
use simple_rest_server::http::{AxumBackend, ResourceCatalog};
use simple_rest_server::lifecycle::{BoxError, ContainerSettings, RunningServer, ServerBackend};
use tempfile::TempDir;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Configuration on `port` logging into a fresh temporary directory.
pub fn test_config(port: u32) -> (ServerConfig, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::new(port, Some(dir.path().join("server.log")), false, false).unwrap();
    (config, dir)
}

/// Catalog with a single `hello` group answering `GET /hello`.
pub fn hello_catalog() -> ResourceCatalog {
    ResourceCatalog::new().with_group("hello", Router::new().route("/hello", get(|| async { "hello" })))
}

/// Axum backend bound to the loopback interface only.
pub fn loopback_backend(catalog: ResourceCatalog) -> Arc<AxumBackend> {
    Arc::new(AxumBackend::new(catalog).with_bind_host(LOCALHOST))
}

/// Client without connection pooling so stopped servers are observed immediately.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Backend that counts live servers and can be told to fail on stop.
#[derive(Default)]
pub struct FakeBackend {
    pub live: Arc<AtomicUsize>,
    pub stop_calls: Arc<AtomicUsize>,
    pub fail_stop: bool,
}

impl FakeBackend {
    pub fn failing_stop() -> Self {
        Self {
            fail_stop: true,
            ..Default::default()
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

struct FakeServer {
    live: Arc<AtomicUsize>,
    stop_calls: Arc<AtomicUsize>,
    fail_stop: bool,
}

#[async_trait]
impl ServerBackend for FakeBackend {
    async fn start(&self, _settings: &ContainerSettings) -> Result<Box<dyn RunningServer>, BoxError> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeServer {
            live: self.live.clone(),
            stop_calls: self.stop_calls.clone(),
            fail_stop: self.fail_stop,
        }))
    }
}

#[async_trait]
impl RunningServer for FakeServer {
    async fn stop(&mut self) -> Result<(), BoxError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_sub(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err("listener refused to close".into());
        }
        Ok(())
    }
}
