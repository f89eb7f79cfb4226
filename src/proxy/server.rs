use super::handler::{ProxyHandler, ProxyRequest, ProxyResponse, CORS_HEADERS};
use crate::{Error, Result};
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Paths the proxy answers on. The second keeps old serverless deployments working.
const ROUTES: [&str; 2] = ["/analyze", "/.netlify/functions/analyze"];

/// HTTP listener in front of a [`ProxyHandler`].
///
/// Connections are accepted on a blocking thread; each request is handled
/// as a task on the tokio runtime that called [`ProxyServer::run`].
pub struct ProxyServer {
    server: Arc<Server>,
}

/// Stops a running [`ProxyServer`].
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<Server>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.server.unblock();
    }
}

impl ProxyServer {
    pub fn bind(addr: &str) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| Error::Server(format!("Failed to bind {}: {}", addr, e)))?;
        Ok(Self {
            server: Arc::new(server),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
        }
    }

    /// Serve until the shutdown handle is triggered.
    pub async fn run(self, handler: Arc<ProxyHandler>) -> Result<()> {
        let runtime = tokio::runtime::Handle::current();
        if let Some(addr) = self.local_addr() {
            tracing::info!("Proxy listening on http://{}", addr);
        }

        tokio::task::spawn_blocking(move || {
            for mut request in self.server.incoming_requests() {
                let method = request.method().to_string();
                let url = request.url().to_string();

                let body = read_body(request.as_reader())
                    .map_err(|e| {
                        tracing::warn!("Failed to read request body for {} {}: {}", method, url, e);
                        e
                    })
                    .ok();

                let handler = Arc::clone(&handler);
                runtime.spawn(async move {
                    let response = match body {
                        _ if !is_proxy_route(&url) => ProxyResponse::not_found(),
                        Some(body) => {
                            handler
                                .handle(ProxyRequest {
                                    method: method.clone(),
                                    body,
                                })
                                .await
                        }
                        None => ProxyResponse::error(400, "Failed to read request body"),
                    };
                    tracing::info!("{} {} -> {}", method, url, response.status);

                    let responded =
                        tokio::task::spawn_blocking(move || respond(request, response)).await;
                    match responded {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => tracing::warn!("Failed to write response: {}", e),
                        Err(e) => tracing::error!("Response task join error: {}", e),
                    }
                });
            }
            tracing::info!("Proxy stopped");
        })
        .await
        .map_err(|e| Error::Invariant(format!("Proxy server task join error: {}", e)))
    }
}

fn is_proxy_route(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or_default();
    let path = path.strip_suffix('/').unwrap_or(path);
    ROUTES.contains(&path)
}

fn read_body(reader: &mut dyn Read) -> std::io::Result<String> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn respond(request: Request, response: ProxyResponse) -> std::io::Result<()> {
    let ProxyResponse { status, body } = response;
    let mut reply = Response::from_data(body.into_bytes()).with_status_code(StatusCode(status));
    for (name, value) in CORS_HEADERS {
        if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            reply.add_header(header);
        }
    }
    request.respond(reply)
}
