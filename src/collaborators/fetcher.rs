// Asset download over plain HTTP GET

use super::{AssetFetcher, CollaboratorError};
use async_trait::async_trait;

/// Fetches generated assets; any non-success status is a failure
#[derive(Debug, Clone, Default)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CollaboratorError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Tiny HTTP server: `/missing` answers 404, anything else 200 with `body`
    pub async fn serve_assets(body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let body = body.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&buf);
                    let (status, payload) = if request.starts_with("GET /missing") {
                        ("404 Not Found", b"not found".to_vec())
                    } else {
                        ("200 OK", body)
                    };
                    let head = format!(
                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        payload.len()
                    );
                    socket.write_all(head.as_bytes()).await.ok();
                    socket.write_all(&payload).await.ok();
                    socket.shutdown().await.ok();
                });
            }
        });

        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::serve_assets;
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = serve_assets(b"png bytes".to_vec()).await;
        let bytes = HttpAssetFetcher::default()
            .fetch(&format!("{}/asset.png", base))
            .await
            .unwrap();
        assert_eq!(bytes, b"png bytes");
    }

    #[tokio::test]
    async fn test_not_found_is_status_error() {
        let base = serve_assets(Vec::new()).await;
        let err = HttpAssetFetcher::default()
            .fetch(&format!("{}/missing", base))
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let err = HttpAssetFetcher::default()
            .fetch("http://127.0.0.1:1/asset.png")
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Network(_)));
    }
}
