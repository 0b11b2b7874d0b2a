use super::SymbolDirectory;
use crate::errors::ClientError;
use crate::models::{StatusResponse, SymbolRequest, SymbolsResponse, Venue};
use async_trait::async_trait;

pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_symbols(&self, path: &str) -> Result<Vec<String>, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Rejected {
                status: response.status().as_u16(),
            });
        }

        let body = response.json::<SymbolsResponse>().await?;

        // The server reports failures in the body with a 200
        if body.status != "success" {
            return Err(ClientError::UnexpectedData(format!(
                "{path} returned status {:?}: {}",
                body.status,
                body.message.unwrap_or_default()
            )));
        }

        Ok(body.symbols)
    }
}

#[async_trait]
impl SymbolDirectory for HttpDirectory {
    async fn list_symbols(&self) -> Result<Vec<String>, ClientError> {
        self.fetch_symbols("/api/symbols").await
    }

    async fn list_exchange_symbols(&self, venue: Venue) -> Result<Vec<String>, ClientError> {
        self.fetch_symbols(&format!("/api/symbols/{}", venue.path())).await
    }

    async fn set_symbol(&self, symbol: &str) -> Result<(), ClientError> {
        let url = format!("{}/api/symbol", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&SymbolRequest { symbol })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Rejected {
                status: response.status().as_u16(),
            });
        }

        let body = response.json::<StatusResponse>().await?;
        if body.status != "success" {
            return Err(ClientError::UnexpectedData(format!(
                "symbol change to {symbol} refused: {}",
                body.message.unwrap_or_default()
            )));
        }

        tracing::info!("[directory] server switched to {symbol}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn lists_common_and_exchange_symbols() {
        let app = Router::new()
            .route(
                "/api/symbols",
                get(|| async { Json(json!({"status": "success", "symbols": ["BTC/USDT", "ETH/USDT"]})) }),
            )
            .route(
                "/api/symbols/lbank",
                get(|| async { Json(json!({"status": "success", "symbols": ["BTC_USDT"]})) }),
            );
        let dir = HttpDirectory::new(serve(app).await);

        assert_eq!(dir.list_symbols().await.unwrap(), vec!["BTC/USDT", "ETH/USDT"]);
        assert_eq!(dir.list_exchange_symbols(Venue::Lbank).await.unwrap(), vec!["BTC_USDT"]);
        assert!(matches!(
            dir.list_exchange_symbols(Venue::Mx).await,
            Err(ClientError::Rejected { status: 404 })
        ));
    }

    #[tokio::test]
    async fn error_status_in_body_is_a_failure() {
        let app = Router::new().route(
            "/api/symbols",
            get(|| async { Json(json!({"status": "error", "symbols": [], "message": "exchange down"})) }),
        );
        let dir = HttpDirectory::new(serve(app).await);

        assert!(matches!(dir.list_symbols().await, Err(ClientError::UnexpectedData(_))));
    }

    #[tokio::test]
    async fn set_symbol_posts_body() {
        let app = Router::new().route(
            "/api/symbol",
            post(|Json(body): Json<Value>| async move {
                if body["symbol"] == "ETH/USDT" {
                    (StatusCode::OK, Json(json!({"status": "success", "symbol": "ETH/USDT"})))
                } else {
                    (StatusCode::OK, Json(json!({"status": "error", "message": "unknown pair"})))
                }
            }),
        );
        let dir = HttpDirectory::new(serve(app).await);

        assert!(dir.set_symbol("ETH/USDT").await.is_ok());
        assert!(dir.set_symbol("NOPE/USDT").await.is_err());
    }

    #[tokio::test]
    async fn set_symbol_rejects_server_error() {
        let app = Router::new().route(
            "/api/symbol",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let dir = HttpDirectory::new(serve(app).await);

        assert!(matches!(
            dir.set_symbol("ETH/USDT").await,
            Err(ClientError::Rejected { status: 500 })
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_http_error() {
        let dir = HttpDirectory::new("http://127.0.0.1:1");
        assert!(matches!(dir.list_symbols().await, Err(ClientError::Http(_))));
    }
}
