use std::time::Duration;

use async_trait::async_trait;

use crate::error::SchemaRegistryError;

/// リクエストを実行する HTTP トランスポート。
///
/// デフォルトは `reqwest::Client`。TLS やプロキシを個別に設定したい場合や
/// テストでレスポンスを差し替える場合は独自実装を
/// [`HttpSchemaRegistryClient::with_transport`](crate::HttpSchemaRegistryClient::with_transport) に渡す。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, SchemaRegistryError>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, SchemaRegistryError> {
        Ok(reqwest::Client::execute(self, request).await?)
    }
}

/// タイムアウトを設定したデフォルトの HTTP クライアントを構築する。
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, SchemaRegistryError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SchemaRegistryError::Unavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(Duration::from_secs(10)).is_ok());
    }

    #[tokio::test]
    async fn test_reqwest_transport_connection_error() {
        let client = build_http_client(Duration::from_secs(1)).unwrap();
        // ポート 1 は通常待ち受けがなく接続が拒否される
        let request = reqwest::Request::new(
            reqwest::Method::GET,
            "http://127.0.0.1:1/subjects".parse().unwrap(),
        );
        let err = client.send(request).await.unwrap_err();
        assert!(matches!(err, SchemaRegistryError::Http(_)));
    }
}
