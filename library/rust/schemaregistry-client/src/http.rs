use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ResourceError, SchemaRegistryError};
use crate::transport::Transport;

/// リクエストボディの Content-Type。
pub const CONTENT_TYPE_SCHEMA_JSON: &str = "application/vnd.schemaregistry.v1+json";

/// Accept ヘッダー。バージョン付きメディアタイプを優先する。
pub const ACCEPT_MEDIA_TYPES: &str =
    "application/vnd.schemaregistry.v1+json, application/vnd.schemaregistry+json, application/json";

const GZIP_ENCODING: &str = "gzip";

/// エラーに含めるレスポンスボディの最大バイト数。
pub const MAX_ERROR_BODY_LEN: usize = 1024;

/// すべての API 呼び出しが通る HTTP パイプライン。
///
/// パス組み立て、ヘッダー付与、トランスポート実行、非 2xx のエラー変換を担う。
pub(crate) struct RequestPipeline {
    base_url: String,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl RequestPipeline {
    pub(crate) fn new(base_url: String, transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self {
            base_url,
            transport,
            timeout,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// パスセグメントからリクエスト URL とエラー表示用 URI を組み立てる。
    ///
    /// セグメントはパーセントエンコードされる。表示用 URI はエンコード前の表記。
    /// `.` と `..` は URL 正規化で消えて別のエンドポイントを指すため拒否する。
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<(url::Url, String), SchemaRegistryError> {
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(SchemaRegistryError::InvalidPathSegment((*dot).to_string()));
        }
        let mut url = url::Url::parse(&self.base_url)?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| SchemaRegistryError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
                .pop_if_empty()
                .extend(segments);
        }
        let display = format!("{}/{}", self.base_url, segments.join("/"));
        Ok((url, display))
    }

    /// リクエストを送信し、2xx のレスポンスを返す。
    ///
    /// `body` が指定された場合は Schema Registry の JSON メディアタイプで送信する。
    pub(crate) async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response, SchemaRegistryError> {
        let (url, uri) = self.endpoint(segments)?;

        let mut request = reqwest::Request::new(method.clone(), url);
        let headers = request.headers_mut();
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(GZIP_ENCODING));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_MEDIA_TYPES));
        if let Some(body) = body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_SCHEMA_JSON));
            *request.body_mut() = Some(reqwest::Body::from(body));
        }
        *request.timeout_mut() = Some(self.timeout);

        debug!("Sending request: {} {}", method, uri);

        let response = self.transport.send(request).await?;
        check_response(response, &method, &uri).await
    }

    /// リクエストを送信し、レスポンスボディを JSON としてデコードする。
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<Vec<u8>>,
    ) -> Result<T, SchemaRegistryError> {
        let response = self.send(method, segments, body).await?;
        read_json(response).await
    }
}

/// リクエストボディを JSON にエンコードする。
pub(crate) fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>, SchemaRegistryError> {
    Ok(serde_json::to_vec(body)?)
}

/// 非 2xx のレスポンスをエラーに変換する。
///
/// - `text/html` → ボディを読まずに `UnexpectedStatus`
/// - `json` → `ResourceError` としてデコード（失敗時は汎用エラーへ）
/// - その他 → 切り詰めたボディを含む `UnexpectedStatus`
async fn check_response(
    response: reqwest::Response,
    method: &Method,
    uri: &str,
) -> Result<reqwest::Response, SchemaRegistryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.contains("text/html") {
        warn!("Schema Registry returned {} with html body: {} {}", status, method, uri);
        return Err(SchemaRegistryError::UnexpectedStatus {
            status: status.as_u16(),
            method: method.to_string(),
            uri: uri.to_string(),
            body: String::new(),
        });
    }

    let body = match read_body_bytes(response).await {
        Ok(bytes) => bytes,
        Err(e) => format!("unable to read body: {e}").into_bytes(),
    };

    if content_type.contains("json") {
        if let Ok(mut err) = serde_json::from_slice::<ResourceError>(&body) {
            if err.error_code == 0 {
                err.error_code = i32::from(status.as_u16());
            }
            if err.method.is_empty() {
                err.method = method.to_string();
            }
            if err.uri.is_empty() {
                err.uri = uri.to_string();
            }
            warn!(
                "Schema Registry returned error {}: code={}, message={}",
                status, err.error_code, err.message
            );
            return Err(SchemaRegistryError::Resource(err));
        }
    }

    let text = String::from_utf8_lossy(&body);
    warn!("Schema Registry returned error {}: {} {}", status, method, uri);
    Err(SchemaRegistryError::UnexpectedStatus {
        status: status.as_u16(),
        method: method.to_string(),
        uri: uri.to_string(),
        body: truncate_body(&text),
    })
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

/// レスポンスボディのリーダー。
///
/// `Content-Encoding: gzip` の場合は展開済みのバイト列を返す。
pub(crate) enum BodyReader {
    Plain(Cursor<Vec<u8>>),
    Gzip(GzDecoder<Cursor<Vec<u8>>>),
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            BodyReader::Plain(r) => r.read(buf),
            BodyReader::Gzip(r) => r.read(buf),
        }
    }
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(GZIP_ENCODING))
}

/// レスポンスボディを読み出し、必要に応じて gzip 展開するリーダーを返す。
pub(crate) async fn read_body(response: reqwest::Response) -> Result<BodyReader, SchemaRegistryError> {
    let gzip = is_gzip(response.headers());
    let bytes = response.bytes().await?.to_vec();
    if gzip {
        Ok(BodyReader::Gzip(GzDecoder::new(Cursor::new(bytes))))
    } else {
        Ok(BodyReader::Plain(Cursor::new(bytes)))
    }
}

async fn read_body_bytes(response: reqwest::Response) -> Result<Vec<u8>, SchemaRegistryError> {
    let mut reader = read_body(response).await?;
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(SchemaRegistryError::Decompression)?;
    Ok(buf)
}

/// レスポンスボディを JSON としてデコードする。
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SchemaRegistryError> {
    let body = read_body_bytes(response).await?;
    Ok(serde_json::from_slice(&body)?)
}
