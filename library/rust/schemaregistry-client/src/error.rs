use serde::{Deserialize, Serialize};

/// サブジェクトが存在しないことを示す Schema Registry のアプリケーションエラーコード。
pub const SUBJECT_NOT_FOUND_CODE: i32 = 40401;
/// バージョンが存在しないことを示す Schema Registry のアプリケーションエラーコード。
pub const VERSION_NOT_FOUND_CODE: i32 = 40402;
/// スキーマが存在しないことを示す Schema Registry のアプリケーションエラーコード。
pub const SCHEMA_NOT_FOUND_CODE: i32 = 40403;

/// Schema Registry が返す構造化エラーペイロード。
///
/// `error_code` は HTTP ステータスとは別のアプリケーションコード（例: 40401）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("({method}: {uri}) failed with error code {error_code}: {message}")]
pub struct ResourceError {
    /// アプリケーションエラーコード。
    #[serde(default)]
    pub error_code: i32,
    /// リクエストの HTTP メソッド。
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    /// リクエスト先 URI（エスケープ前の表記）。
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,
    /// サーバーが返したエラーメッセージ。
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// SchemaRegistryError は Schema Registry 操作に関するエラーを表す。
#[derive(Debug, thiserror::Error)]
pub enum SchemaRegistryError {
    /// HTTP リクエストが失敗した。
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Schema Registry が構造化エラーを返した。
    #[error("client: {0}")]
    Resource(#[from] ResourceError),

    /// JSON 以外のボディで非 2xx ステータスが返された。
    #[error("client: ({method}: {uri}) failed with status {status}{}", format_body(.body))]
    UnexpectedStatus {
        /// HTTP ステータスコード。
        status: u16,
        /// リクエストの HTTP メソッド。
        method: String,
        /// リクエスト先 URI。
        uri: String,
        /// 切り詰め済みのレスポンスボディ。
        body: String,
    },

    /// 必須パラメータが指定されていない。
    #[error("client: {0} is required")]
    Required(&'static str),

    /// バージョン指定が不正。
    #[error("client: invalid version: {0}")]
    InvalidVersion(String),

    /// パスセグメントとして送信できない値（`.` / `..`）が指定された。
    #[error("client: invalid path segment: {0:?}")]
    InvalidPathSegment(String),

    /// ホスト名が不正。
    #[error("client: {0}")]
    InvalidHost(String),

    /// ベース URL のパースに失敗した。
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON シリアライズ／デシリアライズに失敗した。
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// レスポンスボディの読み出し（gzip 展開を含む）に失敗した。
    #[error("client: failed to read response body: {0}")]
    Decompression(#[source] std::io::Error),

    /// 設定ファイルの読み込みに失敗した。
    #[error("Config error: {0}")]
    Config(String),

    /// Schema Registry サービスが利用不可。
    #[error("Schema Registry unavailable: {0}")]
    Unavailable(String),
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!("\n{body}")
    }
}

impl SchemaRegistryError {
    /// 構造化エラーであればその内容を返す。
    pub fn resource_error(&self) -> Option<&ResourceError> {
        match self {
            SchemaRegistryError::Resource(err) => Some(err),
            _ => None,
        }
    }

    /// サブジェクト未登録（40401）のエラーかどうかを判定する。
    pub fn is_subject_not_found(&self) -> bool {
        self.has_code(SUBJECT_NOT_FOUND_CODE)
    }

    /// スキーマ未登録（40403）のエラーかどうかを判定する。
    pub fn is_schema_not_found(&self) -> bool {
        self.has_code(SCHEMA_NOT_FOUND_CODE)
    }

    /// バージョン未登録（40402）のエラーかどうかを判定する。
    pub fn is_version_not_found(&self) -> bool {
        self.has_code(VERSION_NOT_FOUND_CODE)
    }

    /// 404 系のエラーかどうかを判定する。
    ///
    /// HTTP 404 と 404xx 形式のアプリケーションコードの両方を対象とする。
    pub fn is_not_found(&self) -> bool {
        match self {
            SchemaRegistryError::Resource(err) => {
                err.error_code == 404 || err.error_code / 100 == 404
            }
            SchemaRegistryError::UnexpectedStatus { status, .. } => *status == 404,
            _ => false,
        }
    }

    fn has_code(&self, code: i32) -> bool {
        self.resource_error()
            .is_some_and(|err| err.error_code == code)
    }
}

impl From<serde_yaml::Error> for SchemaRegistryError {
    fn from(err: serde_yaml::Error) -> Self {
        SchemaRegistryError::Config(err.to_string())
    }
}
