use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SchemaRegistryError;

/// ローカルで起動した Schema Registry が待ち受けるデフォルトのアドレス。
pub const DEFAULT_URL: &str = "http://localhost:8081";

const ERR_HOST_EMPTY: &str = "host can not be empty";
const ERR_HOST_CONTAINS_SLASH: &str = "host can not contain a /";
const ERR_HOST_CONTAINS_QUESTION_MARK: &str = "host can not contain a ?";

/// Schema Registry 接続設定。
///
/// YAML からの読み込みに対応する。
///
/// ```yaml
/// host: schema-registry.k1s0-system.svc.cluster.local
/// port: 8081
/// use_tls: false
/// timeout_secs: 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistryConfig {
    /// Schema Registry のホスト名。スキームやパスは含めない。
    pub host: String,

    /// ポート番号。0 の場合はスキームのデフォルトポートを使用する。
    #[serde(default)]
    pub port: u16,

    /// HTTPS で接続するかどうか。
    #[serde(default)]
    pub use_tls: bool,

    /// HTTP タイムアウト（秒）。
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SchemaRegistryConfig {
    fn default() -> Self {
        Self::new("localhost").port(8081)
    }
}

impl SchemaRegistryConfig {
    /// 指定したホストで設定を作成する。
    ///
    /// ポートはスキームのデフォルト、TLS は無効、タイムアウトは 30 秒。
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 0,
            use_tls: false,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn use_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 正規化済みのベース URL を返す（末尾スラッシュなし）。
    pub fn base_url(&self) -> Result<String, SchemaRegistryError> {
        let base_url = format_base_url(&self.host, self.port, self.use_tls)?;
        url::Url::parse(&base_url)?;
        Ok(base_url)
    }

    /// YAML 文字列から設定を読み込む。
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaRegistryError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// YAML ファイルから設定を読み込む。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaRegistryError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SchemaRegistryError::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml_str(&raw)
    }
}

/// host・port・TLS フラグから `scheme://host[:port]` 形式のベース URL を組み立てる。
///
/// - 443 番ポートまたは TLS 有効時は https を使用する
/// - ポート 0 は TLS 有効時に 443、無効時はポート表記なしとする
/// - ポート 80 はポート表記を省略する
pub fn format_base_url(host: &str, port: u16, use_tls: bool) -> Result<String, SchemaRegistryError> {
    if host.is_empty() {
        return Err(SchemaRegistryError::InvalidHost(ERR_HOST_EMPTY.to_string()));
    }
    if host.contains('/') {
        return Err(SchemaRegistryError::InvalidHost(
            ERR_HOST_CONTAINS_SLASH.to_string(),
        ));
    }
    if host.contains('?') {
        return Err(SchemaRegistryError::InvalidHost(
            ERR_HOST_CONTAINS_QUESTION_MARK.to_string(),
        ));
    }

    let scheme = if use_tls || port == 443 { "https" } else { "http" };

    let base_url = match (port, use_tls) {
        (0, true) => format!("{scheme}://{host}:443"),
        (0 | 80, _) => format!("{scheme}://{host}"),
        _ => format!("{scheme}://{host}:{port}"),
    };
    Ok(base_url)
}
