use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaRegistryError;

/// サブジェクトに登録されたスキーマを表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// スキーマ定義文字列。
    pub schema: String,
    /// スキーマが登録されているサブジェクト名。
    pub subject: String,
    /// サブジェクト内のバージョン番号。
    pub version: i32,
    /// Schema Registry が割り当てたグローバルスキーマ ID。
    #[serde(default)]
    pub id: i32,
    /// スキーマのフォーマット種別。省略時は AVRO。
    #[serde(rename = "schemaType", default)]
    pub schema_type: SchemaType,
}

/// スキーマのフォーマット種別。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SchemaType {
    /// Apache Avro 形式。
    #[default]
    Avro,
    /// JSON Schema 形式。
    Json,
    /// Protocol Buffers 形式。
    Protobuf,
}

impl SchemaType {
    /// Schema Registry API で使用する文字列表現を返す。
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Avro => "AVRO",
            SchemaType::Json => "JSON",
            SchemaType::Protobuf => "PROTOBUF",
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 大文字小文字を区別しない。不明な文字列の場合は Avro を返す。
impl From<String> for SchemaType {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "PROTOBUF" => SchemaType::Protobuf,
            "JSON" => SchemaType::Json,
            _ => SchemaType::Avro,
        }
    }
}

impl From<SchemaType> for String {
    fn from(t: SchemaType) -> Self {
        t.as_str().to_string()
    }
}

/// パスに埋め込むスキーマバージョン指定。
///
/// 有効な値は `latest` または 1 以上 2^31-1 以下の整数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// サブジェクトに最後に登録されたバージョン。
    Latest,
    /// 特定のバージョン番号。
    Number(i32),
}

/// `latest` を表すバージョン文字列。
pub const SCHEMA_LATEST_VERSION: &str = "latest";

impl SchemaVersion {
    pub(crate) fn validate(self) -> Result<Self, SchemaRegistryError> {
        match self {
            SchemaVersion::Number(n) if n <= 0 => Err(SchemaRegistryError::InvalidVersion(
                format!("{n} is not a valid version [version > 0 && version <= 2^31-1]"),
            )),
            v => Ok(v),
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaVersion::Latest => f.write_str(SCHEMA_LATEST_VERSION),
            SchemaVersion::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<i32> for SchemaVersion {
    fn from(n: i32) -> Self {
        SchemaVersion::Number(n)
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaRegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == SCHEMA_LATEST_VERSION {
            return Ok(SchemaVersion::Latest);
        }
        let invalid = || {
            SchemaRegistryError::InvalidVersion(format!(
                "{s} is not a valid version [version == \"latest\" or 1..=2^31-1]"
            ))
        };
        // 符号付き表記（"+5" など）は受け付けない
        if !s.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let n: i32 = s.parse().map_err(|_| invalid())?;
        SchemaVersion::Number(n).validate()
    }
}

/// スキーマ文字列が JSON として妥当であることを検証し、JSON 値として返す。
pub fn json_avro_schema(avro_schema: &str) -> Result<serde_json::Value, SchemaRegistryError> {
    Ok(serde_json::from_str(avro_schema)?)
}

/// スキーマ登録・登録確認・互換性チェックで送信するペイロード。
///
/// AVRO の場合 `schemaType` は省略する（レジストリ側のデフォルト）。
#[derive(Debug, Serialize)]
pub(crate) struct SchemaRequest<'a> {
    pub schema: &'a str,
    #[serde(rename = "schemaType", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<&'static str>,
}

impl<'a> SchemaRequest<'a> {
    pub(crate) fn new(schema: &'a str, schema_type: SchemaType) -> Self {
        let schema_type = match schema_type {
            SchemaType::Avro => None,
            other => Some(other.as_str()),
        };
        Self {
            schema,
            schema_type,
        }
    }
}

/// `/schemas/ids/{id}` のレスポンス。
#[derive(Debug, Deserialize)]
pub(crate) struct SchemaOnlyResponse {
    pub schema: String,
}

/// スキーマ登録のレスポンス。
#[derive(Debug, Deserialize)]
pub(crate) struct IdOnlyResponse {
    pub id: i32,
}

/// 互換性チェックのレスポンス。
#[derive(Debug, Deserialize)]
pub(crate) struct IsCompatibleResponse {
    pub is_compatible: bool,
}
