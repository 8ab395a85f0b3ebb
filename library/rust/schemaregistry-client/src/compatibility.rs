use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaRegistryError;

/// スキーマの互換性レベル。
///
/// Confluent Schema Registry がサポートする互換性レベルに対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityLevel {
    /// 後方互換性: 新しいスキーマで古いデータを読める。
    Backward,
    /// 推移的後方互換性: すべての過去バージョンと後方互換。
    BackwardTransitive,
    /// 前方互換性: 古いスキーマで新しいデータを読める。
    Forward,
    /// 推移的前方互換性: すべての過去バージョンと前方互換。
    ForwardTransitive,
    /// 完全互換性: 後方互換かつ前方互換。
    Full,
    /// 推移的完全互換性: すべての過去バージョンと完全互換。
    FullTransitive,
    /// 互換性チェックなし。
    None,
}

impl CompatibilityLevel {
    /// REST API で使用する文字列表現を返す。
    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityLevel::Backward => "BACKWARD",
            CompatibilityLevel::BackwardTransitive => "BACKWARD_TRANSITIVE",
            CompatibilityLevel::Forward => "FORWARD",
            CompatibilityLevel::ForwardTransitive => "FORWARD_TRANSITIVE",
            CompatibilityLevel::Full => "FULL",
            CompatibilityLevel::FullTransitive => "FULL_TRANSITIVE",
            CompatibilityLevel::None => "NONE",
        }
    }
}

impl std::fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompatibilityLevel {
    type Err = SchemaRegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BACKWARD" => Ok(CompatibilityLevel::Backward),
            "BACKWARD_TRANSITIVE" => Ok(CompatibilityLevel::BackwardTransitive),
            "FORWARD" => Ok(CompatibilityLevel::Forward),
            "FORWARD_TRANSITIVE" => Ok(CompatibilityLevel::ForwardTransitive),
            "FULL" => Ok(CompatibilityLevel::Full),
            "FULL_TRANSITIVE" => Ok(CompatibilityLevel::FullTransitive),
            "NONE" => Ok(CompatibilityLevel::None),
            other => Err(SchemaRegistryError::Config(format!(
                "unknown compatibility level: {other}"
            ))),
        }
    }
}

/// グローバルまたはサブジェクト単位の互換性設定。
///
/// GET は `compatibilityLevel`、PUT は `compatibility` で値を返す。
/// 両方が空の場合はグローバル設定にフォールバックしていることを表す。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<CompatibilityLevel>,
    #[serde(
        rename = "compatibilityLevel",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub compatibility_level: Option<CompatibilityLevel>,
}

impl CompatibilityConfig {
    /// 設定されている互換性レベルを返す。
    pub fn level(&self) -> Option<CompatibilityLevel> {
        self.compatibility_level.or(self.compatibility)
    }

    /// サブジェクト固有の設定を持たず、グローバル設定を使用しているかどうか。
    pub fn uses_global(&self) -> bool {
        self.level().is_none()
    }
}

/// `PUT /config` のリクエストペイロード。
#[derive(Debug, Serialize)]
pub(crate) struct ConfigUpdateRequest {
    pub compatibility: CompatibilityLevel,
}
