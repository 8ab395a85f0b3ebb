use std::sync::Arc;

use async_trait::async_trait;
#[cfg(feature = "mock")]
use mockall::automock;
use reqwest::Method;
use tracing::{debug, error};

use crate::{
    compatibility::{CompatibilityConfig, CompatibilityLevel, ConfigUpdateRequest},
    config::SchemaRegistryConfig,
    error::SchemaRegistryError,
    http::{encode, RequestPipeline},
    schema::{
        IdOnlyResponse, IsCompatibleResponse, Schema, SchemaOnlyResponse, SchemaRequest,
        SchemaType, SchemaVersion,
    },
    transport::{build_http_client, Transport},
};

const SUBJECTS_PATH: &str = "subjects";
const VERSIONS_PATH: &str = "versions";
const SCHEMAS_PATH: &str = "schemas";
const IDS_PATH: &str = "ids";
const COMPATIBILITY_PATH: &str = "compatibility";
const CONFIG_PATH: &str = "config";

/// Schema Registry クライアントのインターフェース。
///
/// サブジェクト・スキーマの登録／取得／削除、互換性チェック、互換性設定の取得・更新を提供する。
/// `mock` feature を有効にすると `MockSchemaRegistryClient` が生成される。
#[async_trait]
#[cfg_attr(feature = "mock", automock)]
pub trait SchemaRegistryClient: Send + Sync {
    /// 登録されているすべてのサブジェクト名を返す。
    async fn list_subjects(&self) -> Result<Vec<String>, SchemaRegistryError>;

    /// サブジェクトに登録されているすべてのバージョン番号を返す。
    async fn list_versions(&self, subject: &str) -> Result<Vec<i32>, SchemaRegistryError>;

    /// サブジェクトと互換性設定を削除し、削除されたバージョン番号のリストを返す。
    async fn delete_subject(&self, subject: &str) -> Result<Vec<i32>, SchemaRegistryError>;

    /// サブジェクトの特定バージョンを削除し、削除されたバージョン番号を返す。
    async fn delete_schema_version(
        &self,
        subject: &str,
        version: SchemaVersion,
    ) -> Result<i32, SchemaRegistryError>;

    /// スキーマをサブジェクトに登録し、グローバルスキーマ ID を返す。
    ///
    /// 同一スキーマが既に存在する場合は既存の ID を返す。
    /// ID はバージョン番号とは独立している。
    async fn register_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
    ) -> Result<i32, SchemaRegistryError>;

    /// グローバルスキーマ ID でスキーマ定義文字列を取得する。
    async fn get_schema_by_id(&self, schema_id: i32) -> Result<String, SchemaRegistryError>;

    /// サブジェクトの指定バージョンのスキーマを取得する。
    async fn get_schema_by_subject(
        &self,
        subject: &str,
        version: i32,
    ) -> Result<Schema, SchemaRegistryError>;

    /// サブジェクトの最新バージョンのスキーマを取得する。
    async fn get_latest_schema(&self, subject: &str) -> Result<Schema, SchemaRegistryError>;

    /// スキーマがサブジェクトに登録済みかを確認する。
    ///
    /// 未登録の場合は `None`、登録済みの場合は登録情報を返す。
    async fn is_registered(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<Option<Schema>, SchemaRegistryError>;

    /// スキーマがサブジェクトの指定バージョンと互換かを確認する。
    async fn is_schema_compatible(
        &self,
        subject: &str,
        schema: &str,
        version: i32,
    ) -> Result<bool, SchemaRegistryError>;

    /// スキーマがサブジェクトの最新バージョンと互換かを確認する。
    async fn is_latest_schema_compatible(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<bool, SchemaRegistryError>;

    /// グローバルの互換性設定を取得する。
    async fn get_global_config(&self) -> Result<CompatibilityConfig, SchemaRegistryError>;

    /// サブジェクトの互換性設定を取得する。
    ///
    /// サブジェクト固有の設定がない場合（404）は空の設定を返す。
    /// 空の設定はグローバル設定にフォールバックしていることを表す。
    async fn get_subject_config(
        &self,
        subject: &str,
    ) -> Result<CompatibilityConfig, SchemaRegistryError>;

    /// グローバルの互換性レベルを更新する。
    async fn set_global_config_level(
        &self,
        level: CompatibilityLevel,
    ) -> Result<CompatibilityConfig, SchemaRegistryError>;

    /// サブジェクトの互換性レベルを更新する。
    async fn set_subject_config_level(
        &self,
        subject: &str,
        level: CompatibilityLevel,
    ) -> Result<CompatibilityConfig, SchemaRegistryError>;

    /// Schema Registry サービスへの接続を確認する。
    async fn health_check(&self) -> Result<(), SchemaRegistryError>;
}

/// HTTP 経由で Schema Registry と通信する実装。
pub struct HttpSchemaRegistryClient {
    pipeline: RequestPipeline,
}

impl HttpSchemaRegistryClient {
    /// 設定からデフォルトの HTTP トランスポートでクライアントを構築する。
    ///
    /// タイムアウトは `config.timeout_secs` の値を使用する。
    pub fn new(config: SchemaRegistryConfig) -> Result<Self, SchemaRegistryError> {
        let http_client = build_http_client(config.timeout())?;
        Self::with_transport(config, http_client)
    }

    /// 任意のトランスポートでクライアントを構築する。
    pub fn with_transport(
        config: SchemaRegistryConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, SchemaRegistryError> {
        let base_url = config.base_url()?;
        debug!("Schema Registry client created: base_url={}", base_url);
        Ok(Self {
            pipeline: RequestPipeline::new(base_url, Arc::new(transport), config.timeout()),
        })
    }

    /// Schema Registry のベース URL を返す（末尾スラッシュなし）。
    pub fn base_url(&self) -> &str {
        self.pipeline.base_url()
    }

    /// サブジェクトの互換性レベルを FULL に更新する。
    pub async fn set_subject_config_level_full(
        &self,
        subject: &str,
    ) -> Result<CompatibilityConfig, SchemaRegistryError> {
        self.set_subject_config_level(subject, CompatibilityLevel::Full)
            .await
    }

    async fn subject_schema_at_version(
        &self,
        subject: &str,
        version: SchemaVersion,
    ) -> Result<Schema, SchemaRegistryError> {
        require(subject, "subject")?;
        let version = version.validate()?.to_string();

        debug!("Fetching schema: subject={}, version={}", subject, version);

        self.pipeline
            .send_json(
                Method::GET,
                &[SUBJECTS_PATH, subject, VERSIONS_PATH, version.as_str()],
                None,
            )
            .await
    }

    async fn schema_compatible_at_version(
        &self,
        subject: &str,
        schema: &str,
        version: SchemaVersion,
    ) -> Result<bool, SchemaRegistryError> {
        require(subject, "subject")?;
        require(schema, "schema")?;
        let version = version.validate()?.to_string();
        let body = encode(&SchemaRequest::new(schema, SchemaType::Avro))?;

        debug!(
            "Checking compatibility: subject={}, version={}",
            subject, version
        );

        let result: IsCompatibleResponse = self
            .pipeline
            .send_json(
                Method::POST,
                &[COMPATIBILITY_PATH, SUBJECTS_PATH, subject, VERSIONS_PATH, version.as_str()],
                Some(body),
            )
            .await?;

        debug!(
            "Compatibility check result: subject={}, is_compatible={}",
            subject, result.is_compatible
        );
        Ok(result.is_compatible)
    }

    async fn update_config(
        &self,
        segments: &[&str],
        level: CompatibilityLevel,
    ) -> Result<CompatibilityConfig, SchemaRegistryError> {
        let body = encode(&ConfigUpdateRequest {
            compatibility: level,
        })?;

        debug!("Updating compatibility config: path={:?}, level={}", segments, level);

        self.pipeline
            .send_json(Method::PUT, segments, Some(body))
            .await
    }
}

fn require(value: &str, field: &'static str) -> Result<(), SchemaRegistryError> {
    if value.is_empty() {
        return Err(SchemaRegistryError::Required(field));
    }
    Ok(())
}

#[async_trait]
impl SchemaRegistryClient for HttpSchemaRegistryClient {
    async fn list_subjects(&self) -> Result<Vec<String>, SchemaRegistryError> {
        debug!("Listing all subjects");

        let subjects: Vec<String> = self
            .pipeline
            .send_json(Method::GET, &[SUBJECTS_PATH], None)
            .await?;

        debug!("Found {} subjects", subjects.len());
        Ok(subjects)
    }

    async fn list_versions(&self, subject: &str) -> Result<Vec<i32>, SchemaRegistryError> {
        require(subject, "subject")?;

        debug!("Listing versions: subject={}", subject);

        let versions: Vec<i32> = self
            .pipeline
            .send_json(Method::GET, &[SUBJECTS_PATH, subject, VERSIONS_PATH], None)
            .await?;

        debug!("Subject {} has {} versions", subject, versions.len());
        Ok(versions)
    }

    async fn delete_subject(&self, subject: &str) -> Result<Vec<i32>, SchemaRegistryError> {
        require(subject, "subject")?;

        debug!("Deleting subject={}", subject);

        let versions: Vec<i32> = self
            .pipeline
            .send_json(Method::DELETE, &[SUBJECTS_PATH, subject], None)
            .await?;

        debug!("Deleted subject {}: {} versions removed", subject, versions.len());
        Ok(versions)
    }

    async fn delete_schema_version(
        &self,
        subject: &str,
        version: SchemaVersion,
    ) -> Result<i32, SchemaRegistryError> {
        require(subject, "subject")?;
        let version = version.validate()?.to_string();

        debug!("Deleting schema: subject={}, version={}", subject, version);

        self.pipeline
            .send_json(
                Method::DELETE,
                &[SUBJECTS_PATH, subject, VERSIONS_PATH, version.as_str()],
                None,
            )
            .await
    }

    async fn register_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
    ) -> Result<i32, SchemaRegistryError> {
        require(subject, "subject")?;
        require(schema, "schema")?;
        let body = encode(&SchemaRequest::new(schema, schema_type))?;

        debug!(
            "Registering schema: subject={}, type={}",
            subject, schema_type
        );

        let reg: IdOnlyResponse = self
            .pipeline
            .send_json(
                Method::POST,
                &[SUBJECTS_PATH, subject, VERSIONS_PATH],
                Some(body),
            )
            .await?;

        debug!("Schema registered: id={}", reg.id);
        Ok(reg.id)
    }

    async fn get_schema_by_id(&self, schema_id: i32) -> Result<String, SchemaRegistryError> {
        let id = schema_id.to_string();

        debug!("Fetching schema by id={}", schema_id);

        let data: SchemaOnlyResponse = self
            .pipeline
            .send_json(Method::GET, &[SCHEMAS_PATH, IDS_PATH, id.as_str()], None)
            .await?;
        Ok(data.schema)
    }

    async fn get_schema_by_subject(
        &self,
        subject: &str,
        version: i32,
    ) -> Result<Schema, SchemaRegistryError> {
        self.subject_schema_at_version(subject, SchemaVersion::Number(version))
            .await
    }

    async fn get_latest_schema(&self, subject: &str) -> Result<Schema, SchemaRegistryError> {
        self.subject_schema_at_version(subject, SchemaVersion::Latest)
            .await
    }

    async fn is_registered(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<Option<Schema>, SchemaRegistryError> {
        require(subject, "subject")?;
        require(schema, "schema")?;
        let body = encode(&SchemaRequest::new(schema, SchemaType::Avro))?;

        debug!("Checking registration: subject={}", subject);

        match self
            .pipeline
            .send_json::<Schema>(Method::POST, &[SUBJECTS_PATH, subject], Some(body))
            .await
        {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.is_schema_not_found() || e.is_subject_not_found() => {
                debug!("Schema not registered under subject {}", subject);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn is_schema_compatible(
        &self,
        subject: &str,
        schema: &str,
        version: i32,
    ) -> Result<bool, SchemaRegistryError> {
        self.schema_compatible_at_version(subject, schema, SchemaVersion::Number(version))
            .await
    }

    async fn is_latest_schema_compatible(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<bool, SchemaRegistryError> {
        self.schema_compatible_at_version(subject, schema, SchemaVersion::Latest)
            .await
    }

    async fn get_global_config(&self) -> Result<CompatibilityConfig, SchemaRegistryError> {
        debug!("Fetching global compatibility config");

        self.pipeline
            .send_json(Method::GET, &[CONFIG_PATH], None)
            .await
    }

    async fn get_subject_config(
        &self,
        subject: &str,
    ) -> Result<CompatibilityConfig, SchemaRegistryError> {
        require(subject, "subject")?;

        debug!("Fetching compatibility config: subject={}", subject);

        match self
            .pipeline
            .send_json(Method::GET, &[CONFIG_PATH, subject], None)
            .await
        {
            Ok(config) => Ok(config),
            Err(e) if e.is_not_found() => {
                debug!(
                    "Subject {} has no compatibility config, falls back to global",
                    subject
                );
                Ok(CompatibilityConfig::default())
            }
            Err(e) => Err(e),
        }
    }

    async fn set_global_config_level(
        &self,
        level: CompatibilityLevel,
    ) -> Result<CompatibilityConfig, SchemaRegistryError> {
        self.update_config(&[CONFIG_PATH], level).await
    }

    async fn set_subject_config_level(
        &self,
        subject: &str,
        level: CompatibilityLevel,
    ) -> Result<CompatibilityConfig, SchemaRegistryError> {
        require(subject, "subject")?;
        self.update_config(&[CONFIG_PATH, subject], level).await
    }

    async fn health_check(&self) -> Result<(), SchemaRegistryError> {
        debug!("Health check: url={}/", self.base_url());

        match self.pipeline.send(Method::GET, &[], None).await {
            Ok(_) => {
                debug!("Schema Registry is healthy");
                Ok(())
            }
            Err(e) => {
                error!("Schema Registry health check failed: {}", e);
                Err(SchemaRegistryError::Unavailable(e.to_string()))
            }
        }
    }
}
