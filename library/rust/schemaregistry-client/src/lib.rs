//! k1s0-schemaregistry-client: Schema Registry REST API クライアントライブラリ。
//!
//! サブジェクト・スキーマの登録／取得／削除、互換性チェック、互換性設定の取得・更新を提供する。
//! すべての呼び出しは共通の HTTP パイプラインを通り、gzip レスポンスの展開と
//! 非 2xx レスポンスの [`SchemaRegistryError`] への変換が行われる。
//!
//! # 使用例
//!
//! ```rust,no_run
//! use k1s0_schemaregistry_client::{
//!     HttpSchemaRegistryClient, SchemaRegistryClient, SchemaRegistryConfig, SchemaType,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SchemaRegistryConfig::new("schema-registry").port(8081);
//!     let client = HttpSchemaRegistryClient::new(config)?;
//!
//!     let schema_id = client
//!         .register_schema("orders-value", r#"{"type": "string"}"#, SchemaType::Avro)
//!         .await?;
//!     println!("Registered schema id={}", schema_id);
//!
//!     match client.get_latest_schema("payments-value").await {
//!         Ok(schema) => println!("latest version={}", schema.version),
//!         Err(e) if e.is_subject_not_found() => println!("subject not registered"),
//!         Err(e) => return Err(e.into()),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod compatibility;
pub mod config;
pub mod error;
mod http;
pub mod schema;
pub mod transport;

pub use client::{HttpSchemaRegistryClient, SchemaRegistryClient};
pub use compatibility::{CompatibilityConfig, CompatibilityLevel};
pub use config::{format_base_url, SchemaRegistryConfig, DEFAULT_URL};
pub use error::{
    ResourceError, SchemaRegistryError, SCHEMA_NOT_FOUND_CODE, SUBJECT_NOT_FOUND_CODE,
    VERSION_NOT_FOUND_CODE,
};
pub use crate::http::{ACCEPT_MEDIA_TYPES, CONTENT_TYPE_SCHEMA_JSON, MAX_ERROR_BODY_LEN};
pub use schema::{json_avro_schema, Schema, SchemaType, SchemaVersion, SCHEMA_LATEST_VERSION};
pub use transport::Transport;

#[cfg(feature = "mock")]
pub use client::MockSchemaRegistryClient;
