use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("SURREALDB_URL").unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("SURREALDB_NAMESPACE").unwrap_or_else(|_| "velox".to_string()),
            database: env::var("SURREALDB_DATABASE").unwrap_or_else(|_| "api".to_string()),
            username: env::var("SURREALDB_USERNAME").ok(),
            password: env::var("SURREALDB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    // Use the specified namespace and database
    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

pub async fn ensure_schema(db: &Db) -> Result<()> {
    // Define schema for each table
    let schema_queries = vec![
        // Organization table: the tenant boundary and its origin policy
        "DEFINE TABLE organization SCHEMAFULL;
         DEFINE FIELD org_id ON TABLE organization TYPE string;
         DEFINE FIELD name ON TABLE organization TYPE string;
         DEFINE FIELD slug ON TABLE organization TYPE string;
         DEFINE FIELD allowed_ips ON TABLE organization TYPE array<string> DEFAULT [];
         DEFINE FIELD created_at ON TABLE organization VALUE time::now();
         DEFINE FIELD updated_at ON TABLE organization VALUE time::now();",
        // API key table: credential bindings, secrets stored by lookup form only
        "DEFINE TABLE api_key SCHEMAFULL;
         DEFINE FIELD organization_id ON TABLE api_key TYPE string;
         DEFINE FIELD key_hash ON TABLE api_key TYPE string;
         DEFINE FIELD key_prefix ON TABLE api_key TYPE string;
         DEFINE FIELD name ON TABLE api_key TYPE option<string>;
         DEFINE FIELD created_at ON TABLE api_key VALUE time::now();",
        // Uniqueness and lookup indexes. key_hash uniqueness is what makes
        // the credential lookup return at most one record.
        "DEFINE INDEX organization_org_id ON TABLE organization COLUMNS org_id UNIQUE;
         DEFINE INDEX organization_slug ON TABLE organization COLUMNS slug UNIQUE;
         DEFINE INDEX api_key_hash ON TABLE api_key COLUMNS key_hash UNIQUE;
         DEFINE INDEX api_key_org ON TABLE api_key COLUMNS organization_id;",
    ];

    for query in schema_queries {
        db.query(query).await?;
    }

    Ok(())
}
