//! Managed database endpoints (`/v4/databases`).

use crate::client::{Endpoint, LinodeClient};
use crate::error::LinodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database engine families with their own endpoint tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseEngine {
    MySql,
    PostgreSql,
}

impl DatabaseEngine {
    /// Path segment used by the API.
    pub fn path_segment(self) -> &'static str {
        match self {
            DatabaseEngine::MySql => "mysql",
            DatabaseEngine::PostgreSql => "postgresql",
        }
    }

    /// Display name used in tool output.
    pub fn display_name(self) -> &'static str {
        match self {
            DatabaseEngine::MySql => "MySQL",
            DatabaseEngine::PostgreSql => "PostgreSQL",
        }
    }

    fn collection(self) -> &'static str {
        match self {
            DatabaseEngine::MySql => "/v4/databases/mysql/instances",
            DatabaseEngine::PostgreSql => "/v4/databases/postgresql/instances",
        }
    }

    fn instance(self) -> &'static str {
        match self {
            DatabaseEngine::MySql => "/v4/databases/mysql/instances/{id}",
            DatabaseEngine::PostgreSql => "/v4/databases/postgresql/instances/{id}",
        }
    }

    fn credentials(self) -> &'static str {
        match self {
            DatabaseEngine::MySql => "/v4/databases/mysql/instances/{id}/credentials",
            DatabaseEngine::PostgreSql => "/v4/databases/postgresql/instances/{id}/credentials",
        }
    }

    fn credentials_reset(self) -> &'static str {
        match self {
            DatabaseEngine::MySql => "/v4/databases/mysql/instances/{id}/credentials/reset",
            DatabaseEngine::PostgreSql => {
                "/v4/databases/postgresql/instances/{id}/credentials/reset"
            }
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A managed database cluster.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Database {
    pub id: i64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub engine: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub instance_type: String,
    #[serde(default)]
    pub cluster_size: i64,
    #[serde(default)]
    pub hosts: Option<DatabaseHosts>,
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub ssl_connection: bool,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub allow_list: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Connection hosts of a cluster.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseHosts {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
}

/// Root credentials of a cluster.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

/// Body of a database create request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateDatabaseRequest {
    pub label: String,
    pub region: String,
    #[serde(rename = "type")]
    pub instance_type: String,
    /// Engine and version, e.g. `mysql/8.0.30`.
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_connection: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allow_list: Vec<String>,
}

/// Body of a database update request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDatabaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_list: Option<Vec<String>>,
}

impl LinodeClient {
    /// List clusters of every engine.
    pub async fn list_databases(&self) -> Result<Vec<Database>, LinodeError> {
        self.list_all(Endpoint::fixed("/v4/databases/instances"))
            .await
    }

    pub async fn list_engine_databases(
        &self,
        engine: DatabaseEngine,
    ) -> Result<Vec<Database>, LinodeError> {
        self.list_all(Endpoint::fixed(engine.collection())).await
    }

    pub async fn get_database(
        &self,
        engine: DatabaseEngine,
        id: i64,
    ) -> Result<Database, LinodeError> {
        self.get(Endpoint::render(engine.instance(), &[&id])).await
    }

    pub async fn create_database(
        &self,
        engine: DatabaseEngine,
        request: &CreateDatabaseRequest,
    ) -> Result<Database, LinodeError> {
        self.post(Endpoint::fixed(engine.collection()), request)
            .await
    }

    pub async fn update_database(
        &self,
        engine: DatabaseEngine,
        id: i64,
        request: &UpdateDatabaseRequest,
    ) -> Result<Database, LinodeError> {
        self.put(Endpoint::render(engine.instance(), &[&id]), request)
            .await
    }

    pub async fn delete_database(&self, engine: DatabaseEngine, id: i64) -> Result<(), LinodeError> {
        self.delete(Endpoint::render(engine.instance(), &[&id])).await
    }

    pub async fn get_database_credentials(
        &self,
        engine: DatabaseEngine,
        id: i64,
    ) -> Result<DatabaseCredentials, LinodeError> {
        self.get(Endpoint::render(engine.credentials(), &[&id])).await
    }

    pub async fn reset_database_credentials(
        &self,
        engine: DatabaseEngine,
        id: i64,
    ) -> Result<(), LinodeError> {
        self.post_empty(Endpoint::render(engine.credentials_reset(), &[&id]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_templates_match_segment() {
        for engine in [DatabaseEngine::MySql, DatabaseEngine::PostgreSql] {
            let segment = format!("/{}/", engine.path_segment());
            assert!(engine.collection().contains(&segment));
            assert!(engine.instance().contains(&segment));
            assert!(engine.credentials().contains(&segment));
            assert!(engine.credentials_reset().ends_with("/credentials/reset"));
        }
    }

    #[test]
    fn test_create_request_serializes_type() {
        let request = CreateDatabaseRequest {
            label: "db".to_string(),
            region: "us-east".to_string(),
            instance_type: "g6-dedicated-2".to_string(),
            engine: "mysql/8.0.30".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "g6-dedicated-2");
        assert!(value.get("allow_list").is_none());
    }
}
