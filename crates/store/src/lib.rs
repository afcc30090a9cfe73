//! PostgreSQL storage for alert definitions (`alerts_config`) and last observed values (`alerts`).

use chrono::{DateTime, Utc};
use monitor::{AlertDefinition, AlertState, AlertStore, MonitorError};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid function_inputs for alert {name}: expected a JSON array")]
    InvalidInputs { name: String },
}

impl From<StoreError> for MonitorError {
    fn from(err: StoreError) -> Self {
        MonitorError::Store(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    pub async fn fetch_definitions(&self) -> Result<Vec<AlertDefinition>> {
        let rows = sqlx::query(
            r#"
            SELECT name, rpc_url, contract_address, function_abi_string, function_name, function_inputs
            FROM alerts_config
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(definition_from_row).collect()
    }

    #[instrument(skip(self))]
    pub async fn fetch_state(&self, name: &str) -> Result<Option<AlertState>> {
        let row = sqlx::query(
            r#"
            SELECT name, value, timestamp
            FROM alerts WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AlertState {
            name: r.get("name"),
            value: r.get("value"),
            timestamp: r.get::<DateTime<Utc>, _>("timestamp"),
        }))
    }

    #[instrument(skip(self, state), fields(name = %state.name))]
    pub async fn write_state(&self, state: &AlertState) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO alerts (name, value, timestamp)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET
                value = EXCLUDED.value,
                timestamp = EXCLUDED.timestamp
            "#,
        )
        .bind(&state.name)
        .bind(&state.value)
        .bind(state.timestamp)
        .execute(&self.pool)
        .await?;

        debug!("Stored new value");
        Ok(())
    }
}

fn definition_from_row(row: &PgRow) -> Result<AlertDefinition> {
    let name: String = row.get("name");
    let inputs: Option<serde_json::Value> = row.get("function_inputs");

    Ok(AlertDefinition {
        function_inputs: parse_inputs(&name, inputs)?,
        rpc_url: row.get("rpc_url"),
        contract_address: row.get("contract_address"),
        function_abi_string: row.get("function_abi_string"),
        function_name: row.get("function_name"),
        name,
    })
}

/// `NULL` and JSON `null` both mean "no inputs"; anything else must be an array.
fn parse_inputs(
    name: &str,
    inputs: Option<serde_json::Value>,
) -> Result<Option<Vec<serde_json::Value>>> {
    match inputs {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Array(values)) => Ok(Some(values)),
        Some(_) => Err(StoreError::InvalidInputs {
            name: name.to_string(),
        }),
    }
}

impl AlertStore for PostgresStore {
    async fn load_definitions(&self) -> monitor::error::Result<Vec<AlertDefinition>> {
        Ok(self.fetch_definitions().await?)
    }

    async fn find_state(&self, name: &str) -> monitor::error::Result<Option<AlertState>> {
        Ok(self.fetch_state(name).await?)
    }

    async fn upsert_state(&self, state: &AlertState) -> monitor::error::Result<()> {
        Ok(self.write_state(state).await?)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed PostgreSQL connection");
    }
}
