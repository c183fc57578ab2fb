//! Snowflake SQL API (v2) backend.
//!
//! Statements are submitted with `POST /api/v2/statements`. Long-running
//! statements answer `202` with a status URL that is polled until the result
//! is ready; multi-partition results are fetched partition by partition.

use std::thread;
use std::time::{Duration, Instant};

use kpi_model::{QualifiedName, WarehouseSettings};
use polars::prelude::DataFrame;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use tracing::{debug, info, warn};

use crate::Warehouse;
use crate::error::{Result, WarehouseError};
use crate::response::{StatementRequest, StatementResponse, error_from_response, frame_from_rows};
use crate::session::SessionCache;

/// Environment variable holding the bearer token.
pub const TOKEN_ENV_VAR: &str = "KPI_WAREHOUSE_TOKEN";

/// Statements path relative to the account URL.
const STATEMENTS_PATH: &str = "/api/v2/statements";

/// HTTP request timeout. Synchronous execution hands over to polling after 45s.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

const POLL_INTERVAL: Duration = Duration::from_secs(1);

const USER_AGENT_VALUE: &str = concat!("pdl-kpi/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`SqlApiWarehouse`].
#[derive(Debug, Clone)]
pub struct SqlApiConfig {
    pub base_url: String,
    pub token: String,
    pub database: String,
    pub schema: String,
    pub warehouse: Option<String>,
    pub role: Option<String>,
    pub statement_timeout: Duration,
    pub session_ttl: Duration,
    pub poll_interval: Duration,
}

impl SqlApiConfig {
    /// Build from the configured warehouse settings.
    ///
    /// Needs either `base_url` or `account`.
    pub fn from_settings(
        settings: &WarehouseSettings,
        schema: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let base_url = match (&settings.base_url, &settings.account) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(account)) => format!("https://{account}.snowflakecomputing.com"),
            (None, None) => {
                return Err(WarehouseError::NotConfigured(
                    "set warehouse.account or warehouse.base_url".to_string(),
                ));
            }
        };
        Ok(Self {
            base_url,
            token: token.into(),
            database: settings.database.clone(),
            schema: schema.into(),
            warehouse: settings.warehouse.clone(),
            role: settings.role.clone(),
            statement_timeout: Duration::from_secs(settings.statement_timeout_secs),
            session_ttl: Duration::from_secs(settings.session_ttl_secs),
            poll_interval: POLL_INTERVAL,
        })
    }

    fn statements_url(&self) -> String {
        format!("{}{STATEMENTS_PATH}", self.base_url)
    }
}

/// Read the bearer token from [`TOKEN_ENV_VAR`].
pub fn token_from_env() -> Result<String> {
    std::env::var(TOKEN_ENV_VAR)
        .ok()
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| WarehouseError::NotConfigured(format!("{TOKEN_ENV_VAR} is not set")))
}

/// Warehouse reached through the SQL REST API.
pub struct SqlApiWarehouse {
    config: SqlApiConfig,
    session: SessionCache<Client>,
}

impl SqlApiWarehouse {
    /// Open a session. The HTTP client is reused until the session TTL expires.
    pub fn connect(config: SqlApiConfig) -> Result<Self> {
        let session = SessionCache::new(config.session_ttl);
        let warehouse = Self { config, session };
        warehouse.client()?;
        info!(
            url = %warehouse.config.base_url,
            database = %warehouse.config.database,
            schema = %warehouse.config.schema,
            "warehouse session opened"
        );
        Ok(warehouse)
    }

    fn client(&self) -> Result<Client> {
        self.session.get_or_try_open(|| {
            Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(WarehouseError::from)
        })
    }

    /// Run one statement to completion, returning its first partition.
    fn run(&self, statement: &str) -> Result<StatementResponse> {
        let client = self.client()?;
        let body = StatementRequest {
            statement,
            timeout: self.config.statement_timeout.as_secs(),
            database: &self.config.database,
            schema: &self.config.schema,
            warehouse: self.config.warehouse.as_deref(),
            role: self.config.role.as_deref(),
        };
        let response = client
            .post(self.config.statements_url())
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .json(&body)
            .send()?;
        let parsed = checked(response)?;
        match parsed.statement_status_url.clone() {
            Some(status_url) if parsed.result_set_meta_data.is_none() => {
                self.poll(&client, &status_url, parsed.statement_handle.as_deref())
            }
            _ => Ok(parsed),
        }
    }

    fn poll(
        &self,
        client: &Client,
        status_url: &str,
        handle: Option<&str>,
    ) -> Result<StatementResponse> {
        let deadline = Instant::now() + self.config.statement_timeout;
        let url = format!("{}{status_url}", self.config.base_url);
        loop {
            if Instant::now() >= deadline {
                if let Some(handle) = handle {
                    self.cancel(client, handle);
                }
                return Err(WarehouseError::Timeout(format!(
                    "statement did not finish within {}s",
                    self.config.statement_timeout.as_secs()
                )));
            }
            thread::sleep(self.config.poll_interval);
            debug!(handle = handle.unwrap_or("-"), "polling statement status");
            let response = self.get(client, &url)?;
            if response.status() == StatusCode::ACCEPTED {
                continue;
            }
            return checked(response);
        }
    }

    fn cancel(&self, client: &Client, handle: &str) {
        let url = format!("{}/{handle}/cancel", self.config.statements_url());
        let result = client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send();
        if let Err(error) = result {
            warn!(handle, %error, "failed to cancel statement");
        }
    }

    fn get(&self, client: &Client, url: &str) -> Result<Response> {
        Ok(client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()?)
    }

    /// Rows of every partition after the first.
    fn remaining_partitions(
        &self,
        first: &StatementResponse,
    ) -> Result<Vec<Vec<Option<String>>>> {
        let partitions = first.partition_count();
        if partitions <= 1 {
            return Ok(Vec::new());
        }
        let handle = first.statement_handle.as_deref().ok_or_else(|| {
            WarehouseError::InvalidResponse("multi-partition result without a handle".to_string())
        })?;
        let client = self.client()?;
        let mut rows = Vec::new();
        for partition in 1..partitions {
            let url = format!("{}/{handle}?partition={partition}", self.config.statements_url());
            debug!(handle, partition, "fetching result partition");
            let mut page = checked(self.get(&client, &url)?)?;
            rows.append(&mut page.data);
        }
        Ok(rows)
    }
}

/// Parse a response, turning error statuses into [`WarehouseError`]s.
fn checked(response: Response) -> Result<StatementResponse> {
    let status = response.status();
    let body = response.text()?;
    if status.is_success() {
        Ok(serde_json::from_str(&body)?)
    } else {
        Err(error_from_response(status.as_u16(), &body))
    }
}

impl Warehouse for SqlApiWarehouse {
    fn name(&self) -> &'static str {
        "sql-api"
    }

    fn execute(&self, statement: &str) -> Result<()> {
        let response = self.run(statement)?;
        debug!(
            handle = response.statement_handle.as_deref().unwrap_or("-"),
            "statement executed"
        );
        Ok(())
    }

    fn read_table(&self, table: &QualifiedName) -> Result<DataFrame> {
        let mut first = self.run(&format!("SELECT * FROM {table}"))?;
        let mut rest = self.remaining_partitions(&first)?;
        first.data.append(&mut rest);
        let meta = first.result_set_meta_data.unwrap_or_default();
        frame_from_rows(&meta.row_type, &first.data)
    }
}

impl Drop for SqlApiWarehouse {
    fn drop(&mut self) {
        if let Some(age) = self.session.age() {
            debug!(?age, "releasing warehouse session");
        }
        self.session.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_from_account() {
        let settings = WarehouseSettings {
            account: Some("acme-xy12345".to_string()),
            ..WarehouseSettings::default()
        };
        let config = SqlApiConfig::from_settings(&settings, "SCHEMA", "token").unwrap();
        assert_eq!(
            config.statements_url(),
            "https://acme-xy12345.snowflakecomputing.com/api/v2/statements"
        );
        assert_eq!(config.statement_timeout, Duration::from_secs(600));
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn explicit_base_url_wins() {
        let settings = WarehouseSettings {
            account: Some("ignored".to_string()),
            base_url: Some("http://localhost:8080/".to_string()),
            ..WarehouseSettings::default()
        };
        let config = SqlApiConfig::from_settings(&settings, "S", "t").unwrap();
        assert_eq!(config.statements_url(), "http://localhost:8080/api/v2/statements");
    }

    #[test]
    fn missing_account_is_not_configured() {
        let result = SqlApiConfig::from_settings(&WarehouseSettings::default(), "S", "t");
        assert!(matches!(result, Err(WarehouseError::NotConfigured(_))));
    }

    #[test]
    fn request_body_skips_absent_fields() {
        let body = StatementRequest {
            statement: "SELECT 1",
            timeout: 600,
            database: "PROJECT_DATA",
            schema: "S",
            warehouse: None,
            role: Some("ANALYST"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["statement"], "SELECT 1");
        assert_eq!(json["role"], "ANALYST");
        assert!(json.get("warehouse").is_none());
    }
}
