//! Per-request Trino connections.
//!
//! There is no pool: every request opens its own connection through a
//! [`Connector`] and releases it before returning. [`with_connection`] is the
//! only place that pairs `open` with `close`.

use super::auth::{coordinator_url, truncate_for_log, AuthMode, ConnectionSecurity};
use super::types::{Column, QueryResults, Row};
use crate::config::ConnectionProfile;
use crate::constants::{CLIENT_SOURCE, LOG_QUERY_TRUNCATE_LENGTH, STATEMENT_PATH};
use crate::error::{EngineError, ServerError};
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder};
use tracing::{debug, info, warn};

/// A live session against one catalog/schema, with a single cursor.
///
/// Executing a new statement discards whatever the previous one left
/// unread.
#[async_trait]
pub trait EngineConnection: Send {
    /// Submit a statement.
    ///
    /// Returns once the first rows arrived or the statement finished.
    async fn execute(&mut self, statement: &str) -> Result<(), EngineError>;

    /// Column labels of the current result, empty when it has none.
    fn column_names(&self) -> Vec<String>;

    /// Drain every remaining row of the current result.
    async fn fetch_all(&mut self) -> Result<Vec<Row>, EngineError>;

    /// Release the session. Idempotent.
    async fn close(&mut self);
}

/// Opens engine connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a brand-new connection bound to the profile's catalog and schema.
    async fn open(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<Box<dyn EngineConnection>, ServerError>;
}

/// Run `op` on a freshly opened connection and close it afterwards.
///
/// The connection is closed on every path once it was opened, including
/// when `op` yields an error value.
pub async fn with_connection<T, F>(
    connector: &dyn Connector,
    profile: &ConnectionProfile,
    op: F,
) -> Result<T, ServerError>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut dyn EngineConnection) -> BoxFuture<'c, T> + Send,
{
    let mut conn = connector.open(profile).await?;
    let result = op(conn.as_mut()).await;
    conn.close().await;
    Ok(result)
}

/// Connector for the Trino client REST protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrinoConnector;

impl TrinoConnector {
    /// Create a new connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for TrinoConnector {
    async fn open(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<Box<dyn EngineConnection>, ServerError> {
        Ok(Box::new(TrinoConnection::new(profile)?))
    }
}

/// Cursor state of the statement currently running on a connection.
#[derive(Debug, Default)]
struct Cursor {
    query_id: Option<String>,
    next_uri: Option<String>,
    columns: Option<Vec<Column>>,
    rows: Vec<Row>,
    update_type: Option<String>,
}

impl Cursor {
    fn absorb(&mut self, page: QueryResults) -> Result<(), EngineError> {
        let finished = page.is_finished();
        self.query_id = Some(page.id.clone());
        self.next_uri = page.next_uri.clone();
        if let Some(err) = page.engine_error() {
            // A failed query has no further pages.
            self.next_uri = None;
            return Err(err);
        }
        if let Some(columns) = page.columns {
            self.columns = Some(columns);
        }
        if let Some(data) = page.data {
            self.rows.extend(data);
        }
        if page.update_type.is_some() {
            self.update_type = page.update_type;
        }
        if finished {
            debug!(
                "Query {} finished ({})",
                page.id,
                self.update_type.as_deref().unwrap_or("query")
            );
        }
        Ok(())
    }
}

/// A Trino session over HTTP.
pub struct TrinoConnection {
    client: Client,
    base_url: String,
    user: String,
    catalog: String,
    schema: String,
    auth: AuthMode,
    cursor: Cursor,
    closed: bool,
}

impl TrinoConnection {
    /// Build a connection for the profile.
    ///
    /// No network traffic happens until the first statement is submitted.
    pub fn new(profile: &ConnectionProfile) -> Result<Self, ServerError> {
        let security = ConnectionSecurity::for_profile(profile);
        let base_url = coordinator_url(profile, security.transport);

        info!(
            "Opening Trino connection to {} ({}.{}, authenticated: {})",
            base_url,
            profile.catalog,
            profile.schema,
            security.auth.is_authenticated()
        );

        let client = Client::builder()
            .user_agent(concat!("trino-mcp-server/", env!("CARGO_PKG_VERSION")))
            .https_only(security.transport.is_secure())
            .build()
            .map_err(|e| ServerError::connection_with_source("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url,
            user: profile.user.clone(),
            catalog: profile.catalog.clone(),
            schema: profile.schema.clone(),
            auth: security.auth,
            cursor: Cursor::default(),
            closed: false,
        })
    }

    /// Coordinator base URL this connection talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("X-Trino-User", &self.user)
            .header("X-Trino-Catalog", &self.catalog)
            .header("X-Trino-Schema", &self.schema)
            .header("X-Trino-Source", CLIENT_SOURCE);

        match &self.auth {
            AuthMode::Basic { username, password } => builder.basic_auth(username, Some(password)),
            AuthMode::Unauthenticated => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<QueryResults, EngineError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::external(format!(
                "Trino coordinator returned HTTP {}: {}",
                status,
                truncate_for_log(body.trim(), LOG_QUERY_TRUNCATE_LENGTH)
            )));
        }
        Ok(response.json::<QueryResults>().await?)
    }

    /// Fetch the next page of the current statement.
    async fn advance(&mut self) -> Result<(), EngineError> {
        let Some(next_uri) = self.cursor.next_uri.clone() else {
            return Ok(());
        };
        let page = self.send(self.request(Method::GET, &next_uri)).await;
        match page {
            Ok(page) => {
                debug!("Query {} is {}", page.id, page.state());
                self.cursor.absorb(page)
            }
            Err(e) => {
                self.cursor.next_uri = None;
                Err(e)
            }
        }
    }

    /// Cancel the current statement if it still has unread pages.
    async fn cancel(&mut self) {
        if let Some(next_uri) = self.cursor.next_uri.take() {
            debug!("Cancelling undrained query {:?}", self.cursor.query_id);
            if let Err(e) = self.request(Method::DELETE, &next_uri).send().await {
                warn!("Failed to cancel query {:?}: {}", self.cursor.query_id, e);
            }
        }
    }
}

#[async_trait]
impl EngineConnection for TrinoConnection {
    async fn execute(&mut self, statement: &str) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::external("Connection is closed"));
        }
        self.cancel().await;
        self.cursor = Cursor::default();

        debug!(
            "Submitting statement: {}",
            truncate_for_log(statement, LOG_QUERY_TRUNCATE_LENGTH)
        );

        let url = format!("{}{}", self.base_url, STATEMENT_PATH);
        let page = self
            .send(self.request(Method::POST, &url).body(statement.to_string()))
            .await?;
        self.cursor.absorb(page)?;

        // Like the official Trino clients, block until there is something to
        // read or nothing left to wait for.
        while self.cursor.rows.is_empty() && self.cursor.next_uri.is_some() {
            self.advance().await?;
        }
        Ok(())
    }

    fn column_names(&self) -> Vec<String> {
        self.cursor
            .columns
            .as_ref()
            .map(|cols| cols.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    async fn fetch_all(&mut self) -> Result<Vec<Row>, EngineError> {
        while self.cursor.next_uri.is_some() {
            self.advance().await?;
        }
        Ok(std::mem::take(&mut self.cursor.rows))
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.cancel().await;
        self.closed = true;
        debug!("Closed Trino connection to {}", self.base_url);
    }
}
