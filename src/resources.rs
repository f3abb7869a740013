//! MCP Resources for Trino tables.
//!
//! Every table of the configured catalog and schema is exposed as one
//! read-only resource whose content is a sample of its rows.
//!
//! ## URI Scheme
//!
//! Resources use the `trino://` URI scheme:
//!
//! - `trino://{table}/data` - First rows of `{table}`, rendered as comma-separated text
//!
//! Only the first path segment is interpreted; anything after it is accepted
//! and ignored.

use crate::config::ConnectionProfile;
use crate::constants::{
    RESOURCE_DATA_SEGMENT, RESOURCE_MIME_TYPE, RESOURCE_SAMPLE_ROWS, RESOURCE_SCHEME,
};
use crate::database::{display_value, EngineConnection, QueryExecutor};
use crate::error::{EngineError, ServerError};
use rmcp::model::{AnnotateAble, RawResource, ReadResourceResult, Resource, ResourceContents};

/// Statement listing the tables of the profile's namespace.
pub fn list_tables_statement(profile: &ConnectionProfile) -> String {
    format!("SHOW TABLES IN {}", profile.namespace())
}

/// Statement sampling a table of the profile's namespace.
pub fn sample_statement(profile: &ConnectionProfile, table: &str) -> String {
    format!(
        "SELECT * FROM {}.{} LIMIT {}",
        profile.namespace(),
        table,
        RESOURCE_SAMPLE_ROWS
    )
}

/// Enumerate table names.
///
/// Rows are read raw; the first field of each row is the table name.
pub async fn list_tables(
    conn: &mut dyn EngineConnection,
    profile: &ConnectionProfile,
) -> Result<Vec<String>, EngineError> {
    let rows = QueryExecutor::execute_raw(conn, &list_tables_statement(profile)).await?;
    Ok(rows
        .iter()
        .filter_map(|row| row.first().map(display_value))
        .collect())
}

/// Read the sample rows of a table, rendered as a comma-separated table.
pub async fn read_table_sample(
    conn: &mut dyn EngineConnection,
    profile: &ConnectionProfile,
    table: &str,
) -> Result<String, EngineError> {
    let result = QueryExecutor::execute_tabular(conn, &sample_statement(profile, table)).await?;
    Ok(result.render())
}

/// Resource URI of a table.
pub fn table_resource_uri(table: &str) -> String {
    format!("{}{}/{}", RESOURCE_SCHEME, table, RESOURCE_DATA_SEGMENT)
}

/// Build the resource descriptor of a table.
pub fn table_resource(table: &str) -> Resource {
    create_resource(
        &table_resource_uri(table),
        &format!("Table: {}", table),
        &format!("Data in table: {}", table),
        RESOURCE_MIME_TYPE,
    )
}

/// Build the resource list for the given tables, preserving their order.
pub fn build_resource_list(tables: &[String]) -> Vec<Resource> {
    tables.iter().map(|t| table_resource(t)).collect()
}

/// Extract the table name from a resource URI.
///
/// Fails with `InvalidScheme` unless the URI starts with `trino://`.
pub fn parse_resource_uri(uri: &str) -> Result<String, ServerError> {
    let path = uri
        .strip_prefix(RESOURCE_SCHEME)
        .ok_or_else(|| ServerError::InvalidScheme(uri.to_string()))?;

    Ok(path.split('/').next().unwrap_or_default().to_string())
}

/// Wrap rendered table content for the protocol.
pub fn resource_contents(uri: &str, content: String) -> ReadResourceResult {
    ReadResourceResult {
        contents: vec![ResourceContents::text(content, uri.to_string())],
    }
}

/// Create a resource definition.
fn create_resource(uri: &str, name: &str, description: &str, mime_type: &str) -> Resource {
    let mut resource = RawResource::new(uri, name);
    resource.description = Some(description.to_string());
    resource.mime_type = Some(mime_type.to_string());
    resource.no_annotation()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ConnectionProfile {
        ConnectionProfile {
            host: "localhost".to_string(),
            port: 8080,
            user: "analyst".to_string(),
            password: None,
            catalog: "hive".to_string(),
            schema: "sales".to_string(),
        }
    }

    #[test]
    fn test_statements() {
        assert_eq!(list_tables_statement(&profile()), "SHOW TABLES IN hive.sales");
        assert_eq!(
            sample_statement(&profile(), "orders"),
            "SELECT * FROM hive.sales.orders LIMIT 100"
        );
    }

    #[test]
    fn test_table_resource() {
        let resource = table_resource("orders");
        assert_eq!(resource.uri, "trino://orders/data");
        assert_eq!(resource.name, "Table: orders");
        assert_eq!(resource.mime_type.as_deref(), Some("text/plain"));
        assert_eq!(resource.description.as_deref(), Some("Data in table: orders"));
    }

    #[test]
    fn test_build_resource_list_keeps_order() {
        let tables = vec!["b".to_string(), "a".to_string()];
        let uris: Vec<_> = build_resource_list(&tables)
            .into_iter()
            .map(|r| r.uri.clone())
            .collect();
        assert_eq!(uris, vec!["trino://b/data", "trino://a/data"]);
        assert!(build_resource_list(&[]).is_empty());
    }

    #[test]
    fn test_parse_resource_uri() {
        assert_eq!(parse_resource_uri("trino://orders/data").unwrap(), "orders");
        assert_eq!(parse_resource_uri("trino://orders").unwrap(), "orders");
        assert_eq!(parse_resource_uri("trino://orders/anything/else").unwrap(), "orders");
    }

    #[test]
    fn test_parse_resource_uri_rejects_other_schemes() {
        for uri in ["ftp://orders/data", "orders/data", "TRINO://orders/data", ""] {
            let err = parse_resource_uri(uri).unwrap_err();
            assert!(matches!(err, ServerError::InvalidScheme(_)), "{uri}");
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_resource_contents() {
        let result = resource_contents("trino://orders/data", "id\n1".to_string());
        assert_eq!(result.contents.len(), 1);
        match &result.contents[0] {
            ResourceContents::TextResourceContents { uri, text, .. } => {
                assert_eq!(uri, "trino://orders/data");
                assert_eq!(text, "id\n1");
            }
            other => panic!("Expected text contents, got {:?}", other),
        }
    }
}
