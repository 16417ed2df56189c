use anyhow::{Context, Result};
use serde_json::Value;
use serde_json_path::JsonPath;

/// Evaluates a path expression against a JSON document.
///
/// Implementations return the matched nodes in document order. An expression that
/// cannot be parsed is an error, an expression that selects nothing is an empty list.
pub trait PathQuery {
    fn query<'a>(&self, path: &str, document: &'a Value) -> Result<Vec<&'a Value>>;
}

/// [PathQuery] backed by `serde_json_path` (RFC 9535 JSONPath).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPathQuery;

impl PathQuery for JsonPathQuery {
    fn query<'a>(&self, path: &str, document: &'a Value) -> Result<Vec<&'a Value>> {
        let path = JsonPath::parse(path).with_context(|| format!("invalid JSONPath `{path}`"))?;
        Ok(path.query(document).all())
    }
}

impl<T: PathQuery + ?Sized> PathQuery for &T {
    fn query<'a>(&self, path: &str, document: &'a Value) -> Result<Vec<&'a Value>> {
        (**self).query(path, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn query_returns_nodes_in_document_order() {
        let document = json!({
            "credentialSubject": {
                "account": [
                    { "id": "1234567890", "route": "DE-9876543210" },
                    { "id": "2457913570", "route": "DE-0753197542" }
                ]
            }
        });

        let nodes = JsonPathQuery
            .query("$.credentialSubject.account[*].id", &document)
            .unwrap();
        assert_eq!(nodes, vec![&json!("1234567890"), &json!("2457913570")]);
    }

    #[test]
    fn query_supports_bracketed_member_names() {
        let document = json!({ "org.iso.18013.5.1": { "family_name": "Doe" } });

        let nodes = JsonPathQuery
            .query("$['org.iso.18013.5.1']['family_name']", &document)
            .unwrap();
        assert_eq!(nodes, vec![&json!("Doe")]);
    }

    #[test]
    fn missing_member_is_an_empty_result() {
        let document = json!({});
        let nodes = JsonPathQuery.query("$.missing", &document).unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn malformed_path_is_an_error() {
        assert!(JsonPathQuery.query("invalid.path", &json!({})).is_err());
    }
}
