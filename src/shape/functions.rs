//! The impls and functions
//!
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use crate::shape::RenderOptions;

/// Serialize a diff as a single JSON line.
///
/// When multiple hosts are polled, the document gets a `host` member with the `host:port` it
/// was read from, so lines of different hosts can be told apart.
pub fn json_document<S: Serialize>(
    document: &S,
    options: &RenderOptions,
) -> Result<String>
{
    let mut document = serde_json::to_value(document)
        .with_context(|| "Json serialization error")?;
    if let (Some(host), Value::Object(members)) = (&options.host, &mut document) {
        members.insert("host".to_string(), Value::String(host.clone()));
    }
    serde_json::to_string(&document)
        .with_context(|| "Json serialization error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_json_document_single_host() {
        let document = serde_json::json!({ "totals": { "test.a": { "read": 1, "write": 2 } } });
        let json = json_document(&document, &RenderOptions::default()).unwrap();
        assert_eq!(json, r#"{"totals":{"test.a":{"read":1,"write":2}}}"#);
    }

    #[test]
    fn unit_json_document_multiple_hosts() {
        let document = serde_json::json!({ "unsupported": true });
        let options = RenderOptions { host: Some("db-2:28017".to_string()), multiple_hosts: true, ..Default::default() };
        let json: Value = serde_json::from_str(&json_document(&document, &options).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ "unsupported": true, "host": "db-2:28017" }));
    }
}
