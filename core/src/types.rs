//! The post record served by the feed endpoint.
//!
//! # Design
//! Field names follow the wire format through `rename_all = "camelCase"`;
//! unknown fields are ignored so the server can grow its schema. The
//! mock-server crate defines its own copy, and the integration tests catch
//! any drift between the two.

use serde::{Deserialize, Serialize};

/// A single post. Immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u32,
    pub id: i64,
    pub title: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_names() {
        let post: Post =
            serde_json::from_str(r#"{"userId":7,"id":42,"title":"t","body":"b"}"#).unwrap();
        assert_eq!(
            post,
            Post {
                user_id: 7,
                id: 42,
                title: "t".to_string(),
                body: "b".to_string(),
            }
        );
    }

    #[test]
    fn ignores_unknown_fields() {
        let post: Post = serde_json::from_str(
            r#"{"userId":1,"id":1,"title":"t","body":"b","tags":["x"]}"#,
        )
        .unwrap();
        assert_eq!(post.id, 1);
    }

    #[test]
    fn rejects_negative_user_id() {
        let result: Result<Post, _> =
            serde_json::from_str(r#"{"userId":-1,"id":1,"title":"t","body":"b"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_string_typed_id() {
        let result: Result<Post, _> =
            serde_json::from_str(r#"{"userId":1,"id":"1","title":"t","body":"b"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serializes_back_to_camel_case() {
        let post = Post {
            user_id: 3,
            id: 9,
            title: "t".to_string(),
            body: "b".to_string(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["userId"], 3);
        assert!(json.get("user_id").is_none());
    }
}
