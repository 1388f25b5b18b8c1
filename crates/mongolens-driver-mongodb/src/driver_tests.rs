//! Unit tests for MongoDB driver

use super::*;
use bson::{Bson, doc, oid::ObjectId};
use mongolens_core::{ConnectionDriver, ConnectionId, DataService, IndexKeys, MongolensError};
use pretty_assertions::assert_eq;

mod document_id_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_object_id_uses_extended_json() {
        let oid = ObjectId::parse_str("65f1c2a9e4b0a1b2c3d4e5f6").unwrap();
        let rendered = document_id_to_string(&Bson::ObjectId(oid));
        assert_eq!(rendered, r#"{"$oid":"65f1c2a9e4b0a1b2c3d4e5f6"}"#);

        assert_eq!(id_filter(&rendered).unwrap(), doc! { "_id": oid });
    }

    #[test]
    fn test_plain_ids() {
        assert_eq!(document_id_to_string(&Bson::Int32(7)), "7");
        assert_eq!(document_id_to_string(&Bson::String("sku-1".into())), r#""sku-1""#);
        let numeric = id_filter("7").unwrap();
        assert!(matches!(
            numeric.get("_id"),
            Some(Bson::Int32(7)) | Some(Bson::Int64(7))
        ));
        assert_eq!(id_filter(r#""sku-1""#).unwrap(), doc! { "_id": "sku-1" });
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        assert!(matches!(
            id_filter("not json"),
            Err(MongolensError::InvalidArgument(_))
        ));
    }
}

mod index_key_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keys_keep_their_order() {
        let mut keys = IndexKeys::new();
        keys.insert("lastName".into(), serde_json::json!(1));
        keys.insert("createdAt".into(), serde_json::json!(-1));

        let document = keys_to_document(&keys).unwrap();
        let fields: Vec<&str> = document.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["lastName", "createdAt"]);

        assert_eq!(document_to_keys(&document), keys);
    }

    #[test]
    fn test_text_index_key() {
        let mut keys = IndexKeys::new();
        keys.insert("title".into(), serde_json::json!("text"));
        assert_eq!(keys_to_document(&keys).unwrap(), doc! { "title": "text" });
    }

    #[test]
    fn test_empty_keys_are_rejected() {
        assert!(keys_to_document(&IndexKeys::new()).is_err());
    }
}

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_disconnect_without_session_is_ok() {
        let driver = MongoDbDriver::new();
        driver.disconnect(&ConnectionId::from("missing")).await.unwrap();
        assert!(!driver.is_connected(&ConnectionId::from("missing")));
    }

    #[tokio::test]
    async fn test_data_calls_require_a_session() {
        let driver = MongoDbDriver::default();
        let err = driver
            .list_databases(&ConnectionId::from("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, MongolensError::Connection(_)));
    }
}
