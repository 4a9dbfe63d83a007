//! Shipping zone adapter against a recording transport

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

use domain_woo::adapter::mock::RecordingTransport;
use domain_woo::{ConnectorError, HttpMethod, ShippingZoneAdapter, TransportError};

fn adapter() -> (Arc<RecordingTransport>, ShippingZoneAdapter) {
    let transport = Arc::new(RecordingTransport::new());
    let adapter = ShippingZoneAdapter::new(transport.clone());
    (transport, adapter)
}

// ============================================================================
// search
// ============================================================================

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn test_search_without_filters_sends_empty_object() {
        let (transport, adapter) = adapter();
        transport.push_response(json!([{"id": 1}, {"id": 2}])).await;

        let ids = adapter.search(HttpMethod::Get, None, None, None).await.unwrap();

        assert_eq!(ids, vec![Some(1), Some(2)]);
        let calls = transport.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, HttpMethod::Get);
        assert_eq!(calls[0].resource, "shipping/zones");
        assert_eq!(calls[0].arguments, json!([{}]));
    }

    #[tokio::test]
    async fn test_search_date_window() {
        let (transport, adapter) = adapter();
        transport.push_response(json!([])).await;

        let from = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
        adapter
            .search(HttpMethod::Get, None, Some(from), Some(to))
            .await
            .unwrap();

        let calls = transport.calls().await;
        assert_eq!(
            calls[0].arguments,
            json!([{"updated_at": {"from": "2024/01/02 03:04:05", "to": "2024/03/04 05:06:07"}}])
        );
    }

    #[tokio::test]
    async fn test_search_keeps_caller_filters() {
        let (transport, adapter) = adapter();
        transport.push_response(json!([])).await;

        let mut filters = Map::new();
        filters.insert("per_page".to_string(), json!(100));
        adapter
            .search(HttpMethod::Get, Some(filters), None, None)
            .await
            .unwrap();

        assert_eq!(transport.calls().await[0].arguments, json!([{"per_page": 100}]));
    }

    #[tokio::test]
    async fn test_filters_do_not_leak_between_calls() {
        let (transport, adapter) = adapter();
        transport.push_response(json!([])).await;
        transport.push_response(json!([])).await;

        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        adapter.search(HttpMethod::Get, None, Some(from), None).await.unwrap();
        adapter.search(HttpMethod::Get, None, None, None).await.unwrap();

        let calls = transport.calls().await;
        assert_eq!(calls[1].arguments, json!([{}]));
    }

    #[tokio::test]
    async fn test_search_record_without_id_yields_none() {
        let (transport, adapter) = adapter();
        transport
            .push_response(json!([{"id": 4}, {"name": "Orphan"}, {"id": 9}]))
            .await;

        let ids = adapter.search(HttpMethod::Get, None, None, None).await.unwrap();
        assert_eq!(ids, vec![Some(4), None, Some(9)]);
    }

    #[tokio::test]
    async fn test_search_non_integer_id_yields_none() {
        let (transport, adapter) = adapter();
        transport
            .push_response(json!([{"id": "5"}, {"id": 6.5}, {"id": null}, {"id": 7}]))
            .await;

        let ids = adapter.search(HttpMethod::Get, None, None, None).await.unwrap();
        assert_eq!(ids, vec![None, None, None, Some(7)]);
    }

    #[tokio::test]
    async fn test_search_rejects_non_list_response() {
        let (transport, adapter) = adapter();
        transport.push_response(json!({"id": 1})).await;

        let err = adapter
            .search(HttpMethod::Get, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidResponse(_)));
    }

    fn zone_strategy() -> impl Strategy<Value = Option<i64>> {
        proptest::option::of(0i64..1_000_000)
    }

    proptest! {
        #[test]
        fn prop_search_preserves_order_and_length(ids in proptest::collection::vec(zone_strategy(), 0..30)) {
            let response: Vec<Value> = ids
                .iter()
                .map(|id| match id {
                    Some(id) => json!({"id": id, "name": format!("Zone {id}")}),
                    None => json!({"name": "no id"}),
                })
                .collect();

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let found = runtime.block_on(async {
                let (transport, adapter) = adapter();
                transport.push_response(Value::Array(response)).await;
                adapter.search(HttpMethod::Get, None, None, None).await.unwrap()
            });

            prop_assert_eq!(found, ids);
        }
    }
}

// ============================================================================
// create / write / is_woo_record
// ============================================================================

mod record_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_wraps_payload() {
        let (transport, adapter) = adapter();
        transport.push_response(json!({"id": 11, "name": "Zone A"})).await;

        let result = adapter.create(json!({"name": "Zone A"})).await.unwrap();

        assert_eq!(result, json!({"id": 11, "name": "Zone A"}));
        let calls = transport.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, HttpMethod::Post);
        assert_eq!(calls[0].resource, "shipping/zones");
        assert_eq!(calls[0].arguments, json!({"shipping_zone": {"name": "Zone A"}}));
    }

    #[tokio::test]
    async fn test_write_targets_record() {
        let (transport, adapter) = adapter();
        transport.push_response(json!({"id": 42})).await;

        adapter.write(42, json!({"name": "Zone B"})).await.unwrap();

        let calls = transport.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, HttpMethod::Put);
        assert_eq!(calls[0].resource, "shipping/zones/42");
        assert_eq!(calls[0].arguments, json!({"shipping_zone": {"name": "Zone B"}}));
    }

    #[tokio::test]
    async fn test_is_woo_record_default_filters_are_fresh() {
        let (transport, adapter) = adapter();
        transport.push_response(json!({"id": 7})).await;
        transport.push_response(json!({"id": 7})).await;

        adapter.is_woo_record(7, None).await.unwrap();
        adapter.is_woo_record(7, None).await.unwrap();

        let calls = transport.calls().await;
        assert_eq!(calls.len(), 2);
        for call in calls {
            assert_eq!(call.method, HttpMethod::Get);
            assert_eq!(call.resource, "shipping/zones/7");
            assert_eq!(call.arguments, json!({}));
        }
    }

    #[tokio::test]
    async fn test_is_woo_record_passes_filters() {
        let (transport, adapter) = adapter();
        transport.push_response(json!({"id": 7})).await;

        let mut filters = Map::new();
        filters.insert("context".to_string(), json!("edit"));
        let result = adapter.is_woo_record(7, Some(filters)).await.unwrap();

        assert_eq!(result, json!({"id": 7}));
        assert_eq!(transport.calls().await[0].arguments, json!({"context": "edit"}));
    }

    #[tokio::test]
    async fn test_record_exists() {
        let (transport, adapter) = adapter();
        transport.push_response(json!({"id": 7})).await;
        transport.push_fault(102, "Invalid ID.").await;

        assert!(adapter.record_exists(7).await.unwrap());
        assert!(!adapter.record_exists(8).await.unwrap());
    }
}

// ============================================================================
// Fault translation
// ============================================================================

mod fault_tests {
    use super::*;

    #[tokio::test]
    async fn test_fault_102_is_missing_on_backend() {
        let (transport, adapter) = adapter();
        transport.push_fault(102, "Invalid ID.").await;

        let err = adapter.write(5, json!({"name": "Gone"})).await.unwrap_err();
        match err {
            ConnectorError::MissingOnBackend { resource, message } => {
                assert_eq!(resource, "shipping/zones/5");
                assert_eq!(message, "Invalid ID.");
            }
            other => panic!("expected MissingOnBackend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_faults_pass_through() {
        let (transport, adapter) = adapter();
        transport.push_fault(401, "Unauthorized").await;

        let err = adapter.create(json!({"name": "Zone"})).await.unwrap_err();
        match err {
            ConnectorError::Transport(TransportError::Fault { code, message }) => {
                assert_eq!(code, 401);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("expected transport fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_fault_errors_pass_through() {
        let (transport, adapter) = adapter();
        transport
            .push_error(TransportError::Decode("unexpected end of input".to_string()))
            .await;

        let err = adapter.is_woo_record(1, None).await.unwrap_err();
        assert!(matches!(
            err,
            ConnectorError::Transport(TransportError::Decode(_))
        ));
        assert!(!err.is_missing_on_backend());
    }

    #[tokio::test]
    async fn test_missing_record_in_existence_check_is_error() {
        let (transport, adapter) = adapter();
        transport.push_fault(102, "Invalid ID.").await;

        let err = adapter.is_woo_record(3, None).await.unwrap_err();
        assert!(err.is_missing_on_backend());
    }
}
