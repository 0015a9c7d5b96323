// ============================================================================
// Schema Registry Client Tests
// ============================================================================
//
// HTTP behaviour of RegistryClient against a mocked registry.
//
// ============================================================================

mod test_utils;

use relay_error::RelayError;
use schema_relay::message::DomainRecord;
use schema_relay::schema::{RegistryClient, SchemaCodec, SchemaRegistry, SchemaType, wire};
use serde_json::json;
use test_utils::*;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RegistryClient {
    RegistryClient::new(server.uri(), reqwest::Client::new())
}

#[tokio::test]
async fn test_probe_succeeds_when_registry_answers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subjects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["cars-in"])))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).probe().await.unwrap();
}

#[tokio::test]
async fn test_probe_error_status_is_registry_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subjects"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).probe().await.unwrap_err();

    assert!(matches!(err, RelayError::RegistryUnavailable(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_probe_unreachable_is_registry_unavailable() {
    // Nothing listens on the discard port
    let client = RegistryClient::new("http://127.0.0.1:9", reqwest::Client::new());

    let err = client.probe().await.unwrap_err();

    assert!(matches!(err, RelayError::RegistryUnavailable(_)));
}

#[tokio::test]
async fn test_schema_by_id_passes_subject() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas/ids/7"))
        .and(query_param("subject", "cars-in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schema": "{\"type\":\"string\"}",
            "schemaType": "JSON"
        })))
        .mount(&server)
        .await;

    let schema = client_for(&server)
        .schema_by_id("cars-in", 7)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(schema.id, 7);
    assert_eq!(schema.schema_type, SchemaType::Json);
    assert_eq!(schema.schema, r#"{"type":"string"}"#);
}

#[tokio::test]
async fn test_schema_by_id_not_found_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas/ids/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error_code": 40403,
            "message": "Schema not found"
        })))
        .mount(&server)
        .await;

    let schema = client_for(&server).schema_by_id("cars-in", 404).await.unwrap();

    assert!(schema.is_none());
}

#[tokio::test]
async fn test_latest_schema_without_type_is_avro() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subjects/cars-out/versions/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subject": "cars-out",
            "version": 3,
            "id": 21,
            "schema": "{\"type\":\"record\",\"name\":\"Car\",\"fields\":[]}"
        })))
        .mount(&server)
        .await;

    let schema = client_for(&server)
        .latest_schema("cars-out")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(schema.id, 21);
    assert_eq!(schema.schema_type, SchemaType::Avro);
}

#[tokio::test]
async fn test_register_schema_posts_json_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subjects/cars-out/versions"))
        .and(body_partial_json(json!({ "schemaType": "JSON" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 12 })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client_for(&server)
        .register_schema("cars-out", &json!({ "type": "object" }))
        .await
        .unwrap();

    assert_eq!(id, 12);
}

#[tokio::test]
async fn test_register_schema_error_carries_registry_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subjects/cars-out/versions"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error_code": 409,
            "message": "Schema being registered is incompatible with an earlier schema"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .register_schema("cars-out", &json!({ "type": "object" }))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("incompatible with an earlier schema"));
}

#[tokio::test]
async fn test_codec_over_http_registers_once_and_frames_with_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subjects/cars-out/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 12 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut codec = SchemaCodec::new(client_for(&server), &registry_config(true, true));
    let record = DomainRecord {
        user: "Mike".to_string(),
        vehicle: "Ford".to_string(),
        color: "Black".to_string(),
    };

    for _ in 0..2 {
        let bytes = codec.encode(OUTBOUND_TOPIC, &record).await.unwrap();
        let (schema_id, body) = wire::unframe(&bytes).unwrap();
        assert_eq!(schema_id, 12);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(body).unwrap(),
            json!({"user": "Mike", "car": "Ford", "color": "Black"})
        );
    }
}
