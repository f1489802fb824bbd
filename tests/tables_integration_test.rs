use fmodata::{Connection, Credential, FmODataClient, FmODataError, FmODataResult, Table};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const METADATA: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
  <edmx:DataServices>
    <Schema Namespace="Contacts" xmlns="http://docs.oasis-open.org/odata/ns/edm">
      <EntityType Name="Projects_">
        <Property Name="Title" Type="Edm.String"/>
        <Property Name="Status" Type="Edm.String"/>
      </EntityType>
      <Action Name="Script.Close_Project"/>
      <Action Name="Script.Archive"/>
      <EntityContainer Name="Contacts_Container">
        <EntitySet Name="Orders" EntityType="Contacts.Orders_"/>
        <EntitySet Name="Customers" EntityType="Contacts.Customers_"/>
        <ActionImport Name="Script.Archive" Action="Contacts.Script.Archive"/>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

/// Helper to create a test client against the mock server
fn create_test_client(server: &MockServer, credential: Credential) -> FmODataResult<FmODataClient> {
    FmODataClient::new(server.uri(), "Contacts", credential)
}

/// Test direct table listing
#[tokio::test]
async fn test_get_tables_direct() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fmi/odata/v4/Contacts"))
        .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@odata.context": "https://fm.example.com/fmi/odata/v4/Contacts/$metadata",
            "value": [
                {"name": "Customers", "kind": "EntitySet", "url": "Customers"},
                {"name": "Orders", "kind": "EntitySet", "url": "Orders"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, Credential::basic("admin", "admin"))
        .expect("Failed to create client");
    let tables = client.tables().get_tables().await
        .expect("Failed to list tables");

    // server order is kept
    assert_eq!(
        tables.value,
        vec![Table::entity_set("Customers"), Table::entity_set("Orders")]
    );
    assert_eq!(tables.context, "https://fm.example.com/fmi/odata/v4/Contacts/$metadata");
}

/// Test a listing whose entries leave out `kind`
#[tokio::test]
async fn test_get_tables_without_kind() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fmi/odata/v4/Contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"name": "Orders", "url": "Orders"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, Credential::basic("admin", "admin"))
        .expect("Failed to create client");
    let tables = client.tables().get_tables().await
        .expect("Failed to list tables");
    assert_eq!(tables.value, vec![Table::entity_set("Orders")]);
}

/// Test the unauthorized fallback through OttoFMS paths
#[tokio::test]
async fn test_get_tables_unauthorized_falls_back_to_metadata() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/otto/fmi/odata/v4/Contacts"))
        .and(header("authorization", "Bearer dk_test"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/otto/fmi/odata/v4/Contacts/$metadata"))
        .and(header("accept", "application/xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(METADATA))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, Credential::api_key("dk_test", None).unwrap())
        .expect("Failed to create client");
    let tables = client.tables().get_tables().await
        .expect("Fallback should rebuild the table list");

    assert_eq!(
        tables.value,
        vec![Table::entity_set("Orders"), Table::entity_set("Customers")]
    );
    assert_eq!(
        tables.context,
        format!("{}/otto/fmi/odata/v4/Contacts/$metadata", server.uri())
    );
    assert_eq!(tables.count, None);
}

/// Test that non-auth failures never reach $metadata
#[tokio::test]
async fn test_get_tables_server_error_propagates() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fmi/odata/v4/Contacts"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": "-1", "message": "Internal error"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fmi/odata/v4/Contacts/$metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_string(METADATA))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server, Credential::basic("admin", "admin"))
        .expect("Failed to create client");
    let err = client.tables().get_tables().await
        .expect_err("A 500 must not trigger the fallback");

    match err {
        FmODataError::OData { status, message, body } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal error");
            assert!(body.contains("Internal error"));
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}

/// Test that a 404 listing is not treated as unauthorized
#[tokio::test]
async fn test_get_tables_not_found_propagates() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fmi/odata/v4/Contacts"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server, Credential::basic("admin", "admin"))
        .expect("Failed to create client");
    let err = client.tables().get_tables().await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(!err.is_unauthorized());
}

/// Test that Otto v3 keys talk to the configured proxy port without a path prefix
#[tokio::test]
async fn test_v3_key_uses_port_and_plain_path() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;
    let port = server.address().port();

    Mock::given(method("GET"))
        .and(path("/fmi/odata/v4/Contacts/$metadata"))
        .and(header("authorization", "Bearer KEY_test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(METADATA))
        .expect(1)
        .mount(&server)
        .await;

    // host without a port: the credential supplies it
    let connection = Connection::new("http://127.0.0.1", "Contacts").unwrap();
    let credential = Credential::api_key("KEY_test", Some(port)).unwrap();
    let client = FmODataClient::with_transport(
        connection,
        &credential,
        fmodata::ReqwestTransport::new().unwrap(),
    )
    .expect("Failed to create client");

    let xml = client.tables().get_metadata().await
        .expect("Failed to fetch metadata");
    assert!(xml.contains("EntitySet"));
}

/// Test field and script enumeration
#[tokio::test]
async fn test_list_fields_and_scripts() {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fmi/odata/v4/Contacts/$metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_string(METADATA))
        .expect(3)
        .mount(&server)
        .await;

    let client = create_test_client(&server, Credential::basic("admin", "admin"))
        .expect("Failed to create client");

    let fields = client.tables().list_fields("Projects").await.unwrap();
    assert_eq!(fields, ["Status", "Title"]);

    let missing = client.tables().list_fields("Nope").await.unwrap();
    assert!(missing.is_empty());

    let scripts = client.scripts().list_scripts().await.unwrap();
    assert_eq!(scripts, ["Archive", "Close_Project"]);
}
