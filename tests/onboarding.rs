mod common;

use interservice::connectors::onboarding::provisioning::{
    TEST_ROLE_NAME, TEST_USER_PHONE_NUMBER, TEST_USER_PIN,
};
use interservice::connectors::{
    ConnectorError, OnboardingClient, OnboardingConnector, TestUserProvisioner,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_response(first_name: Option<&str>, scopes: &[&str]) -> Value {
    json!({
        "profile": {
            "id": "profile-1",
            "primaryPhone": TEST_USER_PHONE_NUMBER,
            "userBioData": { "firstName": first_name }
        },
        "auth": {
            "customToken": "custom",
            "id_token": "user-id-token",
            "uid": "uid-1",
            "scopes": scopes
        }
    })
}

fn provisioner(server: &MockServer, scopes: &[&str]) -> TestUserProvisioner {
    TestUserProvisioner::new(
        common::isc_for(server, "onboarding"),
        scopes.iter().map(|scope| scope.to_string()).collect(),
    )
}

async fn phone_in_use(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/testing/verify_phone"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "code": 2, "message": "phone number in use" })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn register_user_returns_the_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/internal/register_user"))
        .and(body_json(json!({ "phoneNumber": "+254711223344" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "profile-9",
            "primaryPhone": "+254711223344"
        })))
        .mount(&server)
        .await;

    let connector = OnboardingClient::new(common::isc_for(&server, "onboarding"));
    let profile = connector
        .register_user(&json!({ "phoneNumber": "+254711223344" }))
        .await
        .unwrap();

    assert_eq!(profile.id, "profile-9");
    assert_eq!(profile.primary_phone.as_deref(), Some("+254711223344"));
    assert_eq!(profile.user_bio_data.first_name, None);
}

#[tokio::test]
async fn register_user_failure_carries_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("phone taken"))
        .mount(&server)
        .await;

    let connector = OnboardingClient::new(common::isc_for(&server, "onboarding"));
    let err = connector.register_user(&json!({})).await.unwrap_err();

    assert_eq!(err.status().map(|status| status.as_u16()), Some(400));
}

#[tokio::test]
async fn register_user_with_an_unparseable_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let connector = OnboardingClient::new(common::isc_for(&server, "onboarding"));
    let err = connector.register_user(&json!({})).await.unwrap_err();

    assert!(matches!(err, ConnectorError::InvalidResponse(body) if body == "<html>"));
}

#[tokio::test]
async fn new_test_user_is_created_and_given_bio_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/testing/verify_phone"))
        .and(body_json(json!({ "phoneNumber": TEST_USER_PHONE_NUMBER })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "otp": "987654" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/testing/create_user_by_phone"))
        .and(body_json(json!({
            "phoneNumber": TEST_USER_PHONE_NUMBER,
            "pin": TEST_USER_PIN,
            "flavour": "CONSUMER",
            "otp": "987654"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_response(None, &[])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/testing/update_user_profile"))
        .and(body_json(json!({
            "uid": "uid-1",
            "firstName": "Dumbledore 'the'",
            "lastName": "Greatest Test User",
            "gender": "male",
            "dateOfBirth": "2000-01-01"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let user = provisioner(&server, &[])
        .create_or_login_test_phone_number_user()
        .await
        .unwrap();

    assert_eq!(user.auth.uid, "uid-1");
    assert_eq!(user.profile.id, "profile-1");
}

#[tokio::test]
async fn existing_test_user_is_logged_in() {
    let server = MockServer::start().await;
    phone_in_use(&server).await;
    Mock::given(method("POST"))
        .and(path("/testing/login_by_phone"))
        .and(body_json(json!({
            "phoneNumber": TEST_USER_PHONE_NUMBER,
            "pin": TEST_USER_PIN,
            "flavour": "CONSUMER"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_response(Some("Dumbledore 'the'"), &[])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/testing/create_user_by_phone"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/testing/update_user_profile"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let user = provisioner(&server, &[])
        .create_or_login_test_phone_number_user()
        .await
        .unwrap();

    assert_eq!(user.profile.user_bio_data.first_name.as_deref(), Some("Dumbledore 'the'"));
}

#[tokio::test]
async fn other_verification_failures_are_not_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/testing/verify_phone"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "code": 7 })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/testing/login_by_phone"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = provisioner(&server, &[])
        .create_or_login_test_phone_number_user()
        .await
        .unwrap_err();

    assert_eq!(err.status().map(|status| status.as_u16()), Some(500));
}

#[tokio::test]
async fn authorized_user_gets_the_test_role() {
    let server = MockServer::start().await;
    phone_in_use(&server).await;
    Mock::given(method("POST"))
        .and(path("/testing/login_by_phone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_response(Some("D"), &[])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/roles/remove_role"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/roles/create_role"))
        .and(header("Authorization", "Bearer user-id-token"))
        .and(body_json(json!({
            "name": TEST_ROLE_NAME,
            "description": "A role for running tests",
            "scopes": ["role.view", "role.create"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "role-1",
            "name": TEST_ROLE_NAME,
            "active": true,
            "scopes": ["role.view", "role.create"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/roles/assign_role"))
        .and(header("Authorization", "Bearer user-id-token"))
        .and(body_json(json!({ "userID": "profile-1", "roleID": "role-1" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    provisioner(&server, &["role.view", "role.create"])
        .create_or_login_test_authorized_user()
        .await
        .unwrap();
}

#[tokio::test]
async fn stale_test_role_is_replaced() {
    let server = MockServer::start().await;
    phone_in_use(&server).await;
    Mock::given(method("POST"))
        .and(path("/testing/login_by_phone"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_response(Some("D"), &["role.view"])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/roles/remove_role"))
        .and(body_json(json!({ "name": TEST_ROLE_NAME })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/roles/create_role"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "role-2",
            "name": TEST_ROLE_NAME
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/roles/assign_role"))
        .and(body_json(json!({ "userID": "profile-1", "roleID": "role-2" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    provisioner(&server, &["role.view", "role.create"])
        .create_or_login_test_authorized_user()
        .await
        .unwrap();
}

#[tokio::test]
async fn user_with_all_scopes_keeps_their_role() {
    let server = MockServer::start().await;
    phone_in_use(&server).await;
    Mock::given(method("POST"))
        .and(path("/testing/login_by_phone"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_response(Some("D"), &["role.view"])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/roles/create_role"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    provisioner(&server, &["role.view"])
        .create_or_login_test_authorized_user()
        .await
        .unwrap();
}

#[tokio::test]
async fn role_creation_failure_is_reported() {
    let server = MockServer::start().await;
    phone_in_use(&server).await;
    Mock::given(method("POST"))
        .and(path("/testing/login_by_phone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_response(Some("D"), &[])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/roles/create_role"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = provisioner(&server, &["role.view"])
        .create_or_login_test_authorized_user()
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "failed to create test role, with status code 200 OK");
}

#[tokio::test]
async fn removing_a_missing_user_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/testing/remove_user"))
        .and(body_json(json!({ "phoneNumber": TEST_USER_PHONE_NUMBER })))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    provisioner(&server, &[])
        .remove_test_phone_number_user()
        .await
        .unwrap();
}

#[tokio::test]
async fn authorized_user_teardown_is_best_effort() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/testing/login_by_phone"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/testing/remove_user"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    provisioner(&server, &[])
        .remove_test_authorized_user()
        .await
        .unwrap();
}

#[tokio::test]
async fn authorized_user_teardown_removes_role_then_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/testing/login_by_phone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_response(Some("D"), &[])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/roles/remove_role"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/testing/remove_user"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    provisioner(&server, &[])
        .remove_test_authorized_user()
        .await
        .unwrap();
}

#[tokio::test]
async fn graphql_headers_use_the_test_users_id_token() {
    let server = MockServer::start().await;
    phone_in_use(&server).await;
    Mock::given(method("POST"))
        .and(path("/testing/login_by_phone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_response(Some("D"), &[])))
        .mount(&server)
        .await;

    let provisioner = provisioner(&server, &[]);
    assert_eq!(
        provisioner.bearer_token_header().await.unwrap(),
        "Bearer user-id-token"
    );

    let headers = provisioner.graphql_headers().await.unwrap();
    assert_eq!(headers["Authorization"], "Bearer user-id-token");
    assert_eq!(headers["Content-Type"], "application/json");
    assert_eq!(headers["Accept"], "application/json");
}
