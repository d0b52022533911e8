//! Verified operations against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port so state never
//! leaks between tests, then drives the verifier over real HTTP with the
//! production `ureq` transport.

use petstore_core::suite::{self, Case, Key, Operation};
use petstore_core::{PetStoreClient, UreqTransport, Verifier, VerifyError};
use serde_json::{json, Value};

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}{}", mock_server::BASE_PATH)
}

fn verifier() -> Verifier<UreqTransport> {
    let client = PetStoreClient::new(&start_server(), "test_key_corti").unwrap();
    Verifier::new(client, UreqTransport::new())
}

fn dog(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "category": {"id": 15, "name": "string"},
        "name": "this is a dog",
        "photoUrls": ["string"],
        "tags": [{"id": 0, "name": "string"}],
        "status": status
    })
}

#[test]
fn pet_lifecycle() {
    let v = verifier();

    // Step 1: create and read back.
    v.add_new_pet(&dog(18, "available"), 200).unwrap();
    v.add_new_pet(&dog(19, "sold"), 200).unwrap();

    // Step 2: invalid body is rejected and not read back.
    v.add_new_pet(&json!({"type": "this is not a dict"}), 405).unwrap();

    // Step 3: status filter only returns matching pets.
    let response = v.get_pets_by_status("available", 200).unwrap();
    let pets = response.json().unwrap();
    assert_eq!(pets.as_array().unwrap().len(), 1);
    v.get_pets_by_status("sold", 200).unwrap();
    v.get_pets_by_status("pending", 200).unwrap();
    v.get_pets_by_status("some status", 400).unwrap();

    // Step 4: lookups.
    v.get_pet_by_id(18, 200).unwrap();
    v.get_pet_by_id("sold", 400).unwrap();
    v.get_pet_by_id(849416185418512837373737537u128, 404).unwrap();

    // Step 5: delete confirms the 404 itself.
    v.delete_pet(18, 200).unwrap();
    v.get_pet_by_id(18, 404).unwrap();

    // Step 6: deleting again is a 404.
    v.delete_pet(18, 404).unwrap();
}

#[test]
fn add_new_pet_without_id_reads_back_assigned_id() {
    let v = verifier();
    let response = v
        .add_new_pet(&json!({"name": "no id", "photoUrls": [], "status": "pending"}), 200)
        .unwrap();
    let id = response.json().unwrap()["id"].as_i64().unwrap();
    v.get_pet_by_id(id, 200).unwrap();
}

#[test]
fn add_new_pet_with_zero_id_reads_back_assigned_id() {
    let v = verifier();
    v.add_new_pet(&dog(18, "available"), 200).unwrap();

    let response = v.add_new_pet(&dog(0, "available"), 200).unwrap();
    assert_eq!(response.json().unwrap()["id"], 19);
    v.get_pet_by_id(19, 200).unwrap();
}

#[test]
fn get_pets_by_status_accepts_status_list() {
    let v = verifier();
    v.add_new_pet(&dog(18, "available"), 200).unwrap();
    v.add_new_pet(&dog(19, "sold"), 200).unwrap();
    v.add_new_pet(&dog(20, "pending"), 200).unwrap();

    let response = v.get_pets_by_status("available,sold", 200).unwrap();
    assert_eq!(response.json().unwrap().as_array().unwrap().len(), 2);
}

#[test]
fn deleting_missing_pet_with_success_expectation_fails() {
    let v = verifier();
    let err = v.delete_pet(18, 200).unwrap_err();
    assert!(matches!(
        err,
        VerifyError::UnexpectedStatus {
            operation: "delete_pet",
            expected: 200,
            actual: 404,
            ..
        }
    ));
}

#[test]
fn user_lifecycle() {
    let v = verifier();
    let user = json!({
        "id": 100,
        "username": "testtatata",
        "firstName": "Mr. User",
        "lastName": "Mr. his last name",
        "email": "test",
        "password": "thisisapassword",
        "phone": "string",
        "userStatus": 0
    });

    v.create_user(&user, 200).unwrap();
    v.create_user(&json!({}), 200).unwrap();
    v.create_user(&json!("should default"), 200).unwrap();

    v.get_user_by_username("testtatata", 200).unwrap();
    v.get_user_by_username(4456, 400).unwrap();
    v.get_user_by_username("Hello Mr test", 404).unwrap();

    v.login_user("testtatata", "thisisapassword", 200).unwrap();
    v.login_user("", "thisisapassword", 400).unwrap();
    v.logout_user(200).unwrap();

    let updated = json!({
        "id": 100,
        "username": "testtatata",
        "firstName": "string",
        "lastName": "string",
        "email": "string",
        "password": "string",
        "phone": "string",
        "userStatus": 0
    });
    v.update_user("testtatata", &updated, 200).unwrap();

    v.delete_user_by_username("testtatata", 200).unwrap();
    v.delete_user_by_username("testtatata", 404).unwrap();
    v.delete_user_by_username(4456, 400).unwrap();
}

#[test]
fn update_missing_user_fails_precondition() {
    let v = verifier();
    let err = v
        .update_user("nobody", &json!({"firstName": "x"}), 200)
        .unwrap_err();
    assert!(matches!(
        err,
        VerifyError::UnexpectedStatus {
            operation: "get_user_by_username",
            expected: 200,
            actual: 404,
            ..
        }
    ));
    v.update_user("nobody", &json!({"firstName": "x"}), 404).unwrap();
}

#[test]
fn logout_expecting_400_fails() {
    let v = verifier();
    let err = v.logout_user(400).unwrap_err();
    assert_eq!(err.to_string(), "logout_user: expected status 400 but got 200");
}

#[test]
fn order_lifecycle() {
    let v = verifier();
    let order = json!({"id": 5, "petId": 18, "quantity": 1, "status": "placed", "complete": false});

    v.place_order(&order, 200).unwrap();
    v.place_order(&json!({"quantity": "lots"}), 400).unwrap();
    v.get_order_by_id(5, 200).unwrap();
    v.get_order_by_id("abc", 400).unwrap();
    v.delete_order(5, 200).unwrap();
    v.delete_order(5, 404).unwrap();
}

#[test]
fn place_order_with_zero_id_reads_back_assigned_id() {
    let v = verifier();
    let response = v
        .place_order(&json!({"id": 0, "petId": 18, "quantity": 1, "status": "placed"}), 200)
        .unwrap();
    let id = response.json().unwrap()["id"].as_i64().unwrap();
    assert_ne!(id, 0);
    v.get_order_by_id(id, 200).unwrap();
}

#[test]
fn builtin_suite_passes_against_mock() {
    let v = verifier();
    let cases = suite::builtin_cases().unwrap();
    let report = suite::run(&v, &cases, None);

    let failures: Vec<String> = report
        .failed
        .iter()
        .map(|(name, e)| format!("{name}: {e}"))
        .collect();
    assert!(failures.is_empty(), "failed cases: {failures:#?}");
    assert_eq!(report.passed, cases.len());
}

#[test]
fn suite_records_failures_and_keeps_going() {
    let v = verifier();
    let cases = vec![
        Case {
            operation: Operation::LogoutUser,
            expected: 400,
        },
        Case {
            operation: Operation::GetPetById { id: Key::Int(1) },
            expected: 404,
        },
    ];
    let report = suite::run(&v, &cases, None);

    assert_eq!(report.passed, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "logout_user-400");
}

#[test]
fn suite_filter_selects_by_name() {
    let v = verifier();
    let cases = suite::builtin_cases().unwrap();
    let report = suite::run(&v, &cases, Some("get_pets_by_status"));

    assert!(report.is_success());
    assert_eq!(report.total(), 4);
}

#[test]
fn transport_failure_surfaces_as_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = PetStoreClient::new(&format!("http://{addr}/v2"), "k").unwrap();
    let v = Verifier::new(client, UreqTransport::new());

    let err = v.logout_user(200).unwrap_err();
    assert!(matches!(err, VerifyError::Transport(_)));
}
