//! Verified operations: one request, one status assertion, and on the
//! success path one confirmatory read.
//!
//! # Design
//! Every operation takes the status the caller expects. A 2xx expectation
//! means the mutation must be externally observable, so the operation reads
//! it back (fetch-by-id after a create, expect-404 after a delete). Any other
//! expectation means the call is assumed to have had no effect and the
//! read-back is skipped.
//!
//! Path keys are `impl Display` so callers can probe the service with
//! integers, strings, or numbers too large for any server-side id type.

use std::fmt::Display;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{PetStoreClient, Resource};
use crate::error::VerifyError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Runs verified operations against one service through one transport.
#[derive(Debug, Clone)]
pub struct Verifier<T> {
    client: PetStoreClient,
    transport: T,
}

impl<T: Transport> Verifier<T> {
    pub fn new(client: PetStoreClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PetStoreClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, VerifyError> {
        Ok(self.transport.execute(&request)?)
    }

    // -----------------------------------------------------------------------
    // Pet
    // -----------------------------------------------------------------------

    /// POST `pet`, then read the pet back by the id the service stored it
    /// under.
    pub fn add_new_pet(&self, body: &Value, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "add_new_pet";
        let response = self.send(self.client.build_post(Resource::Pet, None, body)?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            match created_identifier(body, &response) {
                Some(id) => {
                    self.get_pet_by_id(&id, 200)?;
                }
                None => skip_read_back(OP, "id"),
            }
        }
        passed(OP, &response);
        Ok(response)
    }

    /// GET `pet/findByStatus`. `status` may be a comma-separated list; on
    /// success every returned pet must carry one of the listed statuses.
    pub fn get_pets_by_status(&self, status: &str, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "get_pets_by_status";
        let request = self
            .client
            .build_get(Resource::Pet, Some("findByStatus"), &[("status", status)])?;
        let response = self.send(request)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            expect_json_content_type(OP, &response)?;
            let body = parse_body(OP, &response)?;
            let pets = body.as_array().ok_or_else(|| VerifyError::MalformedBody {
                operation: OP,
                reason: "expected a JSON array".to_string(),
            })?;
            let wanted: Vec<&str> = status.split(',').map(str::trim).collect();
            for pet in pets {
                let actual = pet
                    .get("status")
                    .map_or_else(|| "<missing>".to_string(), scalar_text);
                if !wanted.contains(&actual.as_str()) {
                    return Err(VerifyError::FieldMismatch {
                        operation: OP,
                        field: "status".to_string(),
                        expected: status.to_string(),
                        actual,
                    });
                }
            }
            debug!(count = pets.len(), status, "pets matched status");
        }
        passed(OP, &response);
        Ok(response)
    }

    pub fn get_pet_by_id(&self, id: impl Display, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "get_pet_by_id";
        let id = id.to_string();
        let response = self.send(self.client.build_get(Resource::Pet, Some(&id), &[])?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            expect_field(OP, &parse_body(OP, &response)?, "id", &id)?;
        }
        passed(OP, &response);
        Ok(response)
    }

    /// DELETE `pet/{id}`. On success the service must echo the id and the pet
    /// must then be gone.
    pub fn delete_pet(&self, id: impl Display, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "delete_pet";
        let id = id.to_string();
        let response = self.send(self.client.build_delete(Resource::Pet, Some(&id))?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            expect_field(OP, &parse_body(OP, &response)?, "message", &id)?;
            self.get_pet_by_id(&id, 404)?;
        }
        passed(OP, &response);
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // User
    // -----------------------------------------------------------------------

    pub fn get_user_by_username(
        &self,
        username: impl Display,
        expected: u16,
    ) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "get_user_by_username";
        let username = username.to_string();
        let response = self.send(self.client.build_get(Resource::User, Some(&username), &[])?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            expect_field(OP, &parse_body(OP, &response)?, "username", &username)?;
        }
        passed(OP, &response);
        Ok(response)
    }

    /// POST `user`. Bodies without a `username` cannot be read back.
    pub fn create_user(&self, body: &Value, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "create_user";
        let response = self.send(self.client.build_post(Resource::User, None, body)?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            match identifier(body, "username") {
                Some(username) => {
                    self.get_user_by_username(&username, 200)?;
                }
                None => skip_read_back(OP, "username"),
            }
        }
        passed(OP, &response);
        Ok(response)
    }

    /// PUT `user/{username}`.
    ///
    /// On the success path the user must exist beforehand, and afterwards the
    /// record (looked up under the body's username if it renames the user)
    /// must reflect every submitted field.
    pub fn update_user(
        &self,
        username: impl Display,
        body: &Value,
        expected: u16,
    ) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "update_user";
        let username = username.to_string();
        if is_success(expected) {
            self.get_user_by_username(&username, 200)?;
        }

        let response = self.send(self.client.build_put(Resource::User, Some(&username), body)?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            let current = identifier(body, "username").unwrap_or(username);
            let stored = parse_body(OP, &self.get_user_by_username(&current, 200)?)?;
            if let Some(fields) = body.as_object() {
                for (field, submitted) in fields {
                    let actual = stored.get(field);
                    if actual != Some(submitted) {
                        return Err(VerifyError::FieldMismatch {
                            operation: OP,
                            field: field.clone(),
                            expected: submitted.to_string(),
                            actual: actual.map_or_else(|| "<missing>".to_string(), Value::to_string),
                        });
                    }
                }
            }
        }
        passed(OP, &response);
        Ok(response)
    }

    pub fn delete_user_by_username(
        &self,
        username: impl Display,
        expected: u16,
    ) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "delete_user_by_username";
        let username = username.to_string();
        let response = self.send(self.client.build_delete(Resource::User, Some(&username))?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            self.get_user_by_username(&username, 404)?;
        }
        passed(OP, &response);
        Ok(response)
    }

    pub fn login_user(&self, username: &str, password: &str, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "login_user";
        let request = self.client.build_get(
            Resource::User,
            Some("login"),
            &[("username", username), ("password", password)],
        )?;
        let response = self.send(request)?;
        expect_status(OP, &response, expected)?;
        passed(OP, &response);
        Ok(response)
    }

    pub fn logout_user(&self, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "logout_user";
        let response = self.send(self.client.build_get(Resource::User, Some("logout"), &[])?)?;
        expect_status(OP, &response, expected)?;
        passed(OP, &response);
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Store
    // -----------------------------------------------------------------------

    pub fn place_order(&self, body: &Value, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "place_order";
        let response = self.send(self.client.build_post(Resource::Store, Some("order"), body)?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            match created_identifier(body, &response) {
                Some(id) => {
                    self.get_order_by_id(&id, 200)?;
                }
                None => skip_read_back(OP, "id"),
            }
        }
        passed(OP, &response);
        Ok(response)
    }

    pub fn get_order_by_id(&self, id: impl Display, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "get_order_by_id";
        let id = id.to_string();
        let key = format!("order/{id}");
        let response = self.send(self.client.build_get(Resource::Store, Some(&key), &[])?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            expect_field(OP, &parse_body(OP, &response)?, "id", &id)?;
        }
        passed(OP, &response);
        Ok(response)
    }

    pub fn delete_order(&self, id: impl Display, expected: u16) -> Result<HttpResponse, VerifyError> {
        const OP: &str = "delete_order";
        let id = id.to_string();
        let key = format!("order/{id}");
        let response = self.send(self.client.build_delete(Resource::Store, Some(&key))?)?;
        expect_status(OP, &response, expected)?;

        if is_success(expected) {
            expect_field(OP, &parse_body(OP, &response)?, "message", &id)?;
            self.get_order_by_id(&id, 404)?;
        }
        passed(OP, &response);
        Ok(response)
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn expect_status(operation: &'static str, response: &HttpResponse, expected: u16) -> Result<(), VerifyError> {
    if response.status == expected {
        return Ok(());
    }
    Err(VerifyError::UnexpectedStatus {
        operation,
        expected,
        actual: response.status,
        body: response.body.clone(),
    })
}

fn expect_json_content_type(operation: &'static str, response: &HttpResponse) -> Result<(), VerifyError> {
    let actual = response.header("content-type").unwrap_or_default();
    let media_type = actual.split(';').next().unwrap_or_default().trim();
    if media_type.eq_ignore_ascii_case("application/json") {
        return Ok(());
    }
    Err(VerifyError::UnexpectedContentType {
        operation,
        actual: actual.to_string(),
    })
}

fn parse_body(operation: &'static str, response: &HttpResponse) -> Result<Value, VerifyError> {
    response.json().map_err(|e| VerifyError::MalformedBody {
        operation,
        reason: e.to_string(),
    })
}

/// Compare a scalar field against its expected textual form. Numbers compare
/// by their decimal rendering, so `18` matches the path key `"18"`.
fn expect_field(operation: &'static str, value: &Value, field: &str, expected: &str) -> Result<(), VerifyError> {
    let actual = value
        .get(field)
        .map_or_else(|| "<missing>".to_string(), scalar_text);
    if actual == expected {
        return Ok(());
    }
    Err(VerifyError::FieldMismatch {
        operation,
        field: field.to_string(),
        expected: expected.to_string(),
        actual,
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The identifier a created entity can be read back by, if the value names one.
fn identifier(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn response_identifier(response: &HttpResponse, field: &str) -> Option<String> {
    identifier(&response.json().ok()?, field)
}

/// The id a create was stored under. The service answers with the stored
/// entity, so its id wins; a body id of `0` asks the service to assign one.
fn created_identifier(body: &Value, response: &HttpResponse) -> Option<String> {
    response_identifier(response, "id").or_else(|| identifier(body, "id").filter(|id| id != "0"))
}

fn skip_read_back(operation: &'static str, field: &str) {
    warn!(operation, field, "body names no identifier, skipping read-back");
}

fn passed(operation: &'static str, response: &HttpResponse) {
    info!(operation, status = response.status, "verified");
}
