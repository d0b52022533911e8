//! Parametrized cases and the runner that executes them in order.
//!
//! # Design
//! A case is one verified operation plus the status it is expected to return,
//! described as data so suites can live in JSON files. Order matters: the
//! built-in suite creates pets, users and orders before the reads and deletes
//! that depend on them. A failing case is recorded and the run continues.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{CaseFileError, VerifyError};
use crate::http::HttpResponse;
use crate::transport::Transport;
use crate::verify::Verifier;

const BUILTIN_CASES: &str = include_str!("../cases/petstore.json");

/// A path key as written in a case file. Keys that do not fit an `i64` (or
/// are not numbers at all) are written as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    AddNewPet { body: Value },
    GetPetsByStatus { status: String },
    GetPetById { id: Key },
    DeletePet { id: Key },
    GetUserByUsername { username: Key },
    CreateUser { body: Value },
    UpdateUser { username: Key, body: Value },
    DeleteUserByUsername { username: Key },
    LoginUser { username: String, password: String },
    LogoutUser,
    PlaceOrder { body: Value },
    GetOrderById { id: Key },
    DeleteOrder { id: Key },
}

impl Operation {
    pub fn run<T: Transport>(&self, verifier: &Verifier<T>, expected: u16) -> Result<HttpResponse, VerifyError> {
        match self {
            Operation::AddNewPet { body } => verifier.add_new_pet(body, expected),
            Operation::GetPetsByStatus { status } => verifier.get_pets_by_status(status, expected),
            Operation::GetPetById { id } => verifier.get_pet_by_id(id, expected),
            Operation::DeletePet { id } => verifier.delete_pet(id, expected),
            Operation::GetUserByUsername { username } => verifier.get_user_by_username(username, expected),
            Operation::CreateUser { body } => verifier.create_user(body, expected),
            Operation::UpdateUser { username, body } => verifier.update_user(username, body, expected),
            Operation::DeleteUserByUsername { username } => {
                verifier.delete_user_by_username(username, expected)
            }
            Operation::LoginUser { username, password } => verifier.login_user(username, password, expected),
            Operation::LogoutUser => verifier.logout_user(expected),
            Operation::PlaceOrder { body } => verifier.place_order(body, expected),
            Operation::GetOrderById { id } => verifier.get_order_by_id(id, expected),
            Operation::DeleteOrder { id } => verifier.delete_order(id, expected),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::AddNewPet { body } => write!(f, "add_new_pet[{body}]"),
            Operation::GetPetsByStatus { status } => write!(f, "get_pets_by_status[{status}]"),
            Operation::GetPetById { id } => write!(f, "get_pet_by_id[{id}]"),
            Operation::DeletePet { id } => write!(f, "delete_pet[{id}]"),
            Operation::GetUserByUsername { username } => write!(f, "get_user_by_username[{username}]"),
            Operation::CreateUser { body } => write!(f, "create_user[{body}]"),
            Operation::UpdateUser { username, .. } => write!(f, "update_user[{username}]"),
            Operation::DeleteUserByUsername { username } => {
                write!(f, "delete_user_by_username[{username}]")
            }
            Operation::LoginUser { username, .. } => write!(f, "login_user[{username}]"),
            Operation::LogoutUser => f.write_str("logout_user"),
            Operation::PlaceOrder { body } => write!(f, "place_order[{body}]"),
            Operation::GetOrderById { id } => write!(f, "get_order_by_id[{id}]"),
            Operation::DeleteOrder { id } => write!(f, "delete_order[{id}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(flatten)]
    pub operation: Operation,
    pub expected: u16,
}

impl Case {
    pub fn name(&self) -> String {
        format!("{}-{}", self.operation, self.expected)
    }
}

#[derive(Debug, Default)]
pub struct Report {
    pub passed: usize,
    pub failed: Vec<(String, VerifyError)>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed.len()
    }
}

pub fn builtin_cases() -> Result<Vec<Case>, serde_json::Error> {
    serde_json::from_str(BUILTIN_CASES)
}

pub fn load_cases(path: &Path) -> Result<Vec<Case>, CaseFileError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Run `cases` in order, skipping those whose name does not contain `filter`.
pub fn run<T: Transport>(verifier: &Verifier<T>, cases: &[Case], filter: Option<&str>) -> Report {
    let mut report = Report::default();
    for case in cases {
        let name = case.name();
        if filter.is_some_and(|f| !name.contains(f)) {
            continue;
        }
        match case.operation.run(verifier, case.expected) {
            Ok(_) => {
                info!(case = %name, "PASSED");
                report.passed += 1;
            }
            Err(e) => {
                warn!(case = %name, error = %e, "FAILED");
                report.failed.push((name, e));
            }
        }
    }
    report
}
