//! Request validation for the users endpoints.
//!
//! Every check returns the full list of failing fields. A field reports only
//! its first failing rule.

use api_ingress::FieldError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use validator::ValidateEmail;

use crate::contract::model::{NewUser, UserPatch};

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 255;
pub const AGE_MIN: u64 = 1;
pub const AGE_MAX: u64 = 120;

const NAME_LENGTH_MSG: &str = "Name must be between 2 and 100 characters";
const NAME_CHARSET_MSG: &str = "Name may only contain letters and spaces";
const EMAIL_FORMAT_MSG: &str = "Must be a valid email";
const EMAIL_LENGTH_MSG: &str = "Email must not exceed 255 characters";
const AGE_RANGE_MSG: &str = "Age must be an integer between 1 and 120";
const ID_MSG: &str = "ID must be a positive integer";
const EMPTY_UPDATE_MSG: &str = "At least one field must be provided for update";

/// Trim leading and trailing whitespace of every top-level string field.
pub fn sanitize(body: &mut Value) {
    if let Value::Object(map) = body {
        for v in map.values_mut() {
            if let Value::String(s) = v {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_owned();
                }
            }
        }
    }
}

pub fn validate_user_id(raw: &str) -> Result<u64, FieldError> {
    raw.parse::<u64>()
        .ok()
        .filter(|&id| id > 0)
        .ok_or_else(|| FieldError::new("id", ID_MSG, Some(&Value::String(raw.to_owned()))))
}

pub fn validate_create(body: &Value) -> Result<NewUser, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = required(body, "name", "Name is required", &mut errors)
        .and_then(|v| collect(check_name(v), &mut errors));
    let email = required(body, "email", "Email is required", &mut errors)
        .and_then(|v| collect(check_email(v), &mut errors));
    let age = required(body, "age", "Age is required", &mut errors)
        .and_then(|v| collect(check_age(v), &mut errors));

    match (name, email, age) {
        (Some(name), Some(email), Some(age)) if errors.is_empty() => Ok(NewUser { name, email, age }),
        _ => Err(errors),
    }
}

/// Validate the path id and a partial body. Absent and `null` fields are left untouched.
pub fn validate_update(raw_id: &str, body: &Value) -> Result<(u64, UserPatch), Vec<FieldError>> {
    let mut errors = Vec::new();

    let id = collect(validate_user_id(raw_id), &mut errors);
    let patch = UserPatch {
        name: present(body, "name").and_then(|v| collect(check_name(v), &mut errors)),
        email: present(body, "email").and_then(|v| collect(check_email(v), &mut errors)),
        age: present(body, "age").and_then(|v| collect(check_age(v), &mut errors)),
    };

    if !is_filled(present(body, "name"))
        && !is_filled(present(body, "email"))
        && present(body, "age").is_none()
    {
        errors.push(FieldError::new("body", EMPTY_UPDATE_MSG, Some(body)));
    }

    match id {
        Some(id) if errors.is_empty() => Ok((id, patch)),
        _ => Err(errors),
    }
}

fn collect<T>(res: Result<T, FieldError>, errors: &mut Vec<FieldError>) -> Option<T> {
    res.map_err(|e| errors.push(e)).ok()
}

fn present<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|v| !v.is_null())
}

fn is_filled(v: Option<&Value>) -> bool {
    match v {
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
        None => false,
    }
}

fn required<'a>(
    body: &'a Value,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Value> {
    let v = present(body, field);
    if is_filled(v) {
        v
    } else {
        errors.push(FieldError::new(field, message, body.get(field)));
        None
    }
}

fn check_name(v: &Value) -> Result<String, FieldError> {
    static NAME_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[\p{Latin}\s]+$").expect("valid regex"));

    let Value::String(s) = v else {
        return Err(FieldError::new("name", NAME_CHARSET_MSG, Some(v)));
    };
    let len = s.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(FieldError::new("name", NAME_LENGTH_MSG, Some(v)));
    }
    if !NAME_RE.is_match(s) {
        return Err(FieldError::new("name", NAME_CHARSET_MSG, Some(v)));
    }
    Ok(s.clone())
}

/// Valid syntax, then lowercased, then length-checked.
fn check_email(v: &Value) -> Result<String, FieldError> {
    let Value::String(s) = v else {
        return Err(FieldError::new("email", EMAIL_FORMAT_MSG, Some(v)));
    };
    if !s.validate_email() {
        return Err(FieldError::new("email", EMAIL_FORMAT_MSG, Some(v)));
    }
    let normalized = s.to_lowercase();
    if normalized.chars().count() > EMAIL_MAX {
        return Err(FieldError::new("email", EMAIL_LENGTH_MSG, Some(v)));
    }
    Ok(normalized)
}

/// Integers, integral floats and numeric strings are accepted.
fn check_age(v: &Value) -> Result<u32, FieldError> {
    let parsed = match v {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= AGE_MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .filter(|a| (AGE_MIN..=AGE_MAX).contains(a))
        .and_then(|a| u32::try_from(a).ok())
        .ok_or_else(|| FieldError::new("age", AGE_RANGE_MSG, Some(v)))
}
