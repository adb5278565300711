//! crates/hogarzen_core/src/validation.rs
//!
//! Pure form checks run before anything touches the network. The rules live on
//! the form structs as `validator` derives; every field is checked independently
//! so the UI can show all problems at once.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::{NewTask, TaskCategory};

pub const MIN_PASSWORD_LEN: usize = 8;
/// Out of lowercase, uppercase, digit and symbol.
pub const MIN_PASSWORD_CLASSES: usize = 3;
pub const MAX_TASK_TITLE_LEN: usize = 120;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

//=========================================================================================
// Forms
//=========================================================================================

#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(regex(path = *EMAIL_PATTERN, message = "Introduce un correo electrónico válido"))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[validate(length(min = 2, message = "El nombre debe tener al menos 2 caracteres"))]
    pub name: String,
    #[validate(regex(path = *EMAIL_PATTERN, message = "Introduce un correo electrónico válido"))]
    pub email: String,
    #[validate(custom(function = "check_password_strength"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Las contraseñas no coinciden"))]
    pub confirm_password: String,
    #[serde(default)]
    pub accept_terms: Option<bool>,
}

impl RegisterForm {
    /// Registration without a confirmation field, as the session manager receives it.
    pub fn unconfirmed(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: password.to_string(),
            accept_terms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Fair,
    Strong,
}

/// Live feedback for the registration form: field errors plus the strength meter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidation {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
    pub password_strength: PasswordStrength,
}

impl FormValidation {
    pub fn register(form: &RegisterForm) -> Self {
        let errors = match validate_register_form(form) {
            Ok(()) => BTreeMap::new(),
            Err(errors) => field_messages(&errors),
        };
        Self {
            is_valid: errors.is_empty(),
            errors,
            password_strength: password_strength(&form.password),
        }
    }
}

//=========================================================================================
// Custom Rules
//=========================================================================================

fn rejected(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn character_classes(password: &str) -> usize {
    let has = |pred: fn(char) -> bool| password.chars().any(pred);
    [
        has(char::is_lowercase),
        has(char::is_uppercase),
        has(|c| c.is_ascii_digit()),
        has(|c| !c.is_alphanumeric()),
    ]
    .into_iter()
    .filter(|present| *present)
    .count()
}

/// Rates a password for strength meters. `Fair` is the minimum accepted at registration.
pub fn password_strength(password: &str) -> PasswordStrength {
    let length = password.chars().count();
    let classes = character_classes(password);
    if length < MIN_PASSWORD_LEN || classes < MIN_PASSWORD_CLASSES {
        PasswordStrength::Weak
    } else if length >= 12 && classes == 4 {
        PasswordStrength::Strong
    } else {
        PasswordStrength::Fair
    }
}

fn check_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        Err(rejected("required", "La contraseña es obligatoria"))
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Err(rejected(
            "too_short",
            format!("La contraseña debe tener al menos {MIN_PASSWORD_LEN} caracteres"),
        ))
    } else if character_classes(password) < MIN_PASSWORD_CLASSES {
        Err(rejected(
            "too_simple",
            "La contraseña debe combinar mayúsculas, minúsculas, números o símbolos",
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn check_task_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        Err(rejected("required", "El título de la tarea es obligatorio"))
    } else if title.chars().count() > MAX_TASK_TITLE_LEN {
        Err(rejected(
            "too_long",
            format!("El título no puede superar {MAX_TASK_TITLE_LEN} caracteres"),
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn check_category(category: &str) -> Result<(), ValidationError> {
    category
        .parse::<TaskCategory>()
        .map(|_| ())
        .map_err(|_| rejected("unknown_category", "Selecciona una categoría válida"))
}

//=========================================================================================
// Entry Points
//=========================================================================================

pub fn validate_login_form(email: &str, password: &str) -> Result<(), ValidationErrors> {
    LoginForm {
        email: email.trim().to_string(),
        password: password.to_string(),
    }
    .validate()
}

/// Confirmation mismatch is always reported, whatever else is wrong with the form.
pub fn validate_register_form(form: &RegisterForm) -> Result<(), ValidationErrors> {
    let trimmed = RegisterForm {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        ..form.clone()
    };
    let mut errors = trimmed.validate().err().unwrap_or_else(ValidationErrors::new);
    if form.accept_terms == Some(false) {
        errors.add(
            "acceptTerms",
            rejected("terms_not_accepted", "Debes aceptar los términos y condiciones"),
        );
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks a task candidate and resolves its category.
pub fn validate_new_task(task: &NewTask) -> Result<TaskCategory, ValidationErrors> {
    task.validate()?;
    task.category.parse::<TaskCategory>().map_err(|_| {
        let mut errors = ValidationErrors::new();
        errors.add("category", rejected("unknown_category", "Selecciona una categoría válida"));
        errors
    })
}

//=========================================================================================
// Presentation
//=========================================================================================

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Field name (as the browser spells it) → the first message for that field.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, list)| {
            let message = list.first().map(|error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("Valor no válido ({})", error.code),
            })?;
            Some((camel_case(&field), message))
        })
        .collect()
}

/// The message shown in the toast: the first field in name order.
pub fn first_message(errors: &ValidationErrors) -> Option<String> {
    field_messages(errors).into_values().next()
}
