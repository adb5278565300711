//! crates/hogarzen_core/src/notifications.rs
//!
//! Maps action outcomes to the toast shown to the user. Every user-initiated
//! action yields exactly one toast, success or error.

use serde::Serialize;
use tracing::warn;

use crate::error::{AppError, AuthErrorKind};
use crate::validation::first_message;

pub const SUCCESS_DURATION_MS: u64 = 3_000;
pub const INFO_DURATION_MS: u64 = 4_000;
pub const WARNING_DURATION_MS: u64 = 5_000;
pub const ERROR_DURATION_MS: u64 = 6_000;
/// Stays on screen until dismissed.
pub const PERSISTENT: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub duration_ms: u64,
}

impl Toast {
    fn new(title: &str, message: impl Into<String>, severity: Severity, duration_ms: u64) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            severity,
            duration_ms,
        }
    }
}

/// The user-initiated actions that produce a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Login,
    Register,
    Logout,
    AddTask,
    CompleteTask,
    ReopenTask,
    RemoveTask,
}

pub fn success_toast(action: UserAction) -> Toast {
    let (title, message) = match action {
        UserAction::Login => ("¡Bienvenido de nuevo!", "Has iniciado sesión correctamente"),
        UserAction::Register => ("¡Cuenta creada!", "Tu hogar ya está listo en HogarZen"),
        UserAction::Logout => ("Sesión cerrada", "Vuelve pronto"),
        UserAction::AddTask => ("Tarea añadida", "La tarea se agregó a tu lista"),
        UserAction::CompleteTask => ("¡Tarea completada!", "Un pendiente menos en casa"),
        UserAction::ReopenTask => ("Tarea pendiente", "La tarea vuelve a estar pendiente"),
        UserAction::RemoveTask => ("Tarea eliminada", "La tarea se quitó de tu lista"),
    };
    Toast::new(title, message, Severity::Success, SUCCESS_DURATION_MS)
}

pub fn error_toast(error: &AppError) -> Toast {
    match error {
        AppError::Configuration(_) => Toast::new(
            "Configuración incompleta",
            "Faltan las credenciales del servicio. Revisa las variables de entorno.",
            Severity::Warning,
            PERSISTENT,
        ),
        AppError::Validation(errors) => Toast::new(
            "Revisa el formulario",
            first_message(errors).unwrap_or_else(|| "Hay campos con errores".to_string()),
            Severity::Error,
            ERROR_DURATION_MS,
        ),
        AppError::Auth(kind) => auth_toast(*kind),
        AppError::Network(_) => Toast::new(
            "Sin conexión",
            "No pudimos conectar con el servidor. Inténtalo de nuevo.",
            Severity::Error,
            ERROR_DURATION_MS,
        ),
        AppError::Unknown(_) => Toast::new(
            "Algo salió mal",
            "Ocurrió un error inesperado. Inténtalo más tarde.",
            Severity::Error,
            ERROR_DURATION_MS,
        ),
    }
}

fn auth_toast(kind: AuthErrorKind) -> Toast {
    match kind {
        AuthErrorKind::InvalidCredentials => Toast::new(
            "Error al iniciar sesión",
            "Correo o contraseña incorrectos",
            Severity::Error,
            ERROR_DURATION_MS,
        ),
        AuthErrorKind::DuplicateEmail => Toast::new(
            "Correo ya registrado",
            "Ya existe una cuenta con este correo. Inicia sesión.",
            Severity::Error,
            ERROR_DURATION_MS,
        ),
        AuthErrorKind::WeakPassword => Toast::new(
            "Contraseña débil",
            "Elige una contraseña más segura",
            Severity::Error,
            ERROR_DURATION_MS,
        ),
        AuthErrorKind::SessionExpired => Toast::new(
            "Sesión expirada",
            "Tu sesión ha caducado. Inicia sesión de nuevo.",
            Severity::Warning,
            WARNING_DURATION_MS,
        ),
        AuthErrorKind::NotAuthenticated => Toast::new(
            "Inicia sesión",
            "Necesitas iniciar sesión para continuar",
            Severity::Warning,
            WARNING_DURATION_MS,
        ),
        AuthErrorKind::EmailNotConfirmed => Toast::new(
            "Confirma tu correo",
            "Te enviamos un enlace de confirmación. Revisa tu bandeja de entrada.",
            Severity::Info,
            INFO_DURATION_MS,
        ),
    }
}

/// Produces the single toast for an action outcome, logging failures.
pub fn notify<T>(action: UserAction, outcome: &Result<T, AppError>) -> Toast {
    match outcome {
        Ok(_) => success_toast(action),
        Err(e) => {
            warn!(?action, error = %e, "Action failed");
            error_toast(e)
        }
    }
}
