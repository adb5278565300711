//! crates/hogarzen_core/src/chat.rs
//!
//! The Chat Assistant Adapter. Forwards the conversation to a `ChatModel` and
//! always produces a reply: timeouts, provider errors and empty answers fall
//! back to canned, keyword-matched responses.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::ChatMessage;
use crate::ports::{ChatModel, PortError, PortResult};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

pub const SYSTEM_PROMPT: &str = r#"Eres el asistente de HogarZen, una aplicación para organizar las tareas del hogar.

Tu papel:
- Ayudar a crear, organizar y completar tareas domésticas (limpieza, cocina, seguridad, mantenimiento, compras, lavandería, mascotas y jardín).
- Dar consejos prácticos y breves para mantener la casa en orden.
- Explicar cómo usar la aplicación: añadir tareas desde el catálogo o crear tareas propias, marcarlas como completadas y revisar el resumen del panel.

Estilo:
- Responde siempre en español, con un tono cercano y amable.
- Sé conciso: dos o tres frases, o una lista corta cuando ayude.
- Si te preguntan algo ajeno al hogar, redirige la conversación con amabilidad."#;

const SUGGESTIONS_PROMPT: &str = "Sugiere cuatro preguntas cortas que un usuario de HogarZen podría hacerte. Escribe una por línea, sin numeración ni comillas.";

pub const TASK_CREATION_FALLBACK: &str = "Para crear una tarea, ve a tu lista y pulsa \"Añadir tarea\". Puedes elegir una del catálogo o escribir la tuya, indicando un título y una categoría como limpieza, cocina o seguridad.";
pub const TASK_COMPLETION_FALLBACK: &str = "Para marcar una tarea como completada, pulsa la casilla junto a ella en tu lista. Si te equivocas, vuelve a pulsarla y quedará pendiente de nuevo.";
pub const CLEANING_FALLBACK: &str = "Un buen truco de limpieza: trabaja de arriba abajo y de lo seco a lo húmedo. Dedica diez minutos al día a una zona distinta y la casa se mantendrá en orden sin esfuerzo.";
pub const SAFETY_FALLBACK: &str = "Para la seguridad del hogar, revisa cada noche que la plancha y los fogones estén apagados, cierra la llave del gas si no la usas y comprueba el detector de humo una vez al mes.";
pub const GREETING_FALLBACK: &str = "¡Hola! Soy el asistente de HogarZen. Puedo ayudarte a organizar tus tareas del hogar o darte consejos de limpieza y seguridad. ¿En qué te ayudo?";
pub const GENERIC_FALLBACK: &str = "Ahora mismo no puedo conectarme con el asistente, pero puedes seguir gestionando tus tareas desde tu lista. Inténtalo de nuevo en unos minutos.";

/// Checked in order; the first rule with a matching keyword wins.
const FALLBACK_RULES: &[(&[&str], &str)] = &[
    (
        &["crear", "creo", "agregar", "añadir", "anadir", "nueva tarea"],
        TASK_CREATION_FALLBACK,
    ),
    (
        &["complet", "marcar", "terminad", "hecha"],
        TASK_COMPLETION_FALLBACK,
    ),
    (&["limpi", "orden", "polvo"], CLEANING_FALLBACK),
    (&["segur", "plancha", "gas", "detector"], SAFETY_FALLBACK),
    (&["hola", "buenas", "buenos"], GREETING_FALLBACK),
];

pub const STATIC_SUGGESTIONS: [&str; 4] = [
    "¿Cómo creo una tarea?",
    "Dame un consejo de limpieza rápida",
    "¿Qué tareas de seguridad debería hacer cada noche?",
    "¿Cómo marco una tarea como completada?",
];

/// Picks the canned reply for a message the model could not answer.
pub fn fallback_reply(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    FALLBACK_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(*k)))
        .map_or(GENERIC_FALLBACK, |(_, reply)| *reply)
}

#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    pub timeout: Duration,
    pub history_limit: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

//=========================================================================================
// ChatAssistant
//=========================================================================================

pub struct ChatAssistant {
    model: Arc<dyn ChatModel>,
    settings: ChatSettings,
}

impl ChatAssistant {
    pub fn new(model: Arc<dyn ChatModel>, settings: ChatSettings) -> Self {
        Self { model, settings }
    }

    async fn ask(&self, system_prompt: &str, messages: &[ChatMessage]) -> PortResult<String> {
        let reply = timeout(self.settings.timeout, self.model.complete(system_prompt, messages))
            .await
            .map_err(|_| PortError::Timeout)??;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(PortError::Malformed("empty completion".to_string()));
        }
        Ok(reply.to_string())
    }

    /// Never fails: any problem reaching the model yields a canned reply.
    pub async fn send_message(&self, text: &str, history: &[ChatMessage]) -> String {
        let skip = history.len().saturating_sub(self.settings.history_limit);
        let mut messages: Vec<ChatMessage> = history[skip..].to_vec();
        messages.push(ChatMessage::user(text));

        match self.ask(SYSTEM_PROMPT, &messages).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Chat model unavailable; using fallback reply");
                fallback_reply(text).to_string()
            }
        }
    }

    pub async fn test_connection(&self) -> bool {
        match timeout(self.settings.timeout, self.model.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!(error = %e, "Chat model ping failed");
                false
            }
            Err(_) => {
                debug!("Chat model ping timed out");
                false
            }
        }
    }

    /// Live suggestions when the model is reachable, the static list otherwise.
    pub async fn quick_suggestions(&self) -> Vec<String> {
        let fallback = || -> Vec<String> {
            STATIC_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
        };
        if !self.test_connection().await {
            return fallback();
        }
        match self
            .ask(SYSTEM_PROMPT, &[ChatMessage::user(SUGGESTIONS_PROMPT)])
            .await
        {
            Ok(reply) => {
                let lines: Vec<String> = reply
                    .lines()
                    .map(|line| line.trim_start_matches(['-', '*', '•', ' ']).trim())
                    .filter(|line| !line.is_empty())
                    .take(STATIC_SUGGESTIONS.len())
                    .map(str::to_string)
                    .collect();
                if lines.is_empty() {
                    fallback()
                } else {
                    lines
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not fetch live suggestions");
                fallback()
            }
        }
    }
}

//=========================================================================================
// Conversation
//=========================================================================================

/// Append-only history for one chat session. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct ChatConversation {
    messages: Vec<ChatMessage>,
}

impl ChatConversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Sends `text` with the history so far and records both sides.
    pub async fn send(&mut self, assistant: &ChatAssistant, text: &str) -> String {
        let reply = assistant.send_message(text, &self.messages).await;
        self.push_user(text);
        self.push_assistant(reply.clone());
        reply
    }
}
