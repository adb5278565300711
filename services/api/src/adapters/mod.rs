pub mod chat_llm;
pub mod cookies;
pub mod hosted;
pub mod hosted_auth;
pub mod hosted_tasks;

pub use chat_llm::OpenAiChatAdapter;
pub use cookies::CookieJar;
pub use hosted::HostedApi;
pub use hosted_auth::HostedAuthAdapter;
pub use hosted_tasks::HostedTaskAdapter;
