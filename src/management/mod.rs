mod credentials;
mod session;

pub use credentials::CredentialStore;
pub use session::Authenticator;
pub use session::LoginHint;
pub use session::SessionManager;
