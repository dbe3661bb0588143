// Session authentication module
// Owns the credential refresh lifecycle and session state

mod redirect;
mod refresh;
mod session;
mod verify;

pub use redirect::LoginRedirect;
pub use refresh::RefreshCoordinator;
pub use session::SessionContext;
pub use verify::{CredentialVerifier, MockVerifier};
