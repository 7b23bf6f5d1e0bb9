use secrecy::SecretString;

/// Admin credential pair injected into the service at startup, never read
/// from ambient globals.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub auth_username: String,
    pub auth_password: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(auth_username: String, auth_password: SecretString) -> Self {
        Self {
            auth_username,
            auth_password,
        }
    }
}
