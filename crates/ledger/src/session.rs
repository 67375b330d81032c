//! Authentication state of the running client.

/// Lifecycle of a [`Session`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    LoggedOut,
    Authenticating,
    Authenticated,
}

/// Bearer token holder, owned by the [`App`](crate::App).
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    user_id: Option<i64>,
    state: AuthState,
}

impl Session {
    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn begin_login(&mut self) {
        self.state = AuthState::Authenticating;
    }

    pub(crate) fn authenticate(&mut self, token: String, user_id: Option<i64>) {
        self.token = Some(token);
        self.user_id = user_id;
        self.state = AuthState::Authenticated;
    }

    /// Drops the token. Used both for logout and for a failed login.
    pub(crate) fn teardown(&mut self) {
        self.token = None;
        self.user_id = None;
        self.state = AuthState::LoggedOut;
    }
}
