//! Client core of the thing ledger.
//!
//! The core keeps a local copy of the user's things and their expenses in
//! step with the remote service, and converts dates between what users type,
//! what the service expects and what is shown back.
//!
//! [`App`] owns everything: the [`Session`], the [`ResourceCache`], the
//! active [`Surface`] and the three [`Forms`]. It is driven by one task and
//! suspends only on calls to its [`Remote`].

pub use app::{App, FollowUp, Settings, SubmitOutcome};
pub use cache::{ExpensePatch, ResourceCache};
pub use client::HttpClient;
pub use dialog::{Dialogs, Surface};
pub use draft::{ExpenseDraft, ProfileDraft, ThingDraft};
pub use error::{LedgerError, Result};
pub use remote::Remote;
pub use resource::{
    Deletable, ExpenseKind, Form, Forms, Kind, Phase, ProfileKind, ResourceKind, ThingKind,
};
pub use session::{AuthState, Session};
pub use token::{FileTokenStore, MemoryTokenStore, StoredToken, TokenStore, default_token_path};

pub mod dates;
pub mod validation;

mod app;
mod cache;
mod client;
mod dialog;
mod draft;
mod error;
mod remote;
mod resource;
mod session;
mod token;

pub mod types {
    pub use api_types::{
        auth::{Credentials, LoginData, Registration},
        expense::{Expense, ExpensePayload},
        thing::{Thing, ThingPayload},
        user::ProfilePayload,
    };
}
