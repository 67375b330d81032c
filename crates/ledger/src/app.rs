use std::time::Duration;

use api_types::auth::{Credentials, Registration};
use chrono::Utc;

use crate::{
    cache::ResourceCache,
    dialog::{Dialogs, Surface},
    draft::{ExpenseDraft, ProfileDraft, ThingDraft},
    error::{LedgerError, Result},
    remote::Remote,
    resource::{Deletable, Form, Forms, Kind, ResourceKind, failure_message},
    session::Session,
    token::{StoredToken, TokenStore},
};

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Pause between a successful write and closing its form.
    pub close_delay: Duration,
}

/// Work left after a successful write: the confirming refresh and closing
/// the form. Run it with [`App::complete`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUp {
    kind: Kind,
    expenses_of: Option<i64>,
    close: bool,
}

impl FollowUp {
    pub fn kind(&self) -> Kind {
        self.kind
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded(FollowUp),
    /// The form's error slot holds the same message.
    Failed(String),
    /// Delete confirmation was declined, nothing was sent.
    Declined,
    /// The service rejected the token and the session was torn down.
    LoggedOut,
}

/// Client state: session, cache, surfaces and forms, and the service they
/// are synchronized with.
pub struct App<R> {
    remote: R,
    tokens: Box<dyn TokenStore>,
    settings: Settings,
    session: Session,
    cache: ResourceCache,
    dialogs: Dialogs,
    forms: Forms,
}

impl<R: Remote> App<R> {
    pub fn new(remote: R, tokens: Box<dyn TokenStore>, settings: Settings) -> Self {
        Self {
            remote,
            tokens,
            settings,
            session: Session::default(),
            cache: ResourceCache::new(),
            dialogs: Dialogs::new(),
            forms: Forms::default(),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn dialogs(&self) -> &Dialogs {
        &self.dialogs
    }

    pub fn forms(&self) -> &Forms {
        &self.forms
    }

    pub fn forms_mut(&mut self) -> &mut Forms {
        &mut self.forms
    }

    /// Resumes a stored session and runs the initial load.
    ///
    /// Returns whether the client ends up authenticated.
    pub async fn restore(&mut self) -> Result<bool> {
        let Some(stored) = self.tokens.load()? else {
            return Ok(false);
        };
        self.session.authenticate(stored.token, stored.user_id);
        tracing::info!("session restored");
        match self.refresh().await {
            Ok(()) => Ok(true),
            Err(LedgerError::Unauthorized) => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.session.begin_login();
        let credentials = Credentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        };

        let data = match self.remote.login(&credentials).await {
            Ok(data) => data,
            Err(err) => {
                tracing::info!("login failed: {err}");
                self.session.teardown();
                return Err(err);
            }
        };

        let stored = StoredToken::issued(data.token.clone(), data.user_id, Utc::now());
        if let Err(err) = self.tokens.save(&stored) {
            tracing::warn!("failed to store token: {err}");
        }
        self.session.authenticate(data.token, data.user_id);
        tracing::info!(user = %credentials.username, "logged in");

        self.refresh().await
    }

    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> Result<()> {
        let registration = Registration {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.remote.register(&registration).await
    }

    /// Forgets the token everywhere, empties the cache and closes every
    /// surface.
    pub fn logout(&mut self) {
        self.session.teardown();
        if let Err(err) = self.tokens.clear() {
            tracing::warn!("failed to clear stored token: {err}");
        }
        self.cache.clear();
        self.dialogs.reset();
        self.forms = Forms::default();
        tracing::info!("logged out");
    }

    fn token(&self) -> Result<String> {
        self.session
            .token()
            .map(str::to_owned)
            .ok_or(LedgerError::Unauthorized)
    }

    /// Tears the session down if `err` says the token is no longer valid.
    fn escalate(&mut self, err: LedgerError) -> LedgerError {
        if err.is_unauthorized() {
            self.logout();
        }
        err
    }

    /// Replaces the cache with the service's current list.
    pub async fn refresh(&mut self) -> Result<()> {
        let token = self.token().map_err(|err| self.escalate(err))?;
        match self.remote.things(&token).await {
            Ok(things) => {
                self.cache.replace_all(things);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("refresh failed: {err}");
                Err(self.escalate(err))
            }
        }
    }

    /// Reloads the expenses nested under one thing.
    pub async fn load_expenses(&mut self, thing_id: i64) -> Result<()> {
        let token = self.token().map_err(|err| self.escalate(err))?;
        match self.remote.thing_expenses(&token, thing_id).await {
            Ok(expenses) => {
                self.cache.patch_expense_list(thing_id, expenses);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(thing_id, "expense load failed: {err}");
                Err(self.escalate(err))
            }
        }
    }

    /// Shows the expense list of a thing. Returns `false` if the thing isn't
    /// cached.
    pub async fn open_expenses(&mut self, thing_id: i64) -> Result<bool> {
        if !self.cache.select(thing_id) {
            return Ok(false);
        }
        self.dialogs.open(Surface::ExpensesList);
        self.load_expenses(thing_id).await?;
        Ok(true)
    }

    pub fn open_add_thing(&mut self) {
        self.forms.thing = Form::new(ThingDraft::default());
        self.dialogs.open(Surface::AddThing);
    }

    pub fn open_edit_thing(&mut self, id: i64) -> bool {
        let Some(thing) = self.cache.thing(id) else {
            return false;
        };
        self.forms.thing = Form::new(ThingDraft::from_thing(thing));
        self.dialogs.open(Surface::EditThing);
        true
    }

    pub fn open_add_expense(&mut self, thing_id: i64) {
        self.forms.expense = Form::new(ExpenseDraft::for_thing(thing_id));
        self.dialogs.open(Surface::AddExpense);
    }

    pub fn open_edit_expense(&mut self, expense_id: i64) -> bool {
        let Some(expense) = self.cache.expense(expense_id) else {
            return false;
        };
        self.forms.expense = Form::new(ExpenseDraft::from_expense(expense));
        self.dialogs.open(Surface::EditExpense);
        true
    }

    pub fn open_profile(&mut self) {
        self.forms.profile = Form::new(ProfileDraft::for_user(self.session.user_id()));
        self.dialogs.open(Surface::EditProfile);
    }

    /// Closes the active surface without saving and returns the one now
    /// visible.
    pub fn cancel(&mut self) -> Surface {
        match self.dialogs.active() {
            Surface::ExpensesList => self.cache.deselect(),
            surface => {
                if let Some(kind) = kind_of(surface) {
                    self.forms.reset(kind);
                }
            }
        }
        self.dialogs.close()
    }

    /// Validates the form of `K`, sends it and patches the cache.
    ///
    /// A failure leaves the cache untouched and puts the message in the
    /// form's error slot.
    pub async fn submit<K: ResourceKind>(&mut self) -> SubmitOutcome {
        let form = K::form(&mut self.forms);
        form.validating();
        let payload = match K::validate(&form.draft) {
            Ok(payload) => payload,
            Err(err) => {
                let message = err.to_string();
                form.failed(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let target = K::target(&form.draft);
        form.submitting();

        let Ok(token) = self.token() else {
            self.logout();
            return SubmitOutcome::LoggedOut;
        };

        let result = K::write(&self.remote, &token, target, &payload).await;
        match result {
            Ok(record) => {
                K::form(&mut self.forms).succeeded();
                K::patch(&mut self.cache, target, &payload, record);
                tracing::info!(kind = %K::KIND, ?target, "write accepted");
                SubmitOutcome::Succeeded(FollowUp {
                    kind: K::KIND,
                    expenses_of: K::expenses_of(&payload),
                    close: true,
                })
            }
            Err(LedgerError::Unauthorized) => {
                self.logout();
                SubmitOutcome::LoggedOut
            }
            Err(err) => {
                tracing::warn!(kind = %K::KIND, ?target, "write failed: {err}");
                let message = failure_message(K::KIND, &err);
                K::form(&mut self.forms).failed(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Deletes record `id` of `K` once `confirm` agrees.
    pub async fn delete<K: Deletable>(
        &mut self,
        id: i64,
        confirm: impl FnOnce() -> bool,
    ) -> SubmitOutcome {
        if !confirm() {
            return SubmitOutcome::Declined;
        }

        let Ok(token) = self.token() else {
            self.logout();
            return SubmitOutcome::LoggedOut;
        };

        let expenses_of = K::expenses_of_deleted(&self.cache, id);
        K::form(&mut self.forms).submitting();
        let result = K::delete(&self.remote, &token, id).await;
        match result {
            Ok(()) => {
                K::form(&mut self.forms).settle();
                K::unpatch(&mut self.cache, id);
                tracing::info!(kind = %K::KIND, id, "delete accepted");
                SubmitOutcome::Succeeded(FollowUp {
                    kind: K::KIND,
                    expenses_of,
                    close: false,
                })
            }
            Err(LedgerError::Unauthorized) => {
                self.logout();
                SubmitOutcome::LoggedOut
            }
            Err(err) => {
                tracing::warn!(kind = %K::KIND, id, "delete failed: {err}");
                let message = failure_message(K::KIND, &err);
                K::form(&mut self.forms).failed(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Confirms a write: full refresh, expense reload when the write touched
    /// expenses, then closes the form and brings back the surface it
    /// suspended.
    ///
    /// The first refresh or reload error, if any, is returned after the form
    /// is closed.
    pub async fn complete(&mut self, follow_up: FollowUp) -> Result<()> {
        let refreshed = self.refresh().await;
        if !self.session.is_authenticated() {
            return refreshed;
        }

        let reloaded = match follow_up.expenses_of {
            Some(thing_id) => self.load_expenses(thing_id).await,
            None => Ok(()),
        };
        if !self.session.is_authenticated() {
            return reloaded;
        }

        if follow_up.close {
            if !self.settings.close_delay.is_zero() {
                tokio::time::sleep(self.settings.close_delay).await;
            }
            self.forms.reset(follow_up.kind);
            if kind_of(self.dialogs.active()) == Some(follow_up.kind) {
                self.dialogs.close();
            }
        }

        refreshed.and(reloaded)
    }
}

fn kind_of(surface: Surface) -> Option<Kind> {
    match surface {
        Surface::AddThing | Surface::EditThing => Some(Kind::Thing),
        Surface::AddExpense | Surface::EditExpense => Some(Kind::Expense),
        Surface::EditProfile => Some(Kind::Profile),
        Surface::ExpensesList | Surface::None => None,
    }
}
