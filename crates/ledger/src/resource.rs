//! What differs between the things, expenses and profile forms.
//!
//! Every form follows the same submit sequence (see [`App::submit`]); a
//! [`ResourceKind`] only supplies its checks, its calls and its cache patch.
//!
//! [`App::submit`]: crate::App::submit
#![allow(async_fn_in_trait)]

use std::fmt;

use api_types::{
    expense::{Expense, ExpensePayload},
    thing::{Thing, ThingPayload},
    user::ProfilePayload,
};

use crate::{
    cache::{ExpensePatch, ResourceCache},
    draft::{ExpenseDraft, ProfileDraft, ThingDraft},
    error::{LedgerError, Result},
    remote::Remote,
    validation::{self, ValidationError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Thing,
    Expense,
    Profile,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thing => "thing",
            Self::Expense => "expense",
            Self::Profile => "profile",
        }
    }

    /// Shown when a call fails without a message from the service.
    pub fn failure_message(self) -> String {
        format!("error performing {} operation", self.as_str())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submit progress of a form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// A draft plus its error slot and loading flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form<D> {
    pub draft: D,
    error: Option<String>,
    loading: bool,
    phase: Phase,
}

impl<D> Form<D> {
    pub fn new(draft: D) -> Self {
        Self {
            draft,
            error: None,
            loading: false,
            phase: Phase::Idle,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn validating(&mut self) {
        self.error = None;
        self.phase = Phase::Validating;
    }

    pub(crate) fn submitting(&mut self) {
        self.loading = true;
        self.phase = Phase::Submitting;
    }

    pub(crate) fn succeeded(&mut self) {
        self.phase = Phase::Succeeded;
    }

    /// Back to idle once there is nothing left to show for the last call.
    pub(crate) fn settle(&mut self) {
        self.loading = false;
        self.error = None;
        self.phase = Phase::Idle;
    }

    pub(crate) fn failed(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
        self.phase = Phase::Failed;
    }
}

/// The three forms. Only the one behind the active surface is shown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Forms {
    pub thing: Form<ThingDraft>,
    pub expense: Form<ExpenseDraft>,
    pub profile: Form<ProfileDraft>,
}

impl Forms {
    /// Drops the draft of `kind` and returns its form to idle.
    pub fn reset(&mut self, kind: Kind) {
        match kind {
            Kind::Thing => self.thing = Form::default(),
            Kind::Expense => self.expense = Form::default(),
            Kind::Profile => self.profile = Form::default(),
        }
    }
}

pub trait ResourceKind {
    const KIND: Kind;
    type Draft;
    type Payload;
    type Record;

    fn form(forms: &mut Forms) -> &mut Form<Self::Draft>;

    /// Checks the draft and builds the wire payload.
    fn validate(draft: &Self::Draft) -> std::result::Result<Self::Payload, ValidationError>;

    /// Id of the record being edited, `None` when creating.
    fn target(draft: &Self::Draft) -> Option<i64>;

    async fn write<R: Remote>(
        remote: &R,
        token: &str,
        target: Option<i64>,
        payload: &Self::Payload,
    ) -> Result<Option<Self::Record>>;

    /// Applies a successful write to the cache ahead of the refresh.
    fn patch(
        cache: &mut ResourceCache,
        target: Option<i64>,
        payload: &Self::Payload,
        record: Option<Self::Record>,
    );

    /// Thing whose expense list has to be reloaded after a write.
    fn expenses_of(_payload: &Self::Payload) -> Option<i64> {
        None
    }
}

pub trait Deletable: ResourceKind {
    async fn delete<R: Remote>(remote: &R, token: &str, id: i64) -> Result<()>;

    fn unpatch(cache: &mut ResourceCache, id: i64);

    /// Thing whose expense list has to be reloaded after deleting `id`.
    /// Read before the record leaves the cache.
    fn expenses_of_deleted(_cache: &ResourceCache, _id: i64) -> Option<i64> {
        None
    }
}

pub struct ThingKind;

impl ResourceKind for ThingKind {
    const KIND: Kind = Kind::Thing;
    type Draft = ThingDraft;
    type Payload = ThingPayload;
    type Record = Thing;

    fn form(forms: &mut Forms) -> &mut Form<ThingDraft> {
        &mut forms.thing
    }

    fn validate(draft: &ThingDraft) -> std::result::Result<ThingPayload, ValidationError> {
        validation::thing(draft)
    }

    fn target(draft: &ThingDraft) -> Option<i64> {
        draft.id
    }

    async fn write<R: Remote>(
        remote: &R,
        token: &str,
        target: Option<i64>,
        payload: &ThingPayload,
    ) -> Result<Option<Thing>> {
        match target {
            Some(id) => remote.update_thing(token, id, payload).await,
            None => remote.create_thing(token, payload).await,
        }
    }

    fn patch(
        cache: &mut ResourceCache,
        target: Option<i64>,
        payload: &ThingPayload,
        record: Option<Thing>,
    ) {
        match (target, record) {
            (_, Some(thing)) if thing.id.is_some() => cache.insert_thing(thing),
            (Some(id), _) => cache.update_thing(id, payload),
            // Nothing to key a new thing on; the refresh brings it in.
            (None, _) => {}
        }
    }
}

impl Deletable for ThingKind {
    async fn delete<R: Remote>(remote: &R, token: &str, id: i64) -> Result<()> {
        remote.delete_thing(token, id).await
    }

    fn unpatch(cache: &mut ResourceCache, id: i64) {
        cache.remove_thing(id);
    }
}

pub struct ExpenseKind;

impl ResourceKind for ExpenseKind {
    const KIND: Kind = Kind::Expense;
    type Draft = ExpenseDraft;
    type Payload = ExpensePayload;
    type Record = Expense;

    fn form(forms: &mut Forms) -> &mut Form<ExpenseDraft> {
        &mut forms.expense
    }

    fn validate(draft: &ExpenseDraft) -> std::result::Result<ExpensePayload, ValidationError> {
        validation::expense(draft)
    }

    fn target(draft: &ExpenseDraft) -> Option<i64> {
        draft.id
    }

    async fn write<R: Remote>(
        remote: &R,
        token: &str,
        target: Option<i64>,
        payload: &ExpensePayload,
    ) -> Result<Option<Expense>> {
        match target {
            Some(id) => remote.update_expense(token, id, payload).await,
            None => remote.create_expense(token, payload).await,
        }
    }

    fn patch(
        cache: &mut ResourceCache,
        target: Option<i64>,
        payload: &ExpensePayload,
        record: Option<Expense>,
    ) {
        match target {
            Some(id) => cache.update_expense(id, ExpensePatch::from(payload)),
            None => {
                let expense = record.unwrap_or_else(|| Expense {
                    id: None,
                    thing_id: payload.thing_id,
                    sum: payload.sum,
                    description: payload.description.clone(),
                    expense_date: payload.expense_date.clone(),
                });
                cache.insert_expense(payload.thing_id, expense);
            }
        }
    }

    fn expenses_of(payload: &ExpensePayload) -> Option<i64> {
        Some(payload.thing_id)
    }
}

impl Deletable for ExpenseKind {
    async fn delete<R: Remote>(remote: &R, token: &str, id: i64) -> Result<()> {
        remote.delete_expense(token, id).await
    }

    fn unpatch(cache: &mut ResourceCache, id: i64) {
        cache.remove_expense(id);
    }

    fn expenses_of_deleted(cache: &ResourceCache, id: i64) -> Option<i64> {
        cache.expense(id).map(|expense| expense.thing_id)
    }
}

pub struct ProfileKind;

impl ResourceKind for ProfileKind {
    const KIND: Kind = Kind::Profile;
    type Draft = ProfileDraft;
    type Payload = ProfilePayload;
    type Record = ();

    fn form(forms: &mut Forms) -> &mut Form<ProfileDraft> {
        &mut forms.profile
    }

    fn validate(draft: &ProfileDraft) -> std::result::Result<ProfilePayload, ValidationError> {
        validation::profile(draft)
    }

    fn target(draft: &ProfileDraft) -> Option<i64> {
        draft.user_id
    }

    async fn write<R: Remote>(
        remote: &R,
        token: &str,
        target: Option<i64>,
        payload: &ProfilePayload,
    ) -> Result<Option<()>> {
        let user_id = target.ok_or(ValidationError::UserUnknown)?;
        remote.update_user(token, user_id, payload).await?;
        Ok(Some(()))
    }

    fn patch(
        _cache: &mut ResourceCache,
        _target: Option<i64>,
        _payload: &ProfilePayload,
        _record: Option<()>,
    ) {
    }
}

/// Text for a form's error slot.
pub(crate) fn failure_message(kind: Kind, err: &LedgerError) -> String {
    match err {
        LedgerError::Validation(err) => err.to_string(),
        LedgerError::Remote { messages, .. } if !messages.is_empty() => messages.join(", "),
        _ => kind.failure_message(),
    }
}
