//! The remote service as the core sees it.
//!
//! [`HttpClient`](crate::HttpClient) talks to the real service; tests plug in
//! their own implementation. Calls are awaited on the caller's task, nothing
//! is spawned, so the futures carry no `Send` bound.
#![allow(async_fn_in_trait)]

use api_types::{
    auth::{Credentials, LoginData, Registration},
    expense::{Expense, ExpensePayload},
    thing::{Thing, ThingPayload},
    user::ProfilePayload,
};

use crate::error::Result;

pub trait Remote {
    /// `POST /auth`
    async fn login(&self, credentials: &Credentials) -> Result<LoginData>;

    /// `POST /register`
    async fn register(&self, registration: &Registration) -> Result<()>;

    /// `GET /api/`
    async fn things(&self, token: &str) -> Result<Vec<Thing>>;

    /// `POST /api/admin/thing`
    async fn create_thing(&self, token: &str, payload: &ThingPayload) -> Result<Option<Thing>>;

    /// `PUT /api/admin/thing/:id`
    async fn update_thing(
        &self,
        token: &str,
        id: i64,
        payload: &ThingPayload,
    ) -> Result<Option<Thing>>;

    /// `DELETE /api/admin/thing/:id`
    async fn delete_thing(&self, token: &str, id: i64) -> Result<()>;

    /// `GET /api/admin/thing/:id/expenses`
    async fn thing_expenses(&self, token: &str, thing_id: i64) -> Result<Vec<Expense>>;

    /// `POST /api/admin/expense`
    async fn create_expense(
        &self,
        token: &str,
        payload: &ExpensePayload,
    ) -> Result<Option<Expense>>;

    /// `PUT /api/admin/expense/:id`
    async fn update_expense(
        &self,
        token: &str,
        id: i64,
        payload: &ExpensePayload,
    ) -> Result<Option<Expense>>;

    /// `DELETE /api/admin/expense/:id`
    async fn delete_expense(&self, token: &str, id: i64) -> Result<()>;

    /// `PUT /api/admin/user/:id`
    async fn update_user(&self, token: &str, user_id: i64, payload: &ProfilePayload)
    -> Result<()>;
}
