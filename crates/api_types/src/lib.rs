use serde::{Deserialize, Serialize};

/// Success envelope used by every endpoint that returns a body: `{"data": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

/// Error envelope carried by non-2xx responses: `{"errors": [{"message": ...}]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorBody {
    /// Messages in the order the service sent them.
    pub fn messages(self) -> Vec<String> {
        self.errors.into_iter().map(|err| err.message).collect()
    }
}

pub mod auth {
    use super::*;

    /// Request body for `POST /auth`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub username: String,
        pub password: String,
    }

    /// Request body for `POST /register`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Registration {
        pub username: String,
        pub email: String,
        pub password: String,
    }

    /// `data` part of a successful login.
    ///
    /// The service always sends the token. The user id is optional: when it is
    /// missing the profile endpoint can't be addressed.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LoginData {
        pub token: String,
        #[serde(default, alias = "id")]
        pub user_id: Option<i64>,
    }
}

pub mod thing {
    use super::*;
    use crate::expense::Expense;

    /// A tracked asset as returned by `GET /api/`.
    ///
    /// Dates are kept in the wire form the service sent (RFC3339 or
    /// `YYYY-MM-DD`). `days` and `pay_day` are computed server side.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Thing {
        #[serde(default)]
        pub id: Option<i64>,
        pub name: String,
        pub pay_date: String,
        pub pay_price: i64,
        #[serde(default)]
        pub sale_date: Option<String>,
        #[serde(default)]
        pub sale_price: Option<i64>,
        /// Days of ownership.
        #[serde(default)]
        pub days: Option<i64>,
        /// Amortized cost per day.
        #[serde(default)]
        pub pay_day: Option<f64>,
        /// Nested expenses, `None` until loaded.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub expenses: Option<Vec<Expense>>,
    }

    /// Request body for `POST /api/admin/thing` and `PUT /api/admin/thing/:id`.
    ///
    /// Absent sale fields are sent as `null`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ThingPayload {
        pub name: String,
        /// RFC3339, midnight UTC.
        pub pay_date: String,
        pub pay_price: i64,
        pub sale_date: Option<String>,
        pub sale_price: Option<i64>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Expense {
        #[serde(default)]
        pub id: Option<i64>,
        pub thing_id: i64,
        pub sum: i64,
        pub description: String,
        pub expense_date: String,
    }

    /// Request body for `POST /api/admin/expense` and `PUT /api/admin/expense/:id`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpensePayload {
        pub thing_id: i64,
        pub sum: i64,
        pub description: String,
        /// RFC3339, midnight UTC.
        pub expense_date: String,
    }
}

pub mod user {
    use super::*;

    /// Request body for `PUT /api/admin/user/:id`. Only supplied fields are sent.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProfilePayload {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub username: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub password: Option<String>,
    }
}
