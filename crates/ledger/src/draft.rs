//! Unsaved copies of a resource, as edited in an open form.
//!
//! Drafts hold raw text: prices as typed, dates in display form. They never
//! point into the cache, so dropping a draft can't leave a trace there.
use api_types::{expense::Expense, thing::Thing};

use crate::dates;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThingDraft {
    /// `None` when adding.
    pub id: Option<i64>,
    pub name: String,
    pub pay_date: String,
    pub pay_price: String,
    pub sale_date: String,
    pub sale_price: String,
}

impl ThingDraft {
    pub fn from_thing(thing: &Thing) -> Self {
        Self {
            id: thing.id,
            name: thing.name.clone(),
            pay_date: dates::display_or_empty(&thing.pay_date),
            pay_price: thing.pay_price.to_string(),
            sale_date: thing
                .sale_date
                .as_deref()
                .map(dates::display_or_empty)
                .unwrap_or_default(),
            sale_price: thing
                .sale_price
                .map(|price| price.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    /// `None` when adding.
    pub id: Option<i64>,
    pub thing_id: Option<i64>,
    pub sum: String,
    pub description: String,
    pub expense_date: String,
}

impl ExpenseDraft {
    pub fn for_thing(thing_id: i64) -> Self {
        Self {
            thing_id: Some(thing_id),
            ..Self::default()
        }
    }

    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            thing_id: Some(expense.thing_id),
            sum: expense.sum.to_string(),
            description: expense.description.clone(),
            expense_date: dates::display_or_empty(&expense.expense_date),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub user_id: Option<i64>,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

impl ProfileDraft {
    pub fn for_user(user_id: Option<i64>) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }
}
