//! In-memory mirror of the service's thing list.
//!
//! Expenses live nested under their thing. Every function here is synchronous
//! and total: lookups that miss are no-ops. A full [`ResourceCache::replace_all`]
//! always overrides whatever the optimistic patches did before it.
use api_types::{
    expense::{Expense, ExpensePayload},
    thing::{Thing, ThingPayload},
};

/// Fields of an expense a local edit may change. `thing_id` is fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpensePatch {
    pub sum: i64,
    pub description: String,
    pub expense_date: String,
}

impl From<&ExpensePayload> for ExpensePatch {
    fn from(payload: &ExpensePayload) -> Self {
        Self {
            sum: payload.sum,
            description: payload.description.clone(),
            expense_date: payload.expense_date.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceCache {
    things: Vec<Thing>,
    selected: Option<i64>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn things(&self) -> &[Thing] {
        &self.things
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }

    pub fn thing(&self, id: i64) -> Option<&Thing> {
        self.things.iter().find(|thing| thing.id == Some(id))
    }

    fn thing_mut(&mut self, id: i64) -> Option<&mut Thing> {
        self.things.iter_mut().find(|thing| thing.id == Some(id))
    }

    pub fn expense(&self, id: i64) -> Option<&Expense> {
        self.things
            .iter()
            .filter_map(|thing| thing.expenses.as_ref())
            .flatten()
            .find(|expense| expense.id == Some(id))
    }

    fn expense_mut(&mut self, id: i64) -> Option<&mut Expense> {
        self.things
            .iter_mut()
            .filter_map(|thing| thing.expenses.as_mut())
            .flatten()
            .find(|expense| expense.id == Some(id))
    }

    /// The thing whose expense list is open, if it is still cached.
    pub fn selected(&self) -> Option<&Thing> {
        self.selected.and_then(|id| self.thing(id))
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected
    }

    /// Selects a thing by id. Returns `false` and clears the selection when
    /// the id isn't cached.
    pub fn select(&mut self, id: i64) -> bool {
        let found = self.thing(id).is_some();
        self.selected = found.then_some(id);
        found
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Replaces the whole list. The selection survives if its id is still
    /// present.
    pub fn replace_all(&mut self, things: Vec<Thing>) {
        self.things = things;
        if let Some(id) = self.selected
            && self.thing(id).is_none()
        {
            self.selected = None;
        }
        tracing::debug!(
            things = self.things.len(),
            selected = ?self.selected,
            "cache replaced"
        );
    }

    /// Replaces the nested expenses of one thing.
    pub fn patch_expense_list(&mut self, thing_id: i64, expenses: Vec<Expense>) {
        if let Some(thing) = self.thing_mut(thing_id) {
            thing.expenses = Some(expenses);
        }
    }

    pub fn clear(&mut self) {
        self.things.clear();
        self.selected = None;
    }

    /// Adds `thing`, or replaces the cached one with the same id. A
    /// replacement without nested expenses keeps the cached list.
    pub fn insert_thing(&mut self, mut thing: Thing) {
        if let Some(id) = thing.id
            && let Some(existing) = self.thing_mut(id)
        {
            if thing.expenses.is_none() {
                thing.expenses = existing.expenses.take();
            }
            *existing = thing;
            return;
        }
        self.things.push(thing);
    }

    /// Applies the stored fields of a successful edit. Derived values stay
    /// as they were until the next refresh.
    pub fn update_thing(&mut self, id: i64, patch: &ThingPayload) {
        if let Some(thing) = self.thing_mut(id) {
            thing.name = patch.name.clone();
            thing.pay_date = patch.pay_date.clone();
            thing.pay_price = patch.pay_price;
            thing.sale_date = patch.sale_date.clone();
            thing.sale_price = patch.sale_price;
        }
    }

    pub fn remove_thing(&mut self, id: i64) {
        self.things.retain(|thing| thing.id != Some(id));
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    pub fn insert_expense(&mut self, thing_id: i64, expense: Expense) {
        if let Some(thing) = self.thing_mut(thing_id) {
            thing.expenses.get_or_insert_with(Vec::new).push(expense);
        }
    }

    pub fn update_expense(&mut self, expense_id: i64, patch: ExpensePatch) {
        if let Some(expense) = self.expense_mut(expense_id) {
            expense.sum = patch.sum;
            expense.description = patch.description;
            expense.expense_date = patch.expense_date;
        }
    }

    pub fn remove_expense(&mut self, expense_id: i64) {
        for thing in &mut self.things {
            if let Some(expenses) = thing.expenses.as_mut() {
                expenses.retain(|expense| expense.id != Some(expense_id));
            }
        }
    }
}
