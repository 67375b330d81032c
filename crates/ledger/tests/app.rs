use std::cell::{Cell, RefCell};

use chrono::Utc;
use ledger::{
    App, AuthState, ExpenseKind, FileTokenStore, LedgerError, MemoryTokenStore, Phase,
    ProfileKind, Remote, Result, Settings, StoredToken, SubmitOutcome, Surface, ThingKind,
    TokenStore,
    types::{
        Credentials, Expense, ExpensePayload, LoginData, ProfilePayload, Registration, Thing,
        ThingPayload,
    },
};

const TOKEN: &str = "secret-token";

#[derive(Clone, Copy, Debug)]
enum Failure {
    Remote,
    Transport,
    Unauthorized,
}

impl Failure {
    fn error(self) -> LedgerError {
        match self {
            Self::Remote => LedgerError::Remote {
                status: 422,
                messages: vec!["name taken".to_string(), "try again".to_string()],
            },
            Self::Transport => LedgerError::Transport {
                status: Some(500),
                message: "500 Internal Server Error".to_string(),
            },
            Self::Unauthorized => LedgerError::Unauthorized,
        }
    }
}

/// In-memory service. Writes are applied to its own lists, which `things`
/// and `thing_expenses` then serve back.
#[derive(Default)]
struct FakeService {
    things: RefCell<Vec<Thing>>,
    expenses: RefCell<Vec<Expense>>,
    next_id: Cell<i64>,
    fail_writes: Cell<Option<Failure>>,
    fail_refresh: Cell<Option<Failure>>,
    fail_expenses: Cell<Option<Failure>>,
    calls: RefCell<Vec<String>>,
}

impl FakeService {
    fn with_laptop() -> Self {
        let service = Self {
            next_id: Cell::new(100),
            ..Self::default()
        };
        service.things.borrow_mut().push(Thing {
            id: Some(1),
            name: "Laptop".to_string(),
            pay_date: "2024-01-05T00:00:00Z".to_string(),
            pay_price: 1000,
            sale_date: None,
            sale_price: None,
            days: Some(30),
            pay_day: Some(33.0),
            expenses: None,
        });
        service.expenses.borrow_mut().push(Expense {
            id: Some(10),
            thing_id: 1,
            sum: 50,
            description: "charger".to_string(),
            expense_date: "2024-01-10T00:00:00Z".to_string(),
        });
        service
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn writes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                ["create", "update", "delete"]
                    .iter()
                    .any(|verb| call.starts_with(verb))
            })
            .count()
    }

    fn check(&self, token: &str) -> Result<()> {
        if token != TOKEN {
            return Err(LedgerError::Unauthorized);
        }
        Ok(())
    }

    fn write_check(&self, token: &str) -> Result<()> {
        self.check(token)?;
        match self.fail_writes.get() {
            Some(failure) => Err(failure.error()),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> i64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl Remote for FakeService {
    async fn login(&self, credentials: &Credentials) -> Result<LoginData> {
        self.record("login");
        if credentials.username == "alice" && credentials.password == "Passw0rd" {
            return Ok(LoginData {
                token: TOKEN.to_string(),
                user_id: Some(7),
            });
        }
        Err(LedgerError::Unauthorized)
    }

    async fn register(&self, registration: &Registration) -> Result<()> {
        self.record(format!("register {}", registration.username));
        Ok(())
    }

    async fn things(&self, token: &str) -> Result<Vec<Thing>> {
        self.record("things");
        self.check(token)?;
        if let Some(failure) = self.fail_refresh.get() {
            return Err(failure.error());
        }
        Ok(self.things.borrow().clone())
    }

    async fn create_thing(&self, token: &str, payload: &ThingPayload) -> Result<Option<Thing>> {
        self.record("create thing");
        self.write_check(token)?;
        let thing = Thing {
            id: Some(self.next_id()),
            name: payload.name.clone(),
            pay_date: payload.pay_date.clone(),
            pay_price: payload.pay_price,
            sale_date: payload.sale_date.clone(),
            sale_price: payload.sale_price,
            days: Some(0),
            pay_day: Some(payload.pay_price as f64),
            expenses: None,
        };
        self.things.borrow_mut().push(thing.clone());
        Ok(Some(thing))
    }

    async fn update_thing(
        &self,
        token: &str,
        id: i64,
        payload: &ThingPayload,
    ) -> Result<Option<Thing>> {
        self.record(format!("update thing {id}"));
        self.write_check(token)?;
        let mut things = self.things.borrow_mut();
        if let Some(thing) = things.iter_mut().find(|thing| thing.id == Some(id)) {
            thing.name = payload.name.clone();
            thing.pay_date = payload.pay_date.clone();
            thing.pay_price = payload.pay_price;
        }
        Ok(None)
    }

    async fn delete_thing(&self, token: &str, id: i64) -> Result<()> {
        self.record(format!("delete thing {id}"));
        self.write_check(token)?;
        self.things.borrow_mut().retain(|thing| thing.id != Some(id));
        self.expenses
            .borrow_mut()
            .retain(|expense| expense.thing_id != id);
        Ok(())
    }

    async fn thing_expenses(&self, token: &str, thing_id: i64) -> Result<Vec<Expense>> {
        self.record(format!("expenses {thing_id}"));
        self.check(token)?;
        if let Some(failure) = self.fail_expenses.get() {
            return Err(failure.error());
        }
        Ok(self
            .expenses
            .borrow()
            .iter()
            .filter(|expense| expense.thing_id == thing_id)
            .cloned()
            .collect())
    }

    async fn create_expense(
        &self,
        token: &str,
        payload: &ExpensePayload,
    ) -> Result<Option<Expense>> {
        self.record("create expense");
        self.write_check(token)?;
        let expense = Expense {
            id: Some(self.next_id()),
            thing_id: payload.thing_id,
            sum: payload.sum,
            description: payload.description.clone(),
            expense_date: payload.expense_date.clone(),
        };
        self.expenses.borrow_mut().push(expense.clone());
        Ok(Some(expense))
    }

    async fn update_expense(
        &self,
        token: &str,
        id: i64,
        payload: &ExpensePayload,
    ) -> Result<Option<Expense>> {
        self.record(format!("update expense {id}"));
        self.write_check(token)?;
        let mut expenses = self.expenses.borrow_mut();
        if let Some(expense) = expenses.iter_mut().find(|expense| expense.id == Some(id)) {
            expense.sum = payload.sum;
            expense.description = payload.description.clone();
            expense.expense_date = payload.expense_date.clone();
        }
        Ok(None)
    }

    async fn delete_expense(&self, token: &str, id: i64) -> Result<()> {
        self.record(format!("delete expense {id}"));
        self.write_check(token)?;
        self.expenses
            .borrow_mut()
            .retain(|expense| expense.id != Some(id));
        Ok(())
    }

    async fn update_user(
        &self,
        token: &str,
        user_id: i64,
        payload: &ProfilePayload,
    ) -> Result<()> {
        self.record(format!(
            "update user {user_id} {}",
            payload.username.as_deref().unwrap_or("-")
        ));
        self.write_check(token)
    }
}

fn app() -> App<FakeService> {
    App::new(
        FakeService::with_laptop(),
        Box::new(MemoryTokenStore::new()),
        Settings::default(),
    )
}

async fn logged_in() -> App<FakeService> {
    let mut app = app();
    app.login("alice", "Passw0rd").await.unwrap();
    app
}

#[tokio::test]
async fn login_loads_things_with_display_dates() {
    let app = logged_in().await;

    assert_eq!(app.session().state(), AuthState::Authenticated);
    assert_eq!(app.session().token(), Some(TOKEN));
    assert_eq!(app.session().user_id(), Some(7));

    let things = app.cache().things();
    assert_eq!(things.len(), 1);
    assert_eq!(things[0].name, "Laptop");
    assert_eq!(ledger::dates::display_or_empty(&things[0].pay_date), "05.01.2024");
    assert_eq!(things[0].days, Some(30));
    assert_eq!(things[0].pay_day, Some(33.0));
}

#[tokio::test]
async fn bad_credentials_leave_session_logged_out() {
    let mut app = app();
    let err = app.login("alice", "nope").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(app.session().state(), AuthState::LoggedOut);
    assert!(app.cache().is_empty());
}

#[tokio::test]
async fn add_expense_is_cached_before_the_refresh() {
    let mut app = logged_in().await;
    assert!(app.open_expenses(1).await.unwrap());
    app.open_add_expense(1);
    assert_eq!(app.dialogs().active(), Surface::AddExpense);

    let draft = &mut app.forms_mut().expense.draft;
    draft.sum = "120".to_string();
    draft.description = "new battery".to_string();
    draft.expense_date = "3.2.2024".to_string();

    let SubmitOutcome::Succeeded(follow_up) = app.submit::<ExpenseKind>().await else {
        panic!("expense submit should succeed");
    };

    let calls_before_refresh = app.remote().calls().len();
    let cached = app
        .cache()
        .thing(1)
        .and_then(|thing| thing.expenses.as_ref())
        .unwrap();
    assert!(cached.iter().any(|expense| {
        expense.description == "new battery"
            && expense.thing_id == 1
            && expense.expense_date == "2024-02-03T00:00:00Z"
    }));
    assert_eq!(app.forms().expense.phase(), Phase::Succeeded);
    assert!(app.forms().expense.is_loading());
    assert_eq!(app.dialogs().active(), Surface::AddExpense);

    app.complete(follow_up).await.unwrap();

    let calls = app.remote().calls();
    assert_eq!(&calls[calls_before_refresh..], ["things", "expenses 1"]);
    assert_eq!(app.dialogs().active(), Surface::ExpensesList);
    assert_eq!(app.forms().expense.phase(), Phase::Idle);
    let expenses = app.cache().selected().unwrap().expenses.as_ref().unwrap();
    assert_eq!(expenses.len(), 2);
}

#[tokio::test]
async fn failed_write_leaves_cache_untouched() {
    let mut app = logged_in().await;
    app.open_expenses(1).await.unwrap();
    let snapshot = app.cache().clone();

    app.remote().fail_writes.set(Some(Failure::Remote));
    assert!(app.open_edit_thing(1));
    app.forms_mut().thing.draft.name = "Laptop Pro".to_string();
    let outcome = app.submit::<ThingKind>().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed("name taken, try again".to_string())
    );
    assert_eq!(app.cache(), &snapshot);
    assert_eq!(app.forms().thing.error(), Some("name taken, try again"));
    assert_eq!(app.forms().thing.phase(), Phase::Failed);
    assert!(!app.forms().thing.is_loading());
    assert_eq!(app.dialogs().active(), Surface::EditThing);

    app.remote().fail_writes.set(Some(Failure::Transport));
    let outcome = app.submit::<ThingKind>().await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed("error performing thing operation".to_string())
    );
    assert_eq!(app.cache(), &snapshot);
}

#[tokio::test]
async fn failed_delete_leaves_cache_untouched() {
    let mut app = logged_in().await;
    app.open_expenses(1).await.unwrap();
    let snapshot = app.cache().clone();

    app.remote().fail_writes.set(Some(Failure::Remote));
    let outcome = app.delete::<ExpenseKind>(10, || true).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed("name taken, try again".to_string())
    );
    assert_eq!(app.cache(), &snapshot);
    assert_eq!(app.forms().expense.error(), Some("name taken, try again"));
    assert_eq!(app.forms().expense.phase(), Phase::Failed);
    assert!(!app.forms().expense.is_loading());
    assert_eq!(app.dialogs().active(), Surface::ExpensesList);

    app.remote().fail_writes.set(Some(Failure::Transport));
    let outcome = app.delete::<ThingKind>(1, || true).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed("error performing thing operation".to_string())
    );
    assert_eq!(app.cache(), &snapshot);
    assert_eq!(
        app.forms().thing.error(),
        Some("error performing thing operation")
    );
}

#[tokio::test]
async fn failed_expense_reload_is_reported() {
    let mut app = logged_in().await;
    app.open_expenses(1).await.unwrap();
    app.open_add_expense(1);
    let draft = &mut app.forms_mut().expense.draft;
    draft.sum = "120".to_string();
    draft.description = "new battery".to_string();
    draft.expense_date = "3.2.2024".to_string();

    let SubmitOutcome::Succeeded(follow_up) = app.submit::<ExpenseKind>().await else {
        panic!("expense submit should succeed");
    };

    app.remote().fail_expenses.set(Some(Failure::Transport));
    let err = app.complete(follow_up).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Transport {
            status: Some(500),
            ..
        }
    ));
    assert_eq!(app.session().state(), AuthState::Authenticated);
    assert_eq!(app.dialogs().active(), Surface::ExpensesList);
    assert_eq!(app.forms().expense.phase(), Phase::Idle);
}

#[tokio::test]
async fn invalid_draft_sends_nothing() {
    let mut app = logged_in().await;
    app.open_add_thing();
    let draft = &mut app.forms_mut().thing.draft;
    draft.name = "ab".to_string();
    draft.pay_date = "31.02.2024".to_string();
    draft.pay_price = "0".to_string();

    let outcome = app.submit::<ThingKind>().await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed("name must be at least 3 characters long".to_string())
    );
    assert_eq!(app.remote().writes(), 0);
    assert!(!app.forms().thing.is_loading());
}

#[tokio::test]
async fn cancel_edit_expense_resumes_expense_list() {
    let mut app = logged_in().await;
    app.open_expenses(1).await.unwrap();
    assert_eq!(app.dialogs().active(), Surface::ExpensesList);

    assert!(app.open_edit_expense(10));
    assert_eq!(app.dialogs().active(), Surface::EditExpense);
    assert_eq!(app.forms().expense.draft.expense_date, "10.01.2024");

    app.forms_mut().expense.draft.description = "changed".to_string();
    assert_eq!(app.cancel(), Surface::ExpensesList);
    assert_eq!(app.dialogs().active(), Surface::ExpensesList);
    assert_eq!(app.cache().expense(10).unwrap().description, "charger");
    assert_eq!(app.forms().expense.draft.description, "");
}

#[tokio::test]
async fn edit_expense_submit_resumes_expense_list() {
    let mut app = logged_in().await;
    app.open_expenses(1).await.unwrap();
    assert!(app.open_edit_expense(10));
    app.forms_mut().expense.draft.sum = "75".to_string();

    let SubmitOutcome::Succeeded(follow_up) = app.submit::<ExpenseKind>().await else {
        panic!("expense edit should succeed");
    };
    assert_eq!(app.cache().expense(10).unwrap().sum, 75);

    app.complete(follow_up).await.unwrap();
    assert_eq!(app.dialogs().active(), Surface::ExpensesList);
    assert_eq!(app.cache().expense(10).unwrap().sum, 75);
}

#[tokio::test]
async fn unauthorized_refresh_logs_out() {
    let mut app = logged_in().await;
    app.open_add_thing();
    let draft = &mut app.forms_mut().thing.draft;
    draft.name = "Bike".to_string();
    draft.pay_date = "2024-3-1".to_string();
    draft.pay_price = "300".to_string();

    let SubmitOutcome::Succeeded(follow_up) = app.submit::<ThingKind>().await else {
        panic!("thing submit should succeed");
    };
    assert!(app.cache().things().iter().any(|thing| thing.name == "Bike"));

    app.remote().fail_refresh.set(Some(Failure::Unauthorized));
    let err = app.complete(follow_up).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(app.session().state(), AuthState::LoggedOut);
    assert!(app.cache().is_empty());
    assert_eq!(app.dialogs().active(), Surface::None);
}

#[tokio::test]
async fn unauthorized_write_logs_out() {
    let mut app = logged_in().await;
    app.remote().fail_writes.set(Some(Failure::Unauthorized));
    app.open_profile();
    app.forms_mut().profile.draft.username = "alice2".to_string();

    assert_eq!(app.submit::<ProfileKind>().await, SubmitOutcome::LoggedOut);
    assert!(!app.session().is_authenticated());
    assert!(app.cache().is_empty());
}

#[tokio::test]
async fn failed_refresh_keeps_optimistic_state() {
    let mut app = logged_in().await;
    assert!(app.open_edit_thing(1));
    app.forms_mut().thing.draft.name = "Laptop Pro".to_string();
    let SubmitOutcome::Succeeded(follow_up) = app.submit::<ThingKind>().await else {
        panic!("thing edit should succeed");
    };

    app.remote().fail_refresh.set(Some(Failure::Transport));
    assert!(app.complete(follow_up).await.is_err());
    assert!(app.session().is_authenticated());
    assert_eq!(app.cache().thing(1).unwrap().name, "Laptop Pro");
    assert_eq!(app.dialogs().active(), Surface::None);
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let mut app = logged_in().await;
    let outcome = app.delete::<ThingKind>(1, || false).await;
    assert_eq!(outcome, SubmitOutcome::Declined);
    assert_eq!(app.remote().writes(), 0);
    assert!(app.cache().thing(1).is_some());
}

#[tokio::test]
async fn confirmed_delete_removes_expense() {
    let mut app = logged_in().await;
    app.open_expenses(1).await.unwrap();

    let SubmitOutcome::Succeeded(follow_up) = app.delete::<ExpenseKind>(10, || true).await else {
        panic!("delete should succeed");
    };
    assert!(app.cache().expense(10).is_none());
    assert_eq!(app.dialogs().active(), Surface::ExpensesList);

    app.complete(follow_up).await.unwrap();
    assert_eq!(app.remote().calls().last().map(String::as_str), Some("expenses 1"));
    assert_eq!(app.cache().selected().unwrap().expenses, Some(vec![]));
    assert_eq!(app.dialogs().active(), Surface::ExpensesList);
}

#[tokio::test]
async fn deleting_selected_thing_clears_selection() {
    let mut app = logged_in().await;
    app.open_expenses(1).await.unwrap();
    let SubmitOutcome::Succeeded(follow_up) = app.delete::<ThingKind>(1, || true).await else {
        panic!("delete should succeed");
    };
    app.complete(follow_up).await.unwrap();
    assert!(app.cache().is_empty());
    assert_eq!(app.cache().selected_id(), None);
}

#[tokio::test]
async fn profile_update_addresses_logged_in_user() {
    let mut app = logged_in().await;
    app.open_profile();
    let draft = &mut app.forms_mut().profile.draft;
    draft.username = "alice2".to_string();
    draft.password = "NewPassw0rd".to_string();
    draft.password_confirm = "NewPassw0rd".to_string();

    let SubmitOutcome::Succeeded(follow_up) = app.submit::<ProfileKind>().await else {
        panic!("profile update should succeed");
    };
    app.complete(follow_up).await.unwrap();

    assert!(app.remote().calls().contains(&"update user 7 alice2".to_string()));
    assert_eq!(app.dialogs().active(), Surface::None);
}

#[tokio::test]
async fn restore_uses_stored_token() {
    let stored = StoredToken::issued(TOKEN.to_string(), Some(7), Utc::now());
    let mut app = App::new(
        FakeService::with_laptop(),
        Box::new(MemoryTokenStore::with_token(stored)),
        Settings::default(),
    );
    assert!(app.restore().await.unwrap());
    assert_eq!(app.cache().things().len(), 1);
}

#[tokio::test]
async fn restore_with_rejected_token_logs_out() {
    let stored = StoredToken::issued("stale".to_string(), None, Utc::now());
    let mut app = App::new(
        FakeService::with_laptop(),
        Box::new(MemoryTokenStore::with_token(stored)),
        Settings::default(),
    );
    assert!(!app.restore().await.unwrap());
    assert_eq!(app.session().state(), AuthState::LoggedOut);
}

#[tokio::test]
async fn logout_forgets_stored_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    let mut app = App::new(
        FakeService::with_laptop(),
        Box::new(FileTokenStore::new(&path)),
        Settings::default(),
    );
    app.login("alice", "Passw0rd").await.unwrap();
    assert!(FileTokenStore::new(&path).load().unwrap().is_some());

    app.open_add_thing();
    app.logout();
    assert!(FileTokenStore::new(&path).load().unwrap().is_none());
    assert!(app.cache().is_empty());
    assert_eq!(app.dialogs().active(), Surface::None);
}

#[tokio::test]
async fn register_forwards_to_service() {
    let mut app = app();
    app.register(" bob ", "bob@example.com", "Passw0rd")
        .await
        .unwrap();
    assert_eq!(app.remote().calls(), ["register bob"]);
    assert!(!app.session().is_authenticated());
}
