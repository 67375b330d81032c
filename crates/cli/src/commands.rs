use clap::{Args, Subcommand};
use ledger::{
    App, ExpenseDraft, ExpenseKind, ProfileKind, Remote, ResourceCache, SubmitOutcome, ThingDraft,
    ThingKind, dates,
    types::{Expense, Thing},
};

use crate::{
    error::{AppError, Result},
    prompt,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and keep the token for the next commands.
    Login {
        #[arg(long)]
        username: String,
    },
    /// Forget the stored token.
    Logout,
    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// List things with days held and cost per day.
    List,
    AddThing(ThingFields),
    EditThing {
        id: i64,
        #[command(flatten)]
        fields: ThingFields,
    },
    DeleteThing {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// List the expenses of one thing.
    Expenses { thing_id: i64 },
    AddExpense {
        thing_id: i64,
        #[command(flatten)]
        fields: ExpenseFields,
    },
    EditExpense {
        thing_id: i64,
        expense_id: i64,
        #[command(flatten)]
        fields: ExpenseFields,
    },
    DeleteExpense {
        thing_id: i64,
        expense_id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Change username and/or password.
    Profile {
        #[arg(long)]
        username: Option<String>,
        /// Prompt for a new password.
        #[arg(long)]
        password: bool,
    },
}

/// Dates accept `d.m.yyyy`, `d-m-yyyy`, `d/m/yyyy` or `yyyy-m-d`.
#[derive(Args, Debug, Default)]
pub struct ThingFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub pay_date: Option<String>,
    #[arg(long)]
    pub pay_price: Option<String>,
    /// Pass an empty value to clear it.
    #[arg(long)]
    pub sale_date: Option<String>,
    #[arg(long)]
    pub sale_price: Option<String>,
}

impl ThingFields {
    fn apply(self, draft: &mut ThingDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(pay_date) = self.pay_date {
            draft.pay_date = pay_date;
        }
        if let Some(pay_price) = self.pay_price {
            draft.pay_price = pay_price;
        }
        if let Some(sale_date) = self.sale_date {
            draft.sale_date = sale_date;
        }
        if let Some(sale_price) = self.sale_price {
            draft.sale_price = sale_price;
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ExpenseFields {
    #[arg(long)]
    pub sum: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
}

impl ExpenseFields {
    fn apply(self, draft: &mut ExpenseDraft) {
        if let Some(sum) = self.sum {
            draft.sum = sum;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(date) = self.date {
            draft.expense_date = date;
        }
    }
}

pub async fn run<R: Remote>(app: &mut App<R>, command: Command) -> Result<()> {
    match command {
        Command::Login { username } => {
            let password = prompt::password("Password: ")?;
            app.login(&username, &password).await?;
            println!("logged in as {}", username.trim());
            print_things(app.cache());
            Ok(())
        }
        Command::Logout => {
            app.logout();
            println!("logged out");
            Ok(())
        }
        Command::Register { username, email } => {
            let (password, confirm) = prompt::new_password()?;
            if password != confirm {
                return Err(AppError::Rejected("passwords do not match".to_string()));
            }
            app.register(&username, &email, &password).await?;
            println!("registered {}, log in to continue", username.trim());
            Ok(())
        }
        command => {
            if !app.restore().await? {
                return Err(AppError::NotLoggedIn);
            }
            run_authenticated(app, command).await
        }
    }
}

async fn run_authenticated<R: Remote>(app: &mut App<R>, command: Command) -> Result<()> {
    match command {
        Command::List => print_things(app.cache()),
        Command::AddThing(fields) => {
            app.open_add_thing();
            fields.apply(&mut app.forms_mut().thing.draft);
            let outcome = app.submit::<ThingKind>().await;
            finish(app, outcome, "thing saved").await?;
            print_things(app.cache());
        }
        Command::EditThing { id, fields } => {
            if !app.open_edit_thing(id) {
                return Err(AppError::NotFound(format!("thing {id}")));
            }
            fields.apply(&mut app.forms_mut().thing.draft);
            let outcome = app.submit::<ThingKind>().await;
            finish(app, outcome, "thing saved").await?;
            print_things(app.cache());
        }
        Command::DeleteThing { id, yes } => {
            let Some(thing) = app.cache().thing(id) else {
                return Err(AppError::NotFound(format!("thing {id}")));
            };
            let question = format!("Delete {} and all of its expenses?", thing.name);
            let outcome = app
                .delete::<ThingKind>(id, || yes || prompt::confirm(&question).unwrap_or(false))
                .await;
            finish(app, outcome, "thing deleted").await?;
            print_things(app.cache());
        }
        Command::Expenses { thing_id } => {
            open_expenses(app, thing_id).await?;
            print_expenses(app.cache(), thing_id);
        }
        Command::AddExpense { thing_id, fields } => {
            open_expenses(app, thing_id).await?;
            app.open_add_expense(thing_id);
            fields.apply(&mut app.forms_mut().expense.draft);
            let outcome = app.submit::<ExpenseKind>().await;
            finish(app, outcome, "expense saved").await?;
            print_expenses(app.cache(), thing_id);
        }
        Command::EditExpense {
            thing_id,
            expense_id,
            fields,
        } => {
            open_expenses(app, thing_id).await?;
            if !app.open_edit_expense(expense_id) {
                return Err(AppError::NotFound(format!("expense {expense_id}")));
            }
            fields.apply(&mut app.forms_mut().expense.draft);
            let outcome = app.submit::<ExpenseKind>().await;
            finish(app, outcome, "expense saved").await?;
            print_expenses(app.cache(), thing_id);
        }
        Command::DeleteExpense {
            thing_id,
            expense_id,
            yes,
        } => {
            open_expenses(app, thing_id).await?;
            let Some(expense) = app.cache().expense(expense_id) else {
                return Err(AppError::NotFound(format!("expense {expense_id}")));
            };
            let question = format!("Delete expense \"{}\"?", expense.description);
            let outcome = app
                .delete::<ExpenseKind>(expense_id, || {
                    yes || prompt::confirm(&question).unwrap_or(false)
                })
                .await;
            finish(app, outcome, "expense deleted").await?;
            print_expenses(app.cache(), thing_id);
        }
        Command::Profile { username, password } => {
            app.open_profile();
            let draft = &mut app.forms_mut().profile.draft;
            if let Some(username) = username {
                draft.username = username;
            }
            if password {
                let (first, second) = prompt::new_password()?;
                draft.password = first;
                draft.password_confirm = second;
            }
            let outcome = app.submit::<ProfileKind>().await;
            finish(app, outcome, "profile saved").await?;
        }
        Command::Login { .. } | Command::Logout | Command::Register { .. } => {}
    }
    Ok(())
}

async fn open_expenses<R: Remote>(app: &mut App<R>, thing_id: i64) -> Result<()> {
    if app.open_expenses(thing_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("thing {thing_id}")))
    }
}

async fn finish<R: Remote>(app: &mut App<R>, outcome: SubmitOutcome, done: &str) -> Result<()> {
    match outcome {
        SubmitOutcome::Succeeded(follow_up) => {
            println!("{done}");
            if let Err(err) = app.complete(follow_up).await {
                if !app.session().is_authenticated() {
                    return Err(AppError::NotLoggedIn);
                }
                tracing::warn!("list may be stale: {err}");
            }
            Ok(())
        }
        SubmitOutcome::Failed(message) => Err(AppError::Rejected(message)),
        SubmitOutcome::Declined => {
            println!("nothing deleted");
            Ok(())
        }
        SubmitOutcome::LoggedOut => Err(AppError::NotLoggedIn),
    }
}

fn print_things(cache: &ResourceCache) {
    if cache.is_empty() {
        println!("no things yet");
        return;
    }
    for thing in cache.things() {
        println!("{}", thing_row(thing));
    }
}

fn print_expenses(cache: &ResourceCache, thing_id: i64) {
    let expenses = cache
        .thing(thing_id)
        .and_then(|thing| thing.expenses.as_deref())
        .unwrap_or_default();
    if expenses.is_empty() {
        println!("no expenses");
        return;
    }
    for expense in expenses {
        println!("{}", expense_row(expense));
    }
}

fn thing_row(thing: &Thing) -> String {
    let mut row = format!(
        "#{} {}  bought {} for {}",
        id_or_dash(thing.id),
        thing.name,
        dates::display_or_empty(&thing.pay_date),
        thing.pay_price,
    );
    if let Some(sale_date) = thing.sale_date.as_deref().map(dates::display_or_empty)
        && !sale_date.is_empty()
    {
        row.push_str(&format!("  sold {sale_date}"));
        if let Some(sale_price) = thing.sale_price {
            row.push_str(&format!(" for {sale_price}"));
        }
    }
    if let Some(days) = thing.days {
        row.push_str(&format!("  {days} days"));
    }
    if let Some(pay_day) = thing.pay_day {
        row.push_str(&format!("  {pay_day:.2}/day"));
    }
    row
}

fn expense_row(expense: &Expense) -> String {
    format!(
        "#{} {}  {}  {}",
        id_or_dash(expense.id),
        dates::display_or_empty(&expense.expense_date),
        expense.sum,
        expense.description,
    )
}

fn id_or_dash(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}
