//! Local checks run on a draft before anything is sent.
//!
//! Each check stops at the first failing rule. On success it hands back the
//! wire payload with every date normalized, so nothing downstream has to read
//! the draft again.
use api_types::{expense::ExpensePayload, thing::ThingPayload, user::ProfilePayload};
use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    dates,
    draft::{ExpenseDraft, ProfileDraft, ThingDraft},
};

const MIN_NAME_LEN: usize = 3;
const MIN_DESCRIPTION_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must be at least 3 characters long")]
    NameTooShort,
    #[error("purchase date is required")]
    PurchaseDateMissing,
    #[error("purchase date is not a valid date")]
    PurchaseDateInvalid,
    #[error("purchase price must be a whole number greater than 0")]
    PurchasePriceInvalid,
    #[error("sale date is not a valid date")]
    SaleDateInvalid,
    #[error("sale price must be a whole number, 0 or more")]
    SalePriceInvalid,
    #[error("expense must belong to a thing")]
    ThingMissing,
    #[error("amount must be a whole number greater than 0")]
    AmountInvalid,
    #[error("description must be at least 3 characters long")]
    DescriptionTooShort,
    #[error("expense date is required")]
    ExpenseDateMissing,
    #[error("expense date is not a valid date")]
    ExpenseDateInvalid,
    #[error("enter a new username or a new password")]
    ProfileEmpty,
    #[error("password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("password must contain a lowercase letter")]
    PasswordNeedsLowercase,
    #[error("password must contain an uppercase letter")]
    PasswordNeedsUppercase,
    #[error("password must contain a digit")]
    PasswordNeedsDigit,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("profile is not linked to a user")]
    UserUnknown,
}

pub fn thing(draft: &ThingDraft) -> Result<ThingPayload, ValidationError> {
    let name = draft.name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort);
    }

    let pay_date = required_date(
        &draft.pay_date,
        ValidationError::PurchaseDateMissing,
        ValidationError::PurchaseDateInvalid,
    )?;

    let pay_price = parse_whole(&draft.pay_price)
        .filter(|price| *price > 0)
        .ok_or(ValidationError::PurchasePriceInvalid)?;

    let sale_date = if draft.sale_date.trim().is_empty() {
        None
    } else {
        Some(required_date(
            &draft.sale_date,
            ValidationError::SaleDateInvalid,
            ValidationError::SaleDateInvalid,
        )?)
    };

    let sale_price = if draft.sale_price.trim().is_empty() {
        None
    } else {
        Some(
            parse_whole(&draft.sale_price)
                .filter(|price| *price >= 0)
                .ok_or(ValidationError::SalePriceInvalid)?,
        )
    };

    Ok(ThingPayload {
        name: name.to_string(),
        pay_date: dates::to_wire(pay_date),
        pay_price,
        sale_date: sale_date.map(dates::to_wire),
        sale_price,
    })
}

pub fn expense(draft: &ExpenseDraft) -> Result<ExpensePayload, ValidationError> {
    let thing_id = draft.thing_id.ok_or(ValidationError::ThingMissing)?;

    let sum = parse_whole(&draft.sum)
        .filter(|sum| *sum > 0)
        .ok_or(ValidationError::AmountInvalid)?;

    let description = draft.description.trim();
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooShort);
    }

    let expense_date = required_date(
        &draft.expense_date,
        ValidationError::ExpenseDateMissing,
        ValidationError::ExpenseDateInvalid,
    )?;

    Ok(ExpensePayload {
        thing_id,
        sum,
        description: description.to_string(),
        expense_date: dates::to_wire(expense_date),
    })
}

pub fn profile(draft: &ProfileDraft) -> Result<ProfilePayload, ValidationError> {
    let username = draft.username.trim();
    let password = draft.password.as_str();
    if username.is_empty() && password.is_empty() {
        return Err(ValidationError::ProfileEmpty);
    }

    if !password.is_empty() {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(ValidationError::PasswordNeedsLowercase);
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(ValidationError::PasswordNeedsUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::PasswordNeedsDigit);
        }
        if password != draft.password_confirm {
            return Err(ValidationError::PasswordMismatch);
        }
    }

    if draft.user_id.is_none() {
        return Err(ValidationError::UserUnknown);
    }

    Ok(ProfilePayload {
        username: (!username.is_empty()).then(|| username.to_string()),
        password: (!password.is_empty()).then(|| password.to_string()),
    })
}

fn required_date(
    text: &str,
    missing: ValidationError,
    invalid: ValidationError,
) -> Result<NaiveDate, ValidationError> {
    let canonical = dates::normalize(text);
    if canonical.is_empty() {
        return Err(missing);
    }
    dates::parse_canonical(&canonical).ok_or(invalid)
}

fn parse_whole(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}
