//! Expense business logic.
//!
//! Expenses stay editable for [`guards::EXPENSE_EDIT_WINDOW_DAYS`] whole days
//! after their date.

use crate::{
    core::{ListQuery, guards, guards::GuardAction, ids, require_text},
    entities::{Expense, Trip, expense},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

const TITLE_REQUIRED: &str = "Please enter expense title";

/// An expense about to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub trip_id: i64,
    pub title: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
}

/// Replacement values for every editable field of an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseChanges {
    pub title: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
}

pub fn validate_expense_fields(title: &str, amount: f64) -> Result<()> {
    require_text(title, TITLE_REQUIRED)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(format!(
            "Amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}

pub async fn insert_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    new: &NewExpense,
) -> Result<expense::Model> {
    validate_expense_fields(&new.title, new.amount)?;

    let txn = db.begin().await?;

    if Trip::find_by_id(new.trip_id).one(&txn).await?.is_none() {
        return Err(Error::NotFound {
            entity: "Trip",
            id: new.trip_id,
        });
    }
    if Expense::find_by_id(expense_id).one(&txn).await?.is_some() {
        return Err(Error::validation(format!(
            "Expense {expense_id} already exists"
        )));
    }

    let model = expense::ActiveModel {
        id: Set(expense_id),
        trip_id: Set(new.trip_id),
        title: Set(new.title.trim().to_string()),
        amount: Set(new.amount),
        date: Set(new.date),
    }
    .insert(&txn)
    .await?;

    ids::record_issued_id::<Expense, _>(&txn, expense_id).await?;
    txn.commit().await?;

    info!(id = expense_id, amount = new.amount, "Expense stored");
    Ok(model)
}

pub async fn get_expense_by_id(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Option<expense::Model>> {
    Expense::find_by_id(expense_id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn require_expense(db: &DatabaseConnection, expense_id: i64) -> Result<expense::Model> {
    get_expense_by_id(db, expense_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Expense",
            id: expense_id,
        })
}

pub async fn check_expense_updatable(
    db: &DatabaseConnection,
    expense_id: i64,
    changes: &ExpenseChanges,
) -> Result<expense::Model> {
    validate_expense_fields(&changes.title, changes.amount)?;
    let expense = require_expense(db, expense_id).await?;
    guards::ensure_expense_recent(&expense, GuardAction::Update, Utc::now())?;
    Ok(expense)
}

pub async fn update_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    changes: ExpenseChanges,
) -> Result<expense::Model> {
    let expense = check_expense_updatable(db, expense_id, &changes).await?;
    apply_expense_changes(db, expense, changes).await
}

/// Writes `changes` without re-checking the edit window.
pub async fn apply_expense_changes(
    db: &DatabaseConnection,
    expense: expense::Model,
    changes: ExpenseChanges,
) -> Result<expense::Model> {
    let expense_id = expense.id;
    let mut active_model: expense::ActiveModel = expense.into();
    active_model.title = Set(changes.title.trim().to_string());
    active_model.amount = Set(changes.amount);
    active_model.date = Set(changes.date);

    let updated = active_model.update(db).await?;
    info!(id = expense_id, "Expense updated");
    Ok(updated)
}

pub async fn check_expense_deletable(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<expense::Model> {
    let expense = require_expense(db, expense_id).await?;
    guards::ensure_expense_recent(&expense, GuardAction::Delete, Utc::now())?;
    Ok(expense)
}

pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    check_expense_deletable(db, expense_id).await?;
    remove_expense(db, expense_id).await
}

pub async fn remove_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    Expense::delete_by_id(expense_id).exec(db).await?;
    info!(id = expense_id, "Expense deleted");
    Ok(())
}

/// Expenses sorted by date, optionally limited to one trip and filtered on
/// title.
pub async fn list_expenses(
    db: &DatabaseConnection,
    query: &ListQuery,
) -> Result<Vec<expense::Model>> {
    let mut select = Expense::find();
    if let Some(trip_id) = query.parent_id {
        select = select.filter(expense::Column::TripId.eq(trip_id));
    }

    let expenses = select
        .order_by(expense::Column::Date, query.order.into())
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await?;

    Ok(expenses
        .into_iter()
        .filter(|e| query.matches(&[&e.title]))
        .collect())
}

/// Sum of all expense amounts for one trip.
pub async fn total_for_trip(db: &DatabaseConnection, trip_id: i64) -> Result<f64> {
    let expenses = list_expenses(db, &ListQuery::within(trip_id)).await?;
    Ok(expenses.iter().map(|e| e.amount).sum())
}
