//! Expense actions. Saved locally when offline, like activities.

use crate::{
    core::{
        expense::{self, ExpenseChanges, NewExpense},
        trip,
    },
    entities::{Expense, expense as expense_entity},
    errors::Result,
    flows::SyncContext,
    remote::{RemoteRequest, payloads::ApiExpense},
    sync::SyncOp,
};

pub async fn add_expense(ctx: &SyncContext, new: NewExpense) -> Result<expense_entity::Model> {
    expense::validate_expense_fields(&new.title, new.amount)?;
    trip::require_trip(&ctx.store, new.trip_id).await?;

    let expense_id = ctx.store.next_id::<Expense>().await?;
    let op = SyncOp::new(
        "add expenses",
        RemoteRequest::post(ctx.endpoints.expenses(), &ApiExpense::new(expense_id, &new))?,
    )
    .commit_locally_when_offline();

    ctx.executor
        .execute(&op, |_| expense::insert_expense(&ctx.store, expense_id, &new))
        .await
}

pub async fn update_expense(
    ctx: &SyncContext,
    expense_id: i64,
    changes: ExpenseChanges,
) -> Result<expense_entity::Model> {
    let current = expense::check_expense_updatable(&ctx.store, expense_id, &changes).await?;

    let op = SyncOp::new(
        "update expenses",
        RemoteRequest::put(
            ctx.endpoints.expense(expense_id),
            &ApiExpense::changed(expense_id, current.trip_id, &changes),
        )?,
    )
    .commit_locally_when_offline();

    ctx.executor
        .execute(&op, move |_| {
            expense::apply_expense_changes(&ctx.store, current, changes)
        })
        .await
}

pub async fn delete_expense(ctx: &SyncContext, expense_id: i64) -> Result<()> {
    expense::check_expense_deletable(&ctx.store, expense_id).await?;

    let op = SyncOp::new(
        "delete expenses",
        RemoteRequest::delete(ctx.endpoints.expense(expense_id)),
    )
    .commit_locally_when_offline();

    ctx.executor
        .execute(&op, |_| expense::remove_expense(&ctx.store, expense_id))
        .await
}
