//! # Expense Commands

use serde::Serialize;

use super::Context;
use crate::cli::ExpenseCommand;
use crate::config::AppConfig;
use crate::error::AppResult;
use stota_core::Expense;

#[derive(Serialize)]
struct Deleted {
    id: i64,
    deleted: bool,
}

pub async fn run(ctx: &Context, cmd: ExpenseCommand) -> AppResult<()> {
    let expenses = ctx.db.expenses();

    match cmd {
        ExpenseCommand::Add { amount, comment } => {
            let expense = expenses.add(amount, &comment).await?;
            ctx.emit(&expense, render_one)
        }
        ExpenseCommand::Edit {
            id,
            amount,
            comment,
        } => {
            let expense = expenses.edit(id, amount, &comment).await?;
            ctx.emit(&expense, render_one)
        }
        ExpenseCommand::Delete { id } => {
            let deleted = expenses.delete(id).await?;
            ctx.emit(&Deleted { id, deleted }, |_, d| {
                if d.deleted {
                    format!("Deleted expense {}", d.id)
                } else {
                    format!("No expense {}", d.id)
                }
            })
        }
        ExpenseCommand::List => {
            let all = expenses.list().await?;
            ctx.emit(all.as_slice(), render_table)
        }
    }
}

fn render_one(config: &AppConfig, e: &Expense) -> String {
    format!(
        "#{} {} {} {}",
        e.id,
        e.created_at.format("%Y-%m-%d %H:%M:%S"),
        config.money(e.amount()),
        e.comment
    )
}

fn render_table(config: &AppConfig, expenses: &[Expense]) -> String {
    if expenses.is_empty() {
        return "No expenses".to_string();
    }
    expenses
        .iter()
        .map(|e| render_one(config, e))
        .collect::<Vec<_>>()
        .join("\n")
}
