//! # Expense Repository
//!
//! The flat expense ledger: add, edit, delete, list.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stota_core::validation::{validate_comment, validate_expense_amount};
use stota_core::{CoreError, Expense, Money};

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense stamped with the current time.
    ///
    /// ## Returns
    /// * `Ok(Expense)` - With its assigned id
    /// * `Err(Domain(Validation))` - Amount not positive or blank comment
    pub async fn add(&self, amount: Money, comment: &str) -> DbResult<Expense> {
        validate_expense_amount(amount).map_err(CoreError::from)?;
        validate_comment(comment).map_err(CoreError::from)?;

        let comment = comment.trim();
        let now = Utc::now();
        debug!(amount = %amount, "Adding expense");

        let result = sqlx::query(
            "INSERT INTO expenses (created_at, amount_cents, comment) VALUES (?1, ?2, ?3)",
        )
        .bind(now)
        .bind(amount.cents())
        .bind(comment)
        .execute(&self.pool)
        .await?;

        Ok(Expense {
            id: result.last_insert_rowid(),
            created_at: now,
            amount_cents: amount.cents(),
            comment: comment.to_string(),
        })
    }

    /// Replaces amount and comment; `created_at` is kept.
    pub async fn edit(&self, id: i64, amount: Money, comment: &str) -> DbResult<Expense> {
        validate_expense_amount(amount).map_err(CoreError::from)?;
        validate_comment(comment).map_err(CoreError::from)?;
        debug!(id, amount = %amount, "Editing expense");

        let result = sqlx::query("UPDATE expenses SET amount_cents = ?2, comment = ?3 WHERE id = ?1")
            .bind(id)
            .bind(amount.cents())
            .bind(comment.trim())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ExpenseNotFound(id).into());
        }

        self.get(id)
            .await?
            .ok_or_else(|| CoreError::ExpenseNotFound(id).into())
    }

    /// Removes an expense. A no-op when it does not exist.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting expense");

        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            "SELECT id, created_at, amount_cents, comment FROM expenses WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// All expenses, newest first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            "SELECT id, created_at, amount_cents, comment FROM expenses ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = expenses.len(), "Listed expenses");
        Ok(expenses)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use stota_core::{CoreError, Money};

    #[tokio::test]
    async fn test_add_edit_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        let rent = repo.add(Money::from_cents(50_000), " rent ").await.unwrap();
        assert_eq!(rent.comment, "rent");

        let edited = repo.edit(rent.id, Money::from_cents(45_000), "rent (discounted)").await.unwrap();
        assert_eq!(edited.amount_cents, 45_000);
        assert_eq!(edited.created_at, rent.created_at);

        assert!(repo.delete(rent.id).await.unwrap());
        assert!(!repo.delete(rent.id).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_and_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        let zero = repo.add(Money::zero(), "rent").await.unwrap_err();
        assert!(matches!(zero.as_domain(), Some(CoreError::Validation(_))));

        let blank = repo.add(Money::from_cents(100), "  ").await.unwrap_err();
        assert!(matches!(blank.as_domain(), Some(CoreError::Validation(_))));

        let missing = repo.edit(42, Money::from_cents(100), "x").await.unwrap_err();
        assert_eq!(missing.as_domain(), Some(&CoreError::ExpenseNotFound(42)));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        let first = repo.add(Money::from_cents(100), "first").await.unwrap();
        let second = repo.add(Money::from_cents(200), "second").await.unwrap();

        let ids: Vec<i64> = repo.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
