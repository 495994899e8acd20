//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BudgetSettings;
    use crate::ledger::LedgerReader;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn user(db: &Database, name: &str) -> User {
        db.create_user(name, &format!("{}@example.com", name), "hunter22")
            .unwrap()
    }

    fn expense(category: &str, amount: f64, on: &str) -> NewTransaction {
        NewTransaction {
            transaction_type: TransactionType::Expense,
            category: category.to_string(),
            amount,
            description: None,
            date: date(on),
        }
    }

    fn income(category: &str, amount: f64, on: &str) -> NewTransaction {
        NewTransaction {
            transaction_type: TransactionType::Income,
            ..expense(category, amount, on)
        }
    }

    fn monthly_rule(start: &str, end: Option<&str>) -> NewRecurringTransaction {
        NewRecurringTransaction {
            transaction_type: TransactionType::Expense,
            category: "Rent".to_string(),
            amount: 1000.0,
            description: Some("Flat".to_string()),
            frequency: Frequency::Monthly,
            start_date: date(start),
            end_date: end.map(date),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "empty");
        assert!(db.list_transactions(u.id, None).unwrap().is_empty());
        assert!(db.list_budgets(u.id).unwrap().is_empty());
        assert!(db.list_recurring(u.id).unwrap().is_empty());
    }

    #[test]
    fn test_schema_has_expected_tables() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                 ('users', 'api_tokens', 'transactions', 'budgets', 'recurring_transactions')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::in_memory().unwrap();
        db.run_migrations().unwrap();
        user(&db, "again");
    }

    #[test]
    fn test_amount_check_constraint() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "checker");
        let result = db.insert_transaction(u.id, &expense("Food", 0.0, "2024-01-01"));
        assert!(result.is_err());
    }

    // =========================================================================
    // Users and tokens
    // =========================================================================

    #[test]
    fn test_register_rejects_duplicates() {
        let db = Database::in_memory().unwrap();
        user(&db, "sam");

        let err = db
            .create_user("sam", "other@example.com", "pw")
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref m) if m == "Username already exists"));

        let err = db
            .create_user("sammy", "SAM@example.com", "pw")
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref m) if m == "Email already registered"));

        let err = db.create_user("  ", "x@example.com", "pw").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_authenticate_does_not_reveal_which_part_failed() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "kim");

        assert_eq!(db.authenticate("kim", "hunter22").unwrap().id, u.id);

        let wrong_password = db.authenticate("kim", "nope").unwrap_err().to_string();
        let unknown_user = db.authenticate("nobody", "hunter22").unwrap_err().to_string();
        assert_eq!(wrong_password, unknown_user);
    }

    #[test]
    fn test_token_lifecycle() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "tok");

        let token = db.issue_token(u.id).unwrap();
        assert_eq!(token.len(), 64);
        assert_eq!(db.user_for_token(&token).unwrap().unwrap().id, u.id);

        // Only the digest is stored
        let conn = db.conn().unwrap();
        let stored: String = conn
            .query_row("SELECT token_hash FROM api_tokens", [], |row| row.get(0))
            .unwrap();
        assert_ne!(stored, token);
        drop(conn);

        assert!(db.revoke_token(&token).unwrap());
        assert!(db.user_for_token(&token).unwrap().is_none());
        assert!(!db.revoke_token(&token).unwrap());
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    #[test]
    fn test_transaction_crud() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "crud");

        let created = db
            .create_transaction(u.id, &expense("Food", 12.5, "2024-03-01"))
            .unwrap();
        assert_eq!(created.user_id, u.id);
        assert_eq!(created.amount, 12.5);

        let mut edit = income("Refund", 20.0, "2024-03-02");
        edit.description = Some("Store credit".to_string());
        let updated = db.update_transaction(u.id, created.id, &edit).unwrap();
        assert_eq!(updated.transaction_type, TransactionType::Income);
        assert_eq!(updated.category, "Refund");
        assert_eq!(updated.description.as_deref(), Some("Store credit"));

        db.delete_transaction(u.id, created.id).unwrap();
        assert!(db.get_transaction(u.id, created.id).unwrap().is_none());
        assert!(matches!(
            db.delete_transaction(u.id, created.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_list_is_newest_first_with_limit() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "lister");
        for d in ["2024-01-03", "2024-01-01", "2024-01-02"] {
            db.create_transaction(u.id, &expense("Food", 1.0, d)).unwrap();
        }

        let all = db.list_transactions(u.id, None).unwrap();
        let dates: Vec<String> = all.iter().map(|t| t.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);

        assert_eq!(db.list_transactions(u.id, Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_other_users_rows_are_not_found() {
        let db = Database::in_memory().unwrap();
        let owner = user(&db, "owner");
        let intruder = user(&db, "intruder");

        let tx = db
            .create_transaction(owner.id, &expense("Food", 5.0, "2024-01-01"))
            .unwrap();

        assert!(db.get_transaction(intruder.id, tx.id).unwrap().is_none());
        assert!(matches!(
            db.update_transaction(intruder.id, tx.id, &expense("Food", 1.0, "2024-01-01")),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            db.delete_transaction(intruder.id, tx.id),
            Err(Error::NotFound(_))
        ));
        assert!(db.list_transactions(intruder.id, None).unwrap().is_empty());

        // Untouched for the owner
        assert_eq!(db.get_transaction(owner.id, tx.id).unwrap().unwrap().amount, 5.0);
    }

    // =========================================================================
    // Ledger reads
    // =========================================================================

    #[test]
    fn test_ledger_reads_match_in_memory_reader() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "ledger");
        let rows = [
            income("Salary", 2000.0, "2024-01-01"),
            expense("Rent", 800.0, "2024-01-02"),
            expense("Food", 150.0, "2024-01-15"),
            expense("Food", 50.0, "2024-02-01"),
            expense("Bills", 200.0, "2023-02-10"),
        ];
        let mut stored = Vec::new();
        for row in &rows {
            stored.push(db.create_transaction(u.id, row).unwrap());
        }
        let slice = stored.as_slice();

        assert_eq!(
            db.total_by_type(u.id, TransactionType::Expense, None).unwrap(),
            slice.total_by_type(u.id, TransactionType::Expense, None).unwrap()
        );
        assert_eq!(
            db.sum_by_category(u.id, TransactionType::Expense, None).unwrap(),
            slice.sum_by_category(u.id, TransactionType::Expense, None).unwrap()
        );
        assert_eq!(
            db.sum_by_month_of_year(u.id, TransactionType::Expense).unwrap(),
            slice.sum_by_month_of_year(u.id, TransactionType::Expense).unwrap()
        );

        let january = (date("2024-01-01"), date("2024-01-31"));
        assert_eq!(
            db.sum_category(u.id, "Food", TransactionType::Expense, january)
                .unwrap(),
            150.0
        );
        assert_eq!(db.count_transactions(u.id).unwrap(), 5);

        let months = db.sum_by_month_of_year(u.id, TransactionType::Expense).unwrap();
        assert_eq!(
            months,
            vec![
                MonthTotal { month: 1, total: 950.0 },
                MonthTotal { month: 2, total: 250.0 },
            ]
        );
    }

    #[test]
    fn test_category_ties_break_by_name() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "ties");
        db.create_transaction(u.id, &expense("Zoo", 10.0, "2024-01-01")).unwrap();
        db.create_transaction(u.id, &expense("Art", 10.0, "2024-01-01")).unwrap();

        let totals = db
            .sum_by_category(u.id, TransactionType::Expense, None)
            .unwrap();
        assert_eq!(totals[0].category, "Art");
        assert_eq!(totals[1].category, "Zoo");
    }

    // =========================================================================
    // Budgets
    // =========================================================================

    #[test]
    fn test_budget_duplicate_triple_conflicts() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "budgeter");
        let food = NewBudget {
            category: "Food".to_string(),
            amount: 300.0,
            period: BudgetPeriod::Monthly,
        };
        db.create_budget(u.id, &food).unwrap();

        let err = db.create_budget(u.id, &food).unwrap_err();
        assert_eq!(err.to_string(), "A monthly budget for Food already exists");

        // Same category, different period is fine
        let weekly = db
            .create_budget(
                u.id,
                &NewBudget {
                    period: BudgetPeriod::Weekly,
                    ..food.clone()
                },
            )
            .unwrap();

        // Moving the weekly one onto the monthly slot conflicts too
        assert!(matches!(
            db.update_budget(u.id, weekly.id, 50.0, BudgetPeriod::Monthly),
            Err(Error::Conflict(_))
        ));
        // Keeping its own period while changing the amount is fine
        let updated = db
            .update_budget(u.id, weekly.id, 75.0, BudgetPeriod::Weekly)
            .unwrap();
        assert_eq!(updated.amount, 75.0);

        // A different user may reuse the triple
        let other = user(&db, "other");
        db.create_budget(other.id, &food).unwrap();
    }

    #[test]
    fn test_budget_progress_uses_current_window() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "progress");
        db.create_budget(
            u.id,
            &NewBudget {
                category: "Food".to_string(),
                amount: 100.0,
                period: BudgetPeriod::Monthly,
            },
        )
        .unwrap();
        db.create_transaction(u.id, &expense("Food", 85.0, "2024-05-03")).unwrap();
        db.create_transaction(u.id, &expense("Food", 500.0, "2024-04-30")).unwrap();

        let list = db
            .list_budgets_with_progress(u.id, date("2024-05-20"), &BudgetSettings::default())
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].progress.spent, 85.0);
        assert_eq!(list[0].progress.status, BudgetStatus::Warning);
    }

    #[test]
    fn test_budget_delete_scoped() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "b1");
        let other = user(&db, "b2");
        let b = db
            .create_budget(
                u.id,
                &NewBudget {
                    category: "Fun".to_string(),
                    amount: 20.0,
                    period: BudgetPeriod::Yearly,
                },
            )
            .unwrap();

        assert!(matches!(db.delete_budget(other.id, b.id), Err(Error::NotFound(_))));
        db.delete_budget(u.id, b.id).unwrap();
        assert!(db.get_budget(u.id, b.id).unwrap().is_none());
    }

    // =========================================================================
    // Recurring
    // =========================================================================

    #[test]
    fn test_generate_now_advances_atomically() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "rec");
        let rule = db
            .create_recurring(u.id, &monthly_rule("2024-01-31", None))
            .unwrap();

        let first = db.generate_now(u.id, rule.id).unwrap();
        assert_eq!(first.date, date("2024-02-29"));
        assert_eq!(first.description.as_deref(), Some("Flat (Recurring)"));

        let second = db.generate_now(u.id, rule.id).unwrap();
        assert_eq!(second.date, date("2024-03-29"));

        let stored = db.get_recurring(u.id, rule.id).unwrap().unwrap();
        assert_eq!(stored.last_generated, Some(date("2024-03-29")));
        assert_eq!(db.list_transactions(u.id, None).unwrap().len(), 2);
    }

    #[test]
    fn test_generate_now_rejects_inactive_and_ended() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "rej");

        let ended = db
            .create_recurring(u.id, &monthly_rule("2024-01-01", Some("2024-01-15")))
            .unwrap();
        let err = db.generate_now(u.id, ended.id).unwrap_err();
        assert_eq!(err.to_string(), "This recurring transaction has ended.");
        assert!(db.list_transactions(u.id, None).unwrap().is_empty());
        assert_eq!(
            db.get_recurring(u.id, ended.id).unwrap().unwrap().last_generated,
            None
        );

        let paused = db
            .create_recurring(u.id, &monthly_rule("2024-01-01", None))
            .unwrap();
        db.update_recurring(
            u.id,
            paused.id,
            &RecurringUpdate {
                amount: 900.0,
                description: None,
                frequency: Frequency::Monthly,
                end_date: None,
                is_active: false,
            },
        )
        .unwrap();
        let err = db.generate_now(u.id, paused.id).unwrap_err();
        assert_eq!(err.to_string(), "This recurring transaction is inactive.");

        let other = user(&db, "rej2");
        assert!(matches!(
            db.generate_now(other.id, paused.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_generate_due_catches_up_to_today() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "due");
        db.create_recurring(u.id, &monthly_rule("2024-01-15", Some("2024-04-15")))
            .unwrap();
        let mut weekly = monthly_rule("2024-03-01", None);
        weekly.frequency = Frequency::Weekly;
        weekly.category = "Groceries".to_string();
        db.create_recurring(u.id, &weekly).unwrap();

        let generated = db.generate_due(u.id, date("2024-03-20")).unwrap();
        let mut dates: Vec<String> = generated.iter().map(|t| t.date.to_string()).collect();
        dates.sort();
        assert_eq!(
            dates,
            vec!["2024-02-15", "2024-03-08", "2024-03-15", "2024-03-15"]
        );

        // Nothing new on the same day
        assert!(db.generate_due(u.id, date("2024-03-20")).unwrap().is_empty());

        // Monthly rule stops at its end date
        let later = db.generate_due(u.id, date("2024-06-01")).unwrap();
        let rent: Vec<String> = later
            .iter()
            .filter(|t| t.category == "Rent")
            .map(|t| t.date.to_string())
            .collect();
        assert_eq!(rent, vec!["2024-04-15"]);
    }

    #[test]
    fn test_list_recurring_with_next() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "next");
        let active = db
            .create_recurring(u.id, &monthly_rule("2024-01-10", None))
            .unwrap();
        let inactive = db
            .create_recurring(u.id, &monthly_rule("2023-06-01", None))
            .unwrap();
        db.update_recurring(
            u.id,
            inactive.id,
            &RecurringUpdate {
                amount: 1.0,
                description: None,
                frequency: Frequency::Yearly,
                end_date: None,
                is_active: false,
            },
        )
        .unwrap();

        let list = db.list_recurring_with_next(u.id).unwrap();
        assert_eq!(list.len(), 2);
        // start_date desc
        assert_eq!(list[0].recurring.id, active.id);
        assert_eq!(list[0].next_date, Some(date("2024-02-10")));
        assert_eq!(list[1].next_date, None);
    }

    #[test]
    fn test_deleting_rule_keeps_generated_transactions() {
        let db = Database::in_memory().unwrap();
        let u = user(&db, "keep");
        let rule = db
            .create_recurring(u.id, &monthly_rule("2024-01-01", None))
            .unwrap();
        db.generate_now(u.id, rule.id).unwrap();

        db.delete_recurring(u.id, rule.id).unwrap();
        assert!(db.get_recurring(u.id, rule.id).unwrap().is_none());
        assert_eq!(db.list_transactions(u.id, None).unwrap().len(), 1);
    }
}
