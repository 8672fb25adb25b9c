//! Bank reconciliation service.
//!
//! Records bank statement rows, keeps account balances current, and matches
//! transactions to internal income/expense records by exact amount and
//! channel equality.

use rust_decimal::Decimal;
use tallybook_shared::types::{BankAccountId, BankTransactionId, ExpenseId, IncomeId};
use tracing::{info, warn};

use super::error::ReconcileError;
use super::types::{
    AccountSummary, BankAccount, BankTransaction, Direction, NewBankTransaction,
    ReconciliationReport,
};
use crate::audit::{self, AuditEntityType, AuditRecorder, NewAuditLog, OperationType};
use crate::ledger::BankChannel;
use crate::store::Gateway;

/// The bank reconciliation service.
pub struct ReconcileService<'a> {
    store: &'a dyn Gateway,
    audit: AuditRecorder<'a>,
}

impl<'a> ReconcileService<'a> {
    /// Creates a reconciliation service over the given gateway and recorder.
    #[must_use]
    pub fn new(store: &'a dyn Gateway, audit: AuditRecorder<'a>) -> Self {
        Self { store, audit }
    }

    /// Registers the bank account for a channel.
    ///
    /// Exactly one account may exist per channel, so balance reads and
    /// balance writes always agree on the same row.
    pub fn register_account(
        &self,
        channel: BankChannel,
        opening_balance: Decimal,
        operator: &str,
    ) -> Result<BankAccountId, ReconcileError> {
        self.audit.ensure_operator(operator)?;
        if opening_balance < Decimal::ZERO {
            return Err(ReconcileError::NegativeOpeningBalance);
        }
        if self.account_for(channel)?.is_some() {
            return Err(ReconcileError::DuplicateChannel(channel));
        }
        let account = BankAccount {
            id: BankAccountId::new(),
            channel,
            balance: opening_balance,
            version: 0,
        };
        let id = self.store.save_bank_account(account.clone())?;
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Create,
            entity_type: AuditEntityType::BankAccount,
            entity_id: id.to_string(),
            entity_name: format!("channel {channel}"),
            operator: operator.to_string(),
            description: format!(
                "Registered bank account on channel {channel} with opening balance {opening_balance}"
            ),
            old_value: None,
            new_value: audit::snapshot(&account),
            notes: None,
        })?;
        info!(account_id = %id, %channel, "bank account registered");
        Ok(id)
    }

    /// Records a statement row and immediately applies it to the account
    /// balance.
    ///
    /// The stored amount is signed: outflows negative. An outflow larger than
    /// the current balance is rejected before any write.
    pub fn record_transaction(
        &self,
        input: NewBankTransaction,
        operator: &str,
    ) -> Result<BankTransactionId, ReconcileError> {
        self.audit.ensure_operator(operator)?;
        if input.amount <= Decimal::ZERO {
            return Err(ReconcileError::NonPositiveAmount);
        }
        let account = self
            .account_for(input.channel)?
            .ok_or(ReconcileError::AccountNotFound(input.channel))?;
        if input.direction == Direction::Outflow && input.amount > account.balance {
            warn!(
                channel = %input.channel,
                balance = %account.balance,
                requested = %input.amount,
                "debit rejected for insufficient balance"
            );
            return Err(ReconcileError::InsufficientBalance {
                balance: account.balance,
                requested: input.amount,
            });
        }

        let signed = match input.direction {
            Direction::Inflow => input.amount,
            Direction::Outflow => -input.amount,
        };
        let transaction = BankTransaction {
            id: BankTransactionId::new(),
            channel: input.channel,
            amount: signed,
            counterparty: input.counterparty,
            occurred_on: input.occurred_on,
            matched: false,
            matched_income: None,
            matched_expense: None,
        };
        let id = self.store.save_bank_transaction(transaction.clone())?;
        self.update_account_balance(input.channel, input.amount, input.direction, operator)?;
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Create,
            entity_type: AuditEntityType::BankTransaction,
            entity_id: id.to_string(),
            entity_name: transaction.counterparty.clone(),
            operator: operator.to_string(),
            description: format!(
                "Recorded bank transaction {signed} on channel {} ({})",
                transaction.channel, transaction.occurred_on
            ),
            old_value: None,
            new_value: audit::snapshot(&transaction),
            notes: None,
        })?;
        info!(transaction_id = %id, amount = %signed, "bank transaction recorded");
        Ok(id)
    }

    /// Applies a balance delta to the channel's account and returns the new
    /// balance.
    ///
    /// Rejects a debit exceeding the current balance.
    pub fn update_account_balance(
        &self,
        channel: BankChannel,
        amount: Decimal,
        direction: Direction,
        operator: &str,
    ) -> Result<Decimal, ReconcileError> {
        self.audit.ensure_operator(operator)?;
        if amount <= Decimal::ZERO {
            return Err(ReconcileError::NonPositiveAmount);
        }
        let mut account = self
            .account_for(channel)?
            .ok_or(ReconcileError::AccountNotFound(channel))?;
        let before = audit::snapshot(&account);
        match direction {
            Direction::Inflow => account.balance += amount,
            Direction::Outflow => {
                if amount > account.balance {
                    return Err(ReconcileError::InsufficientBalance {
                        balance: account.balance,
                        requested: amount,
                    });
                }
                account.balance -= amount;
            }
        }
        self.store.save_bank_account(account.clone())?;
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Update,
            entity_type: AuditEntityType::BankAccount,
            entity_id: account.id.to_string(),
            entity_name: format!("channel {channel}"),
            operator: operator.to_string(),
            description: format!("Balance updated to {}", account.balance),
            old_value: before,
            new_value: audit::snapshot(&account),
            notes: None,
        })?;
        Ok(account.balance)
    }

    /// Matches a bank transaction to an income record.
    ///
    /// Requires the transaction to be unmatched, its amount magnitude to
    /// equal the income's amount exactly, and both to be on the same channel.
    pub fn match_transaction_to_income(
        &self,
        transaction_id: BankTransactionId,
        income_id: IncomeId,
        operator: &str,
    ) -> Result<(), ReconcileError> {
        self.audit.ensure_operator(operator)?;
        let transaction = self.unmatched_transaction(transaction_id)?;
        let income = self
            .store
            .get_income(income_id)?
            .ok_or(ReconcileError::IncomeNotFound(income_id))?;
        Self::validate_match(&transaction, income.amount, income.channel)?;

        let mut transaction = transaction;
        let before = audit::snapshot(&transaction);
        transaction.matched = true;
        transaction.matched_income = Some(income_id);
        self.store.save_bank_transaction(transaction.clone())?;
        self.log_match(&transaction, before, &format!("income {income_id}"), operator)?;
        Ok(())
    }

    /// Matches a bank transaction to an expense record.
    pub fn match_transaction_to_expense(
        &self,
        transaction_id: BankTransactionId,
        expense_id: ExpenseId,
        operator: &str,
    ) -> Result<(), ReconcileError> {
        self.audit.ensure_operator(operator)?;
        let transaction = self.unmatched_transaction(transaction_id)?;
        let expense = self
            .store
            .get_expense(expense_id)?
            .ok_or(ReconcileError::ExpenseNotFound(expense_id))?;
        Self::validate_match(&transaction, expense.amount, expense.channel)?;

        let mut transaction = transaction;
        let before = audit::snapshot(&transaction);
        transaction.matched = true;
        transaction.matched_expense = Some(expense_id);
        self.store.save_bank_transaction(transaction.clone())?;
        self.log_match(&transaction, before, &format!("expense {expense_id}"), operator)?;
        Ok(())
    }

    /// Returns all transactions not yet matched to an internal record.
    pub fn unmatched_transactions(&self) -> Result<Vec<BankTransaction>, ReconcileError> {
        Ok(self
            .store
            .list_bank_transactions()?
            .into_iter()
            .filter(|t| !t.matched)
            .collect())
    }

    /// Summarizes one channel's account and transaction match state.
    pub fn account_summary(&self, channel: BankChannel) -> Result<AccountSummary, ReconcileError> {
        let account = self
            .account_for(channel)?
            .ok_or(ReconcileError::AccountNotFound(channel))?;
        let mut summary = AccountSummary {
            channel,
            balance: account.balance,
            inflow_total: Decimal::ZERO,
            outflow_total: Decimal::ZERO,
            matched_count: 0,
            unmatched_count: 0,
        };
        for transaction in self
            .store
            .list_bank_transactions()?
            .iter()
            .filter(|t| t.channel == channel)
        {
            match transaction.direction() {
                Direction::Inflow => summary.inflow_total += transaction.magnitude(),
                Direction::Outflow => summary.outflow_total += transaction.magnitude(),
            }
            if transaction.matched {
                summary.matched_count += 1;
            } else {
                summary.unmatched_count += 1;
            }
        }
        Ok(summary)
    }

    /// Produces the whole-book reconciliation report.
    ///
    /// The book is reconciled exactly when no unmatched transaction remains
    /// on any channel. Channels without a registered account are skipped.
    pub fn reconcile(&self) -> Result<ReconciliationReport, ReconcileError> {
        let mut accounts = Vec::new();
        for channel in BankChannel::ALL {
            if self.account_for(channel)?.is_some() {
                accounts.push(self.account_summary(channel)?);
            }
        }
        let total_unmatched = accounts.iter().map(|a| a.unmatched_count).sum();
        Ok(ReconciliationReport {
            accounts,
            total_unmatched,
            reconciled: total_unmatched == 0,
        })
    }

    fn account_for(&self, channel: BankChannel) -> Result<Option<BankAccount>, ReconcileError> {
        Ok(self
            .store
            .list_bank_accounts()?
            .into_iter()
            .find(|a| a.channel == channel))
    }

    fn unmatched_transaction(
        &self,
        id: BankTransactionId,
    ) -> Result<BankTransaction, ReconcileError> {
        let transaction = self
            .store
            .get_bank_transaction(id)?
            .ok_or(ReconcileError::TransactionNotFound(id))?;
        if transaction.matched {
            return Err(ReconcileError::AlreadyMatched(id));
        }
        Ok(transaction)
    }

    fn validate_match(
        transaction: &BankTransaction,
        target_amount: Decimal,
        target_channel: BankChannel,
    ) -> Result<(), ReconcileError> {
        if transaction.channel != target_channel {
            return Err(ReconcileError::ChannelMismatch {
                transaction: transaction.channel,
                target: target_channel,
            });
        }
        if transaction.magnitude() != target_amount {
            return Err(ReconcileError::AmountMismatch {
                transaction: transaction.magnitude(),
                target: target_amount,
            });
        }
        Ok(())
    }

    fn log_match(
        &self,
        transaction: &BankTransaction,
        before: Option<serde_json::Value>,
        target: &str,
        operator: &str,
    ) -> Result<(), ReconcileError> {
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Match,
            entity_type: AuditEntityType::BankTransaction,
            entity_id: transaction.id.to_string(),
            entity_name: transaction.counterparty.clone(),
            operator: operator.to_string(),
            description: format!(
                "Matched transaction {} on channel {} to {target}",
                transaction.amount, transaction.channel
            ),
            old_value: before,
            new_value: audit::snapshot(transaction),
            notes: None,
        })?;
        info!(transaction_id = %transaction.id, target, "bank transaction matched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ExpenseCategory, LedgerService, NewExpense, NewIncome};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tallybook_shared::config::AuditConfig;
    use tallybook_shared::types::CustomerId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        store: MemoryStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: MemoryStore::new(),
            }
        }

        fn reconciler(&self) -> ReconcileService<'_> {
            ReconcileService::new(
                &self.store,
                AuditRecorder::new(&self.store, AuditConfig::default()),
            )
        }

        fn ledger(&self) -> LedgerService<'_> {
            LedgerService::new(
                &self.store,
                AuditRecorder::new(&self.store, AuditConfig::default()),
            )
        }

        fn income(&self, amount: rust_decimal::Decimal, channel: BankChannel) -> IncomeId {
            let customer = crate::ledger::Customer {
                id: CustomerId::new(),
                name: "Harbor Mills".into(),
            };
            let customer_id = self.store.save_customer(customer).unwrap();
            self.ledger()
                .record_accrual_income(
                    NewIncome {
                        customer_id,
                        amount,
                        channel,
                        has_invoice: true,
                        occurred_on: date(2024, 1, 15),
                        settled_on: None,
                        notes: None,
                    },
                    "anna",
                )
                .unwrap()
        }

        fn expense(&self, amount: rust_decimal::Decimal, channel: BankChannel) -> ExpenseId {
            self.ledger()
                .record_accrual_expense(
                    NewExpense {
                        category: ExpenseCategory::Freight,
                        supplier_id: None,
                        amount,
                        channel,
                        has_invoice: false,
                        related_order: None,
                        occurred_on: date(2024, 1, 10),
                        settled_on: None,
                        notes: None,
                    },
                    "anna",
                )
                .unwrap()
        }

        fn inflow(&self, amount: rust_decimal::Decimal, channel: BankChannel) -> BankTransactionId {
            self.reconciler()
                .record_transaction(
                    NewBankTransaction {
                        channel,
                        amount,
                        direction: Direction::Inflow,
                        occurred_on: date(2024, 1, 16),
                        counterparty: "Harbor Mills".into(),
                    },
                    "anna",
                )
                .unwrap()
        }
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let fx = Fixture::new();
        fx.reconciler()
            .register_account(BankChannel::G, dec!(0), "anna")
            .unwrap();
        let err = fx
            .reconciler()
            .register_account(BankChannel::G, dec!(0), "anna")
            .unwrap_err();
        assert!(matches!(err, ReconcileError::DuplicateChannel(BankChannel::G)));
    }

    #[test]
    fn test_outflow_stored_negative_and_balance_updated() {
        let fx = Fixture::new();
        fx.reconciler()
            .register_account(BankChannel::G, dec!(5000), "anna")
            .unwrap();
        let id = fx
            .reconciler()
            .record_transaction(
                NewBankTransaction {
                    channel: BankChannel::G,
                    amount: dec!(1200),
                    direction: Direction::Outflow,
                    occurred_on: date(2024, 1, 10),
                    counterparty: "Grid Power Co".into(),
                },
                "anna",
            )
            .unwrap();

        let transaction = fx.store.get_bank_transaction(id).unwrap().unwrap();
        assert_eq!(transaction.amount, dec!(-1200));

        let summary = fx.reconciler().account_summary(BankChannel::G).unwrap();
        assert_eq!(summary.balance, dec!(3800));
        assert_eq!(summary.outflow_total, dec!(1200));
    }

    #[test]
    fn test_insufficient_balance_leaves_state_untouched() {
        let fx = Fixture::new();
        fx.reconciler()
            .register_account(BankChannel::G, dec!(5000), "anna")
            .unwrap();
        let err = fx
            .reconciler()
            .record_transaction(
                NewBankTransaction {
                    channel: BankChannel::G,
                    amount: dec!(10000),
                    direction: Direction::Outflow,
                    occurred_on: date(2024, 1, 10),
                    counterparty: "Grid Power Co".into(),
                },
                "anna",
            )
            .unwrap_err();
        assert!(matches!(err, ReconcileError::InsufficientBalance { .. }));
        assert!(err.to_string().contains("Insufficient balance"));

        let summary = fx.reconciler().account_summary(BankChannel::G).unwrap();
        assert_eq!(summary.balance, dec!(5000));
        assert!(fx.store.list_bank_transactions().unwrap().is_empty());
    }

    #[test]
    fn test_match_requires_exact_amount_and_channel() {
        let fx = Fixture::new();
        fx.reconciler()
            .register_account(BankChannel::G, dec!(0), "anna")
            .unwrap();
        let income_id = fx.income(dec!(10000), BankChannel::G);
        let tx = fx.inflow(dec!(9999), BankChannel::G);

        let err = fx
            .reconciler()
            .match_transaction_to_income(tx, income_id, "anna")
            .unwrap_err();
        assert!(matches!(err, ReconcileError::AmountMismatch { .. }));

        let wrong_channel_income = fx.income(dec!(9999), BankChannel::N);
        let err = fx
            .reconciler()
            .match_transaction_to_income(tx, wrong_channel_income, "anna")
            .unwrap_err();
        assert!(matches!(err, ReconcileError::ChannelMismatch { .. }));
    }

    #[test]
    fn test_successful_match_sets_exactly_one_side() {
        let fx = Fixture::new();
        fx.reconciler()
            .register_account(BankChannel::G, dec!(0), "anna")
            .unwrap();
        let income_id = fx.income(dec!(10000), BankChannel::G);
        let tx = fx.inflow(dec!(10000), BankChannel::G);

        fx.reconciler()
            .match_transaction_to_income(tx, income_id, "anna")
            .unwrap();

        let transaction = fx.store.get_bank_transaction(tx).unwrap().unwrap();
        assert!(transaction.matched);
        assert_eq!(transaction.matched_income, Some(income_id));
        assert!(transaction.matched_expense.is_none());

        // Re-matching is rejected.
        let err = fx
            .reconciler()
            .match_transaction_to_income(tx, income_id, "anna")
            .unwrap_err();
        assert!(matches!(err, ReconcileError::AlreadyMatched(_)));
    }

    #[test]
    fn test_match_expense_side() {
        let fx = Fixture::new();
        fx.reconciler()
            .register_account(BankChannel::N, dec!(5000), "anna")
            .unwrap();
        let expense_id = fx.expense(dec!(800), BankChannel::N);
        let tx = fx
            .reconciler()
            .record_transaction(
                NewBankTransaction {
                    channel: BankChannel::N,
                    amount: dec!(800),
                    direction: Direction::Outflow,
                    occurred_on: date(2024, 1, 11),
                    counterparty: "Grid Power Co".into(),
                },
                "anna",
            )
            .unwrap();

        fx.reconciler()
            .match_transaction_to_expense(tx, expense_id, "anna")
            .unwrap();
        let transaction = fx.store.get_bank_transaction(tx).unwrap().unwrap();
        assert_eq!(transaction.matched_expense, Some(expense_id));
        assert!(transaction.matched_income.is_none());
    }

    #[test]
    fn test_reconcile_report_tracks_unmatched() {
        let fx = Fixture::new();
        fx.reconciler()
            .register_account(BankChannel::G, dec!(0), "anna")
            .unwrap();
        let income_id = fx.income(dec!(500), BankChannel::G);
        let matched_tx = fx.inflow(dec!(500), BankChannel::G);
        fx.inflow(dec!(750), BankChannel::G);

        let report = fx.reconciler().reconcile().unwrap();
        assert_eq!(report.total_unmatched, 2);
        assert!(!report.reconciled);

        fx.reconciler()
            .match_transaction_to_income(matched_tx, income_id, "anna")
            .unwrap();
        let report = fx.reconciler().reconcile().unwrap();
        assert_eq!(report.total_unmatched, 1);
        assert_eq!(fx.reconciler().unmatched_transactions().unwrap().len(), 1);
    }
}
