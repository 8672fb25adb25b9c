//! Bank reconciliation domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::{BankAccountId, BankTransactionId, ExpenseId, IncomeId};

use crate::ledger::BankChannel;

/// Direction of a bank transaction from the business's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money arriving (income side).
    Inflow,
    /// Money leaving (expense side).
    Outflow,
}

/// A bank account, one per channel.
///
/// The balance is mutated only through recorded transactions. `version` is the
/// optimistic-concurrency token checked by the store on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    /// Unique identifier.
    pub id: BankAccountId,
    /// The channel this account serves.
    pub channel: BankChannel,
    /// Current balance.
    pub balance: Decimal,
    /// Optimistic-concurrency version, bumped by the store on every save.
    pub version: u64,
}

/// An independently recorded bank statement row.
///
/// The amount is signed: inflows positive, outflows negative. At most one of
/// `matched_income` / `matched_expense` is ever set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Unique identifier.
    pub id: BankTransactionId,
    /// Channel the transaction occurred on.
    pub channel: BankChannel,
    /// Signed amount (inflow positive, outflow negative).
    pub amount: Decimal,
    /// Counterparty text from the statement.
    pub counterparty: String,
    /// Date the transaction occurred.
    pub occurred_on: NaiveDate,
    /// Whether the transaction has been matched to an internal record.
    pub matched: bool,
    /// Matched income record, when matched on the inflow side.
    pub matched_income: Option<IncomeId>,
    /// Matched expense record, when matched on the outflow side.
    pub matched_expense: Option<ExpenseId>,
}

impl BankTransaction {
    /// Magnitude of the transaction amount.
    #[must_use]
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    /// Direction implied by the stored sign.
    #[must_use]
    pub fn direction(&self) -> Direction {
        if self.amount.is_sign_negative() {
            Direction::Outflow
        } else {
            Direction::Inflow
        }
    }
}

/// Input for recording a bank transaction.
#[derive(Debug, Clone)]
pub struct NewBankTransaction {
    /// Channel the transaction occurred on.
    pub channel: BankChannel,
    /// Amount as a positive magnitude; the sign is derived from `direction`.
    pub amount: Decimal,
    /// Whether money arrived or left.
    pub direction: Direction,
    /// Date the transaction occurred.
    pub occurred_on: NaiveDate,
    /// Counterparty text from the statement.
    pub counterparty: String,
}

/// Per-channel reconciliation summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    /// The channel summarized.
    pub channel: BankChannel,
    /// Current account balance.
    pub balance: Decimal,
    /// Sum of inflow magnitudes.
    pub inflow_total: Decimal,
    /// Sum of outflow magnitudes.
    pub outflow_total: Decimal,
    /// Number of matched transactions.
    pub matched_count: usize,
    /// Number of unmatched transactions.
    pub unmatched_count: usize,
}

/// Whole-book reconciliation report across all channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Per-channel summaries, in reporting order.
    pub accounts: Vec<AccountSummary>,
    /// Total unmatched transactions across all channels.
    pub total_unmatched: usize,
    /// True when every recorded transaction is matched.
    pub reconciled: bool,
}
