//! Ledger domain types for income, expense and allocation records.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::{
    AllocationId, CustomerId, ExpenseId, IncomeId, OrderId, SupplierId,
};
use uuid::Uuid;

/// The business's two bank ledger channels.
///
/// Every income, expense, bank account and bank transaction is booked against
/// exactly one channel; reconciliation only ever matches within a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BankChannel {
    /// The "G" channel (corporate settlement account).
    G,
    /// The "N" channel (cash/secondary account).
    N,
}

impl BankChannel {
    /// All channels, in reporting order.
    pub const ALL: [Self; 2] = [Self::G, Self::N];
}

impl std::fmt::Display for BankChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::G => write!(f, "G"),
            Self::N => write!(f, "N"),
        }
    }
}

/// A customer the business sells to. Referenced by orders and incomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
}

/// A supplier the business buys from. Referenced by expenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    /// Unique identifier.
    pub id: SupplierId,
    /// Display name.
    pub name: String,
}

/// Settlement state of an order, derived from its received amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSettlement {
    /// Nothing received yet.
    Unpaid,
    /// Some, but not all, of the total received.
    PartiallyPaid,
    /// Received amount equals the order total.
    PaidInFull,
}

impl std::fmt::Display for OrderSettlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::PartiallyPaid => write!(f, "partially paid"),
            Self::PaidInFull => write!(f, "paid in full"),
        }
    }
}

/// A sales order that incoming payments are allocated against.
///
/// `version` is the optimistic-concurrency token: the store rejects a save
/// whose version does not match the stored row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// Customer the order belongs to.
    pub customer_id: CustomerId,
    /// Total order value.
    pub total_amount: Decimal,
    /// Amount received so far through allocations.
    pub received_amount: Decimal,
    /// Optimistic-concurrency version, bumped by the store on every save.
    pub version: u64,
}

impl Order {
    /// Creates a new unpaid order.
    #[must_use]
    pub fn new(customer_id: CustomerId, total_amount: Decimal) -> Self {
        Self {
            id: OrderId::new(),
            customer_id,
            total_amount,
            received_amount: Decimal::ZERO,
            version: 0,
        }
    }

    /// Amount still outstanding on this order.
    #[must_use]
    pub fn outstanding_amount(&self) -> Decimal {
        self.total_amount - self.received_amount
    }

    /// Derived settlement state.
    #[must_use]
    pub fn settlement_state(&self) -> OrderSettlement {
        if self.received_amount.is_zero() {
            OrderSettlement::Unpaid
        } else if self.received_amount >= self.total_amount {
            OrderSettlement::PaidInFull
        } else {
            OrderSettlement::PartiallyPaid
        }
    }
}

/// Cash-date offset relative to the business occurrence date.
///
/// Accrual records book on the occurrence date; when the cash moved on a
/// different day the offset is kept as a typed classification instead of a
/// free-text note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SettlementTiming {
    /// Cash moved before the occurrence date (prepaid).
    Advance {
        /// Days the cash date precedes the occurrence date.
        days: i64,
    },
    /// Cash moved after the occurrence date.
    Delayed {
        /// Days the cash date trails the occurrence date.
        days: i64,
    },
    /// Cash moved on the occurrence date.
    SameDay,
}

/// Settlement information for an accrual record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// The date cash actually moved.
    pub settled_on: NaiveDate,
    /// Classification of the cash-date offset.
    pub timing: SettlementTiming,
}

impl Settlement {
    /// Classifies the cash date against the business occurrence date.
    #[must_use]
    pub fn classify(occurred_on: NaiveDate, settled_on: NaiveDate) -> Self {
        let days = (settled_on - occurred_on).num_days();
        let timing = match days {
            d if d < 0 => SettlementTiming::Advance { days: -d },
            d if d > 0 => SettlementTiming::Delayed { days: d },
            _ => SettlementTiming::SameDay,
        };
        Self { settled_on, timing }
    }
}

/// An income record (money received or receivable from a customer).
///
/// Invariant: the sum of `order_allocations` never exceeds `amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    /// Unique identifier.
    pub id: IncomeId,
    /// Customer the income came from.
    pub customer_id: CustomerId,
    /// Total amount of the income.
    pub amount: Decimal,
    /// Bank channel the money arrived on.
    pub channel: BankChannel,
    /// Whether an invoice was issued.
    pub has_invoice: bool,
    /// Business occurrence date (accrual date).
    pub occurred_on: NaiveDate,
    /// Per-order allocated amounts.
    pub order_allocations: BTreeMap<OrderId, Decimal>,
    /// Cash settlement info, when the cash date differs or is known.
    pub settlement: Option<Settlement>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl Income {
    /// Total amount already allocated to orders.
    #[must_use]
    pub fn allocated_total(&self) -> Decimal {
        self.order_allocations.values().copied().sum()
    }

    /// Amount not yet allocated to any order.
    #[must_use]
    pub fn unallocated_amount(&self) -> Decimal {
        self.amount - self.allocated_total()
    }
}

/// Expense classification used for period reporting buckets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Raw materials and processing inputs.
    Materials,
    /// Freight and logistics.
    Freight,
    /// Utilities (power, water).
    Utilities,
    /// Wages and payroll.
    Payroll,
    /// Rent and facilities.
    Rent,
    /// Taxes and fees.
    Tax,
    /// Anything else.
    Other,
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Materials => "materials",
            Self::Freight => "freight",
            Self::Utilities => "utilities",
            Self::Payroll => "payroll",
            Self::Rent => "rent",
            Self::Tax => "tax",
            Self::Other => "other",
        };
        write!(f, "{label}")
    }
}

/// An expense record (money paid or payable to a supplier).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier.
    pub id: ExpenseId,
    /// Reporting category.
    pub category: ExpenseCategory,
    /// Supplier, when the expense has one.
    pub supplier_id: Option<SupplierId>,
    /// Total amount of the expense.
    pub amount: Decimal,
    /// Bank channel the money left on.
    pub channel: BankChannel,
    /// Whether an invoice was received.
    pub has_invoice: bool,
    /// Sales order this expense was incurred for, when known.
    pub related_order: Option<OrderId>,
    /// Business occurrence date (accrual date).
    pub occurred_on: NaiveDate,
    /// Cash settlement info, when the cash date differs or is known.
    pub settlement: Option<Settlement>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Input for recording an accrual income.
#[derive(Debug, Clone)]
pub struct NewIncome {
    /// Customer the income came from.
    pub customer_id: CustomerId,
    /// Total amount.
    pub amount: Decimal,
    /// Bank channel.
    pub channel: BankChannel,
    /// Whether an invoice was issued.
    pub has_invoice: bool,
    /// Business occurrence date.
    pub occurred_on: NaiveDate,
    /// Cash settlement date, when it differs or is already known.
    pub settled_on: Option<NaiveDate>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Input for recording an accrual expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Reporting category.
    pub category: ExpenseCategory,
    /// Supplier, when the expense has one.
    pub supplier_id: Option<SupplierId>,
    /// Total amount.
    pub amount: Decimal,
    /// Bank channel.
    pub channel: BankChannel,
    /// Whether an invoice was received.
    pub has_invoice: bool,
    /// Sales order this expense was incurred for, when known.
    pub related_order: Option<OrderId>,
    /// Business occurrence date.
    pub occurred_on: NaiveDate,
    /// Cash settlement date, when it differs or is already known.
    pub settled_on: Option<NaiveDate>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// What an allocation row connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationKind {
    /// Income split across sales orders.
    IncomeToOrder,
    /// A disbursement split across expense obligations.
    PaymentToExpense,
    /// Accrual cross-match between an income and an expense.
    IncomeToExpense,
}

/// A typed, queryable allocation row.
///
/// Replaces the free-text payment/match annotations of earlier bookkeeping
/// tools: every split or match is one row linking a funding record to an
/// obligation record with an exact amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    /// Unique identifier.
    pub id: AllocationId,
    /// What this row connects.
    pub kind: AllocationKind,
    /// Funding side (income id, or a synthetic payment reference).
    pub source_id: Uuid,
    /// Obligation side (order, expense or income id).
    pub target_id: Uuid,
    /// Allocated amount.
    pub amount: Decimal,
    /// When the allocation was recorded.
    pub created_at: DateTime<Utc>,
}
