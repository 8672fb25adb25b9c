//! Ledger allocation service.
//!
//! Records accrual income/expense and performs the many-to-many allocations:
//! income across sales orders, a disbursement across expense obligations, and
//! accrual cross-matching of income to expense. Every call validates all
//! references and sum bounds before its first write, so a failed call never
//! leaves partial state behind.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use tallybook_shared::types::{AllocationId, ExpenseId, IncomeId, OrderId};
use tracing::info;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{
    Allocation, AllocationKind, BankChannel, Expense, Income, NewExpense, NewIncome, Order,
    Settlement,
};
use super::validation::{merge_allocation_amounts, validate_sum_bound};
use crate::audit::{self, AuditEntityType, AuditRecorder, NewAuditLog, OperationType};
use crate::store::Gateway;

/// Result of a successful allocation call.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// Funding-side reference shared by every row written in this call
    /// (income id, or a synthetic payment reference).
    pub source: Uuid,
    /// Ids of the allocation rows written.
    pub allocation_ids: Vec<AllocationId>,
    /// Total amount allocated in this call.
    pub total: Decimal,
}

/// The ledger allocation service.
pub struct LedgerService<'a> {
    store: &'a dyn Gateway,
    audit: AuditRecorder<'a>,
}

impl<'a> LedgerService<'a> {
    /// Creates a ledger service over the given gateway and recorder.
    #[must_use]
    pub fn new(store: &'a dyn Gateway, audit: AuditRecorder<'a>) -> Self {
        Self { store, audit }
    }

    /// Records an income on its business occurrence date.
    ///
    /// When a distinct settlement date is supplied the cash-date offset is
    /// classified as advance/delayed/same-day and kept on the record.
    pub fn record_accrual_income(
        &self,
        input: NewIncome,
        operator: &str,
    ) -> Result<IncomeId, LedgerError> {
        self.audit.ensure_operator(operator)?;
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        let customer = self
            .store
            .get_customer(input.customer_id)?
            .ok_or(LedgerError::CustomerNotFound(input.customer_id))?;

        let income = Income {
            id: IncomeId::new(),
            customer_id: input.customer_id,
            amount: input.amount,
            channel: input.channel,
            has_invoice: input.has_invoice,
            occurred_on: input.occurred_on,
            order_allocations: BTreeMap::new(),
            settlement: input
                .settled_on
                .map(|settled| Settlement::classify(input.occurred_on, settled)),
            notes: input.notes,
        };
        let id = self.store.save_income(income.clone())?;
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Create,
            entity_type: AuditEntityType::Income,
            entity_id: id.to_string(),
            entity_name: customer.name.clone(),
            operator: operator.to_string(),
            description: format!(
                "Recorded income {} on channel {} from {} (occurred {})",
                income.amount, income.channel, customer.name, income.occurred_on
            ),
            old_value: None,
            new_value: audit::snapshot(&income),
            notes: None,
        })?;
        info!(income_id = %id, amount = %income.amount, "accrual income recorded");
        Ok(id)
    }

    /// Records an expense on its business occurrence date.
    pub fn record_accrual_expense(
        &self,
        input: NewExpense,
        operator: &str,
    ) -> Result<ExpenseId, LedgerError> {
        self.audit.ensure_operator(operator)?;
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        let supplier_name = match input.supplier_id {
            Some(supplier_id) => Some(
                self.store
                    .get_supplier(supplier_id)?
                    .ok_or(LedgerError::SupplierNotFound(supplier_id))?
                    .name,
            ),
            None => None,
        };
        if let Some(order_id) = input.related_order
            && self.store.get_order(order_id)?.is_none()
        {
            return Err(LedgerError::OrderNotFound(order_id));
        }

        let expense = Expense {
            id: ExpenseId::new(),
            category: input.category,
            supplier_id: input.supplier_id,
            amount: input.amount,
            channel: input.channel,
            has_invoice: input.has_invoice,
            related_order: input.related_order,
            occurred_on: input.occurred_on,
            settlement: input
                .settled_on
                .map(|settled| Settlement::classify(input.occurred_on, settled)),
            notes: input.notes,
        };
        let id = self.store.save_expense(expense.clone())?;
        let entity_name = supplier_name.unwrap_or_else(|| expense.category.to_string());
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Create,
            entity_type: AuditEntityType::Expense,
            entity_id: id.to_string(),
            entity_name,
            operator: operator.to_string(),
            description: format!(
                "Recorded {} expense {} on channel {} (occurred {})",
                expense.category, expense.amount, expense.channel, expense.occurred_on
            ),
            old_value: None,
            new_value: audit::snapshot(&expense),
            notes: None,
        })?;
        info!(expense_id = %id, amount = %expense.amount, "accrual expense recorded");
        Ok(id)
    }

    /// Allocates an income across one or more sales orders.
    ///
    /// Validates, before any write: the income exists; every amount is
    /// positive; the new total stays within the income's unallocated amount;
    /// every order exists and is allocated no more than it has outstanding.
    pub fn allocate_income_to_orders(
        &self,
        income_id: IncomeId,
        allocations: &[(OrderId, Decimal)],
        operator: &str,
    ) -> Result<AllocationOutcome, LedgerError> {
        self.audit.ensure_operator(operator)?;
        let merged = merge_allocation_amounts(allocations)?;
        let mut income = self
            .store
            .get_income(income_id)?
            .ok_or(LedgerError::IncomeNotFound(income_id))?;
        let requested: Decimal = merged.values().copied().sum();
        validate_sum_bound(requested, income.unallocated_amount())?;

        let mut orders: Vec<(Order, Decimal)> = Vec::with_capacity(merged.len());
        for (&order_id, &amount) in &merged {
            let order = self
                .store
                .get_order(order_id)?
                .ok_or(LedgerError::OrderNotFound(order_id))?;
            let outstanding = order.outstanding_amount();
            if amount > outstanding {
                return Err(LedgerError::OrderOverAllocation {
                    order_id,
                    requested: amount,
                    outstanding,
                });
            }
            orders.push((order, amount));
        }

        // All checks passed; apply the writes.
        let income_before = audit::snapshot(&income);
        for (&order_id, &amount) in &merged {
            *income
                .order_allocations
                .entry(order_id)
                .or_insert(Decimal::ZERO) += amount;
        }
        self.store.save_income(income.clone())?;

        let now = Utc::now();
        let mut allocation_ids = Vec::with_capacity(orders.len());
        for (mut order, amount) in orders {
            let order_before = audit::snapshot(&order);
            order.received_amount += amount;
            self.store.save_order(order.clone())?;
            allocation_ids.push(self.store.save_allocation(Allocation {
                id: AllocationId::new(),
                kind: AllocationKind::IncomeToOrder,
                source_id: income_id.into_inner(),
                target_id: order.id.into_inner(),
                amount,
                created_at: now,
            })?);
            self.audit.log_operation(NewAuditLog {
                operation: OperationType::Allocate,
                entity_type: AuditEntityType::Order,
                entity_id: order.id.to_string(),
                entity_name: format!("order {}", order.id),
                operator: operator.to_string(),
                description: format!(
                    "Received {amount} from income {income_id}; order is now {}",
                    order.settlement_state()
                ),
                old_value: order_before,
                new_value: audit::snapshot(&order),
                notes: None,
            })?;
        }
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Allocate,
            entity_type: AuditEntityType::Income,
            entity_id: income_id.to_string(),
            entity_name: format!("income {income_id}"),
            operator: operator.to_string(),
            description: format!(
                "Allocated {requested} across {} order(s)",
                allocation_ids.len()
            ),
            old_value: income_before,
            new_value: audit::snapshot(&income),
            notes: None,
        })?;
        info!(
            income_id = %income_id,
            total = %requested,
            orders = allocation_ids.len(),
            "income allocated to orders"
        );
        Ok(AllocationOutcome {
            source: income_id.into_inner(),
            allocation_ids,
            total: requested,
        })
    }

    /// Splits a disbursement across one or more expense obligations.
    ///
    /// The allocations must sum to no more than the stated payment amount,
    /// and every target expense must exist and share the payment's bank
    /// channel. Each touched expense gets its settlement stamped from the
    /// payment date.
    pub fn allocate_payment_to_expenses(
        &self,
        payment_amount: Decimal,
        allocations: &[(ExpenseId, Decimal)],
        channel: BankChannel,
        paid_on: chrono::NaiveDate,
        operator: &str,
    ) -> Result<AllocationOutcome, LedgerError> {
        self.audit.ensure_operator(operator)?;
        if payment_amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        let merged = merge_allocation_amounts(allocations)?;
        let requested: Decimal = merged.values().copied().sum();
        validate_sum_bound(requested, payment_amount)?;

        let mut expenses: Vec<(Expense, Decimal)> = Vec::with_capacity(merged.len());
        for (&expense_id, &amount) in &merged {
            let expense = self
                .store
                .get_expense(expense_id)?
                .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
            if expense.channel != channel {
                return Err(LedgerError::ChannelMismatch {
                    payment: channel,
                    expense_id,
                    expense: expense.channel,
                });
            }
            expenses.push((expense, amount));
        }

        let payment_ref = Uuid::now_v7();
        let now = Utc::now();
        let mut allocation_ids = Vec::with_capacity(expenses.len());
        for (mut expense, amount) in expenses {
            let before = audit::snapshot(&expense);
            expense.settlement = Some(Settlement::classify(expense.occurred_on, paid_on));
            self.store.save_expense(expense.clone())?;
            allocation_ids.push(self.store.save_allocation(Allocation {
                id: AllocationId::new(),
                kind: AllocationKind::PaymentToExpense,
                source_id: payment_ref,
                target_id: expense.id.into_inner(),
                amount,
                created_at: now,
            })?);
            self.audit.log_operation(NewAuditLog {
                operation: OperationType::Allocate,
                entity_type: AuditEntityType::Expense,
                entity_id: expense.id.to_string(),
                entity_name: expense.category.to_string(),
                operator: operator.to_string(),
                description: format!(
                    "Paid {amount} of a {payment_amount} disbursement on channel {channel} ({paid_on})"
                ),
                old_value: before,
                new_value: audit::snapshot(&expense),
                notes: None,
            })?;
        }
        info!(
            payment_ref = %payment_ref,
            total = %requested,
            expenses = allocation_ids.len(),
            "payment allocated to expenses"
        );
        Ok(AllocationOutcome {
            source: payment_ref,
            allocation_ids,
            total: requested,
        })
    }

    /// Cross-matches an income against one or more expenses (accrual).
    ///
    /// The matched sum, together with this income's earlier matches, must
    /// stay within the income amount.
    pub fn match_income_to_expenses(
        &self,
        income_id: IncomeId,
        allocations: &[(ExpenseId, Decimal)],
        operator: &str,
    ) -> Result<AllocationOutcome, LedgerError> {
        self.audit.ensure_operator(operator)?;
        let merged = merge_allocation_amounts(allocations)?;
        let income = self
            .store
            .get_income(income_id)?
            .ok_or(LedgerError::IncomeNotFound(income_id))?;
        let already_matched = self.matched_total(income_id.into_inner(), MatchSide::Source)?;
        let requested: Decimal = merged.values().copied().sum();
        validate_sum_bound(requested, income.amount - already_matched)?;

        for &expense_id in merged.keys() {
            if self.store.get_expense(expense_id)?.is_none() {
                return Err(LedgerError::ExpenseNotFound(expense_id));
            }
        }

        let ids = self.write_accrual_matches(
            income_id.into_inner(),
            merged.iter().map(|(id, &amount)| (id.into_inner(), amount)),
        )?;
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Match,
            entity_type: AuditEntityType::Income,
            entity_id: income_id.to_string(),
            entity_name: format!("income {income_id}"),
            operator: operator.to_string(),
            description: format!("Matched {requested} against {} expense(s)", ids.len()),
            old_value: None,
            new_value: None,
            notes: None,
        })?;
        info!(income_id = %income_id, total = %requested, "income matched to expenses");
        Ok(AllocationOutcome {
            source: income_id.into_inner(),
            allocation_ids: ids,
            total: requested,
        })
    }

    /// Cross-matches an expense against one or more incomes (accrual).
    ///
    /// Mirror of [`match_income_to_expenses`](Self::match_income_to_expenses);
    /// rows keep the canonical income→expense orientation.
    pub fn match_expense_to_incomes(
        &self,
        expense_id: ExpenseId,
        allocations: &[(IncomeId, Decimal)],
        operator: &str,
    ) -> Result<AllocationOutcome, LedgerError> {
        self.audit.ensure_operator(operator)?;
        let merged = merge_allocation_amounts(allocations)?;
        let expense = self
            .store
            .get_expense(expense_id)?
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        let already_matched = self.matched_total(expense_id.into_inner(), MatchSide::Target)?;
        let requested: Decimal = merged.values().copied().sum();
        validate_sum_bound(requested, expense.amount - already_matched)?;

        for &income_id in merged.keys() {
            if self.store.get_income(income_id)?.is_none() {
                return Err(LedgerError::IncomeNotFound(income_id));
            }
        }

        let now = Utc::now();
        let mut ids = Vec::with_capacity(merged.len());
        for (&income_id, &amount) in &merged {
            ids.push(self.store.save_allocation(Allocation {
                id: AllocationId::new(),
                kind: AllocationKind::IncomeToExpense,
                source_id: income_id.into_inner(),
                target_id: expense_id.into_inner(),
                amount,
                created_at: now,
            })?);
        }
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Match,
            entity_type: AuditEntityType::Expense,
            entity_id: expense_id.to_string(),
            entity_name: expense.category.to_string(),
            operator: operator.to_string(),
            description: format!("Matched {requested} against {} income(s)", ids.len()),
            old_value: None,
            new_value: None,
            notes: None,
        })?;
        info!(expense_id = %expense_id, total = %requested, "expense matched to incomes");
        Ok(AllocationOutcome {
            source: expense_id.into_inner(),
            allocation_ids: ids,
            total: requested,
        })
    }

    /// Returns every allocation row touching the given entity, on either side.
    pub fn allocations_for(&self, entity: Uuid) -> Result<Vec<Allocation>, LedgerError> {
        Ok(self
            .store
            .list_allocations()?
            .into_iter()
            .filter(|a| a.source_id == entity || a.target_id == entity)
            .collect())
    }

    fn matched_total(&self, entity: Uuid, side: MatchSide) -> Result<Decimal, LedgerError> {
        Ok(self
            .store
            .list_allocations()?
            .into_iter()
            .filter(|a| {
                a.kind == AllocationKind::IncomeToExpense
                    && match side {
                        MatchSide::Source => a.source_id == entity,
                        MatchSide::Target => a.target_id == entity,
                    }
            })
            .map(|a| a.amount)
            .sum())
    }

    fn write_accrual_matches(
        &self,
        income: Uuid,
        targets: impl Iterator<Item = (Uuid, Decimal)>,
    ) -> Result<Vec<AllocationId>, LedgerError> {
        let now = Utc::now();
        let mut ids = Vec::new();
        for (target, amount) in targets {
            ids.push(self.store.save_allocation(Allocation {
                id: AllocationId::new(),
                kind: AllocationKind::IncomeToExpense,
                source_id: income,
                target_id: target,
                amount,
                created_at: now,
            })?);
        }
        Ok(ids)
    }
}

/// Which side of an accrual-match row an entity sits on.
#[derive(Clone, Copy)]
enum MatchSide {
    Source,
    Target,
}
