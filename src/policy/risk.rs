//! Risk limits for trade actions.
//!
//! Enforces the single-order notional cap and the daily realized-loss cap.
//! Both apply in test and live mode, before the safety gate is consulted.

use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    config::RiskLimits,
    error::{AppError, Result},
};

/// Realized PnL accumulated for one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DailyLedger {
    date: NaiveDate,
    realized_pnl: Decimal,
}

impl DailyLedger {
    fn new(date: NaiveDate) -> Self {
        Self { date, realized_pnl: Decimal::ZERO }
    }

    fn roll_to(&mut self, today: NaiveDate) {
        if self.date != today {
            *self = Self::new(today);
        }
    }

    fn realized_loss(&self) -> Decimal {
        if self.realized_pnl < Decimal::ZERO {
            -self.realized_pnl
        } else {
            Decimal::ZERO
        }
    }
}

/// Today's position against the daily loss limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRiskReport {
    /// UTC date the figures belong to.
    pub date: NaiveDate,
    /// Net realized PnL recorded today.
    pub realized_pnl_usd: Decimal,
    /// Configured daily loss limit.
    pub daily_loss_limit_usd: Decimal,
    /// Loss that can still be absorbed before trading is blocked.
    pub remaining_loss_budget_usd: Decimal,
}

/// Checks trade requests against the configured risk limits.
#[derive(Debug)]
pub struct RiskGuard {
    limits: RiskLimits,
    ledger: Mutex<DailyLedger>,
}

impl RiskGuard {
    /// Create a guard with an empty ledger for today.
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits, ledger: Mutex::new(DailyLedger::new(today())) }
    }

    /// Check a prospective order of the given notional value.
    pub fn check_order(&self, notional_usd: Decimal) -> Result<()> {
        self.check_order_on(notional_usd, today())
    }

    /// Record realized profit (positive) or loss (negative) for today.
    pub fn record_pnl(&self, pnl_usd: Decimal) -> DailyRiskReport {
        self.record_pnl_on(pnl_usd, today())
    }

    /// Today's figures without changing them.
    pub fn daily_report(&self) -> DailyRiskReport {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.roll_to(today());
        self.report(&ledger)
    }

    fn check_order_on(&self, notional_usd: Decimal, date: NaiveDate) -> Result<()> {
        if notional_usd > self.limits.max_order_usd {
            tracing::warn!(
                notional = %notional_usd,
                max = %self.limits.max_order_usd,
                "Order rejected by max order size"
            );
            return Err(AppError::RiskLimitExceeded(format!(
                "order notional ${} exceeds maximum order size ${}",
                notional_usd.round_dp(2),
                self.limits.max_order_usd.round_dp(2)
            )));
        }

        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.roll_to(date);
        let loss = ledger.realized_loss();
        if loss >= self.limits.daily_loss_limit_usd {
            tracing::warn!(
                loss = %loss,
                limit = %self.limits.daily_loss_limit_usd,
                "Order rejected by daily loss limit"
            );
            return Err(AppError::RiskLimitExceeded(format!(
                "daily realized loss ${} has reached the limit ${}",
                loss.round_dp(2),
                self.limits.daily_loss_limit_usd.round_dp(2)
            )));
        }

        Ok(())
    }

    fn record_pnl_on(&self, pnl_usd: Decimal, date: NaiveDate) -> DailyRiskReport {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.roll_to(date);
        ledger.realized_pnl += pnl_usd;
        tracing::info!(pnl = %pnl_usd, total = %ledger.realized_pnl, "Realized PnL recorded");
        self.report(&ledger)
    }

    fn report(&self, ledger: &DailyLedger) -> DailyRiskReport {
        let remaining =
            (self.limits.daily_loss_limit_usd - ledger.realized_loss()).max(Decimal::ZERO);
        DailyRiskReport {
            date: ledger.date,
            realized_pnl_usd: ledger.realized_pnl,
            daily_loss_limit_usd: self.limits.daily_loss_limit_usd,
            remaining_loss_budget_usd: remaining,
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
