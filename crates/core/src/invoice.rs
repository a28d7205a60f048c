//! Printable invoice for a recorded transaction.

use std::fmt::Write as _;

use chrono_tz::Tz;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::ledger::{LedgerError, TransactionAction};
use crate::reports::LedgerRecord;

const DATE_FORMAT: &str = "%d-%m-%Y %I:%M %p";
const WIDTH: usize = 64;

/// Shop identity printed at the top of every invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopHeader {
    /// Shop name.
    pub name: String,
    /// Line under the name.
    pub tagline: String,
}

/// Invoice lines derived from one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    /// Same as the transaction id.
    pub number: i64,
    /// Shop header.
    pub shop: ShopHeader,
    /// Local date and time, `dd-mm-YYYY hh:mm AM`.
    pub date: String,
    /// Sale or return.
    pub action: TransactionAction,
    /// Item name in title case.
    pub item: String,
    /// Units.
    pub quantity: i64,
    /// Unit price, always positive.
    pub rate: Decimal,
    /// Line amount, always positive.
    pub amount: Decimal,
}

impl Invoice {
    /// Builds the invoice for `record`, with dates in `tz`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the record has no units.
    pub fn from_record(
        record: &LedgerRecord,
        shop: ShopHeader,
        tz: Tz,
    ) -> Result<Self, LedgerError> {
        let amount = record.total.abs();
        let rate = amount
            .checked_div(Decimal::from(record.quantity))
            .filter(|_| record.quantity > 0)
            .ok_or_else(|| {
                LedgerError::Validation(format!("transaction {} has no units", record.id))
            })?;

        Ok(Self {
            number: record.id,
            shop,
            date: record
                .recorded_at
                .with_timezone(&tz)
                .format(DATE_FORMAT)
                .to_string(),
            action: record.action,
            item: title_case(&record.item),
            quantity: record.quantity,
            rate: money(rate),
            amount: money(amount),
        })
    }

    /// Plain-text rendering.
    #[must_use]
    pub fn render(&self) -> String {
        let rule = "-".repeat(WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{:^WIDTH$}", self.shop.name);
        let _ = writeln!(out, "{:^WIDTH$}", self.shop.tagline);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<32}{:>32}",
            format!("Invoice No: {}", self.number),
            format!("Date: {}", self.date)
        );
        if self.action == TransactionAction::Return {
            let _ = writeln!(out, "{:^WIDTH$}", "RETURN");
        }
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:<28}{:>8}{:>14}{:>14}", "Item", "Qty", "Rate (Rs)", "Amount (Rs)");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "{:<28}{:>8}{:>14}{:>14}",
            self.item,
            self.quantity,
            format!("{:.2}", self.rate),
            format!("{:.2}", self.amount)
        );
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:<50}{:>14}", "TOTAL AMOUNT", format!("Rs {:.2}", self.amount));
        out
    }
}

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Capitalizes the first letter of every word and lowercases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphabetic();
    }
    out
}
