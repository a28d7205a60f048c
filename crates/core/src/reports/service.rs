//! Report generation service.
//!
//! Every report is a plain sum over signed `total`/`cost` values, so returns
//! reduce sales and profit without any branching on the action.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    DailyClosing, DailySales, Dashboard, LedgerRecord, Scope, TransactionFilter,
    TransactionHistory, TransactionSummary, UserClosing, UserSales,
};
use crate::ledger::TransactionAction;

/// Service for generating sales reports.
pub struct ReportService;

impl ReportService {
    /// Parses an IANA timezone name such as `Asia/Kolkata`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidTimezone` for unknown names.
    pub fn parse_timezone(name: &str) -> Result<Tz, ReportError> {
        name.parse::<Tz>()
            .map_err(|_| ReportError::InvalidTimezone(name.to_string()))
    }

    /// Business day of an instant in the shop's timezone.
    #[must_use]
    pub fn business_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
        at.with_timezone(&tz).date_naive()
    }

    /// Half-open UTC interval `[start, end)` covering a business day.
    #[must_use]
    pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = date.succ_opt().unwrap_or(date);
        (Self::local_midnight(date, tz), Self::local_midnight(next, tz))
    }

    fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::MIN);
        tz.from_local_datetime(&naive)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
            .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
    }

    /// Keeps only the rows visible under `scope`.
    #[must_use]
    pub fn scoped(records: Vec<LedgerRecord>, scope: &Scope) -> Vec<LedgerRecord> {
        records
            .into_iter()
            .filter(|r| scope.includes(&r.username))
            .collect()
    }

    /// Rows recorded by `username` and nobody else.
    #[must_use]
    pub fn transactions_for_user(records: Vec<LedgerRecord>, username: &str) -> Vec<LedgerRecord> {
        Self::scoped(records, &Scope::User(username.to_string()))
    }

    /// Sum of totals.
    #[must_use]
    pub fn total_sales(records: &[LedgerRecord]) -> Decimal {
        records.iter().map(|r| r.total).sum()
    }

    /// Sum of `total - cost`.
    #[must_use]
    pub fn total_profit(records: &[LedgerRecord]) -> Decimal {
        records.iter().map(LedgerRecord::profit).sum()
    }

    /// Sum of totals per user, ordered by username.
    #[must_use]
    pub fn sales_by_user(records: &[LedgerRecord]) -> Vec<UserSales> {
        let mut by_user: BTreeMap<&str, Decimal> = BTreeMap::new();
        for record in records {
            *by_user.entry(&record.username).or_default() += record.total;
        }

        by_user
            .into_iter()
            .map(|(username, total)| UserSales {
                username: username.to_string(),
                total,
            })
            .collect()
    }

    /// Sum of totals per business day, oldest first.
    #[must_use]
    pub fn daily_sales(records: &[LedgerRecord], tz: Tz) -> Vec<DailySales> {
        let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for record in records {
            *by_day
                .entry(Self::business_date(record.recorded_at, tz))
                .or_default() += record.total;
        }

        by_day
            .into_iter()
            .map(|(date, total)| DailySales { date, total })
            .collect()
    }

    /// Sum of totals on one business day.
    #[must_use]
    pub fn sales_on(records: &[LedgerRecord], date: NaiveDate, tz: Tz) -> Decimal {
        records
            .iter()
            .filter(|r| Self::business_date(r.recorded_at, tz) == date)
            .map(|r| r.total)
            .sum()
    }

    /// Dashboard metrics over `records`.
    #[must_use]
    pub fn dashboard(records: &[LedgerRecord], tz: Tz) -> Dashboard {
        Dashboard {
            total_sales: Self::total_sales(records),
            total_profit: Self::total_profit(records),
            sales_by_user: Self::sales_by_user(records),
            daily_sales: Self::daily_sales(records, tz),
        }
    }

    /// End-of-day closing for `date`.
    ///
    /// Rows from other days are ignored, so callers may pass a wider set.
    #[must_use]
    pub fn daily_closing(records: Vec<LedgerRecord>, date: NaiveDate, tz: Tz) -> DailyClosing {
        let mut day: Vec<LedgerRecord> = records
            .into_iter()
            .filter(|r| Self::business_date(r.recorded_at, tz) == date)
            .collect();
        Self::newest_first(&mut day);

        let mut per_user: BTreeMap<&str, UserClosing> = BTreeMap::new();
        for record in &day {
            let line = per_user
                .entry(&record.username)
                .or_insert_with(|| UserClosing {
                    username: record.username.clone(),
                    total_sale: Decimal::ZERO,
                    total_return: Decimal::ZERO,
                    net_profit: Decimal::ZERO,
                });
            match record.action {
                TransactionAction::Sale => line.total_sale += record.total,
                TransactionAction::Return => line.total_return += record.total.abs(),
            }
            line.net_profit += record.profit();
        }
        let per_user: Vec<UserClosing> = per_user.into_values().collect();

        DailyClosing {
            date,
            total_sale: per_user.iter().map(|u| u.total_sale).sum(),
            total_return: per_user.iter().map(|u| u.total_return).sum(),
            net_profit: Self::total_profit(&day),
            per_user,
            transactions: day,
        }
    }

    /// Count and sums of a set of rows.
    #[must_use]
    pub fn summarize(records: &[LedgerRecord]) -> TransactionSummary {
        TransactionSummary {
            count: records.len(),
            total_sales: Self::total_sales(records),
            total_profit: Self::total_profit(records),
        }
    }

    /// Returns true if `record` passes `filter`.
    #[must_use]
    pub fn matches(record: &LedgerRecord, filter: &TransactionFilter, tz: Tz) -> bool {
        if let Some(username) = &filter.username
            && &record.username != username
        {
            return false;
        }
        let date = Self::business_date(record.recorded_at, tz);
        filter.from.is_none_or(|from| date >= from) && filter.to.is_none_or(|to| date <= to)
    }

    /// Filtered history, newest first, with totals.
    #[must_use]
    pub fn history(
        records: Vec<LedgerRecord>,
        filter: TransactionFilter,
        tz: Tz,
    ) -> TransactionHistory {
        let mut transactions: Vec<LedgerRecord> = records
            .into_iter()
            .filter(|r| Self::matches(r, &filter, tz))
            .collect();
        Self::newest_first(&mut transactions);

        TransactionHistory {
            summary: Self::summarize(&transactions),
            filter,
            transactions,
        }
    }

    fn newest_first(records: &mut [LedgerRecord]) {
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
    }
}
