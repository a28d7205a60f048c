//! Report repository: loads log rows and hands them to `ReportService`.
//!
//! Visibility is decided here from the viewer, never from request input,
//! so a staff member cannot widen a report to other users' rows.

use chrono::NaiveDate;
use chrono_tz::Tz;
use nursery_core::auth::Principal;
use nursery_core::ledger::LedgerError;
use nursery_core::reports::{
    DailyClosing, Dashboard, LedgerRecord, ReportError, ReportService, Scope, TransactionFilter,
    TransactionHistory,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select};

use super::{into_records, ledger_db_err};
use crate::entities::transactions;

/// Error types for report queries.
#[derive(Debug, thiserror::Error)]
pub enum ReportQueryError {
    /// The request itself is invalid.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Loading the log failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Report repository over the transaction log.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
    tz: Tz,
}

impl ReportRepository {
    /// Creates a report repository whose business days follow `tz`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, tz: Tz) -> Self {
        Self { db, tz }
    }

    /// Timezone used for business days.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// All rows visible under `scope`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn records(&self, scope: &Scope) -> Result<Vec<LedgerRecord>, LedgerError> {
        let mut query = Self::newest_first();
        if let Some(username) = scope.username() {
            query = query.filter(transactions::Column::Username.eq(username));
        }
        self.load(query).await
    }

    /// Rows recorded by `username` only.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn transactions_for_user(
        &self,
        username: &str,
    ) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.records(&Scope::User(username.to_string())).await
    }

    /// Filtered history with totals.
    ///
    /// The filter must already be pinned to the viewer, see
    /// [`TransactionFilter::for_viewer`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn history(
        &self,
        filter: TransactionFilter,
    ) -> Result<TransactionHistory, LedgerError> {
        let mut query = Self::newest_first();
        if let Some(username) = &filter.username {
            query = query.filter(transactions::Column::Username.eq(username.as_str()));
        }
        if let Some(from) = filter.from {
            let (start, _) = ReportService::day_bounds(from, self.tz);
            query = query.filter(transactions::Column::RecordedAt.gte(start));
        }
        if let Some(to) = filter.to {
            let (_, end) = ReportService::day_bounds(to, self.tz);
            query = query.filter(transactions::Column::RecordedAt.lt(end));
        }

        let records = self.load(query).await?;
        Ok(ReportService::history(records, filter, self.tz))
    }

    /// Dashboard over every row the viewer may see.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn dashboard(&self, viewer: &Principal) -> Result<Dashboard, LedgerError> {
        let records = self.records(&Scope::for_viewer(viewer)).await?;
        Ok(ReportService::dashboard(&records, self.tz))
    }

    /// Closing for one business day. Staff get a closing of their own rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn daily_closing(
        &self,
        viewer: &Principal,
        date: NaiveDate,
    ) -> Result<DailyClosing, LedgerError> {
        let (start, end) = ReportService::day_bounds(date, self.tz);
        let mut query = Self::newest_first()
            .filter(transactions::Column::RecordedAt.gte(start))
            .filter(transactions::Column::RecordedAt.lt(end));
        if let Some(username) = Scope::for_viewer(viewer).username() {
            query = query.filter(transactions::Column::Username.eq(username));
        }

        let records = self.load(query).await?;
        Ok(ReportService::daily_closing(records, date, self.tz))
    }

    /// Closing for today in the shop's timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn today_closing(&self, viewer: &Principal) -> Result<DailyClosing, LedgerError> {
        let today = ReportService::business_date(chrono::Utc::now(), self.tz);
        self.daily_closing(viewer, today).await
    }

    /// Builds a viewer-pinned filter and runs it.
    ///
    /// # Errors
    ///
    /// - `ReportQueryError::Report` if `from` is after `to`
    /// - `ReportQueryError::Ledger` if the database query fails
    pub async fn history_for(
        &self,
        viewer: &Principal,
        username: Option<String>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<TransactionHistory, ReportQueryError> {
        let filter = TransactionFilter::for_viewer(viewer, username, from, to)?;
        Ok(self.history(filter).await?)
    }

    fn newest_first() -> Select<transactions::Entity> {
        transactions::Entity::find()
            .order_by_desc(transactions::Column::RecordedAt)
            .order_by_desc(transactions::Column::Id)
    }

    async fn load(
        &self,
        query: Select<transactions::Entity>,
    ) -> Result<Vec<LedgerRecord>, LedgerError> {
        let models = query.all(&self.db).await.map_err(ledger_db_err)?;
        into_records(models)
    }
}
