use super::rows::{AccountRow, NewActivityRow};
use super::{ACCOUNT_NUMBER_INDEX, CONFLICT_MARKER, DUPLICATE_MARKER, raised, retryable};
use crate::Database;
use crate::error::{DatabaseError, DatabaseErrorExt};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use remit_account::{Account, AccountError, AccountRepository, NewAccount};
use remit_activity::NewActivity;
use remit_kernel::pagination::{Page, PageRequest};
use tracing::{debug, instrument};

const FIND_BY_NUMBER: &str = "SELECT seq, account_number, account_name, balance,
        withdraw_accumulated, withdraw_date, transfer_accumulated, transfer_date,
        created_at, updated_at, deleted_at, version
    FROM account WHERE account_number = $number AND !deleted_at LIMIT 1;";

const EXISTS_BY_NUMBER: &str =
    "RETURN count(SELECT VALUE seq FROM account WHERE account_number = $number) > 0;";

const FIND_PAGE: &str = "SELECT seq, account_number, account_name, balance,
        withdraw_accumulated, withdraw_date, transfer_accumulated, transfer_date,
        created_at, updated_at, deleted_at, version
    FROM account WHERE !deleted_at ORDER BY seq ASC LIMIT $limit START $start;
    RETURN count(SELECT VALUE seq FROM account WHERE !deleted_at);";

const REGISTER: &str = "RETURN fn::register_account($number, $name, $now);";

const COMMIT: &str = "RETURN fn::commit_ledger($accounts, $activities);";

/// Accounts stored in the `account` table.
#[derive(Debug, Clone)]
pub struct SurrealAccountRepository {
    db: Database,
}

impl SurrealAccountRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for SurrealAccountRepository {
    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>, AccountError> {
        let rows = self
            .db
            .query(FIND_BY_NUMBER)
            .bind(("number", account_number.to_owned()))
            .await
            .context("Finding account")?
            .take::<Vec<AccountRow>>(0)
            .context("Parsing account")?;

        Ok(rows.into_iter().next().map(Account::try_from).transpose()?)
    }

    async fn exists_by_number(&self, account_number: &str) -> Result<bool, AccountError> {
        let exists = self
            .db
            .query(EXISTS_BY_NUMBER)
            .bind(("number", account_number.to_owned()))
            .await
            .context("Checking account number")?
            .take::<Option<bool>>(0)
            .context("Parsing account number check")?;

        Ok(exists.unwrap_or_default())
    }

    #[instrument(skip(self, account), fields(account_number = account.account_number()))]
    async fn insert(&self, account: &NewAccount, now: DateTime<Utc>) -> Result<Account, AccountError> {
        let registered = self
            .db
            .query(REGISTER)
            .bind(("number", account.account_number().to_owned()))
            .bind(("name", account.account_name().to_owned()))
            .bind(("now", now.timestamp_millis()))
            .await
            .and_then(|mut response| response.take::<Option<i64>>(0));

        let seq = match registered {
            Ok(seq) => seq,
            Err(err) => return Err(register_error(err, account.account_number())),
        };
        let seq = seq.ok_or_else(|| DatabaseError::Internal {
            message: "fn::register_account returned no id".into(),
            context: None,
        })?;

        debug!(seq, "Account row created");
        // Millisecond precision matches what a later read returns.
        let stored_at = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        Ok(account.clone().into_account(seq, stored_at))
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Account>, AccountError> {
        let mut response = self
            .db
            .query(FIND_PAGE)
            .bind(("limit", i64::from(request.size())))
            .bind(("start", i64::try_from(request.offset()).unwrap_or(i64::MAX)))
            .await
            .context("Listing accounts")?;

        let rows = response.take::<Vec<AccountRow>>(0).context("Parsing accounts")?;
        let total = response.take::<Option<i64>>(1).context("Counting accounts")?;

        let content = rows.into_iter().map(Account::try_from).collect::<Result<Vec<_>, _>>()?;
        let total = total.and_then(|t| u64::try_from(t).ok()).unwrap_or_default();
        Ok(Page::new(content, request, total))
    }

    #[instrument(skip_all, fields(accounts = accounts.len(), activities = activities.len()))]
    async fn commit(
        &self,
        accounts: &[Account],
        activities: &[NewActivity],
    ) -> Result<Vec<Account>, AccountError> {
        let account_rows: Vec<AccountRow> = accounts.iter().map(AccountRow::from).collect();
        let activity_rows: Vec<NewActivityRow> =
            activities.iter().map(NewActivityRow::from).collect();

        let committed = self
            .db
            .query(COMMIT)
            .bind(("accounts", account_rows.clone()))
            .bind(("activities", activity_rows))
            .await
            .and_then(|mut response| response.take::<Option<i64>>(0));
        if let Err(err) = committed {
            return Err(commit_error(err));
        }

        // Rebuilt from the written rows so timestamps carry the stored precision.
        account_rows
            .into_iter()
            .map(|row| {
                let mut account = Account::try_from(row)?;
                account.version += 1;
                Ok::<_, AccountError>(account)
            })
            .collect()
    }
}

fn register_error(err: surrealdb::Error, account_number: &str) -> AccountError {
    if raised(&err, DUPLICATE_MARKER) || raised(&err, ACCOUNT_NUMBER_INDEX) {
        return AccountError::Duplicate { account_number: account_number.to_owned() };
    }
    if retryable(&err) {
        debug!(error = %err, "Registration lost a concurrent write");
        return AccountError::Conflict {
            message: "concurrent registration in progress".into(),
            context: None,
        };
    }
    DatabaseError::Surreal { source: err, context: Some("Registering account".into()) }.into()
}

fn commit_error(err: surrealdb::Error) -> AccountError {
    if raised(&err, CONFLICT_MARKER) || retryable(&err) {
        debug!(error = %err, "Ledger commit lost a concurrent write");
        return AccountError::Conflict {
            message: "stored version no longer matches".into(),
            context: None,
        };
    }
    DatabaseError::Surreal { source: err, context: Some("Committing ledger".into()) }.into()
}
