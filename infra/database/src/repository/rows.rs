//! Storage shapes. Timestamps are epoch milliseconds, calendar days `YYYY-MM-DD` strings.

use crate::error::DatabaseError;
use chrono::{DateTime, NaiveDate, Utc};
use remit_account::{Account, DailyLimitTracker};
use remit_activity::{Activity, NewActivity, TransactionReference};
use surrealdb::types::SurrealValue;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct AccountRow {
    pub seq: i64,
    pub account_number: String,
    pub account_name: String,
    pub balance: i64,
    pub withdraw_accumulated: i64,
    pub withdraw_date: Option<String>,
    pub transfer_accumulated: i64,
    pub transfer_date: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
    pub version: i64,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            seq: account.id,
            account_number: account.account_number.clone(),
            account_name: account.account_name.clone(),
            balance: account.balance,
            withdraw_accumulated: account.withdraw_limit.accumulated(),
            withdraw_date: account.withdraw_limit.last_transaction_date().map(format_date),
            transfer_accumulated: account.transfer_limit.accumulated(),
            transfer_date: account.transfer_limit.last_transaction_date().map(format_date),
            created_at: account.created_at.timestamp_millis(),
            updated_at: account.updated_at.timestamp_millis(),
            deleted_at: account.deleted_at.map(|at| at.timestamp_millis()),
            version: account.version,
        }
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = DatabaseError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.seq,
            withdraw_limit: DailyLimitTracker::restore(
                row.withdraw_accumulated,
                row.withdraw_date.as_deref().map(parse_date).transpose()?,
            ),
            transfer_limit: DailyLimitTracker::restore(
                row.transfer_accumulated,
                row.transfer_date.as_deref().map(parse_date).transpose()?,
            ),
            created_at: parse_millis(row.created_at)?,
            updated_at: parse_millis(row.updated_at)?,
            deleted_at: row.deleted_at.map(parse_millis).transpose()?,
            account_number: row.account_number,
            account_name: row.account_name,
            balance: row.balance,
            version: row.version,
        })
    }
}

#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct NewActivityRow {
    pub account_id: i64,
    pub activity_type: String,
    pub amount: i64,
    pub fee: i64,
    pub balance_after: i64,
    pub reference_account_id: Option<i64>,
    pub reference_account_number: Option<String>,
    pub description: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: i64,
}

impl From<&NewActivity> for NewActivityRow {
    fn from(activity: &NewActivity) -> Self {
        Self {
            account_id: activity.account_id,
            activity_type: activity.activity_type.to_string(),
            amount: activity.amount,
            fee: activity.fee,
            balance_after: activity.balance_after,
            reference_account_id: activity.reference.as_ref().map(TransactionReference::account_id),
            reference_account_number: activity
                .reference
                .as_ref()
                .map(|r| r.account_number().to_owned()),
            description: activity.description.clone(),
            transaction_id: activity.transaction_id.clone(),
            created_at: activity.created_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct ActivityRow {
    pub seq: i64,
    pub account_id: i64,
    pub activity_type: String,
    pub amount: i64,
    pub fee: i64,
    pub balance_after: i64,
    pub reference_account_id: Option<i64>,
    pub reference_account_number: Option<String>,
    pub description: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: i64,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = DatabaseError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let activity_type = row.activity_type.parse().map_err(|_| DatabaseError::Mapping {
            message: format!("unknown activity type '{}'", row.activity_type).into(),
            context: Some(format!("activity {}", row.seq).into()),
        })?;
        let reference = match (row.reference_account_id, row.reference_account_number) {
            (Some(id), Some(number)) => {
                Some(TransactionReference::new(id, number).map_err(|e| DatabaseError::Mapping {
                    message: e.to_string().into(),
                    context: Some(format!("activity {}", row.seq).into()),
                })?)
            }
            _ => None,
        };

        Ok(Self {
            id: row.seq,
            account_id: row.account_id,
            activity_type,
            amount: row.amount,
            fee: row.fee,
            balance_after: row.balance_after,
            reference,
            description: row.description,
            transaction_id: row.transaction_id,
            created_at: parse_millis(row.created_at)?,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| DatabaseError::Mapping {
        message: format!("invalid date '{value}': {e}").into(),
        context: None,
    })
}

fn parse_millis(value: i64) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| DatabaseError::Mapping {
        message: format!("timestamp out of range: {value}").into(),
        context: None,
    })
}
