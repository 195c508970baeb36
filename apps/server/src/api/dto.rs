//! Request and response bodies of the public API.

use chrono::{DateTime, Utc};
use remit::kernel::validation::{Validate, Violations};
use remit_account::{
    ACCOUNT_NAME_MAX_LEN, ACCOUNT_NUMBER_MAX_LEN, ACCOUNT_NUMBER_MIN_LEN, Account, TransferResult,
};
use remit_activity::{Activity, ActivityType};
use remit_derive::api_model;

const ACCOUNT_NUMBER_REQUIRED: &str = "Account number is required.";
const ACCOUNT_NUMBER_LENGTH: &str = "Account number must be 3-20 characters.";
const ACCOUNT_NAME_REQUIRED: &str = "Account name is required.";
const ACCOUNT_NAME_LENGTH: &str = "Account name must be at most 100 characters.";
const FROM_ACCOUNT_REQUIRED: &str = "From account number is required.";
const TO_ACCOUNT_REQUIRED: &str = "To account number is required.";
const AMOUNT_POSITIVE: &str = "Amount must be greater than 0.";

/// Paging query of the account list.
#[api_model(params, deny_unknown_fields = false)]
pub struct PageParams {
    /// Zero-based page index (default 0)
    pub page: Option<i64>,
    /// Page size, 1 to 2000 (default 20)
    pub size: Option<i64>,
}

#[api_model(request)]
pub struct RegisterAccountRequest {
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_name: String,
}

impl Validate for RegisterAccountRequest {
    fn check(&self, v: &mut Violations) {
        v.not_blank(&self.account_number, ACCOUNT_NUMBER_REQUIRED)
            .length(
                &self.account_number,
                ACCOUNT_NUMBER_MIN_LEN,
                ACCOUNT_NUMBER_MAX_LEN,
                ACCOUNT_NUMBER_LENGTH,
            )
            .not_blank(&self.account_name, ACCOUNT_NAME_REQUIRED)
            .length(&self.account_name, 1, ACCOUNT_NAME_MAX_LEN, ACCOUNT_NAME_LENGTH);
    }
}

#[api_model(request)]
pub struct DepositRequest {
    #[serde(default)]
    pub account_number: String,
    pub amount: Option<i64>,
}

impl Validate for DepositRequest {
    fn check(&self, v: &mut Violations) {
        v.not_blank(&self.account_number, ACCOUNT_NUMBER_REQUIRED).min(self.amount, 1, AMOUNT_POSITIVE);
    }
}

#[api_model(request)]
pub struct WithdrawRequest {
    #[serde(default)]
    pub account_number: String,
    pub amount: Option<i64>,
}

impl Validate for WithdrawRequest {
    fn check(&self, v: &mut Violations) {
        v.not_blank(&self.account_number, ACCOUNT_NUMBER_REQUIRED).min(self.amount, 1, AMOUNT_POSITIVE);
    }
}

#[api_model(request)]
pub struct TransferRequest {
    #[serde(default)]
    pub from_account_number: String,
    #[serde(default)]
    pub to_account_number: String,
    pub amount: Option<i64>,
}

impl Validate for TransferRequest {
    fn check(&self, v: &mut Violations) {
        v.not_blank(&self.from_account_number, FROM_ACCOUNT_REQUIRED)
            .not_blank(&self.to_account_number, TO_ACCOUNT_REQUIRED)
            .min(self.amount, 1, AMOUNT_POSITIVE);
    }
}

/// Validated amount. `Validate` has already rejected a missing value.
pub(crate) fn amount(value: Option<i64>) -> i64 {
    value.unwrap_or_default()
}

#[api_model(response)]
#[derive(Clone, PartialEq, Eq)]
pub struct AccountResponse {
    pub id: i64,
    pub account_number: String,
    pub account_name: String,
    /// Balance in KRW
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            account_number: account.account_number,
            account_name: account.account_name,
            balance: account.balance,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[api_model(response)]
#[derive(Clone, PartialEq, Eq)]
pub struct ActivityResponse {
    pub id: i64,
    pub activity_type: ActivityType,
    pub amount: i64,
    /// Fee charged to the sender; zero for every other activity
    pub fee: i64,
    pub balance_after: i64,
    /// Counterparty of a transfer
    pub reference_account_number: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            activity_type: activity.activity_type,
            amount: activity.amount,
            fee: activity.fee,
            balance_after: activity.balance_after,
            reference_account_number: activity
                .reference
                .map(|reference| reference.account_number().to_owned()),
            description: activity.description,
            created_at: activity.created_at,
        }
    }
}

#[api_model(response)]
#[derive(Clone, PartialEq, Eq)]
pub struct TransferResponse {
    pub from_account: AccountResponse,
    pub to_account: AccountResponse,
    pub fee: i64,
}

impl From<TransferResult> for TransferResponse {
    fn from(result: TransferResult) -> Self {
        Self { from_account: result.from.into(), to_account: result.to.into(), fee: result.fee }
    }
}
