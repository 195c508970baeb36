use crate::error::AccountError;
use crate::limit::DailyLimitTracker;
use crate::policy::AccountPolicy;
use chrono::{DateTime, NaiveDate, Utc};

pub const ACCOUNT_NUMBER_MIN_LEN: usize = 3;
pub const ACCOUNT_NUMBER_MAX_LEN: usize = 20;
pub const ACCOUNT_NAME_MAX_LEN: usize = 100;

/// A validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    account_number: String,
    account_name: String,
}

impl NewAccount {
    /// # Errors
    /// * [`AccountError::InvalidArgument`] when the number is blank or not 3 to 20 characters.
    /// * [`AccountError::InvalidName`] when the name is blank or longer than 100 characters.
    pub fn new(
        account_number: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Result<Self, AccountError> {
        let account_number = account_number.into();
        let account_name = account_name.into();

        validate_account_number(&account_number)?;
        if account_name.trim().is_empty() {
            return Err(AccountError::InvalidName { message: "name must not be blank".into() });
        }
        if account_name.chars().count() > ACCOUNT_NAME_MAX_LEN {
            return Err(AccountError::InvalidName {
                message: format!("name must be at most {ACCOUNT_NAME_MAX_LEN} characters").into(),
            });
        }

        Ok(Self { account_number, account_name })
    }

    #[must_use]
    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    #[must_use]
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// The account as it looks right after registration.
    #[must_use]
    pub fn into_account(self, id: i64, now: DateTime<Utc>) -> Account {
        Account {
            id,
            account_number: self.account_number,
            account_name: self.account_name,
            balance: 0,
            withdraw_limit: DailyLimitTracker::new(),
            transfer_limit: DailyLimitTracker::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            version: 0,
        }
    }
}

fn validate_account_number(account_number: &str) -> Result<(), AccountError> {
    if account_number.trim().is_empty() {
        return Err(AccountError::invalid_argument("Account number must not be blank."));
    }
    let len = account_number.chars().count();
    if !(ACCOUNT_NUMBER_MIN_LEN..=ACCOUNT_NUMBER_MAX_LEN).contains(&len) {
        return Err(AccountError::invalid_argument(format!(
            "Account number must be {ACCOUNT_NUMBER_MIN_LEN}-{ACCOUNT_NUMBER_MAX_LEN} characters."
        )));
    }
    Ok(())
}

fn ensure_positive(amount: i64) -> Result<(), AccountError> {
    if amount <= 0 {
        return Err(AccountError::invalid_argument("Amount must be greater than 0."));
    }
    Ok(())
}

/// A bank account. Balances are whole KRW.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub account_number: String,
    pub account_name: String,
    pub balance: i64,
    pub withdraw_limit: DailyLimitTracker,
    pub transfer_limit: DailyLimitTracker,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Optimistic-lock version as read from storage.
    pub version: i64,
}

impl Account {
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn deposit(&mut self, amount: i64, now: DateTime<Utc>) -> Result<(), AccountError> {
        ensure_positive(amount)?;
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| AccountError::invalid_argument("Balance would overflow."))?;
        self.updated_at = now;
        Ok(())
    }

    /// Balance is checked before the daily limit.
    pub fn withdraw(
        &mut self,
        amount: i64,
        policy: &AccountPolicy,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), AccountError> {
        ensure_positive(amount)?;
        self.ensure_balance(amount)?;
        self.withdraw_limit.track(amount, policy.daily_withdraw_limit(), today, |limit| {
            AccountError::WithdrawLimitExceeded { limit }
        })?;

        self.balance -= amount;
        self.updated_at = now;
        Ok(())
    }

    /// Moves `amount` to `to`, charging this account the fee on top. Only `amount` counts
    /// towards the daily transfer limit. Returns the fee.
    pub fn transfer_to(
        &mut self,
        to: &mut Self,
        amount: i64,
        policy: &AccountPolicy,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<i64, AccountError> {
        ensure_positive(amount)?;
        let fee = policy.transfer_fee(amount);
        let total = amount
            .checked_add(fee)
            .ok_or_else(|| AccountError::invalid_argument("Amount is too large."))?;
        self.ensure_balance(total)?;
        let credited = to
            .balance
            .checked_add(amount)
            .ok_or_else(|| AccountError::invalid_argument("Balance would overflow."))?;
        self.transfer_limit.track(amount, policy.daily_transfer_limit(), today, |limit| {
            AccountError::TransferLimitExceeded { limit }
        })?;

        self.balance -= total;
        to.balance = credited;
        self.updated_at = now;
        to.updated_at = now;
        Ok(fee)
    }

    pub fn delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    fn ensure_balance(&self, required: i64) -> Result<(), AccountError> {
        if self.balance < required {
            return Err(AccountError::InsufficientBalance { balance: self.balance, required });
        }
        Ok(())
    }
}

/// Both sides of a completed transfer and the fee charged to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub from: Account,
    pub to: Account,
    pub fee: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap()
    }

    fn today() -> NaiveDate {
        now().date_naive()
    }

    fn funded(number: &str, id: i64, balance: i64) -> Account {
        let mut account = NewAccount::new(number, "Holder").unwrap().into_account(id, now());
        account.balance = balance;
        account
    }

    #[test]
    fn validates_account_number() {
        for bad in ["", "   ", "12", "123456789012345678901"] {
            assert!(
                matches!(NewAccount::new(bad, "Name"), Err(AccountError::InvalidArgument { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert!(NewAccount::new("123", "Name").is_ok());
        assert!(NewAccount::new("12345678901234567890", "Name").is_ok());
    }

    #[test]
    fn validates_account_name() {
        assert!(matches!(NewAccount::new("1234", " "), Err(AccountError::InvalidName { .. })));
        assert!(matches!(
            NewAccount::new("1234", "n".repeat(101)),
            Err(AccountError::InvalidName { .. })
        ));
        assert!(NewAccount::new("1234", "n".repeat(100)).is_ok());
    }

    #[test]
    fn new_account_starts_empty() {
        let account = NewAccount::new("1234", "Name").unwrap().into_account(1, now());
        assert_eq!(account.balance, 0);
        assert_eq!(account.version, 0);
        assert!(!account.is_deleted());
    }

    #[test]
    fn deposit_requires_positive_amount() {
        let mut account = funded("1234", 1, 0);
        assert!(account.deposit(0, now()).is_err());
        account.deposit(500, now()).unwrap();
        assert_eq!(account.balance, 500);
    }

    #[test]
    fn withdraw_checks_balance_before_limit() {
        let policy = AccountPolicy::new(100, 100, 0.01).unwrap();
        let mut account = funded("1234", 1, 50);

        let err = account.withdraw(200, &policy, today(), now()).unwrap_err();
        assert!(matches!(err, AccountError::InsufficientBalance { balance: 50, required: 200 }));
        assert_eq!(account.withdraw_limit, DailyLimitTracker::new());
    }

    #[test]
    fn withdraw_enforces_daily_limit() {
        let policy = AccountPolicy::default();
        let mut account = funded("1234", 1, 2_000_000);

        account.withdraw(1_000_000, &policy, today(), now()).unwrap();
        let err = account.withdraw(1, &policy, today(), now()).unwrap_err();

        assert!(matches!(err, AccountError::WithdrawLimitExceeded { limit: 1_000_000 }));
        assert_eq!(account.balance, 1_000_000);
    }

    #[test]
    fn transfer_moves_amount_and_charges_fee() {
        let policy = AccountPolicy::default();
        let mut from = funded("1111", 1, 100_000);
        let mut to = funded("2222", 2, 0);

        let fee = from.transfer_to(&mut to, 10_000, &policy, today(), now()).unwrap();

        assert_eq!(fee, 100);
        assert_eq!(from.balance, 89_900);
        assert_eq!(to.balance, 10_000);
        assert_eq!(from.transfer_limit.accumulated_on(today()), 10_000);
    }

    #[test]
    fn transfer_needs_amount_plus_fee() {
        let policy = AccountPolicy::default();
        let mut from = funded("1111", 1, 10_000);
        let mut to = funded("2222", 2, 0);

        let err = from.transfer_to(&mut to, 10_000, &policy, today(), now()).unwrap_err();

        assert!(matches!(err, AccountError::InsufficientBalance { required: 10_100, .. }));
        assert_eq!(to.balance, 0);
    }

    #[test]
    fn transfer_limit_ignores_fee() {
        let policy = AccountPolicy::default();
        let mut from = funded("1111", 1, 5_000_000);
        let mut to = funded("2222", 2, 0);

        from.transfer_to(&mut to, 3_000_000, &policy, today(), now()).unwrap();
        let err = from.transfer_to(&mut to, 1, &policy, today(), now()).unwrap_err();

        assert!(matches!(err, AccountError::TransferLimitExceeded { limit: 3_000_000 }));
    }

    #[test]
    fn delete_marks_account() {
        let mut account = funded("1234", 1, 0);
        account.delete(now());
        assert!(account.is_deleted());
    }
}
