use crate::clock::{Clock, SystemClock};
use crate::error::{AccountError, AccountErrorExt};
use crate::model::{Account, NewAccount, TransferResult};
use crate::policy::{AccountPolicy, RetryPolicy};
use crate::repository::AccountRepository;
use remit_activity::{Activity, ActivityService, NewActivity, TransactionReference};
use remit_kernel::pagination::{Page, PageRequest};
use std::sync::Arc;
use tracing::{info, instrument};

/// Account feature state.
#[remit_derive::remit_slice]
pub struct AccountService {
    repository: Arc<dyn AccountRepository>,
    activities: ActivityService,
    policy: AccountPolicy,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Creates a new [`AccountServiceBuilder`] with default policies and the system clock.
    pub fn builder(
        repository: Arc<dyn AccountRepository>,
        activities: ActivityService,
    ) -> AccountServiceBuilder {
        AccountServiceBuilder {
            repository,
            activities,
            policy: AccountPolicy::default(),
            retry: RetryPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &AccountPolicy {
        &self.policy
    }

    /// Opens a new account with a zero balance. A taken number is reported before the
    /// request fields are validated.
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        account_number: &str,
        account_name: &str,
    ) -> Result<Account, AccountError> {
        let account = self
            .retry
            .run("register", move || self.register_once(account_number, account_name))
            .await?;
        info!(id = account.id, "Account registered");
        Ok(account)
    }

    pub async fn get(&self, account_number: &str) -> Result<Account, AccountError> {
        self.repository
            .find_by_number(account_number)
            .await?
            .ok_or_else(|| AccountError::NotFound { account_number: account_number.to_owned() })
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<Account>, AccountError> {
        self.repository.find_page(request).await.context("Listing accounts")
    }

    /// Soft-deletes the account. Its number stays reserved.
    #[instrument(skip(self))]
    pub async fn delete(&self, account_number: &str) -> Result<(), AccountError> {
        self.retry.run("delete", move || self.delete_once(account_number)).await?;
        info!("Account deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn deposit(&self, account_number: &str, amount: i64) -> Result<Account, AccountError> {
        let account =
            self.retry.run("deposit", move || self.deposit_once(account_number, amount)).await?;
        info!(balance = account.balance, "Deposit completed");
        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn withdraw(&self, account_number: &str, amount: i64) -> Result<Account, AccountError> {
        let account =
            self.retry.run("withdraw", move || self.withdraw_once(account_number, amount)).await?;
        info!(balance = account.balance, "Withdrawal completed");
        Ok(account)
    }

    /// Moves `amount` between two accounts. The sender also pays the transfer fee.
    #[instrument(skip(self))]
    pub async fn transfer(
        &self,
        from_account_number: &str,
        to_account_number: &str,
        amount: i64,
    ) -> Result<TransferResult, AccountError> {
        let result = self
            .retry
            .run("transfer", move || {
                self.transfer_once(from_account_number, to_account_number, amount)
            })
            .await?;
        info!(fee = result.fee, "Transfer completed");
        Ok(result)
    }

    /// Transaction history of a live account, newest first.
    pub async fn activities_of(&self, account_number: &str) -> Result<Vec<Activity>, AccountError> {
        let account = self.get(account_number).await?;
        Ok(self.activities.history(account.id).await?)
    }

    async fn register_once(
        &self,
        account_number: &str,
        account_name: &str,
    ) -> Result<Account, AccountError> {
        if self.repository.exists_by_number(account_number).await? {
            return Err(AccountError::Duplicate { account_number: account_number.to_owned() });
        }
        let new_account = NewAccount::new(account_number, account_name)?;
        self.repository.insert(&new_account, self.clock.now()).await
    }

    async fn delete_once(&self, account_number: &str) -> Result<(), AccountError> {
        let mut account = self.get(account_number).await?;
        account.delete(self.clock.now());
        self.repository.commit(&[account], &[]).await?;
        Ok(())
    }

    async fn deposit_once(&self, account_number: &str, amount: i64) -> Result<Account, AccountError> {
        let now = self.clock.now();
        let mut account = self.get(account_number).await?;
        account.deposit(amount, now)?;

        let activity = NewActivity::deposit(account.id, amount, account.balance, now);
        self.save_one(account, activity).await
    }

    async fn withdraw_once(&self, account_number: &str, amount: i64) -> Result<Account, AccountError> {
        let now = self.clock.now();
        let mut account = self.get(account_number).await?;
        account.withdraw(amount, &self.policy, self.clock.today(), now)?;

        let activity = NewActivity::withdraw(account.id, amount, account.balance, now);
        self.save_one(account, activity).await
    }

    async fn transfer_once(
        &self,
        from_account_number: &str,
        to_account_number: &str,
        amount: i64,
    ) -> Result<TransferResult, AccountError> {
        let now = self.clock.now();
        let mut from = self.get(from_account_number).await?;
        let mut to = self.get(to_account_number).await?;
        if from.id == to.id {
            return Err(AccountError::SameAccount { account_number: from.account_number });
        }

        let fee = from.transfer_to(&mut to, amount, &self.policy, self.clock.today(), now)?;

        let transaction_id = remit_kernel::transaction_id();
        let recipient = TransactionReference::new(to.id, to.account_number.clone())?;
        let sender = TransactionReference::new(from.id, from.account_number.clone())?;
        let activities = [
            NewActivity::transfer_out(from.id, recipient, amount, fee, from.balance, &transaction_id, now),
            NewActivity::transfer_in(to.id, sender, amount, to.balance, transaction_id, now),
        ];
        for activity in &activities {
            activity.ensure_valid()?;
        }

        let mut saved = self.repository.commit(&[from, to], &activities).await?.into_iter();
        let (Some(from), Some(to)) = (saved.next(), saved.next()) else {
            return Err("Commit returned fewer accounts than written".into());
        };
        Ok(TransferResult { from, to, fee })
    }

    async fn save_one(&self, account: Account, activity: NewActivity) -> Result<Account, AccountError> {
        activity.ensure_valid()?;
        self.repository
            .commit(&[account], &[activity])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| "Commit returned no account".into())
    }
}

/// A fluent builder for [`AccountService`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug)]
pub struct AccountServiceBuilder {
    repository: Arc<dyn AccountRepository>,
    activities: ActivityService,
    policy: AccountPolicy,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl AccountServiceBuilder {
    pub fn policy(mut self, policy: AccountPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> AccountService {
        AccountService::new(AccountServiceInner {
            repository: self.repository,
            activities: self.activities,
            policy: self.policy,
            retry: self.retry,
            clock: self.clock,
        })
    }
}
