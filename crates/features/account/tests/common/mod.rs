#![allow(dead_code, unreachable_pub)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use remit_account::{
    Account, AccountError, AccountRepository, AccountService, FixedClock, NewAccount, RetryPolicy,
};
use remit_activity::{Activity, ActivityError, ActivityRepository, ActivityService, NewActivity};
use remit_kernel::pagination::{Page, PageRequest};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Both repositories over one in-memory ledger.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    pending_conflicts: AtomicU32,
}

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Account>,
    activities: Vec<Activity>,
}

impl MemoryStore {
    /// Makes the next `n` inserts or commits fail as if another writer won.
    pub fn inject_conflicts(&self, n: u32) {
        self.pending_conflicts.store(n, Ordering::SeqCst);
    }

    fn take_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn activity_count(&self) -> usize {
        self.state.lock().unwrap().activities.len()
    }

    pub fn stored(&self, account_number: &str) -> Option<Account> {
        let state = self.state.lock().unwrap();
        state.accounts.iter().find(|a| a.account_number == account_number).cloned()
    }
}

fn conflict() -> AccountError {
    AccountError::Conflict { message: "version mismatch".into(), context: None }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>, AccountError> {
        Ok(self.stored(account_number).filter(|a| !a.is_deleted()))
    }

    async fn exists_by_number(&self, account_number: &str) -> Result<bool, AccountError> {
        Ok(self.stored(account_number).is_some())
    }

    async fn insert(&self, account: &NewAccount, now: DateTime<Utc>) -> Result<Account, AccountError> {
        if self.take_conflict() {
            return Err(conflict());
        }
        let mut state = self.state.lock().unwrap();
        if state.accounts.iter().any(|a| a.account_number == account.account_number()) {
            return Err(AccountError::Duplicate { account_number: account.account_number().into() });
        }
        let id = i64::try_from(state.accounts.len()).unwrap() + 1;
        let account = account.clone().into_account(id, now);
        state.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Account>, AccountError> {
        let state = self.state.lock().unwrap();
        let live: Vec<_> = state.accounts.iter().filter(|a| !a.is_deleted()).cloned().collect();
        let total = live.len() as u64;
        let content = live
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap())
            .take(request.size() as usize)
            .collect();
        Ok(Page::new(content, request, total))
    }

    async fn commit(
        &self,
        accounts: &[Account],
        activities: &[NewActivity],
    ) -> Result<Vec<Account>, AccountError> {
        if self.take_conflict() {
            return Err(conflict());
        }

        let mut state = self.state.lock().unwrap();
        for account in accounts {
            let stored = state.accounts.iter().find(|a| a.id == account.id);
            if stored.is_none_or(|s| s.version != account.version) {
                return Err(conflict());
            }
        }

        let mut saved = Vec::with_capacity(accounts.len());
        for account in accounts {
            let mut next = account.clone();
            next.version += 1;
            if let Some(slot) = state.accounts.iter_mut().find(|a| a.id == account.id) {
                *slot = next.clone();
            }
            saved.push(next);
        }
        for activity in activities {
            let id = i64::try_from(state.activities.len()).unwrap() + 1;
            state.activities.push(activity.clone().into_activity(id));
        }
        Ok(saved)
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn find_by_account_id(&self, account_id: i64) -> Result<Vec<Activity>, ActivityError> {
        let state = self.state.lock().unwrap();
        let mut list: Vec<_> =
            state.activities.iter().filter(|a| a.account_id == account_id).cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(list)
    }
}

pub fn start() -> DateTime<Utc> {
    // 2026-01-01T12:00:00Z
    DateTime::from_timestamp(1_767_268_800, 0).unwrap()
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub service: AccountService,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::default());
    let clock = Arc::new(FixedClock::new(start()));
    let activities = ActivityService::with_repository(store.clone());
    let service = AccountService::builder(store.clone(), activities)
        .clock(clock.clone())
        .retry(RetryPolicy::new(3, Duration::from_millis(1)))
        .build();
    Harness { store, clock, service }
}
