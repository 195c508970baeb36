mod common;

use remit_account::{AccountService, init};
use remit_activity::ActivityService;
use remit_kernel::domain::config::AccountConfig;
use std::sync::Arc;

#[test]
fn init_creates_slice() {
    let store = Arc::new(common::MemoryStore::default());
    let activities = ActivityService::with_repository(store.clone());

    let slice = init(&AccountConfig::default(), store, activities).unwrap();

    assert_eq!(slice.id, std::any::TypeId::of::<AccountService>());
}

#[test]
fn init_rejects_invalid_policy() {
    let store = Arc::new(common::MemoryStore::default());
    let activities = ActivityService::with_repository(store.clone());
    let mut config = AccountConfig::default();
    config.fees.transfer_rate = 2.0;

    assert!(init(&config, store, activities).is_err());
}
