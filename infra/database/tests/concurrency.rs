use remit_account::{AccountError, AccountService, RetryPolicy};
use remit_activity::{ActivityRepository, ActivityService};
use remit_database::{Database, SurrealAccountRepository, SurrealActivityRepository};
use std::sync::Arc;
use std::time::Duration;

const WRITERS: usize = 10;
const AMOUNT: i64 = 1_000;

async fn service() -> (AccountService, SurrealActivityRepository) {
    let db = Database::builder().url("mem://").session("test_ns", "test_db").init().await.unwrap();
    let activities = SurrealActivityRepository::new(db.clone());
    let service = AccountService::builder(
        Arc::new(SurrealAccountRepository::new(db)),
        ActivityService::with_repository(Arc::new(activities.clone())),
    )
    .retry(RetryPolicy::new(5, Duration::from_millis(10)))
    .build();
    (service, activities)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deposits_never_surface_storage_errors() {
    let (service, activities) = service().await;
    let account = service.register("C-123", "Holder").await.unwrap();

    let tasks: Vec<_> = (0..WRITERS)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.deposit("C-123", AMOUNT).await })
        })
        .collect();

    let mut succeeded = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AccountError::Conflict { .. }) => {}
            Err(other) => panic!("unexpected deposit failure: {other}"),
        }
    }

    assert!(succeeded > 0);
    let stored = service.get("C-123").await.unwrap();
    assert_eq!(stored.balance, succeeded * AMOUNT);
    assert_eq!(stored.version, succeeded);
    let history = activities.find_by_account_id(account.id).await.unwrap();
    assert_eq!(history.len(), usize::try_from(succeeded).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_registrations_keep_one_account() {
    let (service, _) = service().await;

    let tasks: Vec<_> = (0..WRITERS)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.register("C-777", &format!("Holder {i}")).await })
        })
        .collect();

    let mut registered = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => registered += 1,
            Err(AccountError::Duplicate { .. } | AccountError::Conflict { .. }) => {}
            Err(other) => panic!("unexpected registration failure: {other}"),
        }
    }

    assert_eq!(registered, 1);
    assert_eq!(service.list(Default::default()).await.unwrap().total_elements, 1);
}
