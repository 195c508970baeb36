use chrono::{DateTime, Duration, Utc};
use remit_account::{Account, AccountError, AccountRepository, NewAccount};
use remit_activity::{ActivityRepository, ActivityType, NewActivity, TransactionReference};
use remit_database::{Database, DatabaseError, SurrealAccountRepository, SurrealActivityRepository};
use remit_kernel::pagination::PageRequest;

async fn database() -> Database {
    Database::builder().url("mem://").session("test_ns", "test_db").init().await.unwrap()
}

fn at(offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_767_268_800_000).unwrap() + Duration::seconds(offset_secs)
}

async fn register(repo: &SurrealAccountRepository, number: &str) -> Account {
    let new_account = NewAccount::new(number, "Holder").unwrap();
    repo.insert(&new_account, at(0)).await.unwrap()
}

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = database().await;

    db.health().await.unwrap();
    assert_eq!(db.namespace(), "test_ns");
    assert_eq!(db.database(), "test_db");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn registered_accounts_get_sequential_ids() {
    let repo = SurrealAccountRepository::new(database().await);

    let first = register(&repo, "111").await;
    let second = register(&repo, "222").await;

    assert_eq!(first.id + 1, second.id);
    assert_eq!(repo.find_by_number("222").await.unwrap(), Some(second));
    assert!(repo.exists_by_number("111").await.unwrap());
    assert!(!repo.exists_by_number("999").await.unwrap());
}

#[tokio::test]
async fn duplicate_numbers_are_rejected() {
    let repo = SurrealAccountRepository::new(database().await);
    register(&repo, "111").await;

    let err = repo.insert(&NewAccount::new("111", "Other").unwrap(), at(1)).await.unwrap_err();

    assert!(matches!(err, AccountError::Duplicate { .. }));
}

#[tokio::test]
async fn commit_bumps_version_and_rejects_stale_writes() {
    let repo = SurrealAccountRepository::new(database().await);
    let mut account = register(&repo, "111").await;
    account.deposit(1_000, at(5)).unwrap();

    let saved = repo
        .commit(std::slice::from_ref(&account), &[NewActivity::deposit(account.id, 1_000, 1_000, at(5))])
        .await
        .unwrap();
    assert_eq!(saved[0].version, 1);
    assert_eq!(repo.find_by_number("111").await.unwrap(), Some(saved[0].clone()));

    // `account` still carries version 0.
    let err = repo.commit(&[account], &[]).await.unwrap_err();
    assert!(matches!(err, AccountError::Conflict { .. }));
}

#[tokio::test]
async fn committed_accounts_match_a_fresh_read() {
    let repo = SurrealAccountRepository::new(database().await);
    let mut account = register(&repo, "111").await;
    let now = at(5) + Duration::nanoseconds(123_456_789);
    account.deposit(1_000, now).unwrap();

    let saved = repo.commit(&[account], &[]).await.unwrap();

    assert_eq!(saved[0].updated_at.timestamp_subsec_nanos(), 123_000_000);
    assert_eq!(repo.find_by_number("111").await.unwrap(), Some(saved[0].clone()));
}

#[tokio::test]
async fn deleted_accounts_are_hidden_but_reserved() {
    let repo = SurrealAccountRepository::new(database().await);
    let mut account = register(&repo, "111").await;
    register(&repo, "222").await;

    account.delete(at(10));
    repo.commit(&[account], &[]).await.unwrap();

    assert_eq!(repo.find_by_number("111").await.unwrap(), None);
    assert!(repo.exists_by_number("111").await.unwrap());

    let page = repo.find_page(PageRequest::default()).await.unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].account_number, "222");
}

#[tokio::test]
async fn pages_follow_id_order() {
    let repo = SurrealAccountRepository::new(database().await);
    for number in ["111", "222", "333"] {
        register(&repo, number).await;
    }

    let page = repo.find_page(PageRequest::new(Some(1), Some(2)).unwrap()).await.unwrap();

    assert_eq!(page.total_elements, 3);
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].account_number, "333");
}

#[tokio::test]
async fn activities_come_back_newest_first() {
    let db = database().await;
    let accounts = SurrealAccountRepository::new(db.clone());
    let activities = SurrealActivityRepository::new(db);
    let mut from = register(&accounts, "111").await;
    let to = register(&accounts, "222").await;
    from.deposit(5_000, at(1)).unwrap();

    let recipient = TransactionReference::new(to.id, "222").unwrap();
    accounts
        .commit(
            &[from.clone()],
            &[
                NewActivity::deposit(from.id, 5_000, 5_000, at(1)),
                NewActivity::transfer_out(from.id, recipient, 1_000, 10, 3_990, "TX_1", at(2))
                    .with_description("rent")
                    .unwrap(),
            ],
        )
        .await
        .unwrap();

    let history = activities.find_by_account_id(from.id).await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].activity_type, ActivityType::TransferOut);
    assert_eq!(history[0].fee, 10);
    assert_eq!(history[0].description.as_deref(), Some("rent"));
    assert_eq!(history[0].reference.as_ref().map(|r| r.account_number()), Some("222"));
    assert_eq!(history[1].activity_type, ActivityType::Deposit);
    assert!(history[1].reference.is_none());
    assert!(activities.find_by_account_id(to.id).await.unwrap().is_empty());
}
