//! Integration tests for `DieselSubscriptionRepository` against embedded
//! PostgreSQL.
//!
//! Each context owns its own cluster and a freshly migrated database, so
//! serial ids start at 1.

use calendar_backend::domain::ports::{SubscriptionRepository, SubscriptionRepositoryError};
use calendar_backend::domain::{Subscription, SubscriptionId, SubscriptionType, UserId};
use calendar_backend::outbound::persistence::{DbPool, DieselSubscriptionRepository, PoolConfig};
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, migrated_database, test_cluster};

const TEST_DB: &str = "diesel_subscription_repo_test";

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    repository: DieselSubscriptionRepository,
}

impl TestContext {
    fn insert(&self, owner: &str, kind: &str, url: &str) -> Subscription {
        self.runtime
            .block_on(self.repository.insert(&Subscription::new(
                user(owner),
                subscription_type(kind),
                url,
            )))
            .expect("insert subscription")
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database_url = migrated_database(&cluster, &runtime, TEST_DB)?;

    let pool = runtime
        .block_on(DbPool::new(PoolConfig::new(database_url).with_max_size(2)))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        repository: DieselSubscriptionRepository::new(pool),
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn user(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user")
}

fn subscription_type(raw: &str) -> SubscriptionType {
    SubscriptionType::new(raw).expect("valid type")
}

fn id_of(subscription: &Subscription) -> SubscriptionId {
    subscription.id.expect("persisted subscription has an id")
}

fn ids(subscriptions: &[Subscription]) -> Vec<i64> {
    subscriptions.iter().map(|sub| id_of(sub).get()).collect()
}

/// alice/webcal, alice/caldav, bob/webcal, alice/webcal in that order.
fn seed(context: &TestContext) -> Vec<Subscription> {
    vec![
        context.insert("alice", "webcal", "webcal://example.org/1.ics"),
        context.insert("alice", "caldav", "https://example.org/dav/2"),
        context.insert("bob", "webcal", "webcal://example.org/3.ics"),
        context.insert("alice", "webcal", "webcal://example.org/4.ics"),
    ]
}

#[rstest]
fn insert_assigns_id_and_creation_time(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: insert_assigns_id_and_creation_time skipped");
        return;
    };

    let stored = context.insert("alice", "webcal", "webcal://example.org/holidays.ics");

    assert_eq!(stored.id.map(SubscriptionId::get), Some(1));
    assert!(stored.created_at.is_some());
    assert_eq!(stored.user_id, user("alice"));
    assert_eq!(stored.url, "webcal://example.org/holidays.ics");
}

#[rstest]
fn listing_is_scoped_ordered_and_paginated(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: listing_is_scoped_ordered_and_paginated skipped");
        return;
    };
    let seeded = seed(&context);
    let repo = &context.repository;
    let alice = user("alice");
    let webcal = subscription_type("webcal");

    let all = context
        .runtime
        .block_on(repo.find_all(&alice, None, None))
        .expect("list");
    assert_eq!(
        ids(&all),
        vec![
            id_of(&seeded[0]).get(),
            id_of(&seeded[1]).get(),
            id_of(&seeded[3]).get(),
        ]
    );

    let empty = context
        .runtime
        .block_on(repo.find_all(&alice, Some(0), None))
        .expect("zero limit");
    assert!(empty.is_empty());

    let page = context
        .runtime
        .block_on(repo.find_all(&alice, Some(1), Some(1)))
        .expect("page");
    assert_eq!(ids(&page), vec![id_of(&seeded[1]).get()]);

    let typed = context
        .runtime
        .block_on(repo.find_all_by_type(&alice, &webcal, None, Some(1)))
        .expect("typed list");
    assert_eq!(ids(&typed), vec![id_of(&seeded[3]).get()]);
}

#[rstest]
fn counts_and_existence_honour_filters(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: counts_and_existence_honour_filters skipped");
        return;
    };
    let seeded = seed(&context);
    let repo = &context.repository;
    let webcal = subscription_type("webcal");
    let caldav = subscription_type("caldav");
    let bobs = id_of(&seeded[2]);

    context.runtime.block_on(async {
        assert_eq!(repo.count(None).await.expect("count all"), 4);
        assert_eq!(repo.count(Some(user("alice"))).await.expect("count alice"), 3);
        assert_eq!(repo.count_by_type(&webcal, None).await.expect("count webcal"), 3);
        assert_eq!(
            repo.count_by_type(&caldav, Some(user("bob")))
                .await
                .expect("count bob caldav"),
            0
        );

        assert!(repo.does_exist(bobs, None).await.expect("exists"));
        assert!(!repo.does_exist(bobs, Some(user("alice"))).await.expect("foreign"));
        assert!(
            repo.does_exist_of_type(bobs, &webcal, Some(user("bob")))
                .await
                .expect("typed exists")
        );
        assert!(
            !repo
                .does_exist_of_type(bobs, &caldav, None)
                .await
                .expect("wrong type")
        );
    });
}

#[rstest]
fn lookups_report_not_found_outside_their_filters(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: lookups_report_not_found_outside_their_filters skipped");
        return;
    };
    let seeded = seed(&context);
    let repo = &context.repository;
    let caldav_id = id_of(&seeded[1]);
    let missing = SubscriptionId::new(999).expect("valid id");

    context.runtime.block_on(async {
        let found = repo
            .find_by_type(caldav_id, &subscription_type("caldav"), Some(user("alice")))
            .await
            .expect("typed lookup");
        assert_eq!(found, seeded[1]);

        for outcome in [
            repo.find(caldav_id, Some(user("bob"))).await,
            repo.find_by_type(caldav_id, &subscription_type("webcal"), None)
                .await,
            repo.find(missing, None).await,
        ] {
            assert!(
                matches!(outcome, Err(SubscriptionRepositoryError::NotFound { .. })),
                "expected NotFound, got {outcome:?}"
            );
        }
    });
}

#[rstest]
fn update_replaces_fields_but_keeps_creation_time(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: update_replaces_fields_but_keeps_creation_time skipped");
        return;
    };
    let original = context.insert("alice", "webcal", "webcal://example.org/old.ics");
    let repo = &context.repository;

    let mut changed = original.clone();
    changed.subscription_type = subscription_type("caldav");
    changed.url = "https://example.org/dav/new".to_owned();
    changed.created_at = None;

    let reloaded = context.runtime.block_on(async {
        repo.update(&changed).await.expect("update");
        repo.find(id_of(&original), None).await.expect("reload")
    });

    assert_eq!(reloaded.subscription_type, subscription_type("caldav"));
    assert_eq!(reloaded.url, "https://example.org/dav/new");
    assert_eq!(reloaded.created_at, original.created_at);
}

#[rstest]
fn writes_to_missing_rows_are_not_found(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: writes_to_missing_rows_are_not_found skipped");
        return;
    };
    let stored = context.insert("alice", "webcal", "webcal://example.org/a.ics");
    let repo = &context.repository;
    let ghost = Subscription::new(
        user("alice"),
        subscription_type("webcal"),
        "webcal://example.org/ghost.ics",
    )
    .with_id(SubscriptionId::new(999).expect("valid id"));

    context.runtime.block_on(async {
        repo.delete(&stored).await.expect("first delete");
        assert!(!repo.does_exist(id_of(&stored), None).await.expect("exists"));

        for outcome in [
            repo.delete(&stored).await,
            repo.update(&ghost).await,
            repo.delete(&ghost).await,
        ] {
            assert!(
                matches!(outcome, Err(SubscriptionRepositoryError::NotFound { .. })),
                "expected NotFound, got {outcome:?}"
            );
        }
    });
}
