//! Tests for the subscription service.

use std::error::Error as _;
use std::sync::Arc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockSubscriptionRepository;
use crate::domain::validation::MockSubscriptionValidator;
use chrono::{TimeZone, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

type MockService = SubscriptionService<MockSubscriptionRepository, MockSubscriptionValidator>;

fn make_service(
    repo: MockSubscriptionRepository,
    validator: MockSubscriptionValidator,
) -> MockService {
    SubscriptionService::with_validator(Arc::new(repo), Arc::new(validator))
}

fn accepting_validator() -> MockSubscriptionValidator {
    let mut validator = MockSubscriptionValidator::new();
    validator.expect_validate().returning(|_| Ok(()));
    validator
}

#[fixture]
fn alice() -> UserId {
    UserId::new("alice").expect("valid user")
}

#[fixture]
fn personal() -> SubscriptionType {
    SubscriptionType::new("personal").expect("valid type")
}

fn id(raw: i64) -> SubscriptionId {
    SubscriptionId::new(raw).expect("valid id")
}

fn persisted(raw: i64) -> Subscription {
    let mut sub = Subscription::new(
        UserId::new("alice").expect("valid user"),
        SubscriptionType::new("personal").expect("valid type"),
        "https://example.org/cal.ics",
    )
    .with_id(id(raw));
    sub.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single();
    sub
}

fn business(error: SubscriptionServiceError) -> Error {
    match error {
        SubscriptionServiceError::Business(err) => err,
        other => panic!("expected business error, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn find_translates_not_found_into_404(alice: UserId) {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_find()
        .with(eq(id(7)), eq(Some(alice.clone())))
        .times(1)
        .return_once(|_, _| Err(SubscriptionRepositoryError::not_found("no row")));

    let service = make_service(repo, MockSubscriptionValidator::new());
    let err = business(
        service
            .find(id(7), Some(alice))
            .await
            .expect_err("missing subscription"),
    );

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.status(), 404);
    assert_eq!(err.message(), "no row");
    let cause = err
        .source()
        .and_then(|source| source.downcast_ref::<SubscriptionRepositoryError>())
        .expect("original failure kept as cause");
    assert_eq!(cause, &SubscriptionRepositoryError::not_found("no row"));
}

#[rstest]
#[tokio::test]
async fn find_translates_multiple_found_into_500() {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(|_, _| Err(SubscriptionRepositoryError::multiple_found("2 rows")));

    let service = make_service(repo, MockSubscriptionValidator::new());
    let err = business(service.find(id(3), None).await.expect_err("ambiguous"));

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), "2 rows");
    assert!(err.source().is_some());
}

#[rstest]
#[case(SubscriptionRepositoryError::not_found("gone"), 404)]
#[case(SubscriptionRepositoryError::multiple_found("two"), 500)]
#[tokio::test]
async fn find_by_type_translates_lookup_failures(
    alice: UserId,
    personal: SubscriptionType,
    #[case] failure: SubscriptionRepositoryError,
    #[case] status: u16,
) {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_find_by_type()
        .with(eq(id(11)), eq(personal.clone()), eq(Some(alice.clone())))
        .times(1)
        .return_once(move |_, _, _| Err(failure));

    let service = make_service(repo, MockSubscriptionValidator::new());
    let err = business(
        service
            .find_by_type(id(11), &personal, Some(alice))
            .await
            .expect_err("translated"),
    );

    assert_eq!(err.status(), status);
}

#[rstest]
#[case(SubscriptionRepositoryError::connection("refused"))]
#[case(SubscriptionRepositoryError::query("syntax error"))]
#[tokio::test]
async fn find_propagates_other_failures_unchanged(#[case] failure: SubscriptionRepositoryError) {
    let expected = failure.clone();
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let service = make_service(repo, MockSubscriptionValidator::new());
    let err = service.find(id(1), None).await.expect_err("failure");

    assert!(
        matches!(err, SubscriptionServiceError::Repository(ref inner) if inner == &expected),
        "unexpected error: {err:?}"
    );
}

#[rstest]
#[tokio::test]
async fn find_returns_repository_value() {
    let stored = persisted(5);
    let expected = stored.clone();
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_, _| Ok(stored));

    let service = make_service(repo, MockSubscriptionValidator::new());
    let found = service.find(id(5), None).await.expect("found");

    assert_eq!(found, expected);
}

#[rstest]
#[tokio::test]
async fn create_validates_before_inserting() {
    let mut seq = mockall::Sequence::new();
    let mut validator = MockSubscriptionValidator::new();
    validator
        .expect_validate()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_insert()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(persisted(1)));

    let service = make_service(repo, validator);
    let mut unsaved = persisted(1);
    unsaved.id = None;
    unsaved.created_at = None;
    let created = service.create(unsaved).await.expect("created");

    assert_eq!(created, persisted(1));
}

#[rstest]
#[tokio::test]
async fn create_propagates_validation_failure_without_persisting() {
    let mut validator = MockSubscriptionValidator::new();
    validator.expect_validate().times(1).returning(|_| {
        Err(SubscriptionValidationError::UnsupportedType {
            subscription_type: "bad type".to_owned(),
        })
    });
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_insert().never();

    let service = make_service(repo, validator);
    let err = service
        .create(persisted(1))
        .await
        .expect_err("validation fails");

    assert!(matches!(
        err,
        SubscriptionServiceError::Validation(SubscriptionValidationError::UnsupportedType {
            ref subscription_type
        }) if subscription_type == "bad type"
    ));
}

#[rstest]
#[tokio::test]
async fn create_passes_insert_not_found_through_untranslated() {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_insert()
        .times(1)
        .returning(|_| Err(SubscriptionRepositoryError::not_found("owner missing")));

    let service = make_service(repo, accepting_validator());
    let err = service.create(persisted(1)).await.expect_err("insert fails");

    assert!(matches!(
        err,
        SubscriptionServiceError::Repository(SubscriptionRepositoryError::NotFound { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn update_returns_the_subscription_passed_in() {
    let sub = persisted(9);
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_update()
        .with(eq(sub.clone()))
        .times(1)
        .returning(|_| Ok(()));

    let service = make_service(repo, accepting_validator());
    let updated = service.update(sub.clone()).await.expect("updated");

    assert_eq!(updated, sub);
}

#[rstest]
#[tokio::test]
async fn update_propagates_validation_failure_without_persisting() {
    let mut validator = MockSubscriptionValidator::new();
    validator
        .expect_validate()
        .times(1)
        .returning(|_| Err(SubscriptionValidationError::MissingHost));
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_update().never();

    let service = make_service(repo, validator);
    let err = service.update(persisted(2)).await.expect_err("invalid");

    assert!(matches!(
        err,
        SubscriptionServiceError::Validation(SubscriptionValidationError::MissingHost)
    ));
}

#[rstest]
#[tokio::test]
async fn delete_forwards_exactly_the_given_subscription() {
    let sub = persisted(4);
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_delete()
        .with(eq(sub.clone()))
        .times(1)
        .returning(|_| Ok(()));

    let service = make_service(repo, MockSubscriptionValidator::new());
    service.delete(sub).await.expect("deleted");
}

#[rstest]
#[tokio::test]
async fn delete_passes_repository_errors_through() {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_delete()
        .times(1)
        .returning(|_| Err(SubscriptionRepositoryError::not_found("already gone")));

    let service = make_service(repo, MockSubscriptionValidator::new());
    let err = service.delete(persisted(4)).await.expect_err("gone");

    assert!(matches!(err, SubscriptionServiceError::Repository(_)));
}

#[rstest]
#[tokio::test]
async fn count_by_type_returns_repository_count(alice: UserId, personal: SubscriptionType) {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_count_by_type()
        .with(eq(personal.clone()), eq(Some(alice.clone())))
        .times(1)
        .returning(|_, _| Ok(3));

    let service = make_service(repo, MockSubscriptionValidator::new());
    let count = service
        .count_by_type(&personal, Some(alice))
        .await
        .expect("counted");

    assert_eq!(count, 3);
}

#[rstest]
#[tokio::test]
async fn count_forwards_absent_user_filter() {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_count()
        .with(eq(None))
        .times(1)
        .returning(|_| Ok(12));

    let service = make_service(repo, MockSubscriptionValidator::new());
    assert_eq!(service.count(None).await.expect("counted"), 12);
}

#[rstest]
#[case(Some(0), Some(0))]
#[case(None, None)]
#[case(Some(10), Some(20))]
#[tokio::test]
async fn find_all_forwards_pagination_untouched(
    alice: UserId,
    #[case] limit: Option<u32>,
    #[case] offset: Option<u32>,
) {
    let rows = if limit == Some(0) {
        Vec::new()
    } else {
        vec![persisted(1), persisted(2)]
    };
    let expected = rows.clone();
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_find_all()
        .with(eq(alice.clone()), eq(limit), eq(offset))
        .times(1)
        .return_once(move |_, _, _| Ok(rows));

    let service = make_service(repo, MockSubscriptionValidator::new());
    let listed = service
        .find_all(&alice, limit, offset)
        .await
        .expect("listed");

    assert_eq!(listed, expected);
}

#[rstest]
#[tokio::test]
async fn find_all_by_type_passes_errors_through(alice: UserId, personal: SubscriptionType) {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_find_all_by_type()
        .times(1)
        .returning(|_, _, _, _| Err(SubscriptionRepositoryError::connection("pool closed")));

    let service = make_service(repo, MockSubscriptionValidator::new());
    let err = service
        .find_all_by_type(&alice, &personal, None, None)
        .await
        .expect_err("connection failure");

    assert!(matches!(
        err,
        SubscriptionServiceError::Repository(SubscriptionRepositoryError::Connection { .. })
    ));
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn does_exist_reports_absence_as_false_not_error(#[case] exists: bool) {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_does_exist()
        .with(eq(id(8)), eq(None))
        .times(1)
        .returning(move |_, _| Ok(exists));

    let service = make_service(repo, MockSubscriptionValidator::new());
    assert_eq!(service.does_exist(id(8), None).await.expect("checked"), exists);
}

#[rstest]
#[tokio::test]
async fn does_exist_of_type_forwards_filters(alice: UserId, personal: SubscriptionType) {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_does_exist_of_type()
        .with(eq(id(2)), eq(personal.clone()), eq(Some(alice.clone())))
        .times(1)
        .returning(|_, _, _| Ok(true));

    let service = make_service(repo, MockSubscriptionValidator::new());
    assert!(
        service
            .does_exist_of_type(id(2), &personal, Some(alice))
            .await
            .expect("checked")
    );
}

#[rstest]
#[tokio::test]
async fn default_validator_rejects_bad_urls_before_persistence() {
    let mut repo = MockSubscriptionRepository::new();
    repo.expect_insert().never();

    let service = SubscriptionService::new(Arc::new(repo));
    let mut sub = persisted(1);
    sub.url = "ftp://example.org/cal.ics".to_owned();
    let err = service.create(sub).await.expect_err("ftp rejected");

    assert!(matches!(
        err,
        SubscriptionServiceError::Validation(SubscriptionValidationError::UnsupportedScheme { .. })
    ));
}
