//! End-to-end slip scenarios through the services.
//!
//! These run against the in-memory stores and need no external services.
//!
//! Run with: cargo test -p slipdesk-integration-tests

use chrono::NaiveDate;

use slipdesk_core::{Role, SlipFilter, SlipStatus};
use slipdesk_integration_tests::TestApp;
use slipdesk_server::services::retention::LAST_RUN_KEY;
use slipdesk_server::services::{SchedulerOutcome, SlipError};
use slipdesk_server::testing::{sample_form, sample_image};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_created_slip_is_pending_with_uploaded_image() {
    let app = TestApp::new();

    let slip = app
        .state
        .slips()
        .create_slip(&sample_form(), Some(sample_image()))
        .await
        .expect("Failed to create slip");

    assert_eq!(slip.status, SlipStatus::Pending);
    assert_eq!(slip.delivery_date, "2024-01-01");
    assert!(app.images.contains(&slip.image_url));
    assert_eq!(app.slips.all().len(), 1);
}

#[tokio::test]
async fn test_create_without_image_writes_nothing() {
    let app = TestApp::new();

    let err = app
        .state
        .slips()
        .create_slip(&sample_form(), None)
        .await
        .expect_err("slip without image must be rejected");

    assert!(matches!(err, SlipError::Validation(_)));
    assert!(app.slips.all().is_empty());
    assert_eq!(app.images.upload_count(), 0);
}

#[tokio::test]
async fn test_upload_failure_leaves_no_slip() {
    let app = TestApp::new();
    app.images.fail_uploads(true);

    let err = app
        .state
        .slips()
        .create_slip(&sample_form(), Some(sample_image()))
        .await
        .expect_err("upload failure must abort creation");

    assert!(matches!(err, SlipError::ExternalStore(_)));
    assert!(app.slips.all().is_empty());
}

// ============================================================================
// Status Changes
// ============================================================================

#[tokio::test]
async fn test_chef_cannot_mark_delivered() {
    let app = TestApp::new();
    let slip = app.slips.insert_dated("2024-01-01");

    let err = app
        .state
        .slips()
        .set_slip_status(slip.id, "delivered", Some(Role::Chef))
        .await
        .expect_err("chef must not set delivered");

    assert!(matches!(err, SlipError::Permission(_)));
    assert_eq!(
        app.slips.get(slip.id).expect("slip still stored").status,
        SlipStatus::Pending
    );
}

#[tokio::test]
async fn test_role_status_matrix() {
    let app = TestApp::new();
    let slip = app.slips.insert_dated("2024-01-01");

    for role in Role::ALL {
        for status in SlipStatus::ALL {
            let result = app
                .state
                .slips()
                .set_slip_status(slip.id, status.as_str(), Some(role))
                .await;
            assert_eq!(
                result.is_ok(),
                role.can_set(status),
                "{role} setting {status}"
            );
        }
    }
}

#[tokio::test]
async fn test_kitchen_then_store_then_delivery() {
    let app = TestApp::new();
    let slip = app.slips.insert_dated("2024-01-01");
    let slips = app.state.slips();

    for (role, status) in [
        (Role::Chef, "in kitchen"),
        (Role::Chef, "ready"),
        (Role::Staff, "in store"),
        (Role::Delivery, "delivered"),
    ] {
        let updated = slips
            .set_slip_status(slip.id, status, Some(role))
            .await
            .expect("permitted transition");
        assert_eq!(updated.status.as_str(), status);
    }

    // Any-direction changes inside a role's set are allowed.
    let back = slips
        .set_slip_status(slip.id, "in kitchen", Some(Role::Chef))
        .await
        .expect("chef may move a slip back to the kitchen");
    assert_eq!(back.status, SlipStatus::InKitchen);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_is_newest_first_and_filtered() {
    let app = TestApp::new();
    let first = app.slips.insert_dated("2024-01-01");
    let second = app.slips.insert_dated("2024-01-02");

    let all = app
        .state
        .slips()
        .list_slips(&SlipFilter::default())
        .await
        .expect("list");
    let ids: Vec<_> = all.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let by_date = app
        .state
        .slips()
        .list_slips(&SlipFilter {
            date: Some("02-01-2024".to_string()),
            ..SlipFilter::default()
        })
        .await
        .expect("list");
    assert_eq!(by_date.len(), 1);
    assert_eq!(by_date.first().map(|s| s.id), Some(second.id));
}

// ============================================================================
// Retention
// ============================================================================

#[tokio::test]
async fn test_sweep_deletes_old_slip_and_its_image() {
    let app = TestApp::new();
    let slip = app
        .state
        .slips()
        .create_slip(&sample_form(), Some(sample_image()))
        .await
        .expect("create");

    let report = app
        .state
        .sweeper()
        .sweep(5, ymd(2024, 2, 1))
        .await
        .expect("sweep");

    assert_eq!(report.deleted_count, 1);
    assert!(app.slips.get(slip.id).is_none());
    assert_eq!(app.images.delete_attempts(), vec![slip.image_url.clone()]);
    assert!(!app.images.contains(&slip.image_url));
}

#[tokio::test]
async fn test_second_sweep_deletes_nothing() {
    let app = TestApp::new();
    app.slips.insert_dated("2024-01-01");
    app.slips.insert_dated("2024-01-30");
    let today = ymd(2024, 2, 1);

    let first = app.state.sweeper().sweep(5, today).await.expect("sweep");
    let second = app.state.sweeper().sweep(5, today).await.expect("sweep");

    assert_eq!(first.deleted_count, 1);
    assert_eq!(second.deleted_count, 0);
    assert_eq!(app.slips.all().len(), 1);
}

#[tokio::test]
async fn test_sweep_boundary_and_unparseable_dates() {
    let app = TestApp::new();
    let before = app.slips.insert_dated("2024-01-26");
    let at = app.slips.insert_dated("2024-01-27");
    let after = app.slips.insert_dated("2024-01-28");
    let no_year = app.slips.insert_dated("01-01");

    app.state
        .sweeper()
        .sweep(5, ymd(2024, 2, 1))
        .await
        .expect("sweep");

    assert!(app.slips.get(before.id).is_none());
    assert!(app.slips.get(at.id).is_some());
    assert!(app.slips.get(after.id).is_some());
    assert!(app.slips.get(no_year.id).is_some());
}

#[tokio::test]
async fn test_image_failure_does_not_keep_record() {
    let app = TestApp::new();
    let slip = app.slips.insert_dated("2024-01-01");
    app.images.fail_delete(&slip.image_url);

    let report = app
        .state
        .sweeper()
        .sweep(5, ymd(2024, 2, 1))
        .await
        .expect("sweep");

    assert_eq!(report.deleted_count, 1);
    assert_eq!(report.image_failures, 1);
    assert!(app.slips.get(slip.id).is_none());
}

#[tokio::test]
async fn test_store_outage_aborts_sweep() {
    let app = TestApp::new();
    let slip = app.slips.insert_dated("2024-01-01");
    app.slips.fail(true);

    assert!(app.state.sweeper().sweep(5, ymd(2024, 2, 1)).await.is_err());

    app.slips.fail(false);
    assert!(app.slips.get(slip.id).is_some());
    assert!(app.images.delete_attempts().is_empty());
}

#[tokio::test]
async fn test_scheduler_runs_once_per_day() {
    let app = TestApp::new();
    let scheduler = app.state.scheduler();
    app.slips.insert_dated("2024-01-01");

    let first = scheduler.run_if_due(ymd(2024, 2, 1)).await.expect("tick");
    assert!(matches!(first, SchedulerOutcome::Swept(ref r) if r.deleted_count == 1));

    app.slips.insert_dated("2024-01-02");
    let second = scheduler.run_if_due(ymd(2024, 2, 1)).await.expect("tick");
    assert_eq!(second, SchedulerOutcome::AlreadyRan);
    assert_eq!(app.slips.all().len(), 1);

    let next_day = scheduler.run_if_due(ymd(2024, 2, 2)).await.expect("tick");
    assert!(matches!(next_day, SchedulerOutcome::Swept(ref r) if r.deleted_count == 1));
    assert!(app.slips.all().is_empty());
    assert_eq!(
        app.settings.value(LAST_RUN_KEY),
        Some(serde_json::Value::String("2024-02-02".to_string()))
    );
}
