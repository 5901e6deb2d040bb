//! Activity-record flows over in-memory fakes: round-trips, filtering,
//! paging and the weekly report.

mod common;

use std::sync::Arc;

use common::{date, test_env, NoWeather, TestEnv};

use jogtrack::domain::{ActivityPatch, Location, NewActivity, User};
use jogtrack::errors::AppError;
use jogtrack::services::{ActivityManager, ActivityService, AuthService, Registration};
use jogtrack::types::PageParams;

async fn register(env: &TestEnv, username: &str) -> User {
    env.auth
        .register(Registration {
            username: username.to_string(),
            password: "testing123G".to_string(),
            email: None,
            name: None,
        })
        .await
        .unwrap()
}

fn activity(date: chrono::NaiveDate, distance: i32, duration: i32) -> NewActivity {
    NewActivity {
        date,
        distance,
        duration,
        location: Location::parse("32.0853 34.7818").unwrap(),
    }
}

/// The reference dataset used by the filter and paging tests: dates,
/// distances and durations chosen so each filter has a known answer.
async fn load_dataset(env: &TestEnv, actor: &User) {
    let rows = [
        (date(2015, 6, 20), 2000, 405),
        (date(2016, 2, 1), 1800, 500),
        (date(2017, 5, 12), 2500, 600),
        (date(2017, 11, 3), 2000, 390),
        (date(2019, 7, 15), 3000, 700),
        (date(2019, 8, 2), 2200, 450),
    ];
    for (d, distance, duration) in rows {
        env.activity_service
            .create(actor, activity(d, distance, duration))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn created_record_round_trips() {
    let env = test_env();
    let actor = register(&env, "runner").await;

    let id = env
        .activity_service
        .create(&actor, activity(date(2015, 6, 20), 2000, 405))
        .await
        .unwrap();

    let fetched = env.activity_service.get(&actor, id).await.unwrap();
    assert_eq!(fetched.date, date(2015, 6, 20));
    assert_eq!(fetched.distance, 2000);
    assert_eq!(fetched.duration, 405);
    assert_eq!(fetched.location.to_string(), "32.0853 34.7818");
    assert_eq!((fetched.iso_year, fetched.iso_week), (2015, 25));
    assert!(fetched.condition.as_value().get("summary").is_some());
}

#[tokio::test]
async fn update_changes_only_patched_fields() {
    let env = test_env();
    let actor = register(&env, "runner").await;

    let id = env
        .activity_service
        .create(&actor, activity(date(2015, 6, 20), 2000, 405))
        .await
        .unwrap();

    env.activity_service
        .update(
            &actor,
            id,
            ActivityPatch {
                distance: Some(2100),
                ..ActivityPatch::default()
            },
        )
        .await
        .unwrap();

    let fetched = env.activity_service.get(&actor, id).await.unwrap();
    assert_eq!(fetched.distance, 2100);
    assert_eq!(fetched.duration, 405);
    assert_eq!(fetched.date, date(2015, 6, 20));
    assert_eq!(fetched.location.to_string(), "32.0853 34.7818");
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let env = test_env();
    let actor = register(&env, "runner").await;

    let bad_distance = env
        .activity_service
        .create(&actor, activity(date(2015, 6, 20), 0, 405))
        .await;
    assert!(matches!(bad_distance, Err(AppError::Validation(_))));

    let bad_duration = env
        .activity_service
        .create(&actor, activity(date(2015, 6, 20), 2000, -10))
        .await;
    assert!(matches!(bad_duration, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn failed_weather_lookup_rejects_the_write() {
    let env = test_env();
    let actor = register(&env, "runner").await;

    let service = ActivityManager::new(env.activities.clone(), Arc::new(NoWeather));
    let result = service
        .create(&actor, activity(date(1971, 6, 20), 2000, 405))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn records_are_private_to_their_owner() {
    let env = test_env();
    let owner = register(&env, "owner").await;
    let intruder = register(&env, "intruder").await;

    let id = env
        .activity_service
        .create(&owner, activity(date(2015, 6, 20), 2000, 405))
        .await
        .unwrap();

    assert!(matches!(
        env.activity_service.get(&intruder, id).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        env.activity_service.delete(&intruder, id).await,
        Err(AppError::Forbidden)
    ));
}

#[tokio::test]
async fn double_delete_reports_not_found() {
    let env = test_env();
    let actor = register(&env, "runner").await;

    let id = env
        .activity_service
        .create(&actor, activity(date(2015, 6, 20), 2000, 405))
        .await
        .unwrap();

    env.activity_service.delete(&actor, id).await.unwrap();
    let second = env.activity_service.delete(&actor, id).await;

    assert!(matches!(second, Err(AppError::NotFound)));
}

#[tokio::test]
async fn filters_narrow_listings() {
    let env = test_env();
    let actor = register(&env, "runner").await;
    load_dataset(&env, &actor).await;

    let list = |filter: &'static str| {
        let env = &env;
        let actor = &actor;
        async move {
            env.activity_service
                .list(actor, Some(filter), &PageParams::default())
                .await
                .unwrap()
        }
    };

    // Exact date match
    let exact = list("date eq '2019-07-15'").await;
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].distance, 3000);

    // ne excludes exact matches only
    assert_eq!(list("distance ne 2000").await.len(), 4);

    // gt is inclusive: the 390-second run is included
    assert_eq!(list("time gt 390").await.len(), 6);
    assert_eq!(list("time gt 391").await.len(), 5);

    // Conjunction with grouping
    let combined = list("(date lt '2018-01-01') AND (time lt 500)").await;
    assert_eq!(combined.len(), 3);

    // Conjunction that excludes everything
    assert_eq!(
        list("distance ne 2000 and ((time lt 400) and (time gt 390))")
            .await
            .len(),
        0
    );
}

#[tokio::test]
async fn malformed_filters_are_rejected() {
    let env = test_env();
    let actor = register(&env, "runner").await;
    load_dataset(&env, &actor).await;

    for bad in [
        ";drop table users;",
        "(time lt 500",
        "speed gt 10",
        "time like 500",
    ] {
        let result = env
            .activity_service
            .list(&actor, Some(bad), &PageParams::default())
            .await;
        assert!(
            matches!(result, Err(AppError::Validation(_))),
            "filter {:?} was not rejected",
            bad
        );
    }
}

#[tokio::test]
async fn listing_pages_with_raw_offset_semantics() {
    let env = test_env();
    let actor = register(&env, "runner").await;
    load_dataset(&env, &actor).await;

    let page = |page: u64, count: u64| {
        let env = &env;
        let actor = &actor;
        async move {
            env.activity_service
                .list(actor, None, &PageParams { page, count })
                .await
                .unwrap()
        }
    };

    let first_two = page(0, 2).await;
    let offset_one = page(1, 1).await;
    let first_three = page(0, 3).await;

    assert_eq!(first_two.len(), 2);
    assert_eq!(offset_one.len(), 1);
    assert_eq!(first_three.len(), 3);

    // Ordered by date ascending
    assert!(first_two[0].date <= first_two[1].date);

    // page is a raw offset: page=1,count=1 is the second row
    assert_eq!(offset_one[0].id, first_two[1].id);

    // The narrower pages never skip or duplicate rows of the wider one
    for record in first_two.iter().chain(offset_one.iter()) {
        assert!(first_three.iter().any(|r| r.id == record.id));
    }
}

#[tokio::test]
async fn invalid_paging_is_rejected() {
    let env = test_env();
    let actor = register(&env, "runner").await;

    let result = env
        .activity_service
        .list(&actor, None, &PageParams { page: 1, count: 0 })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn weekly_report_groups_by_iso_week() {
    let env = test_env();
    let actor = register(&env, "runner").await;

    // Three runs in ISO week 25 of 2015, one in week 27
    for (d, distance, duration) in [
        (date(2015, 6, 15), 2000, 405),
        (date(2015, 6, 17), 1000, 300),
        (date(2015, 6, 20), 3000, 660),
        (date(2015, 7, 1), 1500, 350),
    ] {
        env.activity_service
            .create(&actor, activity(d, distance, duration))
            .await
            .unwrap();
    }

    let report = env
        .activity_service
        .weekly_report(&actor, &PageParams::default())
        .await
        .unwrap();

    assert_eq!(report.len(), 1);
    let weeks = &report[&2015];
    assert_eq!(weeks.len(), 2);

    let week25 = &weeks[0][&25];
    assert_eq!(week25.total_distance, 6000);

    // Mean of per-record ratios, not total duration over total distance
    let expected = (405.0 / 2000.0 + 300.0 / 1000.0 + 660.0 / 3000.0) / 3.0;
    assert!((week25.avg_pace - expected).abs() < 1e-12);
    assert!((week25.avg_pace - 1365.0 / 6000.0).abs() > 1e-3);

    let week27 = &weeks[1][&27];
    assert_eq!(week27.total_distance, 1500);
}

#[tokio::test]
async fn weekly_report_pages_over_week_groups() {
    let env = test_env();
    let actor = register(&env, "runner").await;

    for (d, distance, duration) in [
        (date(2015, 6, 1), 1000, 300),
        (date(2015, 6, 8), 1100, 310),
        (date(2015, 6, 15), 1200, 320),
    ] {
        env.activity_service
            .create(&actor, activity(d, distance, duration))
            .await
            .unwrap();
    }

    let report = env
        .activity_service
        .weekly_report(&actor, &PageParams { page: 1, count: 1 })
        .await
        .unwrap();

    // Raw offset 1 lands on the second week group
    assert_eq!(report.len(), 1);
    let weeks = &report[&2015];
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0][&24].total_distance, 1100);
}
