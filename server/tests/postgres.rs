//! Runs against a real PostgreSQL when `TEST_DATABASE_URL` is set, e.g.
//! `TEST_DATABASE_URL=postgres://postgres@localhost/vsf_test cargo test`.
//! Without it every test returns early.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::postgres::PgConnectOptions;

use vsf_server::models::{new_id, Location, NewEvent, NewParticipation, NewUser, UserType};
use vsf_server::store::{PgStore, Store, StoreError};

async fn connect() -> Option<PgStore> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set; skipping PostgreSQL test");
            return None;
        }
    };

    let options: PgConnectOptions = url.parse().expect("valid TEST_DATABASE_URL");
    let store = PgStore::connect(options, 20, Duration::from_secs(10))
        .await
        .expect("connect to test database");
    store.migrate().await.expect("migrations");
    Some(store)
}

async fn user(store: &PgStore, user_type: UserType) -> String {
    let id = new_id("user");
    store
        .create_user(NewUser {
            id: id.clone(),
            email: format!("{}@test.example", id),
            password_hash: "hash".to_string(),
            user_type,
            full_name: None,
            nik: None,
            organization_name: Some("Test Org".to_string()),
            npwp: None,
        })
        .await
        .expect("create user");
    id
}

async fn event(store: &PgStore, organizer_id: &str, target: i32) -> String {
    let id = new_id("event");
    store
        .create_event(NewEvent {
            id: id.clone(),
            title: "Donor darah".to_string(),
            description: "Blood drive".to_string(),
            image_url: None,
            organizer_id: organizer_id.to_string(),
            organizer_name: None,
            event_start_time: None,
            event_end_time: None,
            target_volunteer_count: target,
            participation_fee_idr: Decimal::ZERO,
            category: "health".to_string(),
            location: Location {
                city: Some("Bandung".to_string()),
                ..Location::default()
            },
        })
        .await
        .expect("create event");
    id
}

fn signup(user_id: &str, event_id: &str) -> NewParticipation {
    NewParticipation {
        id: new_id("part"),
        user_id: user_id.to_string(),
        event_id: event_id.to_string(),
        donation_amount: Decimal::new(10_000, 0),
    }
}

#[tokio::test]
async fn test_pg_duplicate_email() {
    let Some(store) = connect().await else { return };
    let id = user(&store, UserType::Volunteer).await;

    let err = store
        .create_user(NewUser {
            id: new_id("user"),
            email: format!("{}@test.example", id),
            password_hash: "other".to_string(),
            user_type: UserType::Volunteer,
            full_name: None,
            nik: None,
            organization_name: None,
            npwp: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::EmailTaken));
}

#[tokio::test]
async fn test_pg_registration_rules() {
    let Some(store) = connect().await else { return };
    let org = user(&store, UserType::Organization).await;
    let event_id = event(&store, &org, 1).await;
    let first = user(&store, UserType::Volunteer).await;
    let second = user(&store, UserType::Volunteer).await;

    store
        .register_participation(signup(&first, &event_id))
        .await
        .expect("first registration");

    let err = store
        .register_participation(signup(&first, &event_id))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyRegistered));

    let err = store
        .register_participation(signup(&second, &event_id))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::EventFull));

    let row = store.find_active_event(&event_id).await.unwrap().unwrap();
    assert_eq!(row.current_volunteer_count, 1);
    assert_eq!(row.registered_volunteer_ids, vec![first.clone()]);

    let rows = store.list_participations_for_user(&first).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].donation_amount, Decimal::new(10_000, 0));
}

#[tokio::test]
async fn test_pg_concurrent_registrations_respect_capacity() {
    const CAPACITY: i32 = 3;
    const ATTEMPTS: usize = 12;

    let Some(store) = connect().await else { return };
    let store = Arc::new(store);
    let org = user(&store, UserType::Organization).await;
    let event_id = event(&store, &org, CAPACITY).await;

    let mut volunteers = Vec::with_capacity(ATTEMPTS);
    for _ in 0..ATTEMPTS {
        volunteers.push(user(&store, UserType::Volunteer).await);
    }

    let handles: Vec<_> = volunteers
        .iter()
        .map(|volunteer| {
            let store = Arc::clone(&store);
            let participation = signup(volunteer, &event_id);
            tokio::spawn(async move { store.register_participation(participation).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(StoreError::EventFull) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(accepted, CAPACITY as usize);

    let row = store.find_active_event(&event_id).await.unwrap().unwrap();
    assert_eq!(row.current_volunteer_count, CAPACITY);
    assert_eq!(row.registered_volunteer_ids.len(), CAPACITY as usize);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participations WHERE event_id = $1")
        .bind(&event_id)
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(stored, CAPACITY as i64);
}

#[tokio::test]
async fn test_pg_article_views_increment_once_per_fetch() {
    let Some(store) = connect().await else { return };
    let id = new_id("article");
    sqlx::query("INSERT INTO articles (id, title, category) VALUES ($1, $2, $3)")
        .bind(&id)
        .bind("Menjadi relawan 100% siap")
        .bind("tips")
        .execute(store.pool())
        .await
        .unwrap();

    assert_eq!(store.view_article(&id).await.unwrap().unwrap().views, 1);
    assert_eq!(store.view_article(&id).await.unwrap().unwrap().views, 2);

    let found = store.search_articles("100% siap").await.unwrap();
    assert!(found.iter().any(|a| a.id == id));
}
