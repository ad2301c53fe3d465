use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use spotter::{
    domain::{
        Admin, CreateClassRequest, CreateClientRequest, CreateRecurringClassRequest,
        UpdateClassRequest,
    },
    error::AppError,
    repository::{
        AdminRepository, ClassSessionRepository, ClientRepository, SqliteAdminRepository,
        SqliteClassSessionRepository, SqliteClientRepository,
    },
    service::ClassService,
};

struct Fixture {
    class_repo: Arc<SqliteClassSessionRepository>,
    client_repo: Arc<SqliteClientRepository>,
    admin_repo: Arc<SqliteAdminRepository>,
    service: ClassService,
    admin: Admin,
}

async fn setup() -> anyhow::Result<Fixture> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let class_repo = Arc::new(SqliteClassSessionRepository::new(pool.clone()));
    let client_repo = Arc::new(SqliteClientRepository::new(pool.clone()));
    let admin_repo = Arc::new(SqliteAdminRepository::new(pool.clone()));

    let admin = admin_repo
        .create(Admin {
            id: Uuid::new_v4(),
            external_id: Some("usr_test_admin".to_string()),
            name: "Test Admin".to_string(),
            email: "admin@test.local".to_string(),
            phone: None,
            is_active: true,
            super_admin: true,
            created_at: Utc::now(),
        })
        .await?;

    let service = ClassService::new(
        class_repo.clone(),
        client_repo.clone(),
        admin_repo.clone(),
    );

    Ok(Fixture {
        class_repo,
        client_repo,
        admin_repo,
        service,
        admin,
    })
}

async fn make_clients(fixture: &Fixture, n: usize) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::new();
    for i in 0..n {
        let client = fixture
            .client_repo
            .create(CreateClientRequest {
                name: format!("Client {}", i),
                username: format!("client{}", i),
                password: "password123".to_string(),
                phone: None,
            })
            .await?;
        ids.push(client.id);
    }
    Ok(ids)
}

fn class_request(instructor_id: Uuid, capacity: i32) -> CreateClassRequest {
    CreateClassRequest {
        title: "Yoga".to_string(),
        description: None,
        location: Some("Studio B".to_string()),
        capacity,
        date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        instructor_id,
        is_cancelled: false,
    }
}

#[tokio::test]
async fn roster_replace_matches_deduplicated_request() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 3).await?;
    let class = fixture
        .service
        .create_class(class_request(fixture.admin.id, 10))
        .await?;

    // Duplicates in the request collapse to one attendance row each
    let desired = vec![clients[0], clients[1], clients[0], clients[1]];
    let (updated, change) = fixture
        .service
        .update_class(
            class.id,
            UpdateClassRequest {
                attendee_ids: Some(desired),
                ..Default::default()
            },
            fixture.admin.id,
        )
        .await?;

    let mut roster_ids: Vec<Uuid> = updated.attendees.iter().map(|a| a.client_id).collect();
    roster_ids.sort();
    let mut expected = vec![clients[0], clients[1]];
    expected.sort();
    assert_eq!(roster_ids, expected);

    let change = change.unwrap();
    assert_eq!(change.added_count, 2);
    assert_eq!(change.removed_count, 0);
    assert_eq!(change.kept_count, 0);

    Ok(())
}

#[tokio::test]
async fn over_capacity_roster_fails_and_leaves_prior_roster_intact() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 6).await?;
    let class = fixture
        .service
        .create_class(class_request(fixture.admin.id, 5))
        .await?;

    // Seed an initial roster of two
    fixture
        .service
        .update_class(
            class.id,
            UpdateClassRequest {
                attendee_ids: Some(clients[..2].to_vec()),
                ..Default::default()
            },
            fixture.admin.id,
        )
        .await?;

    // Six distinct attendees against capacity five
    let result = fixture
        .service
        .update_class(
            class.id,
            UpdateClassRequest {
                attendee_ids: Some(clients.clone()),
                ..Default::default()
            },
            fixture.admin.id,
        )
        .await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("capacity")));
        }
        other => panic!("Expected validation failure, got {:?}", other.is_ok()),
    }

    // Prior roster unchanged
    let roster = fixture.class_repo.roster(class.id).await?;
    let mut roster_ids: Vec<Uuid> = roster.iter().map(|a| a.client_id).collect();
    roster_ids.sort();
    let mut expected = clients[..2].to_vec();
    expected.sort();
    assert_eq!(roster_ids, expected);

    Ok(())
}

#[tokio::test]
async fn unknown_attendee_ids_are_all_named() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 1).await?;
    let class = fixture
        .service
        .create_class(class_request(fixture.admin.id, 10))
        .await?;

    let ghost_a = Uuid::new_v4();
    let ghost_b = Uuid::new_v4();
    let result = fixture
        .service
        .update_class(
            class.id,
            UpdateClassRequest {
                attendee_ids: Some(vec![clients[0], ghost_a, ghost_b]),
                ..Default::default()
            },
            fixture.admin.id,
        )
        .await;

    match result {
        Err(AppError::Validation(errors)) => {
            let joined = errors.join("; ");
            assert!(joined.contains(&ghost_a.to_string()));
            assert!(joined.contains(&ghost_b.to_string()));
        }
        other => panic!("Expected validation failure, got {:?}", other.is_ok()),
    }

    assert!(fixture.class_repo.roster(class.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn kept_attendees_retain_original_check_in_attribution() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 3).await?;
    let class = fixture
        .service
        .create_class(class_request(fixture.admin.id, 10))
        .await?;

    let first_admin = fixture.admin.id;
    fixture
        .service
        .update_class(
            class.id,
            UpdateClassRequest {
                attendee_ids: Some(vec![clients[0], clients[1]]),
                ..Default::default()
            },
            first_admin,
        )
        .await?;

    // A different admin swaps one attendee
    let second_admin = fixture
        .admin_repo
        .create(Admin {
            id: Uuid::new_v4(),
            external_id: Some("usr_test_admin_2".to_string()),
            name: "Second Admin".to_string(),
            email: "second@test.local".to_string(),
            phone: None,
            is_active: true,
            super_admin: false,
            created_at: Utc::now(),
        })
        .await?;

    let (updated, change) = fixture
        .service
        .update_class(
            class.id,
            UpdateClassRequest {
                attendee_ids: Some(vec![clients[1], clients[2]]),
                ..Default::default()
            },
            second_admin.id,
        )
        .await?;

    let change = change.unwrap();
    assert_eq!(change.added_count, 1);
    assert_eq!(change.removed_count, 1);
    assert_eq!(change.kept_count, 1);

    // The kept row for clients[1] is the original attendance row; the
    // added row is attributed to the admin who performed the edit
    let kept = updated
        .attendees
        .iter()
        .find(|a| a.client_id == clients[1])
        .unwrap();
    assert_eq!(kept.checked_in_by_id, first_admin);

    let added = updated
        .attendees
        .iter()
        .find(|a| a.client_id == clients[2])
        .unwrap();
    assert_eq!(added.checked_in_by_id, second_admin.id);

    Ok(())
}

#[tokio::test]
async fn recurring_expansion_creates_one_session_per_matching_date() -> anyhow::Result<()> {
    let fixture = setup().await?;

    // Mon/Wed between 2024-01-01 (Monday) and 2024-01-10 (Wednesday)
    let sessions = fixture
        .service
        .create_recurring(CreateRecurringClassRequest {
            title: "Yoga".to_string(),
            description: None,
            location: None,
            capacity: 15,
            instructor_id: fixture.admin.id,
            days: vec!["Mon".to_string(), "Wed".to_string()],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            is_cancelled: false,
        })
        .await?;

    let dates: Vec<NaiveDate> = sessions.iter().map(|s| s.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn recurring_inverted_range_creates_nothing() -> anyhow::Result<()> {
    let fixture = setup().await?;

    let sessions = fixture
        .service
        .create_recurring(CreateRecurringClassRequest {
            title: "Yoga".to_string(),
            description: None,
            location: None,
            capacity: 15,
            instructor_id: fixture.admin.id,
            days: vec!["Mon".to_string()],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            is_cancelled: false,
        })
        .await?;

    assert!(sessions.is_empty());

    Ok(())
}

#[tokio::test]
async fn check_in_rejects_duplicates_and_full_classes() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 2).await?;
    let class = fixture
        .service
        .create_class(class_request(fixture.admin.id, 1))
        .await?;

    fixture
        .service
        .check_in(class.id, clients[0], fixture.admin.id)
        .await?;

    // Same client twice
    let duplicate = fixture
        .service
        .check_in(class.id, clients[0], fixture.admin.id)
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Capacity one, second client
    let full = fixture
        .service
        .check_in(class.id, clients[1], fixture.admin.id)
        .await;
    assert!(matches!(full, Err(AppError::BadRequest(_))));

    Ok(())
}
