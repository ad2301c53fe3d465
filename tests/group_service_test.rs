use std::sync::Arc;

use sqlx::SqlitePool;
use uuid::Uuid;

use spotter::{
    domain::{CreateClientRequest, CreateGroupRequest, UpdateGroupRequest},
    error::AppError,
    repository::{
        ClientGroupRepository, ClientRepository, SqliteClientGroupRepository,
        SqliteClientRepository,
    },
    service::GroupService,
};

struct Fixture {
    group_repo: Arc<SqliteClientGroupRepository>,
    client_repo: Arc<SqliteClientRepository>,
    service: GroupService,
}

async fn setup() -> anyhow::Result<Fixture> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let group_repo = Arc::new(SqliteClientGroupRepository::new(pool.clone()));
    let client_repo = Arc::new(SqliteClientRepository::new(pool.clone()));
    let service = GroupService::new(group_repo.clone(), client_repo.clone());

    Ok(Fixture {
        group_repo,
        client_repo,
        service,
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

#[tokio::test]
async fn group_edit_round_trip_reports_added_removed_kept() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 4).await?;
    let (a, b, c, d) = (clients[0], clients[1], clients[2], clients[3]);

    let created = fixture
        .service
        .create_group(CreateGroupRequest {
            name: "Regulars".to_string(),
            description: None,
            client_ids: vec![a, b, c],
        })
        .await?;

    let (updated, diff) = fixture
        .service
        .update_group(
            created.group.id,
            UpdateGroupRequest {
                name: "Regulars".to_string(),
                description: None,
                client_ids: vec![b, c, d],
            },
        )
        .await?;

    assert_eq!(diff.added, vec![d]);
    assert_eq!(diff.removed, vec![a]);
    let mut kept = diff.kept.clone();
    kept.sort();
    let mut expected_kept = vec![b, c];
    expected_kept.sort();
    assert_eq!(kept, expected_kept);

    let mut member_ids: Vec<Uuid> = updated.members.iter().map(|m| m.client_id).collect();
    member_ids.sort();
    let mut expected = vec![b, c, d];
    expected.sort();
    assert_eq!(member_ids, expected);

    Ok(())
}

#[tokio::test]
async fn unknown_member_ids_fail_and_create_nothing() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 1).await?;
    let ghost = Uuid::new_v4();

    let result = fixture
        .service
        .create_group(CreateGroupRequest {
            name: "Phantoms".to_string(),
            description: None,
            client_ids: vec![clients[0], ghost],
        })
        .await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.join("; ").contains(&ghost.to_string()));
        }
        other => panic!("Expected validation failure, got {:?}", other.is_ok()),
    }

    assert!(fixture.group_repo.find_by_name("Phantoms").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn renaming_to_another_groups_name_conflicts() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 2).await?;

    fixture
        .service
        .create_group(CreateGroupRequest {
            name: "Alpha".to_string(),
            description: None,
            client_ids: vec![clients[0]],
        })
        .await?;

    let beta = fixture
        .service
        .create_group(CreateGroupRequest {
            name: "Beta".to_string(),
            description: None,
            client_ids: vec![clients[1]],
        })
        .await?;

    // Taking Alpha's name conflicts
    let stolen = fixture
        .service
        .update_group(
            beta.group.id,
            UpdateGroupRequest {
                name: "Alpha".to_string(),
                description: None,
                client_ids: vec![clients[1]],
            },
        )
        .await;
    assert!(matches!(stolen, Err(AppError::Conflict(_))));

    // Keeping its own name succeeds
    let kept = fixture
        .service
        .update_group(
            beta.group.id,
            UpdateGroupRequest {
                name: "Beta".to_string(),
                description: Some("Evening crowd".to_string()),
                client_ids: vec![clients[1]],
            },
        )
        .await;
    assert!(kept.is_ok());

    Ok(())
}

#[tokio::test]
async fn duplicate_member_ids_are_deduplicated_before_persistence() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 2).await?;

    let created = fixture
        .service
        .create_group(CreateGroupRequest {
            name: "Doubles".to_string(),
            description: None,
            client_ids: vec![clients[0], clients[1], clients[0]],
        })
        .await?;

    assert_eq!(created.members.len(), 2);

    Ok(())
}

#[tokio::test]
async fn preview_reports_diff_without_mutating() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 3).await?;

    let created = fixture
        .service
        .create_group(CreateGroupRequest {
            name: "Preview".to_string(),
            description: None,
            client_ids: vec![clients[0], clients[1]],
        })
        .await?;

    let diff = fixture
        .service
        .preview_changes(created.group.id, vec![clients[1], clients[2]])
        .await?;

    assert_eq!(diff.added, vec![clients[2]]);
    assert_eq!(diff.removed, vec![clients[0]]);
    assert_eq!(diff.kept, vec![clients[1]]);

    // Membership is untouched
    let members = fixture.group_repo.members(created.group.id).await?;
    let mut member_ids: Vec<Uuid> = members.iter().map(|m| m.client_id).collect();
    member_ids.sort();
    let mut expected = vec![clients[0], clients[1]];
    expected.sort();
    assert_eq!(member_ids, expected);

    Ok(())
}

#[tokio::test]
async fn group_size_bounds_are_enforced() -> anyhow::Result<()> {
    let fixture = setup().await?;

    // Empty member list
    let empty = fixture
        .service
        .create_group(CreateGroupRequest {
            name: "Empty".to_string(),
            description: None,
            client_ids: vec![],
        })
        .await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    // Name too short for create
    let clients = make_clients(&fixture, 1).await?;
    let short = fixture
        .service
        .create_group(CreateGroupRequest {
            name: "ab".to_string(),
            description: None,
            client_ids: vec![clients[0]],
        })
        .await;
    assert!(matches!(short, Err(AppError::Validation(_))));

    Ok(())
}

#[tokio::test]
async fn delete_removes_group_and_memberships() -> anyhow::Result<()> {
    let fixture = setup().await?;
    let clients = make_clients(&fixture, 2).await?;

    let created = fixture
        .service
        .create_group(CreateGroupRequest {
            name: "Ephemeral".to_string(),
            description: None,
            client_ids: clients.clone(),
        })
        .await?;

    fixture.service.delete_group(created.group.id).await?;

    assert!(fixture
        .group_repo
        .find_by_id(created.group.id)
        .await?
        .is_none());
    assert!(fixture.group_repo.members(created.group.id).await?.is_empty());

    Ok(())
}
