use chrono::{Datelike, Duration, NaiveTime, Utc};
use clap::Parser;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use spotter::{
    domain::{
        Admin, CreateClientRequest, CreateGroupRequest, CreateRecurringClassRequest, Payment,
        PaymentStatus,
    },
    repository::{
        AdminRepository, ClientRepository, PaymentRepository, SqliteAdminRepository,
        SqliteClassSessionRepository, SqliteClientGroupRepository, SqliteClientRepository,
        SqlitePaymentRepository,
    },
    service::{ClassService, GroupService},
};

/// Populate a development database with sample gym data.
#[derive(Parser)]
#[command(name = "seed")]
struct Args {
    /// Database to seed; falls back to DATABASE_URL, then sqlite:spotter.db
    #[arg(long)]
    database_url: Option<String>,

    /// Number of fake clients to create
    #[arg(long, default_value_t = 25)]
    clients: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:spotter.db".to_string());

    println!("🌱 Seeding {}...", database_url);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let client_repo = std::sync::Arc::new(SqliteClientRepository::new(db_pool.clone()));
    let admin_repo = std::sync::Arc::new(SqliteAdminRepository::new(db_pool.clone()));
    let class_repo = std::sync::Arc::new(SqliteClassSessionRepository::new(db_pool.clone()));
    let group_repo = std::sync::Arc::new(SqliteClientGroupRepository::new(db_pool.clone()));
    let payment_repo = SqlitePaymentRepository::new(db_pool.clone());

    // Admins
    println!("🧑‍💼 Creating admins...");
    let owner = admin_repo
        .create(Admin {
            id: Uuid::new_v4(),
            external_id: Some("usr_seed_owner".to_string()),
            name: "Studio Owner".to_string(),
            email: "owner@spotter.local".to_string(),
            phone: None,
            is_active: true,
            super_admin: true,
            created_at: Utc::now(),
        })
        .await?;

    let coach = admin_repo
        .create(Admin {
            id: Uuid::new_v4(),
            external_id: Some("usr_seed_coach".to_string()),
            name: "Head Coach".to_string(),
            email: "coach@spotter.local".to_string(),
            phone: None,
            is_active: true,
            super_admin: false,
            created_at: Utc::now(),
        })
        .await?;

    println!("  ✅ Created {} and {}", owner.name, coach.name);

    // Clients
    println!("👥 Creating {} clients...", args.clients);
    let mut client_ids = Vec::new();
    for i in 0..args.clients {
        let name: String = Name().fake();
        let phone: String = PhoneNumber().fake();
        let username = format!(
            "{}{}",
            name.to_lowercase().replace(|c: char| !c.is_ascii_alphanumeric(), ""),
            i
        );

        let client = client_repo
            .create(CreateClientRequest {
                name,
                username,
                password: "password123".to_string(),
                phone: Some(phone),
            })
            .await?;
        client_ids.push(client.id);
    }

    // Classes: a recurring morning schedule over the next four weeks
    println!("🗓️  Creating classes...");
    let class_service = ClassService::new(class_repo, client_repo.clone(), admin_repo.clone());
    let today = Utc::now().date_naive();

    let sessions = class_service
        .create_recurring(CreateRecurringClassRequest {
            title: "Morning Strength".to_string(),
            description: Some("Full-body barbell work".to_string()),
            location: Some("Main floor".to_string()),
            capacity: 12,
            instructor_id: coach.id,
            days: vec!["Mon".to_string(), "Wed".to_string(), "Fri".to_string()],
            start_date: today,
            end_date: today + Duration::days(27),
            start_time: NaiveTime::from_hms_opt(7, 0, 0).expect("constant time of day"),
            end_time: NaiveTime::from_hms_opt(8, 0, 0).expect("constant time of day"),
            is_cancelled: false,
        })
        .await?;
    println!(
        "  ✅ Created {} sessions starting {} ({})",
        sessions.len(),
        today,
        today.weekday()
    );

    // A group from the first few clients
    println!("🤝 Creating a client group...");
    let group_service = GroupService::new(group_repo, client_repo.clone());
    let regulars: Vec<Uuid> = client_ids.iter().take(8).copied().collect();
    group_service
        .create_group(CreateGroupRequest {
            name: "Morning Regulars".to_string(),
            description: Some("Weekday early-bird crowd".to_string()),
            client_ids: regulars,
        })
        .await?;

    // Payments: one recent payment for most clients
    println!("💳 Creating payments...");
    let mut rng = rand::thread_rng();
    let mut payment_count = 0;
    for (i, client_id) in client_ids.iter().enumerate() {
        if i % 5 == 4 {
            continue; // leave some clients unpaid
        }
        let paid_at = Utc::now() - Duration::days(rng.gen_range(0..25));
        payment_repo
            .create(
                Payment {
                    id: Uuid::new_v4(),
                    client_id: *client_id,
                    amount_cents: rng.gen_range(40..120) * 100,
                    status: if i % 7 == 0 {
                        PaymentStatus::Pending
                    } else {
                        PaymentStatus::Paid
                    },
                    payment_date: paid_at,
                    valid_until: paid_at + Duration::days(30),
                    notes: None,
                    created_by_id: owner.id,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
                false,
            )
            .await?;
        payment_count += 1;
    }
    println!("  ✅ Created {} payments", payment_count);

    println!("🎉 Done.");

    Ok(())
}
