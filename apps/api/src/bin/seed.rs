//! Creates the default admin and demo patient accounts. Safe to run repeatedly.
use std::sync::Arc;

use chrono::NaiveDate;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_cell::services::password::hash_password;
use auth_cell::{AccountStore, NewAccount};
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::user::{Gender, Role};

struct SeedUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    phone: &'static str,
    role: Role,
    date_of_birth: Option<NaiveDate>,
    gender: Option<Gender>,
    address: Option<&'static str>,
}

fn seed_users() -> Vec<SeedUser> {
    vec![
        SeedUser {
            name: "Admin User",
            email: "admin@healthcare.com",
            password: "Admin@123",
            phone: "+1234567890",
            role: Role::Admin,
            date_of_birth: None,
            gender: None,
            address: None,
        },
        SeedUser {
            name: "John Doe",
            email: "patient@healthcare.com",
            password: "Patient",
            phone: "+1234567894",
            role: Role::Patient,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 15),
            gender: Some(Gender::Male),
            address: Some("123 Main Street, New York, NY 10001"),
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    if !config.is_configured() {
        anyhow::bail!("SUPABASE_URL, SUPABASE_SERVICE_KEY and JWT_SECRET must be set");
    }

    let accounts = AccountStore::new(Arc::new(SupabaseClient::new(&config)));

    for user in seed_users() {
        if accounts.email_exists(user.email).await? {
            warn!("User {} already exists, skipping", user.email);
            continue;
        }

        let password_hash = hash_password(user.password)?;
        let created = accounts
            .insert(NewAccount {
                name: user.name.to_string(),
                email: user.email.to_string(),
                password_hash,
                phone: Some(user.phone.to_string()),
                role: user.role,
                specialization: None,
                department: None,
                experience: None,
                date_of_birth: user.date_of_birth,
                gender: user.gender,
                address: user.address.map(str::to_string),
                is_active: true,
                is_approved: true,
            })
            .await?;

        info!("Created {} {} ({})", created.role, created.name, created.email);
    }

    info!("Seeding completed");
    Ok(())
}
