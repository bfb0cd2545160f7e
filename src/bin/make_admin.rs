use clap::Parser;
use dotenvy::dotenv;
use gallery_backend::entities::{prelude::Users, users};
use gallery_backend::infrastructure::database;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Grant the admin flag to an existing user. Bootstrap tool for the first
/// administrator: run once after the user has signed up.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Email of the user to promote
    email: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "make_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = database::setup_database().await?;

    let Some(user) = Users::find()
        .filter(users::Column::Email.eq(&args.email))
        .one(&db)
        .await?
    else {
        error!("❌ User with email {} not found", args.email);
        std::process::exit(1);
    };

    if user.is_admin {
        info!("User {} ({}) is already an admin.", user.name, user.email);
        return Ok(());
    }

    let name = user.name.clone();
    let mut active: users::ActiveModel = user.into();
    active.is_admin = Set(true);
    active.update(&db).await?;

    info!("✅ User {} ({}) is now an admin!", name, args.email);
    Ok(())
}
