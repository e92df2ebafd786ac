use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mintbay_auth::hash_password;
use mintbay_core::Role;
use mintbay_core::user::NewUser;
use mintbay_core::validation::{validate_email, validate_password, validate_username};
use mintbay_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "mintbay", version, about = "Mintbay marketplace operations CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap an admin account
    CreateAdmin {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        /// Password (reads from MINTBAY_ADMIN_PASSWORD env var if not provided)
        #[arg(short, long, env = "MINTBAY_ADMIN_PASSWORD")]
        password: String,
    },

    /// Change a user's role
    SetRole {
        #[arg(short, long)]
        email: String,

        /// One of: user, moderator, admin
        #[arg(short, long)]
        role: String,
    },

    /// Print marketplace aggregates
    Stats,

    /// Export the transaction ledger to CSV
    ExportTransactions {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Delete expired sessions
    PurgeSessions,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mintbay=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = connect_db().await?;

    match cli.command {
        Commands::CreateAdmin {
            username,
            email,
            password,
        } => cmd_create_admin(&db, username, email, &password).await?,
        Commands::SetRole { email, role } => cmd_set_role(&db, &email, &role).await?,
        Commands::Stats => cmd_stats(&db).await?,
        Commands::ExportTransactions { output } => cmd_export_transactions(&db, &output).await?,
        Commands::PurgeSessions => {
            let purged = db.session_repo().purge_expired().await?;
            println!("Purged {purged} expired sessions");
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using DATABASE_URL and run migrations.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()
        .context("DATABASE_URL not set. Required for all mintbay commands.")?;
    let db = Database::connect(&config).await?;
    db.migrate().await?;
    Ok(db)
}

async fn cmd_create_admin(
    db: &Database,
    username: String,
    email: String,
    password: &str,
) -> Result<()> {
    validate_username(&username)?;
    validate_email(&email)?;
    validate_password(password)?;

    let users = db.user_repo();
    let user = users
        .create(&NewUser {
            username,
            email: email.to_lowercase(),
            password_hash: hash_password(password)?,
        })
        .await?;
    let admin = users
        .set_role(user.id, Role::Admin)
        .await?
        .context("account vanished while promoting it")?;

    println!("Created admin {} <{}> ({})", admin.username, admin.email, admin.id);
    Ok(())
}

async fn cmd_set_role(db: &Database, email: &str, role: &str) -> Result<()> {
    let role: Role = role.parse().map_err(anyhow::Error::msg)?;

    let users = db.user_repo();
    let Some(user) = users.find_by_email(&email.to_lowercase()).await? else {
        bail!("No account with email {email}");
    };

    let updated = users
        .set_role(user.id, role)
        .await?
        .context("account vanished while updating it")?;

    println!("{} is now {}", updated.username, updated.role);
    Ok(())
}

async fn cmd_stats(db: &Database) -> Result<()> {
    let stats = db.stats_repo().dashboard().await?;

    println!("Users:             {}", stats.total_users);
    println!("NFTs:              {}", stats.total_nfts);
    println!("Collections:       {}", stats.total_collections);
    println!("Active auctions:   {}", stats.active_auctions);
    println!("Transactions:      {}", stats.total_transactions);
    println!("Sale volume:       {}", stats.sale_volume);
    println!("New users (7d):    {}", stats.new_users_7d);
    println!("Sales (7d):        {}", stats.sales_7d);

    Ok(())
}

async fn cmd_export_transactions(db: &Database, output: &PathBuf) -> Result<()> {
    let transactions = db.transaction_repo().all().await?;
    let count = transactions.len();

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    writer.write_record(["id", "nft_id", "seller_id", "buyer_id", "amount", "kind", "created_at"])?;
    for tx in transactions {
        writer.write_record([
            tx.id.to_string(),
            tx.nft_id.to_string(),
            tx.seller_id.map(|id| id.to_string()).unwrap_or_default(),
            tx.buyer_id.to_string(),
            tx.amount.to_string(),
            tx.kind.to_string(),
            tx.created_at.to_rfc3339(),
        ])?;
    }
    writer.flush()?;

    println!("Exported {count} transactions to {}", output.display());
    Ok(())
}
