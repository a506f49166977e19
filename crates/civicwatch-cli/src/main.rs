use anyhow::Context;
use civicwatch_auth::UserRole;
use civicwatch_cli::{create_user, issue_token, parse_role};
use civicwatch_config::{DatabaseConfig, JwtConfig};
use civicwatch_db::{PgUserStore, init_db_pool, run_migrations};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "civicwatch-cli")]
#[command(about = "CivicWatch CLI - Administrative tools for CivicWatch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user account with the given role
    CreateUser {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Role: user, agent or admin
        #[arg(short = 'r', long, default_value = "user", value_parser = parse_role)]
        role: UserRole,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Print an access token for an existing user id
    IssueToken {
        /// User id to put in the token subject
        #[arg(short = 's', long)]
        subject: String,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateUser {
            email,
            role,
            password,
        } => handle_create_user(email, role, password).await,
        Commands::IssueToken { subject } => handle_issue_token(&subject),
        Commands::Migrate => handle_migrate().await,
    }
}

async fn connect() -> anyhow::Result<PgUserStore> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_db_pool(&config)
        .await
        .context("Failed to connect to database")?;
    Ok(PgUserStore::new(pool))
}

async fn handle_create_user(
    email: Option<String>,
    role: UserRole,
    password: Option<String>,
) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    let store = connect().await?;
    let user = create_user(&store, &email, &password, role).await?;

    println!("\n✅ User created successfully!");
    println!("   Id: {}", user.id);
    println!("   Email: {}", user.email);
    println!("   Role: {}", user.role);
    Ok(())
}

fn handle_issue_token(subject: &str) -> anyhow::Result<()> {
    let config = JwtConfig::from_env()?;
    let issued = issue_token(&config, subject)?;

    println!("{}", issued.token);
    eprintln!("   Expires in {} seconds", issued.expires_in);
    Ok(())
}

async fn handle_migrate() -> anyhow::Result<()> {
    let store = connect().await?;
    run_migrations(store.pool()).await?;

    println!("✅ Migrations applied");
    Ok(())
}
