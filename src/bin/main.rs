use anyhow::Result;
use clap::{Parser, Subcommand};
use contact_service::{create_app, issue_token, AuthConfig, DatabaseConfig};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contact-service")]
#[command(about = "Contact management HTTP API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address, e.g. 0.0.0.0:8000
        #[arg(long, default_value = "0.0.0.0:8000")]
        bind: String,
        #[arg(long, default_value = "memory")]
        db_url: String,
        /// Shared secret for bearer-token verification
        #[arg(long, env = "CONTACTS_AUTH_SECRET")]
        auth_secret: Option<String>,
        /// Expected token issuer (validated when set)
        #[arg(long, env = "CONTACTS_AUTH_ISSUER")]
        issuer: Option<String>,
        /// Allow anonymous access (single-user local mode)
        #[arg(long, default_value_t = false)]
        allow_anonymous: bool,
    },
    /// Initialize the database
    Init {
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
    /// Mint a bearer token for a subject
    CreateToken {
        /// Token subject (the external user id)
        subject: String,
        #[arg(long)]
        email: Option<String>,
        /// Display name recorded for the user
        #[arg(long)]
        name: Option<String>,
        /// Number of hours until the token expires
        #[arg(long, default_value_t = 24)]
        expires_hours: i64,
        #[arg(long, env = "CONTACTS_AUTH_SECRET")]
        auth_secret: String,
        #[arg(long, env = "CONTACTS_AUTH_ISSUER")]
        issuer: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("contact_service=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            db_url,
            auth_secret,
            issuer,
            allow_anonymous,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url: {}", db_config.url);

            let auth_config = build_auth_config(allow_anonymous, auth_secret, issuer);
            let app = create_app(db_config, auth_config).await?;

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("Contact service listening on http://{}", bind);

            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = contact_service::create_connection(db_config).await?;
            contact_service::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::CreateToken {
            subject,
            email,
            name,
            expires_hours,
            auth_secret,
            issuer,
        } => {
            let ttl = chrono::Duration::hours(expires_hours);
            let expires_at = chrono::Utc::now() + ttl;

            let token = issue_token(
                &auth_secret,
                &subject,
                email.as_deref(),
                name.as_deref(),
                issuer.as_deref(),
                ttl,
            )?;

            println!("Bearer token issued successfully!");
            println!();
            println!("  Subject: {}", subject);
            if let Some(n) = &name {
                println!("  Name:    {}", n);
            }
            println!("  Expires: {}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!();
            println!("Use with: -H 'Authorization: Bearer {}'", token);
        }
    }

    Ok(())
}

/// Build authentication configuration from CLI arguments.
fn build_auth_config(
    allow_anonymous: bool,
    auth_secret: Option<String>,
    issuer: Option<String>,
) -> AuthConfig {
    let config = AuthConfig {
        allow_anonymous,
        secret: auth_secret,
        issuer,
    };

    if config.secret.is_some() {
        info!("Bearer-token authentication enabled");
    } else if config.allow_anonymous {
        info!("Anonymous mode enabled (single-user local deployment)");
    } else {
        tracing::warn!(
            "No authentication method configured and anonymous access disabled - all requests will be rejected"
        );
    }

    config
}
