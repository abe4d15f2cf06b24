use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use velox_api::store::{ApiKeyCreate, OrganizationCreate, QueryBuilder};
use velox_api::{
    AppConfig, ClientIp, DatabaseConfig, OrgSlug, create_connection, ensure_schema,
    generate_api_key,
};

#[derive(Parser)]
#[command(name = "velox-api")]
#[command(about = "Multi-tenant API service with tenant-scoped request authorization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long, env = "API_PORT")]
        port: Option<u16>,
        #[arg(long, default_value = "memory", env = "SURREALDB_URL")]
        db_url: String,
        /// Number of trusted proxies in front of the service
        #[arg(long, env = "TRUSTED_PROXY_HOPS")]
        trusted_hops: Option<usize>,
        /// Authorization time budget per request, in milliseconds
        #[arg(long, env = "AUTH_TIMEOUT_MS")]
        auth_timeout_ms: Option<u64>,
        /// Look credentials up verbatim instead of by SHA-256 digest
        /// (only for stores still holding plaintext keys)
        #[arg(long, default_value_t = false)]
        plain_keys: bool,
    },
    /// Initialize the database
    Init {
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
    /// Create a new organization
    CreateOrg {
        /// Display name of the organization
        name: String,
        /// Unique, human-friendly slug
        slug: String,
        /// Origin to allow (repeatable); no origins means deny all
        #[arg(long = "allow-ip")]
        allow_ips: Vec<String>,
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
    /// Append an origin to an organization's allowlist
    AllowIp {
        /// Slug of the organization
        slug: String,
        /// Origin to allow
        ip: String,
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
    /// Create a new API key for an organization
    CreateApiKey {
        /// Slug of the organization the key is issued for
        slug: String,
        /// Human-readable name for this key
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
    /// List all API keys
    ListApiKeys {
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("velox_api=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            db_url,
            trusted_hops,
            auth_timeout_ms,
            plain_keys,
        } => {
            let mut config = AppConfig::default();
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(hops) = trusted_hops {
                config.trusted_hops = hops;
            }
            if let Some(budget) = auth_timeout_ms {
                config.auth_timeout_ms = budget;
            }
            config.plain_keys = plain_keys;

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for API server: {}", db_config.url);
            info!(
                "Starting {} (env={}, trusted_hops={})",
                velox_api::SERVICE_NAME,
                config.env,
                config.trusted_hops
            );

            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;

            let app = velox_api::create_app(&config, db);
            velox_api::server::serve(app, config.port).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::CreateOrg {
            name,
            slug,
            allow_ips,
            db_url,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;

            if QueryBuilder::find_organization_by_slug(&db, &OrgSlug::new(slug.clone()))
                .await?
                .is_some()
            {
                bail!("an organization with slug '{}' already exists", slug);
            }

            let org_create = OrganizationCreate {
                org_id: format!("org_{}", Uuid::new_v4().simple()),
                name,
                slug: slug.clone(),
                allowed_ips: allow_ips,
            };
            let org = QueryBuilder::create_organization(&db, &org_create).await?;

            println!("Organization created successfully!");
            println!();
            println!("  ID:      {}", org.org_id);
            println!("  Name:    {}", org.name);
            println!("  Slug:    {}", org.slug);
            if org.allowed_ips.is_empty() {
                println!("  Allowed: (none - all requests will be denied)");
            } else {
                println!("  Allowed: {}", org.allowed_ips.join(", "));
            }
        }
        Commands::AllowIp { slug, ip, db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;

            if QueryBuilder::add_allowed_ip(&db, &OrgSlug::new(slug.clone()), &ClientIp::new(ip.clone()))
                .await?
            {
                println!("Origin '{}' is allowed for organization '{}'.", ip, slug);
            } else {
                println!("No organization found with slug '{}'.", slug);
            }
        }
        Commands::CreateApiKey { slug, name, db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;

            let Some(org) =
                QueryBuilder::find_organization_by_slug(&db, &OrgSlug::new(slug.clone())).await?
            else {
                bail!("no organization found with slug '{}'", slug);
            };

            // Generate a new API key
            let (full_key, prefix, key_hash) = generate_api_key();

            let api_key_create = ApiKeyCreate {
                organization_id: org.org_id.clone(),
                key_hash,
                key_prefix: prefix.clone(),
                name: name.clone(),
            };
            QueryBuilder::create_api_key(&db, &api_key_create).await?;

            println!("API Key created successfully!");
            println!();
            println!("  Key:          {}", full_key);
            println!("  Prefix:       {}", prefix);
            println!("  Organization: {} ({})", org.slug, org.org_id);
            if let Some(n) = &name {
                println!("  Name:         {}", n);
            }
            println!();
            println!("IMPORTANT: Save this key now. It cannot be retrieved later.");
            println!("Use with: -H 'x-api-key: {}'", full_key);
        }
        Commands::ListApiKeys { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;

            let api_keys = QueryBuilder::list_api_keys(&db).await?;

            if api_keys.is_empty() {
                println!("No API keys found.");
                return Ok(());
            }

            println!(
                "{:<20} {:<20} {:<40} {:<25}",
                "PREFIX", "NAME", "ORGANIZATION", "CREATED"
            );
            println!("{}", "-".repeat(105));

            for key in api_keys {
                let name = key.name.unwrap_or_else(|| "-".to_string());
                let created = key
                    .created_at
                    .map(|dt| dt.to_string())
                    .unwrap_or_else(|| "-".to_string());

                println!(
                    "{:<20} {:<20} {:<40} {:<25}",
                    key.key_prefix, name, key.organization_id, created
                );
            }
        }
    }

    Ok(())
}
