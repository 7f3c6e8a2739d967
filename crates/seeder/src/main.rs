use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use storage::Database;
use storage::dto::ruleset::RulesetPayload;
use storage::repository::ruleset::RulesetRepository;
use storage::scoring::templates::{RULE_TEMPLATES, RuleTemplate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tonlog-seed")]
#[command(about = "tonlog database migration and ruleset seeding", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the embedded schema migrations.
    Migrate,
    /// Insert the built-in rule templates as global rulesets.
    SeedRulesets {
        /// Owner recorded on the seeded rulesets.
        #[arg(long, default_value = "system")]
        created_by: String,

        /// Validate and report without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the built-in rule templates.
    ListTemplates,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("seeder={log_level},storage={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Migrate => {
            let db = connect(&cli.database_url).await?;
            db.migrate().await.context("Migration failed")?;
            tracing::info!("Migrations applied");
        }
        Commands::SeedRulesets {
            created_by,
            dry_run,
        } => {
            let db = connect(&cli.database_url).await?;
            seed_rulesets(&db, &created_by, dry_run).await?;
        }
        Commands::ListTemplates => {
            for template in RULE_TEMPLATES {
                println!(
                    "{} [{}] {}持ち{}返し uma={:?} oka={} ({})",
                    template.name,
                    template.game_mode.as_str(),
                    template.starting_points,
                    template.base_points,
                    template.uma,
                    template.oka,
                    template.description,
                );
            }
        }
    }

    Ok(())
}

async fn connect(database_url: &str) -> anyhow::Result<Database> {
    Database::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Seeds each built-in template as a global ruleset, skipping names that
/// already exist so re-runs stay idempotent. Every payload passes through the
/// same validation as user-created rulesets before insertion.
async fn seed_rulesets(db: &Database, created_by: &str, dry_run: bool) -> anyhow::Result<()> {
    let repo = RulesetRepository::new(db.pool());
    let mut created = 0usize;
    let mut skipped = 0usize;

    for template in RULE_TEMPLATES {
        let payload = template_payload(template);

        if let Err(errors) = payload.validate_scoring_rules() {
            bail!(
                "Template '{}' failed validation: {}",
                template.name,
                errors.join("; ")
            );
        }

        if repo.exists_by_name(created_by, template.name).await? {
            tracing::info!(name = template.name, "Ruleset already seeded, skipping");
            skipped += 1;
            continue;
        }

        if dry_run {
            tracing::info!(name = template.name, "Would create global ruleset");
            created += 1;
            continue;
        }

        let ruleset = repo.create(&payload, created_by, true).await?;
        tracing::info!(
            name = %ruleset.rule_name,
            ruleset_id = %ruleset.ruleset_id,
            "Created global ruleset"
        );
        created += 1;
    }

    tracing::info!(created, skipped, dry_run, "Seeding finished");
    Ok(())
}

fn template_payload(template: &RuleTemplate) -> RulesetPayload {
    RulesetPayload {
        rule_name: template.name.to_string(),
        game_mode: template.game_mode,
        starting_points: template.starting_points,
        base_points: template.base_points,
        use_floating_uma: false,
        uma: template.uma.to_vec(),
        uma_matrix: None,
        oka: template.oka,
        use_chips: false,
        memo: Some(template.description.to_string()),
        is_global: true,
    }
}
