use anyhow::{Context, Result, anyhow};
use casbin::{CoreApi, DefaultModel};
use casbin_table_adapter::core::{line_from_row, load_policy_line, parse_policy_line};
use casbin_table_adapter::{AdapterError, EnvConfig, PgRuleStore, PolicyHost, TableAdapter, connect};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "policy-tool")]
#[command(about = "Operator tooling for Casbin policies stored in a database table")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the rule table if it does not exist
    Init,
    /// Print every stored rule
    Dump {
        #[arg(long)]
        json: bool,
    },
    /// Replace stored rules with the contents of a policy CSV file
    Import {
        file: PathBuf,
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Delete rules matching values laid over the columns from --index on
    Remove {
        #[arg(long, default_value = "p")]
        ptype: String,
        #[arg(long, default_value_t = 0)]
        index: usize,
        values: Vec<String>,
    },
    /// Evaluate a (subject, object, action) request against stored policy
    Check {
        #[arg(long)]
        model: Option<PathBuf>,
        subject: String,
        object: String,
        action: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EnvConfig::from_env().context("failed to read configuration")?;
    let pool = connect(&config.database)
        .await
        .context("failed to connect to the policy database")?;
    let adapter = TableAdapter::new(PgRuleStore::new(pool), config.adapter.clone())
        .await
        .context("failed to prepare the rule table")?;

    match cli.command {
        Command::Init => {
            println!("Rule table '{}' is ready", adapter.table_name());
            Ok(())
        }
        Command::Dump { json } => dump(&adapter, json).await,
        Command::Import { file, model } => {
            let model_path = resolve_model(model, &config)?;
            import(&adapter, &model_path, &file).await
        }
        Command::Remove {
            ptype,
            index,
            values,
        } => {
            if values.is_empty() {
                return Err(anyhow!("at least one value is required"));
            }
            let removed = adapter.delete_filtered(&ptype, index, &values).await?;
            println!("Removed {removed} rule(s)");
            Ok(())
        }
        Command::Check {
            model,
            subject,
            object,
            action,
        } => {
            let model_path = resolve_model(model, &config)?;
            let host = PolicyHost::with_adapter(&model_path, adapter).await;
            let enforcer = host.enforcer()?;
            let allowed = enforcer
                .read()
                .await
                .enforce((subject.as_str(), object.as_str(), action.as_str()))
                .map_err(AdapterError::from)
                .context("enforcement failed")?;
            println!("{}", if allowed { "allow" } else { "deny" });
            Ok(())
        }
    }
}

fn resolve_model(flag: Option<PathBuf>, config: &EnvConfig) -> Result<PathBuf> {
    flag.or_else(|| config.model_path.clone())
        .ok_or_else(|| anyhow!("a model file is required (--model or CASBIN_MODEL_PATH)"))
}

async fn dump(adapter: &TableAdapter<PgRuleStore>, json: bool) -> Result<()> {
    let rows = adapter.load_rules().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("{}", line_from_row(row));
        }
    }
    Ok(())
}

async fn import(adapter: &TableAdapter<PgRuleStore>, model_path: &Path, file: &Path) -> Result<()> {
    let mut model = DefaultModel::from_file(model_path)
        .await
        .map_err(AdapterError::from)
        .with_context(|| format!("Failed to read model '{}'", model_path.display()))?;
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read policy file '{}'", file.display()))?;

    let mut skipped = 0usize;
    for line in content.lines() {
        if parse_policy_line(line).is_some() && !load_policy_line(line, &mut model) {
            skipped += 1;
        }
    }

    let saved = adapter.save_model(&model).await?;
    println!("Imported {saved} rule(s) into '{}'", adapter.table_name());
    if skipped > 0 {
        println!("Skipped {skipped} line(s) not defined by the model or already present");
    }
    Ok(())
}
