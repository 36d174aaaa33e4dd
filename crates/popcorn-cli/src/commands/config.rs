use super::context::AppContext;
use super::prompts;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{presets, Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_config::{config::is_usable_api_key, Config, API_KEY_ENV};
use serde_json::json;

pub async fn run_config(cmd: ConfigCommands, ctx: AppContext, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(&ctx, full, output),
        ConfigCommands::Init { force } => init_config(&ctx, force, output),
        ConfigCommands::ApiKey { key } => set_api_key(ctx, key, output),
    }
}

fn show_config(ctx: &AppContext, full: bool, output: &Output) -> Result<()> {
    let config_file = ctx.paths.config_file();
    let api_key = ctx.api_key();
    let api_key_display = match &api_key {
        Some(key) if full => key.clone(),
        Some(key) => mask_string(key),
        None => "<not set>".to_string(),
    };
    let watched_file = ctx
        .config
        .storage
        .watched_file
        .clone()
        .unwrap_or_else(|| ctx.paths.watched_file());

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file,
            "config_file_exists": config_file.exists(),
            "credentials_file": ctx.paths.credentials_file(),
            "watched_file": watched_file,
            "api_key": api_key_display,
            "omdb": {
                "base_url": ctx.config.omdb.base_url,
                "timeout_seconds": ctx.config.omdb.timeout_seconds,
            },
            "search": ctx.config.search,
            "rating": ctx.config.rating,
            "logging": ctx.config.logging,
        }));
        return Ok(());
    }

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Using defaults. Run 'popcorn config init' to write them to disk.");
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("Setting").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new("Value").fg(Color::Cyan).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display())]);
    table.add_row(vec![Cell::new("Credentials file"), Cell::new(ctx.paths.credentials_file().display())]);
    table.add_row(vec![Cell::new("Watched list"), Cell::new(watched_file.display())]);
    table.add_row(vec![
        Cell::new("OMDb API key"),
        Cell::new(if api_key.is_some() {
            api_key_display.green().to_string()
        } else {
            api_key_display.red().to_string()
        }),
    ]);
    table.add_row(vec![Cell::new("OMDb base URL"), Cell::new(&ctx.config.omdb.base_url)]);
    table.add_row(vec![Cell::new("Request timeout"), Cell::new(format!("{}s", ctx.config.omdb.timeout_seconds))]);
    table.add_row(vec![Cell::new("Minimum query length"), Cell::new(ctx.config.search.min_query_length)]);
    table.add_row(vec![Cell::new("Rating scale"), Cell::new(format!("1-{}", ctx.config.rating.max_rating))]);
    table.add_row(vec![Cell::new("Log level"), Cell::new(&ctx.config.logging.level)]);
    if let Some(file) = &ctx.config.logging.file {
        table.add_row(vec![Cell::new("Log file"), Cell::new(file.display())]);
    }
    output.println(table.to_string());
    Ok(())
}

fn init_config(ctx: &AppContext, force: bool, output: &Output) -> Result<()> {
    let config_file = ctx.paths.config_file();
    if config_file.exists() && !force {
        output.warn(format!("Configuration file already exists at: {}", config_file.display()));
        output.info("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    ctx.paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create {}: {}", ctx.paths.config_dir().display(), e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

fn set_api_key(mut ctx: AppContext, key: Option<String>, output: &Output) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => {
            output.info("Get a free key at https://www.omdbapi.com/apikey.aspx");
            prompts::prompt_password("OMDb API key")?
        }
    };
    let key = key.trim().to_string();
    if !is_usable_api_key(&key) {
        return Err(eyre!("API key cannot be empty"));
    }

    ctx.credentials.set_omdb_api_key(key);
    ctx.credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials to {}: {}", ctx.credentials.path().display(), e))?;

    output.success(format!("API key saved to {}", ctx.credentials.path().display()));
    if std::env::var(API_KEY_ENV).is_ok() {
        output.warn(format!("{} is set and takes precedence over the stored key", API_KEY_ENV));
    }
    Ok(())
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
