use super::context::AppContext;
use super::prompts;
use crate::output::Output;
use crate::WatchedCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{presets, Cell, CellAlignment, Color, Table};
use popcorn_core::{WatchedStore, WatchedSummary};
use popcorn_models::WatchedEntry;
use serde_json::json;
use std::fs::File;
use std::io::BufWriter;

pub async fn run_watched(cmd: WatchedCommands, ctx: &AppContext, output: &Output) -> Result<()> {
    let mut store = ctx.watched_store()?;

    match cmd {
        WatchedCommands::List => list(&store, output),
        WatchedCommands::Summary => {
            print_summary(&store.summary(), output);
            Ok(())
        }
        WatchedCommands::Remove { imdb_id } => remove(&mut store, &imdb_id, output),
        WatchedCommands::Export { file } => export(&store, file, output),
        WatchedCommands::Clear { yes } => clear(&mut store, yes, output),
    }
}

fn list(store: &WatchedStore, output: &Output) -> Result<()> {
    let summary = store.summary();
    if !output.is_human() {
        output.json(&json!({ "entries": store.entries(), "summary": summary }));
        return Ok(());
    }

    if store.is_empty() {
        output.info("Your watched list is empty. Add titles with 'popcorn rate <imdb-id> <rating>'.");
        return Ok(());
    }

    output.println(entries_table(store.entries()).to_string());
    print_summary(&summary, output);
    Ok(())
}

fn remove(store: &mut WatchedStore, imdb_id: &str, output: &Output) -> Result<()> {
    let title = store.get(imdb_id).map(|e| e.title.clone());
    let removed = store
        .remove(imdb_id)
        .map_err(|e| eyre!("Failed to save watched list: {}", e))?;

    match title {
        Some(title) if removed => output.success(format!("Removed \"{}\" from your watched list", title)),
        _ => output.warn(format!("{} is not on your watched list", imdb_id)),
    }
    Ok(())
}

fn export(store: &WatchedStore, file: Option<std::path::PathBuf>, output: &Output) -> Result<()> {
    match file {
        Some(path) => {
            let writer = File::create(&path).map_err(|e| eyre!("Failed to create {}: {}", path.display(), e))?;
            store
                .export_csv(BufWriter::new(writer))
                .map_err(|e| eyre!("Failed to export watched list: {}", e))?;
            output.success(format!("Exported {} titles to {}", store.len(), path.display()));
        }
        None => {
            store
                .export_csv(std::io::stdout().lock())
                .map_err(|e| eyre!("Failed to export watched list: {}", e))?;
        }
    }
    Ok(())
}

fn clear(store: &mut WatchedStore, yes: bool, output: &Output) -> Result<()> {
    if store.is_empty() {
        output.info("Your watched list is already empty");
        return Ok(());
    }

    if !yes {
        let prompt = format!("Remove all {} titles from your watched list?", store.len());
        if !prompts::prompt_yes_no(&prompt, Some(false))? {
            output.info("Cancelled");
            return Ok(());
        }
    }

    let removed = store.clear().map_err(|e| eyre!("Failed to save watched list: {}", e))?;
    output.success(format!("Removed {} titles", removed));
    Ok(())
}

pub(crate) fn entries_table(entries: &[WatchedEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("Title").fg(Color::Cyan),
        Cell::new("Year").fg(Color::Cyan),
        Cell::new("⭐️ IMDb").fg(Color::Cyan),
        Cell::new("🌟 Yours").fg(Color::Cyan),
        Cell::new("⏳ Runtime").fg(Color::Cyan),
        Cell::new("IMDb ID").fg(Color::Cyan),
    ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.title),
            Cell::new(&entry.year),
            Cell::new(entry.imdb_rating.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "N/A".to_string()))
                .set_alignment(CellAlignment::Right),
            Cell::new(entry.user_rating).set_alignment(CellAlignment::Right),
            Cell::new(entry.runtime.map(|r| format!("{} min", r)).unwrap_or_else(|| "N/A".to_string()))
                .set_alignment(CellAlignment::Right),
            Cell::new(&entry.imdb_id),
        ]);
    }
    table
}

/// "#️⃣ 3 movies  ⭐️ 7.93  🌟 8.67  ⏳ 132 min"
pub(crate) fn summary_line(summary: &WatchedSummary) -> String {
    format!(
        "#️⃣ {} movies  ⭐️ {:.2}  🌟 {:.2}  ⏳ {:.0} min",
        summary.count, summary.avg_imdb_rating, summary.avg_user_rating, summary.avg_runtime
    )
}

pub(crate) fn print_summary(summary: &WatchedSummary, output: &Output) {
    if output.is_human() {
        output.info(summary_line(summary));
    } else {
        output.json(&json!({ "summary": summary }));
    }
}
