use super::context::AppContext;
use crate::output::Output;
use crate::ui::{self, Spinner};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{presets, Attribute, Cell, Color, Table};
use popcorn_core::DetailCoordinator;
use popcorn_models::{DetailState, MovieDetail};
use serde_json::json;
use std::sync::Arc;

pub async fn run_show(imdb_id: &str, ctx: &AppContext, output: &Output) -> Result<()> {
    let source = ctx.movie_source()?;
    let store = ctx.watched_store()?;
    let details = DetailCoordinator::new(source).with_selection_hook(Arc::new(ui::set_terminal_title));

    let detail = load_detail(&details, imdb_id, output).await?;

    let watched_rating = store.user_rating_for(&detail.imdb_id);
    if !output.is_human() {
        output.json(&json!({ "detail": detail, "watched_rating": watched_rating }));
        details.close();
        return Ok(());
    }

    output.println(detail_table(&detail).to_string());
    match watched_rating {
        Some(rating) => output.info(format!("You rated this movie {} ⭐", rating)),
        None => output.info(format!(
            "Not on your watched list. Rate it with 'popcorn rate {} <1-{}>'",
            detail.imdb_id, ctx.config.rating.max_rating
        )),
    }
    details.close();
    Ok(())
}

/// Open `imdb_id` and wait for it to load.
pub(crate) async fn load_detail(details: &DetailCoordinator, imdb_id: &str, output: &Output) -> Result<MovieDetail> {
    let spinner = Spinner::start(&format!("Loading {}...", imdb_id), output.is_human());
    let _handle = details.open(imdb_id);
    let state = details.settled().await;
    drop(spinner);

    match state {
        DetailState::Loaded(detail) => Ok(detail),
        DetailState::Failed { message, .. } => Err(eyre!("{}", message)),
        DetailState::Closed | DetailState::Loading { .. } => Err(eyre!("Details for {} were not loaded", imdb_id)),
    }
}

pub(crate) fn detail_table(detail: &MovieDetail) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new(&detail.title).fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(&detail.imdb_id),
    ]);

    let rows = [
        ("Released", &detail.released),
        ("Runtime", &detail.runtime),
        ("Genre", &detail.genre),
        ("IMDb rating", &detail.imdb_rating),
        ("Director", &detail.director),
        ("Starring", &detail.actors),
        ("Plot", &detail.plot),
    ];
    for (label, value) in rows {
        if value.is_empty() {
            continue;
        }
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    if let Some(poster) = &detail.poster {
        table.add_row(vec![Cell::new("Poster"), Cell::new(poster)]);
    }
    table
}
