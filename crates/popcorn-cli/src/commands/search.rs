use super::context::AppContext;
use crate::output::Output;
use crate::ui::Spinner;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{presets, Cell, Color, Table};
use popcorn_core::SearchCoordinator;
use popcorn_models::{SearchOutcome, SearchResult};
use serde_json::json;

pub async fn run_search(query: &str, ctx: &AppContext, output: &Output) -> Result<()> {
    let source = ctx.movie_source()?;
    let coordinator = SearchCoordinator::with_min_query_length(source, ctx.config.search.min_query_length);

    let spinner = coordinator
        .search(query)
        .map(|_| Spinner::start(&format!("Searching for \"{}\"...", query.trim()), output.is_human()));
    let outcome = coordinator.settled().await;
    drop(spinner);

    // A failed lookup is reported through the error exit in human mode
    if !(output.is_human() && outcome.error().is_some()) {
        render_outcome(&outcome, query, coordinator.min_query_length(), output);
    }
    outcome_status(&outcome)
}

/// Failed lookups become an error so the command exits non-zero.
fn outcome_status(outcome: &SearchOutcome) -> Result<()> {
    match outcome.error() {
        Some(message) => Err(eyre!("{}", message)),
        None => Ok(()),
    }
}

/// Print a settled search outcome.
pub(crate) fn render_outcome(outcome: &SearchOutcome, query: &str, min_query_length: usize, output: &Output) {
    if !output.is_human() {
        output.json(&json!({ "query": query.trim(), "outcome": outcome }));
        return;
    }

    match outcome {
        SearchOutcome::Empty => {
            output.warn(format!(
                "Type at least {} characters to search",
                min_query_length
            ));
        }
        SearchOutcome::Loading => output.info("Loading..."),
        SearchOutcome::Success(results) => {
            output.println(results_table(results).to_string());
            output.info(format!("Found {} results", results.len()));
        }
        SearchOutcome::Failure(message) => output.error(message),
    }
}

pub(crate) fn results_table(results: &[SearchResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("Title").fg(Color::Cyan),
        Cell::new("Year").fg(Color::Cyan),
        Cell::new("IMDb ID").fg(Color::Cyan),
    ]);

    for (index, result) in results.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&result.title),
            Cell::new(&result.year),
            Cell::new(&result.imdb_id),
        ]);
    }
    table
}
