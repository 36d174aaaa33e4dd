use super::context::AppContext;
use super::show::load_detail;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::{AddOutcome, DetailCoordinator, RatingSession};
use serde_json::json;

pub async fn run_rate(imdb_id: &str, rating: u8, update: bool, ctx: &AppContext, output: &Output) -> Result<()> {
    let source = ctx.movie_source()?;
    let mut store = ctx.watched_store()?;

    let details = DetailCoordinator::new(source);
    let detail = load_detail(&details, imdb_id, output).await?;

    let mut session = RatingSession::new(detail, ctx.config.rating.max_rating, &store);
    if let (Some(previous), false) = (session.watched_rating(), update) {
        output.info(format!(
            "\"{}\" is already on your watched list, rated {} ⭐. Use --update to change it.",
            session.detail().title,
            previous
        ));
        return Ok(());
    }

    session.rate(rating).map_err(|e| eyre!("{}", e))?;
    let entry = session
        .to_entry()
        .ok_or_else(|| eyre!("No rating was recorded for {}", imdb_id))?;

    let title = entry.title.clone();
    let added = store.add(entry).map_err(|e| eyre!("Failed to save watched list: {}", e))?;

    if !output.is_human() {
        output.json(&json!({
            "imdb_id": imdb_id,
            "title": title,
            "rating": rating,
            "replaced": added == AddOutcome::Replaced,
        }));
        return Ok(());
    }

    let stars = session.input();
    match added {
        AddOutcome::Added => output.success(format!("Added \"{}\" to your watched list: {}", title, stars)),
        AddOutcome::Replaced => output.success(format!("Updated \"{}\": {}", title, stars)),
    }
    Ok(())
}
