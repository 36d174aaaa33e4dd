use super::context::AppContext;
use super::search::render_outcome;
use super::show::detail_table;
use super::watched::{entries_table, print_summary};
use crate::output::Output;
use crate::ui;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::{AddOutcome, DetailCoordinator, KeyBindings, RatingSession, SearchCoordinator, Subscription, WatchedStore};
use popcorn_models::{DetailState, SearchOutcome};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;

const HELP: &str = "\
Type a title to search. Commands:
  :open N|ID   show result N (or an IMDb id); again to close it
  :esc         close the open title
  :enter       clear the search
  :hover N     preview a rating
  :rate N      rate the open title
  :add         add the open title to your watched list
  :watched     show your watched list
  :remove ID   remove a title from your watched list
  :help        show this help
  :quit        leave";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Query(String),
    Open(String),
    Key(&'static str),
    Hover(u8),
    Rate(u8),
    Add,
    Watched,
    Remove(String),
    Help,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Input::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    let number = |arg: Option<&str>| arg.and_then(|a| a.parse::<u8>().ok());

    match (name, arg) {
        ("open" | "o", Some(target)) => Input::Open(target.to_string()),
        ("esc" | "escape", None) => Input::Key("Escape"),
        ("enter", None) => Input::Key("Enter"),
        ("hover", _) => number(arg).map(Input::Hover).unwrap_or_else(|| Input::Invalid(line.to_string())),
        ("rate" | "r", _) => number(arg).map(Input::Rate).unwrap_or_else(|| Input::Invalid(line.to_string())),
        ("add" | "a", None) => Input::Add,
        ("watched" | "w", None) => Input::Watched,
        ("remove", Some(id)) => Input::Remove(id.to_string()),
        ("help" | "h" | "?", None) => Input::Help,
        ("quit" | "q" | "exit", None) => Input::Quit,
        _ => Input::Invalid(line.to_string()),
    }
}

fn lock(store: &Mutex<WatchedStore>) -> MutexGuard<'_, WatchedStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Line-based session over the search and detail coordinators.
struct Session {
    output: Output,
    max_rating: u8,
    search: Arc<SearchCoordinator>,
    details: Arc<DetailCoordinator>,
    keys: KeyBindings,
    store: Arc<Mutex<WatchedStore>>,
    rating: Option<RatingSession>,
    // Held only while a title is open
    escape: Option<Subscription>,
    _enter: Subscription,
}

impl Session {
    /// Returns false when the user asked to leave.
    fn handle(&mut self, input: Input) -> Result<bool> {
        match input {
            Input::Query(query) => {
                if query.trim().is_empty() {
                    self.search.reset();
                } else {
                    let _ = self.search.search(&query);
                }
            }
            Input::Open(target) => self.open(&target),
            Input::Key(code) => {
                if self.keys.dispatch(code) == 0 {
                    self.output.info(format!("Nothing to do for {}", code));
                }
            }
            Input::Hover(position) => {
                let output = self.output;
                if let Some(session) = self.rating_session() {
                    match session.hover(position) {
                        Ok(()) => output.println(session.input().to_string()),
                        Err(e) => output.warn(e.to_string()),
                    }
                    session.clear_hover();
                }
            }
            Input::Rate(position) => {
                let output = self.output;
                if let Some(session) = self.rating_session() {
                    match session.rate(position) {
                        Ok(_) => output.println(session.input().to_string()),
                        Err(e) => output.warn(e.to_string()),
                    }
                }
            }
            Input::Add => self.add()?,
            Input::Watched => {
                let store = lock(&self.store);
                if !self.output.is_human() {
                    self.output.json(&json!({ "entries": store.entries(), "summary": store.summary() }));
                } else if store.is_empty() {
                    self.output.info("Your watched list is empty");
                } else {
                    self.output.println(entries_table(store.entries()).to_string());
                    print_summary(&store.summary(), &self.output);
                }
            }
            Input::Remove(imdb_id) => {
                let removed = lock(&self.store)
                    .remove(&imdb_id)
                    .map_err(|e| eyre!("Failed to save watched list: {}", e))?;
                if removed {
                    self.output.success(format!("Removed {}", imdb_id));
                    self.rating = None;
                } else {
                    self.output.warn(format!("{} is not on your watched list", imdb_id));
                }
            }
            Input::Help => self.output.println(HELP),
            Input::Quit => return Ok(false),
            Input::Invalid(line) => self.output.warn(format!("Unknown command: {} (type :help)", line.trim())),
        }

        self.sync_bindings();
        Ok(true)
    }

    /// `:open 2` picks the second result; anything else is taken as an id.
    fn open(&mut self, target: &str) {
        let imdb_id = match target.parse::<usize>() {
            Ok(index) => {
                let outcome = self.search.outcome();
                match index.checked_sub(1).and_then(|i| outcome.results().get(i)) {
                    Some(result) => result.imdb_id.clone(),
                    None => {
                        self.output.warn(format!("No result number {}", index));
                        return;
                    }
                }
            }
            Err(_) => target.to_string(),
        };
        let _ = self.details.toggle(&imdb_id);
    }

    fn add(&mut self) -> Result<()> {
        let output = self.output;
        let Some(session) = self.rating_session() else {
            return Ok(());
        };
        if let Some(previous) = session.watched_rating() {
            output.info(format!("You rated this movie {} ⭐", previous));
            return Ok(());
        }
        let Some(entry) = session.to_entry() else {
            output.warn("Rate the title first with :rate N");
            return Ok(());
        };

        let title = entry.title.clone();
        let added = lock(&self.store)
            .add(entry)
            .map_err(|e| eyre!("Failed to save watched list: {}", e))?;
        match added {
            AddOutcome::Added => output.success(format!("Added \"{}\" to your watched list", title)),
            AddOutcome::Replaced => output.success(format!("Updated \"{}\"", title)),
        }

        self.rating = None;
        self.details.close();
        Ok(())
    }

    /// Rating state for the loaded title, created on first use.
    fn rating_session(&mut self) -> Option<&mut RatingSession> {
        let DetailState::Loaded(detail) = self.details.state() else {
            self.output.warn("Open a title first with :open N");
            return None;
        };

        let stale = self
            .rating
            .as_ref()
            .map_or(true, |session| session.detail().imdb_id != detail.imdb_id);
        if stale {
            let store = lock(&self.store);
            self.rating = Some(RatingSession::new(detail, self.max_rating, &store));
        }
        self.rating.as_mut()
    }

    /// Escape is bound only while something is selected.
    fn sync_bindings(&mut self) {
        let selected = self.details.selected_id();
        if selected.is_some() && self.escape.is_none() {
            let details = Arc::clone(&self.details);
            self.escape = Some(self.keys.subscribe("Escape", move || details.close()));
        } else if selected.is_none() {
            // Dropping the subscription unbinds the key
            self.escape = None;
        }

        if let Some(session) = &self.rating {
            if selected.as_deref() != Some(session.detail().imdb_id.as_str()) {
                self.rating = None;
            }
        }
    }
}

fn watch_search(mut rx: watch::Receiver<SearchOutcome>, min_query_length: usize, output: Output) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let outcome = rx.borrow_and_update().clone();
            match outcome {
                SearchOutcome::Empty => {}
                SearchOutcome::Loading => output.println("Loading..."),
                other => render_outcome(&other, "", min_query_length, &output),
            }
        }
    })
}

fn watch_details(
    mut rx: watch::Receiver<DetailState>,
    store: Arc<Mutex<WatchedStore>>,
    output: Output,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match state {
                DetailState::Closed => output.println("Closed"),
                DetailState::Loading { imdb_id } => output.println(format!("Loading {}...", imdb_id)),
                DetailState::Failed { message, .. } => output.error(message),
                DetailState::Loaded(detail) => {
                    let watched_rating = lock(&store).user_rating_for(&detail.imdb_id);
                    if !output.is_human() {
                        output.json(&json!({ "detail": detail, "watched_rating": watched_rating }));
                        continue;
                    }
                    output.println(detail_table(&detail).to_string());
                    match watched_rating {
                        Some(rating) => output.info(format!("You rated this movie {} ⭐", rating)),
                        None => output.info("Rate it with :rate N, then :add"),
                    }
                }
            }
        }
    })
}

pub async fn run_interactive(ctx: &AppContext, output: Output) -> Result<()> {
    let source = ctx.movie_source()?;
    let store = Arc::new(Mutex::new(ctx.watched_store()?));
    let min_query_length = ctx.config.search.min_query_length;

    let search = Arc::new(SearchCoordinator::with_min_query_length(Arc::clone(&source), min_query_length));
    let details = Arc::new(DetailCoordinator::new(source).with_selection_hook(Arc::new(ui::set_terminal_title)));

    let keys = KeyBindings::new();
    let enter = {
        let search = Arc::clone(&search);
        keys.subscribe("Enter", move || search.reset())
    };

    let watchers = [
        watch_search(search.subscribe(), min_query_length, output),
        watch_details(details.subscribe(), Arc::clone(&store), output),
    ];

    let mut session = Session {
        output,
        max_rating: ctx.config.rating.max_rating,
        search,
        details,
        keys,
        store,
        rating: None,
        escape: None,
        _enter: enter,
    };

    output.println(HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if output.is_human() {
            print!("> ");
            let _ = std::io::stdout().flush();
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !session.handle(parse_input(&line))? {
            break;
        }
    }

    for watcher in watchers {
        watcher.abort();
    }
    session.details.close();
    Ok(())
}
