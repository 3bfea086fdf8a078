use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::catalog::PropertyCatalog;
use crate::api::types::{FilterUpdate, SearchFilters};
use crate::error::ApiError;
use crate::models::{Listing, ListingPage};

/// User-facing message for any failed listing fetch
pub const LOAD_ERROR: &str = "Could not load listings";

/// Fallback select deadline when no debounced fetch is scheduled
const IDLE_SLEEP_SECS: u64 = 3600;

/// Point-in-time view of the search state, published to watchers
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
    pub filters: SearchFilters,
    /// Server-ordered results; fresh fetches replace, load-more appends
    pub results: Vec<Listing>,
    /// Total match count reported by the server
    pub count: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub has_next_page: bool,
}

enum Command {
    Update(FilterUpdate),
    LoadMore,
    FetchDone {
        generation: u64,
        fresh: bool,
        outcome: Result<ListingPage, ApiError>,
    },
}

/// Handle to a running search controller.
///
/// Filter changes are debounced and coalesced: rapid updates issue one
/// fetch carrying the latest snapshot. `load_more` fetches immediately and
/// appends. Dropping the handle shuts the controller down.
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<SearchSnapshot>,
    shutdown: CancellationToken,
}

impl SearchHandle {
    /// Change one filter field. Resets the page to 1 and schedules a
    /// debounced fresh fetch superseding any pending one.
    pub fn update_filter(&self, update: FilterUpdate) {
        let _ = self.commands.send(Command::Update(update));
    }

    /// Advance to the next page, appending its results. No-op when there
    /// is no next page or a fetch is already on the way.
    pub fn load_more(&self) {
        let _ = self.commands.send(Command::LoadMore);
    }

    /// Current state
    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Wait for the next state change and return it
    pub async fn changed(&mut self) -> SearchSnapshot {
        let _ = self.snapshot.changed().await;
        self.snapshot()
    }

    /// Stop the controller; in-flight responses are ignored after this
    pub fn stop(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Search/list data controller: owns the filter state and request
/// lifecycle, exposing an append-or-replace result list
pub struct SearchController;

impl SearchController {
    /// Spawn the controller worker. The initial fetch for the default
    /// filters is scheduled behind the same debounce window.
    pub fn spawn(catalog: PropertyCatalog, debounce: Duration) -> SearchHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let filters = SearchFilters::default();
        let (state_tx, state_rx) = watch::channel(SearchSnapshot {
            filters: filters.clone(),
            ..SearchSnapshot::default()
        });
        let shutdown = CancellationToken::new();

        let worker = Worker {
            catalog,
            commands: cmd_tx.clone(),
            state: state_tx,
            filters,
            debounce,
            generation: 0,
            in_flight: 0,
            results: Vec::new(),
            count: 0,
            error: None,
            has_next_page: false,
            deadline: Some(Instant::now() + debounce),
            shutdown: shutdown.clone(),
        };
        tokio::spawn(worker.run(cmd_rx));

        SearchHandle {
            commands: cmd_tx,
            snapshot: state_rx,
            shutdown,
        }
    }
}

struct Worker {
    catalog: PropertyCatalog,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Sender<SearchSnapshot>,
    filters: SearchFilters,
    debounce: Duration,
    /// Bumped on every filter change; fetches carry the generation they
    /// were started under, and stale completions are discarded
    generation: u64,
    in_flight: usize,
    results: Vec<Listing>,
    count: u64,
    error: Option<String>,
    has_next_page: bool,
    /// When the pending debounced fetch fires, if one is scheduled
    deadline: Option<Instant>,
    shutdown: CancellationToken,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        debug!("Search controller started");
        let shutdown = self.shutdown.clone();
        loop {
            let sleep_until = self
                .deadline
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(IDLE_SLEEP_SECS));

            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Search controller shutting down");
                    break;
                }
                cmd = commands.recv() => match cmd {
                    None => break,
                    Some(cmd) => self.handle(cmd),
                },
                _ = tokio::time::sleep_until(sleep_until), if self.deadline.is_some() => {
                    self.deadline = None;
                    self.start_fetch(true);
                }
            }
        }
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Update(update) => {
                self.filters.apply(update);
                self.generation += 1;
                // Restarting the quiet window supersedes any pending fetch
                self.deadline = Some(Instant::now() + self.debounce);
                self.publish();
            }
            Command::LoadMore => {
                if !self.has_next_page || self.in_flight > 0 || self.deadline.is_some() {
                    return;
                }
                self.filters.page += 1;
                self.start_fetch(false);
            }
            Command::FetchDone {
                generation,
                fresh,
                outcome,
            } => {
                self.in_flight -= 1;
                if generation != self.generation {
                    debug!(
                        "Discarding stale response (generation {}, current {})",
                        generation, self.generation
                    );
                    self.publish();
                    return;
                }
                match outcome {
                    Ok(page) => {
                        self.count = page.count;
                        self.has_next_page = page.next.is_some();
                        if fresh {
                            self.results = page.results;
                        } else {
                            self.results.extend(page.results);
                        }
                        self.error = None;
                    }
                    Err(e) => {
                        // Previous results stay untouched
                        warn!("Listing fetch failed: {}", e);
                        self.error = Some(LOAD_ERROR.to_string());
                    }
                }
                self.publish();
            }
        }
    }

    /// Kick off a fetch for the current filter snapshot. The worker stays
    /// responsive while it runs; completion comes back as a command.
    fn start_fetch(&mut self, fresh: bool) {
        self.in_flight += 1;
        self.error = None;
        self.publish();

        let catalog = self.catalog.clone();
        let filters = self.filters.clone();
        let generation = self.generation;
        let commands = self.commands.clone();
        tokio::spawn(async move {
            debug!("Fetching listings page {}", filters.page);
            let outcome = catalog.search(&filters).await;
            let _ = commands.send(Command::FetchDone {
                generation,
                fresh,
                outcome,
            });
        });
    }

    fn publish(&self) {
        self.state.send_replace(SearchSnapshot {
            filters: self.filters.clone(),
            results: self.results.clone(),
            count: self.count,
            loading: self.in_flight > 0,
            error: self.error.clone(),
            has_next_page: self.has_next_page,
        });
    }
}
