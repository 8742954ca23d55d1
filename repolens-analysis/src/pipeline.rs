//! Analyze and query orchestration
//!
//! Analysis of one locator is single-flight: concurrent requests for the same
//! locator wait on a per-locator lock, and whichever arrives second finds the
//! cached result instead of fetching again.

use repolens_core::{
    CacheEntry, LruProfileCache, ProfileCache, RepositoryAnalyzer, RepositoryProfile,
    SourceFetcher,
};
use repolens_llm::{analysis_prompt, question_prompt, CompletionService, GeminiClient};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{required, AnalyzeRequest, AnalyzeResponse, QueryRequest, QueryResponse};
use crate::{
    RepoLensConfig, Result, ServiceError, COMPLETION_UNAVAILABLE, COMPLETION_UNPARSABLE,
    MISSING_QUERY_FIELDS, MISSING_REPO_URL, SUMMARY_UNAVAILABLE, SUMMARY_UNPARSABLE,
};

/// Per-locator lock plus the number of callers currently holding a slot for it
#[derive(Default)]
struct Flight {
    lock: Arc<tokio::sync::Mutex<()>>,
    holders: usize,
}

type FlightMap = Mutex<HashMap<String, Flight>>;

/// A caller's claim on a locator's flight; the map entry goes away with the last claim
struct FlightSlot<'a> {
    in_flight: &'a FlightMap,
    locator: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl FlightSlot<'_> {
    async fn acquire(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for FlightSlot<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(flight) = in_flight.get_mut(&self.locator) {
            flight.holders = flight.holders.saturating_sub(1);
            if flight.holders == 0 {
                in_flight.remove(&self.locator);
            }
        }
    }
}

/// Serves analyze and query requests against a shared result cache
pub struct RepositoryService {
    fetcher: Arc<dyn SourceFetcher>,
    completion: Arc<dyn CompletionService>,
    cache: Arc<dyn ProfileCache>,
    analyzer: RepositoryAnalyzer,
    in_flight: FlightMap,
}

impl RepositoryService {
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        completion: Arc<dyn CompletionService>,
        cache: Arc<dyn ProfileCache>,
        analyzer: RepositoryAnalyzer,
    ) -> Self {
        Self {
            fetcher,
            completion,
            cache,
            analyzer,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Wire up the Gemini client and an LRU cache from configuration
    pub fn from_config(config: &RepoLensConfig, fetcher: Arc<dyn SourceFetcher>) -> Result<Self> {
        let client = GeminiClient::new(&config.llm)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        info!("Using completion endpoint {}", client.endpoint());

        Ok(Self::new(
            fetcher,
            Arc::new(client),
            Arc::new(LruProfileCache::new(config.cache.capacity)),
            RepositoryAnalyzer::new(config.walk.clone()),
        ))
    }

    pub fn cache(&self) -> &Arc<dyn ProfileCache> {
        &self.cache
    }

    /// Forget the cached analysis for `locator`
    pub fn invalidate(&self, locator: &str) -> bool {
        self.cache.invalidate(locator.trim())
    }

    /// Handle an analyze request
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse> {
        let locator = required(request.repo_url.as_deref())
            .ok_or(ServiceError::MissingField(MISSING_REPO_URL))?;
        self.analyze_locator(locator).await
    }

    /// Analyze `locator`, or return its cached analysis
    pub async fn analyze_locator(&self, locator: &str) -> Result<AnalyzeResponse> {
        if let Some(entry) = self.cache.get(locator) {
            debug!("Cache hit for {}", locator);
            return Ok(AnalyzeResponse::cached(entry));
        }

        // Released on every exit, including when this future is dropped mid-analysis
        let slot = self.flight_slot(locator);
        let _held = slot.acquire().await;

        if let Some(entry) = self.cache.peek(locator) {
            debug!("{} was analyzed while waiting", locator);
            return Ok(AnalyzeResponse::cached(entry));
        }
        self.analyze_uncached(locator).await.map(AnalyzeResponse::analyzed)
    }

    /// Handle a query request
    pub async fn query(&self, request: QueryRequest) -> Result<QueryResponse> {
        let (Some(locator), Some(question)) = (
            required(request.repo_url.as_deref()),
            required(request.question.as_deref()),
        ) else {
            return Err(ServiceError::MissingField(MISSING_QUERY_FIELDS));
        };

        let entry = self.cache.get(locator).ok_or(ServiceError::NotAnalyzed)?;
        let prompt = question_prompt(&entry, question);

        match self.completion.complete(&prompt).await {
            Ok(answer) => Ok(QueryResponse { answer }),
            Err(e) => {
                warn!("Query about {} failed: {}", locator, e);
                Err(ServiceError::Completion(if e.is_transport() {
                    COMPLETION_UNAVAILABLE
                } else {
                    COMPLETION_UNPARSABLE
                }))
            }
        }
    }

    async fn analyze_uncached(&self, locator: &str) -> Result<Arc<CacheEntry>> {
        let start_time = Instant::now();
        info!("Fetching {} with {} fetcher", locator, self.fetcher.name());

        let working_copy = self.fetcher.fetch(locator).await?;
        let profile = self.profile(locator, working_copy.path().to_path_buf()).await;

        // Removed before the completion call so no temporary copy outlives the walk
        if let Err(e) = working_copy.close() {
            warn!("Failed to remove working copy for {}: {}", locator, e);
        }
        let mut profile = profile?;

        let summary = self.summarize(&profile).await;
        profile.set_summary(summary)?;

        let entry = Arc::new(profile.into_cache_entry());
        self.cache.put(locator, Arc::clone(&entry));

        info!(
            "Analysis of {} finished in {:.2}s",
            locator,
            start_time.elapsed().as_secs_f64()
        );
        Ok(entry)
    }

    async fn profile(&self, locator: &str, root: std::path::PathBuf) -> Result<RepositoryProfile> {
        let analyzer = self.analyzer.clone();
        let locator = locator.to_string();
        tokio::task::spawn_blocking(move || analyzer.analyze(&locator, &root))
            .await
            .map_err(|e| ServiceError::Internal(format!("Analysis task failed: {e}")))?
            .map_err(ServiceError::from)
    }

    /// The completion text, or a placeholder when the service fails
    async fn summarize(&self, profile: &RepositoryProfile) -> String {
        let prompt = analysis_prompt(profile);
        match self.completion.complete(&prompt).await {
            Ok(summary) => summary,
            Err(e) if e.is_transport() => {
                warn!("Summary for {} unavailable: {}", profile.locator(), e);
                SUMMARY_UNAVAILABLE.to_string()
            }
            Err(e) => {
                warn!("Summary for {} unparsable: {}", profile.locator(), e);
                SUMMARY_UNPARSABLE.to_string()
            }
        }
    }

    fn flight_slot(&self, locator: &str) -> FlightSlot<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let flight = in_flight.entry(locator.to_string()).or_default();
        flight.holders += 1;
        FlightSlot {
            in_flight: &self.in_flight,
            locator: locator.to_string(),
            lock: Arc::clone(&flight.lock),
        }
    }
}
