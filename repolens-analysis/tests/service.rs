//! Request-level behavior of the repository service

use async_trait::async_trait;
use repolens_analysis::{
    AnalyzeRequest, QueryRequest, RepositoryService, ServiceError, COMPLETION_UNAVAILABLE,
    COMPLETION_UNPARSABLE, SUMMARY_UNAVAILABLE, SUMMARY_UNPARSABLE,
};
use repolens_core::{
    Error, LruProfileCache, ProfileCache, RepositoryAnalyzer, Result as CoreResult, SourceFetcher,
    WorkingCopy,
};
use repolens_llm::{CompletionService, GeminiClient, LlmConfig, LlmError, LlmResult};
use serde_json::json;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Materializes a fixed file set into a fresh temporary directory per fetch
#[derive(Default)]
struct FakeFetcher {
    files: Vec<(&'static str, &'static str)>,
    delay: Option<Duration>,
    fail_with: Option<String>,
    fetches: AtomicUsize,
    paths: Mutex<Vec<PathBuf>>,
}

impl FakeFetcher {
    fn with_files(files: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn fetched_paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceFetcher for FakeFetcher {
    async fn fetch(&self, _locator: &str) -> CoreResult<WorkingCopy> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.fail_with {
            return Err(Error::Fetch(message.clone()));
        }

        let dir = tempfile::tempdir()?;
        for (path, body) in &self.files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, body)?;
        }
        self.paths.lock().unwrap().push(dir.path().to_path_buf());
        Ok(WorkingCopy::temporary(dir))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Answers from a queue of scripted results, then with "summary"
#[derive(Default)]
struct ScriptedCompletion {
    script: Mutex<VecDeque<LlmResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    fn answering(results: Vec<LlmResult<String>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            prompts: Mutex::default(),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("summary".to_string()))
    }
}

fn sample_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("README.md", "Hello"),
        ("src/app.py", "print('hi')"),
        ("web/index.js", "console.log(1)"),
        ("node_modules/dep/index.js", "ignored"),
        ("logo.png", "ignored"),
    ]
}

fn service_with(
    fetcher: &Arc<FakeFetcher>,
    completion: &Arc<ScriptedCompletion>,
    capacity: usize,
) -> RepositoryService {
    RepositoryService::new(
        Arc::clone(fetcher) as Arc<dyn SourceFetcher>,
        Arc::clone(completion) as Arc<dyn CompletionService>,
        Arc::new(LruProfileCache::new(capacity)),
        RepositoryAnalyzer::default(),
    )
}

const REPO: &str = "https://github.com/example/repo";

#[tokio::test]
async fn test_analyze_profiles_repository() {
    let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
    let completion = Arc::new(ScriptedCompletion::default());
    let service = service_with(&fetcher, &completion, 4);

    let response = service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
    assert_eq!(response.message, "Repository analyzed successfully");
    assert!(!response.from_cache);

    let data = &response.data;
    assert_eq!(data.summary, "summary");
    assert_eq!(data.repo_info.total_files, 3);
    assert!(data.repo_info.has_readme);
    assert_eq!(data.repo_info.readme_sample, "Hello");
    assert_eq!(
        serde_json::to_value(&data.languages).unwrap(),
        json!({"JavaScript": 1, "Markdown": 1, "Python": 1})
    );
    assert_eq!(
        serde_json::to_value(&data.structure).unwrap(),
        json!({
            "files": ["README.md"],
            "dirs": {
                "src": {"files": ["app.py"]},
                "web": {"files": ["index.js"]}
            }
        })
    );
    assert_eq!(data.files, vec!["README.md", "src/app.py", "web/index.js"]);

    let prompt = completion.last_prompt().unwrap();
    assert!(prompt.contains("- Total Files: 3"));
    assert!(prompt.contains("README Content:\nHello\n"));
}

#[tokio::test]
async fn test_second_analyze_served_from_cache() {
    let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
    let completion = Arc::new(ScriptedCompletion::default());
    let service = service_with(&fetcher, &completion, 4);

    let first = service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
    let second = service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();

    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(completion.calls(), 1);
    assert_eq!(second.message, "Repository loaded from cache");
    assert!(second.from_cache);
    assert_eq!(
        serde_json::to_value(&first.data).unwrap(),
        serde_json::to_value(&second.data).unwrap()
    );
}

#[tokio::test]
async fn test_cold_analyze_counts_one_miss() {
    let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
    let completion = Arc::new(ScriptedCompletion::default());
    let service = service_with(&fetcher, &completion, 4);

    service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
    let stats = service.cache().statistics();
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 0);

    service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
    let stats = service.cache().statistics();
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 1);
    assert!((stats.cache_hit_ratio - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_working_copy_removed_after_analysis() {
    let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
    let completion = Arc::new(ScriptedCompletion::answering(vec![Err(LlmError::Transport(
        "connection refused".to_string(),
    ))]));
    let service = service_with(&fetcher, &completion, 4);

    service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();

    let paths = fetcher.fetched_paths();
    assert_eq!(paths.len(), 1);
    assert!(!paths[0].exists());
}

#[tokio::test]
async fn test_fetch_failure_reported_verbatim() {
    let fetcher = Arc::new(FakeFetcher {
        fail_with: Some("Failed to clone repository: fatal: repository not found".to_string()),
        ..FakeFetcher::default()
    });
    let completion = Arc::new(ScriptedCompletion::default());
    let service = service_with(&fetcher, &completion, 4);

    let err = service.analyze(AnalyzeRequest::new(REPO)).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert_eq!(
        err.to_payload().error,
        "Failed to clone repository: fatal: repository not found"
    );
    assert_eq!(completion.calls(), 0);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_missing_repo_url() {
    let fetcher = Arc::new(FakeFetcher::default());
    let completion = Arc::new(ScriptedCompletion::default());
    let service = service_with(&fetcher, &completion, 4);

    for request in [AnalyzeRequest::default(), AnalyzeRequest::new("")] {
        let err = service.analyze(request).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "No repository URL provided");
    }
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_query_requires_prior_analysis() {
    let fetcher = Arc::new(FakeFetcher::default());
    let completion = Arc::new(ScriptedCompletion::default());
    let service = service_with(&fetcher, &completion, 4);

    let err = service
        .query(QueryRequest::new(REPO, "What is this?"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotAnalyzed));
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.to_string(), "Repository not analyzed yet. Please analyze first.");
    assert_eq!(completion.calls(), 0);
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_query_requires_both_fields() {
    let fetcher = Arc::new(FakeFetcher::default());
    let completion = Arc::new(ScriptedCompletion::default());
    let service = service_with(&fetcher, &completion, 4);

    let requests = [
        QueryRequest {
            repo_url: Some(REPO.to_string()),
            question: None,
        },
        QueryRequest {
            repo_url: None,
            question: Some("Why?".to_string()),
        },
        QueryRequest::new(REPO, ""),
    ];
    for request in requests {
        let err = service.query(request).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Repository URL and question are required");
    }
}

#[tokio::test]
async fn test_query_answers_from_cached_analysis() {
    let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
    let completion = Arc::new(ScriptedCompletion::answering(vec![
        Ok("A demo project.".to_string()),
        Ok("It prints hi.".to_string()),
    ]));
    let service = service_with(&fetcher, &completion, 4);

    service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
    let response = service
        .query(QueryRequest::new(REPO, "What does app.py do?"))
        .await
        .unwrap();

    assert_eq!(response.answer, "It prints hi.");
    assert_eq!(fetcher.fetch_count(), 1);
    let prompt = completion.last_prompt().unwrap();
    assert!(prompt.contains("Repository Summary:\nA demo project.\n"));
    assert!(prompt.contains("Question: What does app.py do?\n"));
}

#[tokio::test]
async fn test_summary_failures_cached_as_placeholders() {
    let cases = [
        (LlmError::Transport("timed out".to_string()), SUMMARY_UNAVAILABLE),
        (
            LlmError::Status {
                status: 503,
                body: String::new(),
            },
            SUMMARY_UNAVAILABLE,
        ),
        (
            LlmError::MalformedResponse("no candidates".to_string()),
            SUMMARY_UNPARSABLE,
        ),
    ];

    for (failure, placeholder) in cases {
        let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
        let completion = Arc::new(ScriptedCompletion::answering(vec![Err(failure)]));
        let service = service_with(&fetcher, &completion, 4);

        let response = service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
        assert_eq!(response.data.summary, placeholder);

        let cached = service.cache().get(REPO).unwrap();
        assert_eq!(cached.summary, placeholder);
    }
}

#[tokio::test]
async fn test_query_completion_failures() {
    let cases = [
        (LlmError::Transport("refused".to_string()), COMPLETION_UNAVAILABLE),
        (
            LlmError::MalformedResponse("empty".to_string()),
            COMPLETION_UNPARSABLE,
        ),
    ];

    for (failure, message) in cases {
        let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
        let completion = Arc::new(ScriptedCompletion::answering(vec![
            Ok("summary".to_string()),
            Err(failure),
        ]));
        let service = service_with(&fetcher, &completion, 4);

        service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
        let err = service
            .query(QueryRequest::new(REPO, "Anything?"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_payload().error, message);
    }
}

#[tokio::test]
async fn test_concurrent_analyze_fetches_once() {
    let fetcher = Arc::new(FakeFetcher {
        files: sample_files(),
        delay: Some(Duration::from_millis(50)),
        ..FakeFetcher::default()
    });
    let completion = Arc::new(ScriptedCompletion::default());
    let service = Arc::new(service_with(&fetcher, &completion, 4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.analyze(AnalyzeRequest::new(REPO)).await })
        })
        .collect();

    let mut fresh = 0;
    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        if !response.from_cache {
            fresh += 1;
        }
    }

    assert_eq!(fresh, 1);
    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn test_invalidate_forces_reanalysis() {
    let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
    let completion = Arc::new(ScriptedCompletion::default());
    let service = service_with(&fetcher, &completion, 4);

    service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
    assert!(service.invalidate(REPO));
    assert!(!service.invalidate(REPO));

    let response = service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
    assert!(!response.from_cache);
    assert_eq!(fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn test_bounded_cache_evicts_oldest_locator() {
    let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
    let completion = Arc::new(ScriptedCompletion::default());
    let service = service_with(&fetcher, &completion, 1);

    service.analyze(AnalyzeRequest::new("repo-a")).await.unwrap();
    service.analyze(AnalyzeRequest::new("repo-b")).await.unwrap();
    assert_eq!(service.cache().len(), 1);

    let err = service
        .query(QueryRequest::new("repo-a", "Still there?"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotAnalyzed));

    let again = service.analyze(AnalyzeRequest::new("repo-a")).await.unwrap();
    assert!(!again.from_cache);
    assert_eq!(fetcher.fetch_count(), 3);
    assert_eq!(service.cache().statistics().evictions, 2);
}

#[tokio::test]
async fn test_analyze_with_gemini_backend() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash-lite:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "## Demo\nA small demo."}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = LlmConfig {
        api_base: format!("{}/v1beta/models", server.uri()),
        api_key: Some("test-key".to_string()),
        timeout_secs: Some(5),
        ..LlmConfig::default()
    };
    let fetcher = Arc::new(FakeFetcher::with_files(sample_files()));
    let service = RepositoryService::new(
        Arc::clone(&fetcher) as Arc<dyn SourceFetcher>,
        Arc::new(GeminiClient::new(&config).unwrap()),
        Arc::new(LruProfileCache::default()),
        RepositoryAnalyzer::default(),
    );

    let response = service.analyze(AnalyzeRequest::new(REPO)).await.unwrap();
    assert_eq!(response.data.summary, "## Demo\nA small demo.");

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["message"], "Repository analyzed successfully");
    assert_eq!(body["data"]["summary"], "## Demo\nA small demo.");
    assert!(body.get("from_cache").is_none());
}
