use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use indexcfg::{
    CatalogConfig, CatalogError, Field, HttpModelCatalog, MODELS_CACHE_KEY, MODELS_CACHE_TTL,
    Metric, ModelCache, ModelCatalog, ModelDescriptor, PartialConfig, PrepareError, ResolveError,
    Topology, VectorKind, prepare_from_file, prepare_index,
};

struct CountingCatalog {
    models: Vec<ModelDescriptor>,
    calls: AtomicUsize,
}

impl CountingCatalog {
    fn new(models: Vec<ModelDescriptor>) -> Self {
        Self {
            models,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelCatalog for CountingCatalog {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.models.clone())
    }
}

struct Unauthorized;

#[async_trait]
impl ModelCatalog for Unauthorized {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, CatalogError> {
        Err(CatalogError::Status {
            status: 401,
            body: "Invalid API Key".into(),
        })
    }
}

fn hosted_models() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor {
            model: "llama-text-embed-v2".into(),
            kind: "embed".into(),
            vector_type: Some("dense".into()),
            default_dimension: Some(2048),
            supported_dimensions: vec![384, 512, 768, 1024, 2048],
            supported_metrics: vec!["Cosine".into(), "DotProduct".into()],
            ..Default::default()
        },
        ModelDescriptor {
            model: "pinecone-sparse-english-v0".into(),
            kind: "embed".into(),
            vector_type: Some("sparse".into()),
            supported_metrics: vec!["DotProduct".into()],
            ..Default::default()
        },
    ]
}

fn with_model(model: &str) -> PartialConfig {
    PartialConfig {
        model: Field::Explicit(model.into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn default_alias_resolves_to_integrated_index() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ModelCache::new(dir.path(), MODELS_CACHE_TTL);
    let catalog = CountingCatalog::new(hosted_models());

    let prepared = prepare_index(with_model("default"), &catalog, &cache, true)
        .await
        .unwrap();
    let fields = prepared.config.fields();

    assert!(prepared.models_available);
    assert!(prepared.warnings.is_empty());
    assert_eq!(prepared.topology, Topology::Integrated);
    assert_eq!(
        fields.model.value().map(String::as_str),
        Some("llama-text-embed-v2")
    );
    assert_eq!(fields.dimension, Field::Inferred(2048));
    assert_eq!(fields.metric.value(), Some(&Metric::Cosine));
    assert_eq!(
        fields
            .write_parameters
            .value()
            .and_then(|p| p.get("input_type"))
            .map(String::as_str),
        Some("passage")
    );
    assert_eq!(
        fields
            .read_parameters
            .value()
            .and_then(|p| p.get("input_type"))
            .map(String::as_str),
        Some("query")
    );
}

#[tokio::test]
async fn sparse_alias_resolves_without_dimension() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ModelCache::new(dir.path(), MODELS_CACHE_TTL);
    let catalog = CountingCatalog::new(hosted_models());

    let prepared = prepare_index(with_model("sparse"), &catalog, &cache, true)
        .await
        .unwrap();
    let fields = prepared.config.fields();

    assert_eq!(fields.vector_type.value(), Some(&VectorKind::Sparse));
    assert_eq!(fields.metric.value(), Some(&Metric::Dotproduct));
    assert!(fields.dimension.is_absent());
}

#[tokio::test]
async fn second_run_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ModelCache::new(dir.path(), MODELS_CACHE_TTL);
    let catalog = CountingCatalog::new(hosted_models());

    let first = prepare_index(with_model("default"), &catalog, &cache, true)
        .await
        .unwrap();
    let second = prepare_index(with_model("default"), &catalog, &cache, true)
        .await
        .unwrap();

    assert_eq!(catalog.calls(), 1);
    assert_eq!(first, second);
    assert!(dir.path().join(format!("{MODELS_CACHE_KEY}.json")).exists());

    prepare_index(with_model("default"), &catalog, &cache, false)
        .await
        .unwrap();
    assert_eq!(catalog.calls(), 2);
}

#[tokio::test]
async fn rejected_catalog_degrades_to_generic_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ModelCache::new(dir.path(), MODELS_CACHE_TTL);

    let prepared = prepare_index(with_model("default"), &Unauthorized, &cache, true)
        .await
        .unwrap();
    let fields = prepared.config.fields();

    assert!(!prepared.models_available);
    assert!(prepared.warnings[0].contains("HTTP 401"));
    assert_eq!(fields.model.value().map(String::as_str), Some("default"));
    assert_eq!(fields.dimension, Field::Inferred(1024));
    assert!(fields.field_map.is_absent());
}

#[tokio::test]
async fn unresponsive_catalog_times_out_to_generic_defaults() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Holds the connection open without ever writing a response.
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });

    let cfg = CatalogConfig {
        api_url: format!("http://{addr}"),
        timeout_secs: 1,
        ..Default::default()
    };
    let http = HttpModelCatalog::new(&cfg).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let cache = ModelCache::new(dir.path(), MODELS_CACHE_TTL);

    let prepared = tokio::time::timeout(
        Duration::from_secs(5),
        prepare_index(with_model("default"), &http, &cache, true),
    )
    .await
    .expect("catalog timeout must bound the pipeline")
    .unwrap();
    let fields = prepared.config.fields();

    assert!(!prepared.models_available);
    assert_eq!(prepared.warnings.len(), 1);
    assert_eq!(prepared.topology, Topology::Integrated);
    assert_eq!(fields.dimension, Field::Inferred(1024));
    assert_eq!(fields.region.value().map(String::as_str), Some("us-east-1"));
    assert!(fields.field_map.is_absent());
    assert_eq!(cache.get::<Vec<ModelDescriptor>>(MODELS_CACHE_KEY), None);
    server.abort();
}

#[tokio::test]
async fn fresh_cache_avoids_failing_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ModelCache::new(dir.path(), MODELS_CACHE_TTL);
    cache.put(MODELS_CACHE_KEY, &hosted_models()).unwrap();

    // The catalog is down, but a fresh cached listing avoids the call entirely.
    let prepared = prepare_index(with_model("default"), &Unauthorized, &cache, true)
        .await
        .unwrap();
    assert!(prepared.models_available);
    assert!(prepared.warnings.is_empty());
    assert_eq!(prepared.config.fields().dimension.value(), Some(&2048));
}

#[tokio::test]
async fn embedding_model_on_pod_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ModelCache::new(dir.path(), MODELS_CACHE_TTL);
    let catalog = CountingCatalog::new(hosted_models());
    let partial = PartialConfig {
        pod: Field::Explicit(true),
        ..with_model("llama-text-embed-v2")
    };

    let err = prepare_index(partial, &catalog, &cache, true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PrepareError::Resolve(ResolveError::AmbiguousTopology {
            serverless: true,
            pod: true
        })
    ));
    assert!(err.to_string().contains("--serverless"));
}

#[tokio::test]
async fn prepared_index_serializes_provenance() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ModelCache::new(dir.path(), MODELS_CACHE_TTL);
    let partial = PartialConfig {
        cloud: Field::Explicit("gcp".into()),
        ..Default::default()
    };

    let prepared = prepare_index(partial, &Unauthorized, &cache, true)
        .await
        .unwrap();
    let json = serde_json::to_value(&prepared).unwrap();

    assert_eq!(json["topology"], "serverless");
    assert_eq!(json["models_available"], false);
    assert_eq!(json["config"]["cloud"]["value"], "gcp");
    assert_eq!(json["config"]["cloud"]["inferred"], false);
    assert_eq!(json["config"]["region"]["value"], "us-central1");
    assert_eq!(json["config"]["region"]["inferred"], true);
    assert!(json["config"]["pod_type"]["value"].is_null());
}

#[tokio::test]
async fn prepare_from_file_uses_cached_listing() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    ModelCache::new(&cache_dir, MODELS_CACHE_TTL)
        .put(MODELS_CACHE_KEY, &hosted_models())
        .unwrap();

    let mut file = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
    write!(
        file,
        "version: \"1.0\"\n\
         catalog:\n  api_url: \"http://127.0.0.1:9\"\n  timeout_secs: 1\n  cache_dir: \"{}\"\n\
         index:\n  name: docs\n  model: dense\n  deletion_protection: enabled\n",
        cache_dir.display()
    )
    .unwrap();

    let prepared = prepare_from_file(file.path()).await.unwrap();
    let fields = prepared.config.fields();

    assert!(prepared.models_available);
    assert_eq!(prepared.topology, Topology::Integrated);
    assert_eq!(
        fields.model.value().map(String::as_str),
        Some("llama-text-embed-v2")
    );
    assert!(fields.deletion_protection.is_explicit());
}

#[tokio::test]
async fn prepare_from_file_reports_bad_version() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "version: \"9\"").unwrap();

    let err = prepare_from_file(file.path()).await.unwrap_err();
    assert!(matches!(err, PrepareError::Config(_)));
}
