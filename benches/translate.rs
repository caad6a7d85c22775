use authgate::actions::ActionMapper;
use authgate::adapters::{HttpAdapter, HttpRequest, ProtocolAdapter};
use authgate::cache::PrincipalCache;
use authgate::config::GatewayConfig;
use authgate::credentials::CredentialExtractor;
use authgate::registry::ResourceRegistry;
use authgate_model::{Resource, Sensitivity};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue, Method};
use std::collections::BTreeMap;
use std::sync::Arc;

// Benchmarks the request-translation hot path: credential extraction
// (cache-warm), resource resolution, and action mapping. The decision
// engine is external and not part of the measurement.

const SECRET: &str = "bench-secret";

fn forge_token() -> String {
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD
        .encode(br#"{"sub":"alice","role":"viewer","teams":["platform"]}"#);
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{header}.{payload}.{signature}")
}

fn adapter() -> HttpAdapter {
    let config =
        GatewayConfig::from_toml_str(&format!("[jwt]\nsecret = \"{SECRET}\"")).unwrap();
    let registry = ResourceRegistry::new();
    registry
        .insert(
            "/api/admin/*",
            Resource::builder("admin-api")
                .sensitivity(Sensitivity::Critical)
                .build()
                .unwrap(),
        )
        .unwrap();
    HttpAdapter::new(
        Arc::new(CredentialExtractor::from_config(&config)),
        Arc::new(PrincipalCache::new()),
        Arc::new(registry),
    )
}

fn request(path: &str) -> HttpRequest {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", forge_token())).unwrap(),
    );
    HttpRequest {
        method: Method::GET,
        path: path.to_string(),
        headers,
        body: None,
        query: BTreeMap::new(),
        remote_addr: None,
    }
}

fn translate_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("translate_request");
    group.throughput(Throughput::Elements(1));

    let adapter = adapter();
    let exact = request("/api/users");
    let pattern = request("/api/admin/users");

    group.bench_function("synthesized_resource", |b| {
        b.iter(|| runtime.block_on(adapter.translate_request(&exact)).unwrap())
    });

    group.bench_function("pattern_resource", |b| {
        b.iter(|| runtime.block_on(adapter.translate_request(&pattern)).unwrap())
    });

    group.finish();
}

fn action_mapper_benchmark(c: &mut Criterion) {
    let mapper = ActionMapper::new();
    let mut group = c.benchmark_group("action_mapper");
    group.throughput(Throughput::Elements(1));

    group.bench_function("known_verb", |b| b.iter(|| mapper.operation_for("PATCH")));
    group.bench_function("unknown_verb", |b| {
        b.iter(|| mapper.operation_for("FROBNICATE"))
    });

    group.finish();
}

criterion_group!(benches, translate_benchmark, action_mapper_benchmark);
criterion_main!(benches);
