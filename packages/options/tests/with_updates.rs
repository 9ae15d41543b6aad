//! Copy-on-write updates through `with_*`

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response};
use quyc_options::prelude::*;
use serde_json::{Value, json};

fn object(value: Value) -> JsonMap {
    value.as_object().cloned().unwrap_or_default()
}

fn header_values<'a>(options: &'a Options, name: &str) -> Vec<&'a str> {
    options
        .headers()
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect()
}

#[test]
fn with_never_mutates_the_receiver() {
    let options = Options::default();
    let before = options.to_map();

    let updated = options
        .with_follow(true)
        .and_then(|o| o.with_persistent("http://example.com"))
        .and_then(|o| o.with_headers(json!({"Accept": "text/html"})))
        .expect("valid updates");

    assert_eq!(options.to_map(), before);
    assert_eq!(updated.follow(), &FollowPolicy::Default);
    assert!(updated.is_persistent());
    assert_eq!(header_values(&updated, "accept"), vec!["text/html"]);
}

#[test]
fn failed_updates_leave_no_trace() {
    let options = Options::new(OptionMap::new().with("follow", true)).expect("valid options");
    let before = options.to_map();

    assert!(options.with_follow(42).is_err());
    assert!(options.with_keep_alive_timeout("later").is_err());
    assert!(options.with_cache(7).is_err());
    assert_eq!(options.to_map(), before);
}

#[test]
fn follow_policies() {
    let options = Options::default();

    let followed = options.with_follow(true).expect("true is valid");
    assert_eq!(followed.follow(), &FollowPolicy::Default);

    for disabled in [OptionValue::from(false), OptionValue::NULL] {
        let updated = followed.with_follow(disabled).expect("falsy is valid");
        assert_eq!(updated.follow(), &FollowPolicy::None);
    }

    let custom = options.with_follow(json!({"max": 3})).expect("mapping is valid");
    assert_eq!(
        custom.follow(),
        &FollowPolicy::Custom(FollowOptions::new(object(json!({"max": 3}))))
    );
    assert_eq!(custom.follow().options().map(|o| o.max_hops()), Some(3));

    let err = options.with_follow(42).expect_err("42 is unsupported");
    assert!(err.is_configuration());
    assert!(err.to_string().contains("Unsupported follow options: 42"));
}

#[test]
fn persistent_keeps_only_the_origin() {
    let options = Options::default()
        .with_persistent("https://a.com:8443/path?q=1")
        .expect("valid uri");

    assert_eq!(options.persistent(), Some(&Origin::new("https", "a.com", 8443)));
    assert!(options.is_persistent());
    assert_eq!(
        options.get("persistent"),
        Some(OptionValue::Origin(Origin::new("https", "a.com", 8443)))
    );

    let cleared = options.with_persistent(OptionValue::NULL).expect("null is valid");
    assert_eq!(cleared.persistent(), None);
    assert!(!cleared.is_persistent());

    let url = url::Url::parse("http://b.org/x").expect("valid url");
    let from_url = cleared.with_persistent(&url).expect("url is valid");
    assert_eq!(from_url.persistent().map(ToString::to_string), Some("http://b.org".to_owned()));
}

#[test]
fn cache_objects_keep_their_identity() {
    let cache: Arc<dyn Cache> = Arc::new(HttpCache::new(CacheConfig::default()));
    let options = Options::default().with_cache(Arc::clone(&cache)).expect("cache is valid");

    assert!(Arc::ptr_eq(options.cache(), &cache));
}

#[test]
fn cache_mappings_become_strategies() {
    let options = Options::default().with_cache(json!({"ttl": 60})).expect("mapping is valid");
    let cache = options.cache();
    assert_eq!(cache.name(), "http");
    assert!(!Arc::ptr_eq(cache, Options::default().cache()));

    let request = Request::get("http://example.com/models")
        .body(Bytes::new())
        .expect("test request builds");
    let mut calls = 0;
    let mut fetch = |_: &Request<Bytes>| -> Result<Response<Bytes>> {
        calls += 1;
        Ok(Response::new(Bytes::from_static(b"[]")))
    };
    cache.perform(&request, &mut fetch).expect("first fetch");
    cache.perform(&request, &mut fetch).expect("served from cache");
    assert_eq!(calls, 1);

    assert!(
        Options::default()
            .with_cache(json!({"metastore": "heap:/"}))
            .is_err_and(|e| e.is_configuration())
    );
}

#[test]
fn headers_merge_onto_current_headers() {
    let options = Options::new(OptionMap::new().with("headers", json!({"X-A": "1", "Accept": "*/*"})))
        .expect("valid options");

    let updated = options
        .with_headers(json!({"x-a": "2", "X-B": "3"}))
        .expect("valid headers");

    assert_eq!(header_values(&updated, "X-A"), vec!["2"]);
    assert_eq!(header_values(&updated, "x-b"), vec!["3"]);
    assert_eq!(header_values(&updated, "accept"), vec!["*/*"]);
    assert_eq!(header_values(&options, "x-a"), vec!["1"]);

    let mut extra = HeaderMap::new();
    extra.append("cookie", HeaderValue::from_static("a=1"));
    extra.append("cookie", HeaderValue::from_static("b=2"));
    let with_cookies = updated.with_headers(extra).expect("header map is valid");
    assert_eq!(header_values(&with_cookies, "cookie"), vec!["a=1", "b=2"]);
}

#[test]
fn scalar_options() {
    let options = Options::default();

    assert_eq!(
        options.with_keep_alive_timeout(2.5).map(|o| o.keep_alive_timeout()).ok(),
        Some(Duration::from_millis(2500))
    );
    assert_eq!(
        options
            .with_keep_alive_timeout(Duration::from_secs(7))
            .map(|o| o.keep_alive_timeout())
            .ok(),
        Some(Duration::from_secs(7))
    );
    assert!(options.with_keep_alive_timeout(-1).is_err());

    assert_eq!(
        options.with_response("object").map(|o| o.response()).ok(),
        Some(ResponseMode::Object)
    );
    assert_eq!(
        options.with_response(ResponseMode::Body).map(|o| o.response()).ok(),
        Some(ResponseMode::Body)
    );
    assert!(options.with_response("xml").is_err());
}

#[test]
fn payloads_are_last_set_wins() {
    let options = Options::default()
        .with_form(json!({"a": 1}))
        .and_then(|o| o.with_json(json!([1, 2])))
        .and_then(|o| o.with_body("raw"))
        .and_then(|o| o.with_params(json!({"page": 2})))
        .expect("payloads are opaque");

    assert_eq!(options.form(), Some(&json!({"a": 1})));
    assert_eq!(options.json(), Some(&json!([1, 2])));
    assert_eq!(options.body(), Some(&json!("raw")));
    assert_eq!(options.params(), Some(&json!({"page": 2})));

    let replaced = options.with_json(json!({"b": 2})).expect("valid payload");
    assert_eq!(replaced.json(), Some(&json!({"b": 2})));
}

#[test]
fn collaborator_options() {
    let options = Options::default()
        .with_timeout_strategy("per_operation")
        .and_then(|o| o.with_timeout_options(json!({"connect_timeout": 1})))
        .expect("valid timeout settings");

    let timeouts = options.timeouts().expect("timeouts resolve");
    assert_eq!(timeouts.connect, Some(Duration::from_secs(1)));
    assert!(options.with_timeout_strategy("adaptive").is_err());

    let socket = options
        .with_socket_factory(OptionValue::socket_factory(TcpSocketFactory))
        .expect("factory is valid");
    assert_eq!(socket.socket_factory().name(), "tcp");
    assert!(options.with_socket_factory("tcp").is_err());

    let tls = options
        .with_ssl_socket_factory(OptionValue::tls_socket_factory(RustlsSocketFactory))
        .and_then(|o| o.with_ssl(json!({"verify_mode": "peer"})))
        .expect("tls settings are valid");
    assert_eq!(tls.ssl_socket_factory().name(), "rustls");
    assert_eq!(tls.ssl()["verify_mode"], json!("peer"));

    let context = quyc_options::connect::default_client_config().expect("tls config builds");
    let with_context = options.with_ssl_context(Arc::clone(&context)).expect("context is valid");
    assert!(with_context.ssl_context().is_some_and(|c| Arc::ptr_eq(c, &context)));
    assert!(options.with_ssl_context(true).is_err());
}

#[test]
fn generic_with_rejects_unknown_names() {
    let err = Options::default().with("nonexistent", 1).expect_err("not registered");
    assert!(err.is_unknown_option());
}

#[test]
fn huge_cache_lifetimes_do_not_overflow() {
    let request = Request::get("http://example.com/models")
        .body(Bytes::new())
        .expect("test request builds");

    let configured = Options::default()
        .with_cache(json!({"ttl": u64::MAX}))
        .expect("mapping is valid");
    let mut calls = 0;
    let mut fetch = |_: &Request<Bytes>| -> Result<Response<Bytes>> {
        calls += 1;
        Ok(Response::new(Bytes::from_static(b"[]")))
    };
    configured.cache().perform(&request, &mut fetch).expect("first fetch");
    configured.cache().perform(&request, &mut fetch).expect("served from cache");
    assert_eq!(calls, 1);

    let advertised = Options::default()
        .with_cache(json!({"ttl": 60}))
        .expect("mapping is valid");
    let mut calls = 0;
    let mut fetch = |_: &Request<Bytes>| -> Result<Response<Bytes>> {
        calls += 1;
        Ok(Response::builder()
            .header("cache-control", "max-age=18446744073709551615")
            .body(Bytes::from_static(b"[]"))
            .expect("test response builds"))
    };
    advertised.cache().perform(&request, &mut fetch).expect("first fetch");
    advertised.cache().perform(&request, &mut fetch).expect("served from cache");
    assert_eq!(calls, 1);
}
