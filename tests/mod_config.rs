use tourlite::config::{CatalogConfig, DEFAULT_LIMIT, ParamPolicy};
use tourlite::query::{QueryParams, translate_list_query};
use tourlite::{ErrorKind, ListQuery};

#[test]
fn explicit_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tourlite.toml");
    std::fs::write(&path, "default_limit = 20\nmax_limit = 50\nparam_policy = \"reject\"\n").unwrap();
    let cfg = CatalogConfig::load(Some(&path)).unwrap();
    assert_eq!(cfg.default_limit, 20);
    assert_eq!(cfg.max_limit, 50);
    assert_eq!(cfg.param_policy, ParamPolicy::Reject);
}

#[test]
fn bad_file_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tourlite.toml");
    std::fs::write(&path, "default_limit = \"many\"").unwrap();
    let err = CatalogConfig::from_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedParameter);
}

#[test]
fn limits_follow_config() {
    let cfg = CatalogConfig { default_limit: 20, max_limit: 50, ..CatalogConfig::default() };
    let q = translate_list_query(ListQuery::find_all(), &QueryParams::new(), &cfg).unwrap();
    assert_eq!(q.limit, Some(20));
    let q = translate_list_query(ListQuery::find_all(), &QueryParams::from_query_str("limit=500"), &cfg)
        .unwrap();
    assert_eq!(q.limit, Some(50));

    let strict = CatalogConfig { param_policy: ParamPolicy::Reject, ..cfg };
    let err = translate_list_query(ListQuery::find_all(), &QueryParams::from_query_str("limit=500"), &strict)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedParameter);
    assert_eq!(CatalogConfig::default().default_limit, DEFAULT_LIMIT);
}
