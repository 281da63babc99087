// tests/registry_config.rs
use nuclear_news::ingest::config::{
    default_seed, load_registry_default, load_registry_from, ENV_FEEDS_PATH,
};
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("feeds.toml");
    fs::write(
        &p_toml,
        r#"
[[feeds]]
id = " wnn "
name = "World Nuclear News"
url = "https://www.world-nuclear-news.org/rss"
trust = 10

[[feeds]]
id = "power_mag"
name = "Power Magazine"
url = "https://www.powermag.com/feed/"
trust = 7
strict = false

[[feeds]]
id = "wnn"
name = "Duplicate"
url = "https://dup.test/rss"
trust = 1
"#,
    )
    .unwrap();
    let v = load_registry_from(&p_toml).unwrap();
    assert_eq!(v.len(), 2);
    assert_eq!(v[0].id, "wnn");
    assert!(v[0].strict);
    assert_eq!(v[1].id, "power_mag");
    assert!(!v[1].strict);

    let p_json = dir.path().join("feeds.json");
    fs::write(
        &p_json,
        r#"[{"id":"iaea","name":"IAEA","url":"https://www.iaea.org/feeds/topnews","trust":10,"strict":false},
            {"id":"","name":"blank","url":"https://x.test","trust":1}]"#,
    )
    .unwrap();
    let vj = load_registry_from(&p_json).unwrap();
    assert_eq!(vj.len(), 1);
    assert_eq!(vj[0].name, "IAEA");
}

#[test]
fn empty_file_falls_back_to_seed() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("feeds.toml");
    fs::write(&p, "").unwrap();
    assert_eq!(load_registry_from(&p).unwrap(), default_seed());
}

#[test]
fn malformed_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("feeds.toml");
    fs::write(&p, "[[feeds]]\nid = 3").unwrap();
    assert!(load_registry_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ isn't picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_FEEDS_PATH);

    // 1) Nothing configured → built-in seed
    let v = load_registry_default().unwrap();
    assert_eq!(v, default_seed());

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("feeds.toml"),
        "[[feeds]]\nid = \"a\"\nname = \"A\"\nurl = \"https://a.test/rss\"\ntrust = 5\n",
    )
    .unwrap();
    let vt = load_registry_default().unwrap();
    assert_eq!(vt.len(), 1);
    assert_eq!(vt[0].id, "a");

    // 3) ENV wins
    let p_env = tmp.path().join("other.json");
    fs::write(
        &p_env,
        r#"{"feeds":[{"id":"x","name":"X","url":"https://x.test/rss","trust":3}]}"#,
    )
    .unwrap();
    env::set_var(ENV_FEEDS_PATH, p_env.display().to_string());
    let ve = load_registry_default().unwrap();
    assert_eq!(ve[0].id, "x");

    // 4) ENV pointing nowhere is an error
    env::set_var(ENV_FEEDS_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(load_registry_default().is_err());
    env::remove_var(ENV_FEEDS_PATH);

    env::set_current_dir(&old).unwrap();
}
