use curlwrap::cookie::storage::DEFAULT_MAX_AGE;
use curlwrap::cookie::{CookieJar, CookieStore, FileCookieStore};
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn jar() -> CookieJar {
    CookieJar::from_set_cookie_headers(
        "HTTP/2 200\r\nSet-Cookie: X-XSRF-TOKEN-ST=tok; Path=/\r\nset-cookie: sid=a=b; HttpOnly\r\n",
    )
}

/// 测试缓存文件跨 store 实例可读
#[test]
fn test_cache_survives_new_store() {
    let temp_dir = TempDir::new().unwrap();
    FileCookieStore::new(temp_dir.path())
        .save("ups_curl", &jar())
        .unwrap();

    let loaded = FileCookieStore::new(temp_dir.path())
        .load("ups_curl")
        .unwrap()
        .unwrap();
    assert_eq!(loaded.get("X-XSRF-TOKEN-ST"), Some("tok"));
    assert_eq!(loaded.get("sid"), Some("a=b"));
}

/// 测试缓存文件格式
#[test]
fn test_cache_file_layout() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCookieStore::new(temp_dir.path());
    store.save("fedex_curl", &jar()).unwrap();

    let path = temp_dir.path().join("fedex_curl.cookie");
    assert_eq!(store.path_for("fedex_curl"), path);

    let record: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(record["key"], "fedex_curl");
    assert!(record["saved_at"].is_string());
    assert_eq!(record["cookies"][0][0], "X-XSRF-TOKEN-ST");
}

/// 测试过期与有效期配置
#[test]
fn test_max_age() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCookieStore::new(temp_dir.path());
    store.save("usps_curl", &jar()).unwrap();

    let file = fs::File::options()
        .write(true)
        .open(store.path_for("usps_curl"))
        .unwrap();
    file.set_modified(SystemTime::now() - DEFAULT_MAX_AGE - Duration::from_secs(60))
        .unwrap();
    drop(file);

    assert!(store.load("usps_curl").unwrap().is_none());

    let lenient = FileCookieStore::new(temp_dir.path()).with_max_age(DEFAULT_MAX_AGE * 2);
    assert!(lenient.load("usps_curl").unwrap().is_some());
}

/// 测试保存时自动创建目录
#[test]
fn test_save_creates_dir() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("cache").join("cookies");
    let store = FileCookieStore::new(&nested);

    store.save("fedex_curl", &jar()).unwrap();
    assert!(nested.join("fedex_curl.cookie").exists());
}

/// 测试空 cookie 不算缓存命中
#[test]
fn test_empty_jar_is_a_miss() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCookieStore::new(temp_dir.path());
    store.save("fedex_curl", &CookieJar::new()).unwrap();

    assert!(store.load("fedex_curl").unwrap().is_none());
}
