use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct ClickResponse {
    label: String,
    count: u64,
}

#[derive(Debug, Deserialize)]
struct CountEntry {
    label: String,
    display_label: String,
    count: u64,
    activated: bool,
}

#[derive(Debug, Deserialize)]
struct CountsResponse {
    counts: Vec<CountEntry>,
}

impl CountsResponse {
    fn entry(&self, label: &str) -> &CountEntry {
        self.counts
            .iter()
            .find(|entry| entry.label == label)
            .expect("missing label")
    }
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        #[cfg(unix)]
        cleanup::unregister(self.child.id());
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

/// Every live child is SIGTERMed at exit. The shared server sits in a static
/// that is never dropped, so this is the only thing that stops it.
#[cfg(unix)]
mod cleanup {
    use std::sync::{Mutex, Once};

    static REGISTER: Once = Once::new();
    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

    pub fn register(pid: u32) {
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
        PIDS.lock().unwrap().push(pid as i32);
    }

    pub fn unregister(pid: u32) {
        PIDS.lock().unwrap().retain(|&tracked| tracked != pid as i32);
    }

    pub fn registered() -> Vec<i32> {
        PIDS.lock().unwrap().clone()
    }

    extern "C" fn on_exit() {
        let pids = match PIDS.lock() {
            Ok(pids) => pids.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for pid in pids {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_path(kind: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("emotion_board_http_{kind}_{}_{}", std::process::id(), nanos));
    path
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/counts")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(data_path: &Path, assets_dir: &Path) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_emotion_board"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("APP_ASSETS_DIR", assets_dir)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(
        spawn_server(
            &unique_path("data").with_extension("json"),
            &unique_path("assets"),
        )
        .await,
    );
    *guard = Some(Arc::clone(&server));
    server
}

async fn fetch_counts(client: &Client, base_url: &str) -> CountsResponse {
    client
        .get(format!("{base_url}/api/counts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_click_increments_and_marks() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_counts(&client, &server.base_url).await;

    let clicked: ClickResponse = client
        .post(format!("{}/api/click", server.base_url))
        .json(&serde_json::json!({ "label": "happy" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(clicked.label, "happy");
    assert_eq!(clicked.count, before.entry("happy").count + 1);

    let after = fetch_counts(&client, &server.base_url).await;
    let happy = after.entry("happy");
    assert_eq!(happy.count, before.entry("happy").count + 1);
    assert_eq!(happy.display_label, "Happy");
    assert!(happy.activated);
    assert_eq!(after.entry("sad").count, before.entry("sad").count);
}

#[tokio::test]
async fn http_unknown_label_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/click", server.base_url))
        .json(&serde_json::json!({ "label": "extinct_emotion" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_form_click_redirects_to_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_counts(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/avatars/sad/click", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"class="avatar clicked" data-emotion="sad""#));
    assert!(html.contains("<span>Sad:</span>"));

    let after = fetch_counts(&client, &server.base_url).await;
    assert_eq!(after.entry("sad").count, before.entry("sad").count + 1);

    let ignored = client
        .post(format!("{}/avatars/bored/click", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(ignored.status().is_success());
}

#[tokio::test]
async fn http_reset_clears_counts_and_marks() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .post(format!("{}/api/click", server.base_url))
        .json(&serde_json::json!({ "label": "angry" }))
        .send()
        .await
        .unwrap();

    let reset: CountsResponse = client
        .post(format!("{}/api/reset", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reset.counts.len(), 8);
    assert!(reset.counts.iter().all(|entry| entry.count == 0 && !entry.activated));

    let page = client
        .post(format!("{}/reset", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!page.contains("avatar clicked"));
}

#[tokio::test]
async fn http_counts_survive_restart_but_marks_do_not() {
    let data_path = unique_path("restart").with_extension("json");
    let assets_dir = unique_path("restart_assets");
    let client = Client::new();

    {
        let server = spawn_server(&data_path, &assets_dir).await;
        for _ in 0..3 {
            client
                .post(format!("{}/api/click", server.base_url))
                .json(&serde_json::json!({ "label": "excited" }))
                .send()
                .await
                .unwrap();
        }
    }

    let server = spawn_server(&data_path, &assets_dir).await;
    let counts = fetch_counts(&client, &server.base_url).await;
    assert_eq!(counts.entry("excited").count, 3);
    assert!(!counts.entry("excited").activated);
    assert_eq!(counts.entry("sick").count, 0);

    drop(server);
    let _ = std::fs::remove_file(data_path);
}

#[tokio::test]
async fn http_corrupt_snapshot_starts_at_zero() {
    let data_path = unique_path("corrupt").with_extension("json");
    std::fs::write(
        &data_path,
        serde_json::json!({ "emotionClickCounts": "not json" }).to_string(),
    )
    .unwrap();

    let server = spawn_server(&data_path, &unique_path("corrupt_assets")).await;
    let counts = fetch_counts(&Client::new(), &server.base_url).await;
    assert!(counts.counts.iter().all(|entry| entry.count == 0));

    drop(server);
    let _ = std::fs::remove_file(data_path);
}

#[tokio::test]
async fn http_serves_images_from_assets_dir() {
    let assets_dir = unique_path("images");
    std::fs::create_dir_all(&assets_dir).unwrap();
    std::fs::write(assets_dir.join("happy.png"), b"\x89PNG fake").unwrap();

    let server = spawn_server(
        &unique_path("images_data").with_extension("json"),
        &assets_dir,
    )
    .await;
    let client = Client::new();

    let found = client
        .get(format!("{}/images/happy.png", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(found.headers()["content-type"], "image/png");
    assert_eq!(found.bytes().await.unwrap().as_ref(), b"\x89PNG fake");

    let missing = client
        .get(format!("{}/images/sad.jpeg", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    drop(server);
    let _ = std::fs::remove_dir_all(assets_dir);
}

#[cfg(unix)]
#[tokio::test]
async fn http_every_spawned_server_is_tracked_for_cleanup() {
    let private = spawn_server(
        &unique_path("tracked").with_extension("json"),
        &unique_path("tracked_assets"),
    )
    .await;
    let private_pid = private.child.id() as i32;

    let shared_pid = {
        let _guard = TEST_LOCK.lock().await;
        shared_server().await.child.id() as i32
    };

    let tracked = cleanup::registered();
    assert!(tracked.contains(&private_pid));
    assert!(tracked.contains(&shared_pid));

    drop(private);
    let tracked = cleanup::registered();
    assert!(!tracked.contains(&private_pid));
    assert!(tracked.contains(&shared_pid));
}
