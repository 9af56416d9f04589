mod support;

use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use doctor_portraits::backend::{
    Automatic1111Client, BackendSettings, ImageBackend, RetryPolicy, Txt2ImgParams,
};
use doctor_portraits::batch::{run_batch, BatchDriver, BatchSettings, Manifest};
use doctor_portraits::{AppError, BackendKind, Config, PromptConstructor};
use support::{bind, png_b64, read_ledger, serve, Hits, PNG_BYTES};

/// Fails the requests whose one-based sequence number falls in `fail`.
#[derive(Clone)]
struct Flaky {
    hits: Hits,
    fail: RangeInclusive<usize>,
}

async fn flaky(State(stub): State<Flaky>, Json(_req): Json<Value>) -> (StatusCode, Json<Value>) {
    let n = stub.hits.next();
    if stub.fail.contains(&n) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "model loading"})));
    }
    (StatusCode::OK, Json(json!({"images": [png_b64()], "data": [{"b64_json": png_b64()}]})))
}

fn spawn(fail: RangeInclusive<usize>) -> (SocketAddr, Hits) {
    let hits = Hits::default();
    let (listener, addr) = bind();
    let app = Router::new()
        .route("/sdapi/v1/txt2img", post(flaky))
        .route("/v1/images/generations", post(flaky))
        .with_state(Flaky { hits: hits.clone(), fail });
    serve(listener, app);
    (addr, hits)
}

fn local_backend(addr: SocketAddr) -> ImageBackend {
    let client = Automatic1111Client::new(format!("http://{addr}"), Txt2ImgParams::default())
        .with_retry(RetryPolicy::immediate(3));
    ImageBackend::Automatic1111(client)
}

fn settings(backend: BackendKind, output_dir: &Path) -> BatchSettings {
    BatchSettings {
        count: 3,
        output_dir: output_dir.to_path_buf(),
        backend,
        manifest_path: None,
        seed: Some(100),
        backend_settings: BackendSettings {
            retry: RetryPolicy::immediate(3),
            ..BackendSettings::default()
        },
    }
}

#[tokio::test]
async fn every_item_succeeds() {
    let (addr, hits) = spawn(0..=0);
    let tmp = tempfile::tempdir().unwrap();

    let summary = BatchDriver::new(local_backend(addr), None)
        .run(3, tmp.path(), Some(100))
        .await
        .unwrap();
    assert_eq!((summary.total, summary.succeeded, summary.failed), (3, 3, 0));
    assert_eq!(hits.count(), 3);

    for name in ["doctor_001.png", "doctor_002.png", "doctor_003.png"] {
        assert_eq!(std::fs::read(tmp.path().join(name)).unwrap(), PNG_BYTES);
    }

    let rows = read_ledger(&summary.ledger_path);
    assert_eq!(rows.len(), 3);
    let prompts = PromptConstructor::new();
    for (i, row) in rows.iter().enumerate() {
        let seed = 100 + i as u64;
        assert_eq!(&row[0], i.to_string());
        assert_eq!(&row[1], format!("doctor_{:03}.png", i + 1));
        assert_eq!(&row[2], "");
        assert_eq!(&row[3], "");
        assert_eq!(&row[4], prompts.build_prompt(Some(seed)));
        assert_eq!(&row[5], "automatic1111");
        assert_eq!(&row[6], seed.to_string());
    }
}

#[tokio::test]
async fn failed_item_is_recorded_and_batch_continues() {
    // item 0 -> request 1, item 1 -> requests 2..=4, item 2 -> request 5
    let (addr, hits) = spawn(2..=4);
    let tmp = tempfile::tempdir().unwrap();

    let summary = BatchDriver::new(local_backend(addr), None)
        .run(3, tmp.path(), Some(7))
        .await
        .unwrap();
    assert_eq!((summary.succeeded, summary.failed), (2, 1));
    assert_eq!(hits.count(), 5);

    assert!(tmp.path().join("doctor_001.png").exists());
    assert!(!tmp.path().join("doctor_002.png").exists());
    assert!(tmp.path().join("doctor_003.png").exists());

    let rows = read_ledger(&summary.ledger_path);
    assert_eq!(rows.len(), 3);
    let backends: Vec<&str> = rows.iter().map(|r| &r[5]).collect();
    assert_eq!(backends, ["automatic1111", "automatic1111_FAILED", "automatic1111"]);
    assert_eq!(&rows[1][1], "doctor_002.png");
    assert_eq!(&rows[1][6], "8");
    assert_eq!(&rows[1][4], PromptConstructor::new().build_prompt(Some(8)));
}

#[tokio::test]
async fn manifest_rows_set_size_and_filenames() {
    let (addr, _hits) = spawn(0..=0);
    let tmp = tempfile::tempdir().unwrap();
    let manifest_path = tmp.path().join("doctors.csv");
    std::fs::write(&manifest_path, "id,specialty\n42,cardiology\n,oncology\n").unwrap();
    let out = tmp.path().join("out");

    let manifest = Manifest::from_path(&manifest_path).unwrap();
    let summary = BatchDriver::new(local_backend(addr), Some(manifest))
        .run(140, &out, Some(1))
        .await
        .unwrap();
    assert_eq!(summary.total, 2);

    assert!(out.join("doctor_42.png").exists());
    assert!(out.join("doctor_1.png").exists());

    let rows = read_ledger(&summary.ledger_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "doctor_42.png");
    assert_eq!(&rows[0][2], "42");
    assert_eq!(&rows[0][3], "");
    assert_eq!(&rows[1][2], "1");
}

#[tokio::test]
async fn same_seed_reproduces_the_ledger_prompts() {
    let (addr, _hits) = spawn(0..=0);
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let driver = BatchDriver::new(local_backend(addr), None);

    let first = driver.run(4, a.path(), Some(2024)).await.unwrap();
    let second = driver.run(4, b.path(), Some(2024)).await.unwrap();

    let prompts = |p: &Path| read_ledger(p).iter().map(|r| r[4].to_string()).collect::<Vec<_>>();
    assert_eq!(prompts(&first.ledger_path), prompts(&second.ledger_path));
}

#[tokio::test]
async fn unseeded_run_stays_below_seed_bound() {
    let (addr, _hits) = spawn(0..=0);
    let tmp = tempfile::tempdir().unwrap();

    let summary = BatchDriver::new(local_backend(addr), None)
        .run(1, tmp.path(), None)
        .await
        .unwrap();
    assert!(summary.master_seed < 1 << 30);
    assert_eq!(&read_ledger(&summary.ledger_path)[0][6], summary.master_seed.to_string());
}

#[tokio::test]
async fn openai_batch_runs_from_config() {
    let (addr, hits) = spawn(0..=0);
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        openai_api_key: Some("test-key".into()),
        openai_base_url: format!("http://{addr}/v1"),
        ..Config::default()
    };

    let summary = run_batch(&config, &settings(BackendKind::OpenAi, tmp.path())).await.unwrap();
    assert_eq!(summary.succeeded, 3);
    assert_eq!(hits.count(), 3);
    let rows = read_ledger(&summary.ledger_path);
    assert!(rows.iter().all(|r| &r[5] == "openai"));
}

#[tokio::test]
async fn missing_credential_aborts_before_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let config = Config::default();

    let err = run_batch(&config, &settings(BackendKind::OpenAi, &out)).await.unwrap_err();
    assert!(matches!(err, AppError::Config(_)), "{err}");
    assert!(!out.exists());
}

#[tokio::test]
async fn unreadable_manifest_aborts_before_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let mut settings = settings(BackendKind::Automatic1111, &out);
    settings.manifest_path = Some(tmp.path().join("absent.csv"));

    let err = run_batch(&Config::default(), &settings).await.unwrap_err();
    assert!(matches!(err, AppError::Manifest { .. }), "{err}");
    assert!(!out.exists());
}
