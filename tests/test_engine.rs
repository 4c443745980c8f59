//! End-to-end engine tests with a scripted gateway

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use luxmeter::io::{HttpClient, HttpResponse};
use luxmeter::{Config, Engine, GatewayDirectory, OutputSink, SensorReader};

const DISCOVERY_URL: &str = "https://discovery.example.com/";

/// Fake gateway: answers discovery with a fixed record and serves scripted
/// raw light levels, one per sensor fetch, in order
struct ScriptedGateway {
    levels: Mutex<VecDeque<i64>>,
}

impl ScriptedGateway {
    fn new(levels: &[i64]) -> Self {
        Self {
            levels: Mutex::new(levels.iter().copied().collect()),
        }
    }
}

#[async_trait]
impl HttpClient for ScriptedGateway {
    async fn get(&self, url: &str) -> luxmeter::Result<HttpResponse> {
        if url == DISCOVERY_URL {
            return Ok(HttpResponse {
                status: 200,
                body: r#"[{"id": "B1", "internalipaddress": "192.168.1.10"}]"#.to_string(),
            });
        }

        let raw = self
            .levels
            .lock()
            .unwrap()
            .pop_front()
            .expect("more sensor fetches than scripted levels");
        Ok(HttpResponse {
            status: 200,
            body: format!(r#"{{"state": {{"lightlevel": {}}}}}"#, raw),
        })
    }
}

#[derive(Default)]
struct RecordingSink {
    levels: Mutex<Vec<u32>>,
    faults: Mutex<Vec<bool>>,
}

#[async_trait]
impl OutputSink for RecordingSink {
    async fn update_level(&self, level: u32) {
        self.levels.lock().unwrap().push(level);
    }

    async fn update_fault(&self, fault: bool) {
        self.faults.lock().unwrap().push(fault);
    }
}

fn scenario_config() -> Config {
    serde_json::from_str(
        r#"{
            "bridgeId": "B1",
            "bridgeKey": "K",
            "sensorId": "S1",
            "timeWindow": 120,
            "pollInterval": 30,
            "discoveryUrl": "https://discovery.example.com/"
        }"#,
    )
    .unwrap()
}

fn build_engine(
    script: ScriptedGateway,
) -> (Arc<Engine>, Arc<RecordingSink>, CancellationToken) {
    let settings = scenario_config().validate().unwrap();
    assert_eq!(settings.window_capacity(), 4);

    let http: Arc<dyn HttpClient> = Arc::new(script);
    let directory = Arc::new(GatewayDirectory::new(
        settings.gateway_id.clone(),
        settings.discovery_url.clone(),
        Arc::clone(&http),
    ));
    let tasks = TaskTracker::new();
    let reader = Arc::new(SensorReader::new(
        Arc::clone(&http),
        Arc::clone(&directory),
        settings.access_key.clone(),
        tasks.clone(),
    ));
    let sink = Arc::new(RecordingSink::default());
    let cancel = CancellationToken::new();
    let engine = Arc::new(Engine::new(
        &settings,
        directory,
        reader,
        Arc::clone(&sink) as Arc<dyn OutputSink>,
        cancel.clone(),
        tasks,
    ));
    (engine, sink, cancel)
}

#[tokio::test]
async fn four_successful_ticks_average_over_the_window() {
    // Raw levels convert to 1, 10, 100 and 1 lux
    let (engine, sink, _cancel) = build_engine(ScriptedGateway::new(&[1, 10001, 20001, 1]));

    for _ in 0..4 {
        engine.tick().await;
    }

    // Running means: 1, (1+10)/2, (1+10+100)/3, (1+10+100+1)/4
    assert_eq!(*sink.levels.lock().unwrap(), vec![1, 6, 37, 28]);
    assert_eq!(*sink.faults.lock().unwrap(), vec![false; 4]);
}

#[tokio::test]
async fn fifth_tick_evicts_the_oldest_reading() {
    let (engine, sink, _cancel) =
        build_engine(ScriptedGateway::new(&[1, 10001, 20001, 1, 10001]));

    for _ in 0..5 {
        engine.tick().await;
    }

    // After tick 5 the first reading (1 lux) is gone:
    // mean(10, 100, 1, 10) = 30.25 -> 30
    let levels = sink.levels.lock().unwrap();
    assert_eq!(levels.len(), 5);
    assert_eq!(levels[4], 30);
}

#[tokio::test]
async fn scheduler_delivers_results_without_manual_ticks() {
    let (engine, sink, cancel) = build_engine(ScriptedGateway::new(&[1; 32]));

    let handle = tokio::spawn(Arc::clone(&engine).run());

    // First tick fires immediately; give it a moment to land
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        if !sink.levels.lock().unwrap().is_empty() {
            break;
        }
    }

    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(sink.levels.lock().unwrap().first(), Some(&1));
    assert_eq!(sink.faults.lock().unwrap().first(), Some(&false));
}

#[tokio::test]
async fn incomplete_configuration_never_schedules() {
    let config: Config =
        serde_json::from_str(r#"{"bridgeId": "B1", "bridgeKey": "K"}"#).unwrap();

    let err = luxmeter::run(config).await.unwrap_err();
    assert!(err.to_string().contains("sensorId"));
}
