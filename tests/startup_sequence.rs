//! End-to-end orchestration scenarios.
//!
//! The scenarios share the process-wide logger, so they run inside a single
//! test body in a fixed order; exact flush accounting depends on it.

use std::fs;
use std::net::TcpListener as StdTcpListener;
use std::sync::{Arc, Mutex};

use app_bootstrap::{AppIdentity, LoggerHandle, LoggerPhase, Startup};

fn test_startup() -> Startup {
    Startup::with_identity(vec![], AppIdentity::new("boot-test", "0.0.0"))
}

#[tokio::test]
async fn test_run_sequences_phases_and_flushes_once() {
    let startup = test_startup();
    let logger = startup.logger().clone();

    // Bootstrap phase: most verbose floor, before any reconfiguration.
    let state = logger.state();
    assert_eq!(state.phase(), LoggerPhase::Bootstrap);
    assert_eq!(state.min_level(), "debug");

    // Repeated bootstrap yields the same process-wide handle.
    let second = LoggerHandle::bootstrap(AppIdentity::new("other", "9.9.9"));
    assert!(Arc::ptr_eq(&logger.state(), &second.state()));
    assert_eq!(second.identity().name(), "boot-test");

    // --- clean run -------------------------------------------------------

    let log_file = std::env::temp_dir().join(format!("boot-test-{}.jsonl", std::process::id()));
    let _ = fs::remove_file(&log_file);

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let flushes = logger.flushes();

    let startup = startup
        .add_services({
            let order = order.clone();
            let log_file = log_file.clone();
            move |builder| {
                order.lock().unwrap().push("services");
                builder.config_mut().listener.bind_address = "127.0.0.1:0".into();
                builder.config_mut().logging.file = Some(log_file);
                builder.registry_mut().contribute_log_field("component", "test");
                builder.registry_mut().contribute_log_directive("hyper=warn");
                Ok(())
            }
        })
        .configure_request_pipeline({
            let order = order.clone();
            move |app| {
                order.lock().unwrap().push("pipeline");
                app.shutdown_handle().trigger();
                Ok(())
            }
        });

    assert_eq!(startup.run().await, 0);
    assert_eq!(*order.lock().unwrap(), vec!["services", "pipeline"]);
    assert_eq!(logger.flushes(), flushes + 1);

    // Runtime phase: info floor plus the registry directive.
    let state = logger.state();
    assert_eq!(state.phase(), LoggerPhase::Runtime);
    assert_eq!(state.min_level(), "info,hyper=warn");

    // The file sink saw the post-upgrade records as enriched JSON lines.
    let contents = fs::read_to_string(&log_file).unwrap();
    let messages: Vec<String> = contents
        .lines()
        .map(|line| {
            let record: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(record["app"], "boot-test");
            assert_eq!(record["component"], "test");
            assert!(record["machine"].is_string());
            record["message"].as_str().unwrap().to_string()
        })
        .collect();
    assert!(messages.iter().any(|m| m == "Configuring the request pipeline"));
    assert!(messages.iter().any(|m| m == "Cocked, locked and ready to rock!"));
    assert!(messages.iter().any(|m| m == "I love you buhbye!"));
    let _ = fs::remove_file(&log_file);

    // --- AddServices failure ---------------------------------------------

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let flushes = logger.flushes();

    let startup = test_startup()
        .add_services({
            let order = order.clone();
            move |_builder| {
                order.lock().unwrap().push("services");
                Err("service wiring exploded".into())
            }
        })
        .configure_request_pipeline({
            let order = order.clone();
            move |_app| {
                order.lock().unwrap().push("pipeline");
                Ok(())
            }
        });

    assert_eq!(startup.run().await, 1);
    assert_eq!(*order.lock().unwrap(), vec!["services"]);
    assert_eq!(logger.flushes(), flushes + 1);

    // --- malformed logging declaration from the configuration source -----

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let flushes = logger.flushes();

    let startup = test_startup()
        .add_services(|builder| {
            builder.config_mut().logging.level = Some("not a directive!!!".into());
            Ok(())
        })
        .configure_request_pipeline({
            let order = order.clone();
            move |_app| {
                order.lock().unwrap().push("pipeline");
                Ok(())
            }
        });

    assert_eq!(startup.run().await, 1);
    assert!(order.lock().unwrap().is_empty());
    assert_eq!(logger.flushes(), flushes + 1);

    // --- ConfigureRequestPipeline failure --------------------------------

    let flushes = logger.flushes();

    let startup = test_startup()
        .add_services(|builder| {
            builder.config_mut().listener.bind_address = "127.0.0.1:0".into();
            Ok(())
        })
        .configure_request_pipeline(|_app| Err("pipeline wiring exploded".into()));

    assert_eq!(startup.run().await, 1);
    assert_eq!(logger.flushes(), flushes + 1);

    // --- Run-phase failure (address already in use) ----------------------

    let blocker = StdTcpListener::bind("127.0.0.1:0").unwrap();
    let occupied = blocker.local_addr().unwrap().to_string();

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let flushes = logger.flushes();

    let startup = test_startup()
        .add_services({
            move |builder| {
                builder.config_mut().listener.bind_address = occupied;
                Ok(())
            }
        })
        .configure_request_pipeline({
            let order = order.clone();
            move |_app| {
                order.lock().unwrap().push("pipeline");
                Ok(())
            }
        });

    assert_eq!(startup.run().await, 1);
    assert_eq!(*order.lock().unwrap(), vec!["pipeline"]);
    assert_eq!(logger.flushes(), flushes + 1);
    drop(blocker);
}
