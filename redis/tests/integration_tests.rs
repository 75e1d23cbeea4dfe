//! Integration tests for [`RedisBrokerConnector`] with a real Redis instance.
//!
//! # Running These Tests
//!
//! These tests are marked as `#[ignore]` by default because they require
//! Docker to be running (for testcontainers).
//!
//! To run explicitly:
//! ```bash
//! cargo test -p analytics-managers-redis --test integration_tests -- --ignored
//! ```

#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use analytics_managers_core::{BrokerConnector, BrokerPool, ClientError, Encoding};
use analytics_managers_redis::RedisBrokerConnector;
use std::time::Duration;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::{REDIS_PORT, Redis};

/// Start Redis and return the container with its base URL.
async fn start_redis() -> (ContainerAsync<Redis>, String) {
    let container = Redis::default()
        .start()
        .await
        .expect("Failed to start Redis container");
    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(REDIS_PORT)
        .await
        .expect("Failed to get port");
    (container, format!("redis://{host}:{port}"))
}

#[tokio::test]
#[ignore]
async fn test_pool_round_trip_and_close() {
    let (_container, url) = start_redis().await;
    let connector = RedisBrokerConnector::builder()
        .connection_timeout(Duration::from_secs(5))
        .build();

    let pool = connector
        .create_pool(&format!("{url}/0"), Encoding::Utf8)
        .await
        .expect("Failed to create pool");

    let mut conn = pool.connection().expect("Pool should be open");
    let _: () = redis::cmd("SET")
        .arg("analytics:test")
        .arg("ciao")
        .query_async(&mut *conn)
        .await
        .expect("SET failed");
    let value: String = redis::cmd("GET")
        .arg("analytics:test")
        .query_async(&mut *conn)
        .await
        .expect("GET failed");
    assert_eq!(value, "ciao");
    drop(conn);

    pool.close();
    tokio::time::timeout(Duration::from_secs(5), pool.wait_closed())
        .await
        .expect("wait_closed timed out")
        .expect("wait_closed failed");
    assert!(matches!(pool.connection(), Err(ClientError::Closed)));
}

#[tokio::test]
#[ignore]
async fn test_pools_on_distinct_databases_are_independent() {
    let (_container, url) = start_redis().await;
    let connector = RedisBrokerConnector::new();

    let ios = connector
        .create_pool(&format!("{url}/1"), Encoding::Utf8)
        .await
        .expect("Failed to create iOS pool");
    let android = connector
        .create_pool(&format!("{url}/2"), Encoding::Utf8)
        .await
        .expect("Failed to create Android pool");

    let mut ios_conn = ios.connection().expect("iOS pool should be open");
    let _: () = redis::cmd("SET")
        .arg("queue")
        .arg("ios")
        .query_async(&mut *ios_conn)
        .await
        .expect("SET failed");

    let mut android_conn = android.connection().expect("Android pool should be open");
    let value: Option<String> = redis::cmd("GET")
        .arg("queue")
        .query_async(&mut *android_conn)
        .await
        .expect("GET failed");
    assert_eq!(value, None);
    drop(ios_conn);
    drop(android_conn);

    ios.close();
    android.close();
    ios.wait_closed().await.expect("iOS wait_closed failed");
    android.wait_closed().await.expect("Android wait_closed failed");
}

#[tokio::test]
#[ignore]
async fn test_wait_closed_waits_for_held_connection() {
    let (_container, url) = start_redis().await;
    let pool = RedisBrokerConnector::new()
        .create_pool(&format!("{url}/0"), Encoding::Utf8)
        .await
        .expect("Failed to create pool");

    let mut conn = pool.connection().expect("Pool should be open");
    let _: String = redis::cmd("PING")
        .query_async(&mut *conn)
        .await
        .expect("PING failed");

    pool.close();
    assert_eq!(pool.outstanding_connections(), 1);
    assert!(
        tokio::time::timeout(Duration::from_millis(200), pool.wait_closed())
            .await
            .is_err(),
        "wait_closed must not resolve while a connection is held"
    );

    drop(conn);
    tokio::time::timeout(Duration::from_secs(5), pool.wait_closed())
        .await
        .expect("wait_closed timed out")
        .expect("wait_closed failed");
}
