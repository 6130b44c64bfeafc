#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end synchronization scenarios against the public registry API.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use consumer_registry::domain::test_support::{consumer_body, test_provider};
use consumer_registry::{
    ConsumerRegistryConfig, ConsumerRegistryLocalClient, PluginRegistry, Service,
};
use consumer_registry_sdk::{ConsumerRegistryClient, ConsumerView, Snapshot};
use key_auth_plugin::{KeyAuthConsumerConfig, KeyAuthPlugin};
use limit_req_plugin::{LimitReq, LimitReqPlugin};
use serde_json::json;
use tracing_test::traced_test;

fn real_plugins() -> Arc<PluginRegistry> {
    let mut registry = PluginRegistry::new();
    registry
        .register_auth(key_auth_plugin::PLUGIN_NAME, Arc::new(KeyAuthPlugin::new()))
        .unwrap();
    registry
        .register_filter(limit_req_plugin::PLUGIN_NAME, Arc::new(LimitReqPlugin::new()))
        .unwrap();
    Arc::new(registry)
}

fn client(config: ConsumerRegistryConfig) -> (Arc<Service>, ConsumerRegistryLocalClient) {
    let svc = Arc::new(Service::new(real_plugins(), config));
    let client = ConsumerRegistryLocalClient::new(Arc::clone(&svc));
    (svc, client)
}

#[test]
fn alice_is_resolved_by_her_key() {
    let (_, registry) = client(ConsumerRegistryConfig::default());
    let snapshot = Snapshot::from_value(json!({
        "ns1": {
            "alice": {
                "v": "1",
                "d": r#"{"name":"alice","auth":{"key-auth":"{\"key\":\"rumia\"}"}}"#
            }
        }
    }))
    .unwrap();

    registry.update(&snapshot);

    let alice = registry.lookup("ns1", "key-auth", "rumia").unwrap();
    assert_eq!(alice.name(), "alice");
    let cfg = alice
        .plugin_config("key-auth")
        .and_then(|c| c.as_any().downcast_ref::<KeyAuthConsumerConfig>())
        .unwrap();
    assert_eq!(cfg.key, "rumia");

    assert!(registry.lookup("ns1", "key-auth", "marisa").is_none());
    assert!(registry.lookup("ns2", "key-auth", "rumia").is_none());
    assert!(registry.lookup("ns1", "basic-auth", "rumia").is_none());

    let resolved = KeyAuthPlugin::authenticate(&registry, "ns1", "rumia").unwrap();
    assert_eq!(KeyAuthPlugin::consumer_config(resolved.as_ref()).unwrap().key, "rumia");
}

#[test]
fn consumer_without_filters_serialized_as_null_is_indexed() {
    let (_, registry) = client(ConsumerRegistryConfig::default());
    let snapshot = Snapshot::from_value(json!({
        "ns1": {
            "alice": {
                "v": "1",
                "d": r#"{"name":"alice","auth":{"key-auth":"{\"key\":\"abc\"}"},"filters":null}"#
            }
        }
    }))
    .unwrap();

    registry.update(&snapshot);

    let alice = registry.lookup("ns1", "key-auth", "abc").unwrap();
    assert_eq!(alice.name(), "alice");
    assert!(alice.filter_configs().is_empty());
}

#[test]
fn null_namespace_clears_only_that_namespace() {
    let (svc, registry) = client(ConsumerRegistryConfig::default());
    svc.update(
        &Snapshot::new()
            .with_consumer("ns1", "alice", "1", consumer_body("alice", &[("key-auth", "a")]))
            .with_consumer("ns2", "bob", "1", consumer_body("bob", &[("key-auth", "b")])),
    );

    let summary = svc.update(
        &Snapshot::from_json_str(&format!(
            r#"{{"ns1": {{"alice": {}}}, "ns2": null}}"#,
            json!({"v": "1", "d": consumer_body("alice", &[("key-auth", "a")])})
        ))
        .unwrap(),
    );

    assert_eq!(summary.namespaces_synced, 2);
    assert_eq!(summary.consumers_reused, 1);
    assert!(registry.lookup("ns1", "key-auth", "a").is_some());
    assert!(registry.lookup("ns2", "key-auth", "b").is_none());
}

#[test]
fn consumer_filters_are_parsed_in_order() {
    let (_, registry) = client(ConsumerRegistryConfig::default());
    let body = json!({
        "name": "alice",
        "auth": {"key-auth": r#"{"key":"rumia"}"#},
        "filters": {"limit-req": {"config": {"average": 4, "burst": 2, "period": "2s"}}}
    })
    .to_string();

    registry.update(&Snapshot::new().with_consumer("ns1", "alice", "1", body));

    let alice = registry.consumer("ns1", "alice").unwrap();
    let filters = alice.filter_configs();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0].name, "limit-req");
    assert_eq!(
        filters[0].parsed_as::<LimitReq>(),
        Some(&LimitReq {
            bucket: "ns1/alice".to_owned(),
            interval: Duration::from_millis(500),
            burst: 2,
        })
    );
}

#[test]
fn reapplying_a_snapshot_reuses_every_consumer() {
    let (provider, key_auth) = test_provider();
    let svc = Service::new(provider, ConsumerRegistryConfig::default());
    let snapshot = Snapshot::new()
        .with_consumer("ns1", "alice", "1", consumer_body("alice", &[("key-auth", "a")]))
        .with_consumer("ns1", "bob", "1", consumer_body("bob", &[("key-auth", "b")]));

    svc.update(&snapshot);
    let before = svc.current();
    let created = key_auth.created();

    let summary = svc.update(&snapshot);
    let after = svc.current();

    assert_eq!(key_auth.created(), created);
    assert_eq!(summary.consumers_reused, 2);
    assert_eq!(summary.consumers_built, 0);
    for name in ["alice", "bob"] {
        assert!(Arc::ptr_eq(
            before.consumer("ns1", name).unwrap(),
            after.consumer("ns1", name).unwrap()
        ));
    }
    assert_eq!(
        before.stats().index_entries,
        after.stats().index_entries
    );
}

#[test]
fn version_change_rebuilds_only_that_consumer() {
    let (svc, _) = client(ConsumerRegistryConfig::default());
    svc.update(
        &Snapshot::new()
            .with_consumer("ns1", "alice", "1", consumer_body("alice", &[("key-auth", "old")]))
            .with_consumer("ns1", "bob", "1", consumer_body("bob", &[("key-auth", "b")])),
    );
    let bob_before = svc.consumer("ns1", "bob").unwrap();

    svc.update(
        &Snapshot::new()
            .with_consumer("ns1", "alice", "2", consumer_body("alice", &[("key-auth", "new")]))
            .with_consumer("ns1", "bob", "1", consumer_body("bob", &[("key-auth", "b")])),
    );

    assert!(svc.lookup("ns1", "key-auth", "old").is_none());
    assert_eq!(svc.lookup("ns1", "key-auth", "new").unwrap().resource_version(), "2");
    assert!(Arc::ptr_eq(&bob_before, &svc.consumer("ns1", "bob").unwrap()));
}

#[test]
fn unchanged_version_ignores_a_changed_body() {
    let (svc, _) = client(ConsumerRegistryConfig::default());
    svc.update(&Snapshot::new().with_consumer(
        "ns1",
        "alice",
        "1",
        consumer_body("alice", &[("key-auth", "a")]),
    ));
    svc.update(&Snapshot::new().with_consumer(
        "ns1",
        "alice",
        "1",
        consumer_body("alice", &[("key-auth", "z")]),
    ));

    assert!(svc.lookup("ns1", "key-auth", "a").is_some());
    assert!(svc.lookup("ns1", "key-auth", "z").is_none());
}

#[test]
fn removed_consumers_disappear_from_both_indexes() {
    let (svc, _) = client(ConsumerRegistryConfig::default());
    svc.update(
        &Snapshot::new()
            .with_consumer("ns1", "alice", "1", consumer_body("alice", &[("key-auth", "a")]))
            .with_consumer("ns1", "bob", "1", consumer_body("bob", &[("key-auth", "b")])),
    );

    svc.update(&Snapshot::new().with_consumer(
        "ns1",
        "alice",
        "1",
        consumer_body("alice", &[("key-auth", "a")]),
    ));

    assert!(svc.consumer("ns1", "bob").is_none());
    assert!(svc.lookup("ns1", "key-auth", "b").is_none());
    assert!(svc.lookup("ns1", "key-auth", "a").is_some());
}

#[test]
#[traced_test]
fn duplicate_keys_keep_the_first_consumer() {
    let (svc, _) = client(ConsumerRegistryConfig::default());
    let summary = svc.update(
        &Snapshot::new()
            .with_consumer("ns1", "alice", "1", consumer_body("alice", &[("key-auth", "shared")]))
            .with_consumer("ns1", "bob", "1", consumer_body("bob", &[("key-auth", "shared")])),
    );

    assert_eq!(summary.index_collisions, 1);
    assert_eq!(svc.lookup("ns1", "key-auth", "shared").unwrap().spec().name, "alice");
    assert!(svc.consumer("ns1", "bob").is_some());
    assert!(logs_contain("duplicate index 'shared' for plugin 'key-auth' in namespace 'ns1'"));
    assert!(logs_contain("consumer 'bob' ignored, 'alice' kept"));
}

#[test]
#[traced_test]
fn failing_consumer_does_not_affect_siblings() {
    let (svc, registry) = client(ConsumerRegistryConfig::default());
    let bad_filter = json!({
        "name": "carol",
        "auth": {"key-auth": r#"{"key":"c"}"#},
        "filters": {"limit-req": {"config": {"average": 0}}}
    })
    .to_string();

    let summary = svc.update(
        &Snapshot::new()
            .with_consumer("ns1", "alice", "1", consumer_body("alice", &[("key-auth", "a")]))
            .with_consumer("ns1", "bob", "1", consumer_body("bob", &[("key-auth", "")]))
            .with_consumer("ns1", "carol", "1", bad_filter)
            .with_consumer("ns1", "dave", "1", consumer_body("dave", &[("basic-auth", "d")])),
    );

    assert_eq!(summary.consumers_built, 1);
    assert_eq!(summary.consumers_rejected, 3);
    assert!(registry.lookup("ns1", "key-auth", "a").is_some());
    assert!(registry.lookup("ns1", "key-auth", "c").is_none());
    assert!(registry.consumer("ns1", "bob").is_none());
    assert!(logs_contain("key must not be empty"));
    assert!(logs_contain("average must be greater than 0"));
    assert!(logs_contain("auth plugin 'basic-auth' not found"));
}

#[test]
fn pruning_drops_namespaces_missing_from_the_snapshot() {
    let two_namespaces = Snapshot::new()
        .with_consumer("ns1", "alice", "1", consumer_body("alice", &[("key-auth", "a")]))
        .with_consumer("ns2", "bob", "1", consumer_body("bob", &[("key-auth", "b")]));
    let only_ns1 = Snapshot::new().with_consumer(
        "ns1",
        "alice",
        "1",
        consumer_body("alice", &[("key-auth", "a")]),
    );

    let (kept, _) = client(ConsumerRegistryConfig::default());
    kept.update(&two_namespaces);
    kept.update(&only_ns1);
    assert!(kept.lookup("ns2", "key-auth", "b").is_some());

    let (pruned, _) = client(ConsumerRegistryConfig {
        prune_missing_namespaces: true,
        ..ConsumerRegistryConfig::default()
    });
    pruned.update(&two_namespaces);
    let summary = pruned.update(&only_ns1);
    assert_eq!(summary.namespaces_pruned, 1);
    assert!(pruned.lookup("ns2", "key-auth", "b").is_none());
    assert_eq!(pruned.stats().namespaces, 1);
}

#[test]
fn readers_never_observe_a_mixed_generation() {
    let (svc, _) = client(ConsumerRegistryConfig::default());
    let done = AtomicBool::new(false);

    let snapshot_for = |round: u64| {
        let version = round.to_string();
        Snapshot::new()
            .with_consumer(
                "ns1",
                "alice",
                version.clone(),
                consumer_body("alice", &[("key-auth", format!("a{round}").as_str())]),
            )
            .with_consumer(
                "ns1",
                "bob",
                version,
                consumer_body("bob", &[("key-auth", format!("b{round}").as_str())]),
            )
    };

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let current = svc.current();
                    let n = current.number();
                    if n == 0 {
                        assert!(current.consumer("ns1", "alice").is_none());
                        continue;
                    }
                    let alice = current.lookup("ns1", "key-auth", &format!("a{n}")).unwrap();
                    let bob = current.lookup("ns1", "key-auth", &format!("b{n}")).unwrap();
                    assert_eq!(alice.resource_version(), n.to_string());
                    assert_eq!(bob.resource_version(), n.to_string());
                    assert!(current.lookup("ns1", "key-auth", &format!("a{}", n + 1)).is_none());
                }
            });
        }

        for round in 1..=50 {
            let summary = svc.update(&snapshot_for(round));
            assert_eq!(summary.generation, round);
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(svc.stats().generation, 50);
}
