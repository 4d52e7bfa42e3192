use std::collections::BTreeSet;
use std::sync::Arc;

use gatekeeper_lib::{
    bucket, Actor, Adapter, Error, FeatureState, Gate, Gatekeeper, GateValues, GroupRegistry,
    MemoryAdapter, Percentage, Target,
};

struct User {
    id: u64,
    admin: bool,
    early_access: bool,
}

impl User {
    fn new(id: u64) -> Self {
        User {
            id,
            admin: false,
            early_access: false,
        }
    }
}

impl Actor for User {
    fn actor_id(&self) -> String {
        self.id.to_string()
    }

    fn capability(&self, name: &str) -> Option<bool> {
        match name {
            "admin" => Some(self.admin),
            "early_access" => Some(self.early_access),
            _ => None,
        }
    }
}

fn gatekeeper() -> Gatekeeper {
    let groups = Arc::new(GroupRegistry::new());
    groups.register("admins", |actor| actor.capability("admin") == Some(true));
    groups.register("early_access", |actor| {
        actor.capability("early_access") == Some(true)
    });
    Gatekeeper::with_groups(Arc::new(MemoryAdapter::new()), groups)
}

fn percent(value: i64) -> Percentage {
    Percentage::new(value).unwrap()
}

#[test]
fn test_unconfigured_feature_is_off() {
    let gk = gatekeeper();
    let user = User::new(1);
    assert_eq!(false, gk.is_enabled("stats", Some(&user)).unwrap());
    assert_eq!(false, gk.is_enabled("stats", None).unwrap());
    assert_eq!(GateValues::default(), gk.feature("stats").unwrap().gate_values().unwrap());
}

#[test]
fn test_boolean_gate_enables_for_everyone() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();
    stats.enable_all().unwrap();
    assert_eq!(true, stats.is_enabled(None).unwrap());
    assert_eq!(true, stats.is_enabled(Some(&User::new(5))).unwrap());
}

#[test]
fn test_group_gate() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();
    stats.enable_group("admins").unwrap();

    let admin = User {
        admin: true,
        ..User::new(1)
    };
    let early = User {
        early_access: true,
        ..User::new(2)
    };
    assert_eq!(true, stats.is_enabled(Some(&admin)).unwrap());
    assert_eq!(false, stats.is_enabled(Some(&early)).unwrap());
    assert_eq!(false, stats.is_enabled(None).unwrap());

    stats.enable_group("early_access").unwrap();
    assert_eq!(true, stats.is_enabled(Some(&early)).unwrap());
}

#[test]
fn test_unregistered_group_is_not_an_error() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();
    stats.enable_group("beta_testers").unwrap();
    let user = User {
        admin: true,
        ..User::new(1)
    };
    assert_eq!(false, stats.is_enabled(Some(&user)).unwrap());

    gk.register_group("beta_testers", |_| true);
    assert_eq!(true, stats.is_enabled(Some(&user)).unwrap());

    gk.unregister_groups();
    assert_eq!(false, stats.is_enabled(Some(&user)).unwrap());
}

#[test]
fn test_actor_gate() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();
    stats.enable_actor(&User::new(22)).unwrap();

    assert_eq!(true, stats.is_enabled(Some(&User::new(22))).unwrap());
    // the numeric id and its string form are the same actor
    assert_eq!(true, stats.is_enabled(Some(&22u64)).unwrap());
    assert_eq!(true, stats.is_enabled(Some(&"22".to_string())).unwrap());
    assert_eq!(false, stats.is_enabled(Some(&User::new(23))).unwrap());

    stats.disable_actor(&22u64).unwrap();
    assert_eq!(false, stats.is_enabled(Some(&User::new(22))).unwrap());
}

#[test]
fn test_percentage_of_actors_is_sticky() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();
    stats.enable_percentage_of_actors(percent(50)).unwrap();

    for id in 0..200u64 {
        let first = stats.is_enabled(Some(&id)).unwrap();
        for _ in 0..3 {
            assert_eq!(first, stats.is_enabled(Some(&id)).unwrap());
        }
        let expected = bucket::bucket("stats", &id.to_string()) < 50;
        assert_eq!(expected, first, "actor {}", id);
    }
}

#[test]
fn test_percentage_of_actors_is_monotonic() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();

    for id in ["22", "asdf", "user-123"] {
        let actor = id.to_string();
        let mut flips = 0;
        let mut previous = false;
        for p in 0..=100 {
            stats.enable_percentage_of_actors(percent(p)).unwrap();
            let enabled = stats.is_enabled(Some(&actor)).unwrap();
            if enabled != previous {
                flips += 1;
                assert_eq!(true, enabled, "actor {} turned off at {}%", id, p);
            }
            previous = enabled;
        }
        assert_eq!(1, flips, "actor {}", id);
    }
}

#[test]
fn test_percentage_of_actors_needs_an_actor() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();
    stats.enable_percentage_of_actors(percent(100)).unwrap();
    assert_eq!(false, stats.is_enabled(None).unwrap());
    assert_eq!(true, stats.is_enabled(Some(&1u64)).unwrap());
}

#[test]
fn test_percentage_of_time() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();

    stats.enable_percentage_of_time(percent(100)).unwrap();
    assert!((0..100).all(|_| stats.is_enabled(None).unwrap()));

    stats.disable_percentage_of_time().unwrap();
    assert!((0..100).all(|_| !stats.is_enabled(None).unwrap()));

    stats.enable_percentage_of_time(percent(50)).unwrap();
    let hits = (0..2_000).filter(|_| stats.is_enabled(None).unwrap()).count();
    assert!((700..1_300).contains(&hits), "got {}", hits);
}

#[test]
fn test_disable_all_wipes_partial_rollouts() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();
    stats.enable_all().unwrap();
    stats.enable_group("admins").unwrap();
    stats.enable_actor(&22u64).unwrap();
    stats.enable_percentage_of_actors(percent(25)).unwrap();
    stats.enable_percentage_of_time(percent(45)).unwrap();

    stats.disable_all().unwrap();
    assert_eq!(GateValues::default(), stats.gate_values().unwrap());
    assert_eq!(FeatureState::Off, stats.state().unwrap());
    assert_eq!(false, stats.is_enabled(Some(&22u64)).unwrap());
    // the feature itself stays known
    assert_eq!(true, stats.exists().unwrap());
}

#[test]
fn test_enable_and_disable_register_the_feature() {
    let gk = gatekeeper();
    gk.enable("stats", &Target::actor(&1u64)).unwrap();
    gk.disable("search", &Target::group("admins")).unwrap();
    assert_eq!(
        BTreeSet::from(["search".to_string(), "stats".to_string()]),
        gk.adapter().features().unwrap()
    );
}

#[test]
fn test_remove_and_clear() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();
    stats.enable_actor(&1u64).unwrap();

    stats.clear().unwrap();
    assert_eq!(true, stats.exists().unwrap());
    assert_eq!(GateValues::default(), stats.gate_values().unwrap());

    stats.enable_actor(&1u64).unwrap();
    stats.remove().unwrap();
    assert_eq!(false, stats.exists().unwrap());
    assert_eq!(GateValues::default(), stats.gate_values().unwrap());
}

#[test]
fn test_malformed_snapshot_fails_loudly() {
    struct Broken;

    impl Adapter for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn features(&self) -> gatekeeper_lib::Result<BTreeSet<String>> {
            Ok(BTreeSet::new())
        }
        fn add(&self, _: &str) -> gatekeeper_lib::Result<bool> {
            Ok(true)
        }
        fn remove(&self, _: &str) -> gatekeeper_lib::Result<bool> {
            Ok(true)
        }
        fn clear(&self, _: &str) -> gatekeeper_lib::Result<bool> {
            Ok(true)
        }
        fn get(&self, _: &str) -> gatekeeper_lib::Result<GateValues> {
            Ok(GateValues {
                percentage_of_time: Some("lots".into()),
                ..Default::default()
            })
        }
        fn enable(&self, _: &str, _: &Target) -> gatekeeper_lib::Result<bool> {
            Ok(true)
        }
        fn disable(&self, _: &str, _: &Target) -> gatekeeper_lib::Result<bool> {
            Ok(true)
        }
    }

    let gk = Gatekeeper::with_groups(Arc::new(Broken), Arc::new(GroupRegistry::new()));
    let err = gk.is_enabled("stats", None).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedValue {
            gate: "percentage_of_time",
            ..
        }
    ));
}

#[test]
fn test_adapter_errors_propagate() {
    struct Down;

    impl Adapter for Down {
        fn name(&self) -> &str {
            "down"
        }
        fn features(&self) -> gatekeeper_lib::Result<BTreeSet<String>> {
            Err(Error::AdapterUnavailable("connection refused".into()))
        }
        fn add(&self, _: &str) -> gatekeeper_lib::Result<bool> {
            Err(Error::AdapterUnavailable("connection refused".into()))
        }
        fn remove(&self, _: &str) -> gatekeeper_lib::Result<bool> {
            Err(Error::AdapterUnavailable("connection refused".into()))
        }
        fn clear(&self, _: &str) -> gatekeeper_lib::Result<bool> {
            Err(Error::AdapterUnavailable("connection refused".into()))
        }
        fn get(&self, _: &str) -> gatekeeper_lib::Result<GateValues> {
            Err(Error::AdapterUnavailable("connection refused".into()))
        }
        fn enable(&self, _: &str, _: &Target) -> gatekeeper_lib::Result<bool> {
            Err(Error::AdapterUnavailable("connection refused".into()))
        }
        fn disable(&self, _: &str, _: &Target) -> gatekeeper_lib::Result<bool> {
            Err(Error::AdapterUnavailable("connection refused".into()))
        }
    }

    let gk = Gatekeeper::with_groups(Arc::new(Down), Arc::new(GroupRegistry::new()));
    assert!(matches!(
        gk.is_enabled("stats", None),
        Err(Error::AdapterUnavailable(_))
    ));
    assert!(matches!(
        gk.enable("stats", &Target::boolean(true)),
        Err(Error::AdapterUnavailable(_))
    ));
}

#[test]
fn test_enabled_gates_reporting() {
    let gk = gatekeeper();
    let stats = gk.feature("stats").unwrap();
    stats.enable_actor(&1u64).unwrap();
    stats.enable_percentage_of_time(percent(5)).unwrap();
    assert_eq!(
        vec![Gate::Actor, Gate::PercentageOfTime],
        stats.enabled_gates().unwrap()
    );
    assert_eq!(FeatureState::Conditional, stats.state().unwrap());
}
