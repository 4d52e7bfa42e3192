//! Behaviour every [`Adapter`] must share.
//!
//! Each check takes a fresh, empty adapter and panics on the first
//! violation. Backends outside this crate run the whole suite with
//! [`adapter_conformance_tests!`](crate::adapter_conformance_tests):
//!
//! ```ignore
//! mod my_backend {
//!     gatekeeper_lib::adapter_conformance_tests!(MyAdapter::connect_for_tests());
//! }
//! ```

use std::collections::BTreeSet;

use crate::adapter::{Adapter, GateValues, ADAPTER_VERSION};
use crate::types::{Percentage, Target};

const FEATURE: &str = "stats";

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn percent(value: i64) -> Percentage {
    match Percentage::new(value) {
        Ok(p) => p,
        Err(e) => panic!("{}", e),
    }
}

fn enable(adapter: &dyn Adapter, target: Target) {
    assert_eq!(true, adapter.enable(FEATURE, &target).unwrap(), "enable {:?}", target);
}

fn disable(adapter: &dyn Adapter, target: Target) {
    assert_eq!(true, adapter.disable(FEATURE, &target).unwrap(), "disable {:?}", target);
}

fn enable_every_gate(adapter: &dyn Adapter) {
    enable(adapter, Target::boolean(true));
    enable(adapter, Target::group("admins"));
    enable(adapter, Target::actor("22"));
    enable(adapter, Target::percentage_of_actors(percent(25)));
    enable(adapter, Target::percentage_of_time(percent(45)));
}

pub fn has_name(adapter: &dyn Adapter) {
    assert!(!adapter.name().is_empty());
}

pub fn knows_version(adapter: &dyn Adapter) {
    assert_eq!(ADAPTER_VERSION, adapter.version());
}

pub fn returns_correct_default_values_for_gates_if_none_are_enabled(adapter: &dyn Adapter) {
    assert_eq!(GateValues::default(), adapter.get(FEATURE).unwrap());
}

pub fn can_enable_disable_and_get_value_for_boolean_gate(adapter: &dyn Adapter) {
    enable(adapter, Target::boolean(true));
    assert_eq!(Some("true"), adapter.get(FEATURE).unwrap().boolean.as_deref());
    disable(adapter, Target::boolean(false));
    assert_eq!(None, adapter.get(FEATURE).unwrap().boolean);
}

pub fn fully_disables_all_enabled_things_when_boolean_gate_disabled(adapter: &dyn Adapter) {
    enable_every_gate(adapter);
    disable(adapter, Target::boolean(false));
    assert_eq!(GateValues::default(), adapter.get(FEATURE).unwrap());
}

pub fn can_enable_disable_get_value_for_group_gate(adapter: &dyn Adapter) {
    enable(adapter, Target::group("admins"));
    enable(adapter, Target::group("early_access"));
    assert_eq!(set(&["admins", "early_access"]), adapter.get(FEATURE).unwrap().groups);

    disable(adapter, Target::group("early_access"));
    assert_eq!(set(&["admins"]), adapter.get(FEATURE).unwrap().groups);

    disable(adapter, Target::group("admins"));
    assert_eq!(set(&[]), adapter.get(FEATURE).unwrap().groups);
}

pub fn can_enable_disable_and_get_value_for_an_actor_gate(adapter: &dyn Adapter) {
    enable(adapter, Target::actor("22"));
    enable(adapter, Target::actor("asdf"));
    assert_eq!(set(&["22", "asdf"]), adapter.get(FEATURE).unwrap().actors);

    disable(adapter, Target::actor("22"));
    assert_eq!(set(&["asdf"]), adapter.get(FEATURE).unwrap().actors);

    disable(adapter, Target::actor("asdf"));
    assert_eq!(set(&[]), adapter.get(FEATURE).unwrap().actors);
}

pub fn enabling_the_same_value_twice_is_idempotent(adapter: &dyn Adapter) {
    enable(adapter, Target::actor("22"));
    enable(adapter, Target::actor("22"));
    enable(adapter, Target::group("admins"));
    enable(adapter, Target::group("admins"));
    let values = adapter.get(FEATURE).unwrap();
    assert_eq!(set(&["22"]), values.actors);
    assert_eq!(set(&["admins"]), values.groups);

    disable(adapter, Target::actor("22"));
    disable(adapter, Target::actor("22"));
    assert_eq!(set(&[]), adapter.get(FEATURE).unwrap().actors);
}

pub fn can_enable_disable_get_value_for_percentage_of_actors_gate(adapter: &dyn Adapter) {
    enable(adapter, Target::percentage_of_actors(percent(15)));
    assert_eq!(
        Some("15"),
        adapter.get(FEATURE).unwrap().percentage_of_actors.as_deref()
    );

    disable(adapter, Target::percentage_of_actors(percent(0)));
    assert_eq!(
        Some("0"),
        adapter.get(FEATURE).unwrap().percentage_of_actors.as_deref()
    );
}

pub fn can_enable_percentage_of_actors_gate_many_times_and_consistently_return_values(
    adapter: &dyn Adapter,
) {
    for p in 1..=100 {
        enable(adapter, Target::percentage_of_actors(percent(p)));
        let result = adapter.get(FEATURE).unwrap();
        assert_eq!(Some(p.to_string()), result.percentage_of_actors);
    }
}

pub fn can_disable_percentage_of_actors_gate_many_times_and_consistently_return_values(
    adapter: &dyn Adapter,
) {
    for p in 1..=100 {
        disable(adapter, Target::percentage_of_actors(percent(p)));
        let result = adapter.get(FEATURE).unwrap();
        assert_eq!(Some(p.to_string()), result.percentage_of_actors);
    }
}

pub fn can_enable_disable_and_get_value_for_percentage_of_time_gate(adapter: &dyn Adapter) {
    enable(adapter, Target::percentage_of_time(percent(10)));
    assert_eq!(
        Some("10"),
        adapter.get(FEATURE).unwrap().percentage_of_time.as_deref()
    );

    disable(adapter, Target::percentage_of_time(percent(0)));
    assert_eq!(
        Some("0"),
        adapter.get(FEATURE).unwrap().percentage_of_time.as_deref()
    );
}

pub fn can_enable_percentage_of_time_gate_many_times_and_consistently_return_values(
    adapter: &dyn Adapter,
) {
    for p in 1..=100 {
        enable(adapter, Target::percentage_of_time(percent(p)));
        let result = adapter.get(FEATURE).unwrap();
        assert_eq!(Some(p.to_string()), result.percentage_of_time);
    }
}

pub fn can_disable_percentage_of_time_gate_many_times_and_consistently_return_values(
    adapter: &dyn Adapter,
) {
    for p in 1..=100 {
        disable(adapter, Target::percentage_of_time(percent(p)));
        let result = adapter.get(FEATURE).unwrap();
        assert_eq!(Some(p.to_string()), result.percentage_of_time);
    }
}

pub fn converts_boolean_value_to_a_string(adapter: &dyn Adapter) {
    enable(adapter, Target::boolean(true));
    assert_eq!(Some("true"), adapter.get(FEATURE).unwrap().boolean.as_deref());
}

pub fn converts_the_actor_value_to_a_string(adapter: &dyn Adapter) {
    enable(adapter, Target::actor(&22u64));
    assert_eq!(set(&["22"]), adapter.get(FEATURE).unwrap().actors);
}

pub fn converts_group_value_to_a_string(adapter: &dyn Adapter) {
    enable(adapter, Target::group("admins"));
    assert_eq!(set(&["admins"]), adapter.get(FEATURE).unwrap().groups);
}

pub fn converts_percentage_of_time_integer_value_to_a_string(adapter: &dyn Adapter) {
    enable(adapter, Target::percentage_of_time(percent(10)));
    assert_eq!(
        Some("10"),
        adapter.get(FEATURE).unwrap().percentage_of_time.as_deref()
    );
}

pub fn converts_percentage_of_actors_integer_value_to_a_string(adapter: &dyn Adapter) {
    enable(adapter, Target::percentage_of_actors(percent(10)));
    assert_eq!(
        Some("10"),
        adapter.get(FEATURE).unwrap().percentage_of_actors.as_deref()
    );
}

pub fn can_add_remove_and_list_known_features(adapter: &dyn Adapter) {
    assert_eq!(set(&[]), adapter.features().unwrap());

    assert_eq!(true, adapter.add("stats").unwrap());
    assert_eq!(set(&["stats"]), adapter.features().unwrap());

    assert_eq!(true, adapter.add("search").unwrap());
    assert_eq!(set(&["stats", "search"]), adapter.features().unwrap());

    // adding again changes nothing
    assert_eq!(true, adapter.add("search").unwrap());
    assert_eq!(set(&["stats", "search"]), adapter.features().unwrap());

    assert_eq!(true, adapter.remove("stats").unwrap());
    assert_eq!(set(&["search"]), adapter.features().unwrap());

    assert_eq!(true, adapter.remove("search").unwrap());
    assert_eq!(set(&[]), adapter.features().unwrap());

    // removing something unknown still succeeds
    assert_eq!(true, adapter.remove("search").unwrap());
    assert_eq!(set(&[]), adapter.features().unwrap());
}

pub fn clears_all_the_gate_values_for_the_feature_on_remove(adapter: &dyn Adapter) {
    enable_every_gate(adapter);
    assert_eq!(true, adapter.remove(FEATURE).unwrap());
    assert_eq!(GateValues::default(), adapter.get(FEATURE).unwrap());
}

pub fn can_clear_all_the_gate_values_for_a_feature(adapter: &dyn Adapter) {
    adapter.add(FEATURE).unwrap();
    assert!(adapter.features().unwrap().contains(FEATURE));

    enable_every_gate(adapter);

    assert_eq!(true, adapter.clear(FEATURE).unwrap());
    assert!(adapter.features().unwrap().contains(FEATURE));
    assert_eq!(GateValues::default(), adapter.get(FEATURE).unwrap());
}

pub fn does_not_complain_clearing_a_feature_that_does_not_exist_in_adapter(adapter: &dyn Adapter) {
    assert_eq!(true, adapter.clear(FEATURE).unwrap());
    assert_eq!(true, adapter.clear(FEATURE).unwrap());
    assert_eq!(set(&[]), adapter.features().unwrap());
}

pub fn gate_operations_do_not_touch_other_features(adapter: &dyn Adapter) {
    enable_every_gate(adapter);
    assert_eq!(GateValues::default(), adapter.get("search").unwrap());

    adapter.enable("search", &Target::actor("22")).unwrap();
    disable(adapter, Target::boolean(false));
    assert_eq!(set(&["22"]), adapter.get("search").unwrap().actors);
}

pub fn get_multi_returns_every_requested_feature(adapter: &dyn Adapter) {
    enable(adapter, Target::group("admins"));
    let values = adapter.get_multi(&[FEATURE, "search"]).unwrap();
    assert_eq!(2, values.len());
    assert_eq!(set(&["admins"]), values[FEATURE].groups);
    assert_eq!(GateValues::default(), values["search"]);
}

/// Generates one `#[test]` per conformance check. The argument is evaluated
/// once per test and must produce a fresh, empty adapter.
#[macro_export]
macro_rules! adapter_conformance_tests {
    ($make:expr) => {
        $crate::adapter_conformance_tests!(@tests $make;
            has_name,
            knows_version,
            returns_correct_default_values_for_gates_if_none_are_enabled,
            can_enable_disable_and_get_value_for_boolean_gate,
            fully_disables_all_enabled_things_when_boolean_gate_disabled,
            can_enable_disable_get_value_for_group_gate,
            can_enable_disable_and_get_value_for_an_actor_gate,
            enabling_the_same_value_twice_is_idempotent,
            can_enable_disable_get_value_for_percentage_of_actors_gate,
            can_enable_percentage_of_actors_gate_many_times_and_consistently_return_values,
            can_disable_percentage_of_actors_gate_many_times_and_consistently_return_values,
            can_enable_disable_and_get_value_for_percentage_of_time_gate,
            can_enable_percentage_of_time_gate_many_times_and_consistently_return_values,
            can_disable_percentage_of_time_gate_many_times_and_consistently_return_values,
            converts_boolean_value_to_a_string,
            converts_the_actor_value_to_a_string,
            converts_group_value_to_a_string,
            converts_percentage_of_time_integer_value_to_a_string,
            converts_percentage_of_actors_integer_value_to_a_string,
            can_add_remove_and_list_known_features,
            clears_all_the_gate_values_for_the_feature_on_remove,
            can_clear_all_the_gate_values_for_a_feature,
            does_not_complain_clearing_a_feature_that_does_not_exist_in_adapter,
            gate_operations_do_not_touch_other_features,
            get_multi_returns_every_requested_feature,
        );
    };
    (@tests $make:expr; $($check:ident),* $(,)?) => {
        $(
            #[test]
            fn $check() {
                let adapter = $make;
                $crate::conformance::$check(&adapter);
            }
        )*
    };
}

