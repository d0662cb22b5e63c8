//! Process-wide registry of travel-time table constructors.
//!
//! Tables are addressed by type name, mirroring how locators are wired
//! from configuration: `registry::create("homogeneous")` yields a fresh
//! boxed table on which the caller then selects a model. The built-in
//! [`HomogeneousTable`](super::homogeneous::HomogeneousTable) is
//! registered on first use; external crates add their own types with
//! [`register`].

use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::RwLock;
use tracing::debug;

use super::homogeneous::HomogeneousTable;
use super::TravelTimeTable;

/// Constructor stored per type name.
pub type TravelTimeTableFactory = fn() -> Box<dyn TravelTimeTable>;

static REGISTRY: LazyLock<RwLock<HashMap<String, TravelTimeTableFactory>>> =
    LazyLock::new(|| {
        let mut map: HashMap<String, TravelTimeTableFactory> = HashMap::new();
        map.insert("homogeneous".to_string(), || {
            Box::new(HomogeneousTable::new())
        });
        RwLock::new(map)
    });

/// Register a constructor under `type_name`, replacing any previous one.
pub fn register(type_name: &str, factory: TravelTimeTableFactory) {
    REGISTRY.write().insert(type_name.to_string(), factory);
    debug!(type_name, "registered travel time table type");
}

/// Instantiate a travel-time table by type name.
///
/// Return
/// ------
/// * A fresh table, or `None` when the name is not registered.
pub fn create(type_name: &str) -> Option<Box<dyn TravelTimeTable>> {
    REGISTRY.read().get(type_name).map(|factory| factory())
}

/// Names currently registered, in unspecified order.
pub fn registered_types() -> Vec<String> {
    REGISTRY.read().keys().cloned().collect()
}

#[cfg(test)]
mod registry_test {
    use super::*;
    use crate::travel_time::{Hypocenter, Receiver, TravelTime, TravelTimeList};
    use crate::hypodepth_errors::HypodepthError;

    struct NullTable;

    impl TravelTimeTable for NullTable {
        fn set_model(&mut self, _model: &str) -> bool {
            true
        }

        fn compute_phase(
            &self,
            phase: &str,
            _source: &Hypocenter,
            _receiver: &Receiver,
        ) -> Result<TravelTime, HypodepthError> {
            Ok(TravelTime::new(phase, 0.0))
        }

        fn compute_all(
            &self,
            _source: &Hypocenter,
            _receiver: &Receiver,
        ) -> Result<TravelTimeList, HypodepthError> {
            Ok(TravelTimeList::new())
        }
    }

    #[test]
    fn test_builtin_homogeneous_is_registered() {
        assert!(create("homogeneous").is_some());
        assert!(registered_types().contains(&"homogeneous".to_string()));
    }

    #[test]
    fn test_unknown_type_yields_none() {
        assert!(create("no-such-table").is_none());
    }

    #[test]
    fn test_register_custom_type() {
        register("null", || Box::new(NullTable));
        let table = create("null").expect("registered type must resolve");
        let src = Hypocenter::new(0.0, 0.0, 10.0);
        let rcv = Receiver::new(10.0, 10.0, 0.0);
        assert_eq!(table.compute_phase("P", &src, &rcv).unwrap().time, 0.0);
    }
}
