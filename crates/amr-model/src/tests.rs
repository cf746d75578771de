//! Unit tests for amr-model.

use crate::{AmrAbility, AmrKinematics, FleetRegistry, LoadCarrier};

// ── Ability partial order ─────────────────────────────────────────────────────

#[cfg(test)]
mod ability {
    use super::*;

    #[test]
    fn same_carrier_ordered_by_payload() {
        let small = AmrAbility::new(LoadCarrier::Package, 10.0);
        let big = AmrAbility::new(LoadCarrier::Package, 40.0);
        assert!(small <= big);
        assert!(small < big);
        assert!(!(big <= small));
        assert!(small <= small);
    }

    #[test]
    fn different_carriers_are_incomparable() {
        let package = AmrAbility::new(LoadCarrier::Package, 10.0);
        let pallet = AmrAbility::new(LoadCarrier::EuroPallet, 10.0);
        assert!(!(package <= pallet));
        assert!(!(pallet <= package));
        assert!(package.partial_cmp(&pallet).is_none());
    }
}

// ── Kinematics ────────────────────────────────────────────────────────────────

#[test]
fn deceleration_magnitude_is_positive() {
    let k = AmrKinematics::new(2.0, 0.0, 1.5, -0.5);
    assert_eq!(k.max_deceleration(), -0.5);
    assert_eq!(k.deceleration_magnitude(), 0.5);
}

// ── FleetRegistry ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod fleet {
    use super::*;

    fn registry() -> FleetRegistry {
        FleetRegistry::from_abilities([
            AmrAbility::new(LoadCarrier::Package, 20.0),
            AmrAbility::new(LoadCarrier::Package, 40.0),
            AmrAbility::new(LoadCarrier::EuroBox, 20.0),
            AmrAbility::new(LoadCarrier::Package, 20.0), // duplicate
        ])
    }

    #[test]
    fn registration_deduplicates() {
        assert_eq!(registry().existing_abilities().len(), 3);
    }

    #[test]
    fn fitting_abilities_respect_partial_order() {
        let fitting = registry().fitting_abilities(&AmrAbility::new(LoadCarrier::Package, 30.0));
        assert_eq!(fitting, vec![AmrAbility::new(LoadCarrier::Package, 40.0)]);
    }

    #[test]
    fn topic_names_are_deterministic() {
        let r = registry();
        let a = AmrAbility::new(LoadCarrier::EuroBox, 20.0);
        assert_eq!(r.topic_for_ability(&a), "tasks/eurobox/20");
        assert_eq!(r.topic_for_ability(&a), r.topic_for_ability(&a));
    }
}
