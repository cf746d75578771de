//! `FleetRegistry` — which abilities exist in the fleet, and the pub/sub
//! topic name for each.
//!
//! The auction initiator partitions its call-for-proposal broadcasts by
//! ability group: every distinct ability present in the fleet gets one topic,
//! and a robot subscribes to exactly the topic of its own ability.  The
//! registry is plain data handed to each agent at construction; there is no
//! global fleet singleton.

use crate::ability::AmrAbility;

/// The distinct abilities present in a fleet.
#[derive(Clone, Debug, Default)]
pub struct FleetRegistry {
    abilities: Vec<AmrAbility>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the descriptions' abilities, deduplicated.
    pub fn from_abilities(abilities: impl IntoIterator<Item = AmrAbility>) -> Self {
        let mut registry = Self::new();
        for ability in abilities {
            registry.register(ability);
        }
        registry
    }

    /// Add `ability` to the registry if an equal one is not already present.
    pub fn register(&mut self, ability: AmrAbility) {
        if !self.abilities.contains(&ability) {
            self.abilities.push(ability);
        }
    }

    /// All distinct abilities, in registration order.
    pub fn existing_abilities(&self) -> &[AmrAbility] {
        &self.abilities
    }

    /// Abilities that can execute a task with `requirement`
    /// (`requirement <= ability` under the partial order).
    pub fn fitting_abilities(&self, requirement: &AmrAbility) -> Vec<AmrAbility> {
        self.abilities
            .iter()
            .copied()
            .filter(|ability| requirement <= ability)
            .collect()
    }

    /// The pub/sub topic on which tasks for `ability` are announced.
    ///
    /// Derived purely from the ability so every agent computes the same name
    /// without coordination.
    pub fn topic_for_ability(&self, ability: &AmrAbility) -> String {
        format!(
            "tasks/{}/{}",
            ability.load_carrier(),
            ability.max_payload_kg()
        )
    }
}
