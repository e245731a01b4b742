use crate::covert::CovertError;
use crate::id::{CapabilityId, CharacterId, PolityId};
use crate::model::*;
use crate::sim::{SimConfig, SimSystem, run};

// -- Builder-style ref type --

/// Typed reference to a polity in a [`Scenario`], enabling chained field mutation.
///
/// Created by [`Scenario::polity`] (creation) or [`Scenario::polity_mut`] (mutation).
/// Call [`.id()`](PolityRef::id) to terminate the chain and extract the polity ID.
pub struct PolityRef<'a> {
    scenario: &'a mut Scenario,
    id: PolityId,
}

impl<'a> PolityRef<'a> {
    fn stats_mut(&mut self) -> &mut ActorSnapshot {
        &mut self.scenario.world.polity_mut(self.id).stats
    }

    pub fn population(mut self, v: f64) -> Self { self.stats_mut().population = v; self }
    pub fn food(mut self, v: f64) -> Self { self.stats_mut().food = v; self }
    pub fn wealth(mut self, v: f64) -> Self { self.stats_mut().wealth = v; self }
    pub fn military(mut self, v: f64) -> Self { self.stats_mut().military = v; self }
    pub fn happiness(mut self, v: f64) -> Self { self.stats_mut().happiness = v; self }
    pub fn influence(mut self, v: f64) -> Self { self.stats_mut().influence = v; self }
    pub fn technology(mut self, v: f64) -> Self { self.stats_mut().technology = v; self }
    pub fn knowledge(mut self, v: f64) -> Self { self.stats_mut().knowledge = v; self }
    pub fn counter_intel(mut self, v: f64) -> Self { self.stats_mut().counter_intel = v; self }
    pub fn cunning(mut self, v: f64) -> Self { self.stats_mut().personality.cunning = v; self }
    pub fn aggression(mut self, v: f64) -> Self { self.stats_mut().personality.aggression = v; self }
    pub fn wrath(mut self, v: f64) -> Self { self.stats_mut().personality.wrath = v; self }
    pub fn eliminated(mut self) -> Self { self.stats_mut().eliminated = true; self }

    /// Escape hatch: apply an arbitrary closure to the polity record.
    pub fn with(self, f: impl FnOnce(&mut Polity)) -> Self {
        f(self.scenario.world.polity_mut(self.id));
        self
    }

    /// Terminate the chain and return the polity ID.
    pub fn id(self) -> PolityId { self.id }
}

/// Fluent builder for constructing World state.
///
/// Polities start from the [`World::add_polity`] baseline and are adjusted
/// through [`PolityRef`] setters, so new stat fields never break callers.
///
/// Used by tests for deterministic scenario setup and by hosts that want a
/// hand-authored starting world.
pub struct Scenario {
    world: World,
    start_tick: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Create a new scenario starting at tick 0.
    pub fn new() -> Self {
        Self::at_tick(0)
    }

    /// Create a new scenario starting at the given tick.
    pub fn at_tick(tick: u64) -> Self {
        let mut world = World::new();
        world.current_tick = tick;
        Self {
            world,
            start_tick: tick,
        }
    }

    // -- Polity creation --

    /// Add a polity with baseline stats and return a chainable ref to it.
    pub fn polity(&mut self, name: &str) -> PolityRef<'_> {
        let id = self.world.add_polity(name);
        PolityRef { scenario: self, id }
    }

    /// Chainable ref to an existing polity.
    pub fn polity_mut(&mut self, id: PolityId) -> PolityRef<'_> {
        PolityRef { scenario: self, id }
    }

    // -- Bilateral state --

    pub fn trust(&mut self, a: PolityId, b: PolityId, trust: f64) -> &mut Self {
        self.world.relationship_mut(a, b).apply(&RelationshipUpdate {
            trust: Some(trust),
            ..Default::default()
        });
        self
    }

    pub fn status(&mut self, a: PolityId, b: PolityId, status: DiplomaticStatus) -> &mut Self {
        self.world.relationship_mut(a, b).status = status;
        self
    }

    pub fn rivalry(&mut self, actor: PolityId, rivalry: Rivalry) -> &mut Self {
        self.world.polity_mut(actor).rivalries.push(rivalry);
        self
    }

    pub fn creed(&mut self, actor: PolityId, name: &str, tolerance: f64) -> &mut Self {
        self.world.polity_mut(actor).creed = Some(Creed {
            name: name.to_string(),
            tolerance,
        });
        self
    }

    /// Append a memory to `actor`'s log, stamped with the scenario's tick.
    pub fn memory(
        &mut self,
        actor: PolityId,
        kind: MemoryKind,
        target: Option<PolityId>,
        emotional_weight: f64,
        description: &str,
    ) -> &mut Self {
        let tick = self.world.current_tick;
        self.world.add_memory(MemoryEvent {
            actor,
            kind,
            target,
            description: description.to_string(),
            emotional_weight,
            tick,
        });
        self
    }

    // -- Roster --

    /// Place an active agent owned by `owner` inside `target`.
    pub fn capability(&mut self, owner: PolityId, target: PolityId, skill: f64) -> CapabilityId {
        self.world.add_capability(owner, target, skill)
    }

    pub fn character(&mut self, polity: PolityId, name: &str, role: Role) -> CharacterId {
        self.world.add_character(polity, name, role)
    }

    // -- Finish --

    /// Consume the builder and return the constructed World.
    pub fn build(self) -> World {
        self.world
    }

    /// Build the world and run the given systems from the scenario's start tick.
    pub fn run(
        self,
        systems: &mut [Box<dyn SimSystem>],
        num_ticks: u64,
        seed: u64,
    ) -> Result<World, CovertError> {
        let start_tick = self.start_tick;
        let mut world = self.build();
        run(
            &mut world,
            systems,
            SimConfig::new(start_tick, num_ticks, seed),
        )?;
        Ok(world)
    }

    /// Borrow the world for inspection.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Borrow the world mutably for additional modifications.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covert::PolityRead;

    #[test]
    fn chained_setters_land_on_polity() {
        let mut s = Scenario::new();
        let id = s
            .polity("Vael")
            .food(5.0)
            .military(80.0)
            .counter_intel(40.0)
            .cunning(90.0)
            .id();
        let world = s.build();
        let stats = &world.polity(id).stats;
        assert_eq!(stats.food, 5.0);
        assert_eq!(stats.military, 80.0);
        assert_eq!(stats.counter_intel, 40.0);
        assert_eq!(stats.personality.cunning, 90.0);
        // untouched fields keep the baseline
        assert_eq!(stats.wealth, 50.0);
    }

    #[test]
    fn relationship_helpers_are_symmetric() {
        let mut s = Scenario::new();
        let a = s.polity("A").id();
        let b = s.polity("B").id();
        s.trust(a, b, -250.0).status(b, a, DiplomaticStatus::Hostile);
        let world = s.build();
        let rel = world.relationship(b, a);
        assert_eq!(rel.trust, -100.0);
        assert_eq!(rel.status, DiplomaticStatus::Hostile);
    }

    #[test]
    fn memories_take_scenario_tick() {
        let mut s = Scenario::at_tick(12);
        let a = s.polity("A").id();
        s.memory(a, MemoryKind::Insult, None, -5.0, "A rude envoy");
        let world = s.build();
        assert_eq!(world.memories(a)[0].tick, 12);
    }

    #[test]
    fn polity_mut_edits_existing() {
        let mut s = Scenario::new();
        let a = s.polity("A").id();
        s.polity_mut(a).wealth(3.0).with(|p| p.sick_fraction = 0.5);
        assert_eq!(s.world().polity(a).stats.wealth, 3.0);
        assert_eq!(s.world().polity(a).sick_fraction, 0.5);
    }
}
