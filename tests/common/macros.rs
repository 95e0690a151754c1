/// Asserts the live prey and predator counts of a simulation.
#[macro_export]
macro_rules! assert_population {
    ($sim:expr, $prey:expr, $predators:expr) => {
        let stats = $sim.stats();
        assert_eq!(stats.prey_count, $prey, "Prey count mismatch");
        assert_eq!(
            stats.predator_count, $predators,
            "Predator count mismatch"
        );
    };
}

/// Asserts that the organism with the given id is no longer in the world.
#[macro_export]
macro_rules! assert_entity_dead {
    ($sim:expr, $id:expr) => {
        assert!(
            $sim.organism($id).is_none(),
            "Organism {} should be dead but was found alive",
            $id
        );
    };
}

/// Asserts every organism's energy lies in `[0, MAX_ENERGY]`.
#[macro_export]
macro_rules! assert_energy_in_bounds {
    ($sim:expr) => {
        for o in $sim.organisms() {
            assert!(
                o.energy >= 0.0 && o.energy <= biotorus_data::MAX_ENERGY,
                "Organism {} energy {} out of bounds",
                o.id,
                o.energy
            );
        }
    };
}
