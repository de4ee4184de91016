/// Fixed-size module sets for candidates and support flags
pub mod bitset;
/// Committing cells to a single module
pub mod collapse;
/// Solver state machine and one-call entry point
pub mod executor;
/// Constraint propagation from collapsed cells
pub mod propagation;
/// Seeded randomness and lowest-entropy cell selection
pub mod selection;
