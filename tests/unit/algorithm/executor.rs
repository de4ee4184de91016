//! Tests for solver configuration, phase transitions and the one-call entry point

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use voxcollapse::{
        AlgorithmError, Coord, Extent, Module, ModuleRegistry, SolveConfig, Solver, SolverState,
        solve,
    };

    fn registry(names: &[&str]) -> ModuleRegistry {
        ModuleRegistry::new(
            names.iter().map(|&name| Module::named(name)).collect(),
            Module::named("empty"),
        )
        .unwrap()
    }

    fn uniform(name: &str, side: usize) -> Array3<String> {
        Array3::from_elem((side, side, side), name.to_string())
    }

    // Tests default parameters
    // Verified by changing the default seed
    #[test]
    fn test_default_config() {
        let config = SolveConfig::default();
        assert_eq!(config.pattern_size, 2);
        assert_eq!(config.max_attempts, 10_000);
        assert_eq!(config.seed, 42);
        assert!((config.entropy_threshold - 0.01).abs() < f64::EPSILON);
        assert!(config.record_history);
        assert!(!config.capture_diagnostics);
        assert!(config.validate().is_ok());
    }

    // Tests unusable parameters are rejected
    // Verified by removing the threshold finiteness check
    #[test]
    fn test_validate_rejects_bad_parameters() {
        let bad = [
            SolveConfig {
                pattern_size: 0,
                ..SolveConfig::default()
            },
            SolveConfig {
                max_attempts: 0,
                ..SolveConfig::default()
            },
            SolveConfig {
                entropy_threshold: -0.5,
                ..SolveConfig::default()
            },
            SolveConfig {
                entropy_threshold: f64::NAN,
                ..SolveConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(AlgorithmError::InvalidParameter { .. })
            ));
        }
    }

    // Tests state names and terminal states
    // Verified by treating Collapsing as terminal
    #[test]
    fn test_state_display_and_terminal() {
        assert_eq!(SolverState::Idle.to_string(), "idle");
        assert_eq!(SolverState::Aborted.to_string(), "aborted");
        assert!(SolverState::Done.is_terminal());
        assert!(SolverState::Aborted.is_terminal());
        assert!(!SolverState::Collapsing.is_terminal());
        assert!(!SolverState::Extracting.is_terminal());
    }

    // Tests empty inputs and oversized outputs are rejected up front
    // Verified by removing the dimension limit check
    #[test]
    fn test_new_rejects_empty_input_and_oversized_output() {
        let empty = Array3::<String>::from_shape_vec((0, 1, 1), Vec::new()).unwrap();
        assert!(matches!(
            Solver::new(registry(&["A"]), &empty, Extent::cube(2), SolveConfig::default()),
            Err(AlgorithmError::InvalidSourceData { .. })
        ));

        assert!(matches!(
            Solver::new(
                registry(&["A"]),
                &uniform("A", 2),
                Extent::new(513, 1, 1),
                SolveConfig::default()
            ),
            Err(AlgorithmError::InvalidParameter { .. })
        ));
    }

    // Tests pattern sizes no input window can hold are rejected before any grid is built
    // Verified by removing the longest-axis bound
    #[test]
    fn test_new_rejects_pattern_larger_than_input() {
        for pattern_size in [3, 5000, usize::MAX] {
            let config = SolveConfig {
                pattern_size,
                ..SolveConfig::default()
            };
            assert!(matches!(
                Solver::new(registry(&["A"]), &uniform("A", 2), Extent::cube(2), config),
                Err(AlgorithmError::InvalidParameter { .. })
            ));
        }

        let flat = Array3::from_elem((4, 1, 1), "A".to_string());
        let config = SolveConfig {
            pattern_size: 4,
            ..SolveConfig::default()
        };
        assert!(Solver::new(registry(&["A"]), &flat, Extent::cube(2), config).is_ok());
    }

    // Tests unknown input names are reported once each and block extraction when nothing is left
    // Verified by resolving unknown names to the filler
    #[test]
    fn test_unknown_names_leave_no_patterns() {
        let mut solver = Solver::new(
            registry(&["A"]),
            &uniform("Z", 2),
            Extent::cube(2),
            SolveConfig::default(),
        )
        .unwrap();
        assert_eq!(solver.unknown_names(), &["Z".to_string()]);

        assert!(matches!(
            solver.extract(),
            Err(AlgorithmError::InvalidSourceData { .. })
        ));
        assert_eq!(solver.state(), SolverState::Extracting);
    }

    // Tests operations out of phase fail with a state error
    // Verified by allowing extract to run twice
    #[test]
    fn test_phase_guards() {
        let mut solver = Solver::new(
            registry(&["A", "B"]),
            &uniform("A", 2),
            Extent::cube(2),
            SolveConfig::default(),
        )
        .unwrap();

        assert!(matches!(
            solver.pin(Coord::new(0, 0, 0), "A"),
            Err(AlgorithmError::InvalidState { .. })
        ));
        assert_eq!(solver.extract().unwrap(), 1);
        assert_eq!(solver.state(), SolverState::Collapsing);
        assert!(matches!(
            solver.extract(),
            Err(AlgorithmError::InvalidState { .. })
        ));
        assert!(matches!(
            solver.pin(Coord::new(0, 0, 0), "Q"),
            Err(AlgorithmError::UnknownModule { .. })
        ));
    }

    // Tests a single-module palette resolves the whole volume in one attempt
    // Verified by not collapsing single-candidate cells during propagation
    #[test]
    fn test_single_module_solves_in_one_attempt() {
        let mut solver = Solver::new(
            registry(&["A"]),
            &uniform("A", 3),
            Extent::cube(2),
            SolveConfig::default(),
        )
        .unwrap();

        let mut steps = 0;
        let state = solver.run_with(|_| steps += 1).unwrap();

        assert_eq!(state, SolverState::Done);
        assert_eq!(steps, 2);
        let outcome = solver.finish();
        assert_eq!(outcome.attempts_used, 1);
        assert_eq!(outcome.collapsed, 8);
        assert_eq!((outcome.uncollapsable, outcome.open), (0, 0));
        assert!(outcome.volume.iter().all(|&id| id == outcome.volume[[0, 0, 0]]));
        assert_eq!(solver.step().unwrap(), SolverState::Done);
    }

    // Tests history and diagnostics follow the configuration
    // Verified by always recording snapshots
    #[test]
    fn test_history_and_diagnostics_switches() {
        let config = SolveConfig {
            record_history: false,
            capture_diagnostics: true,
            ..SolveConfig::default()
        };
        let mut solver =
            Solver::new(registry(&["A"]), &uniform("A", 2), Extent::cube(2), config).unwrap();
        solver.run().unwrap();

        let grid = solver.grid();
        assert!(!grid.history().is_recording());
        assert!(grid.history().snapshot(0).is_none());
        assert_eq!(grid.history().collapse_order().len(), 8);
        assert!(
            grid.diagnostics()
                .lines()
                .iter()
                .any(|line| line.starts_with("Grid created"))
        );
    }

    // Tests the one-call entry point leaves the caller's registry usable
    // Verified by returning the outcome before running the solver
    #[test]
    fn test_solve_returns_final_volume() {
        let modules = registry(&["A"]);
        let outcome = solve(
            &modules,
            &uniform("A", 2),
            Extent::new(3, 2, 1),
            SolveConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.state, SolverState::Done);
        assert_eq!(outcome.volume.dim(), (3, 2, 1));
        assert_eq!(modules.names_of(&outcome.volume)[[2, 1, 0]], "A");
    }
}
