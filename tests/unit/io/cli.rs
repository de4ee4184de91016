//! Tests for command-line parsing and batch processing of volume documents

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::fs;
    use std::path::{Path, PathBuf};
    use voxcollapse::io::cli::{Cli, FileProcessor, parse_extent, parse_tiling};
    use voxcollapse::io::configuration::{
        DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
    };
    use voxcollapse::io::volume::VolumeDocument;
    use voxcollapse::{AxisTiling, Extent};

    const SCENE: &str = r#"{
        "modules": [
            { "name": "B", "color": [0, 0, 255, 255] },
            { "name": "A", "color": [255, 0, 0, 255] }
        ],
        "filler": { "name": "empty" },
        "size": [2, 2, 1],
        "cells": ["A", "A", "B", "B"]
    }"#;

    fn write_scene(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, SCENE).unwrap();
        path
    }

    // Tests CLI parsing with only the required target argument
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_cli_parse_minimal_args() {
        let cli = Cli::parse_from(["voxcollapse", "scene.json"]);

        assert_eq!(cli.target, PathBuf::from("scene.json"));
        assert_eq!(cli.output_size, Extent::from(DEFAULT_OUTPUT_SIZE));
        assert_eq!(cli.pattern_size, DEFAULT_PATTERN_SIZE);
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(cli.input_tiling, AxisTiling::NONE);
        assert!(cli.skip_existing());
        assert!(cli.should_show_progress());
        assert!(!cli.solve_config().record_history);
    }

    // Tests CLI parsing with every option and its mapping onto the solver config
    // Verified by wiring the input tiling into the output tiling field
    #[test]
    fn test_cli_parse_all_args() {
        let cli = Cli::parse_from([
            "voxcollapse",
            "scenes",
            "-o",
            "4x3x2",
            "-p",
            "3",
            "-s",
            "7",
            "-a",
            "50",
            "-t",
            "0.5",
            "--input-tiling",
            "xz",
            "--output-tiling",
            "Y",
            "-v",
            "-i",
            "-l",
            "-q",
            "-n",
        ]);

        let config = cli.solve_config();
        assert_eq!(cli.output_size, Extent::new(4, 3, 2));
        assert_eq!(config.pattern_size, 3);
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_attempts, 50);
        assert!((config.entropy_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.input_tiling, AxisTiling::new(true, false, true));
        assert_eq!(config.output_tiling, AxisTiling::new(false, true, false));
        assert!(config.record_history && config.capture_diagnostics);
        assert!(cli.image && !cli.skip_existing() && !cli.should_show_progress());
    }

    // Tests quiet runs default to warnings while normal runs show per-file summaries
    // Verified by returning the warn filter for every run
    #[test]
    fn test_log_filter_follows_quiet_flag() {
        let normal = Cli::parse_from(["voxcollapse", "scene.json"]);
        assert_eq!(normal.log_filter(), "info");

        let quiet = Cli::parse_from(["voxcollapse", "scene.json", "--quiet"]);
        assert_eq!(quiet.log_filter(), "warn");
        assert!(!quiet.should_show_progress());
    }

    // Tests value parsers reject malformed sizes and axes
    // Verified by accepting zero-length axes in parse_extent
    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_extent("2X3x4"), Ok(Extent::new(2, 3, 4)));
        assert!(parse_extent("8x8").is_err());
        assert!(parse_extent("0x1x1").is_err());
        assert!(parse_extent("axbxc").is_err());

        assert_eq!(parse_tiling("NONE"), Ok(AxisTiling::NONE));
        assert_eq!(parse_tiling("zyx"), Ok(AxisTiling::ALL));
        assert!(parse_tiling("xw").is_err());
    }

    // Tests output paths sit next to the input
    // Verified by dropping the suffix from the output name
    #[test]
    fn test_get_output_path() {
        assert_eq!(
            FileProcessor::get_output_path(Path::new("levels/cave.json")),
            PathBuf::from("levels/cave_result.json")
        );
    }

    // Tests a full run writes the solved document and every requested artefact
    // Verified by skipping the image export branch
    #[test]
    fn test_process_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_scene(dir.path(), "block.json");
        let cli = Cli::parse_from([
            "voxcollapse",
            input.to_str().unwrap(),
            "-o",
            "2x2x1",
            "-q",
            "-v",
            "-i",
            "-l",
        ]);

        FileProcessor::new(cli).process().unwrap();

        let solved = VolumeDocument::load(&dir.path().join("block_result.json")).unwrap();
        assert_eq!(solved.size, [2, 2, 1]);
        assert_eq!(solved.cells, vec!["A", "A", "B", "B"]);
        assert!(dir.path().join("block_result.png").exists());
        assert!(dir.path().join("block_playback.gif").exists());
        let log = fs::read_to_string(dir.path().join("block_log.txt")).unwrap();
        assert!(log.contains("Collapsing cell"));
    }

    // Tests existing outputs are kept unless --no-skip is given
    // Verified by inverting boolean logic in skip_existing method
    #[test]
    fn test_existing_output_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_scene(dir.path(), "block.json");
        let output = dir.path().join("block_result.json");
        fs::write(&output, "placeholder").unwrap();
        let target = input.to_str().unwrap();

        FileProcessor::new(Cli::parse_from(["voxcollapse", target, "-q", "-o", "2x2x1"]))
            .process()
            .unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "placeholder");

        FileProcessor::new(Cli::parse_from([
            "voxcollapse",
            target,
            "-q",
            "-n",
            "-o",
            "2x2x1",
        ]))
        .process()
        .unwrap();
        assert!(VolumeDocument::load(&output).is_ok());
    }

    // Tests directory targets ignore earlier results and non-document files
    // Verified by collecting every .json file in the directory
    #[test]
    fn test_directory_target_filters_documents() {
        let dir = tempfile::tempdir().unwrap();
        write_scene(dir.path(), "one.json");
        write_scene(dir.path(), "two.json");
        fs::write(dir.path().join("old_result.json"), "not a document").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let cli = Cli::parse_from([
            "voxcollapse",
            dir.path().to_str().unwrap(),
            "-q",
            "-o",
            "3x3x1",
        ]);
        FileProcessor::new(cli).process().unwrap();

        assert!(dir.path().join("one_result.json").exists());
        assert!(dir.path().join("two_result.json").exists());
        assert!(!dir.path().join("old_result_result.json").exists());
    }

    // Tests targets that are not documents are refused
    // Verified by accepting any existing file as target
    #[test]
    fn test_invalid_targets() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        fs::write(&text, "ignored").unwrap();

        for target in [text, dir.path().join("missing.json")] {
            let cli = Cli::parse_from(["voxcollapse", target.to_str().unwrap(), "-q"]);
            assert!(FileProcessor::new(cli).process().is_err());
        }
    }
}
