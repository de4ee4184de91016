//! Tests for slice rendering and GIF playback of collapse snapshots

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use voxcollapse::io::configuration::{PIXELS_PER_CELL, SLICE_GAP_PIXELS};
    use voxcollapse::io::visualization::PlaybackRenderer;
    use voxcollapse::spatial::grid::Grid;
    use voxcollapse::{AlgorithmError, AxisTiling, Coord, Extent, Module, ModuleId, ModuleRegistry};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const GREY: [u8; 4] = [90, 90, 90, 255];

    fn renderer(extent: Extent) -> PlaybackRenderer {
        PlaybackRenderer::from_colors(vec![RED, BLUE, GREY], extent)
    }

    fn recorded_grid(commits: usize) -> Grid {
        let registry = ModuleRegistry::new(
            vec![Module::named("A"), Module::named("B")],
            Module::named("empty"),
        )
        .unwrap();
        let mut grid = Grid::new(Extent::new(2, 2, 1), registry, 2, AxisTiling::NONE, 42).unwrap();
        for coord in Extent::new(2, 2, 1).coords().take(commits) {
            grid.commit(coord, ModuleId::new(coord.x % 2)).unwrap();
        }
        grid
    }

    // Tests slices are laid out left to right with a gap
    // Verified by dropping the slice gap from the width
    #[test]
    fn test_image_size() {
        let (width, height) = renderer(Extent::new(3, 2, 2)).image_size();
        assert_eq!(width, 2 * 3 * PIXELS_PER_CELL + SLICE_GAP_PIXELS);
        assert_eq!(height, 2 * PIXELS_PER_CELL);
    }

    // Tests cells land in their slice at x right and y down
    // Verified by swapping the x and y pixel axes
    #[test]
    fn test_render_places_cells() {
        let extent = Extent::new(2, 1, 2);
        let mut volume = Array3::from_elem(extent.shape(), ModuleId::new(2));
        volume[[1, 0, 0]] = ModuleId::new(0);
        volume[[0, 0, 1]] = ModuleId::new(1);

        let image = renderer(extent).render(&volume).unwrap();

        assert_eq!(image.get_pixel(0, 0).0, GREY);
        assert_eq!(image.get_pixel(PIXELS_PER_CELL, 0).0, RED);
        let second_slice = 2 * PIXELS_PER_CELL + SLICE_GAP_PIXELS;
        assert_eq!(image.get_pixel(second_slice, PIXELS_PER_CELL - 1).0, BLUE);
        assert_eq!(image.get_pixel(2 * PIXELS_PER_CELL, 0).0, [0, 0, 0, 0]);
    }

    // Tests volumes of the wrong size or with unknown modules are refused
    // Verified by rendering without checking the volume shape
    #[test]
    fn test_render_rejects_bad_volumes() {
        let renderer = renderer(Extent::cube(2));
        let wrong_shape = Array3::from_elem((2, 2, 1), ModuleId::new(0));
        assert!(matches!(
            renderer.render(&wrong_shape),
            Err(AlgorithmError::InvalidSourceData { .. })
        ));

        let unknown = Array3::from_elem((2, 2, 2), ModuleId::new(7));
        assert!(renderer.render(&unknown).is_err());
    }

    // Tests frames are thinned for short delays and the final state is held
    // Verified by removing the trailing frame flush
    #[test]
    fn test_frames_thin_and_hold() {
        let grid = recorded_grid(3);
        let renderer = renderer(grid.extent());

        assert_eq!(renderer.frames(grid.history(), 50).unwrap().len(), 4);
        assert_eq!(renderer.frames(grid.history(), 5).unwrap().len(), 2);
        assert!(renderer.frames(recorded_grid(0).history(), 50).is_err());
    }

    // Tests PNG and GIF files are written to nested directories
    // Verified by skipping parent directory creation
    #[test]
    fn test_exports_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let grid = recorded_grid(4);
        let renderer = renderer(grid.extent());

        let png = dir.path().join("out").join("volume.png");
        renderer.export_png(&grid.output(), &png).unwrap();
        assert!(png.exists());

        let gif = dir.path().join("anim").join("playback.gif");
        renderer.export_gif(grid.history(), &gif, 5).unwrap();
        assert!(gif.exists());
        assert_eq!(grid.history().collapse_order().last(), Some(&Coord::new(1, 1, 0)));
    }
}
