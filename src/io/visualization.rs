//! Snapshot rendering and GIF playback of a solve
//!
//! A volume is drawn as its z-slices side by side, left to right. Inside a
//! slice x runs to the right and y runs down; every cell is a square of
//! [`PIXELS_PER_CELL`] pixels in its module's colour.

use crate::{
    io::{
        configuration::{
            FINAL_FRAME_HOLD, PIXELS_PER_CELL, SLICE_GAP_PIXELS, VIEWER_MIN_FRAME_DELAY_MS,
        },
        error::{AlgorithmError, Result},
        volume::Rgba as Color,
    },
    registry::modules::{ModuleId, ModuleRegistry},
    spatial::{coordinates::Extent, grid::CollapseHistory},
};
use image::{Delay, Frame, Rgba, RgbaImage};
use ndarray::Array3;
use std::path::Path;

/// Renders volumes of module ids with per-module colours
pub struct PlaybackRenderer {
    colors: Vec<Color>,
    extent: Extent,
}

impl PlaybackRenderer {
    /// Take colours from the payload of every registered module
    pub fn new(registry: &ModuleRegistry<Color>, extent: Extent) -> Self {
        Self::from_colors(
            registry.iter().map(|(_, module)| *module.payload()).collect(),
            extent,
        )
    }

    /// Use explicit colours indexed by module id
    pub const fn from_colors(colors: Vec<Color>, extent: Extent) -> Self {
        Self { colors, extent }
    }

    /// Pixel dimensions `(width, height)` of a rendered volume
    pub const fn image_size(&self) -> (u32, u32) {
        let slice_width = self.extent.x as u32 * PIXELS_PER_CELL;
        let slices = self.extent.z as u32;
        let width = slices * slice_width + slices.saturating_sub(1) * SLICE_GAP_PIXELS;
        (width, self.extent.y as u32 * PIXELS_PER_CELL)
    }

    /// Draw one volume
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The volume does not have the renderer's dimensions
    /// - A module id has no colour
    pub fn render(&self, volume: &Array3<ModuleId>) -> Result<RgbaImage> {
        if volume.dim() != self.extent.shape() {
            let (x, y, z) = volume.dim();
            return Err(AlgorithmError::InvalidSourceData {
                reason: format!(
                    "cannot render a {} volume with a {} renderer",
                    Extent::new(x, y, z),
                    self.extent
                ),
            });
        }

        let (width, height) = self.image_size();
        let mut img = RgbaImage::new(width, height);
        let slice_stride = self.extent.x as u32 * PIXELS_PER_CELL + SLICE_GAP_PIXELS;

        for ((x, y, z), &module) in volume.indexed_iter() {
            let rgba = self.colors.get(module.index()).copied().ok_or_else(|| {
                AlgorithmError::InvalidSourceData {
                    reason: format!("module {module} has no colour"),
                }
            })?;
            let left = z as u32 * slice_stride + x as u32 * PIXELS_PER_CELL;
            let top = y as u32 * PIXELS_PER_CELL;
            for dy in 0..PIXELS_PER_CELL {
                for dx in 0..PIXELS_PER_CELL {
                    img.put_pixel(left + dx, top + dy, Rgba(rgba));
                }
            }
        }

        Ok(img)
    }

    /// Build animation frames from the recorded snapshots
    ///
    /// Frames are dropped evenly when the requested delay is below what
    /// viewers display, and the last state is held longer.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshots were recorded or rendering fails
    pub fn frames(&self, history: &CollapseHistory, frame_delay_ms: u32) -> Result<Vec<Frame>> {
        if history.iter().next().is_none() {
            return Err(AlgorithmError::InvalidSourceData {
                reason: "No snapshots recorded for playback".to_string(),
            });
        }

        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms.max(1)) as usize
        } else {
            1
        };
        let delay = Delay::from_numer_denom_ms(effective_delay_ms, 1);

        let mut frames = Vec::new();
        let mut last = None;
        for (count, (_, snapshot)) in history.iter().enumerate() {
            if (count + 1) % skip_factor == 0 {
                frames.push(Frame::from_parts(self.render(snapshot)?, 0, 0, delay));
                last = None;
            } else {
                last = Some(snapshot);
            }
        }
        if let Some(snapshot) = last {
            frames.push(Frame::from_parts(self.render(snapshot)?, 0, 0, delay));
        }

        if let Some(final_image) = frames.last().map(|frame| frame.buffer().clone()) {
            frames.push(Frame::from_parts(
                final_image,
                0,
                0,
                Delay::from_numer_denom_ms(effective_delay_ms * FINAL_FRAME_HOLD, 1),
            ));
        }

        Ok(frames)
    }

    /// Write the snapshot history as an animated GIF
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No snapshots were recorded
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif(
        &self,
        history: &CollapseHistory,
        output_path: &Path,
        frame_delay_ms: u32,
    ) -> Result<()> {
        let frames = self.frames(history, frame_delay_ms)?;
        let file = create_output_file(output_path)?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|source| AlgorithmError::ImageExport {
                path: output_path.to_path_buf(),
                source,
            })
    }

    /// Write a single volume as a PNG image
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the image cannot be saved
    pub fn export_png(&self, volume: &Array3<ModuleId>, output_path: &Path) -> Result<()> {
        let img = self.render(volume)?;
        if let Some(parent) = output_path.parent() {
            create_parent(parent)?;
        }
        img.save(output_path)
            .map_err(|source| AlgorithmError::ImageExport {
                path: output_path.to_path_buf(),
                source,
            })
    }
}

fn create_parent(parent: &Path) -> Result<()> {
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|source| AlgorithmError::FileSystem {
        path: parent.to_path_buf(),
        operation: "create directory",
        source,
    })
}

fn create_output_file(output_path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = output_path.parent() {
        create_parent(parent)?;
    }
    std::fs::File::create(output_path).map_err(|source| AlgorithmError::FileSystem {
        path: output_path.to_path_buf(),
        operation: "create file",
        source,
    })
}
