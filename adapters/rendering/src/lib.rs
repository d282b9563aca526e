#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tilescape adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};
use tilescape_core::{screen_anchor, LevelState, Position, TileDescription};

/// RGBA color carried by sprite tints and clear colors.
///
/// Channels are linear floats in `0.0..=1.0`; backends convert to their
/// native representation at draw time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel, `0.0..=1.0`.
    pub red: f32,
    /// Green channel, `0.0..=1.0`.
    pub green: f32,
    /// Blue channel, `0.0..=1.0`.
    pub blue: f32,
    /// Alpha channel, `0.0..=1.0`.
    pub alpha: f32,
}

impl Color {
    /// Builds a color from raw float channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Builds an opaque color from `0..=255` byte channels.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Blends the color towards white; `amount` is clamped to `0.0..=1.0`
    /// and alpha is preserved.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let blend = |channel: f32| channel + (1.0 - channel) * amount;

        Self {
            red: blend(self.red),
            green: blend(self.green),
            blue: blend(self.blue),
            alpha: self.alpha,
        }
    }
}

/// Symbolic name of a drawable body resolved by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Passable ground tile.
    TileEmpty,
    /// Impassable border tile.
    TileWall,
    /// The finish tile.
    TileFinish,
    /// Highlight painted on the cell under the cursor.
    HoverMarker,
    /// Persistent marker drawn over the finish cell.
    FinishMarker,
    /// Randomly walking object body.
    Wanderer,
    /// Stationary object body.
    Sentinel,
}

/// Single element of the ordered draw list.
///
/// The list arrives fully sorted; backends paint it front to back of the
/// `Vec` without reordering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteInstance {
    /// Screen-space anchor of the sprite before camera translation.
    pub offset: Vec2,
    /// Body to draw at the anchor.
    pub key: SpriteKey,
    /// Tint applied to the body's base color.
    pub tint: Color,
}

impl SpriteInstance {
    /// Creates a new draw-list element.
    #[must_use]
    pub const fn new(offset: Vec2, key: SpriteKey, tint: Color) -> Self {
        Self { offset, key, tint }
    }
}

/// Describes the isometric field geometry required by backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPresentation {
    /// Number of tile columns contained in the field.
    pub columns: u32,
    /// Number of tile rows contained in the field.
    pub rows: u32,
    /// Isometric tile geometry shared with the simulation.
    pub tile: TileDescription,
}

impl FieldPresentation {
    /// Creates a new field descriptor.
    ///
    /// Returns an error when the field has no area or the tile diagonals
    /// cannot span a drawable diamond.
    pub fn new(
        columns: u32,
        rows: u32,
        tile: TileDescription,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyField { columns, rows });
        }
        if tile.half_horizontal_diag() <= 0 || tile.half_vertical_diag() <= 0 {
            return Err(RenderingError::DegenerateTileGeometry {
                half_horizontal_diag: tile.half_horizontal_diag(),
                half_vertical_diag: tile.half_vertical_diag(),
            });
        }

        Ok(Self {
            columns,
            rows,
            tile,
        })
    }

    /// Screen-space anchor of the tile at `position` as a float vector.
    #[must_use]
    pub fn anchor(&self, position: Position) -> Vec2 {
        let point = screen_anchor(position, &self.tile);
        Vec2::new(point.x() as f32, point.y() as f32)
    }

    /// Total width of the projected field in screen units.
    ///
    /// Anchor x spans `(columns + rows - 2) * half_horizontal_diag` across
    /// the diamond, plus one sprite width for the final tile body.
    #[must_use]
    pub fn pixel_width(&self) -> f32 {
        ((self.columns + self.rows - 2) * self.tile.half_horizontal_diag() as u32
            + self.tile.sprite_width()) as f32
    }

    /// Total height of the projected field in screen units.
    #[must_use]
    pub fn pixel_height(&self) -> f32 {
        ((self.columns + self.rows - 2) * self.tile.half_vertical_diag() as u32
            + self.tile.sprite_height()) as f32
    }
}

/// Full-screen overlay shown when the level stops playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneOverlay {
    /// An object reached the finish cell.
    LevelCompleted,
    /// Every object expired before reaching the finish.
    GameOver,
}

impl SceneOverlay {
    /// Derives the overlay to show for the given level state, if any.
    #[must_use]
    pub fn for_level_state(state: LevelState) -> Option<Self> {
        match state {
            LevelState::Playing => None,
            LevelState::Completed => Some(Self::LevelCompleted),
            LevelState::GameOver => Some(Self::GameOver),
        }
    }
}

/// Scene description consumed by rendering backends each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Field geometry for the current level.
    pub field: FieldPresentation,
    /// Sprites in back-to-front paint order.
    pub draw_list: Vec<SpriteInstance>,
    /// Camera translation applied to every sprite offset.
    pub camera_offset: Vec2,
    /// Cell currently under the cursor, if inside the field.
    pub hover: Option<Position>,
    /// Overlay shown once the level is over.
    pub overlay: Option<SceneOverlay>,
}

impl Scene {
    /// Creates a new scene descriptor with an empty draw list.
    #[must_use]
    pub fn new(field: FieldPresentation) -> Self {
        Self {
            field,
            draw_list: Vec::new(),
            camera_offset: Vec2::ZERO,
            hover: None,
            overlay: None,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a quit request on this frame.
    pub quit_requested: bool,
    /// Camera pan accumulated from drag motion on this frame.
    pub pan_delta: Vec2,
    /// Cursor position expressed in world units, before camera translation.
    pub cursor_world_space: Option<Vec2>,
    /// Whether the adapter detected a primary click on this frame.
    pub spawn_action: bool,
    /// Whether the adapter detected a secondary click on this frame.
    pub inspect_action: bool,
}

/// Cell whose projected diamond contains the provided world-space point.
///
/// Inverse of the forward anchor transform measured at diamond centers:
/// the center of cell `(r, c)` maps back to exactly `(r, c)`, and nearby
/// points round to the nearest cell. Callers guarantee non-degenerate
/// tile geometry, which [`FieldPresentation::new`] validates at scene
/// construction.
#[must_use]
pub fn cell_under_cursor(point: Vec2, tile: &TileDescription) -> Position {
    let half_horizontal = tile.half_horizontal_diag() as f32;
    let half_vertical = tile.half_vertical_diag() as f32;
    let center_x = (tile.tile_x() + tile.half_horizontal_diag()) as f32;
    let center_y = (tile.tile_y() + tile.half_vertical_diag()) as f32;
    let u = (point.x - center_x) / half_horizontal;
    let v = (point.y - center_y) / half_vertical;

    let column = (u + v) * 0.5;
    let row = (v - u) * 0.5;
    Position::new(row.round() as i32, column.round() as i32)
}

/// Rendering backend capable of presenting Tilescape scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame
    /// delta and the per-frame input captured by the adapter, and may
    /// mutate the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Field dimensions must both be positive to produce a drawable scene.
    EmptyField {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Tile diagonals must both be positive for the projection to invert.
    DegenerateTileGeometry {
        /// Provided half horizontal diagonal.
        half_horizontal_diag: i32,
        /// Provided half vertical diagonal.
        half_vertical_diag: i32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { columns, rows } => {
                write!(f, "field dimensions {columns}x{rows} have no area")
            }
            Self::DegenerateTileGeometry {
                half_horizontal_diag,
                half_vertical_diag,
            } => {
                write!(
                    f,
                    "tile diagonals {half_horizontal_diag}/{half_vertical_diag} must be positive"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_tile() -> TileDescription {
        TileDescription::new(70, 81, 35, 20, 35, 60)
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(100, 150, 200).lighten(0.5);

        assert!(color.red > 100.0 / 255.0);
        assert!(color.green > 150.0 / 255.0);
        assert!(color.blue > 200.0 / 255.0);
        assert!((color.alpha - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn lighten_is_clamped_to_the_unit_range() {
        let color = Color::from_rgb_u8(10, 20, 30).lighten(5.0);

        assert!((color.red - 1.0).abs() < f32::EPSILON);
        assert!((color.green - 1.0).abs() < f32::EPSILON);
        assert!((color.blue - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn field_presentation_rejects_zero_area() {
        let error = FieldPresentation::new(0, 5, classic_tile())
            .expect_err("zero columns must fail");
        assert_eq!(
            error,
            RenderingError::EmptyField {
                columns: 0,
                rows: 5
            }
        );
    }

    #[test]
    fn field_presentation_rejects_flat_diagonals() {
        let flat = TileDescription::new(70, 81, 35, 0, 35, 60);
        let error =
            FieldPresentation::new(5, 5, flat).expect_err("flat diagonal must fail");
        assert!(matches!(
            error,
            RenderingError::DegenerateTileGeometry { .. }
        ));
    }

    #[test]
    fn picking_round_trips_through_diamond_centers() {
        let tile = classic_tile();
        for row in 0..12 {
            for column in 0..12 {
                let position = Position::new(row, column);
                let anchor = screen_anchor(position, &tile);
                let center = Vec2::new(
                    (anchor.x() + tile.half_horizontal_diag()) as f32,
                    (anchor.y() + tile.half_vertical_diag()) as f32,
                );
                assert_eq!(cell_under_cursor(center, &tile), position);
            }
        }
    }

    #[test]
    fn picking_tolerates_jitter_inside_the_diamond() {
        let tile = classic_tile();
        let position = Position::new(4, 7);
        let anchor = screen_anchor(position, &tile);
        let center = Vec2::new(
            (anchor.x() + tile.half_horizontal_diag()) as f32,
            (anchor.y() + tile.half_vertical_diag()) as f32,
        );

        for offset in [
            Vec2::new(8.0, 0.0),
            Vec2::new(-8.0, 0.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(0.0, -4.0),
        ] {
            assert_eq!(cell_under_cursor(center + offset, &tile), position);
        }
    }

    #[test]
    fn overlay_tracks_terminal_level_states() {
        assert_eq!(SceneOverlay::for_level_state(LevelState::Playing), None);
        assert_eq!(
            SceneOverlay::for_level_state(LevelState::Completed),
            Some(SceneOverlay::LevelCompleted)
        );
        assert_eq!(
            SceneOverlay::for_level_state(LevelState::GameOver),
            Some(SceneOverlay::GameOver)
        );
    }
}
