//! Shape-painted sprite bodies.
//!
//! Every [`SpriteKey`] resolves to a macroquad shape primitive; the
//! instance tint is the final color, so the painter applies no lighting
//! of its own.

use glam::Vec2;
use macroquad::{
    math::Vec2 as MacroquadVec2,
    shapes::{draw_circle, draw_line, draw_rectangle, draw_triangle},
    text::draw_text,
};
use tilescape_core::TileDescription;
use tilescape_rendering::{Color, SceneOverlay, SpriteInstance, SpriteKey};

const MARKER_INSET: f32 = 0.6;
const BODY_RADIUS_FACTOR: f32 = 0.8;

pub(crate) fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

/// Corners of the tile diamond anchored at `origin`, clockwise from the top.
fn diamond_corners(origin: Vec2, tile: &TileDescription) -> [MacroquadVec2; 4] {
    let half_horizontal = tile.half_horizontal_diag() as f32;
    let half_vertical = tile.half_vertical_diag() as f32;

    [
        MacroquadVec2::new(origin.x + half_horizontal, origin.y),
        MacroquadVec2::new(origin.x + 2.0 * half_horizontal, origin.y + half_vertical),
        MacroquadVec2::new(origin.x + half_horizontal, origin.y + 2.0 * half_vertical),
        MacroquadVec2::new(origin.x, origin.y + half_vertical),
    ]
}

fn diamond_center(origin: Vec2, tile: &TileDescription) -> Vec2 {
    Vec2::new(
        origin.x + tile.half_horizontal_diag() as f32,
        origin.y + tile.half_vertical_diag() as f32,
    )
}

/// Paints one draw-list element translated by the camera offset.
pub(crate) fn draw_sprite(instance: &SpriteInstance, tile: &TileDescription, translation: Vec2) {
    let origin = instance.offset + translation;
    let color = to_macroquad_color(instance.tint);

    match instance.key {
        SpriteKey::TileEmpty | SpriteKey::TileWall | SpriteKey::TileFinish => {
            let [top, right, bottom, left] = diamond_corners(origin, tile);
            draw_triangle(top, right, bottom, color);
            draw_triangle(top, bottom, left, color);
        }
        SpriteKey::HoverMarker | SpriteKey::FinishMarker => {
            let center = diamond_center(origin, tile);
            let corners = diamond_corners(origin, tile).map(|corner| {
                MacroquadVec2::new(
                    center.x + (corner.x - center.x) * MARKER_INSET,
                    center.y + (corner.y - center.y) * MARKER_INSET,
                )
            });
            for index in 0..corners.len() {
                let from = corners[index];
                let to = corners[(index + 1) % corners.len()];
                draw_line(from.x, from.y, to.x, to.y, 2.0, color);
            }
        }
        SpriteKey::Wanderer => {
            let center = diamond_center(origin, tile);
            let radius = body_radius(tile);
            draw_circle(center.x, center.y, radius, color);
        }
        SpriteKey::Sentinel => {
            let center = diamond_center(origin, tile);
            let half = body_radius(tile) * 0.9;
            draw_rectangle(center.x - half, center.y - half, 2.0 * half, 2.0 * half, color);
        }
    }
}

fn body_radius(tile: &TileDescription) -> f32 {
    let half_horizontal = tile.half_horizontal_diag() as f32;
    let half_vertical = tile.half_vertical_diag() as f32;
    half_horizontal.min(half_vertical) * BODY_RADIUS_FACTOR
}

/// Dims the frame and announces the terminal level state.
pub(crate) fn draw_overlay(overlay: SceneOverlay, screen_width: f32, screen_height: f32) {
    draw_rectangle(
        0.0,
        0.0,
        screen_width,
        screen_height,
        macroquad::color::Color::new(0.0, 0.0, 0.0, 0.55),
    );

    let message = match overlay {
        SceneOverlay::LevelCompleted => "Level completed!",
        SceneOverlay::GameOver => "Game over",
    };
    let font_size = 48.0;
    let text_width = message.len() as f32 * font_size * 0.45;
    let _ = draw_text(
        message,
        (screen_width - text_width) * 0.5,
        screen_height * 0.5,
        font_size,
        macroquad::color::WHITE,
    );
}
