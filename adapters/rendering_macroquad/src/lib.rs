#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tilescape.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without
//! its default `audio` feature.
//!
//! Sprites are painted with macroquad shape primitives; the draw list
//! arrives pre-sorted and is rendered strictly in order.

mod sprites;

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_mouse_button_down, is_mouse_button_pressed, mouse_position, KeyCode,
    MouseButton,
};
use std::time::{Duration, Instant};
use tilescape_rendering::{FrameInput, Presentation, RenderingBackend, Scene};

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the render loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_width: u32,
    window_height: u32,
    fullscreen: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            window_width: 1280,
            window_height: 800,
            fullscreen: false,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the dimensions of the created window in pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Configures whether the window covers the whole display.
    #[must_use]
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the
    /// display refresh rate or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averages once one second elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let metrics = if seconds <= f32::EPSILON || frames == 0 {
            None
        } else {
            Some(FpsMetrics {
                per_second: frames as f32 / seconds,
                avg_render: self.render_accum / frames,
            })
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.render_accum = Duration::ZERO;
        metrics
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_width,
            window_height,
            fullscreen,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_width as i32,
            window_height: window_height as i32,
            fullscreen,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = sprites::to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut previous_cursor = cursor_position();

            loop {
                let keyboard = KeyboardShortcuts::poll();

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let view_origin = view_origin(&scene, screen_width, screen_height);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let cursor = cursor_position();
                let frame_input = frame_input_from_observations(
                    cursor,
                    previous_cursor,
                    keyboard.quit_requested,
                    is_mouse_button_down(MouseButton::Middle),
                    is_mouse_button_pressed(MouseButton::Left),
                    is_mouse_button_pressed(MouseButton::Right),
                    view_origin + scene.camera_offset,
                );
                previous_cursor = cursor;

                update_scene(frame_dt, frame_input, &mut scene);

                // The simulation observes the quit in its final snapshot
                // before the loop stops.
                if keyboard.quit_requested {
                    break;
                }

                let render_start = Instant::now();
                let translation = view_origin + scene.camera_offset;
                for instance in &scene.draw_list {
                    sprites::draw_sprite(instance, &scene.field.tile, translation);
                }
                if let Some(overlay) = scene.overlay {
                    sprites::draw_overlay(overlay, screen_width, screen_height);
                }
                let render_duration = render_start.elapsed();

                if let Some(FpsMetrics {
                    per_second,
                    avg_render,
                }) = fps_counter.record_frame(frame_dt, render_duration)
                {
                    if show_fps {
                        log::info!(
                            "FPS: {:.2} | render: {:.2}ms",
                            per_second,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn cursor_position() -> Vec2 {
    let (x, y) = mouse_position();
    Vec2::new(x, y)
}

/// Screen-space origin that centers the projected field.
fn view_origin(scene: &Scene, screen_width: f32, screen_height: f32) -> Vec2 {
    let field = &scene.field;
    let centering = Vec2::new(
        (screen_width - field.pixel_width()) * 0.5,
        (screen_height - field.pixel_height()) * 0.5,
    );
    // The leftmost tile anchors at negative x; shift so it stays visible.
    let left_extent =
        (field.rows.saturating_sub(1) * field.tile.half_horizontal_diag() as u32) as f32;
    centering + Vec2::new(left_extent, 0.0)
}

/// Derives the per-frame input snapshot from raw pointer and keyboard
/// observations.
fn frame_input_from_observations(
    cursor: Vec2,
    previous_cursor: Vec2,
    quit_requested: bool,
    panning: bool,
    spawn_click: bool,
    inspect_click: bool,
    world_translation: Vec2,
) -> FrameInput {
    FrameInput {
        quit_requested,
        pan_delta: if panning {
            cursor - previous_cursor
        } else {
            Vec2::ZERO
        },
        cursor_world_space: Some(cursor - world_translation),
        spawn_action: spawn_click && !panning,
        inspect_action: inspect_click && !panning,
    }
}
