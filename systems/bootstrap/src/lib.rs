#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Tilescape experience.

use tilescape_world::{
    query::{self, FieldView},
    World,
};

/// Produces data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner(&self, world: &World) -> &'static str {
        query::welcome_banner(world)
    }

    /// Exposes the field configuration required for rendering.
    #[must_use]
    pub fn field<'world>(&self, world: &'world World) -> FieldView<'world> {
        query::field_view(world)
    }
}
