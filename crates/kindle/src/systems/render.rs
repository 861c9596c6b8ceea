//! Draws labels and sprites through a [`Renderer`].
//!
//! ```text
//! sort Renderable by depth (stable)
//! begin_frame(clear)
//! for each visible (Renderable, Position, Color):
//!     at Layout if present, else Position
//!     draw Label, or else Sprite
//! end_frame
//! ```

use log::debug;

use crate::backend::Renderer;
use crate::components::{Color, Label, Layout, Position, Renderable, Sprite};
use crate::ecs::{System, World};
use crate::error::BoxError;
use crate::events::ToggleFullscreen;

pub struct RenderSystem {
    renderer: Box<dyn Renderer>,
    clear_color: Color,
    fullscreen: bool,
}

impl RenderSystem {
    pub fn new(renderer: impl Renderer + 'static, clear_color: Color) -> Self {
        Self::from_boxed(Box::new(renderer), clear_color)
    }

    pub fn from_boxed(renderer: Box<dyn Renderer>, clear_color: Color) -> Self {
        Self {
            renderer,
            clear_color,
            fullscreen: false,
        }
    }

    /// Start in fullscreen. The renderer is told during `init`.
    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn toggle_fullscreen(&mut self, _world: &mut World, _event: &ToggleFullscreen) {
        self.fullscreen = !self.fullscreen;
        debug!("fullscreen {}", if self.fullscreen { "on" } else { "off" });
        self.renderer.set_fullscreen(self.fullscreen);
    }
}

impl System for RenderSystem {
    fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
        world.listen(RenderSystem::toggle_fullscreen)?;
        if self.fullscreen {
            self.renderer.set_fullscreen(true);
        }
        Ok(())
    }

    fn update(&mut self, world: &mut World) {
        world.sort::<Renderable>(|a, b| a.depth.total_cmp(&b.depth));

        self.renderer.begin_frame(self.clear_color);
        for entity in world.entities::<(&Renderable, &Position, &Color)>() {
            let (Ok(renderable), Ok(position), Ok(color)) = (
                world.get::<Renderable>(entity),
                world.get::<Position>(entity),
                world.get::<Color>(entity),
            ) else {
                continue;
            };
            if !renderable.visible {
                continue;
            }
            let at = world
                .try_get::<Layout>(entity)
                .map_or(position.0, |layout| layout.0);
            if let Some(label) = world.try_get::<Label>(entity) {
                self.renderer.draw_label(label, at, *color);
            } else if let Some(sprite) = world.try_get::<Sprite>(entity) {
                self.renderer.draw_sprite(sprite, at, *color);
            }
        }
        self.renderer.end_frame();
    }
}
