//! Resolves [`Anchor`]ed entities to screen positions.
//!
//! ```text
//! Layout = anchor.point_in(logical area) + Position
//! ```
//!
//! Recomputed for every anchored entity when the window is resized, and for
//! a single entity when an `Anchor` is attached to it. An anchored entity
//! without a [`Position`] gets `Position::ZERO`.

use glam::Vec2;
use log::trace;

use crate::components::{Anchor, Layout, Position, Rect};
use crate::ecs::{Entity, System, World};
use crate::error::BoxError;
use crate::events::{ComponentAdded, WindowResized};

pub struct LayoutSystem {
    area: Rect,
}

impl LayoutSystem {
    /// Starts out assuming the whole logical area is visible.
    pub fn new(logical_size: Vec2) -> Self {
        Self {
            area: Rect::from_size(logical_size),
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    fn window_resized(&mut self, world: &mut World, event: &WindowResized) {
        self.area = event.logical;
        for entity in world.entities::<(&Anchor,)>() {
            self.place(world, entity);
        }
    }

    fn anchor_added(&mut self, world: &mut World, event: &ComponentAdded<Anchor>) {
        self.place(world, event.entity);
    }

    fn place(&self, world: &mut World, entity: Entity) {
        let Some(anchor) = world.try_get::<Anchor>(entity).copied() else {
            trace!("{entity:?} lost its anchor before layout");
            return;
        };
        let offset = match world.try_get::<Position>(entity) {
            Some(position) => position.0,
            None => {
                if world.attach(entity, Position::ZERO).is_err() {
                    return;
                }
                Vec2::ZERO
            }
        };
        let layout = Layout(anchor.point_in(&self.area) + offset);
        if world.attach(entity, layout).is_err() {
            trace!("{entity:?} is gone, layout skipped");
        }
    }
}

impl Default for LayoutSystem {
    fn default() -> Self {
        Self::new(Vec2::new(1920.0, 1080.0))
    }
}

impl System for LayoutSystem {
    fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
        world.listen(LayoutSystem::window_resized)?;
        world.listen(LayoutSystem::anchor_added)?;
        Ok(())
    }

    fn update(&mut self, _world: &mut World) {}
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::components::{Horizontal, Vertical};

    fn world_with_layout() -> World {
        let mut world = World::new();
        world.add_system(LayoutSystem::new(Vec2::new(800.0, 600.0)));
        world.tick_by(Duration::ZERO);
        world
    }

    #[test]
    fn anchor_added_places_entity() {
        let mut world = world_with_layout();
        let e = world.spawn((
            Anchor::new(Horizontal::Right, Vertical::Bottom),
            Position::new(-10.0, -20.0),
        ));
        world.tick_by(Duration::ZERO);
        assert_eq!(
            world.get::<Layout>(e).unwrap(),
            &Layout(Vec2::new(790.0, 580.0))
        );
    }

    #[test]
    fn missing_position_is_inserted_as_zero() {
        let mut world = world_with_layout();
        let e = world.create_entity();
        world
            .attach(e, Anchor::new(Horizontal::Center, Vertical::Center))
            .unwrap();
        world.tick_by(Duration::ZERO);
        assert_eq!(world.get::<Position>(e).unwrap(), &Position::ZERO);
        assert_eq!(
            world.get::<Layout>(e).unwrap(),
            &Layout(Vec2::new(400.0, 300.0))
        );
    }

    #[test]
    fn resize_moves_every_anchored_entity() {
        let mut world = world_with_layout();
        let left = world.spawn((Anchor::new(Horizontal::Left, Vertical::Top),));
        let right = world.spawn((Anchor::new(Horizontal::Right, Vertical::Top),));
        world.tick_by(Duration::ZERO);

        world.emit(WindowResized {
            window: Vec2::new(1000.0, 600.0),
            logical: Rect::new(Vec2::new(-100.0, 0.0), Vec2::new(1000.0, 600.0)),
        });
        world.tick_by(Duration::ZERO);
        assert_eq!(world.get::<Layout>(left).unwrap().0, Vec2::new(-100.0, 0.0));
        assert_eq!(world.get::<Layout>(right).unwrap().0, Vec2::new(900.0, 0.0));
    }

    #[test]
    fn entity_destroyed_before_flush_is_skipped() {
        let mut world = world_with_layout();
        let e = world.spawn((Anchor::default(),));
        world.destroy_entity(e).unwrap();
        world.tick_by(Duration::ZERO);
        assert!(!world.has::<Layout>(e));
        assert_eq!(world.count::<Layout>(), 0);
    }
}
