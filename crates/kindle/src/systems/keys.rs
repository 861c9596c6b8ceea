//! Global key chords: quit and fullscreen toggle.

use log::debug;

use crate::ecs::{System, World};
use crate::error::BoxError;
use crate::events::{AppWantsClose, KeyUp, ToggleFullscreen};
use crate::input::{Key, KeyChord, Modifiers};

/// Emits [`AppWantsClose`] and [`ToggleFullscreen`] when their chords are
/// released. Either chord can be unbound with [`Key::Unknown`].
pub struct KeysSystem {
    exit: KeyChord,
    toggle_fullscreen: KeyChord,
}

impl KeysSystem {
    pub const DEFAULT_EXIT: KeyChord = KeyChord::new(Key::Escape);
    pub const DEFAULT_TOGGLE_FULLSCREEN: KeyChord = KeyChord::with(Modifiers::ALT, Key::Return);

    pub fn new(exit: KeyChord, toggle_fullscreen: KeyChord) -> Self {
        Self {
            exit,
            toggle_fullscreen,
        }
    }

    fn key_up(&mut self, world: &mut World, event: &KeyUp) {
        if self.exit.matches(event.key, event.modifiers) {
            debug!("exit chord released");
            world.emit(AppWantsClose);
        } else if self.toggle_fullscreen.matches(event.key, event.modifiers) {
            debug!("fullscreen chord released");
            world.emit(ToggleFullscreen);
        }
    }
}

impl Default for KeysSystem {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EXIT, Self::DEFAULT_TOGGLE_FULLSCREEN)
    }
}

impl System for KeysSystem {
    fn init(&mut self, world: &mut World) -> Result<(), BoxError> {
        world.listen(KeysSystem::key_up)?;
        Ok(())
    }

    fn update(&mut self, _world: &mut World) {}
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;

    fn world_with_keys(keys: KeysSystem) -> (World, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let mut world = World::new();
        let closes = Rc::new(Cell::new(0));
        let toggles = Rc::new(Cell::new(0));
        let owner = world.new_owner();
        let c = Rc::clone(&closes);
        world.subscribe::<AppWantsClose>(owner, move |_, _| c.set(c.get() + 1));
        let t = Rc::clone(&toggles);
        world.subscribe::<ToggleFullscreen>(owner, move |_, _| t.set(t.get() + 1));
        world.add_system(keys);
        world.tick_by(Duration::ZERO);
        (world, closes, toggles)
    }

    #[test]
    fn escape_release_requests_close() {
        let (mut world, closes, toggles) = world_with_keys(KeysSystem::default());
        world.emit(KeyUp {
            key: Key::Escape,
            modifiers: Modifiers::NONE,
        });
        world.tick_by(Duration::ZERO);
        assert_eq!(closes.get(), 1);
        assert_eq!(toggles.get(), 0);
    }

    #[test]
    fn alt_return_toggles_fullscreen_with_either_alt() {
        let (mut world, closes, toggles) = world_with_keys(KeysSystem::default());
        for modifiers in [Modifiers::LEFT_ALT, Modifiers::RIGHT_ALT | Modifiers::LEFT_SHIFT] {
            world.emit(KeyUp {
                key: Key::Return,
                modifiers,
            });
        }
        world.emit(KeyUp {
            key: Key::Return,
            modifiers: Modifiers::NONE,
        });
        world.tick_by(Duration::ZERO);
        assert_eq!(toggles.get(), 2);
        assert_eq!(closes.get(), 0);
    }

    #[test]
    fn unbound_chord_never_fires() {
        let keys = KeysSystem::new(KeyChord::new(Key::Unknown), KeyChord::new(Key::Unknown));
        let (mut world, closes, _) = world_with_keys(keys);
        world.emit(KeyUp {
            key: Key::Unknown,
            modifiers: Modifiers::NONE,
        });
        world.tick_by(Duration::ZERO);
        assert_eq!(closes.get(), 0);
    }

    #[test]
    fn removing_the_system_drops_its_listener() {
        let (mut world, closes, _) = world_with_keys(KeysSystem::default());
        assert!(world.has_listeners::<KeyUp>());
        assert!(world.remove_system::<KeysSystem>());
        assert!(!world.has_listeners::<KeyUp>());

        world.emit(KeyUp {
            key: Key::Escape,
            modifiers: Modifiers::NONE,
        });
        world.tick_by(Duration::ZERO);
        assert_eq!(closes.get(), 0);
    }
}
