//! Player input
//!
//! Key events are mapped to actions through [`KeyBindings`] and applied to
//! the player's ship. Releasing a direction key applies the opposite
//! acceleration, so holding left and right at once cancels out.

use std::collections::{HashMap, HashSet};

use crate::entity::Ship;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// P key
    P,
    /// Q key
    Q,
    /// S key
    S,
    /// W key
    W,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Accelerate left
    Left,
    /// Accelerate right
    Right,
    /// Accelerate up
    Up,
    /// Accelerate down
    Down,
    /// Hold the trigger
    Fire,
    /// Leave the game
    Quit,
}

/// Discrete input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key went down
    KeyDown(KeyCode),
    /// A key went up
    KeyUp(KeyCode),
    /// The window was closed
    Quit,
}

/// What the frame loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Keep running
    Continue,
    /// Stop the game
    Quit,
}

/// Key to action table
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyCode, Action>,
}

impl KeyBindings {
    /// No key bound
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a key, replacing its previous action (builder pattern)
    pub fn with_binding(mut self, key: KeyCode, action: Action) -> Self {
        self.bindings.insert(key, action);
        self
    }

    /// Action bound to a key
    pub fn action(&self, key: KeyCode) -> Option<Action> {
        self.bindings.get(&key).copied()
    }
}

impl Default for KeyBindings {
    /// Arrow keys steer, space fires, escape quits
    fn default() -> Self {
        Self::empty()
            .with_binding(KeyCode::Left, Action::Left)
            .with_binding(KeyCode::Right, Action::Right)
            .with_binding(KeyCode::Up, Action::Up)
            .with_binding(KeyCode::Down, Action::Down)
            .with_binding(KeyCode::Space, Action::Fire)
            .with_binding(KeyCode::Escape, Action::Quit)
    }
}

/// Input manager
#[derive(Debug, Clone, Default)]
pub struct InputManager {
    bindings: KeyBindings,
    held: HashSet<KeyCode>,
}

impl InputManager {
    /// Create a manager with the given bindings
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
        }
    }

    /// Bindings in use
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Whether a key is currently down
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Apply one event to the player's ship. Repeated key-downs of a held
    /// key and key-ups of keys that are not held are ignored.
    pub fn handle(&mut self, event: InputEvent, ship: &mut Ship) -> Command {
        match event {
            InputEvent::Quit => return Command::Quit,
            InputEvent::KeyDown(key) => {
                if let Some(action) = self.bindings.action(key) {
                    if action == Action::Quit {
                        return Command::Quit;
                    }
                    if self.held.insert(key) {
                        press(action, ship);
                    }
                }
            }
            InputEvent::KeyUp(key) => {
                if self.held.remove(&key) {
                    if let Some(action) = self.bindings.action(key) {
                        release(action, ship);
                    }
                }
            }
        }
        Command::Continue
    }

    /// Release every held key
    pub fn release_all(&mut self, ship: &mut Ship) {
        for key in self.held.drain() {
            if let Some(action) = self.bindings.action(key) {
                release(action, ship);
            }
        }
    }
}

fn press(action: Action, ship: &mut Ship) {
    match action {
        Action::Left => ship.accel_left(),
        Action::Right => ship.accel_right(),
        Action::Up => ship.accel_up(),
        Action::Down => ship.accel_down(),
        Action::Fire => ship.start_firing(),
        Action::Quit => {}
    }
}

fn release(action: Action, ship: &mut Ship) {
    match action {
        Action::Left => ship.accel_right(),
        Action::Right => ship.accel_left(),
        Action::Up => ship.accel_down(),
        Action::Down => ship.accel_up(),
        Action::Fire => ship.stop_firing(),
        Action::Quit => {}
    }
}
