//! Named entity groups

use std::fmt;

/// Collection an entity is updated, drawn and collision-checked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    /// Scenery drawn behind everything
    BackgroundObjects,
    /// The player's ships
    FriendlyShips,
    /// Hostile ships
    EnemyShips,
    /// Shots fired by the player's side
    FriendlyProjectiles,
    /// Shots fired by hostile ships
    EnemyProjectiles,
    /// Items the player can collect
    Pickups,
    /// Obstacles that interact with everything
    Objects,
}

impl Group {
    /// Every group, in update and draw order
    pub const UPDATE_ORDER: [Group; 7] = [
        Group::BackgroundObjects,
        Group::FriendlyShips,
        Group::EnemyShips,
        Group::FriendlyProjectiles,
        Group::EnemyProjectiles,
        Group::Pickups,
        Group::Objects,
    ];

    /// Group name used in logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::BackgroundObjects => "background_objects",
            Self::FriendlyShips => "friendly_ships",
            Self::EnemyShips => "enemy_ships",
            Self::FriendlyProjectiles => "friendly_projectiles",
            Self::EnemyProjectiles => "enemy_projectiles",
            Self::Pickups => "pickups",
            Self::Objects => "objects",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Group pairs checked for collisions each frame
pub const COLLIDABLE_PAIRS: [(Group, Group); 8] = [
    (Group::FriendlyShips, Group::EnemyProjectiles),
    (Group::EnemyShips, Group::FriendlyProjectiles),
    (Group::FriendlyShips, Group::EnemyShips),
    (Group::FriendlyShips, Group::Pickups),
    (Group::FriendlyShips, Group::Objects),
    (Group::EnemyShips, Group::Objects),
    (Group::FriendlyProjectiles, Group::Objects),
    (Group::EnemyProjectiles, Group::Objects),
];
