//! # Spawn Protection
//!
//! Guards the area around a world's spawn point against modification by
//! players without operator-level rights. The zone knows nothing about
//! permissions or worlds itself; the host answers those questions through
//! [`SpawnWorld`].

use serde::{Deserialize, Serialize};

/// Permission node that exempts a player from spawn protection.
pub const SPAWN_PROTECT_BYPASS: &str = "spawnprotect.bypass";

/// 2D position on the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Vec2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 3D world position, `y` being the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Projection onto the horizontal plane, `(x, z)`.
    pub fn horizontal(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }

    pub fn horizontal_distance(&self, other: Vec3) -> f64 {
        self.horizontal().distance(other.horizontal())
    }
}

/// World and permission queries the spawn zone relies on.
pub trait SpawnWorld {
    type Player;

    /// Whether `player` holds [`SPAWN_PROTECT_BYPASS`].
    fn is_exempt(&self, player: &Self::Player) -> bool;

    /// Protection radius in blocks, negative when disabled.
    fn spawn_radius(&self) -> i32;

    fn spawn_location(&self) -> Vec3;

    /// Number of server operators.
    fn op_count(&self) -> usize;
}

/// An area in which some players may not act.
pub trait ProtectedZone {
    type Player;

    fn is_protected(&self, player: &Self::Player, action_pos: Vec3) -> bool;
}

/// Protection around the spawn point of one world.
#[derive(Debug)]
pub struct SpawnProtectionZone<W> {
    world: W,
}

impl<W: SpawnWorld> SpawnProtectionZone<W> {
    pub fn new(world: W) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &W {
        &self.world
    }
}

impl<W: SpawnWorld> ProtectedZone for SpawnProtectionZone<W> {
    type Player = W::Player;

    /// Protected when the radius is enabled, at least one operator exists,
    /// the player is not exempt and the action lies within the radius of
    /// spawn on the horizontal plane.
    fn is_protected(&self, player: &Self::Player, action_pos: Vec3) -> bool {
        let radius = self.world.spawn_radius();
        if radius < 0 || self.world.is_exempt(player) || self.world.op_count() == 0 {
            return false;
        }
        action_pos.horizontal_distance(self.world.spawn_location()) <= f64::from(radius)
    }
}
