//! Velocity steering for controllable ships

use crate::foundation::math::Vec2;

/// Steers a velocity towards the input direction at a bounded acceleration
/// and caps the resulting speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicController {
    /// Velocity change per second, per axis
    pub acceleration: f32,
    /// Hard cap on the speed magnitude
    pub max_speed: f32,
}

impl KinematicController {
    /// Create a controller
    pub fn new(acceleration: f32, max_speed: f32) -> Self {
        Self {
            acceleration: acceleration.max(0.0),
            max_speed: max_speed.max(0.0),
        }
    }

    /// New velocity after `elapsed` seconds of steering in `direction`.
    ///
    /// Each axis approaches `direction * max_speed` independently without
    /// overshooting, then the magnitude is scaled down to `max_speed` if it
    /// exceeds it. Diagonal input therefore accelerates as fast as straight
    /// input but never exceeds the circular cap.
    pub fn steer(&self, velocity: Vec2, direction: Vec2, elapsed: f32) -> Vec2 {
        let step = self.acceleration * elapsed.max(0.0);
        let target = direction * self.max_speed;

        let mut next = Vec2::new(
            approach(velocity.x, target.x, step),
            approach(velocity.y, target.y, step),
        );
        self.clamp_speed(&mut next);
        next
    }

    /// Scale `velocity` down so its magnitude is at most `max_speed`,
    /// keeping its direction
    pub fn clamp_speed(&self, velocity: &mut Vec2) {
        let speed = velocity.norm();
        if speed > self.max_speed && speed > 0.0 {
            *velocity *= self.max_speed / speed;
        }
    }
}

fn approach(current: f32, target: f32, step: f32) -> f32 {
    if target > current {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

/// Direction input held by a controllable ship, one axis value in -1..=1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Steering {
    dirx: i8,
    diry: i8,
}

impl Steering {
    /// Press left, or release right
    pub fn accel_left(&mut self) {
        self.dirx = (self.dirx - 1).max(-1);
    }

    /// Press right, or release left
    pub fn accel_right(&mut self) {
        self.dirx = (self.dirx + 1).min(1);
    }

    /// Press up, or release down
    pub fn accel_up(&mut self) {
        self.diry = (self.diry - 1).max(-1);
    }

    /// Press down, or release up
    pub fn accel_down(&mut self) {
        self.diry = (self.diry + 1).min(1);
    }

    /// Drop all input
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Input as a vector in screen space (y grows downwards)
    pub fn direction(&self) -> Vec2 {
        Vec2::new(f32::from(self.dirx), f32::from(self.diry))
    }

    /// Whether any direction is held
    pub fn is_moving(&self) -> bool {
        self.dirx != 0 || self.diry != 0
    }
}
