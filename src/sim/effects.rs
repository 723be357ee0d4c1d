//! Visual-only pools: particles, floating texts, area bursts, star field
//!
//! These animate even while the run is paused or over and never feed back
//! into gameplay. They draw from their own RNG stream so spawning effects
//! cannot shift gameplay randomness.

use glam::Vec2;

use super::entity::{AreaBurst, FloatingText, Particle, Star};
use super::rng::SimRng;
use crate::consts::MAX_PARTICLES;

/// Stars in the parallax field
pub const STAR_COUNT: usize = 90;

/// Palette slots the renderer maps to colors
pub mod palette {
    pub const SPARK: u32 = 0;
    pub const VILLAIN: u32 = 1;
    pub const ASTEROID: u32 = 2;
    pub const PICKUP: u32 = 3;
    pub const POWER_UP: u32 = 4;
    pub const SHIELD: u32 = 5;
    pub const BOSS: u32 = 6;
}

/// Effect pools plus their private RNG
#[derive(Debug, Clone)]
pub struct Effects {
    rng: SimRng,
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    pub bursts: Vec<AreaBurst>,
    pub stars: Vec<Star>,
}

impl Effects {
    pub fn new(seed: u64, viewport: Vec2) -> Self {
        let mut fx = Self {
            rng: SimRng::new(seed ^ 0x5EED_F00D_CAFE_D00D),
            particles: Vec::new(),
            texts: Vec::new(),
            bursts: Vec::new(),
            stars: Vec::with_capacity(STAR_COUNT),
        };
        for _ in 0..STAR_COUNT {
            let star = Star {
                pos: Vec2::new(fx.rng.range(0.0, viewport.x), fx.rng.range(0.0, viewport.y)),
                depth: fx.rng.range(0.15, 1.0),
                size: fx.rng.range(0.6, 2.4),
            };
            fx.stars.push(star);
        }
        fx
    }

    /// Radial spray of `count` particles
    pub fn explode(&mut self, pos: Vec2, count: usize, speed: f32, color: u32) {
        for _ in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                self.particles.remove(0);
            }
            let angle = self.rng.range(0.0, std::f32::consts::TAU);
            let v = Vec2::from_angle(angle) * self.rng.range(speed * 0.3, speed);
            self.particles.push(Particle {
                pos,
                vel: v,
                life: 1.0,
                decay: self.rng.range(1.4, 2.6),
                size: self.rng.range(1.5, 4.0),
                color,
            });
        }
    }

    /// Drifting "+N" style label
    pub fn float_text(&mut self, pos: Vec2, text: impl Into<String>) {
        self.texts.push(FloatingText {
            pos,
            vel: Vec2::new(0.0, -48.0),
            text: text.into(),
            life_ms: 900.0,
            max_life_ms: 900.0,
        });
    }

    /// Expanding ring out to `radius`
    pub fn area_burst(&mut self, pos: Vec2, radius: f32) {
        self.bursts.push(AreaBurst {
            pos,
            radius: 0.0,
            max_radius: radius,
            life_ms: 450.0,
            max_life_ms: 450.0,
        });
    }

    /// Animate every pool; `scroll_speed` drives the star field
    pub fn update(&mut self, dt_ms: f32, scroll_speed: f32, viewport: Vec2) {
        let dt = dt_ms / 1000.0;

        for p in &mut self.particles {
            p.pos += p.vel * dt;
            p.vel *= (1.0 - 1.8 * dt).max(0.0);
            p.life -= p.decay * dt;
        }
        self.particles.retain(|p| p.life > 0.0);

        for t in &mut self.texts {
            t.pos += t.vel * dt;
            t.life_ms -= dt_ms;
        }
        self.texts.retain(|t| t.life_ms > 0.0);

        for b in &mut self.bursts {
            b.life_ms -= dt_ms;
            let t = 1.0 - (b.life_ms / b.max_life_ms).max(0.0);
            b.radius = b.max_radius * crate::ease_out_cubic(t);
        }
        self.bursts.retain(|b| b.life_ms > 0.0);

        for s in &mut self.stars {
            s.pos.x -= scroll_speed * s.depth * dt;
            if s.pos.x < -s.size {
                s.pos.x += viewport.x + s.size * 2.0;
                s.pos.y = self.rng.range(0.0, viewport.y);
            }
        }
    }

    /// Drop transient effects (stars stay)
    pub fn clear(&mut self) {
        self.particles.clear();
        self.texts.clear();
        self.bursts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_expire_and_cap() {
        let mut fx = Effects::new(1, Vec2::new(960.0, 540.0));
        fx.explode(Vec2::ZERO, MAX_PARTICLES + 40, 200.0, palette::SPARK);
        assert_eq!(fx.particles.len(), MAX_PARTICLES);
        for _ in 0..120 {
            fx.update(1000.0 / 60.0, 0.0, Vec2::new(960.0, 540.0));
        }
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn test_stars_wrap() {
        let viewport = Vec2::new(960.0, 540.0);
        let mut fx = Effects::new(3, viewport);
        assert_eq!(fx.stars.len(), STAR_COUNT);
        for _ in 0..600 {
            fx.update(1000.0 / 60.0, 400.0, viewport);
        }
        for s in &fx.stars {
            assert!(s.pos.x >= -s.size && s.pos.x <= viewport.x + s.size * 2.0);
        }
    }

    #[test]
    fn test_burst_grows_then_fades() {
        let mut fx = Effects::new(3, Vec2::new(960.0, 540.0));
        fx.area_burst(Vec2::ZERO, 200.0);
        fx.update(225.0, 0.0, Vec2::new(960.0, 540.0));
        assert!(fx.bursts[0].radius > 100.0 && fx.bursts[0].radius < 200.0);
        fx.update(300.0, 0.0, Vec2::new(960.0, 540.0));
        assert!(fx.bursts.is_empty());
    }
}
