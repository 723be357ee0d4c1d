//! Asteroid field director and rigid-circle resolution
//!
//! Steady spawns place single rocks with a clustering bias while avoiding
//! overlap. Meteor showers drop a whole formation at once, trimming the pool
//! to stay under the cap. After every spawn batch, and every step, pairwise
//! resolution keeps the field non-overlapping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Asteroid;
use super::rng::SimRng;
use super::state::SimulationState;
use crate::clamp_range;
use crate::config::{AsteroidConfig, MeteorShowerConfig};

/// Extra separation added when pushing a pair apart
const SEPARATION_SLOP: f32 = 1e-3;

/// Timers for steady spawns and meteor showers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AsteroidDirector {
    pub spawn_timer_ms: f32,
    pub shower_timer_ms: f32,
    pub showers: u32,
}

impl AsteroidDirector {
    pub fn new(asteroids: &AsteroidConfig, showers: &MeteorShowerConfig) -> Self {
        Self {
            spawn_timer_ms: asteroids.initial_delay_ms,
            shower_timer_ms: showers.first_delay_ms,
            showers: 0,
        }
    }
}

/// Health for a rock of `radius`
pub fn asteroid_health(radius: f32, config: &AsteroidConfig) -> f32 {
    (radius / config.radius_per_health).round().max(1.0)
}

fn overlaps_any(pos: Vec2, radius: f32, existing: &[Asteroid], spacing: f32) -> bool {
    existing.iter().any(|a| {
        let min = a.radius + radius + spacing;
        a.pos.distance_squared(pos) < min * min
    })
}

/// Find a spawn position right of the viewport that clears every existing rock.
///
/// Candidates are either anchored near an existing rock or scattered. When
/// every attempt collides, the rock goes behind the rightmost one.
pub fn place_asteroid(
    existing: &[Asteroid],
    radius: f32,
    viewport: Vec2,
    config: &AsteroidConfig,
    rng: &mut SimRng,
) -> Vec2 {
    let spawn_x = viewport.x + radius;
    let min_y = radius;
    let max_y = (viewport.y - radius).max(radius);

    for _ in 0..config.placement_attempts {
        let candidate = if !existing.is_empty() && rng.chance(config.cluster_bias) {
            let anchor = &existing[rng.index(existing.len())];
            let angle = rng.range(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
            let dist = anchor.radius + radius + config.min_spacing + rng.range(4.0, 60.0);
            let p = anchor.pos + Vec2::from_angle(angle) * dist;
            Vec2::new(p.x.max(spawn_x), clamp_range(p.y, min_y, max_y))
        } else {
            Vec2::new(spawn_x + rng.range(10.0, 160.0), rng.range(min_y, max_y))
        };

        if !overlaps_any(candidate, radius, existing, config.min_spacing) {
            return candidate;
        }
    }

    let rightmost = existing
        .iter()
        .map(|a| a.pos.x + a.radius)
        .fold(spawn_x, f32::max);
    log::debug!("Asteroid placement exhausted, spawning behind the field");
    Vec2::new(
        rightmost + radius + config.min_spacing + SEPARATION_SLOP,
        rng.range(min_y, max_y),
    )
}

/// Delay until the next steady spawn
pub fn next_spawn_interval(config: &AsteroidConfig, speed: f32, intensity: f32, rng: &mut SimRng) -> f32 {
    let pace = (speed * intensity).max(0.1);
    let jitter = rng.range(0.85, 1.2);
    (config.spawn_interval_ms / pace * jitter).max(config.min_spawn_interval_ms)
}

/// Spawn one rock; returns its id, or `None` at the cap
pub fn spawn_asteroid(state: &mut SimulationState) -> Option<u32> {
    let cfg = &state.config.asteroids;
    if state.asteroids.len() >= cfg.max_count {
        return None;
    }
    let viewport = state.viewport();
    let radius = state.rng.range(cfg.min_radius, cfg.max_radius);
    let pos = place_asteroid(&state.asteroids, radius, viewport, cfg, &mut state.rng);
    let speed = state.game_speed * state.rng.range(cfg.speed_min_ratio, cfg.speed_max_ratio);
    let vy = state.rng.range(-cfg.vertical_drift, cfg.vertical_drift);
    let health = asteroid_health(radius, cfg);
    let spin = state.rng.range(-1.2, 1.2);

    let id = state.next_entity_id();
    let mut rock = Asteroid::new(id, pos, Vec2::new(-speed, vy), radius, health);
    rock.rotation_speed = spin;
    state.asteroids.push(rock);
    Some(id)
}

/// Indices to drop so `incoming` new rocks fit under `cap`.
///
/// Rocks furthest outside the viewport go first, then the oldest by id.
pub fn trim_order(asteroids: &[Asteroid], incoming: usize, cap: usize, viewport: Vec2) -> Vec<usize> {
    let need = (asteroids.len() + incoming).saturating_sub(cap).min(asteroids.len());
    if need == 0 {
        return Vec::new();
    }
    let offscreen = |a: &Asteroid| {
        let left = -(a.pos.x + a.radius);
        let right = a.pos.x - a.radius - viewport.x;
        let top = -(a.pos.y + a.radius);
        let bottom = a.pos.y - a.radius - viewport.y;
        left.max(right).max(top).max(bottom).max(0.0)
    };
    let mut order: Vec<usize> = (0..asteroids.len()).collect();
    order.sort_by(|&i, &j| {
        offscreen(&asteroids[j])
            .total_cmp(&offscreen(&asteroids[i]))
            .then(asteroids[i].id.cmp(&asteroids[j].id))
    });
    order.truncate(need);
    order
}

/// Drop a meteor shower formation anchored at a random height
pub fn spawn_meteor_shower(state: &mut SimulationState) -> usize {
    let viewport = state.viewport();
    let shower = &state.config.meteor_showers;
    let cap = state.config.asteroids.max_count;
    let radius = shower.radius;
    let formation: Vec<Vec2> = shower
        .formation
        .iter()
        .take(cap)
        .map(|&[x, y]| Vec2::new(x, y))
        .collect();
    let speed = state.game_speed * shower.speed_ratio;

    let mut doomed = trim_order(&state.asteroids, formation.len(), cap, viewport);
    doomed.sort_unstable_by(|a, b| b.cmp(a));
    for i in doomed {
        state.asteroids.remove(i);
    }

    let (lo_dy, hi_dy) = formation
        .iter()
        .fold((0.0f32, 0.0f32), |(lo, hi), o| (lo.min(o.y), hi.max(o.y)));
    let anchor_y = state.rng.range(radius - lo_dy, viewport.y - radius - hi_dy);
    let anchor = Vec2::new(viewport.x + radius + 20.0, anchor_y);
    let health = asteroid_health(radius, &state.config.asteroids);

    for offset in &formation {
        let id = state.next_entity_id();
        let mut rock = Asteroid::new(id, anchor + *offset, Vec2::new(-speed, 0.0), radius, health);
        rock.from_shower = true;
        state.asteroids.push(rock);
    }
    state.asteroid_director.showers += 1;
    log::info!("Meteor shower #{} ({} meteors)", state.asteroid_director.showers, formation.len());
    formation.len()
}

/// Deterministic fallback normal for coincident centers
fn pseudo_normal(a: u32, b: u32) -> Vec2 {
    let seed = a.wrapping_mul(2_654_435_761) ^ b.wrapping_mul(40_503);
    let angle = (seed % 3600) as f32 / 3600.0 * std::f32::consts::TAU;
    Vec2::from_angle(angle)
}

/// Separate and bounce every overlapping pair.
///
/// Each pass resolves pairs in index order, pushing apart in proportion to
/// inverse mass and exchanging an impulse along the contact normal. Passes
/// repeat until a clean pass or `max_passes`; a field still overlapping after
/// that is laid out left to right as a last resort. Returns whether the
/// iterative passes converged.
pub fn resolve_collisions(asteroids: &mut [Asteroid], min_spacing: f32, restitution: f32, max_passes: u32) -> bool {
    let n = asteroids.len();
    if n < 2 {
        return true;
    }

    for _ in 0..max_passes.max(1) {
        let mut touched = false;
        for i in 0..n {
            let (head, tail) = asteroids.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                touched |= resolve_pair(a, b, min_spacing, restitution);
            }
        }
        if !touched {
            return true;
        }
    }

    spread_out(asteroids, min_spacing);
    false
}

fn resolve_pair(a: &mut Asteroid, b: &mut Asteroid, min_spacing: f32, restitution: f32) -> bool {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let min_dist = a.radius + b.radius + min_spacing;
    if dist >= min_dist {
        return false;
    }

    let normal = if dist > 1e-5 {
        delta / dist
    } else {
        pseudo_normal(a.id, b.id)
    };
    let inv_a = 1.0 / a.mass.max(1e-3);
    let inv_b = 1.0 / b.mass.max(1e-3);
    let inv_total = inv_a + inv_b;

    let correction = min_dist - dist + SEPARATION_SLOP;
    a.pos -= normal * (correction * inv_a / inv_total);
    b.pos += normal * (correction * inv_b / inv_total);

    let closing = (b.vel - a.vel).dot(normal);
    if closing < 0.0 {
        let impulse = -(1.0 + restitution) * closing / inv_total;
        a.vel -= normal * (impulse * inv_a);
        b.vel += normal * (impulse * inv_b);
    }
    true
}

/// Guaranteed separation: walk in index order and move any rock that still
/// overlaps an earlier one to the right of all of them
fn spread_out(asteroids: &mut [Asteroid], min_spacing: f32) {
    for i in 1..asteroids.len() {
        let (placed, rest) = asteroids.split_at_mut(i);
        let rock = &mut rest[0];
        if overlaps_any(rock.pos, rock.radius, placed, min_spacing) {
            let right = placed.iter().map(|a| a.pos.x + a.radius).fold(f32::MIN, f32::max);
            rock.pos.x = right + rock.radius + min_spacing + SEPARATION_SLOP;
        }
    }
}

/// Integrate motion, bounce off the top and bottom, record trails
pub fn update_asteroids(asteroids: &mut [Asteroid], dt_ms: f32, viewport: Vec2, trail_length: usize) {
    let dt = dt_ms / 1000.0;
    for rock in asteroids.iter_mut() {
        rock.pos += rock.vel * dt;
        rock.rotation += rock.rotation_speed * dt;
        if (rock.pos.y < rock.radius && rock.vel.y < 0.0)
            || (rock.pos.y > viewport.y - rock.radius && rock.vel.y > 0.0)
        {
            rock.vel.y = -rock.vel.y;
        }
        rock.record_trail(trail_length);
        rock.shield_cooldown = (rock.shield_cooldown - dt_ms).max(0.0);
        rock.hit_flash = (rock.hit_flash - dt_ms).max(0.0);
    }
}

/// Run the steady-spawn and shower schedules for one step
pub fn update_director(state: &mut SimulationState, dt_ms: f32, showers_allowed: bool) {
    let mut spawned = false;

    state.asteroid_director.spawn_timer_ms -= dt_ms;
    if state.asteroid_director.spawn_timer_ms <= 0.0 {
        spawned |= spawn_asteroid(state).is_some();
        let (speed, intensity) = (state.difficulty.speed, state.difficulty.obstacle_intensity);
        state.asteroid_director.spawn_timer_ms =
            next_spawn_interval(&state.config.asteroids, speed, intensity, &mut state.rng);
    }

    if state.config.meteor_showers.enabled && showers_allowed {
        state.asteroid_director.shower_timer_ms -= dt_ms;
        if state.asteroid_director.shower_timer_ms <= 0.0 {
            spawned |= spawn_meteor_shower(state) > 0;
            let cfg = &state.config.meteor_showers;
            let (interval, variance) = (cfg.interval_ms, cfg.variance_ms);
            state.asteroid_director.shower_timer_ms = interval + state.rng.range(-variance, variance);
        }
    }

    if spawned {
        let cfg = &state.config.asteroids;
        let (spacing, restitution, passes) = (cfg.min_spacing, cfg.restitution, cfg.resolution_iterations);
        resolve_collisions(&mut state.asteroids, spacing, restitution, passes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::consts::SIM_STEP_MS;
    use proptest::prelude::*;

    fn rock(id: u32, x: f32, y: f32, r: f32) -> Asteroid {
        Asteroid::new(id, Vec2::new(x, y), Vec2::ZERO, r, 1.0)
    }

    fn assert_separated(rocks: &[Asteroid], spacing: f32, tolerance: f32) {
        for i in 0..rocks.len() {
            for j in (i + 1)..rocks.len() {
                let d = rocks[i].pos.distance(rocks[j].pos);
                let min = rocks[i].radius + rocks[j].radius + spacing;
                assert!(d >= min - tolerance, "pair {i},{j}: {d} < {min}");
            }
        }
    }

    #[test]
    fn test_pair_separates_by_inverse_mass() {
        let mut rocks = vec![rock(1, 0.0, 0.0, 20.0), rock(2, 30.0, 0.0, 10.0)];
        assert!(resolve_collisions(&mut rocks, 5.0, 0.8, 16));
        assert_separated(&rocks, 5.0, 1e-3);
        // The light rock moved four times as far as the heavy one
        let moved_heavy = rocks[0].pos.x.abs();
        let moved_light = rocks[1].pos.x - 30.0;
        assert!((moved_light / moved_heavy - 4.0).abs() < 1e-2);
    }

    #[test]
    fn test_head_on_impulse_conserves_momentum() {
        let mut a = rock(1, 0.0, 0.0, 20.0);
        let mut b = rock(2, 45.0, 0.0, 20.0);
        a.vel = Vec2::new(100.0, 0.0);
        b.vel = Vec2::new(-100.0, 0.0);
        let mut rocks = vec![a, b];
        resolve_collisions(&mut rocks, 10.0, 1.0, 8);
        let momentum = rocks[0].vel * rocks[0].mass + rocks[1].vel * rocks[1].mass;
        assert!(momentum.length() < 1e-2);
        assert!(rocks[0].vel.x < 0.0 && rocks[1].vel.x > 0.0);
    }

    #[test]
    fn test_coincident_centers_separate() {
        let mut rocks = vec![rock(1, 100.0, 100.0, 15.0), rock(2, 100.0, 100.0, 15.0)];
        resolve_collisions(&mut rocks, 4.0, 0.8, 8);
        assert_separated(&rocks, 4.0, 1e-3);
    }

    #[test]
    fn test_placement_avoids_existing() {
        let cfg = AsteroidConfig::default();
        let viewport = Vec2::new(960.0, 540.0);
        let mut rng = SimRng::new(8);
        let mut rocks: Vec<Asteroid> = Vec::new();
        for id in 0..10 {
            let r = rng.range(cfg.min_radius, cfg.max_radius);
            let pos = place_asteroid(&rocks, r, viewport, &cfg, &mut rng);
            assert!(pos.x >= viewport.x + r - 1e-3);
            assert!(!overlaps_any(pos, r, &rocks, cfg.min_spacing));
            rocks.push(rock(id, pos.x, pos.y, r));
        }
    }

    #[test]
    fn test_trim_prefers_offscreen_then_oldest() {
        let viewport = Vec2::new(960.0, 540.0);
        let rocks = vec![
            rock(5, 500.0, 200.0, 20.0),
            rock(1, 300.0, 200.0, 20.0),
            rock(9, 1400.0, 200.0, 20.0),
            rock(3, 700.0, 200.0, 20.0),
        ];
        let order = trim_order(&rocks, 3, 5, viewport);
        assert_eq!(order.len(), 2);
        assert_eq!(order[0], 2);
        assert_eq!(order[1], 1);
        assert!(trim_order(&rocks, 1, 5, viewport).is_empty());
    }

    fn full_field() -> SimulationState {
        let mut state = SimulationState::new(21, SimConfig::default());
        while spawn_asteroid(&mut state).is_some() {}
        state.asteroid_director.spawn_timer_ms = f32::MAX;
        state
    }

    #[test]
    fn test_spawn_stops_at_cap() {
        let state = full_field();
        let cap = state.config.asteroids.max_count;
        assert_eq!(state.asteroids.len(), cap);
        assert_separated(&state.asteroids, state.config.asteroids.min_spacing, 1e-3);
    }

    #[test]
    fn test_shower_on_full_field_trims_and_separates() {
        let mut state = full_field();
        let cap = state.config.asteroids.max_count;
        let formation = state.config.meteor_showers.formation.len();
        state.asteroid_director.shower_timer_ms = 0.0;

        update_director(&mut state, SIM_STEP_MS, true);
        assert_eq!(state.asteroid_director.showers, 1);
        assert!(state.asteroids.len() <= cap);
        let meteors = state.asteroids.iter().filter(|a| a.from_shower).count();
        assert_eq!(meteors, formation);
        assert_separated(&state.asteroids, state.config.asteroids.min_spacing, 1e-2);
        assert!(state.asteroid_director.shower_timer_ms > 0.0);
    }

    #[test]
    fn test_showers_wait_while_suppressed() {
        let mut state = full_field();
        state.asteroid_director.shower_timer_ms = 0.0;
        for _ in 0..120 {
            update_director(&mut state, SIM_STEP_MS, false);
        }
        assert_eq!(state.asteroid_director.showers, 0);
        assert!(state.asteroids.iter().all(|a| !a.from_shower));

        update_director(&mut state, SIM_STEP_MS, true);
        assert_eq!(state.asteroid_director.showers, 1);
    }

    #[test]
    fn test_update_bounces_off_edges() {
        let mut rocks = vec![rock(1, 500.0, 12.0, 20.0)];
        rocks[0].vel = Vec2::new(-50.0, -30.0);
        update_asteroids(&mut rocks, 16.0, Vec2::new(960.0, 540.0), 4);
        assert!(rocks[0].vel.y > 0.0);
        assert_eq!(rocks[0].trail.len(), 1);
    }

    #[test]
    fn test_interval_respects_minimum() {
        let cfg = AsteroidConfig::default();
        let mut rng = SimRng::new(2);
        for _ in 0..50 {
            let ms = next_spawn_interval(&cfg, 50.0, 50.0, &mut rng);
            assert!(ms >= cfg.min_spawn_interval_ms);
        }
    }

    proptest! {
        #[test]
        fn prop_resolution_leaves_no_overlap(
            specs in proptest::collection::vec((0.0f32..1500.0, 0.0f32..1500.0, 12.0f32..40.0), 2..=8),
            spacing in 0.0f32..12.0,
            restitution in 0.0f32..1.0,
        ) {
            let mut rocks: Vec<Asteroid> = specs
                .iter()
                .enumerate()
                .map(|(i, &(x, y, r))| rock(i as u32 + 1, x, y, r))
                .collect();
            resolve_collisions(&mut rocks, spacing, restitution, 64);
            for i in 0..rocks.len() {
                for j in (i + 1)..rocks.len() {
                    let d = rocks[i].pos.distance(rocks[j].pos);
                    let min = rocks[i].radius + rocks[j].radius + spacing;
                    prop_assert!(d >= min - 0.05, "pair {}: {} < {}", i * 10 + j, d, min);
                }
            }
        }
    }
}
