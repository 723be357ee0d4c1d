//! Fixed timestep simulation tick
//!
//! Advances the run by exactly one step. Wall-clock timers (run clock,
//! power-up countdowns, combo decay) use the raw step; world motion and spawn
//! timers use the dilated step while Time Dilation is active. The ship and
//! its own shots always move in real time.

use glam::Vec2;

use super::asteroid::{resolve_collisions, update_asteroids, update_director};
use super::boss::update_battle;
use super::collectible::spawn_collectible;
use super::combat;
use super::difficulty::Difficulty;
use super::entity::{Projectile, TrailPoint, WeaponPattern};
use super::events::GameEvent;
use super::powerup::{IntervalPlan, PowerUpKind, plan_next_interval, spawn_power_up};
use super::state::SimulationState;
use super::villain::{BehaviorContext, spawn_villain, update_obstacle};
use crate::consts::SIM_STEP_MS;

/// Advance the simulation by one fixed step of `delta_ms`.
///
/// Outside the running phase only visual-only effects animate.
pub fn tick(state: &mut SimulationState, delta_ms: f32) {
    let delta_ms = if delta_ms.is_finite() && delta_ms >= 0.0 {
        delta_ms
    } else {
        SIM_STEP_MS
    };
    let viewport = state.viewport();

    // Idle or paused: keep the backdrop alive
    if !state.is_running() {
        let drift = state.config.spawn.base_speed * 0.35;
        state.effects.update(delta_ms, drift, viewport);
        return;
    }

    state.step_count += 1;
    advance_clock(state, delta_ms);

    // Wall-clock timers
    for kind in state.power_ups.tick(delta_ms) {
        log::debug!("Power-up expired: {}", kind.as_str());
        if kind == PowerUpKind::DoubleTeam {
            state.clone = None;
        }
    }
    if let Some(lost) = state.score.update_combo(delta_ms, &state.config.scoring) {
        state.events.push(GameEvent::Streak {
            best: state.score.best_streak,
            delta: -(lost as i32),
        });
    }

    let world_dt = world_delta(state, delta_ms);

    // Directors
    update_battle(state, world_dt);
    if !state.is_running() {
        return;
    }
    let suppressed = state.boss.suppresses_spawning();
    if !suppressed {
        update_spawners(state, world_dt);
    }
    update_director(state, world_dt, !suppressed);

    // Ship, clone, tail and weapons
    update_player(state, delta_ms);
    update_clone(state, delta_ms);
    update_tail(state, world_dt);
    fire_weapons(state, delta_ms);
    update_projectiles(state, delta_ms);

    // World motion
    update_world(state, world_dt);

    combat::resolve(state, delta_ms);

    state.score.ease_tail(delta_ms, &state.config.scoring);
    let star_speed = world_delta(state, state.game_speed);
    state.effects.update(delta_ms, star_speed, viewport);
}

/// Wall-clock run time, difficulty and scroll speed
fn advance_clock(state: &mut SimulationState, delta_ms: f32) {
    let before = (state.elapsed_ms / 1000.0).floor();
    state.elapsed_ms += delta_ms;
    let after = (state.elapsed_ms / 1000.0).floor();
    if after > before {
        state.events.push(GameEvent::Time {
            total_ms: state.elapsed_ms as u64,
        });
    }

    state.difficulty = Difficulty::at(state.elapsed_ms, &state.config.difficulty, state.config.mode);
    state.game_speed = state.config.spawn.base_speed * state.difficulty.speed;
}

/// Simulation-visible delta after Time Dilation
pub fn world_delta(state: &SimulationState, delta_ms: f32) -> f32 {
    if state.power_ups.is_active(PowerUpKind::TimeDilation) {
        delta_ms * state.config.combat.time_dilation_scale
    } else {
        delta_ms
    }
}

/// Jittered delay for obstacle or collectible spawns
fn jittered_interval(state: &mut SimulationState, base_ms: f32, min_ms: f32, intensity: f32) -> f32 {
    let (lo, hi) = (state.config.spawn.jitter_min, state.config.spawn.jitter_max);
    let interval = (base_ms / intensity.max(0.1)).max(min_ms);
    interval * state.rng.range(lo, hi)
}

pub fn next_obstacle_interval(state: &mut SimulationState) -> f32 {
    let s = &state.config.spawn;
    let (base, min) = (s.obstacle_interval_ms, s.obstacle_min_interval_ms);
    let intensity = state.difficulty.obstacle_intensity;
    jittered_interval(state, base, min, intensity)
}

pub fn next_collectible_interval(state: &mut SimulationState) -> f32 {
    let s = &state.config.spawn;
    let (base, min) = (s.collectible_interval_ms, s.collectible_min_interval_ms);
    let intensity = state.difficulty.collectible_intensity;
    jittered_interval(state, base, min, intensity)
}

pub fn next_power_up_interval(state: &mut SimulationState) -> f32 {
    let plan = IntervalPlan {
        base_ms: state.config.spawn.power_up_interval_ms,
        min_interval_ms: state.config.spawn.power_up_min_interval_ms,
        spawn_intensity: state.difficulty.power_up_intensity,
        speed_progress: state.difficulty.progress,
        active_power_ups: state.power_ups.active_count(),
    };
    plan_next_interval(plan, &mut state.rng)
}

/// Re-arm every regular spawn timer (after a boss battle)
pub fn resume_spawning(state: &mut SimulationState) {
    state.spawn_timers.obstacle_ms = next_obstacle_interval(state);
    state.spawn_timers.collectible_ms = next_collectible_interval(state);
    state.spawn_timers.power_up_ms = next_power_up_interval(state);
}

/// Regular villain, collectible and power-up spawns
fn update_spawners(state: &mut SimulationState, dt_ms: f32) {
    state.spawn_timers.obstacle_ms -= dt_ms;
    if state.spawn_timers.obstacle_ms <= 0.0 {
        spawn_villain(state);
        state.spawn_timers.obstacle_ms = next_obstacle_interval(state);
    }

    state.spawn_timers.collectible_ms -= dt_ms;
    if state.spawn_timers.collectible_ms <= 0.0 {
        spawn_collectible(state);
        state.spawn_timers.collectible_ms = next_collectible_interval(state);
    }

    state.spawn_timers.power_up_ms -= dt_ms;
    if state.spawn_timers.power_up_ms <= 0.0 {
        spawn_power_up(state);
        state.spawn_timers.power_up_ms = next_power_up_interval(state);
    }
}

/// Move the ship from the input intent, handling dash
fn update_player(state: &mut SimulationState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let input = state.input;
    let cfg = &state.config.player;
    let viewport = Vec2::new(state.config.viewport.width, state.config.viewport.height);
    let player = &mut state.player;

    player.dash_timer = (player.dash_timer - dt_ms).max(0.0);
    player.dash_cooldown = (player.dash_cooldown - dt_ms).max(0.0);

    let mut dir = input.move_vector;
    if dir.length_squared() > 1.0 {
        dir = dir.normalize();
    }
    if input.dash && player.dash_cooldown <= 0.0 && dir != Vec2::ZERO {
        player.dash_timer = cfg.dash_duration_ms;
        player.dash_cooldown = cfg.dash_cooldown_ms;
    }

    let speed = if player.is_dashing() {
        cfg.speed * cfg.dash_speed_multiplier
    } else {
        cfg.speed
    };
    player.vel = dir * speed;
    player.pos += player.vel * dt;
    player.pos = player.pos.clamp(Vec2::ZERO, (viewport - player.size).max(Vec2::ZERO));
}

/// Double Team clone eases toward its slot beside the ship
fn update_clone(state: &mut SimulationState, dt_ms: f32) {
    let offset = Vec2::new(state.config.player.clone_offset_x, state.config.player.clone_offset_y);
    let viewport = state.viewport();
    let target = state.player.pos + offset;
    if let Some(clone) = &mut state.clone {
        let follow = (dt_ms / 1000.0 * 10.0).min(1.0);
        clone.pos += (target - clone.pos) * follow;
        clone.pos = clone.pos.clamp(Vec2::ZERO, (viewport - clone.size).max(Vec2::ZERO));
        clone.fire_cooldown = (clone.fire_cooldown - dt_ms).max(0.0);
    }
}

/// Scroll existing tail samples with the world and add a fresh one
fn update_tail(state: &mut SimulationState, world_dt_ms: f32) {
    let scroll = state.game_speed * world_dt_ms / 1000.0;
    for point in &mut state.tail {
        point.pos.x -= scroll;
    }
    state.tail.insert(
        0,
        TrailPoint {
            pos: state.player.tail_anchor(),
        },
    );
    let len = state.score.tail_length.ceil().max(0.0) as usize;
    state.tail.truncate(len);
}

/// Shots in one trigger pull from `muzzle`
fn volley(state: &SimulationState, muzzle: Vec2, shot_index: u32) -> Vec<Projectile> {
    let w = &state.config.weapons;
    let timers = &state.power_ups;
    let size = Vec2::new(w.projectile_width, w.projectile_height);
    let top_left = muzzle - Vec2::new(0.0, size.y * 0.5);
    let mut shots = Vec::new();

    let shot = |vel: Vec2, life_ms: f32, damage: f32, pattern: WeaponPattern| Projectile {
        id: 0,
        pos: top_left,
        vel,
        size,
        life_ms,
        age_ms: 0.0,
        damage,
        pattern,
    };

    if timers.is_active(PowerUpKind::FlameWhip) {
        shots.push(shot(
            Vec2::new(w.projectile_speed * 0.8, 0.0),
            w.flame_life_ms,
            w.flame_damage,
            WeaponPattern::Flame {
                amplitude: w.flame_wave_amplitude,
                frequency: w.flame_wave_frequency,
                lane_y: top_left.y,
            },
        ));
    } else if timers.is_active(PowerUpKind::BulletSpread) {
        for k in [-1.0f32, 0.0, 1.0] {
            shots.push(shot(
                Vec2::from_angle(k * w.spread_angle) * w.projectile_speed,
                w.projectile_life_ms,
                w.projectile_damage,
                WeaponPattern::Spread,
            ));
        }
    } else {
        shots.push(shot(
            Vec2::new(w.projectile_speed, 0.0),
            w.projectile_life_ms,
            w.projectile_damage,
            WeaponPattern::Standard,
        ));
    }

    if timers.is_active(PowerUpKind::Missiles) && shot_index % w.missile_every == 0 {
        shots.push(shot(
            Vec2::new(w.projectile_speed * 0.6, 0.0),
            w.projectile_life_ms * 1.5,
            w.missile_damage,
            WeaponPattern::Missile {
                turn_rate: w.missile_turn_rate,
            },
        ));
    }
    shots
}

/// Fire from the ship (and clone) while the trigger is held
fn fire_weapons(state: &mut SimulationState, dt_ms: f32) {
    state.player.fire_cooldown = (state.player.fire_cooldown - dt_ms).max(0.0);
    if !state.input.firing || state.player.fire_cooldown > 0.0 || state.beam_intensity >= 1.0 {
        return;
    }

    let w = &state.config.weapons;
    let cooldown = if state.power_ups.is_active(PowerUpKind::PumpDrive) {
        w.fire_cooldown_ms * w.pump_fire_rate_scale
    } else {
        w.fire_cooldown_ms
    };

    state.player.shots_fired += 1;
    state.player.fire_cooldown = cooldown;
    let mut shots = volley(state, state.player.muzzle(), state.player.shots_fired);

    let clone_muzzle = match &mut state.clone {
        Some(clone) if clone.fire_cooldown <= 0.0 => {
            clone.fire_cooldown = cooldown;
            Some(clone.muzzle())
        }
        _ => None,
    };
    if let Some(muzzle) = clone_muzzle {
        shots.extend(volley(state, muzzle, state.player.shots_fired));
    }

    for mut shot in shots {
        shot.id = state.next_entity_id();
        state.projectiles.push(shot);
    }
}

/// Player shots: straight, wavy or homing
fn update_projectiles(state: &mut SimulationState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let targets: Vec<Vec2> = state
        .obstacles
        .iter()
        .map(|o| o.center())
        .chain(state.asteroids.iter().map(|a| a.pos))
        .collect();

    for p in &mut state.projectiles {
        p.age_ms += dt_ms;
        p.life_ms -= dt_ms;
        match p.pattern {
            WeaponPattern::Standard | WeaponPattern::Spread => p.pos += p.vel * dt,
            WeaponPattern::Flame {
                amplitude,
                frequency,
                lane_y,
            } => {
                p.pos.x += p.vel.x * dt;
                p.pos.y = lane_y + (p.age_ms / 1000.0 * frequency).sin() * amplitude;
            }
            WeaponPattern::Missile { turn_rate } => {
                let here = p.center();
                let nearest = targets
                    .iter()
                    .filter(|t| t.x > here.x - 20.0)
                    .min_by(|a, b| a.distance_squared(here).total_cmp(&b.distance_squared(here)));
                if let Some(&target) = nearest {
                    let heading = p.vel.to_angle();
                    let wanted = (target - here).to_angle();
                    let mut turn = wanted - heading;
                    turn = (turn + std::f32::consts::PI).rem_euclid(std::f32::consts::TAU) - std::f32::consts::PI;
                    let max_turn = turn_rate * dt;
                    let speed = p.vel.length();
                    p.vel = Vec2::from_angle(heading + turn.clamp(-max_turn, max_turn)) * speed;
                }
                p.pos += p.vel * dt;
            }
        }
    }
}

/// Obstacles, asteroids, boss shots and pickups, all in world time
fn update_world(state: &mut SimulationState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let viewport = state.viewport();
    let player_center = state.player.center();

    let ctx = BehaviorContext {
        dt_ms,
        player_center,
        viewport,
        knockback_damping: state.config.combat.knockback_damping,
    };
    for ob in &mut state.obstacles {
        update_obstacle(ob, &ctx);
    }

    let a = &state.config.asteroids;
    update_asteroids(&mut state.asteroids, dt_ms, viewport, a.trail_length);
    resolve_collisions(&mut state.asteroids, a.min_spacing, a.restitution, a.resolution_iterations);

    for shot in &mut state.enemy_projectiles {
        shot.pos += shot.vel * dt;
        shot.life_ms -= dt_ms;
    }

    let magnet = state.power_ups.is_active(PowerUpKind::StarlightMagnet);
    let c = &state.config.collectibles;
    for item in &mut state.collectibles {
        item.pos += item.vel * dt;
        item.bob_phase += dt * 3.0;
        item.pos.y += item.bob_phase.cos() * 14.0 * dt;
        if magnet {
            let to_player = player_center - item.center();
            let dist = to_player.length();
            if dist < c.magnet_radius && dist > 1e-3 {
                item.pos += to_player / dist * (c.magnet_speed * dt).min(dist);
            }
        }
    }

    for pickup in &mut state.pickups {
        pickup.pos += pickup.vel * dt;
    }
}
