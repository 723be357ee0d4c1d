//! Collision and combat resolution
//!
//! Runs once per step after motion, in a fixed order: player shots, beam,
//! hazards against the ship and its tail, boss shots, pickups, and finally
//! the off-screen sweep. Entities are only destroyed here or in the sweep.

use glam::Vec2;

use super::asteroid::resolve_collisions;
use super::boss::{on_boss_defeated, on_boss_escaped};
use super::collision::{
    Contact, Rect, circle_rect_overlap, circles_overlap, rect_circle_contact, rect_rect_contact, rects_overlap,
    reflect_velocity,
};
use super::effects::palette;
use super::entity::{Obstacle, ObstacleRole, Player};
use super::events::GameEvent;
use super::powerup::PowerUpKind;
use super::state::SimulationState;
use crate::consts::OFFSCREEN_MARGIN;

/// Resolve every interaction for this step
pub fn resolve(state: &mut SimulationState, raw_dt_ms: f32) {
    resolve_projectile_hits(state);
    apply_beam(state, raw_dt_ms);
    if !state.is_running() {
        return;
    }
    resolve_hazard_contacts(state);
    if !state.is_running() {
        return;
    }
    resolve_tail_contacts(state);
    if !state.is_running() {
        return;
    }
    settle_asteroids(state);
    resolve_enemy_shots(state);
    if !state.is_running() {
        return;
    }
    collect_pickups(state);
    sweep_offscreen(state);
}

/// Damage an obstacle; returns true if it was destroyed
pub fn damage_obstacle(state: &mut SimulationState, idx: usize, damage: f32) -> bool {
    let flash = state.config.combat.hit_flash_ms;
    let ob = &mut state.obstacles[idx];
    ob.health -= damage;
    if ob.health > 0.0 {
        ob.hit_flash = flash;
        let at = ob.center();
        state.effects.explode(at, 3, 120.0, palette::SPARK);
        return false;
    }
    let ob = state.obstacles.remove(idx);
    destroy_obstacle(state, ob);
    true
}

fn destroy_obstacle(state: &mut SimulationState, ob: Obstacle) {
    let center = ob.center();
    match ob.role {
        ObstacleRole::Villain(kind) => {
            let desc = kind.descriptor();
            state.villains_defeated += 1;
            state.award_score(desc.kill_score, center);
            state.effects.explode(center, 18, 260.0, palette::VILLAIN);
            log::debug!("Destroyed {}", desc.name);
            state.events.push(GameEvent::VillainKilled {
                name: desc.name.to_string(),
                boss: false,
            });
        }
        ObstacleRole::Boss(boss) => {
            state.award_score(boss.score, center);
            state.effects.explode(center, 64, 420.0, palette::BOSS);
            state.events.push(GameEvent::VillainKilled {
                name: boss.name.clone(),
                boss: true,
            });
            on_boss_defeated(state, &boss.key);
        }
    }
}

/// Damage an asteroid; returns true if it was destroyed
pub fn damage_asteroid(state: &mut SimulationState, idx: usize, damage: f32) -> bool {
    let flash = state.config.combat.hit_flash_ms;
    let rock = &mut state.asteroids[idx];
    rock.health -= damage;
    if rock.health > 0.0 {
        rock.hit_flash = flash;
        return false;
    }
    let rock = state.asteroids.remove(idx);
    let points = rock.max_health * state.config.asteroids.score_per_health;
    state.award_score(points, rock.pos);
    state.effects.explode(rock.pos, 12, 200.0, palette::ASTEROID);
    true
}

/// Player shots against obstacles first, then asteroids
fn resolve_projectile_hits(state: &mut SimulationState) {
    let mut i = 0;
    while i < state.projectiles.len() {
        let rect = state.projectiles[i].rect();
        let damage = state.projectiles[i].damage;

        if let Some(idx) = state.obstacles.iter().position(|o| rects_overlap(&rect, &o.rect())) {
            state.projectiles.remove(i);
            damage_obstacle(state, idx, damage);
            continue;
        }
        if let Some(idx) = state
            .asteroids
            .iter()
            .position(|a| circle_rect_overlap(a.pos, a.radius, &rect))
        {
            state.projectiles.remove(i);
            damage_asteroid(state, idx, damage);
            continue;
        }
        i += 1;
    }
}

/// Hyper Beam rectangle from the ship's nose to the right edge
pub fn beam_rect(player: &Player, viewport: Vec2, height: f32) -> Rect {
    let nose = player.muzzle();
    Rect::new(
        Vec2::new(nose.x, nose.y - height * 0.5),
        Vec2::new((viewport.x - nose.x).max(0.0), height),
    )
}

/// Ramp the beam intensity and apply damage-per-second to everything it touches
fn apply_beam(state: &mut SimulationState, dt_ms: f32) {
    let cfg = &state.config.combat;
    let active = state.power_ups.is_active(PowerUpKind::HyperBeam) && state.is_running();
    let ramp = if active { cfg.beam_fade_in_ms } else { cfg.beam_fade_out_ms };
    let step = if ramp > 0.0 { dt_ms / ramp } else { 1.0 };
    state.beam_intensity = if active {
        (state.beam_intensity + step).min(1.0)
    } else {
        (state.beam_intensity - step).max(0.0)
    };
    if state.beam_intensity <= 0.0 || !state.is_running() {
        return;
    }

    let damage = cfg.beam_dps * state.beam_intensity * dt_ms / 1000.0;
    let rect = beam_rect(&state.player, state.viewport(), cfg.beam_height);

    for idx in (0..state.obstacles.len()).rev() {
        if rects_overlap(&rect, &state.obstacles[idx].rect()) {
            damage_obstacle(state, idx, damage);
        }
    }
    for idx in (0..state.asteroids.len()).rev() {
        let rock = &state.asteroids[idx];
        if circle_rect_overlap(rock.pos, rock.radius, &rect) {
            damage_asteroid(state, idx, damage);
        }
    }
}

/// Push an obstacle out along `normal` and knock it back
fn deflect_obstacle(state: &mut SimulationState, idx: usize, contact: Contact) {
    let (knockback, cooldown) = (state.config.combat.shield_knockback, state.config.combat.shield_cooldown_ms);
    let ob = &mut state.obstacles[idx];
    ob.pos += contact.normal * (contact.penetration + 1.0);
    ob.knockback = contact.normal * knockback;
    ob.shield_cooldown = cooldown;
    let at = ob.center();
    state.effects.explode(at, 8, 180.0, palette::SHIELD);
}

/// Push an asteroid out along `normal`, bounce it and knock it back
fn deflect_asteroid(state: &mut SimulationState, idx: usize, contact: Contact) {
    let (knockback, cooldown) = (state.config.combat.shield_knockback, state.config.combat.shield_cooldown_ms);
    let rock = &mut state.asteroids[idx];
    rock.pos += contact.normal * (contact.penetration + 1.0);
    if rock.vel.dot(contact.normal) < 0.0 {
        rock.vel = reflect_velocity(rock.vel, contact.normal);
    }
    rock.vel += contact.normal * knockback * 0.5;
    rock.shield_cooldown = cooldown;
    let at = rock.pos;
    state.effects.explode(at, 8, 180.0, palette::SHIELD);
}

/// Obstacles and asteroids touching the ship.
///
/// Unshielded contact ends the run. Under the shield a hazard is deflected
/// and then passes through the ship until its shield cooldown runs out.
fn resolve_hazard_contacts(state: &mut SimulationState) {
    let player = state.player.rect();
    let shielded = state.shielded();

    for idx in 0..state.obstacles.len() {
        let ob = &state.obstacles[idx];
        let contact = rect_rect_contact(&player, &ob.rect());
        if !contact.hit {
            continue;
        }
        if !shielded {
            let reason = format!("Collided with {}", ob.display_name());
            state.end_run(reason);
            return;
        }
        if ob.shield_cooldown <= 0.0 {
            deflect_obstacle(state, idx, contact);
        }
    }

    for idx in 0..state.asteroids.len() {
        let rock = &state.asteroids[idx];
        let contact = rect_circle_contact(&player, rock.pos, rock.radius);
        if !contact.hit {
            continue;
        }
        if !shielded {
            state.end_run("Smashed into an asteroid");
            return;
        }
        if rock.shield_cooldown <= 0.0 {
            deflect_asteroid(state, idx, contact);
        }
    }
}

/// Hazards touching any tail sample past the hull
fn resolve_tail_contacts(state: &mut SimulationState) {
    let radius = state.config.player.tail_radius;
    let skip = state.config.player.tail_skip;
    if radius <= 0.0 || state.tail.len() <= skip {
        return;
    }
    let shielded = state.shielded();
    let points: Vec<Vec2> = state.tail.iter().skip(skip).map(|t| t.pos).collect();

    for point in points {
        for idx in 0..state.obstacles.len() {
            let ob = &state.obstacles[idx];
            let rect = ob.rect();
            if !circle_rect_overlap(point, radius, &rect) {
                continue;
            }
            if !shielded {
                let reason = format!("Tail clipped by {}", ob.display_name());
                state.end_run(reason);
                return;
            }
            if ob.shield_cooldown <= 0.0 {
                let c = rect_circle_contact(&rect, point, radius);
                let away = Contact {
                    normal: -c.normal,
                    ..c
                };
                deflect_obstacle(state, idx, away);
            }
        }

        for idx in 0..state.asteroids.len() {
            let rock = &state.asteroids[idx];
            if !circles_overlap(point, radius, rock.pos, rock.radius) {
                continue;
            }
            if !shielded {
                state.end_run("Tail clipped by an asteroid");
                return;
            }
            if rock.shield_cooldown <= 0.0 {
                let offset = rock.pos - point;
                let contact = Contact {
                    hit: true,
                    normal: offset.normalize_or(Vec2::X),
                    penetration: radius + rock.radius - offset.length(),
                };
                deflect_asteroid(state, idx, contact);
            }
        }
    }
}

/// Shield deflections move rocks after the step's resolution pass
fn settle_asteroids(state: &mut SimulationState) {
    let a = &state.config.asteroids;
    let (spacing, restitution, passes) = (a.min_spacing, a.restitution, a.resolution_iterations);
    resolve_collisions(&mut state.asteroids, spacing, restitution, passes);
}

/// Boss shots against the ship
fn resolve_enemy_shots(state: &mut SimulationState) {
    let player = state.player.rect();
    let shielded = state.shielded();

    for idx in 0..state.enemy_projectiles.len() {
        let shot = &state.enemy_projectiles[idx];
        if shot.deflected {
            continue;
        }
        let contact = rect_circle_contact(&player, shot.pos, shot.radius);
        if !contact.hit {
            continue;
        }
        if !shielded {
            let reason = shot.message.clone();
            state.end_run(reason);
            return;
        }
        let shot = &mut state.enemy_projectiles[idx];
        shot.pos += contact.normal * (contact.penetration + 1.0);
        shot.vel = reflect_velocity(shot.vel, contact.normal);
        shot.deflected = true;
        let at = shot.pos;
        state.effects.explode(at, 6, 160.0, palette::SHIELD);
    }
}

/// Collectibles and power-ups touching the ship or its clone
fn collect_pickups(state: &mut SimulationState) {
    let mut catchers = vec![state.player.rect()];
    if let Some(clone) = &state.clone {
        catchers.push(clone.rect());
    }
    let touches = |r: &Rect| catchers.iter().any(|c| rects_overlap(c, r));

    let mut i = 0;
    while i < state.collectibles.len() {
        if touches(&state.collectibles[i].rect()) {
            let item = state.collectibles.remove(i);
            state.score.pickups += 1;
            state.award_score(item.value, item.center());
            state.effects.explode(item.center(), 10, 160.0, palette::PICKUP);
        } else {
            i += 1;
        }
    }

    let mut i = 0;
    while i < state.pickups.len() {
        if touches(&state.pickups[i].rect()) {
            let item = state.pickups.remove(i);
            activate_power_up(state, item.kind);
        } else {
            i += 1;
        }
    }
}

/// Start a power-up's timer and apply its instant effect
pub fn activate_power_up(state: &mut SimulationState, kind: PowerUpKind) {
    let duration = state.config.power_ups.duration(kind);
    state.power_ups.activate(kind, duration);
    state.events.push(GameEvent::PowerUp { kind });
    let at = state.player.center();
    state.effects.float_text(at, kind.as_str());
    state.effects.explode(at, 12, 200.0, palette::POWER_UP);
    log::debug!("Power-up {} for {duration:.0}ms", kind.as_str());

    match kind {
        PowerUpKind::PowerBomb => detonate_bomb(state),
        PowerUpKind::DoubleTeam => {
            if state.clone.is_none() {
                let offset = Vec2::new(state.config.player.clone_offset_x, state.config.player.clone_offset_y);
                let mut clone = Player::new(state.player.pos + offset, state.player.size);
                clone.fire_cooldown = state.config.weapons.fire_cooldown_ms * 0.5;
                state.clone = Some(clone);
            }
        }
        _ => {}
    }
}

/// Power Bomb: damage everything in radius and clear boss shots
fn detonate_bomb(state: &mut SimulationState) {
    let center = state.player.center();
    let radius = state.config.combat.bomb_radius;
    let damage = state.config.combat.bomb_damage;
    state.effects.area_burst(center, radius);

    for idx in (0..state.obstacles.len()).rev() {
        if circle_rect_overlap(center, radius, &state.obstacles[idx].rect()) {
            damage_obstacle(state, idx, damage);
        }
    }
    for idx in (0..state.asteroids.len()).rev() {
        let rock = &state.asteroids[idx];
        if circles_overlap(center, radius, rock.pos, rock.radius) {
            damage_asteroid(state, idx, damage);
        }
    }
    state
        .enemy_projectiles
        .retain(|s| !circles_overlap(center, radius, s.pos, s.radius));
}

/// Remove everything that has left the play area and apply the consequences
fn sweep_offscreen(state: &mut SimulationState) {
    let viewport = state.viewport();

    let mut i = 0;
    while i < state.obstacles.len() {
        let ob = &state.obstacles[i];
        if ob.pos.x + ob.size.x >= 0.0 {
            i += 1;
            continue;
        }
        let ob = state.obstacles.remove(i);
        match &ob.role {
            ObstacleRole::Boss(boss) => {
                on_boss_escaped(state, &boss.name, &boss.key);
                return;
            }
            ObstacleRole::Villain(kind) => {
                let lost = state.score.streak;
                let deducted = state
                    .score
                    .apply_escape_penalty(ob.max_health, ob.size.x, &state.config.scoring);
                log::debug!("{} escaped, -{deducted}", kind.descriptor().name);
                state.events.push(GameEvent::Score {
                    delta: -(deducted as i64),
                    total: state.score.score,
                });
                if lost > 0 {
                    state.events.push(GameEvent::Streak {
                        best: state.score.best_streak,
                        delta: -(lost as i32),
                    });
                }
                let at = Vec2::new(8.0, ob.center().y);
                state.effects.float_text(at, format!("-{deducted}"));
            }
        }
    }

    let before = state.collectibles.len();
    state.collectibles.retain(|c| c.pos.x + c.size.x >= 0.0);
    if state.collectibles.len() < before {
        state.break_streak();
    }

    state.pickups.retain(|p| p.pos.x + p.size.x >= 0.0);

    let margin = OFFSCREEN_MARGIN;
    let inside = |pos: Vec2, pad: f32| {
        pos.x > -margin - pad && pos.x < viewport.x + margin + pad && pos.y > -margin - pad && pos.y < viewport.y + margin + pad
    };
    state
        .projectiles
        .retain(|p| p.life_ms > 0.0 && inside(p.center(), 0.0));
    state
        .enemy_projectiles
        .retain(|s| s.life_ms > 0.0 && inside(s.pos, s.radius));
    state.asteroids.retain(|a| a.pos.x + a.radius >= -margin);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::entity::{Asteroid, Collectible, EnemyProjectile, Projectile, TrailPoint, WeaponPattern};
    use crate::sim::collectible::CollectibleTier;
    use crate::sim::state::GamePhase;
    use crate::sim::villain::{VillainBehavior, VillainKind};

    fn running() -> SimulationState {
        let mut s = SimulationState::new(5, SimConfig::default());
        s.phase = GamePhase::Running;
        s
    }

    fn villain(id: u32, pos: Vec2, health: f32) -> Obstacle {
        Obstacle {
            id,
            role: ObstacleRole::Villain(VillainKind::Juggernaut),
            pos,
            size: Vec2::new(92.0, 74.0),
            vel: Vec2::new(-200.0, 0.0),
            health,
            max_health: health,
            rotation: 0.0,
            rotation_speed: 0.0,
            behavior: VillainBehavior::Drift,
            bounce_timer: 0.0,
            knockback: Vec2::ZERO,
            shield_cooldown: 0.0,
            hit_flash: 0.0,
            age_ms: 0.0,
        }
    }

    fn shot(pos: Vec2) -> Projectile {
        Projectile {
            id: 99,
            pos,
            vel: Vec2::new(800.0, 0.0),
            size: Vec2::new(18.0, 6.0),
            life_ms: 1000.0,
            age_ms: 0.0,
            damage: 1.0,
            pattern: WeaponPattern::Standard,
        }
    }

    #[test]
    fn test_projectile_damages_then_kills() {
        let mut s = running();
        s.obstacles.push(villain(1, Vec2::new(600.0, 100.0), 2.0));
        s.projectiles.push(shot(Vec2::new(610.0, 120.0)));
        resolve(&mut s, 16.0);
        assert_eq!(s.obstacles[0].health, 1.0);
        assert!(s.obstacles[0].hit_flash > 0.0);
        assert!(s.projectiles.is_empty());

        s.projectiles.push(shot(Vec2::new(610.0, 120.0)));
        resolve(&mut s, 16.0);
        assert!(s.obstacles.is_empty());
        assert_eq!(s.villains_defeated, 1);
        assert_eq!(s.score.score, 240);
        assert!(s.events.iter().any(|e| matches!(e, GameEvent::VillainKilled { boss: false, .. })));
    }

    #[test]
    fn test_projectile_hits_asteroid() {
        let mut s = running();
        s.asteroids.push(Asteroid::new(1, Vec2::new(500.0, 300.0), Vec2::ZERO, 20.0, 1.0));
        s.projectiles.push(shot(Vec2::new(485.0, 297.0)));
        resolve(&mut s, 16.0);
        assert!(s.asteroids.is_empty());
        assert_eq!(s.score.score, 45);
    }

    #[test]
    fn test_collision_without_shield_ends_run() {
        let mut s = running();
        let p = s.player.pos;
        s.obstacles.push(villain(1, p + Vec2::new(10.0, 0.0), 3.0));
        resolve(&mut s, 16.0);
        assert_eq!(s.phase, GamePhase::GameOver);
        let summary = s.summary.as_ref().unwrap();
        assert_eq!(summary.reason, "Collided with Void Juggernaut");
    }

    #[test]
    fn test_shield_deflects_obstacle() {
        let mut s = running();
        activate_power_up(&mut s, PowerUpKind::RadiantShield);
        let p = s.player.pos;
        s.obstacles.push(villain(1, p + Vec2::new(40.0, 0.0), 3.0));
        resolve(&mut s, 16.0);
        assert_eq!(s.phase, GamePhase::Running);
        let ob = &s.obstacles[0];
        assert!(!rects_overlap(&s.player.rect(), &ob.rect()));
        assert!(ob.knockback.x > 0.0);
        assert_eq!(ob.shield_cooldown, s.config.combat.shield_cooldown_ms);
    }

    #[test]
    fn test_deflected_asteroid_is_separated_from_neighbors() {
        let mut s = running();
        activate_power_up(&mut s, PowerUpKind::RadiantShield);
        let c = s.player.center();
        let spacing = s.config.asteroids.min_spacing;
        let near = c + Vec2::new(40.0, 0.0);
        let behind = near + Vec2::new(40.0 + spacing + 2.0, 0.0);
        s.asteroids.push(Asteroid::new(1, near, Vec2::ZERO, 20.0, 2.0));
        s.asteroids.push(Asteroid::new(2, behind, Vec2::ZERO, 20.0, 2.0));

        resolve(&mut s, 16.0);
        assert_eq!(s.phase, GamePhase::Running);
        assert!(s.asteroids[0].pos.x > near.x);
        assert!(s.asteroids[0].shield_cooldown > 0.0);
        let gap = s.asteroids[0].pos.distance(s.asteroids[1].pos);
        assert!(gap >= 40.0 + spacing - 1e-2, "{gap}");
    }

    #[test]
    fn test_shield_deflects_asteroid_and_boss_shot() {
        let mut s = running();
        activate_power_up(&mut s, PowerUpKind::RadiantShield);
        let c = s.player.center();
        s.asteroids.push(Asteroid::new(1, c + Vec2::new(40.0, 0.0), Vec2::new(-100.0, 0.0), 20.0, 2.0));
        s.enemy_projectiles.push(EnemyProjectile {
            id: 2,
            pos: c + Vec2::new(0.0, -25.0),
            vel: Vec2::new(0.0, 200.0),
            radius: 8.0,
            life_ms: 1000.0,
            boss_key: "nebula_warden".into(),
            message: "Blasted".into(),
            deflected: false,
        });
        resolve(&mut s, 16.0);
        assert_eq!(s.phase, GamePhase::Running);
        assert!(s.asteroids[0].vel.x > 0.0);
        assert!(s.enemy_projectiles[0].deflected);
        assert!(s.enemy_projectiles[0].vel.y < 0.0);
    }

    #[test]
    fn test_boss_shot_ends_run_with_message() {
        let mut s = running();
        let c = s.player.center();
        s.enemy_projectiles.push(EnemyProjectile {
            id: 2,
            pos: c,
            vel: Vec2::new(-200.0, 0.0),
            radius: 8.0,
            life_ms: 1000.0,
            boss_key: "void_empress".into(),
            message: "Shredded".into(),
            deflected: false,
        });
        resolve(&mut s, 16.0);
        assert_eq!(s.summary.as_ref().map(|x| x.reason.as_str()), Some("Shredded"));
    }

    #[test]
    fn test_tail_collision_skips_hull_samples() {
        let mut s = running();
        let anchor = s.player.tail_anchor();
        s.tail = (0..10)
            .map(|i| TrailPoint {
                pos: anchor - Vec2::new(i as f32 * 8.0, 0.0),
            })
            .collect();
        // Asteroid touching only a sample under the hull
        s.asteroids.push(Asteroid::new(1, anchor + Vec2::new(-16.0, 10.0), Vec2::ZERO, 6.0, 1.0));
        resolve(&mut s, 16.0);
        assert_eq!(s.phase, GamePhase::Running);

        s.asteroids[0].pos = anchor - Vec2::new(64.0, 0.0);
        resolve(&mut s, 16.0);
        assert_eq!(s.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_escape_penalty_applied() {
        let mut s = running();
        s.score.score = 1000;
        s.score.streak = 4;
        s.obstacles.push(villain(1, Vec2::new(-200.0, 100.0), 3.0));
        resolve(&mut s, 16.0);
        let expected = 150 + 2 * 45 + (92.0f32 * 0.35).round() as u64;
        assert_eq!(s.score.score, 1000 - expected);
        assert_eq!(s.score.streak, 0);
        assert_eq!(s.score.combo_timer_ms, s.config.scoring.combo_window_ms);
        assert!(s.obstacles.is_empty());
    }

    #[test]
    fn test_missed_collectible_breaks_streak() {
        let mut s = running();
        s.score.streak = 3;
        s.collectibles.push(Collectible {
            id: 1,
            pos: Vec2::new(-50.0, 100.0),
            size: Vec2::splat(30.0),
            vel: Vec2::new(-200.0, 0.0),
            tier: CollectibleTier::Base,
            value: 84.0,
            bob_phase: 0.0,
        });
        resolve(&mut s, 16.0);
        assert_eq!(s.score.streak, 0);
        assert!(s.collectibles.is_empty());
    }

    #[test]
    fn test_pickup_collects_and_scores() {
        let mut s = running();
        let pos = s.player.pos;
        s.collectibles.push(Collectible {
            id: 1,
            pos,
            size: Vec2::splat(30.0),
            vel: Vec2::ZERO,
            tier: CollectibleTier::Base,
            value: 84.0,
            bob_phase: 0.0,
        });
        resolve(&mut s, 16.0);
        assert_eq!(s.score.score, 84);
        assert_eq!(s.score.pickups, 1);
    }

    #[test]
    fn test_bomb_clears_radius() {
        let mut s = running();
        let c = s.player.center();
        s.obstacles.push(villain(1, c + Vec2::new(120.0, -30.0), 3.0));
        s.obstacles.push(villain(2, c + Vec2::new(700.0, 0.0), 3.0));
        activate_power_up(&mut s, PowerUpKind::PowerBomb);
        assert_eq!(s.obstacles.len(), 1);
        assert_eq!(s.obstacles[0].id, 2);
        assert_eq!(s.effects.bursts.len(), 1);
    }

    #[test]
    fn test_beam_ramps_and_damages() {
        let mut s = running();
        activate_power_up(&mut s, PowerUpKind::HyperBeam);
        let c = s.player.center();
        s.obstacles.push(villain(1, Vec2::new(700.0, c.y - 37.0), 3.0));
        resolve(&mut s, 90.0);
        assert!((s.beam_intensity - 0.5).abs() < 1e-5);
        assert!(s.obstacles[0].health < 3.0);
        for _ in 0..200 {
            resolve(&mut s, 16.0);
        }
        assert!(s.obstacles.is_empty());
        assert_eq!(s.beam_intensity, 1.0);
    }

    #[test]
    fn test_double_team_spawns_clone() {
        let mut s = running();
        activate_power_up(&mut s, PowerUpKind::DoubleTeam);
        assert!(s.clone.is_some());
        assert!(s.power_ups.is_active(PowerUpKind::DoubleTeam));
    }
}
