//! The game session: one table, one player, one clock.
//!
//! Intents from the UI go through `handle`; `update` runs once per frame after
//! the physics step and watches the balls while they roll, judging the turn
//! once everything has come to rest. `frame` does both, update first.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use snooker_engine::{Countdown, EntityId};

use crate::balls::{Ball, BallType};
use crate::config::SnookerConfig;
use crate::cue::Cue;
use crate::layout::{self, LayoutMode};
use crate::pots::{self, PotKind};
use crate::respot;
use crate::rules::{self, Disposition, Ruling, Target, TurnFacts, Verdict};
use crate::table::TableGeometry;
use crate::turn::TurnContext;
use crate::world::{BallWorld, Contact};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    PlacingCueBall,
    Aiming,
    BallsMoving,
    GameOver,
}

impl SessionState {
    /// Numeric code for the UI event stream.
    pub fn code(self) -> u32 {
        match self {
            SessionState::PlacingCueBall => 0,
            SessionState::Aiming => 1,
            SessionState::BallsMoving => 2,
            SessionState::GameOver => 3,
        }
    }
}

/// What the player asked for, already interpreted from raw input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PlaceCueBall(Vec2),
    StartAim,
    /// Power in shot units, angle in radians.
    UpdateAim { power: f32, angle: f32 },
    ReleaseShot,
    CancelAim,
    StartChalk,
    Reset(LayoutMode),
}

/// Things that happened, for sound and UI layers to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    BallHit,
    CushionHit,
    Potted(BallType),
    ChalkStarted,
    Chalked,
    ShotPlayed { power: f32, miscue: bool },
    ScoreChanged(u32),
    TargetChanged(Target),
    StateChanged(SessionState),
    Foul { penalty: u32 },
    GameOver { score: u32 },
}

/// A transient banner message.
#[derive(Debug, Clone, PartialEq)]
pub struct Splash {
    pub text: String,
    timer: Countdown,
}

impl Splash {
    pub fn remaining(&self) -> f32 {
        self.timer.remaining()
    }
}

/// First ball along the current aim line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AimHit {
    pub ball: BallType,
    pub point: Vec2,
    pub distance: f32,
}

pub struct GameSession {
    config: SnookerConfig,
    table: TableGeometry,
    score: u32,
    target: Target,
    state: SessionState,
    clock: Countdown,
    reds: Vec<Ball>,
    colours: Vec<Ball>,
    cue_ball: Option<Ball>,
    cue: Cue,
    turn: TurnContext,
    rest_frames: u32,
    layout: LayoutMode,
    rng: Pcg32,
    splash: Option<Splash>,
    message: String,
    last_ruling: Option<Ruling>,
    aim_hit: Option<AimHit>,
    events: Vec<SessionEvent>,
}

impl GameSession {
    /// An empty table. Call `reset` to set out the balls and start the clock.
    pub fn new(config: SnookerConfig) -> Self {
        let table = TableGeometry::new(&config.table);
        let rng = Pcg32::seed_from_u64(config.seed);
        Self {
            config,
            table,
            score: 0,
            target: Target::Red,
            state: SessionState::PlacingCueBall,
            clock: Countdown::idle(),
            reds: Vec::new(),
            colours: Vec::new(),
            cue_ball: None,
            cue: Cue::new(),
            turn: TurnContext::new(),
            rest_frames: 0,
            layout: LayoutMode::Racked,
            rng,
            splash: None,
            message: String::new(),
            last_ruling: None,
            aim_hit: None,
            events: Vec::new(),
        }
    }

    // -- Accessors --

    pub fn config(&self) -> &SnookerConfig {
        &self.config
    }

    pub fn table(&self) -> &TableGeometry {
        &self.table
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn time_remaining(&self) -> f32 {
        self.clock.remaining()
    }

    pub fn reds(&self) -> &[Ball] {
        &self.reds
    }

    pub fn colours(&self) -> &[Ball] {
        &self.colours
    }

    pub fn cue_ball(&self) -> Option<&Ball> {
        self.cue_ball.as_ref()
    }

    pub fn cue(&self) -> &Cue {
        &self.cue
    }

    pub fn turn(&self) -> &TurnContext {
        &self.turn
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn splash(&self) -> Option<&Splash> {
        self.splash.as_ref()
    }

    /// Latest account of play ("Cue ball hit red.", "Potted: Red. Aim your shot.").
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn last_ruling(&self) -> Option<&Ruling> {
        self.last_ruling.as_ref()
    }

    pub fn aim_hit(&self) -> Option<AimHit> {
        self.aim_hit
    }

    /// Every ball on the table, cue ball first.
    pub fn balls(&self) -> impl Iterator<Item = &Ball> {
        self.cue_ball.iter().chain(&self.reds).chain(&self.colours)
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Lifecycle --

    /// Clear the table and start a fresh game with the given layout.
    pub fn reset<W: BallWorld + ?Sized>(&mut self, mode: LayoutMode, world: &mut W) {
        let on_table = self
            .reds
            .drain(..)
            .chain(self.colours.drain(..))
            .chain(self.cue_ball.take());
        for mut ball in on_table {
            if let Some(body) = ball.lift() {
                world.despawn(body);
            }
        }
        // Potted balls already gave their bodies back
        self.turn.clear();
        self.cue.reset(self.config.chalk_on_reset);

        self.set_score(0);
        self.set_target(Target::Red);
        self.clock = Countdown::started(self.config.timing.game_duration);
        self.rest_frames = 0;
        self.layout = mode;
        self.last_ruling = None;
        self.aim_hit = None;

        for (kind, pos) in layout::layout(mode, &self.table, &mut self.rng) {
            let ball = Ball::on_table(kind, world.spawn_ball(kind, pos));
            if kind == BallType::Red {
                self.reds.push(ball);
            } else {
                self.colours.push(ball);
            }
        }

        self.set_state(SessionState::PlacingCueBall);
        self.message = format!("New Game ({mode}). Place cue ball in the 'D'.");
        self.show_splash(format!("New Game: {mode}!"), self.config.timing.new_game_splash);
        log::info!("New game: {} with {} reds", mode, self.reds.len());
    }

    /// Apply one intent. Returns `false` when the intent does not apply in the
    /// current state; the session is then unchanged.
    pub fn handle<W: BallWorld + ?Sized>(&mut self, intent: Intent, world: &mut W) -> bool {
        let accepted = match intent {
            Intent::Reset(mode) => {
                self.reset(mode, world);
                true
            }
            _ if self.state == SessionState::GameOver => false,
            Intent::PlaceCueBall(point) => self.place_cue_ball(point, world),
            Intent::StartAim => self.state == SessionState::Aiming && self.cue.start_aim(),
            Intent::UpdateAim { power, angle } => {
                let updated = self.state == SessionState::Aiming
                    && self.cue.update_aim(power, angle, &self.config.shot);
                if updated {
                    self.refresh_aim(world);
                }
                updated
            }
            Intent::ReleaseShot => self.release_shot(world),
            Intent::CancelAim => {
                let cancelled = self.state == SessionState::Aiming && self.cue.cancel_aim();
                if cancelled {
                    self.aim_hit = None;
                }
                cancelled
            }
            Intent::StartChalk => self.start_chalk(),
        };
        if !accepted {
            log::debug!("Ignored {:?} while {:?}", intent, self.state);
        }
        accepted
    }

    /// Advance timers and watch the table. Call once per frame, after physics.
    pub fn update<W: BallWorld + ?Sized>(&mut self, dt: f32, world: &mut W) {
        let contacts = world.contacts();

        if self.splash.as_mut().is_some_and(|splash| splash.timer.tick(dt)) {
            self.splash = None;
        }
        if self.state == SessionState::GameOver {
            return;
        }

        if self.cue.tick(dt) {
            self.events.push(SessionEvent::Chalked);
            log::info!("Cue chalked");
        }
        if self.clock.tick(dt) {
            let text = format!("GAME OVER! Final Score: {}", self.score);
            self.finish(text);
            return;
        }

        self.observe_contacts(&contacts, world);

        match self.state {
            SessionState::BallsMoving => {
                self.collect_pots(world);
                if self.all_at_rest(world) {
                    self.rest_frames += 1;
                } else {
                    self.rest_frames = 0;
                }
                if self.rest_frames >= self.config.physics.settle_frames {
                    self.stop_all(world);
                    self.resolve_turn(world);
                }
            }
            SessionState::Aiming if self.cue.is_aiming() => self.refresh_aim(world),
            _ => {}
        }
    }

    /// One frame: first account for what the last physics step did, then
    /// apply this frame's intents. Contacts from before a shot never reach
    /// the turn that shot starts.
    pub fn frame<W, I>(&mut self, dt: f32, intents: I, world: &mut W)
    where
        W: BallWorld + ?Sized,
        I: IntoIterator<Item = Intent>,
    {
        self.update(dt, world);
        for intent in intents {
            self.handle(intent, world);
        }
    }

    // -- Intents --

    fn place_cue_ball<W: BallWorld + ?Sized>(&mut self, point: Vec2, world: &mut W) -> bool {
        if self.state != SessionState::PlacingCueBall || self.cue_ball.is_some() {
            return false;
        }
        if !self.table.in_d(point) {
            return false;
        }
        let obstructed = self
            .ball_positions(world)
            .into_iter()
            .any(|p| p.distance(point) < self.table.ball_diameter);
        if obstructed {
            return false;
        }

        let body = world.spawn_ball(BallType::Cue, point);
        world.set_awake(&body, true);
        self.cue_ball = Some(Ball::on_table(BallType::Cue, body));
        self.set_state(SessionState::Aiming);
        self.message = "Aim your shot.".to_string();
        true
    }

    fn release_shot<W: BallWorld + ?Sized>(&mut self, world: &mut W) -> bool {
        if self.state != SessionState::Aiming || !self.cue.is_aiming() {
            return false;
        }
        let Some(origin) = self
            .cue_ball
            .as_ref()
            .and_then(Ball::body)
            .and_then(|body| world.position(body))
        else {
            return false;
        };
        let Some(shot) = self.cue.release(&self.config.shot) else {
            return false;
        };

        self.normalise_target();

        let impulse = shot.direction * shot.power * self.config.shot.impulse_per_power;
        if let Some(body) = self.cue_ball.as_ref().and_then(Ball::body) {
            world.apply_impulse(body, impulse, origin);
        }
        for body in self.balls().filter_map(Ball::body) {
            world.set_awake(body, true);
        }

        self.turn.clear();
        self.rest_frames = 0;
        self.aim_hit = None;
        self.events.push(SessionEvent::ShotPlayed {
            power: shot.power,
            miscue: shot.miscue,
        });
        if shot.miscue {
            log::info!("Miscue at power {:.1}", shot.power);
        }
        self.set_state(SessionState::BallsMoving);
        self.message = "Shot taken, balls moving...".to_string();
        true
    }

    fn start_chalk(&mut self) -> bool {
        if self.state != SessionState::Aiming {
            return false;
        }
        if !self.cue.start_chalk(self.config.timing.chalk_duration) {
            return false;
        }
        self.events.push(SessionEvent::ChalkStarted);
        true
    }

    /// With the reds gone a foul leaves `Red` as the target; narrow it to the
    /// lowest colour before the next shot.
    fn normalise_target(&mut self) {
        if self.target == Target::Red && self.reds.is_empty() {
            let on_table: Vec<BallType> = self.colours.iter().map(Ball::kind).collect();
            if let Some(colour) = rules::lowest_colour(&on_table) {
                self.set_target(Target::Colour(colour));
            }
        }
    }

    // -- Per-frame observation --

    fn observe_contacts<W: BallWorld + ?Sized>(&mut self, contacts: &[Contact], world: &W) {
        for contact in contacts {
            let a = self.find_ball(contact.a);
            let b = self.find_ball(contact.b);
            let speed_of = |ball: Option<&Ball>| {
                ball.and_then(Ball::body).map(|body| world.speed(body)).unwrap_or(0.0)
            };
            let speed = speed_of(a).max(speed_of(b));
            let (kind_a, kind_b) = (a.map(Ball::kind), b.map(Ball::kind));

            match (kind_a, kind_b) {
                (Some(_), Some(_)) if speed > self.config.physics.ball_hit_sound_speed => {
                    self.events.push(SessionEvent::BallHit);
                }
                (Some(_), None) | (None, Some(_)) if speed > self.config.physics.cushion_hit_sound_speed => {
                    self.events.push(SessionEvent::CushionHit);
                }
                _ => {}
            }

            if self.state != SessionState::BallsMoving || self.turn.first_hit().is_some() {
                continue;
            }
            if self.turn.on_collision(kind_a, kind_b) {
                if let Some(struck) = self.turn.first_hit() {
                    self.message = format!("Cue ball hit {struck}.");
                }
            } else if matches!(
                (kind_a, kind_b),
                (Some(BallType::Cue), None) | (None, Some(BallType::Cue))
            ) {
                self.message = "Cue ball hit a cushion.".to_string();
            }
        }
    }

    fn collect_pots<W: BallWorld + ?Sized>(&mut self, world: &mut W) {
        let pockets = self.table.pockets;
        let capture = self.table.capture_radius;
        let frame = self.table.frame();
        let mut dropped = Vec::new();

        let cue_drop = self.cue_ball.as_ref().and_then(|cue_ball| {
            pots::detect_pots(std::slice::from_ref(cue_ball), world, &pockets, capture, &frame)
                .first()
                .map(|&(_, how)| how)
        });
        if let Some(how) = cue_drop {
            dropped.extend(self.cue_ball.take().map(|ball| (ball, how)));
        }
        for balls in [&mut self.reds, &mut self.colours] {
            let hits = pots::detect_pots(balls, world, &pockets, capture, &frame);
            // Remove from the back so earlier indices stay valid
            let mut removed: Vec<(Ball, PotKind)> =
                hits.iter().rev().map(|&(i, how)| (balls.remove(i), how)).collect();
            removed.reverse();
            dropped.extend(removed);
        }

        for (mut ball, how) in dropped {
            if let Some(body) = ball.pot() {
                world.despawn(body);
            }
            let kind = ball.kind();
            match how {
                PotKind::Pocketed => log::info!("{} potted", kind),
                PotKind::Escaped => log::info!("{} left the table, counted as potted", kind),
            }
            self.events.push(SessionEvent::Potted(kind));
            self.turn.record_pot(ball);
        }
    }

    fn all_at_rest<W: BallWorld + ?Sized>(&self, world: &W) -> bool {
        let rest_speed = self.config.physics.rest_speed;
        self.balls()
            .filter_map(Ball::body)
            .all(|body| world.is_asleep(body) || world.speed(body) < rest_speed)
    }

    /// Put every ball to sleep. Anything still creeping below the rest speed
    /// would otherwise roll on after the turn is judged.
    fn stop_all<W: BallWorld + ?Sized>(&self, world: &mut W) {
        for body in self.balls().filter_map(Ball::body) {
            world.set_awake(body, false);
        }
    }

    fn refresh_aim<W: BallWorld + ?Sized>(&mut self, world: &W) {
        let Some(body) = self.cue_ball.as_ref().and_then(Ball::body) else {
            self.aim_hit = None;
            return;
        };
        let Some(origin) = world.position(body) else {
            self.aim_hit = None;
            return;
        };
        let direction = Vec2::from_angle(self.cue.angle());
        let reach = self.table.world.length();
        self.aim_hit = world
            .ray_first_hit(origin, direction, reach, Some(body))
            .and_then(|(id, distance)| {
                let ball = self.find_ball(id)?.kind();
                Some(AimHit {
                    ball,
                    point: origin + direction * distance,
                    distance,
                })
            });
    }

    // -- Turn resolution --

    fn resolve_turn<W: BallWorld + ?Sized>(&mut self, world: &mut W) {
        let potted_kinds = self.turn.potted_kinds();
        let (first_hit, potted) = self.turn.take();
        let colours_on_table: Vec<BallType> = self.colours.iter().map(Ball::kind).collect();
        let facts = TurnFacts {
            target: self.target,
            first_hit,
            potted: &potted_kinds,
            reds_remaining: self.reds.len(),
            colours_on_table: &colours_on_table,
        };
        let ruling = rules::resolve(&facts, self.score);
        self.rest_frames = 0;

        match ruling.verdict {
            Verdict::Foul { reason, penalty } => {
                log::info!("{} (-{}), score {} -> {}", reason, penalty, self.score, ruling.score);
                self.events.push(SessionEvent::Foul { penalty });
                self.show_splash(reason.to_string(), self.config.timing.foul_splash);
            }
            Verdict::Legal => {
                log::info!("{} score {} -> {}", ruling.summary, self.score, ruling.score);
            }
        }
        self.set_score(ruling.score);

        let mut occupied = self.ball_positions(world);
        for (mut ball, &(_, fate)) in potted.into_iter().zip(&ruling.dispositions) {
            if fate != Disposition::Respot {
                continue;
            }
            match respot::respot(ball.kind(), &occupied, &self.table) {
                Ok(pos) => {
                    ball.attach(world.spawn_ball(ball.kind(), pos));
                    occupied.push(pos);
                    self.colours.push(ball);
                }
                Err(err) => log::warn!("{}; leaving it off the table", err),
            }
        }

        if let Some(target) = ruling.next_target {
            self.set_target(target);
        }

        let cleared = ruling.is_game_over() || (self.reds.is_empty() && self.colours.is_empty());
        let summary = ruling.summary.clone();
        self.last_ruling = Some(ruling);

        if cleared {
            let text = format!("All balls cleared! Final Score: {}", self.score);
            self.message = summary;
            self.finish(text);
            return;
        }

        if self.cue_ball.is_some() {
            self.set_state(SessionState::Aiming);
            self.message = format!("{summary} Aim your shot.");
        } else {
            self.set_state(SessionState::PlacingCueBall);
            self.message = format!("{summary} Place cue ball.");
        }
    }

    fn finish(&mut self, text: String) {
        log::info!("{}", text);
        self.cue.cancel_aim();
        self.aim_hit = None;
        self.set_state(SessionState::GameOver);
        self.events.push(SessionEvent::GameOver { score: self.score });
        self.show_splash(text, self.config.timing.game_over_splash);
    }

    // -- Helpers --

    fn find_ball(&self, id: EntityId) -> Option<&Ball> {
        self.balls().find(|ball| ball.body_id() == Some(id))
    }

    fn ball_positions<W: BallWorld + ?Sized>(&self, world: &W) -> Vec<Vec2> {
        self.balls()
            .filter_map(Ball::body)
            .filter_map(|body| world.position(body))
            .collect()
    }

    fn show_splash(&mut self, text: String, duration: f32) {
        self.splash = Some(Splash {
            text,
            timer: Countdown::started(duration),
        });
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            log::debug!("State {:?} -> {:?}", self.state, state);
            self.state = state;
            self.events.push(SessionEvent::StateChanged(state));
        }
    }

    fn set_score(&mut self, score: u32) {
        if self.score != score {
            self.score = score;
            self.events.push(SessionEvent::ScoreChanged(score));
        }
    }

    fn set_target(&mut self, target: Target) {
        if self.target != target {
            self.target = target;
            self.events.push(SessionEvent::TargetChanged(target));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChalkResetPolicy;
    use crate::rules::Foul;
    use crate::world::scripted::ScriptedWorld;

    const DT: f32 = 1.0 / 60.0;

    fn new_game_with(config: SnookerConfig, mode: LayoutMode) -> (GameSession, ScriptedWorld) {
        let mut session = GameSession::new(config);
        let mut world = ScriptedWorld::new(session.table().ball_radius());
        session.reset(mode, &mut world);
        (session, world)
    }

    fn new_game() -> (GameSession, ScriptedWorld) {
        new_game_with(SnookerConfig::default(), LayoutMode::Racked)
    }

    fn cue_spot(session: &GameSession) -> Vec2 {
        let t = session.table();
        t.d_center - Vec2::new(t.d_radius / 2.0, 0.0)
    }

    fn place(session: &mut GameSession, world: &mut ScriptedWorld) {
        let spot = cue_spot(session);
        assert!(session.handle(Intent::PlaceCueBall(spot), world));
    }

    fn shoot(session: &mut GameSession, world: &mut ScriptedWorld, power: f32) {
        assert!(session.handle(Intent::StartAim, world));
        assert!(session.handle(Intent::UpdateAim { power, angle: 0.0 }, world));
        assert!(session.handle(Intent::ReleaseShot, world));
        assert_eq!(session.state(), SessionState::BallsMoving);
    }

    fn cue_id(session: &GameSession) -> EntityId {
        session.cue_ball().and_then(Ball::body_id).expect("cue ball on table")
    }

    fn colour_id(session: &GameSession, kind: BallType) -> EntityId {
        session
            .colours()
            .iter()
            .find(|b| b.kind() == kind)
            .and_then(Ball::body_id)
            .expect("colour on table")
    }

    fn red_ids(session: &GameSession) -> Vec<EntityId> {
        session.reds().iter().filter_map(Ball::body_id).collect()
    }

    /// Drop a ball into a pocket and let the session see it.
    fn sink(session: &mut GameSession, world: &mut ScriptedWorld, id: EntityId) {
        world.move_to(id, session.table().pockets[1]);
        session.update(DT, world);
    }

    fn come_to_rest(session: &mut GameSession, world: &mut ScriptedWorld) {
        world.settle();
        for _ in 0..session.config().physics.settle_frames {
            session.update(DT, world);
        }
        assert_ne!(session.state(), SessionState::BallsMoving, "turn should be resolved");
    }

    /// One turn: strike `first`, pot `pots`, wait for rest.
    fn play(session: &mut GameSession, world: &mut ScriptedWorld, first: Option<EntityId>, pots: &[EntityId]) {
        if session.cue_ball().is_none() {
            place(session, world);
        }
        shoot(session, world, 10.0);
        if let Some(first) = first {
            world.touch(cue_id(session), first);
        }
        session.update(DT, world);
        for &id in pots {
            sink(session, world, id);
        }
        come_to_rest(session, world);
    }

    fn ruling(session: &GameSession) -> &Ruling {
        session.last_ruling().expect("turn resolved")
    }

    fn assert_bodies_match_balls(session: &GameSession, world: &ScriptedWorld) {
        assert_eq!(world.bodies.len(), session.balls().count());
        for ball in session.balls() {
            let id = ball.body_id().expect("active ball has a body");
            assert!(world.bodies.contains_key(&id));
        }
    }

    #[test]
    fn reset_racks_the_table() {
        let (session, world) = new_game();
        assert_eq!(session.state(), SessionState::PlacingCueBall);
        assert_eq!(session.reds().len(), 15);
        assert_eq!(session.colours().len(), 6);
        assert!(session.cue_ball().is_none());
        assert_eq!(session.score(), 0);
        assert_eq!(session.target(), Target::Red);
        assert_eq!(session.time_remaining(), 600.0);
        assert_eq!(session.splash().map(|s| s.text.as_str()), Some("New Game: Racked!"));
        assert_bodies_match_balls(&session, &world);
    }

    #[test]
    fn cue_ball_must_go_in_the_d_clear_of_other_balls() {
        let (mut session, mut world) = new_game();
        let t = session.table().clone();

        assert!(!session.handle(Intent::PlaceCueBall(t.center()), &mut world));
        let beside_yellow = t.spot(BallType::Yellow).unwrap() - Vec2::new(10.0, 0.0);
        assert!(t.in_d(beside_yellow));
        assert!(!session.handle(Intent::PlaceCueBall(beside_yellow), &mut world));
        assert_eq!(session.state(), SessionState::PlacingCueBall);
        assert!(session.cue_ball().is_none());

        place(&mut session, &mut world);
        assert_eq!(session.state(), SessionState::Aiming);
        assert!(!session.handle(Intent::PlaceCueBall(cue_spot(&session)), &mut world));
    }

    #[test]
    fn intents_out_of_state_are_ignored() {
        let (mut session, mut world) = new_game();
        assert!(!session.handle(Intent::StartAim, &mut world));
        assert!(!session.handle(Intent::ReleaseShot, &mut world));
        assert!(!session.handle(Intent::StartChalk, &mut world));
        assert_eq!(session.state(), SessionState::PlacingCueBall);

        place(&mut session, &mut world);
        assert!(!session.handle(Intent::UpdateAim { power: 5.0, angle: 0.0 }, &mut world));
        assert!(!session.handle(Intent::ReleaseShot, &mut world));
        assert!(session.handle(Intent::StartAim, &mut world));
        assert!(!session.handle(Intent::StartAim, &mut world));
    }

    #[test]
    fn soft_release_plays_no_shot() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        session.handle(Intent::StartAim, &mut world);
        session.handle(Intent::UpdateAim { power: 0.5, angle: 0.0 }, &mut world);
        let aim = session.aim_hit();
        assert!(!session.handle(Intent::ReleaseShot, &mut world));
        assert_eq!(session.state(), SessionState::Aiming);
        assert!(world.impulses.is_empty());

        // The drag is still live and can be strengthened
        assert!(session.cue().is_aiming());
        assert_eq!(session.cue().power(), 0.5);
        assert_eq!(session.aim_hit(), aim);
        assert!(session.handle(Intent::UpdateAim { power: 10.0, angle: 0.0 }, &mut world));
        assert!(session.handle(Intent::ReleaseShot, &mut world));
    }

    #[test]
    fn cancelled_aim_cannot_be_released() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        session.handle(Intent::StartAim, &mut world);
        session.handle(Intent::UpdateAim { power: 20.0, angle: 0.0 }, &mut world);
        assert!(session.handle(Intent::CancelAim, &mut world));
        assert!(!session.handle(Intent::ReleaseShot, &mut world));
        assert!(world.impulses.is_empty());
    }

    #[test]
    fn shot_impulse_follows_aim_and_power() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        session.handle(Intent::StartAim, &mut world);
        session.handle(
            Intent::UpdateAim {
                power: 10.0,
                angle: std::f32::consts::PI,
            },
            &mut world,
        );
        assert!(session.handle(Intent::ReleaseShot, &mut world));
        let (id, impulse) = world.impulses[0];
        assert_eq!(id, cue_id(&session));
        let expected = Vec2::new(-10.0 * session.config().shot.impulse_per_power, 0.0);
        assert!((impulse - expected).length() < 1e-2, "{impulse}");
        assert!(session
            .drain_events()
            .contains(&SessionEvent::ShotPlayed { power: 10.0, miscue: false }));
    }

    #[test]
    fn aim_line_reports_first_ball() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        session.handle(Intent::StartAim, &mut world);
        session.handle(Intent::UpdateAim { power: 5.0, angle: 0.0 }, &mut world);
        let hit = session.aim_hit().expect("green is straight ahead");
        assert_eq!(hit.ball, BallType::Green);
        let expected = session.table().d_radius / 2.0 - session.table().ball_radius();
        assert!((hit.distance - expected).abs() < 1e-3);
    }

    // Scenario: cue ball potted on the opening shot
    #[test]
    fn in_off_from_the_break_is_a_foul() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        shoot(&mut session, &mut world, 12.0);
        let cue = cue_id(&session);
        sink(&mut session, &mut world, cue);
        assert!(session.cue_ball().is_none());
        come_to_rest(&mut session, &mut world);

        assert_eq!(
            ruling(&session).verdict,
            Verdict::Foul {
                reason: Foul::CuePotted,
                penalty: 4
            }
        );
        assert_eq!(session.score(), 0);
        assert_eq!(session.target(), Target::Red);
        assert_eq!(session.state(), SessionState::PlacingCueBall);
        assert_eq!(session.message(), "Foul: Cue ball potted! Place cue ball.");
        assert_eq!(session.splash().map(|s| s.text.as_str()), Some("Foul: Cue ball potted!"));
        assert_bodies_match_balls(&session, &world);
    }

    // Scenario: red struck first and potted
    #[test]
    fn potting_a_red_moves_on_to_a_colour() {
        let (mut session, mut world) = new_game();
        let red = red_ids(&session)[0];
        play(&mut session, &mut world, Some(red), &[red]);

        assert_eq!(ruling(&session).verdict, Verdict::Legal);
        assert_eq!(session.score(), 1);
        assert_eq!(session.target(), Target::AnyColour);
        assert_eq!(session.state(), SessionState::Aiming);
        assert_eq!(session.reds().len(), 14);
        assert_eq!(session.message(), "Potted: Red. Aim your shot.");
        assert_bodies_match_balls(&session, &world);
    }

    // Scenario: blue struck first and potted on a colour target
    #[test]
    fn potted_colour_is_respotted_while_reds_remain() {
        let (mut session, mut world) = new_game();
        let red = red_ids(&session)[0];
        play(&mut session, &mut world, Some(red), &[red]);

        let blue = colour_id(&session, BallType::Blue);
        play(&mut session, &mut world, Some(blue), &[blue]);

        assert_eq!(ruling(&session).verdict, Verdict::Legal);
        assert_eq!(session.score(), 6);
        assert_eq!(session.target(), Target::Red);
        let respotted = colour_id(&session, BallType::Blue);
        assert_ne!(respotted, blue, "respot creates a fresh body");
        assert_eq!(world.bodies[&respotted].pos, session.table().spot(BallType::Blue).unwrap());
        assert_eq!(session.colours().len(), 6);
        assert_bodies_match_balls(&session, &world);
    }

    // Scenario: last red, then the black, then the colours in sequence
    #[test]
    fn clearance_after_the_last_red() {
        let (mut session, mut world) = new_game();
        let reds = red_ids(&session);
        play(&mut session, &mut world, Some(reds[0]), &reds[..14]);
        assert_eq!(session.score(), 14);
        assert_eq!(session.target(), Target::AnyColour);

        // Black while a red is still up: respotted
        let black = colour_id(&session, BallType::Black);
        play(&mut session, &mut world, Some(black), &[black]);
        assert_eq!(session.score(), 21);
        assert_eq!(ruling(&session).dispositions, vec![(BallType::Black, Disposition::Respot)]);
        assert_eq!(session.target(), Target::Red);

        // Last red earns a free colour
        play(&mut session, &mut world, Some(reds[14]), &[reds[14]]);
        assert_eq!(session.score(), 22);
        assert!(session.reds().is_empty());
        assert_eq!(session.target(), Target::AnyColour);

        // Black again: off for good now
        let black = colour_id(&session, BallType::Black);
        play(&mut session, &mut world, Some(black), &[black]);
        assert_eq!(session.score(), 29);
        assert_eq!(ruling(&session).dispositions, vec![(BallType::Black, Disposition::Remove)]);
        assert_eq!(session.colours().len(), 5);
        assert_eq!(session.target(), Target::Colour(BallType::Yellow));

        let mut expected = 29;
        for colour in [BallType::Yellow, BallType::Green, BallType::Brown, BallType::Blue, BallType::Pink] {
            assert_eq!(session.target(), Target::Colour(colour));
            let id = colour_id(&session, colour);
            play(&mut session, &mut world, Some(id), &[id]);
            expected += colour.value();
            assert_eq!(session.score(), expected);
        }

        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.score(), 29 + 2 + 3 + 4 + 5 + 6);
        assert!(session.splash().unwrap().text.starts_with("All balls cleared!"));
        assert!(session.drain_events().contains(&SessionEvent::GameOver { score: 49 }));
    }

    #[test]
    fn no_contact_is_a_foul_of_four_clamped_at_zero() {
        let (mut session, mut world) = new_game();
        play(&mut session, &mut world, None, &[]);
        assert_eq!(
            ruling(&session).verdict,
            Verdict::Foul {
                reason: Foul::NoBallHit,
                penalty: 4
            }
        );
        assert_eq!(session.score(), 0);
        assert_eq!(session.state(), SessionState::Aiming);
    }

    #[test]
    fn wrong_ball_first_costs_its_value() {
        let (mut session, mut world) = new_game();
        let reds = red_ids(&session);
        play(&mut session, &mut world, Some(reds[0]), &reds[..10]);
        assert_eq!(session.score(), 10);

        // Target is any colour; hitting a red first is a foul
        play(&mut session, &mut world, Some(reds[10]), &[]);
        assert_eq!(session.score(), 6);
        assert_eq!(session.target(), Target::Red);

        let pink = colour_id(&session, BallType::Pink);
        play(&mut session, &mut world, Some(pink), &[]);
        assert_eq!(
            ruling(&session).verdict,
            Verdict::Foul {
                reason: Foul::HitFirst { struck: BallType::Pink },
                penalty: 6
            }
        );
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn contact_before_the_release_is_not_the_first_hit() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        assert!(session.handle(Intent::StartAim, &mut world));
        assert!(session.handle(Intent::UpdateAim { power: 10.0, angle: 0.0 }, &mut world));

        // The cue ball grazes the pink during the step before the shot
        let pink = colour_id(&session, BallType::Pink);
        world.touch(cue_id(&session), pink);
        session.frame(DT, [Intent::ReleaseShot], &mut world);
        assert_eq!(session.state(), SessionState::BallsMoving);
        assert_eq!(session.turn().first_hit(), None);

        let red = red_ids(&session)[0];
        world.touch(cue_id(&session), red);
        session.update(DT, &mut world);
        assert_eq!(session.turn().first_hit(), Some(BallType::Red));
    }

    #[test]
    fn creeping_balls_are_stopped_when_the_turn_is_judged() {
        let (mut session, mut world) = new_game();
        let reds = red_ids(&session);
        place(&mut session, &mut world);
        shoot(&mut session, &mut world, 10.0);
        world.touch(cue_id(&session), reds[0]);
        session.update(DT, &mut world);
        sink(&mut session, &mut world, reds[0]);

        // Everything stops except one red, still rolling below the rest speed
        world.settle();
        let creeping = reds[1];
        let crawl = session.config().physics.rest_speed * 0.8;
        world.set_moving(creeping, Vec2::new(crawl, 0.0));
        for _ in 0..session.config().physics.settle_frames {
            session.update(DT, &mut world);
        }
        assert_eq!(session.state(), SessionState::Aiming);
        assert_eq!(session.score(), 1);
        assert_eq!(world.bodies[&creeping].vel, Vec2::ZERO);
        assert!(world.bodies[&creeping].asleep);

        // The next turn is judged on its own pots only
        let blue = colour_id(&session, BallType::Blue);
        play(&mut session, &mut world, Some(blue), &[blue]);
        assert_eq!(ruling(&session).verdict, Verdict::Legal);
        assert_eq!(session.score(), 6);
    }

    #[test]
    fn only_the_first_contact_counts() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        shoot(&mut session, &mut world, 10.0);
        let cue = cue_id(&session);
        let red = red_ids(&session)[0];
        let black = colour_id(&session, BallType::Black);
        world.touch(cue, red);
        world.touch(cue, black);
        session.update(DT, &mut world);
        assert_eq!(session.turn().first_hit(), Some(BallType::Red));
        assert_eq!(session.message(), "Cue ball hit red.");
    }

    #[test]
    fn respot_avoids_occupied_spots() {
        let (mut session, mut world) = new_game();
        let t = session.table().clone();
        let red = red_ids(&session)[0];
        place(&mut session, &mut world);
        shoot(&mut session, &mut world, 10.0);
        world.touch(cue_id(&session), red);
        session.update(DT, &mut world);

        // A red comes to rest on the pink spot while the pink goes down: foul
        let parked = red_ids(&session)[1];
        world.move_to(parked, t.pink_spot());
        let pink = colour_id(&session, BallType::Pink);
        sink(&mut session, &mut world, pink);
        come_to_rest(&mut session, &mut world);

        assert!(ruling(&session).verdict.is_foul());
        let pos = world.bodies[&colour_id(&session, BallType::Pink)].pos;
        assert_ne!(pos, t.pink_spot());
        for (id, body) in &world.bodies {
            if body.kind != BallType::Pink {
                assert!(body.pos.distance(pos) >= t.ball_diameter, "{id:?} too close");
            }
        }
        assert_bodies_match_balls(&session, &world);
    }

    #[test]
    fn escaped_ball_counts_as_potted() {
        let (mut session, mut world) = new_game();
        let red = red_ids(&session)[0];
        place(&mut session, &mut world);
        shoot(&mut session, &mut world, 10.0);
        world.touch(cue_id(&session), red);
        let outside = session.table().frame().max() + Vec2::new(20.0, -100.0);
        world.move_to(red, outside);
        session.update(DT, &mut world);
        come_to_rest(&mut session, &mut world);
        assert_eq!(session.score(), 1);
        assert_eq!(session.reds().len(), 14);
    }

    #[test]
    fn waits_for_every_ball_to_stop() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        shoot(&mut session, &mut world, 10.0);
        let red = red_ids(&session)[0];
        world.touch(cue_id(&session), red);
        world.settle();
        world.set_moving(red, Vec2::new(50.0, 0.0));
        for _ in 0..10 {
            session.update(DT, &mut world);
        }
        assert_eq!(session.state(), SessionState::BallsMoving);

        world.settle();
        session.update(DT, &mut world);
        session.update(DT, &mut world);
        assert_eq!(session.state(), SessionState::BallsMoving);
        session.update(DT, &mut world);
        assert_eq!(session.state(), SessionState::Aiming);
    }

    #[test]
    fn foul_after_the_reds_narrows_target_at_next_shot() {
        let (mut session, mut world) = new_game();
        let reds = red_ids(&session);
        play(&mut session, &mut world, Some(reds[0]), &reds);
        assert!(session.reds().is_empty());

        // Miss everything: foul resets the target to red
        play(&mut session, &mut world, None, &[]);
        assert_eq!(session.target(), Target::Red);

        shoot(&mut session, &mut world, 10.0);
        assert_eq!(session.target(), Target::Colour(BallType::Yellow));
    }

    #[test]
    fn chalk_completes_while_aiming_and_boosts_power() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        assert!(session.handle(Intent::StartChalk, &mut world));
        assert!(!session.handle(Intent::StartChalk, &mut world));
        for _ in 0..(4.6 / DT) as usize {
            session.update(DT, &mut world);
        }
        assert!(session.cue().is_chalked());
        let events = session.drain_events();
        assert!(events.contains(&SessionEvent::ChalkStarted));
        assert!(events.contains(&SessionEvent::Chalked));

        shoot(&mut session, &mut world, 36.0);
        assert!(session
            .drain_events()
            .contains(&SessionEvent::ShotPlayed { power: 36.0, miscue: false }));
        assert!(!session.cue().is_chalked());
    }

    #[test]
    fn full_power_unchalked_is_a_miscue() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        shoot(&mut session, &mut world, 30.0);
        assert!(session
            .drain_events()
            .contains(&SessionEvent::ShotPlayed { power: 30.0, miscue: true }));
    }

    #[test]
    fn reset_mid_chalk_follows_policy() {
        for (policy, chalked) in [(ChalkResetPolicy::Discard, false), (ChalkResetPolicy::Keep, true)] {
            let config = SnookerConfig {
                chalk_on_reset: policy,
                ..SnookerConfig::default()
            };
            let (mut session, mut world) = new_game_with(config, LayoutMode::Racked);
            place(&mut session, &mut world);
            session.handle(Intent::StartChalk, &mut world);
            session.update(1.0, &mut world);
            assert!(session.handle(Intent::Reset(LayoutMode::Racked), &mut world));
            for _ in 0..10 {
                session.update(1.0, &mut world);
            }
            assert_eq!(session.cue().is_chalked(), chalked, "{policy:?}");
        }
    }

    #[test]
    fn clock_expiry_ends_the_game_from_any_state() {
        let config = SnookerConfig {
            timing: crate::config::TimingConfig {
                game_duration: 1.0,
                ..Default::default()
            },
            ..SnookerConfig::default()
        };
        let (mut session, mut world) = new_game_with(config, LayoutMode::Racked);
        let red = red_ids(&session)[0];
        play(&mut session, &mut world, Some(red), &[red]);
        shoot(&mut session, &mut world, 10.0);

        for _ in 0..60 {
            session.update(DT, &mut world);
        }
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.splash().unwrap().text, "GAME OVER! Final Score: 1");

        assert!(!session.handle(Intent::StartAim, &mut world));
        assert!(!session.handle(Intent::StartChalk, &mut world));
        assert!(session.handle(Intent::Reset(LayoutMode::RandomReds), &mut world));
        assert_eq!(session.state(), SessionState::PlacingCueBall);
        assert_eq!(session.score(), 0);
        assert_eq!(session.layout(), LayoutMode::RandomReds);
        assert_bodies_match_balls(&session, &world);
    }

    #[test]
    fn reset_mid_turn_releases_every_body() {
        let (mut session, mut world) = new_game();
        let red = red_ids(&session)[0];
        place(&mut session, &mut world);
        shoot(&mut session, &mut world, 10.0);
        sink(&mut session, &mut world, red);

        session.handle(Intent::Reset(LayoutMode::RandomAll), &mut world);
        assert!(session.turn().potted().is_empty());
        assert_eq!(world.bodies.len(), 21);
        assert_bodies_match_balls(&session, &world);
    }

    #[test]
    fn contact_sounds_need_speed() {
        let (mut session, mut world) = new_game();
        place(&mut session, &mut world);
        shoot(&mut session, &mut world, 10.0);
        session.drain_events();

        let cue = cue_id(&session);
        let red = red_ids(&session)[0];
        world.touch(cue, red);
        world.touch(cue, EntityId(1));
        session.update(DT, &mut world);
        let events = session.drain_events();
        assert!(events.contains(&SessionEvent::BallHit));
        assert!(events.contains(&SessionEvent::CushionHit));

        world.settle();
        world.touch(red, EntityId(1));
        session.update(DT, &mut world);
        assert!(!session.drain_events().contains(&SessionEvent::CushionHit));
    }
}
