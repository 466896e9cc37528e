//! Pac-Man style chase on the 32x32 board.
//!
//! The host calls [`PacManGame::step`] at whatever rate it likes with the time
//! elapsed since the previous call; the game never sleeps. Pauses after a
//! death or a cleared board are phases that count down inside `step`.

use rand::Rng;
use tracing::debug;

use crate::clock::{elapsed_since, Millis};
use crate::components::{Direction, Pellet, PelletKind};
use crate::config::Tuning;
use crate::display::{RenderCommands, Rgb24};
use crate::ghost::{
    plan_next_move, select_target, should_release, Agent, AgentMode, Identity, Pursuit,
    ReleaseCounters,
};
use crate::input::{Command, HeldResolver};
use crate::level::{LevelData, Tile, LEVEL_HEIGHT};
use crate::mode::{GlobalMode, ModeChange, ModeTimer};
use crate::player::{Player, COLOR_PLAYER, STARTING_LIVES};

pub const COLOR_WALL: Rgb24 = Rgb24::new(33, 33, 255);
pub const COLOR_GHOST_HOME: Rgb24 = Rgb24::new(1, 0, 0);
pub const COLOR_PELLET: Rgb24 = Rgb24::new(64, 64, 64);
pub const COLOR_POWER_PELLET: Rgb24 = Rgb24::new(0, 255, 33);

const MAX_SCORE_PIXELS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Player was caught; the board freezes before lives are counted.
    Dying { remaining_ms: Millis },
    /// Last pellet eaten; the board freezes before it refills.
    Cleared { remaining_ms: Millis },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    pub commands: RenderCommands,
    /// Home was pressed; the host should leave the game.
    pub exit: bool,
}

pub struct PacManGame {
    level: LevelData,
    tuning: Tuning,
    timer: ModeTimer,
    player: Player,
    agents: Vec<Agent>,
    pellets: Vec<Pellet>,
    eaten: u32,
    global_counter_enabled: bool,
    global_counter: u32,
    last_pellet_ms: Millis,
    now_ms: Millis,
    paused: bool,
    phase: Phase,
    levels_cleared: u32,
    input: HeldResolver,
}

impl PacManGame {
    pub fn new(level: LevelData, tuning: Tuning) -> Self {
        let timer = ModeTimer::new(&tuning);
        let player = Player::spawn(&level.spawns, STARTING_LIVES);
        let pellets = level.fresh_pellets();
        let mut game = Self {
            level,
            tuning,
            timer,
            player,
            agents: Vec::new(),
            pellets,
            eaten: 0,
            global_counter_enabled: false,
            global_counter: 0,
            last_pellet_ms: 0,
            now_ms: 0,
            paused: true,
            phase: Phase::Playing,
            levels_cleared: 0,
            input: HeldResolver::new(),
        };
        game.spawn_agents(AgentMode::Scatter);
        game
    }

    pub fn standard(tuning: Tuning) -> Self {
        Self::new(LevelData::standard(), tuning)
    }

    pub fn mode(&self) -> GlobalMode {
        self.timer.mode()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn agent(&self, identity: Identity) -> &Agent {
        &self.agents[identity.index()]
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn levels_cleared(&self) -> u32 {
        self.levels_cleared
    }

    pub fn eaten(&self) -> u32 {
        self.eaten
    }

    pub fn pellets_left(&self) -> usize {
        self.pellets.iter().filter(|p| p.active).count()
    }

    /// Advances the game by `elapsed` ms with at most one input command and
    /// returns a full redraw.
    pub fn step(
        &mut self,
        elapsed: Millis,
        input: Option<Command>,
        rng: &mut impl Rng,
    ) -> StepOutput {
        let resolved = self.input.resolve(input);
        if matches!(resolved, Some(r) if r.command == Command::Home) {
            return StepOutput {
                commands: self.draw(),
                exit: true,
            };
        }

        match self.phase {
            Phase::Playing => {
                if let Some(r) = resolved {
                    self.apply_command(r.command, r.repeated);
                }
                if !self.paused {
                    self.update(elapsed, rng);
                }
            }
            Phase::Dying { remaining_ms } => {
                if elapsed >= remaining_ms {
                    self.finish_death();
                } else {
                    self.phase = Phase::Dying {
                        remaining_ms: remaining_ms - elapsed,
                    };
                }
            }
            Phase::Cleared { remaining_ms } => {
                if elapsed >= remaining_ms {
                    self.reset_level();
                    self.levels_cleared += 1;
                    debug!(levels_cleared = self.levels_cleared, "board refilled");
                } else {
                    self.phase = Phase::Cleared {
                        remaining_ms: remaining_ms - elapsed,
                    };
                }
            }
        }

        StepOutput {
            commands: self.draw(),
            exit: false,
        }
    }

    fn apply_command(&mut self, command: Command, repeated: bool) {
        let desired = match command {
            Command::Select => {
                if !repeated {
                    self.paused = !self.paused;
                }
                return;
            }
            Command::Up => Direction::Up,
            Command::Down => Direction::Down,
            Command::Left => Direction::Left,
            Command::Right => Direction::Right,
            _ => return,
        };
        self.paused = false;
        self.player.steer(desired, &self.level);
    }

    fn update(&mut self, elapsed: Millis, rng: &mut impl Rng) {
        self.now_ms = self.now_ms.wrapping_add(elapsed);
        self.tick_mode(elapsed);
        self.update_agents(rng);
        self.update_player();
    }

    fn tick_mode(&mut self, elapsed: Millis) {
        if let Some(change) = self.timer.advance(elapsed) {
            self.apply_mode_change(change);
        }
    }

    fn apply_mode_change(&mut self, change: ModeChange) {
        let mode = match change {
            ModeChange::ToChase => AgentMode::Chase,
            ModeChange::ToScatter => AgentMode::Scatter,
            ModeChange::ScaredExpired => {
                self.player.energized = false;
                AgentMode::Chase
            }
        };
        for agent in self.agents.iter_mut() {
            if agent.mode != AgentMode::Returning {
                agent.mode = mode;
            }
        }
    }

    fn energize(&mut self) {
        self.timer.frighten();
        self.player.energized = true;
        for agent in self.agents.iter_mut() {
            if agent.active && agent.mode != AgentMode::Returning {
                agent.mode = AgentMode::Scared;
            }
        }
        debug!("power pellet eaten");
    }

    fn update_agents(&mut self, rng: &mut impl Rng) {
        for i in 0..self.agents.len() {
            if !self.agents[i].active {
                let idle_ms = elapsed_since(self.now_ms, self.last_pellet_ms);
                let counters = ReleaseCounters {
                    global_enabled: self.global_counter_enabled,
                    global: self.global_counter,
                    eaten: self.eaten,
                    idle_ms,
                    idle_limit_ms: self.tuning.release_idle_ms,
                };
                if !should_release(self.agents[i].identity, &counters) {
                    continue;
                }
                self.agents[i].active = true;
                if idle_ms >= self.tuning.release_idle_ms {
                    // Space out releases driven by an idle player.
                    self.last_pellet_ms = self.now_ms;
                }
                debug!(identity = ?self.agents[i].identity, "agent released");
            }

            let interval = self.agents[i].step_interval(&self.tuning);
            if elapsed_since(self.now_ms, self.agents[i].last_move_ms) < interval {
                continue;
            }

            self.agents[i].advance(&self.level);
            let pursuit = Pursuit {
                player: self.player.pos,
                player_facing: self.player.facing,
                leader: self.agents[Identity::Leader.index()].pos,
            };
            let agent = &self.agents[i];
            let target = select_target(agent, &pursuit, &self.level.spawns);
            let facing = plan_next_move(agent, target, &self.level, rng);

            let agent = &mut self.agents[i];
            agent.facing = facing;
            agent.last_move_ms = self.now_ms;
        }
    }

    fn update_player(&mut self) {
        let interval = self.player.step_interval(&self.tuning);
        if elapsed_since(self.now_ms, self.player.last_move_ms) < interval {
            return;
        }
        self.player.advance(&self.level);
        self.player.last_move_ms = self.now_ms;

        let mut caught = false;
        for agent in self.agents.iter_mut() {
            if agent.pos != self.player.pos {
                continue;
            }
            match agent.mode {
                AgentMode::Scared => {
                    agent.mode = AgentMode::Returning;
                    debug!(identity = ?agent.identity, "agent captured");
                }
                AgentMode::Returning => {}
                AgentMode::Scatter | AgentMode::Chase => caught = true,
            }
        }
        if caught {
            debug!(lives = self.player.lives, "player caught");
            self.phase = Phase::Dying {
                remaining_ms: self.tuning.death_pause_ms,
            };
            return;
        }

        let pos = self.player.pos;
        let Some(pellet) = self.pellets.iter_mut().find(|p| p.active && p.pos == pos) else {
            return;
        };
        pellet.active = false;
        let kind = pellet.kind;

        self.eaten += 1;
        if self.pellets_left() == 0 {
            debug!(eaten = self.eaten, "board cleared");
            self.phase = Phase::Cleared {
                remaining_ms: self.tuning.level_clear_pause_ms,
            };
            return;
        }
        if kind == PelletKind::Power {
            self.energize();
        }
        if self.global_counter_enabled {
            self.global_counter += 1;
        }
        self.last_pellet_ms = self.now_ms;
    }

    fn finish_death(&mut self) {
        if self.player.lives == 0 {
            debug!("out of lives");
            self.reset_level();
            self.levels_cleared = 0;
            return;
        }
        let lives = self.player.lives - 1;
        self.global_counter_enabled = true;
        self.global_counter = 0;
        self.timer.restart();
        self.player = Player::spawn(&self.level.spawns, lives);
        self.player.last_move_ms = self.now_ms;
        // Survivors come back hunting; the timer still restarts in Scatter.
        self.spawn_agents(AgentMode::Chase);
        self.last_pellet_ms = self.now_ms;
        self.input.reset();
        self.paused = true;
        self.phase = Phase::Playing;
    }

    fn reset_level(&mut self) {
        self.timer = ModeTimer::new(&self.tuning);
        self.pellets = self.level.fresh_pellets();
        self.eaten = 0;
        self.global_counter_enabled = false;
        self.global_counter = 0;
        self.player = Player::spawn(&self.level.spawns, STARTING_LIVES);
        self.player.last_move_ms = self.now_ms;
        self.spawn_agents(AgentMode::Scatter);
        self.last_pellet_ms = self.now_ms;
        self.input.reset();
        self.paused = true;
        self.phase = Phase::Playing;
    }

    fn spawn_agents(&mut self, mode: AgentMode) {
        self.agents = Identity::ALL
            .iter()
            .map(|&identity| {
                let mut agent = Agent::spawn(identity, &self.level.spawns, mode);
                agent.last_move_ms = self.now_ms;
                agent
            })
            .collect();
    }

    fn draw(&self) -> RenderCommands {
        let mut cmds = RenderCommands::new();
        cmds.clear(Rgb24::BLACK);

        for (pos, tile) in self.level.cells() {
            let color = match tile {
                Tile::Wall => COLOR_WALL,
                Tile::GhostHome => COLOR_GHOST_HOME,
                Tile::Open => continue,
            };
            cmds.set_pixel(pos.x as usize, pos.y as usize, color);
        }

        for pellet in self.pellets.iter().filter(|p| p.active) {
            let color = match pellet.kind {
                PelletKind::Normal => COLOR_PELLET,
                PelletKind::Power => COLOR_POWER_PELLET,
            };
            cmds.set_pixel(pellet.pos.x as usize, pellet.pos.y as usize, color);
        }

        for agent in &self.agents {
            cmds.set_pixel(agent.pos.x as usize, agent.pos.y as usize, agent.color());
        }

        let p = self.player.pos;
        cmds.set_pixel(p.x as usize, p.y as usize, COLOR_PLAYER);

        let hud_y = LEVEL_HEIGHT - 1;
        for i in 0..self.player.lives as usize {
            cmds.set_pixel(3 + i * 2, hud_y, COLOR_PLAYER);
        }
        for i in 0..self.levels_cleared.min(MAX_SCORE_PIXELS) as usize {
            cmds.set_pixel(31 - i, hud_y, Rgb24::WHITE);
        }

        cmds.present();
        cmds
    }
}
