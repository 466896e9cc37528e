//! The four pursuers: identities, release schedule, target selection and the
//! one-step movement planner.

use rand::Rng;
use tracing::debug;

use crate::clock::Millis;
use crate::components::{Direction, Point};
use crate::config::Tuning;
use crate::display::Rgb24;
use crate::level::{LevelData, Spawns, Tile};

pub const COLOR_SCARED: Rgb24 = Rgb24::new(33, 33, 255);
pub const COLOR_RETURNING: Rgb24 = Rgb24::WHITE;

/// Distance inside which the Wildcard gives up the chase.
const WILDCARD_SHY_DISTANCE: f64 = 8.0;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Identity {
    /// Targets the player directly.
    Leader,
    /// Targets four cells ahead of the player.
    Flanker,
    /// Pincers the player together with the Leader.
    Ambusher,
    /// Chases from afar, retreats when close.
    Wildcard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    AtStart,
    /// `global` applies while the global counter is enabled (after a death),
    /// `personal` otherwise.
    DotCounter { global: u32, personal: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityParams {
    pub scatter_target: Point,
    pub color: Rgb24,
    pub release: Release,
}

impl Identity {
    pub const ALL: [Identity; 4] = [
        Identity::Leader,
        Identity::Flanker,
        Identity::Ambusher,
        Identity::Wildcard,
    ];

    pub fn index(self) -> usize {
        match self {
            Identity::Leader => 0,
            Identity::Flanker => 1,
            Identity::Ambusher => 2,
            Identity::Wildcard => 3,
        }
    }

    pub fn params(self) -> IdentityParams {
        match self {
            Identity::Leader => IdentityParams {
                scatter_target: Point::new(27, 0),
                color: Rgb24::new(255, 0, 0),
                release: Release::AtStart,
            },
            Identity::Flanker => IdentityParams {
                scatter_target: Point::new(4, 0),
                color: Rgb24::new(255, 184, 255),
                release: Release::DotCounter {
                    global: 17,
                    personal: 0,
                },
            },
            Identity::Ambusher => IdentityParams {
                scatter_target: Point::new(31, 31),
                color: Rgb24::new(0, 255, 255),
                release: Release::DotCounter {
                    global: 17,
                    personal: 30,
                },
            },
            Identity::Wildcard => IdentityParams {
                scatter_target: Point::new(0, 31),
                color: Rgb24::new(255, 184, 81),
                release: Release::DotCounter {
                    global: 32,
                    personal: 90,
                },
            },
        }
    }
}

/// Per-agent behavior. Independent of the global mode: an agent may be
/// Returning whatever the global timer says.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AgentMode {
    Scatter,
    Chase,
    Scared,
    Returning,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub identity: Identity,
    pub pos: Point,
    pub facing: Direction,
    pub active: bool,
    pub left_home: bool,
    pub mode: AgentMode,
    pub last_move_ms: Millis,
}

impl Agent {
    pub fn spawn(identity: Identity, spawns: &Spawns, mode: AgentMode) -> Self {
        let at_start = identity.params().release == Release::AtStart;
        Self {
            identity,
            pos: spawns.agents[identity.index()],
            facing: if at_start {
                Direction::Right
            } else {
                Direction::None
            },
            active: at_start,
            left_home: at_start,
            mode,
            last_move_ms: 0,
        }
    }

    pub fn step_interval(&self, tuning: &Tuning) -> Millis {
        match self.mode {
            AgentMode::Scared => tuning.agent_scared_step_ms,
            AgentMode::Returning => tuning.agent_returning_step_ms,
            AgentMode::Scatter | AgentMode::Chase => tuning.agent_step_ms,
        }
    }

    pub fn color(&self) -> Rgb24 {
        match self.mode {
            AgentMode::Scared => COLOR_SCARED,
            AgentMode::Returning => COLOR_RETURNING,
            AgentMode::Scatter | AgentMode::Chase => self.identity.params().color,
        }
    }

    /// Moves one cell along `facing`, wrapping through the tunnel.
    /// Returns true when a Returning agent arrived home and rejoined.
    pub fn advance(&mut self, level: &LevelData) -> bool {
        self.pos = level.wrap(self.pos.step(self.facing));

        if !self.left_home && self.pos == level.spawns.staging {
            self.left_home = true;
        }

        if self.mode == AgentMode::Returning && self.pos == level.spawns.home {
            self.mode = AgentMode::Chase;
            self.left_home = false;
            debug!(identity = ?self.identity, "agent back home");
            return true;
        }
        false
    }
}

/// Counters the release schedule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseCounters {
    pub global_enabled: bool,
    pub global: u32,
    /// Pellets eaten this level.
    pub eaten: u32,
    /// Time since the last pellet was eaten.
    pub idle_ms: Millis,
    pub idle_limit_ms: Millis,
}

pub fn should_release(identity: Identity, counters: &ReleaseCounters) -> bool {
    match identity.params().release {
        Release::AtStart => true,
        Release::DotCounter { global, personal } => {
            if counters.global_enabled {
                counters.global >= global && counters.idle_ms >= counters.idle_limit_ms
            } else {
                counters.eaten >= personal
            }
        }
    }
}

/// What an agent knows about the board when picking a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pursuit {
    pub player: Point,
    pub player_facing: Direction,
    pub leader: Point,
}

/// `cells` ahead of the player. Facing up also shifts left by the same
/// amount, like the arcade machine.
fn ahead_of_player(pursuit: &Pursuit, cells: i32) -> Point {
    let p = pursuit.player;
    match pursuit.player_facing {
        Direction::Up => p.offset(-cells, -cells),
        Direction::Down => p.offset(0, cells),
        Direction::Left => p.offset(-cells, 0),
        Direction::Right => p.offset(cells, 0),
        Direction::None => p,
    }
}

pub fn select_target(agent: &Agent, pursuit: &Pursuit, spawns: &Spawns) -> Point {
    let params = agent.identity.params();
    if !agent.left_home {
        return spawns.staging;
    }
    match agent.mode {
        AgentMode::Scatter => params.scatter_target,
        AgentMode::Scared | AgentMode::Returning => spawns.home,
        AgentMode::Chase => match agent.identity {
            Identity::Leader => pursuit.player,
            Identity::Flanker => ahead_of_player(pursuit, 4),
            Identity::Ambusher => {
                let pivot = ahead_of_player(pursuit, 2);
                Point::new(
                    2 * pivot.x - pursuit.leader.x,
                    2 * pivot.y - pursuit.leader.y,
                )
            }
            Identity::Wildcard => {
                if agent.pos.distance(pursuit.player) >= WILDCARD_SHY_DISTANCE {
                    pursuit.player
                } else {
                    params.scatter_target
                }
            }
        },
    }
}

fn can_enter(agent: &Agent, dir: Direction, level: &LevelData, honor_no_up: bool) -> bool {
    let next = agent.pos.step(dir);
    match level.tile(next) {
        Tile::Wall => return false,
        Tile::GhostHome if agent.left_home && agent.mode != AgentMode::Returning => return false,
        _ => {}
    }
    !(honor_no_up && dir == Direction::Up && level.is_no_up_cell(next))
}

/// Picks the direction for the next single step.
///
/// Scared agents wander: the first legal non-reversing direction found from a
/// random starting point wins. Otherwise the legal non-reversing direction
/// whose destination is nearest the target wins, first found on ties. The
/// reverse is used only when nothing else is legal.
pub fn plan_next_move(
    agent: &Agent,
    target: Point,
    level: &LevelData,
    rng: &mut impl Rng,
) -> Direction {
    let reverse = agent.facing.reverse();
    let chosen = if agent.mode == AgentMode::Scared {
        let start = rng.gen_range(0..Direction::COMPASS.len());
        (0..Direction::COMPASS.len())
            .map(|k| Direction::COMPASS[(start + k) % Direction::COMPASS.len()])
            .find(|&dir| dir != reverse && can_enter(agent, dir, level, false))
    } else {
        let mut best: Option<(Direction, f64)> = None;
        for dir in Direction::COMPASS {
            if dir == reverse || !can_enter(agent, dir, level, true) {
                continue;
            }
            let distance = agent.pos.step(dir).distance(target);
            match best {
                Some((_, shortest)) if distance >= shortest => {}
                _ => best = Some((dir, distance)),
            }
        }
        best.map(|(dir, _)| dir)
    };

    match chosen {
        Some(dir) => dir,
        None if reverse != Direction::None && can_enter(agent, reverse, level, false) => reverse,
        None => Direction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open_spawns() -> Spawns {
        Spawns {
            player: Point::new(1, 1),
            agents: [Point::new(2, 2); 4],
            home: Point::new(3, 5),
            staging: Point::new(3, 3),
            no_up_cells: vec![],
            tunnel: (0, 6),
        }
    }

    fn chasing(identity: Identity, pos: Point, facing: Direction) -> Agent {
        Agent {
            identity,
            pos,
            facing,
            active: true,
            left_home: true,
            mode: AgentMode::Chase,
            last_move_ms: 0,
        }
    }

    fn pursuit(player: Point, facing: Direction, leader: Point) -> Pursuit {
        Pursuit {
            player,
            player_facing: facing,
            leader,
        }
    }

    #[test]
    fn leader_targets_player() {
        let spawns = Spawns::standard();
        let agent = chasing(Identity::Leader, Point::new(3, 3), Direction::Left);
        let p = pursuit(Point::new(15, 23), Direction::Right, agent.pos);
        assert_eq!(select_target(&agent, &p, &spawns), Point::new(15, 23));
    }

    #[test]
    fn flanker_looks_four_ahead_with_up_quirk() {
        let spawns = Spawns::standard();
        let agent = chasing(Identity::Flanker, Point::new(3, 3), Direction::Left);
        let cases = [
            (Direction::Up, Point::new(6, 6)),
            (Direction::Down, Point::new(10, 14)),
            (Direction::Left, Point::new(6, 10)),
            (Direction::Right, Point::new(14, 10)),
            (Direction::None, Point::new(10, 10)),
        ];
        for (facing, expected) in cases {
            let p = pursuit(Point::new(10, 10), facing, Point::new(0, 0));
            assert_eq!(select_target(&agent, &p, &spawns), expected, "{facing:?}");
        }
    }

    #[test]
    fn ambusher_reflects_leader_through_pivot() {
        let spawns = Spawns::standard();
        let agent = chasing(Identity::Ambusher, Point::new(3, 3), Direction::Left);
        let p = pursuit(Point::new(10, 10), Direction::Right, Point::new(4, 10));
        assert_eq!(select_target(&agent, &p, &spawns), Point::new(20, 10));

        // Up quirk: pivot is (8, 8).
        let p = pursuit(Point::new(10, 10), Direction::Up, Point::new(8, 4));
        assert_eq!(select_target(&agent, &p, &spawns), Point::new(8, 12));
    }

    #[test]
    fn wildcard_retreats_when_close() {
        let spawns = Spawns::standard();
        let far = chasing(Identity::Wildcard, Point::new(10, 2), Direction::Left);
        let p = pursuit(Point::new(10, 10), Direction::Right, Point::new(0, 0));
        assert_eq!(select_target(&far, &p, &spawns), Point::new(10, 10));

        let near = chasing(Identity::Wildcard, Point::new(10, 3), Direction::Left);
        assert_eq!(select_target(&near, &p, &spawns), Point::new(0, 31));
    }

    #[test]
    fn unreleased_and_fleeing_targets() {
        let spawns = Spawns::standard();
        let p = pursuit(Point::new(10, 10), Direction::Right, Point::new(0, 0));

        let mut agent = chasing(Identity::Ambusher, Point::new(14, 14), Direction::None);
        agent.left_home = false;
        assert_eq!(select_target(&agent, &p, &spawns), spawns.staging);

        agent.left_home = true;
        agent.mode = AgentMode::Scatter;
        assert_eq!(select_target(&agent, &p, &spawns), Point::new(31, 31));
        agent.mode = AgentMode::Scared;
        assert_eq!(select_target(&agent, &p, &spawns), spawns.home);
        agent.mode = AgentMode::Returning;
        assert_eq!(select_target(&agent, &p, &spawns), spawns.home);
    }

    #[test]
    fn release_schedule_thresholds() {
        let mut counters = ReleaseCounters {
            global_enabled: false,
            global: 0,
            eaten: 0,
            idle_ms: 0,
            idle_limit_ms: 4000,
        };
        assert!(should_release(Identity::Leader, &counters));
        assert!(should_release(Identity::Flanker, &counters));
        assert!(!should_release(Identity::Ambusher, &counters));
        counters.eaten = 30;
        assert!(should_release(Identity::Ambusher, &counters));
        assert!(!should_release(Identity::Wildcard, &counters));
        counters.eaten = 90;
        assert!(should_release(Identity::Wildcard, &counters));

        counters.global_enabled = true;
        counters.global = 17;
        counters.idle_ms = 3999;
        assert!(!should_release(Identity::Flanker, &counters));
        counters.idle_ms = 4000;
        assert!(should_release(Identity::Flanker, &counters));
        assert!(should_release(Identity::Ambusher, &counters));
        assert!(!should_release(Identity::Wildcard, &counters));
        counters.global = 32;
        assert!(should_release(Identity::Wildcard, &counters));
    }

    #[test]
    fn leader_at_staging_cell_steps_right_on_standard_maze() {
        // Up is wall, Left is the reverse of Right, Down is the home door.
        let level = LevelData::standard();
        let agent = chasing(Identity::Leader, Point::new(15, 11), Direction::Right);
        let mut rng = StdRng::seed_from_u64(1);
        let dir = plan_next_move(&agent, Point::new(15, 23), &level, &mut rng);
        assert_eq!(dir, Direction::Right);
    }

    #[test]
    fn nearest_direction_wins_and_reverse_is_excluded() {
        let level = LevelData::from_rows(
            &["#######", "#.....#", "#.....#", "#.....#", "#######"],
            open_spawns(),
        );
        let mut rng = StdRng::seed_from_u64(7);
        let agent = chasing(Identity::Leader, Point::new(3, 2), Direction::Right);
        assert_eq!(
            plan_next_move(&agent, Point::new(3, 9), &level, &mut rng),
            Direction::Down
        );
        // Target straight behind: reverse is off the table, so the tie between
        // Up and Down goes to Up (first in compass order).
        assert_eq!(
            plan_next_move(&agent, Point::new(-5, 2), &level, &mut rng),
            Direction::Up
        );
    }

    #[test]
    fn home_cells_block_agents_that_left_home() {
        let level = LevelData::from_rows(&["#####", "#...#", "##H##", "#####"], open_spawns());
        let mut rng = StdRng::seed_from_u64(3);
        let mut agent = chasing(Identity::Leader, Point::new(2, 1), Direction::Right);
        let dir = plan_next_move(&agent, Point::new(2, 9), &level, &mut rng);
        assert_eq!(dir, Direction::Right);

        agent.mode = AgentMode::Returning;
        let dir = plan_next_move(&agent, Point::new(2, 9), &level, &mut rng);
        assert_eq!(dir, Direction::Down);
    }

    #[test]
    fn no_up_cells_refuse_upward_entry() {
        let mut spawns = open_spawns();
        spawns.no_up_cells = vec![Point::new(2, 1)];
        let level = LevelData::from_rows(&["#####", "#...#", "#...#", "#####"], spawns);
        let mut rng = StdRng::seed_from_u64(3);
        let agent = chasing(Identity::Leader, Point::new(2, 2), Direction::Left);
        let dir = plan_next_move(&agent, Point::new(2, -10), &level, &mut rng);
        assert_eq!(dir, Direction::Left);
    }

    #[test]
    fn dead_end_falls_back_to_reverse() {
        let level = LevelData::from_rows(&["#####", "#..##", "#####"], open_spawns());
        let mut rng = StdRng::seed_from_u64(3);
        let agent = chasing(Identity::Leader, Point::new(2, 1), Direction::Right);
        assert_eq!(
            plan_next_move(&agent, Point::new(9, 1), &level, &mut rng),
            Direction::Left
        );
    }

    #[test]
    fn scared_wander_never_reverses_or_hits_walls() {
        let level = LevelData::from_rows(
            &["#####", "##.##", "#...#", "##.##", "#####"],
            open_spawns(),
        );
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for facing in Direction::COMPASS {
                let mut agent = chasing(Identity::Flanker, Point::new(2, 2), facing);
                agent.mode = AgentMode::Scared;
                let dir = plan_next_move(&agent, Point::new(0, 0), &level, &mut rng);
                assert_ne!(dir, facing.reverse());
                assert_ne!(dir, Direction::None);
                assert_ne!(level.tile(agent.pos.step(dir)), Tile::Wall);
            }
        }
    }

    #[test]
    fn scared_wander_uses_every_open_exit() {
        let level = LevelData::from_rows(
            &["#####", "##.##", "#...#", "##.##", "#####"],
            open_spawns(),
        );
        let mut seen = std::collections::HashSet::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut agent = chasing(Identity::Wildcard, Point::new(2, 2), Direction::Up);
            agent.mode = AgentMode::Scared;
            seen.insert(plan_next_move(&agent, Point::new(0, 0), &level, &mut rng));
        }
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains(&Direction::Down));
    }

    #[test]
    fn returning_agent_rejoins_at_home() {
        let level = LevelData::standard();
        let mut agent = chasing(Identity::Ambusher, Point::new(15, 14), Direction::Down);
        agent.mode = AgentMode::Returning;
        assert!(agent.advance(&level));
        assert_eq!(agent.pos, level.spawns.home);
        assert_eq!(agent.mode, AgentMode::Chase);
        assert!(!agent.left_home);
        assert_eq!(agent.step_interval(&Tuning::default()), 160);
    }

    #[test]
    fn reaching_staging_marks_left_home() {
        let level = LevelData::standard();
        let mut agent = Agent::spawn(Identity::Flanker, &level.spawns, AgentMode::Scatter);
        agent.pos = Point::new(15, 12);
        agent.facing = Direction::Up;
        agent.advance(&level);
        assert!(agent.left_home);
    }

    #[test]
    fn agents_wrap_through_tunnel() {
        let level = LevelData::standard();
        let mut agent = chasing(Identity::Leader, Point::new(2, 14), Direction::Left);
        agent.advance(&level);
        assert_eq!(agent.pos, Point::new(29, 14));
    }
}
