use crate::clock::Millis;
use crate::components::{Direction, Point};
use crate::config::Tuning;
use crate::display::Rgb24;
use crate::level::{LevelData, Spawns};

pub const COLOR_PLAYER: Rgb24 = Rgb24::new(255, 255, 0);
pub const STARTING_LIVES: u8 = 2;

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Point,
    pub facing: Direction,
    pub lives: u8,
    pub energized: bool,
    pub last_move_ms: Millis,
}

impl Player {
    pub fn spawn(spawns: &Spawns, lives: u8) -> Self {
        Self {
            pos: spawns.player,
            facing: Direction::None,
            lives,
            energized: false,
            last_move_ms: 0,
        }
    }

    /// Turns toward `desired` when the neighboring cell that way is passable.
    /// Otherwise the current heading is kept.
    pub fn steer(&mut self, desired: Direction, level: &LevelData) {
        if !level.blocks_player(self.pos.step(desired)) {
            self.facing = desired;
        }
    }

    pub fn step_interval(&self, tuning: &Tuning) -> Millis {
        if self.energized {
            tuning.player_energized_step_ms
        } else {
            tuning.player_step_ms
        }
    }

    /// One cell along `facing`. Running into a wall or the ghost home stops
    /// the player where it was.
    pub fn advance(&mut self, level: &LevelData) {
        if self.facing == Direction::None {
            return;
        }
        let next = level.wrap(self.pos.step(self.facing));
        if level.blocks_player(next) {
            self.facing = Direction::None;
        } else {
            self.pos = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steering_into_wall_keeps_heading() {
        let level = LevelData::standard();
        let mut player = Player::spawn(&level.spawns, STARTING_LIVES);
        player.facing = Direction::Right;
        // (15, 24) is wall below the start cell.
        player.steer(Direction::Down, &level);
        assert_eq!(player.facing, Direction::Right);
        player.steer(Direction::Left, &level);
        assert_eq!(player.facing, Direction::Left);
    }

    #[test]
    fn running_into_wall_stops() {
        let level = LevelData::standard();
        let mut player = Player::spawn(&level.spawns, STARTING_LIVES);
        player.pos = Point::new(3, 1);
        player.facing = Direction::Left;
        player.advance(&level);
        assert_eq!(player.pos, Point::new(3, 1));
        assert_eq!(player.facing, Direction::None);
    }

    #[test]
    fn player_wraps_through_tunnel() {
        let level = LevelData::standard();
        let mut player = Player::spawn(&level.spawns, STARTING_LIVES);
        player.pos = Point::new(29, 14);
        player.facing = Direction::Right;
        player.advance(&level);
        assert_eq!(player.pos, Point::new(2, 14));
    }

    #[test]
    fn energized_player_is_faster() {
        let tuning = Tuning::default();
        let mut player = Player::spawn(&Spawns::standard(), STARTING_LIVES);
        assert_eq!(player.step_interval(&tuning), 150);
        player.energized = true;
        assert_eq!(player.step_interval(&tuning), 135);
    }
}
