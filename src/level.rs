use crate::components::{Pellet, PelletKind, Point};

pub const LEVEL_WIDTH: usize = 32;
pub const LEVEL_HEIGHT: usize = 32;

/// Terrain of one cell. Built once from the layout; never read back from the
/// display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Open,
    Wall,
    GhostHome,
}

/// Fixed positions that go with a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spawns {
    pub player: Point,
    /// Leader, Flanker, Ambusher, Wildcard.
    pub agents: [Point; 4],
    /// Cell returning agents head for.
    pub home: Point,
    /// Cell just outside the home that marks an agent as having left it.
    pub staging: Point,
    /// Cells an agent may not enter while moving up.
    pub no_up_cells: Vec<Point>,
    /// Leftmost and rightmost playable columns of the wrap tunnel.
    pub tunnel: (i32, i32),
}

impl Spawns {
    pub fn standard() -> Self {
        Self {
            player: Point::new(15, 23),
            agents: [
                Point::new(15, 11),
                Point::new(15, 14),
                Point::new(14, 14),
                Point::new(16, 14),
            ],
            home: Point::new(15, 15),
            staging: Point::new(15, 11),
            no_up_cells: vec![
                Point::new(14, 10),
                Point::new(17, 10),
                Point::new(14, 22),
                Point::new(17, 22),
            ],
            tunnel: (2, 29),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LevelData {
    width: usize,
    height: usize,
    terrain: Vec<Tile>,
    pellets: Vec<Pellet>,
    pub spawns: Spawns,
}

// 0 open, 1 wall, 2 pellet, 3 ghost home, 4 power pellet
#[rustfmt::skip]
const LEVEL_ONE: [u8; LEVEL_WIDTH * LEVEL_HEIGHT] = [
    0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0,
    0, 0, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 0, 0,
    0, 0, 1, 2, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 2, 1, 0, 0,
    0, 0, 1, 4, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 4, 1, 0, 0,
    0, 0, 1, 2, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 2, 1, 0, 0,
    0, 0, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 0, 0,
    0, 0, 1, 2, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 2, 1, 0, 0,
    0, 0, 1, 2, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 2, 1, 0, 0,
    0, 0, 1, 2, 2, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 2, 2, 1, 0, 0,
    0, 0, 1, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 0, 1, 1, 0, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 1, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 1, 1, 1, 1, 0, 1, 1, 0, 1, 1, 1, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 1, 0, 1, 1, 1, 3, 3, 1, 1, 1, 0, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 1, 1, 1, 1, 1, 1, 2, 1, 1, 0, 1, 3, 3, 3, 3, 3, 3, 1, 0, 1, 1, 2, 1, 1, 1, 1, 1, 1, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 1, 3, 3, 3, 3, 3, 3, 1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 1, 1, 1, 1, 1, 1, 2, 1, 1, 0, 1, 3, 3, 3, 3, 3, 3, 1, 0, 1, 1, 2, 1, 1, 1, 1, 1, 1, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 1, 1, 1, 1, 1, 1, 2, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 2, 1, 1, 1, 1, 1, 1, 0, 0,
    0, 0, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 0, 0,
    0, 0, 1, 2, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 2, 1, 0, 0,
    0, 0, 1, 2, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 2, 1, 0, 0,
    0, 0, 1, 4, 2, 2, 1, 1, 2, 2, 2, 2, 2, 2, 2, 0, 0, 2, 2, 2, 2, 2, 2, 2, 1, 1, 2, 2, 4, 1, 0, 0,
    0, 0, 1, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 1, 0, 0,
    0, 0, 1, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 1, 0, 0,
    0, 0, 1, 2, 2, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 1, 1, 2, 2, 2, 2, 2, 2, 1, 0, 0,
    0, 0, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 0, 0,
    0, 0, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 0, 0,
    0, 0, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 0, 0,
    0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

impl LevelData {
    pub fn standard() -> Self {
        Self::from_codes(LEVEL_WIDTH, LEVEL_HEIGHT, &LEVEL_ONE, Spawns::standard())
    }

    /// Builds a level from layout codes, row-major.
    pub fn from_codes(width: usize, height: usize, codes: &[u8], spawns: Spawns) -> Self {
        let mut terrain = vec![Tile::Open; width * height];
        let mut pellets = Vec::new();
        for (i, &code) in codes.iter().take(width * height).enumerate() {
            let pos = Point::new((i % width) as i32, (i / width) as i32);
            match code {
                1 => terrain[i] = Tile::Wall,
                3 => terrain[i] = Tile::GhostHome,
                2 => pellets.push(Pellet {
                    pos,
                    kind: PelletKind::Normal,
                    active: true,
                }),
                4 => pellets.push(Pellet {
                    pos,
                    kind: PelletKind::Power,
                    active: true,
                }),
                _ => {}
            }
        }
        Self {
            width,
            height,
            terrain,
            pellets,
            spawns,
        }
    }

    /// Builds a level from text rows: `#` wall, `H` home, `o` pellet,
    /// `O` power pellet, anything else open.
    pub fn from_rows(rows: &[&str], spawns: Spawns) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut codes = vec![0u8; width * height];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                codes[y * width + x] = match ch {
                    '#' => 1,
                    'o' => 2,
                    'H' => 3,
                    'O' => 4,
                    _ => 0,
                };
            }
        }
        Self::from_codes(width, height, &codes, spawns)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Anything off the board counts as wall.
    pub fn tile(&self, pos: Point) -> Tile {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.height
        {
            return Tile::Wall;
        }
        self.terrain[pos.y as usize * self.width + pos.x as usize]
    }

    pub fn blocks_player(&self, pos: Point) -> bool {
        matches!(self.tile(pos), Tile::Wall | Tile::GhostHome)
    }

    pub fn is_no_up_cell(&self, pos: Point) -> bool {
        self.spawns.no_up_cells.contains(&pos)
    }

    /// Re-enters the board on the far side of the tunnel.
    pub fn wrap(&self, pos: Point) -> Point {
        let (min_x, max_x) = self.spawns.tunnel;
        if pos.x > max_x {
            Point::new(min_x, pos.y)
        } else if pos.x < min_x {
            Point::new(max_x, pos.y)
        } else {
            pos
        }
    }

    /// A full set of pellets as laid out.
    pub fn fresh_pellets(&self) -> Vec<Pellet> {
        self.pellets.clone()
    }

    pub fn cells(&self) -> impl Iterator<Item = (Point, Tile)> + '_ {
        self.terrain.iter().enumerate().map(move |(i, &tile)| {
            (
                Point::new((i % self.width) as i32, (i / self.width) as i32),
                tile,
            )
        })
    }
}
