//! Procedural level generation
//!
//! A level layout is a boolean grid produced by one of ten named pattern
//! strategies. Generation is completely deterministic: the same
//! (pattern, columns, level) triple always yields a bit-identical grid.
//! Even the "chaos" pattern is a trigonometric threshold of (row, col,
//! level), not an RNG - reruns of a level must reproduce the exact layout
//! and per-block scratch seeds.

use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::Viewport;

/// Named pattern strategies, one per level of the stock table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternId {
    Simple,
    Rows,
    Checkerboard,
    Diamond,
    Cross,
    Spiral,
    Fortress,
    Maze,
    Pyramid,
    Chaos,
}

/// A pure cell-population rule: `(grid, level) -> ()`
pub type PatternFn = fn(&mut Grid, u32);

impl PatternId {
    /// Resolve the pattern to its generator function. Adding a pattern
    /// means adding a variant and an entry here; no central dispatch to
    /// edit elsewhere.
    pub fn generator(self) -> PatternFn {
        match self {
            PatternId::Simple => fill_simple,
            PatternId::Rows => fill_rows,
            PatternId::Checkerboard => fill_checkerboard,
            PatternId::Diamond => fill_diamond,
            PatternId::Cross => fill_cross,
            PatternId::Spiral => fill_spiral,
            PatternId::Fortress => fill_fortress,
            PatternId::Maze => fill_maze,
            PatternId::Pyramid => fill_pyramid,
            PatternId::Chaos => fill_chaos,
        }
    }
}

/// Dense row-major boolean grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> bool {
        self.cells[r * self.cols + c]
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, v: bool) {
        self.cells[r * self.cols + c] = v;
    }

    /// Number of populated cells
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Rows for a given level: starts at 4, grows every other level, caps at 8.
pub fn rows_for_level(level: u32) -> usize {
    (4 + level as usize / 2).min(8)
}

/// Produce the obstacle layout for `(pattern, cols, level)`.
///
/// Pure function: bit-identical output for identical arguments.
pub fn generate_pattern(pattern: PatternId, cols: usize, level: u32) -> Grid {
    let mut grid = Grid::new(rows_for_level(level), cols);
    pattern.generator()(&mut grid, level);
    grid
}

fn fill_simple(g: &mut Grid, _level: u32) {
    for r in 0..3.min(g.rows()) {
        for c in 2..g.cols().saturating_sub(2) {
            g.set(r, c, true);
        }
    }
}

fn fill_rows(g: &mut Grid, _level: u32) {
    for r in 0..4.min(g.rows()) {
        for c in 1..g.cols().saturating_sub(1) {
            if r % 2 == 0 || c % 2 == 1 {
                g.set(r, c, true);
            }
        }
    }
}

fn fill_checkerboard(g: &mut Grid, _level: u32) {
    for r in 0..5.min(g.rows()) {
        for c in 0..g.cols() {
            if (r + c) % 2 == 0 {
                g.set(r, c, true);
            }
        }
    }
}

fn fill_diamond(g: &mut Grid, _level: u32) {
    let center_r = g.rows() as i32 / 2;
    let center_c = g.cols() as i32 / 2;
    for r in 0..g.rows() {
        for c in 0..g.cols() {
            let dist = (r as i32 - center_r).abs() + (c as i32 - center_c).abs();
            if (1..=3).contains(&dist) {
                g.set(r, c, true);
            }
        }
    }
}

fn fill_cross(g: &mut Grid, _level: u32) {
    let mid_r = g.rows() as i32 / 2;
    let mid_c = g.cols() as i32 / 2;
    for r in 0..g.rows() {
        for c in 0..g.cols() {
            let dr = r as i32 - mid_r;
            let dc = c as i32 - mid_c;
            if dr == 0 || dc == 0 || dr.abs() == dc.abs() {
                g.set(r, c, true);
            }
        }
    }
}

fn fill_spiral(g: &mut Grid, _level: u32) {
    let (rows, cols) = (g.rows() as i32, g.cols() as i32);
    let (mut x, mut y) = (0i32, 0i32);
    let (mut dx, mut dy) = (1i32, 0i32);
    let steps = ((rows * cols + 1) / 2).min(30);
    for _ in 0..steps {
        if x >= 0 && x < cols && y >= 0 && y < rows {
            g.set(y as usize, x as usize, true);
        }
        let (nx, ny) = (x + dx, y + dy);
        let blocked = nx < 0
            || nx >= cols
            || ny < 0
            || ny >= rows
            || g.get(ny as usize, nx as usize);
        if blocked {
            // Turn right
            let t = dx;
            dx = -dy;
            dy = t;
        }
        x += dx;
        y += dy;
    }
}

fn fill_fortress(g: &mut Grid, _level: u32) {
    let (rows, cols) = (g.rows(), g.cols());
    if cols == 0 {
        return;
    }
    for c in 0..cols {
        g.set(0, c, true);
        if rows > 3 {
            g.set(3, c, true);
        }
    }
    for r in 1..4.min(rows) {
        g.set(r, 0, true);
        g.set(r, cols - 1, true);
        if cols > 4 {
            g.set(r, 2, true);
            g.set(r, cols - 3, true);
        }
    }
}

fn fill_maze(g: &mut Grid, _level: u32) {
    for r in 0..g.rows() {
        for c in 0..g.cols() {
            if (r % 2 == 0 && c % 3 != 1) || (c % 2 == 0 && r % 3 != 1) {
                g.set(r, c, true);
            }
        }
    }
}

fn fill_pyramid(g: &mut Grid, _level: u32) {
    let cols = g.cols();
    for r in 0..6.min(g.rows()) {
        let width = cols.min(2 * r + 3);
        let start = (cols - width) / 2;
        for c in start..start + width {
            g.set(r, c, true);
        }
    }
}

fn fill_chaos(g: &mut Grid, level: u32) {
    for r in 0..g.rows() {
        for c in 0..g.cols() {
            let (rf, cf) = (r as f32, c as f32);
            let noise =
                (rf * 0.7 + cf * 0.5 + level as f32).sin() * (cf * 0.3 + rf * 0.8).cos();
            if noise > -0.3 {
                g.set(r, c, true);
            }
        }
    }
}

/// Per-level tuning record
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelConfig {
    pub pattern: PatternId,
    /// Uniform hit points for every block in the level
    pub hp: u32,
    /// Multiplier on the base ball speed
    pub ball_speed: f32,
    /// Probability of a meteor burst per ball-block hit
    pub meteor_chance: f32,
}

/// Ten levels of progressive difficulty. Level indices beyond the table
/// reuse the last record.
pub const LEVEL_CONFIGS: [LevelConfig; 10] = [
    LevelConfig { pattern: PatternId::Simple, hp: 1, ball_speed: 1.0, meteor_chance: 0.15 },
    LevelConfig { pattern: PatternId::Rows, hp: 2, ball_speed: 1.1, meteor_chance: 0.18 },
    LevelConfig { pattern: PatternId::Checkerboard, hp: 2, ball_speed: 1.2, meteor_chance: 0.20 },
    LevelConfig { pattern: PatternId::Diamond, hp: 3, ball_speed: 1.3, meteor_chance: 0.22 },
    LevelConfig { pattern: PatternId::Cross, hp: 3, ball_speed: 1.4, meteor_chance: 0.25 },
    LevelConfig { pattern: PatternId::Spiral, hp: 4, ball_speed: 1.5, meteor_chance: 0.28 },
    LevelConfig { pattern: PatternId::Fortress, hp: 4, ball_speed: 1.6, meteor_chance: 0.30 },
    LevelConfig { pattern: PatternId::Maze, hp: 5, ball_speed: 1.7, meteor_chance: 0.32 },
    LevelConfig { pattern: PatternId::Pyramid, hp: 5, ball_speed: 1.8, meteor_chance: 0.35 },
    LevelConfig { pattern: PatternId::Chaos, hp: 6, ball_speed: 2.0, meteor_chance: 0.40 },
];

/// Look up the config for a 1-based level index, clamped to the table.
pub fn config_for_level(level: u32) -> &'static LevelConfig {
    let idx = (level.saturating_sub(1) as usize).min(LEVEL_CONFIGS.len() - 1);
    &LEVEL_CONFIGS[idx]
}

/// Viewport-derived block grid geometry
#[derive(Debug, Clone, Copy)]
pub struct BlockLayout {
    pub cols: usize,
    /// Cell pitch (block + gap)
    pub cell: f32,
    pub gap: f32,
    pub x0: f32,
    pub y0: f32,
}

impl BlockLayout {
    /// Desktop gets a fixed 12-column grid for consistent gameplay; narrow
    /// viewports get a responsive count from a 50px minimum cell width.
    pub fn for_viewport(vp: &Viewport) -> Self {
        let (cols, gap) = if vp.is_desktop() {
            (12, 3.0)
        } else {
            let max_cols = (vp.width / 50.0).floor() as usize;
            (max_cols.clamp(1, 8), 4.0)
        };
        let cell = ((vp.width - 40.0) / cols as f32).floor();
        Self {
            cols,
            cell,
            gap,
            x0: 20.0,
            y0: 70.0,
        }
    }

    /// Side length of the square block inside a cell
    #[inline]
    pub fn block_size(&self) -> f32 {
        self.cell - self.gap
    }

    /// Rect for the block at grid position (row, col)
    pub fn rect_for(&self, row: usize, col: usize) -> Rect {
        let size = self.block_size();
        Rect::new(
            self.x0 + col as f32 * self.cell + self.gap / 2.0,
            self.y0 + row as f32 * self.cell + self.gap / 2.0,
            size,
            size,
        )
    }
}

/// Deterministic per-block damage-decoration seed.
///
/// Derived from position and level only, so rerunning the same level
/// reproduces identical scratch layouts.
pub fn scratch_seed(x: f32, y: f32, level: u32) -> u32 {
    ((x + y + level as f32 * 131.0).floor() as i64).rem_euclid(2_147_483_647) as u32
}
