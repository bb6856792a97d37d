//! Randomized triangle approximation.
//!
//! Starting from a white canvas, each iteration:
//!
//! 1. picks a random seed pixel from the injected RNG,
//! 2. measures the color gradient one step away in each cardinal direction
//!    (directions that would leave the buffer get `SENTINEL_GRADIENT`),
//! 3. keeps the two flattest directions (search order up, right, down, left;
//!    the first minimum found wins; after an up winner the second search
//!    tries down first),
//! 4. walks outward along each until the color drifts past the current
//!    strength or the walk reaches the one-pixel margin, giving two vertices,
//! 5. paints a straight segment (opposite directions) or a porous right
//!    triangle (adjacent directions) in the seed's exact color.
//!
//! Strength shrinks with the iteration count (`StrengthSchedule`), so early
//! strokes are broad and later ones refine detail. The caller observes the
//! canvas after every iteration and may cancel between iterations; a cancelled
//! run leaves the canvas exactly as far as it got.

use rand::Rng;

use crate::cancel::CancelToken;
use crate::color::{color_distance, is_close, StrengthSchedule, SENTINEL_GRADIENT};
use crate::frame::{Pixel, RasterBuffer};

/// Iterations in a full approximation run.
pub const DEFAULT_ITERATIONS: u32 = 10_000;

// ----------------------------------------------------------------------------
// Geometry
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Tie-break order for gradient selection.
    pub const SEARCH_ORDER: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}

/// A (row, column) coordinate inside a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrianglePoint {
    pub row: usize,
    pub col: usize,
}

impl TrianglePoint {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Clamp signed coordinates into `[0, width) x [0, height)`.
    pub fn clamped(row: i64, col: i64, width: usize, height: usize) -> Self {
        Self {
            row: row.clamp(0, height as i64 - 1) as usize,
            col: col.clamp(0, width as i64 - 1) as usize,
        }
    }

    /// Neighbor one step toward `direction`, if the moving coordinate stays
    /// inside the walk margin (one pixel in from the edge). The fixed
    /// coordinate is the seed's and may sit on the border.
    fn step_within_margin(self, direction: Direction, width: usize, height: usize) -> Option<Self> {
        let inside = |v: usize, len: usize| v >= 1 && v + 2 <= len;
        let next = match direction {
            Direction::Up => Self::new(self.row.checked_sub(1)?, self.col),
            Direction::Down => Self::new(self.row + 1, self.col),
            Direction::Left => Self::new(self.row, self.col.checked_sub(1)?),
            Direction::Right => Self::new(self.row, self.col + 1),
        };
        let fits = if direction.is_vertical() {
            inside(next.row, height)
        } else {
            inside(next.col, width)
        };
        fits.then_some(next)
    }
}

/// Gradients indexed by `Direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradients([f64; 4]);

impl Gradients {
    pub fn new(up: f64, right: f64, down: f64, left: f64) -> Self {
        Self([up, right, down, left])
    }

    pub fn get(&self, direction: Direction) -> f64 {
        self.0[direction.index()]
    }

    /// Gradients around `seed`. A direction is unusable (sentinel) when its
    /// bounds check fails: up needs `row >= 2`, left needs `col >= 2`, down
    /// needs `row + 2 <= height`, right needs `col + 2 <= width`.
    pub fn around(source: &RasterBuffer, seed: TrianglePoint) -> Self {
        let color = source.get(seed.row, seed.col);
        let (width, height) = (source.width(), source.height());
        let measure = |usable: bool, row: usize, col: usize| {
            if usable {
                color_distance(color, source.get(row, col))
            } else {
                SENTINEL_GRADIENT
            }
        };
        let (row, col) = (seed.row, seed.col);
        Self([
            measure(row >= 2, row.wrapping_sub(1), col),
            measure(col + 2 <= width, row, col + 1),
            measure(row + 2 <= height, row + 1, col),
            measure(col >= 2, row, col.wrapping_sub(1)),
        ])
    }

    /// Smallest and second-smallest directions.
    ///
    /// The smallest is the first minimum in `Direction::SEARCH_ORDER`. The
    /// second searches the remaining three in the same order, except after an
    /// `Up` winner, where the order is down, right, left. A flat neighborhood
    /// therefore yields a vertical segment.
    pub fn two_smallest(&self) -> (Direction, Direction) {
        let smallest = self.first_minimum(Direction::SEARCH_ORDER);
        let second = match smallest {
            Direction::Up => {
                self.first_minimum([Direction::Down, Direction::Right, Direction::Left])
            }
            winner => self.first_minimum(
                Direction::SEARCH_ORDER
                    .into_iter()
                    .filter(|direction| *direction != winner),
            ),
        };
        (smallest, second)
    }

    fn first_minimum(&self, order: impl IntoIterator<Item = Direction>) -> Direction {
        let mut best: Option<Direction> = None;
        for direction in order {
            match best {
                Some(current) if self.get(direction) >= self.get(current) => {}
                _ => best = Some(direction),
            }
        }
        // Every search order passed in is non-empty.
        best.unwrap_or(Direction::Up)
    }
}

/// Walk from `seed` toward `direction` while pixels stay close to the seed
/// color. Returns the last pixel visited: the first one that failed the
/// closeness test, the last one inside the margin, or `seed` if no step fit.
pub fn walk(
    source: &RasterBuffer,
    seed: TrianglePoint,
    direction: Direction,
    strength: u32,
) -> TrianglePoint {
    let color = source.get(seed.row, seed.col);
    let (width, height) = (source.width(), source.height());
    let mut vertex = seed;
    let mut position = seed;
    while let Some(next) = position.step_within_margin(direction, width, height) {
        vertex = next;
        if !is_close(color, source.get(next.row, next.col), strength) {
            break;
        }
        position = next;
    }
    vertex
}

// ----------------------------------------------------------------------------
// Strokes
// ----------------------------------------------------------------------------

/// Shape painted by one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeShape {
    /// Opposite directions: a solid segment between the two vertices.
    Segment,
    /// Adjacent directions: a porous right triangle in the given quadrant.
    Triangle {
        vertical: Direction,
        horizontal: Direction,
    },
}

/// Record of one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stroke {
    pub seed: TrianglePoint,
    pub color: Pixel,
    pub strength: u32,
    pub directions: (Direction, Direction),
    pub vertices: (TrianglePoint, TrianglePoint),
    pub shape: StrokeShape,
    /// Pixels written by this stroke.
    pub painted: usize,
}

/// Paint the stroke seeded at `seed` with the given strength.
pub fn paint_stroke(
    source: &RasterBuffer,
    destination: &mut RasterBuffer,
    seed: TrianglePoint,
    strength: u32,
) -> Stroke {
    source.assert_same_dimensions(destination);
    let seed = TrianglePoint::clamped(
        seed.row as i64,
        seed.col as i64,
        source.width(),
        source.height(),
    );
    let color = source.get(seed.row, seed.col);
    let (first, second) = Gradients::around(source, seed).two_smallest();
    let first_vertex = walk(source, seed, first, strength);
    let second_vertex = walk(source, seed, second, strength);

    let (shape, painted) = if first == second.opposite() {
        let painted = paint_segment(destination, first_vertex, second_vertex, color);
        (StrokeShape::Segment, painted)
    } else {
        let ((vertical, v_vertex), (horizontal, h_vertex)) = if first.is_vertical() {
            ((first, first_vertex), (second, second_vertex))
        } else {
            ((second, second_vertex), (first, first_vertex))
        };
        let painted = paint_triangle(
            source,
            destination,
            seed,
            (vertical, v_vertex),
            (horizontal, h_vertex),
            strength,
        );
        (
            StrokeShape::Triangle {
                vertical,
                horizontal,
            },
            painted,
        )
    };

    Stroke {
        seed,
        color,
        strength,
        directions: (first, second),
        vertices: (first_vertex, second_vertex),
        shape,
        painted,
    }
}

/// Inclusive segment along the axis on which `a` and `b` differ.
fn paint_segment(
    destination: &mut RasterBuffer,
    a: TrianglePoint,
    b: TrianglePoint,
    color: Pixel,
) -> usize {
    let mut painted = 0;
    if a.col == b.col {
        for row in a.row.min(b.row)..=a.row.max(b.row) {
            destination.set(row, a.col, color);
            painted += 1;
        }
    } else {
        for col in a.col.min(b.col)..=a.col.max(b.col) {
            destination.set(a.row, col, color);
            painted += 1;
        }
    }
    painted
}

/// Scanline fill from the seed toward the vertical vertex.
///
/// Each scanline starts at the seed column and extends toward the horizontal
/// vertex; the extent shrinks by `vertical / horizontal` (integer division) per
/// scanline. Only pixels whose source color is close to the seed are painted,
/// so the fill is porous.
fn paint_triangle(
    source: &RasterBuffer,
    destination: &mut RasterBuffer,
    seed: TrianglePoint,
    (vertical, v_vertex): (Direction, TrianglePoint),
    (horizontal, h_vertex): (Direction, TrianglePoint),
    strength: u32,
) -> usize {
    let (width, height) = (source.width() as i64, source.height() as i64);
    let color = source.get(seed.row, seed.col);
    let vertical_extent = v_vertex.row.abs_diff(seed.row) as i64;
    let horizontal_extent = match h_vertex.col.abs_diff(seed.col) as i64 {
        0 => 1,
        extent => extent,
    };
    let shrink_per_line = vertical_extent / horizontal_extent;
    let row_step: i64 = if vertical == Direction::Up { -1 } else { 1 };
    let col_step: i64 = if horizontal == Direction::Left { -1 } else { 1 };

    let mut painted = 0;
    let mut line_extent = horizontal_extent;
    for line in 0..=vertical_extent {
        let row = seed.row as i64 + row_step * line;
        if row < 0 || row >= height {
            break;
        }
        for offset in 0..=line_extent {
            let col = seed.col as i64 + col_step * offset;
            if col < 0 || col >= width {
                break;
            }
            let (row, col) = (row as usize, col as usize);
            if is_close(color, source.get(row, col), strength) {
                destination.set(row, col, color);
                painted += 1;
            }
        }
        line_extent -= shrink_per_line;
    }
    painted
}

// ----------------------------------------------------------------------------
// Approximator
// ----------------------------------------------------------------------------

/// Result of an approximation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApproximationOutcome {
    /// Completed iterations.
    pub iterations: u32,
    pub cancelled: bool,
}

/// Randomized region-growing stylizer with an injected random source.
pub struct TriangleApproximator<R> {
    rng: R,
    schedule: StrengthSchedule,
    max_iterations: u32,
}

impl<R: Rng> TriangleApproximator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            schedule: StrengthSchedule::default(),
            max_iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn with_schedule(mut self, schedule: StrengthSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run one iteration: draw a seed from the RNG and paint its stroke.
    pub fn step(
        &mut self,
        source: &RasterBuffer,
        destination: &mut RasterBuffer,
        iteration: u32,
    ) -> Stroke {
        let row = self.rng.gen_range(0..source.height());
        let col = self.rng.gen_range(0..source.width());
        let strength = self.schedule.strength_for(iteration);
        paint_stroke(source, destination, TrianglePoint::new(row, col), strength)
    }

    /// Clear `destination` to white and iterate until `max_iterations` or until
    /// `cancel` is observed. `on_progress` sees the canvas after every
    /// iteration; cancellation is checked right after it.
    pub fn run(
        &mut self,
        source: &RasterBuffer,
        destination: &mut RasterBuffer,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(&RasterBuffer, u32),
    ) -> ApproximationOutcome {
        source.assert_same_dimensions(destination);
        destination.fill(Pixel::WHITE);

        let mut iterations = 0;
        let mut cancelled = false;
        while iterations < self.max_iterations {
            let stroke = self.step(source, destination, iterations);
            log::trace!(
                "approximate: iteration {} seed ({}, {}) {:?} painted {}",
                iterations,
                stroke.seed.row,
                stroke.seed.col,
                stroke.shape,
                stroke.painted
            );
            on_progress(destination, iterations);
            iterations += 1;
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
        }

        log::debug!(
            "approximate: finished after {} iterations (cancelled: {})",
            iterations,
            cancelled
        );
        ApproximationOutcome {
            iterations,
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray_canvas(width: usize, height: usize) -> RasterBuffer {
        RasterBuffer::new(width, height, Pixel::gray(120))
    }

    /// Gray 10x10 source with the pixels selected by `far` set to pure red.
    fn gray_except(far: impl Fn(usize, usize) -> bool) -> RasterBuffer {
        RasterBuffer::from_fn(10, 10, |r, c| {
            if far(r, c) {
                Pixel::from_rgb(255, 0, 0)
            } else {
                Pixel::gray(120)
            }
        })
    }

    fn assert_painted(canvas: &RasterBuffer, painted: impl Fn(usize, usize) -> bool) {
        for row in 0..canvas.height() {
            for col in 0..canvas.width() {
                let want = if painted(row, col) {
                    Pixel::gray(120)
                } else {
                    Pixel::WHITE
                };
                assert_eq!(canvas.get(row, col), want, "({row}, {col})");
            }
        }
    }

    #[test]
    fn tie_break_follows_search_order() {
        let all_equal = Gradients::new(3.0, 3.0, 3.0, 3.0);
        assert_eq!(all_equal.two_smallest(), (Direction::Up, Direction::Down));

        // After an up winner, down is searched before right.
        let up_then_down = Gradients::new(0.0, 5.0, 5.0, 9.0);
        assert_eq!(up_then_down.two_smallest(), (Direction::Up, Direction::Down));

        let up_then_right = Gradients::new(0.0, 5.0, 6.0, 5.0);
        assert_eq!(up_then_right.two_smallest(), (Direction::Up, Direction::Right));

        let right_down = Gradients::new(9.0, 1.0, 1.0, 9.0);
        assert_eq!(right_down.two_smallest(), (Direction::Right, Direction::Down));

        let right_then_up = Gradients::new(4.0, 1.0, 4.0, 4.0);
        assert_eq!(right_then_up.two_smallest(), (Direction::Right, Direction::Up));

        let left_then_up = Gradients::new(5.0, 7.0, 5.0, 2.0);
        assert_eq!(left_then_up.two_smallest(), (Direction::Left, Direction::Up));
    }

    #[test]
    fn uniform_source_draws_a_vertical_segment() {
        let source = gray_canvas(10, 10);
        let mut canvas = RasterBuffer::new(10, 10, Pixel::WHITE);
        let stroke = paint_stroke(&source, &mut canvas, TrianglePoint::new(5, 5), 90);

        assert_eq!(stroke.directions, (Direction::Up, Direction::Down));
        assert_eq!(stroke.shape, StrokeShape::Segment);
        assert_eq!(stroke.vertices, (TrianglePoint::new(1, 5), TrianglePoint::new(8, 5)));
        assert_eq!(stroke.painted, 8);
        assert_painted(&canvas, |r, c| c == 5 && (1..=8).contains(&r));
    }

    #[test]
    fn sentinel_marks_unusable_directions() {
        let source = gray_canvas(6, 6);
        let corner = Gradients::around(&source, TrianglePoint::new(0, 0));
        assert_eq!(corner.get(Direction::Up), SENTINEL_GRADIENT);
        assert_eq!(corner.get(Direction::Left), SENTINEL_GRADIENT);
        assert_eq!(corner.get(Direction::Down), 0.0);
        assert_eq!(corner.get(Direction::Right), 0.0);

        let near_top = Gradients::around(&source, TrianglePoint::new(1, 4));
        assert_eq!(near_top.get(Direction::Up), SENTINEL_GRADIENT);
        assert_eq!(near_top.get(Direction::Right), 0.0);

        let bottom_right = Gradients::around(&source, TrianglePoint::new(5, 5));
        assert_eq!(bottom_right.get(Direction::Down), SENTINEL_GRADIENT);
        assert_eq!(bottom_right.get(Direction::Right), SENTINEL_GRADIENT);

        let inner = Gradients::around(&source, TrianglePoint::new(4, 4));
        assert_eq!(inner.get(Direction::Down), 0.0);
        assert_eq!(inner.get(Direction::Right), 0.0);
    }

    #[test]
    fn walk_stops_at_first_distant_pixel() {
        let source = RasterBuffer::from_fn(10, 3, |_, c| {
            if c >= 7 {
                Pixel::WHITE
            } else {
                Pixel::BLACK
            }
        });
        let seed = TrianglePoint::new(1, 2);
        assert_eq!(walk(&source, seed, Direction::Right, 90), TrianglePoint::new(1, 7));
        // Left walk runs to the margin (column 1).
        assert_eq!(walk(&source, seed, Direction::Left, 90), TrianglePoint::new(1, 1));
        // No room to move vertically in a 3-row buffer beyond row 1.
        assert_eq!(walk(&source, seed, Direction::Up, 90), seed);
    }

    #[test]
    fn quadrant_fill_shrinks_per_scanline() {
        // Row 6 is far, so down is unusable and up/right win.
        let source = gray_except(|r, _| r == 6);
        let mut canvas = RasterBuffer::new(10, 10, Pixel::WHITE);
        let stroke = paint_stroke(&source, &mut canvas, TrianglePoint::new(5, 5), 90);

        assert_eq!(stroke.directions, (Direction::Up, Direction::Right));
        assert_eq!(stroke.vertices, (TrianglePoint::new(1, 5), TrianglePoint::new(5, 8)));
        assert_eq!(
            stroke.shape,
            StrokeShape::Triangle {
                vertical: Direction::Up,
                horizontal: Direction::Right
            }
        );
        // vertical 4, horizontal 3 -> shrink 1 per line: widths 4, 3, 2, 1, 0
        let expected: Vec<(usize, usize)> = vec![
            (5, 5), (5, 6), (5, 7), (5, 8),
            (4, 5), (4, 6), (4, 7),
            (3, 5), (3, 6),
            (2, 5),
        ];
        assert_eq!(stroke.painted, expected.len());
        for row in 0..10 {
            for col in 0..10 {
                let want = if expected.contains(&(row, col)) {
                    Pixel::gray(120)
                } else {
                    Pixel::WHITE
                };
                assert_eq!(canvas.get(row, col), want, "({row}, {col})");
            }
        }
    }

    #[test]
    fn opposite_directions_draw_a_segment() {
        // Only column 5 is gray; everything else is far away in color.
        let source = RasterBuffer::from_fn(10, 10, |_, c| {
            if c == 5 {
                Pixel::gray(120)
            } else {
                Pixel::from_rgb(255, 0, 0)
            }
        });
        let mut canvas = RasterBuffer::new(10, 10, Pixel::WHITE);
        let stroke = paint_stroke(&source, &mut canvas, TrianglePoint::new(5, 5), 90);
        assert_eq!(stroke.shape, StrokeShape::Segment);
        assert_eq!(stroke.directions, (Direction::Up, Direction::Down));
        assert_eq!(stroke.painted, 8);
        for row in 0..10 {
            let want = if (1..=8).contains(&row) {
                Pixel::gray(120)
            } else {
                Pixel::WHITE
            };
            assert_eq!(canvas.get(row, 5), want, "row {row}");
        }
        assert_eq!(canvas.count(Pixel::WHITE), 100 - 8);
    }

    #[test]
    fn porous_fill_skips_distant_pixels() {
        let mut source = gray_except(|r, _| r == 6);
        source.set(4, 6, Pixel::BLACK);
        let mut canvas = RasterBuffer::new(10, 10, Pixel::WHITE);
        let stroke = paint_stroke(&source, &mut canvas, TrianglePoint::new(5, 5), 90);
        assert_eq!(canvas.get(4, 6), Pixel::WHITE);
        assert_eq!(canvas.get(4, 7), Pixel::gray(120));
        assert_eq!(stroke.painted, 9);
    }

    #[test]
    fn down_right_quadrant() {
        let source = gray_except(|r, _| r == 4);
        let mut canvas = RasterBuffer::new(10, 10, Pixel::WHITE);
        let stroke = paint_stroke(&source, &mut canvas, TrianglePoint::new(5, 5), 90);

        assert_eq!(stroke.directions, (Direction::Right, Direction::Down));
        assert_eq!(stroke.vertices, (TrianglePoint::new(5, 8), TrianglePoint::new(8, 5)));
        assert_eq!(
            stroke.shape,
            StrokeShape::Triangle {
                vertical: Direction::Down,
                horizontal: Direction::Right
            }
        );
        // vertical 3, horizontal 3 -> widths 4, 3, 2, 1
        assert_eq!(stroke.painted, 10);
        assert_painted(&canvas, |r, c| (5..=8).contains(&r) && c >= 5 && c <= 8 - (r - 5));
    }

    #[test]
    fn down_left_quadrant_without_shrink() {
        let source = gray_except(|r, c| r == 4 || c == 6);
        let mut canvas = RasterBuffer::new(10, 10, Pixel::WHITE);
        let stroke = paint_stroke(&source, &mut canvas, TrianglePoint::new(5, 5), 90);

        assert_eq!(stroke.directions, (Direction::Down, Direction::Left));
        assert_eq!(stroke.vertices, (TrianglePoint::new(8, 5), TrianglePoint::new(5, 1)));
        assert_eq!(
            stroke.shape,
            StrokeShape::Triangle {
                vertical: Direction::Down,
                horizontal: Direction::Left
            }
        );
        // vertical 3, horizontal 4 -> shrink 3 / 4 == 0, a full rectangle
        assert_eq!(stroke.painted, 20);
        assert_painted(&canvas, |r, c| (5..=8).contains(&r) && (1..=5).contains(&c));
    }

    #[test]
    fn up_left_quadrant() {
        let source = gray_except(|r, c| r == 6 || c == 6);
        let mut canvas = RasterBuffer::new(10, 10, Pixel::WHITE);
        let stroke = paint_stroke(&source, &mut canvas, TrianglePoint::new(5, 5), 90);

        assert_eq!(stroke.directions, (Direction::Up, Direction::Left));
        assert_eq!(stroke.vertices, (TrianglePoint::new(1, 5), TrianglePoint::new(5, 1)));
        assert_eq!(
            stroke.shape,
            StrokeShape::Triangle {
                vertical: Direction::Up,
                horizontal: Direction::Left
            }
        );
        // vertical 4, horizontal 4 -> widths 5, 4, 3, 2, 1
        assert_eq!(stroke.painted, 15);
        assert_painted(&canvas, |r, c| (1..=5).contains(&r) && c <= 5 && c >= 6 - r);
    }

    #[test]
    fn left_right_segment() {
        let source = gray_except(|r, _| r != 5);
        let mut canvas = RasterBuffer::new(10, 10, Pixel::WHITE);
        let stroke = paint_stroke(&source, &mut canvas, TrianglePoint::new(5, 5), 90);

        assert_eq!(stroke.directions, (Direction::Right, Direction::Left));
        assert_eq!(stroke.shape, StrokeShape::Segment);
        assert_eq!(stroke.vertices, (TrianglePoint::new(5, 8), TrianglePoint::new(5, 1)));
        assert_eq!(stroke.painted, 8);
        assert_painted(&canvas, |r, c| r == 5 && (1..=8).contains(&c));
    }

    #[test]
    fn zero_iterations_leave_white_canvas() {
        let source = gray_canvas(5, 5);
        let mut canvas = RasterBuffer::new(5, 5, Pixel::BLACK);
        let mut approximator =
            TriangleApproximator::new(StdRng::seed_from_u64(1)).with_max_iterations(0);
        let outcome = approximator.run(&source, &mut canvas, &CancelToken::new(), |_, _| {});
        assert_eq!(outcome.iterations, 0);
        assert_eq!(canvas.count(Pixel::WHITE), 25);
    }

    #[test]
    fn full_run_stops_at_ten_thousand() {
        let source = RasterBuffer::from_fn(8, 8, |r, c| Pixel::new((r * 30) as u8, (c * 30) as u8, 60));
        let mut canvas = source.clone();
        let mut calls = 0u32;
        let mut last_seen = None;
        let mut approximator = TriangleApproximator::new(StdRng::seed_from_u64(7));
        let outcome = approximator.run(&source, &mut canvas, &CancelToken::new(), |_, i| {
            calls += 1;
            last_seen = Some(i);
        });
        assert_eq!(outcome, ApproximationOutcome { iterations: DEFAULT_ITERATIONS, cancelled: false });
        assert_eq!(calls, DEFAULT_ITERATIONS);
        assert_eq!(last_seen, Some(DEFAULT_ITERATIONS - 1));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let source = RasterBuffer::from_fn(12, 9, |r, c| {
            Pixel::new((r * 25) as u8, (c * 20) as u8, ((r + c) * 10) as u8)
        });
        let record = |seed: u64| {
            let mut canvas = RasterBuffer::new(12, 9, Pixel::BLACK);
            let mut frames = Vec::new();
            TriangleApproximator::new(StdRng::seed_from_u64(seed))
                .with_max_iterations(300)
                .run(&source, &mut canvas, &CancelToken::new(), |buffer, _| {
                    frames.push(buffer.clone())
                });
            frames
        };
        let first = record(42);
        assert_eq!(first.len(), 300);
        assert_eq!(first, record(42));
        assert_ne!(first, record(43));
    }

    #[test]
    fn cancellation_keeps_partial_canvas() {
        let source = RasterBuffer::from_fn(16, 16, |r, c| Pixel::new((r * 16) as u8, (c * 16) as u8, 0));
        let mut canvas = RasterBuffer::new(16, 16, Pixel::BLACK);
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let mut snapshot = None;
        let outcome = TriangleApproximator::new(StdRng::seed_from_u64(3)).run(
            &source,
            &mut canvas,
            &cancel,
            |buffer, i| {
                if i == 41 {
                    trigger.cancel();
                    snapshot = Some(buffer.clone());
                }
            },
        );
        assert_eq!(outcome, ApproximationOutcome { iterations: 42, cancelled: true });
        assert_eq!(Some(canvas), snapshot);
    }

    #[test]
    fn degenerate_buffers_stay_in_bounds() {
        for (width, height) in [(1, 1), (1, 7), (7, 1), (2, 2), (3, 2), (2, 3)] {
            let source = RasterBuffer::from_fn(width, height, |r, c| {
                Pixel::new((r * 40) as u8, (c * 40) as u8, 200)
            });
            let mut canvas = RasterBuffer::new(width, height, Pixel::BLACK);
            let outcome = TriangleApproximator::new(StdRng::seed_from_u64(width as u64 * 31 + height as u64))
                .with_max_iterations(500)
                .run(&source, &mut canvas, &CancelToken::new(), |_, _| {});
            assert_eq!(outcome.iterations, 500, "{width}x{height}");
        }
    }

    #[test]
    fn vertices_always_inside_buffer() {
        let source = RasterBuffer::from_fn(9, 7, |r, c| Pixel::new((r * 35) as u8, (c * 27) as u8, 90));
        let mut canvas = RasterBuffer::new(9, 7, Pixel::WHITE);
        let mut approximator = TriangleApproximator::new(StdRng::seed_from_u64(11));
        for iteration in 0..2_000 {
            let stroke = approximator.step(&source, &mut canvas, iteration);
            for v in [stroke.vertices.0, stroke.vertices.1, stroke.seed] {
                assert!(v.row < 7 && v.col < 9, "{:?}", v);
            }
        }
    }

    #[test]
    fn uniform_source_paints_only_its_color() {
        let source = gray_canvas(12, 12);
        let mut canvas = RasterBuffer::new(12, 12, Pixel::BLACK);
        TriangleApproximator::new(StdRng::seed_from_u64(5))
            .with_max_iterations(200)
            .run(&source, &mut canvas, &CancelToken::new(), |_, _| {});
        assert!(canvas
            .pixels()
            .iter()
            .all(|p| *p == Pixel::WHITE || *p == Pixel::gray(120)));
        assert!(canvas.count(Pixel::gray(120)) > 0);
    }

    #[test]
    fn clamped_points_stay_inside() {
        assert_eq!(TrianglePoint::clamped(-3, 20, 10, 5), TrianglePoint::new(0, 9));
        assert_eq!(TrianglePoint::clamped(7, 4, 10, 5), TrianglePoint::new(4, 4));
    }
}
