//! Barnes-Hut quadtree for many-body charge.
//!
//! The canvas region covering all bubbles is recursively split into four
//! square quadrants. Each cell stores the total charge of its subtree and
//! the |charge|-weighted centroid, so a distant cell can stand in for all
//! the bubbles inside it. Cells live in a flat arena and refer to their
//! children by index.
//!
//! Bubbles at identical coordinates share a leaf; so do bubbles still
//! unseparated at [`MAX_DEPTH`].

use rand::RngCore;

use super::forces::jiggle;
use crate::chart::Bubble;

/// Deepest level a cell may be split to.
const MAX_DEPTH: usize = 48;

/// Distance parameters for charge evaluation, all squared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ChargeParams {
    pub theta2: f64,
    pub distance_min2: f64,
    pub distance_max2: f64,
}

#[derive(Debug)]
enum CellKind {
    /// Indices of the bubbles stored here. Empty only for a fresh root.
    Leaf(Vec<usize>),
    /// Child cells in quadrant order: top-left, top-right, bottom-left, bottom-right.
    Internal([Option<usize>; 4]),
}

enum Insert {
    Descend(usize),
    AddChild,
    Split(Vec<usize>, usize),
}

#[derive(Debug)]
struct Cell {
    x0: f64,
    y0: f64,
    size: f64,
    kind: CellKind,
    charge: f64,
    cx: f64,
    cy: f64,
}

impl Cell {
    fn new(x0: f64, y0: f64, size: f64, kind: CellKind) -> Self {
        Self {
            x0,
            y0,
            size,
            kind,
            charge: 0.0,
            cx: 0.0,
            cy: 0.0,
        }
    }

    fn quadrant(&self, x: f64, y: f64) -> usize {
        let half = self.size / 2.0;
        let right = x >= self.x0 + half;
        let bottom = y >= self.y0 + half;
        (usize::from(bottom) << 1) | usize::from(right)
    }

    fn child_origin(&self, quadrant: usize) -> (f64, f64) {
        let half = self.size / 2.0;
        let x0 = if quadrant & 1 == 1 { self.x0 + half } else { self.x0 };
        let y0 = if quadrant & 2 == 2 { self.y0 + half } else { self.y0 };
        (x0, y0)
    }
}

/// Quadtree over one tick's bubble positions.
#[derive(Debug)]
pub(crate) struct QuadTree {
    cells: Vec<Cell>,
}

impl QuadTree {
    /// Build a tree over `bubbles`, with `charges[i]` the charge of bubble `i`.
    pub fn build(bubbles: &[Bubble], charges: &[f64]) -> Self {
        let mut tree = Self { cells: Vec::new() };
        if bubbles.is_empty() {
            return tree;
        }

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for bubble in bubbles {
            let (x, y) = bubble.position();
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let mut size = (max_x - min_x).max(max_y - min_y);
        if !(size > 0.0) {
            size = 1.0;
        }

        tree.cells
            .push(Cell::new(min_x, min_y, size, CellKind::Leaf(Vec::new())));
        for i in 0..bubbles.len() {
            tree.insert(i, bubbles);
        }
        tree.accumulate(0, bubbles, charges);
        tree
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn insert(&mut self, index: usize, bubbles: &[Bubble]) {
        let (x, y) = bubbles[index].position();
        let mut cell = 0;
        let mut depth = 0;

        loop {
            let quadrant = self.cells[cell].quadrant(x, y);
            let next = match &mut self.cells[cell].kind {
                CellKind::Internal(children) => match children[quadrant] {
                    Some(child) => Insert::Descend(child),
                    None => Insert::AddChild,
                },
                CellKind::Leaf(points) => {
                    let Some(first) = points.first().copied() else {
                        points.push(index);
                        return;
                    };
                    if bubbles[first].position() == (x, y) || depth >= MAX_DEPTH {
                        points.push(index);
                        return;
                    }
                    Insert::Split(std::mem::take(points), first)
                }
            };

            match next {
                Insert::Descend(child) => {
                    cell = child;
                    depth += 1;
                }
                Insert::AddChild => {
                    self.add_child(cell, quadrant, vec![index]);
                    return;
                }
                Insert::Split(existing, first) => {
                    // The existing (coincident) points move down together.
                    self.cells[cell].kind = CellKind::Internal([None; 4]);
                    let (fx, fy) = bubbles[first].position();
                    let first_quadrant = self.cells[cell].quadrant(fx, fy);
                    self.add_child(cell, first_quadrant, existing);
                }
            }
        }
    }

    fn add_child(&mut self, parent: usize, quadrant: usize, points: Vec<usize>) {
        let (x0, y0) = self.cells[parent].child_origin(quadrant);
        let size = self.cells[parent].size / 2.0;
        let child = self.cells.len();
        self.cells
            .push(Cell::new(x0, y0, size, CellKind::Leaf(points)));
        if let CellKind::Internal(children) = &mut self.cells[parent].kind {
            children[quadrant] = Some(child);
        }
    }

    /// Compute total charge and weighted centroid bottom-up.
    fn accumulate(&mut self, cell: usize, bubbles: &[Bubble], charges: &[f64]) {
        let (charge, cx, cy) = match &self.cells[cell].kind {
            CellKind::Leaf(points) => {
                let charge: f64 = points.iter().map(|&p| charges[p]).sum();
                let (cx, cy) = points
                    .first()
                    .map(|&p| bubbles[p].position())
                    .unwrap_or((self.cells[cell].x0, self.cells[cell].y0));
                (charge, cx, cy)
            }
            CellKind::Internal(children) => {
                let children = *children;
                let (mut charge, mut weight, mut sx, mut sy) = (0.0, 0.0, 0.0, 0.0);
                for child in children.into_iter().flatten() {
                    self.accumulate(child, bubbles, charges);
                    let c = &self.cells[child];
                    let w = c.charge.abs();
                    if w != 0.0 {
                        charge += c.charge;
                        weight += w;
                        sx += w * c.cx;
                        sy += w * c.cy;
                    }
                }
                if weight > 0.0 {
                    (charge, sx / weight, sy / weight)
                } else {
                    let cell = &self.cells[cell];
                    let half = cell.size / 2.0;
                    (charge, cell.x0 + half, cell.y0 + half)
                }
            }
        };

        let cell = &mut self.cells[cell];
        cell.charge = charge;
        cell.cx = cx;
        cell.cy = cy;
    }

    /// Velocity change on bubble `index` from every other bubble.
    ///
    /// `stack` is traversal scratch space; it is cleared on entry so one
    /// buffer can serve every bubble of a tick.
    #[allow(clippy::too_many_arguments)]
    pub fn force_on(
        &self,
        index: usize,
        bubbles: &[Bubble],
        charges: &[f64],
        params: &ChargeParams,
        alpha: f64,
        stack: &mut Vec<usize>,
        rng: &mut dyn RngCore,
    ) -> (f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0);
        }

        let (xi, yi) = bubbles[index].position();
        let (mut vx, mut vy) = (0.0, 0.0);
        stack.clear();
        stack.push(0);

        while let Some(cell_index) = stack.pop() {
            let cell = &self.cells[cell_index];
            if cell.charge == 0.0 {
                continue;
            }

            let mut dx = cell.cx - xi;
            let mut dy = cell.cy - yi;
            let mut l = dx * dx + dy * dy;

            // Far enough: treat the whole cell as one charge.
            if cell.size * cell.size / params.theta2 < l {
                if l < params.distance_max2 {
                    (dx, dy, l) = separate(dx, dy, l, params, rng);
                    vx += dx * cell.charge * alpha / l;
                    vy += dy * cell.charge * alpha / l;
                }
                continue;
            }

            match &cell.kind {
                CellKind::Internal(children) => {
                    stack.extend(children.iter().rev().flatten());
                }
                CellKind::Leaf(points) => {
                    if l >= params.distance_max2 {
                        continue;
                    }
                    if points.len() > 1 || points[0] != index {
                        (dx, dy, l) = separate(dx, dy, l, params, rng);
                    }
                    for &p in points {
                        if p != index {
                            let w = charges[p] * alpha / l;
                            vx += dx * w;
                            vy += dy * w;
                        }
                    }
                }
            }
        }

        (vx, vy)
    }
}

/// Jiggle zero offsets and clamp the squared distance to `distance_min2`.
fn separate(
    mut dx: f64,
    mut dy: f64,
    mut l: f64,
    params: &ChargeParams,
    rng: &mut dyn RngCore,
) -> (f64, f64, f64) {
    if dx == 0.0 {
        dx = jiggle(rng);
        l += dx * dx;
    }
    if dy == 0.0 {
        dy = jiggle(rng);
        l += dy * dy;
    }
    if l < params.distance_min2 {
        l = (params.distance_min2 * l).sqrt();
    }
    (dx, dy, l)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn params() -> ChargeParams {
        ChargeParams {
            theta2: 0.81,
            distance_min2: 1.0,
            distance_max2: f64::INFINITY,
        }
    }

    fn bubbles(points: &[(f64, f64)]) -> Vec<Bubble> {
        points
            .iter()
            .map(|&(x, y)| Bubble::new(1.0, 1.0, "a", x, y))
            .collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree = QuadTree::build(&[], &[]);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_root_accumulates_total_charge() {
        let bubbles = bubbles(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)]);
        let charges = [-1.0, -2.0, -3.0, -4.0];
        let tree = QuadTree::build(&bubbles, &charges);

        let root = &tree.cells[0];
        assert_eq!(root.charge, -10.0);
        // |charge|-weighted centroid: x = (2 + 4) * 10 / 10, y = (3 + 4) * 10 / 10
        assert!((root.cx - 6.0).abs() < 1e-12);
        assert!((root.cy - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_every_bubble_lands_in_one_leaf() {
        let bubbles = bubbles(&[(0.0, 0.0), (1.0, 1.0), (1.0, 1.0), (7.5, 3.25), (2.0, 9.0)]);
        let tree = QuadTree::build(&bubbles, &[-1.0; 5]);

        let mut seen: Vec<usize> = tree
            .cells
            .iter()
            .filter_map(|c| match &c.kind {
                CellKind::Leaf(points) => Some(points.clone()),
                CellKind::Internal(_) => None,
            })
            .flatten()
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_coincident_bubbles_share_leaf() {
        let bubbles = bubbles(&[(3.0, 3.0), (3.0, 3.0), (3.0, 3.0)]);
        let tree = QuadTree::build(&bubbles, &[-1.0; 3]);
        assert_eq!(tree.cells.len(), 1);
        assert!(matches!(&tree.cells[0].kind, CellKind::Leaf(p) if p.len() == 3));
    }

    #[test]
    fn test_self_exerts_no_force() {
        let bubbles = bubbles(&[(4.0, 4.0)]);
        let tree = QuadTree::build(&bubbles, &[-5.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(
            tree.force_on(0, &bubbles, &[-5.0], &params(), 1.0, &mut Vec::new(), &mut rng),
            (0.0, 0.0)
        );
    }

    #[test]
    fn test_distance_min_caps_close_range() {
        let bubbles = bubbles(&[(0.0, 0.0), (0.5, 0.5)]);
        let charges = [-1.0, -1.0];
        let tree = QuadTree::build(&bubbles, &charges);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let (vx, vy) =
            tree.force_on(0, &bubbles, &charges, &params(), 1.0, &mut Vec::new(), &mut rng);

        // l = 0.5 < 1 becomes sqrt(0.5); v = 0.5 * -1 / sqrt(0.5)
        let expected = -0.5 / 0.5f64.sqrt();
        assert!((vx - expected).abs() < 1e-12);
        assert!((vy - expected).abs() < 1e-12);
    }

    #[test]
    fn test_shared_stack_matches_fresh_stack() {
        let bubbles = bubbles(&[(0.0, 0.0), (8.0, 1.0), (3.0, 9.0), (12.0, 12.0), (5.0, 5.5)]);
        let charges = [-1.0, -2.0, -3.0, -4.0, -5.0];
        let tree = QuadTree::build(&bubbles, &charges);

        // Leftover entries from an earlier traversal must not leak into the next.
        let mut shared = vec![3, 1, 4];
        for i in 0..bubbles.len() {
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            let reused = tree.force_on(i, &bubbles, &charges, &params(), 1.0, &mut shared, &mut rng);
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            let fresh =
                tree.force_on(i, &bubbles, &charges, &params(), 1.0, &mut Vec::new(), &mut rng);
            assert_eq!(reused, fresh);
        }
        assert!(shared.capacity() > 0);
    }
}
