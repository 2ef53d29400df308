use crate::Vector3D;

/// Maximal number of particles in a leaf of the tree
const LEAF_CAPACITY: usize = 4;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Aabb {
    pub lower: Vector3D,
    pub upper: Vector3D,
}

impl Aabb {
    /// An empty bounding box, containing nothing
    pub fn empty() -> Aabb {
        Aabb {
            lower: Vector3D::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            upper: Vector3D::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Grow this bounding box to contain `point`
    pub fn expand(&mut self, point: Vector3D) {
        self.lower = self.lower.component_min(point);
        self.upper = self.upper.component_max(point);
    }

    /// Index of the axis along which this box is the longest
    pub fn longest_axis(&self) -> usize {
        let extent = self.upper - self.lower;
        if extent[0] >= extent[1] && extent[0] >= extent[2] {
            0
        } else if extent[1] >= extent[2] {
            1
        } else {
            2
        }
    }

    /// Squared distance between `point` and the closest point of this box,
    /// zero if the point is inside the box
    pub fn distance2(&self, point: Vector3D) -> f64 {
        let mut distance2 = 0.0;
        for axis in 0..3 {
            let delta = if point[axis] < self.lower[axis] {
                self.lower[axis] - point[axis]
            } else if point[axis] > self.upper[axis] {
                point[axis] - self.upper[axis]
            } else {
                0.0
            };
            distance2 += delta * delta;
        }
        return distance2;
    }

    /// Does this box intersect with the sphere at `center` with squared radius
    /// `radius2`?
    pub fn overlaps_sphere(&self, center: Vector3D, radius2: f64) -> bool {
        self.distance2(center) < radius2
    }
}

#[derive(Debug, Clone)]
struct Node {
    aabb: Aabb,
    /// range of particles (in tree order) contained in this node
    start: usize,
    end: usize,
    /// number of nodes in the subtree below this node. Leaves have no
    /// children, and a skip of 0.
    skip: usize,
}

/// Position of a traversal in an `AabbTree`, allowing to resume a search
/// where it stopped
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TreeCursor {
    node: usize,
    particle: usize,
}

/// Bounding volume hierarchy over a set of points, stored as a flat array of
/// nodes in depth-first pre-order. Each node knows the size of its subtree,
/// which allows to traverse the tree without a stack: when a node does not
/// overlap with the search region, the traversal jumps over the whole
/// subtree.
#[derive(Debug, Clone)]
pub(crate) struct AabbTree {
    nodes: Vec<Node>,
    /// index of the particles in the original set of points, in tree order
    indices: Vec<usize>,
    /// position of the particles, in tree order
    positions: Vec<Vector3D>,
}

impl AabbTree {
    /// Build a new tree containing all the `points`
    pub fn new(points: &[Vector3D]) -> AabbTree {
        let mut items = points.iter().copied().enumerate().collect::<Vec<_>>();

        let mut nodes = Vec::new();
        if !items.is_empty() {
            build_node(&mut nodes, &mut items, 0);
        }

        let (indices, positions) = items.into_iter().unzip();
        return AabbTree {
            nodes: nodes,
            indices: indices,
            positions: positions,
        };
    }

    /// Get the number of nodes in this tree
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Find the next particle strictly inside the sphere centered on `center`
    /// with squared radius `radius2`, starting from `cursor`. This returns
    /// the index of the particle and its squared distance to the center, and
    /// updates the cursor to continue the search on the next call.
    pub fn next_in_sphere(&self, cursor: &mut TreeCursor, center: Vector3D, radius2: f64) -> Option<(usize, f64)> {
        while cursor.node < self.nodes.len() {
            let node = &self.nodes[cursor.node];
            if cursor.particle == 0 && !node.aabb.overlaps_sphere(center, radius2) {
                cursor.node += node.skip + 1;
                continue;
            }

            if node.skip == 0 {
                while node.start + cursor.particle < node.end {
                    let item = node.start + cursor.particle;
                    cursor.particle += 1;

                    let distance2 = (self.positions[item] - center).norm2();
                    if distance2 < radius2 {
                        return Some((self.indices[item], distance2));
                    }
                }
            }

            // move to the first child, or to the next node after this leaf
            cursor.node += 1;
            cursor.particle = 0;
        }

        return None;
    }
}

/// Recursively build the subtree containing `items` (which start at `start` in
/// tree order), splitting nodes at the median along their longest axis.
fn build_node(nodes: &mut Vec<Node>, items: &mut [(usize, Vector3D)], start: usize) {
    let mut aabb = Aabb::empty();
    for &(_, position) in items.iter() {
        aabb.expand(position);
    }

    let node_index = nodes.len();
    nodes.push(Node {
        aabb: aabb,
        start: start,
        end: start + items.len(),
        skip: 0,
    });

    if items.len() > LEAF_CAPACITY {
        let axis = aabb.longest_axis();
        let middle = items.len() / 2;
        items.select_nth_unstable_by(middle, |a, b| a.1[axis].total_cmp(&b.1[axis]));

        let (left, right) = items.split_at_mut(middle);
        build_node(nodes, left, start);
        build_node(nodes, right, start + middle);
    }

    nodes[node_index].skip = nodes.len() - node_index - 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points() -> Vec<Vector3D> {
        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..4 {
                for k in 0..3 {
                    points.push(Vector3D::new(i as f64, 0.5 * j as f64, 2.0 * k as f64));
                }
            }
        }
        return points;
    }

    #[test]
    fn aabb() {
        let mut aabb = Aabb::empty();
        aabb.expand(Vector3D::new(0.0, 1.0, 2.0));
        aabb.expand(Vector3D::new(1.0, -1.0, 2.5));
        assert_eq!(aabb.lower, Vector3D::new(0.0, -1.0, 2.0));
        assert_eq!(aabb.upper, Vector3D::new(1.0, 1.0, 2.5));
        assert_eq!(aabb.longest_axis(), 1);

        assert_eq!(aabb.distance2(Vector3D::new(0.5, 0.0, 2.2)), 0.0);
        assert_eq!(aabb.distance2(Vector3D::new(3.0, 0.0, 2.2)), 4.0);
        assert_eq!(aabb.distance2(Vector3D::new(-1.0, 2.0, 2.2)), 2.0);

        assert!(aabb.overlaps_sphere(Vector3D::new(3.0, 0.0, 2.2), 4.5));
        assert!(!aabb.overlaps_sphere(Vector3D::new(3.0, 0.0, 2.2), 4.0));
    }

    #[test]
    fn structure() {
        let points = grid_points();
        let tree = AabbTree::new(&points);

        let mut sorted = tree.indices.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..points.len()).collect::<Vec<_>>());

        for (i, node) in tree.nodes.iter().enumerate() {
            assert!(i + node.skip < tree.nodes.len());
            if node.skip == 0 {
                assert!(node.end - node.start <= LEAF_CAPACITY);
            } else {
                // children are contained in the parent
                let child = &tree.nodes[i + 1];
                assert!(child.start == node.start);
                assert!(child.aabb.lower.component_min(node.aabb.lower) == node.aabb.lower);
                assert!(child.aabb.upper.component_max(node.aabb.upper) == node.aabb.upper);
            }

            for item in node.start..node.end {
                assert_eq!(node.aabb.distance2(tree.positions[item]), 0.0);
            }
        }
    }

    #[test]
    fn search() {
        let points = grid_points();
        let tree = AabbTree::new(&points);
        let center = Vector3D::new(2.0, 0.75, 2.0);

        for &radius in &[0.1, 0.6, 1.1, 2.5, 100.0] {
            let mut found = Vec::new();
            let mut cursor = TreeCursor::default();
            while let Some((i, distance2)) = tree.next_in_sphere(&mut cursor, center, radius * radius) {
                assert_eq!(distance2, (points[i] - center).norm2());
                found.push(i);
            }
            found.sort_unstable();

            let expected = points.iter().enumerate()
                .filter(|&(_, &p)| (p - center).norm2() < radius * radius)
                .map(|(i, _)| i)
                .collect::<Vec<_>>();
            assert_eq!(found, expected);
        }

        // the cursor is fused at the end
        let mut cursor = TreeCursor::default();
        while tree.next_in_sphere(&mut cursor, center, 1.0).is_some() {}
        assert!(tree.next_in_sphere(&mut cursor, center, 1.0).is_none());
    }

    #[test]
    fn degenerate() {
        let tree = AabbTree::new(&[]);
        assert_eq!(tree.n_nodes(), 0);
        assert!(tree.next_in_sphere(&mut TreeCursor::default(), Vector3D::zero(), 1.0).is_none());

        // all points at the same position
        let points = vec![Vector3D::new(1.0, 1.0, 1.0); 11];
        let tree = AabbTree::new(&points);
        let mut cursor = TreeCursor::default();
        let mut count = 0;
        while tree.next_in_sphere(&mut cursor, Vector3D::new(1.0, 1.0, 1.5), 0.3).is_some() {
            count += 1;
        }
        assert_eq!(count, 11);
    }
}
