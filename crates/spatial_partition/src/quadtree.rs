//! Arena-backed quadtree for point indexing.
//!
//! Nodes live in a single vector addressed by index, with the root at index
//! 0. Clearing the tree truncates the arena back to the root instead of
//! dropping a graph of boxed children.

use crate::bounds::Bounds;
use crate::types::{Position, SpatialObject};
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

/// Index of the root node in the arena
const ROOT: usize = 0;

/// A node in the quadtree arena.
#[derive(Debug, Clone)]
pub struct QuadTreeNode<T> {
    /// Region covered by this node
    bounds: Bounds,
    /// Objects stored directly at this node
    objects: Vec<SpatialObject<T>>,
    /// Arena indices of the NW, NE, SW, SE children, `None` until subdivided
    children: Option<[usize; 4]>,
    /// Distance from the root
    depth: u8,
}

impl<T> QuadTreeNode<T> {
    fn new(bounds: Bounds, depth: u8) -> Self {
        Self {
            bounds,
            objects: Vec::new(),
            children: None,
            depth,
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Objects stored directly at this node, excluding descendants.
    pub fn objects(&self) -> &[SpatialObject<T>] {
        &self.objects
    }

    /// Arena indices of the children in NW, NE, SW, SE order.
    pub fn children(&self) -> Option<[usize; 4]> {
        self.children
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn is_divided(&self) -> bool {
        self.children.is_some()
    }
}

/// Structural statistics for analysing quadtree shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub total_objects: usize,
    pub node_count: usize,
    pub leaf_nodes: usize,
    pub internal_nodes: usize,
    pub max_depth: u8,
}

/// Point quadtree over a fixed world rectangle.
///
/// A node keeps objects directly while it holds fewer than `capacity` of
/// them. Once full it subdivides and later insertions descend into the
/// child whose quadrant contains the point; objects already stored at the
/// node stay where they are. Nodes at `max_depth` never subdivide and store
/// any number of objects, which bounds the depth when many objects share a
/// coordinate.
///
/// # Examples
///
/// ```rust
/// use spatial_partition::{Bounds, Position, QuadTree};
///
/// let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 4, 8);
/// assert!(tree.insert(1u32, Position::new(10.0, 10.0)));
/// assert!(!tree.insert(2u32, Position::new(150.0, 150.0)));
///
/// let near = tree.query_radius(12.0, 12.0, 5.0);
/// assert_eq!(near.len(), 1);
/// assert_eq!(near[0].id, 1);
/// ```
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    nodes: Vec<QuadTreeNode<T>>,
    capacity: usize,
    max_depth: u8,
}

impl<T> QuadTree<T> {
    /// Creates an empty tree covering `bounds`.
    pub fn new(bounds: Bounds, capacity: usize, max_depth: u8) -> Self {
        Self {
            nodes: vec![QuadTreeNode::new(bounds, 0)],
            capacity,
            max_depth,
        }
    }

    /// Region covered by the root node.
    pub fn bounds(&self) -> &Bounds {
        &self.nodes[ROOT].bounds
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn root(&self) -> &QuadTreeNode<T> {
        &self.nodes[ROOT]
    }

    /// Looks up a node by arena index.
    pub fn node(&self, index: usize) -> Option<&QuadTreeNode<T>> {
        self.nodes.get(index)
    }

    /// Number of nodes currently allocated in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts `id` at `position`.
    ///
    /// Returns `false` when the position lies outside the root bounds; such
    /// objects are simply not indexed.
    pub fn insert(&mut self, id: T, position: Position) -> bool {
        self.insert_object(SpatialObject::new(id, position))
    }

    /// Inserts a prepared [`SpatialObject`].
    pub fn insert_object(&mut self, object: SpatialObject<T>) -> bool {
        let (px, py) = (object.position.x, object.position.y);
        if !self.nodes[ROOT].bounds.contains(px, py) {
            trace!("Position ({}, {}) outside quadtree bounds, skipping", px, py);
            return false;
        }

        let mut index = ROOT;
        loop {
            let node = &self.nodes[index];
            let has_room = node.objects.len() < self.capacity || node.depth >= self.max_depth;
            if node.children.is_none() && has_room {
                self.nodes[index].objects.push(object);
                return true;
            }

            let children = self.subdivide(index);
            let next = children
                .into_iter()
                .find(|&child| self.nodes[child].bounds.contains(px, py));
            match next {
                Some(child) => index = child,
                None => {
                    // Quadrants are built to tile their parent exactly, so this
                    // only happens if that construction is broken.
                    error!(
                        "Quadrant partition gap at ({}, {}) in node {:?}; keeping object at depth {}",
                        px, py, self.nodes[index].bounds, self.nodes[index].depth
                    );
                    self.nodes[index].objects.push(object);
                    return true;
                }
            }
        }
    }

    /// Splits the node at `index` into four quadrant children.
    ///
    /// Idempotent: an already divided node returns its existing children. No
    /// objects are moved.
    fn subdivide(&mut self, index: usize) -> [usize; 4] {
        if let Some(children) = self.nodes[index].children {
            return children;
        }

        let depth = self.nodes[index].depth + 1;
        let quadrants = self.nodes[index].bounds.quadrants();
        let first = self.nodes.len();
        for quadrant in quadrants {
            self.nodes.push(QuadTreeNode::new(quadrant, depth));
        }

        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[index].children = Some(children);
        children
    }

    /// Returns every object whose position lies inside `region`.
    ///
    /// Subtrees whose bounds do not intersect `region` are skipped. Results
    /// come out node first, then children in NW, NE, SW, SE order.
    pub fn query(&self, region: &Bounds) -> Vec<&SpatialObject<T>> {
        let mut results = Vec::new();
        self.query_node(ROOT, region, &mut results);
        results
    }

    fn query_node<'a>(
        &'a self,
        index: usize,
        region: &Bounds,
        results: &mut Vec<&'a SpatialObject<T>>,
    ) {
        let node = &self.nodes[index];
        if !node.bounds.intersects(region) {
            return;
        }

        results.extend(
            node.objects
                .iter()
                .filter(|object| region.contains_position(object.position)),
        );

        if let Some(children) = node.children {
            for child in children {
                self.query_node(child, region, results);
            }
        }
    }

    /// Returns every object within `radius` of `(x, y)`, boundary included.
    ///
    /// Subtrees that cannot touch the circle are pruned first, then each
    /// candidate is checked by squared distance. A negative or NaN radius
    /// matches nothing.
    pub fn query_radius(&self, x: f64, y: f64, radius: f64) -> Vec<&SpatialObject<T>> {
        let mut results = Vec::new();
        if radius.is_nan() || radius < 0.0 || !x.is_finite() || !y.is_finite() {
            return results;
        }

        let center = Position::new(x, y);
        self.query_radius_node(ROOT, center, radius, radius * radius, &mut results);
        results
    }

    fn query_radius_node<'a>(
        &'a self,
        index: usize,
        center: Position,
        radius: f64,
        radius_squared: f64,
        results: &mut Vec<&'a SpatialObject<T>>,
    ) {
        let node = &self.nodes[index];
        if !node.bounds.intersects_circle(center.x, center.y, radius) {
            return;
        }

        results.extend(
            node.objects
                .iter()
                .filter(|object| object.position.distance_squared(center) <= radius_squared),
        );

        if let Some(children) = node.children {
            for child in children {
                self.query_radius_node(child, center, radius, radius_squared, results);
            }
        }
    }

    /// Drops every object and collapses the tree back to an empty root.
    pub fn clear(&mut self) {
        self.nodes.truncate(ROOT + 1);
        let root = &mut self.nodes[ROOT];
        root.objects.clear();
        root.children = None;
    }

    /// Clears the tree and inserts `objects` in iteration order.
    ///
    /// Returns how many objects were accepted.
    pub fn rebuild<I>(&mut self, objects: I) -> usize
    where
        I: IntoIterator<Item = SpatialObject<T>>,
    {
        self.clear();
        objects
            .into_iter()
            .map(|object| self.insert_object(object))
            .filter(|inserted| *inserted)
            .count()
    }

    /// Total number of indexed objects, summed over the whole tree.
    pub fn count(&self) -> usize {
        self.count_node(ROOT)
    }

    fn count_node(&self, index: usize) -> usize {
        let node = &self.nodes[index];
        let below = node
            .children
            .map_or(0, |children| children.iter().map(|&c| self.count_node(c)).sum());
        node.objects.len() + below
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Iterates over every indexed object in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &SpatialObject<T>> {
        self.nodes.iter().flat_map(|node| node.objects.iter())
    }

    /// Gets statistics about the tree's shape.
    pub fn stats(&self) -> TreeStats {
        self.node_stats(ROOT)
    }

    fn node_stats(&self, index: usize) -> TreeStats {
        let node = &self.nodes[index];
        let mut stats = TreeStats {
            total_objects: node.objects.len(),
            node_count: 1,
            leaf_nodes: 0,
            internal_nodes: 0,
            max_depth: node.depth,
        };

        match node.children {
            None => stats.leaf_nodes = 1,
            Some(children) => {
                stats.internal_nodes = 1;
                for child in children {
                    let child_stats = self.node_stats(child);
                    stats.total_objects += child_stats.total_objects;
                    stats.node_count += child_stats.node_count;
                    stats.leaf_nodes += child_stats.leaf_nodes;
                    stats.internal_nodes += child_stats.internal_nodes;
                    stats.max_depth = stats.max_depth.max(child_stats.max_depth);
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_tree() -> QuadTree<u32> {
        let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 4, 10);
        let points = [(10.0, 10.0), (20.0, 20.0), (30.0, 30.0), (40.0, 40.0), (90.0, 90.0)];
        for (id, (x, y)) in points.into_iter().enumerate() {
            assert!(tree.insert(id as u32, Position::new(x, y)));
        }
        tree
    }

    fn sorted_ids(objects: Vec<&SpatialObject<u32>>) -> Vec<u32> {
        let mut ids: Vec<u32> = objects.into_iter().map(|object| object.id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_scenario_counts_and_subdivides() {
        let tree = scenario_tree();

        assert_eq!(tree.count(), 5);
        assert!(tree.root().is_divided(), "fifth insert should subdivide the root");
        // The first four stay at the root, nothing is redistributed
        assert_eq!(tree.root().objects().len(), 4);

        let children = tree.root().children().unwrap();
        let southeast = tree.node(children[3]).unwrap();
        assert_eq!(southeast.objects().len(), 1);
        assert_eq!(southeast.objects()[0].position, Position::new(90.0, 90.0));
    }

    #[test]
    fn test_scenario_queries() {
        let tree = scenario_tree();

        assert_eq!(sorted_ids(tree.query_radius(15.0, 15.0, 10.0)), vec![0, 1]);
        assert_eq!(sorted_ids(tree.query(&Bounds::new(50.0, 50.0, 50.0, 50.0))), vec![4]);
    }

    #[test]
    fn test_out_of_bounds_insert_is_rejected() {
        let mut tree = scenario_tree();

        assert!(!tree.insert(99, Position::new(150.0, 150.0)));
        assert!(!tree.insert(99, Position::new(100.0, 50.0)));
        assert!(!tree.insert(99, Position::new(f64::NAN, 50.0)));
        assert_eq!(tree.count(), 5);
    }

    #[test]
    fn test_midpoint_goes_to_southeast() {
        let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 1, 10);
        assert!(tree.insert(0u32, Position::new(0.0, 0.0)));
        assert!(tree.insert(1u32, Position::new(50.0, 50.0)));

        let children = tree.root().children().unwrap();
        for &child in &children[..3] {
            assert!(tree.node(child).unwrap().objects().is_empty());
        }
        assert_eq!(tree.node(children[3]).unwrap().objects()[0].id, 1);
    }

    #[test]
    fn test_subdivide_is_idempotent() {
        let mut tree: QuadTree<u32> = QuadTree::new(Bounds::new(0.0, 0.0, 64.0, 64.0), 4, 10);
        let first = tree.subdivide(ROOT);
        let second = tree.subdivide(ROOT);

        assert_eq!(first, second);
        assert_eq!(tree.node_count(), 5);
        for (child, quadrant) in first.iter().zip(tree.bounds().quadrants()) {
            let node = tree.node(*child).unwrap();
            assert_eq!(*node.bounds(), quadrant);
            assert_eq!(node.depth(), 1);
        }
    }

    #[test]
    fn test_same_coordinate_stops_at_max_depth() {
        let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 2, 3);
        for id in 0..10u32 {
            assert!(tree.insert(id, Position::new(7.0, 7.0)));
        }

        let stats = tree.stats();
        assert_eq!(tree.count(), 10);
        assert_eq!(stats.total_objects, 10);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.node_count, 13);
        assert_eq!(tree.query_radius(7.0, 7.0, 0.0).len(), 10);
    }

    #[test]
    fn test_zero_max_depth_never_subdivides() {
        let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 10.0, 10.0), 1, 0);
        for id in 0..20u32 {
            assert!(tree.insert(id, Position::new(id as f64 / 2.0, 1.0)));
        }

        assert!(!tree.root().is_divided());
        assert_eq!(tree.root().objects().len(), 20);
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 4, 10);
        tree.insert(0u32, Position::new(60.0, 50.0));
        tree.insert(1u32, Position::new(50.0, 40.0));
        tree.insert(2u32, Position::new(60.1, 50.0));

        assert_eq!(sorted_ids(tree.query_radius(50.0, 50.0, 10.0)), vec![0, 1]);
        assert!(tree.query_radius(50.0, 50.0, -1.0).is_empty());
        assert!(tree.query_radius(f64::NAN, 50.0, 10.0).is_empty());
    }

    #[test]
    fn test_clear_resets_tree() {
        let mut tree = scenario_tree();
        tree.clear();

        assert_eq!(tree.count(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert!(!tree.root().is_divided());
        assert!(tree.query(&Bounds::new(0.0, 0.0, 100.0, 100.0)).is_empty());
        assert!(tree.query_radius(50.0, 50.0, 1000.0).is_empty());

        // Clearing twice is harmless
        tree.clear();
        assert_eq!(tree.count(), 0);
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 2, 10);
        let set_a = (0..10u32).map(|i| SpatialObject::new(i, Position::new(i as f64, i as f64)));
        assert_eq!(tree.rebuild(set_a), 10);

        let set_b = vec![
            SpatialObject::new(100u32, Position::new(80.0, 20.0)),
            SpatialObject::new(101u32, Position::new(20.0, 80.0)),
            SpatialObject::new(102u32, Position::new(500.0, 80.0)),
        ];
        assert_eq!(tree.rebuild(set_b), 2);

        assert_eq!(tree.count(), 2);
        let everything = tree.query(&Bounds::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(sorted_ids(everything), vec![100, 101]);
    }

    #[test]
    fn test_stats_tracking() {
        let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 1000.0, 1000.0), 8, 10);

        // Insert enough objects to trigger subdivision
        for i in 0..20u32 {
            tree.insert(i, Position::new(i as f64 * 50.0, i as f64 * 50.0));
        }

        let stats = tree.stats();
        assert!(stats.max_depth > 0, "Tree should have subdivided");
        assert!(stats.internal_nodes > 0, "Should have internal nodes");
        assert_eq!(stats.node_count, tree.node_count());
        assert_eq!(stats.leaf_nodes + stats.internal_nodes, stats.node_count);
        assert_eq!(tree.count(), 20);
        assert_eq!(tree.iter().count(), 20);
    }
}
