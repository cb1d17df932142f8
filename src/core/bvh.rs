// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

#[derive(Clone)]
struct BVHNode {
    bounds: AABB,
    left: Option<usize>,
    right: Option<usize>,
    start: usize,
    count: usize,
}

impl BVHNode {
    fn leaf(bounds: AABB, start: usize, count: usize) -> Self {
        Self { bounds, left: None, right: None, start, count }
    }

    fn interior(bounds: AABB, left: usize, right: usize) -> Self {
        Self { bounds, left: Some(left), right: Some(right), start: 0, count: 0 }
    }

    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    prim_bounds: Vec<AABB>,
    prim_centroids: Vec<Vector3f>,
    max_leaf_size: usize,
}

impl BVH {
    pub fn new(prim_bounds: Vec<AABB>, prim_centroids: Vec<Vector3f>) -> Self {
        Self::with_max_leaf_size(prim_bounds, prim_centroids, 4)
    }

    pub fn with_max_leaf_size(
        prim_bounds: Vec<AABB>,
        prim_centroids: Vec<Vector3f>,
        max_leaf_size: usize,
    ) -> Self {
        let mut bvh = Self {
            indices: (0..prim_bounds.len()).collect(),
            nodes: Vec::new(),
            prim_bounds,
            prim_centroids,
            max_leaf_size: max_leaf_size.max(1),
        };

        if !bvh.indices.is_empty() {
            bvh.build(0, bvh.indices.len());
        }

        bvh
    }

    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        if self.nodes.is_empty() {
            return None;
        }

        let mut closest: Option<(usize, T)> = None;
        let mut culling_ray = *ray;
        let mut stack = vec![0usize];

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds.hit_by(&culling_ray) {
                continue;
            }

            if node.is_leaf() {
                for i in node.start..(node.start + node.count) {
                    let prim_idx = self.indices[i];
                    if let Some((hit, t)) = hit_fn(prim_idx, ray) {
                        if t < culling_ray.span().1 {
                            culling_ray = culling_ray.clipped(t);
                            closest = Some((prim_idx, hit));
                        }
                    }
                }
            } else {
                if let Some(left) = node.left {
                    stack.push(left);
                }
                if let Some(right) = node.right {
                    stack.push(right);
                }
            }
        }

        closest
    }

    fn build(&mut self, start: usize, end: usize) -> usize {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for &idx in &self.indices[start..end] {
            bounds.expand_by_aabb(&self.prim_bounds[idx]);
            centroid_bounds.expand_by_point(&self.prim_centroids[idx]);
        }

        let count = end - start;
        let axis = centroid_bounds.widest_axis();
        let spread = centroid_bounds.p_max[axis] - centroid_bounds.p_min[axis];
        if count <= self.max_leaf_size || spread < 1e-9 {
            let node_idx = self.nodes.len();
            self.nodes.push(BVHNode::leaf(bounds, start, count));
            return node_idx;
        }

        // Median split along the widest centroid axis.
        let mid = start + count / 2;
        let centroids = &self.prim_centroids;
        self.indices[start..end].select_nth_unstable_by(count / 2, |a, b| {
            centroids[*a][axis]
                .partial_cmp(&centroids[*b][axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let node_idx = self.nodes.len();
        self.nodes.push(BVHNode::leaf(bounds, 0, 0));
        let left = self.build(start, mid);
        let right = self.build(mid, end);
        self.nodes[node_idx] = BVHNode::interior(bounds, left, right);
        node_idx
    }
}

#[cfg(test)]
mod tests {
    use super::BVH;
    use crate::core::shape::Shape;
    use crate::math::constants::{Float, Vector3f};
    use crate::math::ray::Ray3f;
    use crate::shapes::triangle::Triangle;

    fn build_triangles() -> Vec<Triangle> {
        let mut tris = Vec::new();
        for i in 0..32 {
            let x = (i % 8) as Float * 2.0;
            let z = (i / 8) as Float * -1.0;
            let p0 = Vector3f::new(x, 0.0, z);
            let p1 = Vector3f::new(x + 0.5, 0.0, z);
            let p2 = Vector3f::new(x, 0.5, z);
            tris.push(Triangle::new(p0, p1, p2));
        }
        tris
    }

    fn nearest_t(bvh: &BVH, triangles: &[Triangle], ray: &Ray3f) -> Option<Float> {
        bvh.ray_intersection(ray, |prim_idx, ray| {
            triangles[prim_idx].ray_intersection(ray).map(|h| (h.t, h.t))
        }).map(|(_, t)| t)
    }

    #[test]
    fn test_bvh_vs_naive_triangles() {
        let triangles = build_triangles();
        let prim_bounds: Vec<_> = triangles.iter().map(|t| t.bounding_box()).collect();
        let prim_centroids = prim_bounds.iter().map(|b| b.center()).collect();
        let bvh = BVH::new(prim_bounds, prim_centroids);
        assert_eq!(bvh.indices.len(), 32);

        for i in 0..8 {
            let origin = Vector3f::new(i as Float * 2.0 + 0.1, 0.1, 1.0);
            let ray = Ray3f::new(origin, Vector3f::new(0.0, 0.0, -1.0));

            let naive_t = triangles.iter()
                .filter_map(|tri| tri.ray_intersection(&ray).map(|h| h.t))
                .fold(None, |acc: Option<Float>, t| Some(acc.map_or(t, |cur| cur.min(t))));

            let bvh_t = nearest_t(&bvh, &triangles, &ray).expect("BVH miss");
            assert!((bvh_t - naive_t.expect("naive miss")).abs() < 1e-12);
            assert!((bvh_t - 1.0).abs() < 1e-12);
        }

        let miss_ray = Ray3f::new(Vector3f::new(100.0, 100.0, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(nearest_t(&bvh, &triangles, &miss_ray).is_none());
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = BVH::new(Vec::new(), Vec::new());
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0));
        let hit: Option<(usize, Float)> = bvh.ray_intersection(&ray, |_, _| Some((0.0, 0.0)));
        assert!(hit.is_none());
    }
}
