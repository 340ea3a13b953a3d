use ndarray::{Array1, ArrayView1, ArrayView2};

/// A cluster: its current centroid plus the ids of the points assigned to it.
///
/// Points are never copied into a cluster. Member ids index rows of the data
/// matrix the cluster was built against, so a member's coordinates are always
/// read from the same place as every other view of that point.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: usize,
    centroid: Array1<f64>,
    members: Vec<usize>,
}

impl Cluster {
    /// Create a cluster seeded by a single point: the centroid starts at the
    /// point's coordinates and the point is the only member.
    pub fn new(id: usize, seed_point: usize, coords: ArrayView1<f64>) -> Self {
        Self {
            id,
            centroid: coords.to_owned(),
            members: vec![seed_point],
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn centroid(&self) -> &Array1<f64> {
        &self.centroid
    }

    /// Ids of the member points, in insertion order
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn add_point(&mut self, point_id: usize) {
        self.members.push(point_id);
    }

    /// Remove a point by id. Linear scan; returns false if it was not a member.
    pub fn remove_point(&mut self, point_id: usize) -> bool {
        match self.members.iter().position(|&p| p == point_id) {
            Some(pos) => {
                self.members.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Set every centroid coordinate to the mean of that coordinate over the
    /// members. An empty cluster keeps its centroid.
    pub fn recompute_centroid(&mut self, data: &ArrayView2<f64>) {
        if self.members.is_empty() {
            return;
        }

        let count = self.members.len() as f64;
        for j in 0..self.centroid.len() {
            let mut sum = 0.0;
            for &p in &self.members {
                sum += data[[p, j]];
            }
            self.centroid[j] = sum / count;
        }
    }
}
