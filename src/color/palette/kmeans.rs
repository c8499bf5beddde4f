//! Seeded k-means clustering in RGB space.

use super::{ColorSwatch, PaletteExtractor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAX_ITERATIONS: usize = 300;
/// Lloyd iterations stop once the summed squared centroid shift is below this.
const TOLERANCE: f64 = 1e-4;

type Point = [f64; 3];

fn distance_sq(a: &Point, b: &Point) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn nearest(point: &Point, centroids: &[Point]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, distance_sq(point, c)))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

/// One finished clustering run.
struct Clustering {
    centroids: Vec<Point>,
    labels: Vec<usize>,
    inertia: f64,
}

/// k-means++ clustering with a fixed seed, keeping the lowest-inertia run
/// out of `restarts` independent initializations.
///
/// Centroids are reported in cluster order, rounded per channel. When `k`
/// exceeds the number of distinct colors some centroids coincide.
#[derive(Debug, Clone, Copy)]
pub struct ClusteringExtractor {
    seed: u64,
    restarts: u32,
}

impl ClusteringExtractor {
    pub fn new(seed: u64, restarts: u32) -> Self {
        Self {
            seed,
            restarts: restarts.max(1),
        }
    }

    /// k-means++ seeding: each new centroid is drawn with probability
    /// proportional to its squared distance from the nearest chosen one.
    fn seed_centroids(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
        let mut centroids = Vec::with_capacity(k);
        centroids.push(points[rng.random_range(0..points.len())]);

        let mut dists: Vec<f64> = points
            .iter()
            .map(|p| distance_sq(p, &centroids[0]))
            .collect();

        while centroids.len() < k {
            let total: f64 = dists.iter().sum();
            let chosen = if total > 0.0 {
                let mut target = rng.random::<f64>() * total;
                let mut idx = points.len() - 1;
                for (i, d) in dists.iter().enumerate() {
                    if target < *d {
                        idx = i;
                        break;
                    }
                    target -= d;
                }
                idx
            } else {
                // Every point already sits on a centroid
                rng.random_range(0..points.len())
            };

            let centroid = points[chosen];
            for (d, p) in dists.iter_mut().zip(points) {
                *d = d.min(distance_sq(p, &centroid));
            }
            centroids.push(centroid);
        }
        centroids
    }

    /// Lloyd iterations from the given starting centroids.
    fn refine(points: &[Point], mut centroids: Vec<Point>) -> Clustering {
        let k = centroids.len();
        let mut labels = vec![0usize; points.len()];

        for _ in 0..MAX_ITERATIONS {
            for (label, p) in labels.iter_mut().zip(points) {
                *label = nearest(p, &centroids).0;
            }

            let mut sums = vec![[0.0f64; 3]; k];
            let mut counts = vec![0usize; k];
            for (p, &label) in points.iter().zip(&labels) {
                for c in 0..3 {
                    sums[label][c] += p[c];
                }
                counts[label] += 1;
            }

            let mut shift = 0.0;
            for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
                // Empty clusters keep their previous position
                if count == 0 {
                    continue;
                }
                let updated = [
                    sum[0] / count as f64,
                    sum[1] / count as f64,
                    sum[2] / count as f64,
                ];
                shift += distance_sq(centroid, &updated);
                *centroid = updated;
            }

            if shift <= TOLERANCE {
                break;
            }
        }

        let mut inertia = 0.0;
        for (label, p) in labels.iter_mut().zip(points) {
            let (i, d) = nearest(p, &centroids);
            *label = i;
            inertia += d;
        }

        Clustering {
            centroids,
            labels,
            inertia,
        }
    }
}

impl PaletteExtractor for ClusteringExtractor {
    fn name(&self) -> &'static str {
        "kmeans"
    }

    fn extract(&self, pixels: &[[u8; 3]], k: usize) -> Vec<ColorSwatch> {
        if pixels.is_empty() || k == 0 {
            return Vec::new();
        }
        let points: Vec<Point> = pixels
            .iter()
            .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<Clustering> = None;
        for _ in 0..self.restarts {
            let start = Self::seed_centroids(&points, k, &mut rng);
            let run = Self::refine(&points, start);
            if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        let Some(best) = best else {
            return Vec::new();
        };

        let mut counts = vec![0usize; k];
        for &label in &best.labels {
            counts[label] += 1;
        }
        let total = points.len() as f64;

        best.centroids
            .iter()
            .zip(counts)
            .map(|(c, count)| ColorSwatch {
                rgb: [
                    c[0].round().clamp(0.0, 255.0) as u8,
                    c[1].round().clamp(0.0, 255.0) as u8,
                    c[2].round().clamp(0.0, 255.0) as u8,
                ],
                weight: count as f64 / total,
            })
            .collect()
    }
}
