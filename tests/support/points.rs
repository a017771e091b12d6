#![allow(dead_code)]

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generate points uniformly distributed in an axis-aligned cube.
pub fn random_cube_points(n: usize, side: f64, seed: u64) -> Vec<[f64; 3]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_cube_points_with_rng(n, side, &mut rng)
}

pub fn random_cube_points_with_rng<R: Rng + ?Sized>(
    n: usize,
    side: f64,
    rng: &mut R,
) -> Vec<[f64; 3]> {
    (0..n)
        .map(|_| {
            [
                rng.gen_range(0.0..side),
                rng.gen_range(0.0..side),
                rng.gen_range(0.0..side),
            ]
        })
        .collect()
}

/// Generate clumped points: `clusters` Gaussian-ish blobs inside a cube.
///
/// Clustered inputs stress the partitioners harder than uniform ones: dense
/// blobs force deep subdivision while empty space prunes whole octants.
pub fn clustered_points(n: usize, clusters: usize, side: f64, seed: u64) -> Vec<[f64; 3]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centers: Vec<[f64; 3]> = random_cube_points_with_rng(clusters.max(1), side, &mut rng);
    let spread = side / (clusters.max(1) as f64).cbrt() * 0.25;

    (0..n)
        .map(|i| {
            let c = centers[i % centers.len()];
            [
                c[0] + rng.gen_range(-spread..spread),
                c[1] + rng.gen_range(-spread..spread),
                c[2] + rng.gen_range(-spread..spread),
            ]
        })
        .collect()
}

/// Points on a flat plane (degenerate extent on one axis).
pub fn planar_points(n: usize, side: f64, z: f64, seed: u64) -> Vec<[f64; 3]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| [rng.gen_range(0.0..side), rng.gen_range(0.0..side), z])
        .collect()
}
