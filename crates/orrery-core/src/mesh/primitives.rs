//! Procedural meshes

use glam::Vec3;

use super::MeshData;

const ICOSAHEDRON_INDICES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_vertices() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Geodesic sphere: an icosahedron whose faces are split `detail + 1` times
/// per edge, with every vertex pushed out to `radius`.
///
/// Produces `20 * (detail + 1)^2` triangles with unshared vertices.
pub fn icosahedron(radius: f32, detail: u32) -> MeshData {
    let base = icosahedron_vertices();
    let cols = detail as usize + 1;

    let mut positions = Vec::with_capacity(20 * cols * cols * 3);
    for [ia, ib, ic] in ICOSAHEDRON_INDICES {
        let (a, b, c) = (base[ia], base[ib], base[ic]);

        // v[i][j]: row i runs from edge a-c, column j from a towards b
        let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
        for i in 0..=cols {
            let t = i as f32 / cols as f32;
            let aj = a.lerp(c, t);
            let bj = b.lerp(c, t);
            let rows = cols - i;
            let row = (0..=rows)
                .map(|j| {
                    if rows == 0 {
                        aj
                    } else {
                        aj.lerp(bj, j as f32 / rows as f32)
                    }
                })
                .collect();
            grid.push(row);
        }

        for i in 0..cols {
            for j in 0..(2 * (cols - i) - 1) {
                let k = j / 2;
                let tri = if j % 2 == 0 {
                    [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
                } else {
                    [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
                };
                positions.extend(tri);
            }
        }
    }

    let normals: Vec<[f32; 3]> = positions
        .iter()
        .map(|p| p.normalize().to_array())
        .collect();
    let positions: Vec<[f32; 3]> = positions
        .iter()
        .map(|p| (p.normalize() * radius).to_array())
        .collect();
    let indices = (0..positions.len() as u32).collect();

    MeshData {
        positions,
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_triangle_counts() {
        assert_eq!(icosahedron(1.0, 0).triangle_count(), 20);
        assert_eq!(icosahedron(1.0, 1).triangle_count(), 80);
        assert_eq!(icosahedron(1.0, 2).triangle_count(), 180);
    }

    #[test]
    fn test_vertices_on_sphere() {
        let mesh = icosahedron(20.0, 1);
        for p in &mesh.positions {
            assert_relative_eq!(Vec3::from(*p).length(), 20.0, epsilon = 1e-4);
        }
        for n in &mesh.normals {
            assert_relative_eq!(Vec3::from(*n).length(), 1.0, epsilon = 1e-5);
        }
    }
}
