/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
use std::f32::consts::{PI, TAU};

use crate::color::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

/// CPU-side mesh, uploaded once to the render surface.
///
/// Triangle meshes carry normals, line meshes carry per-vertex colors.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub label: &'static str,
    pub topology: Topology,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Edge list of a triangle mesh, for wireframe drawing.
    #[must_use]
    pub fn wireframe_indices(&self) -> Vec<u32> {
        if self.topology == Topology::Lines {
            return self.indices.clone();
        }
        let mut edges: Vec<(u32, u32)> = self
            .indices
            .chunks_exact(3)
            .flat_map(|tri| [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])])
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
    }

    /// Largest absolute coordinate on each axis.
    #[must_use]
    pub fn half_extents(&self) -> [f32; 3] {
        self.positions.iter().fold([0.0; 3], |acc, p| {
            [
                acc[0].max(p[0].abs()),
                acc[1].max(p[1].abs()),
                acc[2].max(p[2].abs()),
            ]
        })
    }

    fn lines(label: &'static str) -> Self {
        Self {
            label,
            topology: Topology::Lines,
            positions: Vec::new(),
            normals: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
        }
    }

    fn push_line(&mut self, from: [f32; 3], to: [f32; 3], color: Color) {
        let first = u32::try_from(self.positions.len()).expect("Line vertex count should fit in u32");
        self.positions.extend([from, to]);
        self.colors.extend([color.to_linear(), color.to_linear()]);
        self.indices.extend([first, first + 1]);
    }
}

/// Axis-aligned box centered on the origin, four vertices per face so every face has flat normals.
#[must_use]
pub fn box_geometry(width: f32, height: f32, depth: f32) -> Geometry {
    let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
    // (normal, u axis, v axis), with u × v = normal so faces wind counter-clockwise.
    #[rustfmt::skip]
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([ 1., 0., 0.], [0., 0., -1.], [0., 1., 0.]),
        ([-1., 0., 0.], [0., 0.,  1.], [0., 1., 0.]),
        ([ 0., 1., 0.], [1., 0.,  0.], [0., 0., -1.]),
        ([ 0.,-1., 0.], [1., 0.,  0.], [0., 0.,  1.]),
        ([ 0., 0., 1.], [1., 0.,  0.], [0., 1.,  0.]),
        ([ 0., 0.,-1.], [-1., 0., 0.], [0., 1.,  0.]),
    ];
    let half = [hx, hy, hz];
    let mut geometry = Geometry {
        label: "box",
        topology: Topology::Triangles,
        positions: Vec::with_capacity(24),
        normals: Vec::with_capacity(24),
        colors: Vec::new(),
        indices: Vec::with_capacity(36),
    };
    for (normal, u, v) in faces {
        let first = u32::try_from(geometry.positions.len()).expect("Box has 24 vertices");
        for (su, sv) in [(-1., -1.), (1., -1.), (1., 1.), (-1., 1.)] {
            let position = std::array::from_fn(|axis| {
                (normal[axis] + u[axis] * su + v[axis] * sv) * half[axis]
            });
            geometry.positions.push(position);
            geometry.normals.push(normal);
        }
        geometry
            .indices
            .extend([first, first + 1, first + 2, first, first + 2, first + 3]);
    }
    geometry
}

/// Rectangle in the XY plane facing +Z.
#[must_use]
pub fn plane_geometry(width: f32, height: f32) -> Geometry {
    let (hw, hh) = (width / 2.0, height / 2.0);
    Geometry {
        label: "plane",
        topology: Topology::Triangles,
        positions: vec![[-hw, -hh, 0.], [hw, -hh, 0.], [hw, hh, 0.], [-hw, hh, 0.]],
        normals: vec![[0., 0., 1.]; 4],
        colors: Vec::new(),
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Red, green and blue segments along +X, +Y and +Z.
#[must_use]
pub fn axes_geometry(size: f32) -> Geometry {
    let mut geometry = Geometry::lines("axes");
    geometry.push_line([0., 0., 0.], [size, 0., 0.], Color::RED);
    geometry.push_line([0., 0., 0.], [0., size, 0.], Color::GREEN);
    geometry.push_line([0., 0., 0.], [0., 0., size], Color::BLUE);
    geometry
}

/// Square grid on the XZ plane; the two center lines use `center_color`.
#[must_use]
pub fn grid_geometry(size: f32, divisions: u32, center_color: Color, grid_color: Color) -> Geometry {
    let mut geometry = Geometry::lines("grid");
    let half = size / 2.0;
    #[allow(clippy::cast_precision_loss)]
    let step = size / divisions as f32;
    for i in 0..=divisions {
        #[allow(clippy::cast_precision_loss)]
        let k = -half + i as f32 * step;
        let color = if 2 * i == divisions { center_color } else { grid_color };
        geometry.push_line([-half, 0., k], [half, 0., k], color);
        geometry.push_line([k, 0., -half], [k, 0., half], color);
    }
    geometry
}

/// Low-poly wire sphere, the shape used to show where a point light sits.
#[must_use]
pub fn wire_sphere_geometry(radius: f32, segments: u32, rings: u32, color: Color) -> Geometry {
    let mut geometry = Geometry::lines("wire sphere");
    #[allow(clippy::cast_precision_loss)]
    let point = |segment: u32, ring: u32| {
        let theta = segment as f32 / segments as f32 * TAU;
        let phi = ring as f32 / rings as f32 * PI;
        [
            -radius * theta.cos() * phi.sin(),
            radius * phi.cos(),
            radius * theta.sin() * phi.sin(),
        ]
    };
    for ring in 0..=rings {
        for segment in 0..segments {
            if ring > 0 && ring < rings {
                geometry.push_line(point(segment, ring), point(segment + 1, ring), color);
            }
            if ring < rings {
                geometry.push_line(point(segment, ring), point(segment, ring + 1), color);
            }
        }
    }
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn box_faces_wind_outward() {
        let geometry = box_geometry(1.0, 1.0, 1.0);
        assert_eq!(geometry.vertex_count(), 24);
        assert_eq!(geometry.indices.len(), 36);
        for tri in geometry.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| geometry.positions[tri[i] as usize]);
            let face_normal = cross(sub(b, a), sub(c, a));
            let normal = geometry.normals[tri[0] as usize];
            let dot: f32 = face_normal.iter().zip(normal).map(|(x, y)| x * y).sum();
            assert!(dot > 0.0, "triangle {tri:?} winds inward");
        }
        assert_eq!(geometry.half_extents(), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn wireframe_deduplicates_shared_edges() {
        let geometry = plane_geometry(3.0, 3.0);
        // Four border edges plus the shared diagonal.
        assert_eq!(geometry.wireframe_indices().len(), 10);
    }

    #[test]
    fn grid_has_two_lines_per_division_step() {
        let geometry = grid_geometry(20.0, 20, Color::TEAL, Color::DARK_GRAY);
        assert_eq!(geometry.indices.len(), 21 * 2 * 2);
        let teal = Color::TEAL.to_linear();
        assert_eq!(geometry.colors.iter().filter(|c| **c == teal).count(), 4);
    }
}
