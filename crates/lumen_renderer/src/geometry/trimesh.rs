//! Triangle meshes.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection. Faces are
//! double sided for hit testing; the reported normal follows the winding (or
//! the interpolated vertex normals), so closed meshes should wind outward.

use lumen_core::{Bitmap, SceneError, SceneResult};
use lumen_math::{Aabb, Ray, Vec3, RAY_EPSILON};

use crate::intersection::LocalHit;

/// Extent of a height map mesh along X and Z.
const HEIGHT_MAP_SIZE: f64 = 5.0;

/// An indexed triangle mesh in local space.
#[derive(Debug, Clone)]
pub struct Trimesh {
    vertices: Vec<Vec3>,
    faces: Vec<[usize; 3]>,
    /// Per-vertex normals; empty means flat shading
    normals: Vec<Vec3>,
    bbox: Aabb,
}

impl Trimesh {
    /// Create a mesh, checking that every face references existing vertices.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[usize; 3]>) -> SceneResult<Self> {
        if faces.is_empty() {
            return Err(SceneError::InvalidParameter("mesh has no faces".into()));
        }
        if let Some(face) = faces.iter().find(|f| f.iter().any(|&i| i >= vertices.len())) {
            return Err(SceneError::InvalidParameter(format!(
                "mesh face {:?} references a vertex past {}",
                face,
                vertices.len()
            )));
        }

        let bbox = vertices
            .iter()
            .fold(Aabb::EMPTY, |acc, &v| Aabb::surrounding(&acc, &Aabb::from_points(v, v)));

        Ok(Self {
            vertices,
            faces,
            normals: Vec::new(),
            bbox,
        })
    }

    /// Use explicit per-vertex normals.
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> SceneResult<Self> {
        if normals.len() != self.vertices.len() {
            return Err(SceneError::InvalidParameter(format!(
                "mesh has {} vertices but {} normals",
                self.vertices.len(),
                normals.len()
            )));
        }
        self.normals = normals.into_iter().map(|n| n.normalize_or_zero()).collect();
        Ok(self)
    }

    /// Build a terrain from a height map.
    ///
    /// Each pixel becomes a vertex at `(5 i / w, red / 255, 5 j / h)`, each
    /// grid cell two triangles, and vertex normals are smoothed.
    pub fn from_height_map(bitmap: &Bitmap) -> SceneResult<Self> {
        let (w, h) = (bitmap.width as usize, bitmap.height as usize);
        if w < 2 || h < 2 {
            return Err(SceneError::InvalidParameter(format!(
                "height map must be at least 2x2, got {}x{}",
                w, h
            )));
        }

        let mut vertices = Vec::with_capacity(w * h);
        for j in 0..h {
            for i in 0..w {
                let x = i as f64 / w as f64;
                let z = j as f64 / h as f64;
                let height = bitmap.intensity(i as u32, j as u32);
                vertices.push(Vec3::new(x * HEIGHT_MAP_SIZE, height, z * HEIGHT_MAP_SIZE));
            }
        }

        let mut faces = Vec::with_capacity((w - 1) * (h - 1) * 2);
        for j in 0..h - 1 {
            for i in 0..w - 1 {
                let here = j * w + i;
                let above = (j + 1) * w + i;
                faces.push([here, above, here + 1]);
                faces.push([above, above + 1, here + 1]);
            }
        }

        let mut mesh = Self::new(vertices, faces)?;
        mesh.generate_normals();
        Ok(mesh)
    }

    /// Smooth vertex normals: the area-weighted average of adjacent face normals.
    pub fn generate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for face in &self.faces {
            let [a, b, c] = face.map(|i| self.vertices[i]);
            let n = (b - a).cross(c - a);
            for &i in face {
                normals[i] += n;
            }
        }
        self.normals = normals.into_iter().map(|n| n.normalize_or_zero()).collect();
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Nearest face hit beyond `RAY_EPSILON`.
    pub(crate) fn intersect(&self, ray: &Ray) -> Option<LocalHit> {
        self.bbox.intersect(ray)?;

        let mut closest: Option<LocalHit> = None;
        for face in &self.faces {
            let Some((t, u, v)) = self.intersect_face(face, ray) else {
                continue;
            };
            if closest.map_or(true, |c| t < c.t) {
                closest = Some(LocalHit::new(t, self.face_normal(face, u, v)));
            }
        }
        closest
    }

    /// Möller-Trumbore; returns `t` and the barycentrics of `v1` and `v2`.
    fn intersect_face(&self, face: &[usize; 3], ray: &Ray) -> Option<(f64, f64, f64)> {
        let [v0, v1, v2] = face.map(|i| self.vertices[i]);
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-12 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (t > RAY_EPSILON).then_some((t, u, v))
    }

    fn face_normal(&self, face: &[usize; 3], u: f64, v: f64) -> Vec3 {
        if self.normals.is_empty() {
            let [v0, v1, v2] = face.map(|i| self.vertices[i]);
            return (v1 - v0).cross(v2 - v0).normalize_or_zero();
        }
        let [n0, n1, n2] = face.map(|i| self.normals[i]);
        ((1.0 - u - v) * n0 + u * n1 + v * n2).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Trimesh {
        // Unit square in the XY plane, facing +Z
        Trimesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_mesh_hit() {
        let mesh = quad();
        let hit = mesh
            .intersect(&Ray::new(Vec3::new(0.25, 0.75, 2.0), Vec3::NEG_Z))
            .unwrap();
        assert!((hit.t - 2.0).abs() < 1e-12);
        assert!((hit.normal - Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_mesh_miss() {
        let mesh = quad();
        assert!(mesh
            .intersect(&Ray::new(Vec3::new(1.5, 0.5, 2.0), Vec3::NEG_Z))
            .is_none());
        assert!(mesh
            .intersect(&Ray::new(Vec3::new(0.5, 0.5, 2.0), Vec3::Z))
            .is_none());
    }

    #[test]
    fn test_invalid_faces() {
        let result = Trimesh::new(vec![Vec3::ZERO, Vec3::X], vec![[0, 1, 2]]);
        assert!(matches!(result, Err(SceneError::InvalidParameter(_))));
        assert!(Trimesh::new(vec![Vec3::ZERO], Vec::new()).is_err());
        assert!(quad().with_normals(vec![Vec3::Z]).is_err());
    }

    #[test]
    fn test_generated_normals_of_flat_mesh() {
        let mut mesh = quad();
        mesh.generate_normals();
        assert_eq!(mesh.normals().len(), 4);
        for n in mesh.normals() {
            assert!((*n - Vec3::Z).length() < 1e-12);
        }
    }

    #[test]
    fn test_height_map_mesh() {
        // 3x2 map, heights from the red channel
        let bitmap = Bitmap::from_rgb(
            3,
            2,
            vec![0, 0, 0, 255, 0, 0, 0, 0, 0, 0, 0, 0, 51, 0, 0, 0, 0, 0],
        )
        .unwrap();
        let mesh = Trimesh::from_height_map(&bitmap).unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 4);
        assert!((mesh.vertices[1] - Vec3::new(5.0 / 3.0, 1.0, 0.0)).length() < 1e-12);
        assert!((mesh.vertices[4] - Vec3::new(5.0 / 3.0, 0.2, 2.5)).length() < 1e-12);

        // Terrain faces up
        for n in mesh.normals() {
            assert!(n.y > 0.0);
        }

        let tiny = Bitmap::filled(1, 4, [0, 0, 0]).unwrap();
        assert!(Trimesh::from_height_map(&tiny).is_err());
    }
}
