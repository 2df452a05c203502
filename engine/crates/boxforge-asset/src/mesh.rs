use crate::handle::{GenerationToken, ResourceHandle};

/// 轴对齐包围盒
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshBounds {
    pub min: glam::Vec3,
    pub max: glam::Vec3,
}

impl MeshBounds {
    pub fn from_points(points: &[glam::Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points.iter().fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    #[inline]
    pub fn center(&self) -> glam::Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn extent(&self) -> glam::Vec3 {
        self.max - self.min
    }

    /// 外接球半径
    #[inline]
    pub fn radius(&self) -> f32 {
        self.extent().length() * 0.5
    }
}

/// CPU 侧的三角形网格，索引为三角形列表
#[derive(Clone, Debug)]
pub struct MeshGeometry {
    pub positions: Vec<glam::Vec3>,
    pub normals: Vec<glam::Vec3>,
    pub indices: Vec<u32>,
    pub bounds: MeshBounds,
}

impl MeshGeometry {
    /// 没有法线时按面法线累加得到顶点法线
    pub fn new(positions: Vec<glam::Vec3>, normals: Option<Vec<glam::Vec3>>, indices: Vec<u32>) -> Option<Self> {
        let bounds = MeshBounds::from_points(&positions)?;
        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals,
            _ => compute_vertex_normals(&positions, &indices),
        };
        Some(Self {
            positions,
            normals,
            indices,
            bounds,
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// 解码结果：几何数据 + 产生它的资源句柄（其中包含发起解码时的 token）
#[derive(Clone, Debug)]
pub struct DecodedMesh {
    pub source: ResourceHandle,
    pub geometry: MeshGeometry,
}

impl DecodedMesh {
    #[inline]
    pub fn token(&self) -> GenerationToken {
        self.source.token()
    }
}

pub(crate) fn face_normal(a: glam::Vec3, b: glam::Vec3, c: glam::Vec3) -> glam::Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

fn compute_vertex_normals(positions: &[glam::Vec3], indices: &[u32]) -> Vec<glam::Vec3> {
    let mut normals = vec![glam::Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        // 面积加权：不归一化的叉积
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals.iter_mut().for_each(|n| *n = n.normalize_or_zero());
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn bounds_cover_all_points() {
        let bounds =
            MeshBounds::from_points(&[Vec3::new(-1.0, 2.0, 0.0), Vec3::new(3.0, -2.0, 1.0), Vec3::ZERO]).unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 2.0, 1.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, 0.0, 0.5));
        assert!(MeshBounds::from_points(&[]).is_none());
    }

    #[test]
    fn computes_normals_when_missing() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let geometry = MeshGeometry::new(positions, None, vec![0, 1, 2]).unwrap();
        for n in &geometry.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
        assert_eq!(geometry.triangle_count(), 1);
    }
}
