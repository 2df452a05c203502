use super::MeshLoader;
use crate::error::DecodeError;
use crate::format::ModelFormat;
use crate::mesh::MeshGeometry;
use glam::Vec3;

/// OBJ 解码（tobj）
///
/// 所有 model 合并为一个网格；mtllib 引用被忽略，材质由视口统一提供。
pub struct ObjLoader;

impl MeshLoader for ObjLoader {
    const FORMAT: ModelFormat = ModelFormat::Obj;

    fn load(bytes: &[u8]) -> Result<MeshGeometry, DecodeError> {
        let (models, _materials) = tobj::load_obj_buf(
            &mut std::io::Cursor::new(bytes),
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ignore_lines: true,
                ignore_points: true,
                ..Default::default()
            },
            |_| Err(tobj::LoadError::OpenFileFailed),
        )
        .map_err(|e| DecodeError::malformed(Self::FORMAT, format!("tobj: {e}")))?;

        let mut positions: Vec<Vec3> = Vec::new();
        let mut normals: Vec<Vec3> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut has_normals = true;

        for model in &models {
            let mesh = &model.mesh;
            if mesh.positions.len() % 3 != 0 {
                return Err(DecodeError::malformed(Self::FORMAT, format!("model '{}' has ragged positions", model.name)));
            }
            let base = positions.len() as u32;
            let vertex_count = mesh.positions.len() / 3;

            positions.extend(mesh.positions.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2])));
            if mesh.normals.len() == mesh.positions.len() {
                normals.extend(mesh.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));
            } else {
                has_normals = false;
            }

            if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(DecodeError::malformed(
                    Self::FORMAT,
                    format!("model '{}' references vertex {} of {}", model.name, bad, vertex_count),
                ));
            }
            indices.extend(mesh.indices.iter().map(|i| base + i));
        }

        if indices.is_empty() {
            return Err(DecodeError::malformed(Self::FORMAT, "payload contains no faces"));
        }
        if !positions.iter().all(|p| p.is_finite()) {
            return Err(DecodeError::malformed(Self::FORMAT, "vertex coordinate is not finite"));
        }

        log::debug!("decoded obj: {} models, {} vertices, {} triangles", models.len(), positions.len(), indices.len() / 3);

        let normals = has_normals.then_some(normals);
        MeshGeometry::new(positions, normals, indices)
            .ok_or_else(|| DecodeError::malformed(Self::FORMAT, "payload contains no vertices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;

    const QUAD: &str = "o quad\n\
        v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
        vn 0 0 1\n\
        f 1//1 2//1 3//1 4//1\n";

    #[test]
    fn triangulates_quad() {
        let mesh = ObjLoader::load(QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.normals.iter().all(|n| *n == Vec3::Z));
    }

    #[test]
    fn merges_models_with_index_offset() {
        let text = "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
                    o b\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 4 5 6\n";
        let mesh = ObjLoader::load(text.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        assert_eq!(mesh.bounds.max.z, 1.0);
        // 没有 vn，法线由面计算
        assert!((mesh.normals[0] - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = ObjLoader::load(b"this is not a wavefront file").unwrap_err();
        assert_eq!(err.format, ModelFormat::Obj);
        assert_eq!(err.kind, DecodeErrorKind::Malformed);
    }

    #[test]
    fn mtllib_reference_does_not_fail_geometry() {
        let text = format!("mtllib missing.mtl\n{QUAD}");
        assert!(ObjLoader::load(text.as_bytes()).is_ok());
    }
}
