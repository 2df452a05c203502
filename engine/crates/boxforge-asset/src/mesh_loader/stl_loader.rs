use super::MeshLoader;
use crate::error::DecodeError;
use crate::format::ModelFormat;
use crate::mesh::{MeshGeometry, face_normal};
use glam::Vec3;

const HEADER_SIZE: usize = 80;
const TRIANGLE_SIZE: usize = 50;

/// STL 解码，同时支持 binary 与 ASCII
///
/// 每个三角形展开为 3 个独立顶点，法线取 facet normal（为零时用面法线）。
pub struct StlLoader;

impl MeshLoader for StlLoader {
    const FORMAT: ModelFormat = ModelFormat::Stl;

    fn load(bytes: &[u8]) -> Result<MeshGeometry, DecodeError> {
        let triangles = if is_binary(bytes) {
            parse_binary(bytes)?
        } else if looks_like_ascii(bytes) {
            parse_ascii(bytes)?
        } else if bytes.len() < HEADER_SIZE + 4 {
            return Err(DecodeError::truncated(
                Self::FORMAT,
                format!("{} bytes is shorter than the binary STL header", bytes.len()),
            ));
        } else {
            let count = triangle_count(bytes);
            return Err(DecodeError::truncated(
                Self::FORMAT,
                format!(
                    "header declares {} triangles ({} bytes) but payload has {} bytes",
                    count,
                    count.saturating_mul(TRIANGLE_SIZE).saturating_add(HEADER_SIZE + 4),
                    bytes.len()
                ),
            ));
        };

        build_geometry(triangles)
    }
}

struct Facet {
    normal: Vec3,
    vertices: [Vec3; 3],
}

fn triangle_count(bytes: &[u8]) -> usize {
    u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize
}

/// binary STL 的长度严格等于 84 + 50 * N
fn is_binary(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_SIZE + 4
        && triangle_count(bytes)
            .checked_mul(TRIANGLE_SIZE)
            .is_some_and(|body| bytes.len() - HEADER_SIZE - 4 == body)
}

/// binary STL 的 header 也可能以 "solid" 开头，所以长度检查优先
///
/// solid 名称与注释长度不限，在整个文件中查找 facet 或 endsolid。
fn looks_like_ascii(bytes: &[u8]) -> bool {
    let trimmed = bytes.trim_ascii_start();
    trimmed.starts_with(b"solid") && trimmed.windows(5).any(|w| w == b"facet" || w == b"endso")
}

fn read_vec3(chunk: &[u8]) -> Vec3 {
    let f = |i: usize| f32::from_le_bytes([chunk[i], chunk[i + 1], chunk[i + 2], chunk[i + 3]]);
    Vec3::new(f(0), f(4), f(8))
}

fn parse_binary(bytes: &[u8]) -> Result<Vec<Facet>, DecodeError> {
    let facets = bytes[HEADER_SIZE + 4..]
        .chunks_exact(TRIANGLE_SIZE)
        .map(|chunk| Facet {
            normal: read_vec3(&chunk[0..12]),
            vertices: [read_vec3(&chunk[12..24]), read_vec3(&chunk[24..36]), read_vec3(&chunk[36..48])],
        })
        .collect();
    Ok(facets)
}

fn parse_ascii(bytes: &[u8]) -> Result<Vec<Facet>, DecodeError> {
    let malformed = |reason: String| DecodeError::malformed(ModelFormat::Stl, reason);

    let text = std::str::from_utf8(bytes).map_err(|e| malformed(format!("ASCII STL is not valid UTF-8: {e}")))?;
    let mut tokens = text.split_ascii_whitespace();

    let read_floats = |tokens: &mut std::str::SplitAsciiWhitespace<'_>, what: &str| -> Result<Vec3, DecodeError> {
        let mut v = [0.0f32; 3];
        for slot in &mut v {
            let token = tokens.next().ok_or_else(|| {
                DecodeError::truncated(ModelFormat::Stl, format!("unexpected end of data in {what}"))
            })?;
            *slot = token.parse().map_err(|_| malformed(format!("invalid number '{token}' in {what}")))?;
        }
        Ok(Vec3::from(v))
    };

    let mut facets = Vec::new();
    let mut normal = Vec3::ZERO;
    let mut vertices: Vec<Vec3> = Vec::with_capacity(3);
    let mut in_facet = false;
    let mut closed = false;

    while let Some(token) = tokens.next() {
        match token {
            "facet" => {
                if in_facet {
                    return Err(malformed("nested facet".to_string()));
                }
                if tokens.next() != Some("normal") {
                    return Err(malformed("expected 'normal' after 'facet'".to_string()));
                }
                normal = read_floats(&mut tokens, "facet normal")?;
                vertices.clear();
                in_facet = true;
            }
            "vertex" => {
                if !in_facet {
                    return Err(malformed("vertex outside of facet".to_string()));
                }
                vertices.push(read_floats(&mut tokens, "vertex")?);
            }
            "endfacet" => {
                if !in_facet {
                    return Err(malformed("endfacet without facet".to_string()));
                }
                if vertices.len() != 3 {
                    return Err(malformed(format!("facet has {} vertices, expected 3", vertices.len())));
                }
                facets.push(Facet {
                    normal,
                    vertices: [vertices[0], vertices[1], vertices[2]],
                });
                in_facet = false;
            }
            "endsolid" => {
                closed = true;
                break;
            }
            // solid 名称、outer loop、endloop
            _ => {}
        }
    }

    if in_facet || !closed {
        return Err(DecodeError::truncated(ModelFormat::Stl, "ASCII STL ends before 'endsolid'"));
    }
    Ok(facets)
}

fn build_geometry(facets: Vec<Facet>) -> Result<MeshGeometry, DecodeError> {
    if facets.is_empty() {
        return Err(DecodeError::malformed(ModelFormat::Stl, "payload contains no triangles"));
    }

    let mut positions = Vec::with_capacity(facets.len() * 3);
    let mut normals = Vec::with_capacity(facets.len() * 3);
    for facet in &facets {
        if !facet.vertices.iter().all(|v| v.is_finite()) {
            return Err(DecodeError::malformed(ModelFormat::Stl, "vertex coordinate is not finite"));
        }
        let [a, b, c] = facet.vertices;
        let n = if facet.normal.is_finite() && facet.normal.length_squared() > f32::EPSILON {
            facet.normal.normalize()
        } else {
            face_normal(a, b, c)
        };
        positions.extend_from_slice(&facet.vertices);
        normals.extend_from_slice(&[n, n, n]);
    }
    let indices = (0..positions.len() as u32).collect();

    MeshGeometry::new(positions, Some(normals), indices)
        .ok_or_else(|| DecodeError::malformed(ModelFormat::Stl, "payload contains no vertices"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;

    fn binary_stl(triangles: &[[Vec3; 3]]) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        out[..5].copy_from_slice(b"solid");
        out.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for tri in triangles {
            out.extend_from_slice(&[0u8; 12]);
            for v in tri {
                for c in v.to_array() {
                    out.extend_from_slice(&c.to_le_bytes());
                }
            }
            out.extend_from_slice(&0u16.to_le_bytes());
        }
        out
    }

    #[test]
    fn decodes_binary_with_solid_header() {
        let bytes = binary_stl(&[[Vec3::ZERO, Vec3::X, Vec3::Y], [Vec3::Z, Vec3::X, Vec3::Y]]);
        let mesh = StlLoader::load(&bytes).unwrap();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        // facet normal 为零，回退到面法线
        assert!((mesh.normals[0] - Vec3::Z).length() < 1e-6);
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let mut bytes = binary_stl(&[[Vec3::ZERO, Vec3::X, Vec3::Y]]);
        bytes.truncate(bytes.len() - 10);

        let err = StlLoader::load(&bytes).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Truncated);
    }

    #[test]
    fn decodes_ascii() {
        let text = "solid box\n\
            facet normal 0 0 1\n outer loop\n  vertex 0 0 0\n  vertex 1 0 0\n  vertex 0 1 0\n endloop\nendfacet\n\
            endsolid box\n";
        let mesh = StlLoader::load(text.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.normals[2], Vec3::Z);
    }

    #[test]
    fn ascii_without_endsolid_is_truncated() {
        let text = "solid box\nfacet normal 0 0 1\n outer loop\n  vertex 0 0 0\n  vertex 1 0";
        let err = StlLoader::load(text.as_bytes()).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Truncated);
    }

    #[test]
    fn ascii_with_bad_number_is_malformed() {
        let text = "solid box\nfacet normal 0 0 1\n outer loop\n  vertex 0 zero 0\n";
        let err = StlLoader::load(text.as_bytes()).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Malformed);
    }

    #[test]
    fn ascii_with_long_header_is_ascii() {
        let name = "x".repeat(4096);
        let text = format!(
            "solid {name}\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid {name}\n"
        );
        let mesh = StlLoader::load(text.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn stray_endfacet_is_malformed() {
        let text = "solid box\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\n\
            endfacet\nendsolid box\n";
        let err = StlLoader::load(text.as_bytes()).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Malformed);
    }

    #[test]
    fn zero_triangles_is_malformed() {
        let err = StlLoader::load(&binary_stl(&[])).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Malformed);
    }
}
