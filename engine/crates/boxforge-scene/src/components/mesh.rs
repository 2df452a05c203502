use boxforge_asset::ResourceHandle;
use boxforge_asset::mesh::{DecodedMesh, MeshBounds};

/// 顶点布局：position + normal，交错存放
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// 上传用的顶点 / 索引缓冲
///
/// 网格从场景中移除时随之销毁。
pub struct GpuMeshBuffers {
    pub vertex_bytes: Vec<u8>,
    pub index_bytes: Vec<u8>,
    pub index_count: u32,
}

impl GpuMeshBuffers {
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.vertex_bytes.len() + self.index_bytes.len()
    }
}

/// 场景中的网格，与产生它的资源一一对应
pub struct Mesh {
    pub name: String,
    pub source: ResourceHandle,
    pub bounds: MeshBounds,
    pub vertex_count: u32,
    pub buffers: GpuMeshBuffers,
}

impl Mesh {
    pub fn from_decoded(decoded: DecodedMesh) -> Self {
        let geometry = decoded.geometry;
        let vertices: Vec<Vertex> = geometry
            .positions
            .iter()
            .zip(&geometry.normals)
            .map(|(p, n)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect();

        let buffers = GpuMeshBuffers {
            vertex_bytes: bytemuck::cast_slice(&vertices).to_vec(),
            index_bytes: bytemuck::cast_slice(&geometry.indices).to_vec(),
            index_count: geometry.indices.len() as u32,
        };

        Self {
            name: format!("model-{}", decoded.source.token().value()),
            source: decoded.source,
            bounds: geometry.bounds,
            vertex_count: vertices.len() as u32,
            buffers,
        }
    }
}
