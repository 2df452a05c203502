use crate::components::instance::Instance;
use crate::components::material::Material;
use crate::components::mesh::Mesh;
use crate::guid_new_type::{InstanceHandle, MaterialHandle, MeshHandle};
use slotmap::SlotMap;

/// 一次绘制所需的数据
pub struct DrawItem<'a> {
    pub mesh: &'a Mesh,
    pub material: &'a Material,
    pub transform: glam::Mat4,
}

/// 在 CPU 侧管理场景数据
#[derive(Default)]
pub struct SceneManager {
    all_mats: SlotMap<MaterialHandle, Material>,
    all_instances: SlotMap<InstanceHandle, Instance>,
    all_meshes: SlotMap<MeshHandle, Mesh>,
}
// new & init
impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }
}
// getter
impl SceneManager {
    #[inline]
    pub fn mesh_map(&self) -> &SlotMap<MeshHandle, Mesh> {
        &self.all_meshes
    }
    #[inline]
    pub fn instance_map(&self) -> &SlotMap<InstanceHandle, Instance> {
        &self.all_instances
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.all_instances.is_empty() && self.all_meshes.is_empty()
    }

    /// 所有网格缓冲的总字节数，网格移除后应归零
    pub fn gpu_bytes(&self) -> usize {
        self.all_meshes.values().map(|mesh| mesh.buffers.size_in_bytes()).sum()
    }

    /// 收集所有 instance 的绘制数据
    pub fn draw_items(&self) -> Vec<DrawItem<'_>> {
        self.all_instances
            .values()
            .filter_map(|instance| {
                Some(DrawItem {
                    mesh: self.all_meshes.get(instance.mesh)?,
                    material: self.all_mats.get(instance.material)?,
                    transform: instance.transform,
                })
            })
            .collect()
    }
}
// tools
impl SceneManager {
    #[inline]
    pub fn get_mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.all_meshes.get(handle)
    }

    #[inline]
    pub fn get_instance(&self, handle: InstanceHandle) -> Option<&Instance> {
        self.all_instances.get(handle)
    }

    #[inline]
    pub fn get_material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.all_mats.get(handle)
    }

    pub fn register_mat(&mut self, mat: Material) -> MaterialHandle {
        self.all_mats.insert(mat)
    }

    pub fn register_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.all_meshes.insert(mesh)
    }

    pub fn register_instance(&mut self, instance: Instance) -> InstanceHandle {
        self.all_instances.insert(instance)
    }

    /// 从场景中移除 instance，并销毁它引用的网格缓冲
    pub fn remove_instance(&mut self, handle: InstanceHandle) -> Option<Mesh> {
        let instance = self.all_instances.remove(handle)?;
        let mesh = self.all_meshes.remove(instance.mesh);
        if let Some(mesh) = &mesh {
            log::debug!("dispose mesh '{}' ({} bytes)", mesh.name, mesh.buffers.size_in_bytes());
        }
        mesh
    }
}
// destroy
impl SceneManager {
    pub fn destroy_mut(&mut self) {
        self.all_instances.clear();
        self.all_meshes.clear();
    }
}
