use crate::guid_new_type::{MaterialHandle, MeshHandle};

pub struct Instance {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub transform: glam::Mat4,
}
