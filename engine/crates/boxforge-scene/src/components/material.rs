/// CPU 侧的材质数据
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub base_color: glam::Vec4,
    pub emissive: glam::Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub opaque: f32,
}

impl Material {
    /// 非金属、中等粗糙度的标准材质，颜色为 0xRRGGBB
    pub fn standard(rgb: u32) -> Self {
        Self {
            base_color: rgb_to_vec4(rgb),
            emissive: glam::Vec4::ZERO,
            metallic: 0.0,
            roughness: 1.0,
            opaque: 1.0,
        }
    }
}

fn rgb_to_vec4(rgb: u32) -> glam::Vec4 {
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
    glam::Vec4::new(channel(16), channel(8), channel(0), 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_green() {
        let mat = Material::standard(0x00ff00);
        assert_eq!(mat.base_color, glam::Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(mat.metallic, 0.0);
    }
}
