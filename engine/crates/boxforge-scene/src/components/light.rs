use boxforge_crate_tools::config::ViewportConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: glam::Vec3,
    pub intensity: f32,
}

/// 平行光，`position` 指向原点即为光照方向的反方向
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub position: glam::Vec3,
    pub color: glam::Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    /// 光线传播方向（单位向量）
    pub fn direction(&self) -> glam::Vec3 {
        (-self.position).normalize_or_zero()
    }
}

/// 视口的固定灯光：一个环境光 + 一个平行光
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
}

impl Lighting {
    pub fn from_config(config: &ViewportConfig) -> Self {
        Self {
            ambient: AmbientLight {
                color: glam::Vec3::ONE,
                intensity: config.ambient_intensity,
            },
            directional: DirectionalLight {
                position: glam::Vec3::from(config.directional_light_position),
                color: glam::Vec3::ONE,
                intensity: config.directional_light_intensity,
            },
        }
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::from_config(&ViewportConfig::default())
    }
}
