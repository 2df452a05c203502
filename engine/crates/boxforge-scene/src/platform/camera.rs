use boxforge_asset::mesh::MeshBounds;

/// 围绕 target 旋转的轨道相机
///
/// yaw 绕世界 Y 轴，pitch 为仰角，distance 为相机到 target 的距离。
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: glam::Vec3,
    pub distance: f32,

    pub yaw_deg: f32,
    pub pitch_deg: f32,

    pub fov_y_deg: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    /// 相机的上参考向量
    const CAMERA_UP: glam::Vec3 = glam::Vec3::Y;

    const K_PITCH: f32 = 89.5;

    const MIN_DISTANCE: f32 = 0.01;
    const MAX_DISTANCE: f32 = 1.0e5;

    pub fn position(&self) -> glam::Vec3 {
        let yaw = self.yaw_deg.to_radians();
        let pitch = self.pitch_deg.to_radians();
        let offset = glam::Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos());
        self.target + offset * self.distance
    }

    pub fn get_view_matrix(&self) -> glam::Mat4 {
        glam::Mat4::look_at_rh(self.position(), self.target, Self::CAMERA_UP)
    }

    pub fn get_projection_matrix(&self) -> glam::Mat4 {
        glam::Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect_ratio, self.near, self.far)
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    pub fn rotate(&mut self, yaw_deg: f32, pitch_deg: f32) {
        self.yaw_deg = (self.yaw_deg + yaw_deg).rem_euclid(360.0);
        self.pitch_deg = (self.pitch_deg + pitch_deg).clamp(-Self::K_PITCH, Self::K_PITCH);
    }

    /// factor < 1 拉近，> 1 拉远
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
        }
    }

    /// 在相机平面内平移 target，单位为世界坐标
    pub fn pan(&mut self, right: f32, up: f32) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let right_dir = forward.cross(Self::CAMERA_UP).normalize_or_zero();
        let up_dir = right_dir.cross(forward);
        self.target += right_dir * right + up_dir * up;
    }

    /// 调整 target 与 distance 使包围球完整落在视野内
    pub fn frame_bounds(&mut self, bounds: &MeshBounds) {
        let radius = bounds.radius().max(Self::MIN_DISTANCE);
        let half_fov = (self.fov_y_deg.to_radians() * 0.5).max(1.0e-3);

        self.target = bounds.center();
        self.distance = (radius / half_fov.sin() * 1.1).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
        self.near = (self.distance - radius * 2.0).max(self.distance * 1.0e-3);
        self.far = self.distance + radius * 4.0;
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: glam::Vec3::ZERO,
            distance: 5.0,
            yaw_deg: 45.0,
            pitch_deg: 30.0,
            fov_y_deg: 75.0,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}
