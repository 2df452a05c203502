use crate::platform::camera::OrbitCamera;
use crate::platform::input_state::InputState;

pub struct CameraController {
    camera: OrbitCamera,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            camera: OrbitCamera::default(),
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    /// 根据输入更新相机状态
    ///
    /// 左键拖动旋转，右键拖动平移，滚轮缩放。
    pub fn update(&mut self, input_state: &InputState, viewport_size: glam::Vec2, _delta_time: std::time::Duration) {
        if viewport_size.y > 0.0 {
            self.camera.set_aspect_ratio(viewport_size.x / viewport_size.y);
        }

        let mouse_delta = input_state.get_mouse_delta();
        if input_state.left_button_pressed {
            self.camera.rotate(-mouse_delta[0] as f32 / 4.0, mouse_delta[1] as f32 / 4.0);
        } else if input_state.right_button_pressed && viewport_size.y > 0.0 {
            // 一个像素对应 target 平面上的世界长度
            let world_per_pixel =
                2.0 * self.camera.distance * (self.camera.fov_y_deg.to_radians() * 0.5).tan() / viewport_size.y;
            self.camera.pan(-mouse_delta[0] as f32 * world_per_pixel, mouse_delta[1] as f32 * world_per_pixel);
        }

        if input_state.scroll_delta != 0.0 {
            self.camera.zoom(0.9_f32.powf(input_state.scroll_delta));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn scroll_forward_zooms_in() {
        let mut controller = CameraController::new();
        let before = controller.camera().distance;
        let input = InputState {
            scroll_delta: 1.0,
            ..Default::default()
        };
        controller.update(&input, glam::Vec2::new(800.0, 600.0), Duration::from_millis(16));
        assert!(controller.camera().distance < before);
        assert!((controller.camera().aspect_ratio - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn left_drag_rotates() {
        let mut controller = CameraController::new();
        let before = controller.camera().yaw_deg;
        let input = InputState {
            crt_mouse_pos: [40.0, 0.0],
            last_mouse_pos: [0.0, 0.0],
            left_button_pressed: true,
            ..Default::default()
        };
        controller.update(&input, glam::Vec2::new(800.0, 600.0), Duration::from_millis(16));
        assert_ne!(controller.camera().yaw_deg, before);
    }

    #[test]
    fn right_drag_pans_target() {
        let mut controller = CameraController::new();
        let input = InputState {
            crt_mouse_pos: [10.0, 10.0],
            last_mouse_pos: [0.0, 0.0],
            right_button_pressed: true,
            ..Default::default()
        };
        controller.update(&input, glam::Vec2::new(800.0, 600.0), Duration::from_millis(16));
        assert_ne!(controller.camera().target, glam::Vec3::ZERO);
    }
}
