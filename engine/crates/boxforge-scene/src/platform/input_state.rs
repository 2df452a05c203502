/// 记录输入信息
#[derive(Default, Clone, Debug)]
pub struct InputState {
    /// 当前帧的鼠标位置 pixel
    pub crt_mouse_pos: [f64; 2],
    /// 上一帧的鼠标位置 pixel
    pub last_mouse_pos: [f64; 2],
    pub left_button_pressed: bool,
    pub right_button_pressed: bool,
    /// 本帧滚轮增量，向前为正
    pub scroll_delta: f32,
}

impl InputState {
    /// 获取鼠标位置变化
    pub fn get_mouse_delta(&self) -> [f64; 2] {
        [
            self.crt_mouse_pos[0] - self.last_mouse_pos[0],
            self.crt_mouse_pos[1] - self.last_mouse_pos[1],
        ]
    }

    /// 帧末调用，清除本帧的增量
    pub fn end_frame(&mut self) {
        self.last_mouse_pos = self.crt_mouse_pos;
        self.scroll_delta = 0.0;
    }
}
