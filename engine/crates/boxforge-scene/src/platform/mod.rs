pub mod camera;
pub mod camera_controller;
pub mod input_state;
