mod orbit_camera;

pub use orbit_camera::{
    OrbitCamera, RotationOrder, DEFAULT_ZOOM, DRAG_SENSITIVITY, FAR, FOV_Y, MAX_ZOOM, MIN_ZOOM, NEAR,
    WHEEL_SENSITIVITY,
};
