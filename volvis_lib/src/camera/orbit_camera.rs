use nalgebra::{matrix, vector, Matrix3, Matrix4, Point3, Rotation3, Vector3};

/// Vertical field of view, in degrees
pub const FOV_Y: f32 = 45.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

pub const DEFAULT_ZOOM: f32 = 2.5;
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 10.0;

/// Degrees of rotation per dragged pixel
pub const DRAG_SENSITIVITY: f32 = 0.5;
/// Zoom change per wheel unit
pub const WHEEL_SENSITIVITY: f32 = 0.01;

/// Which axis rotation is applied to the object first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationOrder {
    /// `Ry * Rx`
    #[default]
    XFirst,
    /// `Rx * Ry`, the object spins around its own Y axis
    YFirst,
}

/// Camera orbiting the origin.
///
/// The object is rotated around both axes in `order` (X first unless set), and
/// pushed `zoom` units along the viewing axis. Eye space is left-handed: x right, y up, camera at
/// the origin looking down +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Rotation around the X axis, in degrees
    pub rotation_x: f32,
    /// Rotation around the Y axis, in degrees
    pub rotation_y: f32,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    order: RotationOrder,
}

impl OrbitCamera {
    pub fn new(rotation_x: f32, rotation_y: f32, zoom: f32) -> OrbitCamera {
        OrbitCamera {
            rotation_x,
            rotation_y,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            order: RotationOrder::XFirst,
        }
    }

    pub fn with_rotation_order(mut self, order: RotationOrder) -> OrbitCamera {
        self.order = order;
        self
    }

    pub fn rotation_order(&self) -> RotationOrder {
        self.order
    }

    /// Camera with a custom zoom range
    pub fn with_zoom_limits(mut self, min_zoom: f32, max_zoom: f32) -> OrbitCamera {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
        self
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set distance from the origin, clamped into the zoom range
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Back to the initial view, zoom limits and rotation order are kept
    pub fn reset(&mut self) {
        self.rotation_x = 0.0;
        self.rotation_y = 0.0;
        self.zoom = DEFAULT_ZOOM.clamp(self.min_zoom, self.max_zoom);
    }

    /// Mouse drag by `dx`, `dy` pixels
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.rotation_y += dx * DRAG_SENSITIVITY;
        self.rotation_x += dy * DRAG_SENSITIVITY;
    }

    /// Mouse wheel, positive delta moves away
    pub fn wheel(&mut self, delta: f32) {
        self.set_zoom(self.zoom + delta * WHEEL_SENSITIVITY);
    }

    /// Rotation part of the model-view transform
    pub fn rotation(&self) -> Matrix3<f32> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), self.rotation_x.to_radians());
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation_y.to_radians());
        match self.order {
            RotationOrder::XFirst => (ry * rx).into_inner(),
            RotationOrder::YFirst => (rx * ry).into_inner(),
        }
    }

    /// Object space (after scaling) to eye space
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let mut view = self.rotation().to_homogeneous();
        view[(2, 3)] = self.zoom;
        view
    }

    /// Left-handed perspective projection, eye-space depth ends up in `w`
    pub fn projection(aspect: f32) -> Matrix4<f32> {
        let f = 1.0 / f32::tan(0.5 * FOV_Y.to_radians());
        let aspect = if aspect > 0.0 { aspect } else { 1.0 };
        let depth_a = (FAR + NEAR) / (FAR - NEAR);
        let depth_b = -2.0 * FAR * NEAR / (FAR - NEAR);
        matrix![
            f / aspect, 0.0, 0.0, 0.0;
            0.0, f, 0.0, 0.0;
            0.0, 0.0, depth_a, depth_b;
            0.0, 0.0, 1.0, 0.0
        ]
    }

    /// Model-view-projection matrix for geometry in unscaled object space
    pub fn mvp(&self, aspect: f32, scale: Vector3<f32>) -> Matrix4<f32> {
        Self::projection(aspect) * self.view_matrix() * Matrix4::new_nonuniform_scaling(&scale)
    }

    /// Rotate a point without translating it
    pub fn rotate_point(&self, p: &Point3<f32>) -> Point3<f32> {
        Point3::from(self.rotation() * p.coords)
    }

    /// Distance along the viewing axis of a point in scaled object space
    pub fn eye_depth(&self, p: &Point3<f32>) -> f32 {
        self.rotate_point(p).z + self.zoom
    }

    /// Unit viewing direction expressed in (scaled) object space
    pub fn view_direction(&self) -> Vector3<f32> {
        self.rotation().transpose() * vector![0.0, 0.0, 1.0]
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        OrbitCamera::new(0.0, 0.0, DEFAULT_ZOOM)
    }
}

#[cfg(test)]
mod test {
    use nalgebra::{point, vector, Vector4};

    use super::*;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).norm() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn default_looks_down_z() {
        let cam = OrbitCamera::default();
        assert_close(cam.view_direction(), vector![0.0, 0.0, 1.0]);
        assert_eq!(cam.eye_depth(&point![0.0, 0.0, 0.5]), 3.0);
        assert_eq!(cam.eye_depth(&point![0.0, 0.0, -0.5]), 2.0);
    }

    #[test]
    fn rotation_order() {
        // X first, then Y
        let cam = OrbitCamera::new(90.0, 90.0, DEFAULT_ZOOM);
        let p = cam.rotate_point(&point![0.0, 1.0, 0.0]);
        // Rx(90) maps +Y to +Z, Ry(90) maps +Z to +X
        assert_close(p.coords, vector![1.0, 0.0, 0.0]);
    }

    #[test]
    fn y_first_order() {
        let cam = OrbitCamera::new(90.0, 90.0, DEFAULT_ZOOM)
            .with_rotation_order(RotationOrder::YFirst);
        // Ry(90) keeps +Y, Rx(90) maps +Y to +Z
        let p = cam.rotate_point(&point![0.0, 1.0, 0.0]);
        assert_close(p.coords, vector![0.0, 0.0, 1.0]);
        // Ry(90) maps +X to -Z, Rx(90) maps -Z to +Y
        let q = cam.rotate_point(&point![1.0, 0.0, 0.0]);
        assert_close(q.coords, vector![0.0, 1.0, 0.0]);

        let mut reset = cam;
        reset.reset();
        assert_eq!(reset.rotation_order(), RotationOrder::YFirst);

        // depth still grows one to one along the view direction
        let p = point![0.1, 0.2, 0.3];
        let q = p + cam.view_direction() * 0.5;
        assert!((cam.eye_depth(&q) - cam.eye_depth(&p) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn view_direction_matches_depth() {
        let cam = OrbitCamera::new(25.0, -40.0, 3.0);
        let dir = cam.view_direction();
        // moving along the view direction increases eye depth one to one
        let p = point![0.1, 0.2, 0.3];
        let q = p + dir * 0.5;
        assert!((cam.eye_depth(&q) - cam.eye_depth(&p) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.set_zoom(100.0);
        assert_eq!(cam.zoom(), MAX_ZOOM);
        cam.wheel(-10_000.0);
        assert_eq!(cam.zoom(), MIN_ZOOM);
        cam.set_zoom(f32::NAN);
        assert_eq!(cam.zoom(), MIN_ZOOM);
        cam.drag(10.0, 4.0);
        assert_eq!(cam.rotation_y, 5.0);
        assert_eq!(cam.rotation_x, 2.0);
        cam.reset();
        assert_eq!(cam, OrbitCamera::default());
    }

    #[test]
    fn projection_depth_range() {
        let proj = OrbitCamera::projection(1.0);
        let near = proj * Vector4::new(0.0, 0.0, NEAR, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, FAR, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
        assert_eq!(near.w, NEAR);
    }
}
