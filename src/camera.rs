//! Free-fly camera driven by held movement keys and mouse motion.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Vector2, Vector3};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
    ];

    /// `(right, forward)` components in the camera's own frame.
    pub fn unit(self) -> Vector2<f32> {
        match self {
            Direction::Forward => Vector2::new(0.0, 1.0),
            Direction::Backward => Vector2::new(0.0, -1.0),
            Direction::Left => Vector2::new(-1.0, 0.0),
            Direction::Right => Vector2::new(1.0, 0.0),
        }
    }
}

fn world_up() -> Vector3<f32> {
    Vector3::unit_y()
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    yaw: Deg<f32>,
    pitch: Deg<f32>,
    pub speed: f32,
    pub sensitivity: f32,
    front: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
}

impl Camera {
    const PITCH_LIMIT: f32 = 89.0;

    pub fn new(position: impl Into<Point3<f32>>, yaw: Deg<f32>, pitch: Deg<f32>) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw,
            pitch,
            speed: 2.5,
            sensitivity: 0.1,
            front: Vector3::new(0.0, 0.0, -1.0),
            right: Vector3::new(1.0, 0.0, 0.0),
            up: world_up(),
        };
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn pitch(&self) -> Deg<f32> {
        self.pitch
    }

    pub fn advance(&mut self, direction: Direction, dt: f32) {
        let velocity = self.speed * dt;
        let unit = direction.unit();
        self.position += (self.front * unit.y + self.right * unit.x) * velocity;
    }

    /// Applies a mouse delta; y grows upwards.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw = Deg(self.yaw.0 + dx * self.sensitivity);
        self.pitch = Deg((self.pitch.0 + dy * self.sensitivity)
            .clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT));
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    fn update_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = cgmath::Rad::from(self.yaw).0.sin_cos();
        let (pitch_sin, pitch_cos) = cgmath::Rad::from(self.pitch).0.sin_cos();
        self.front = Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(world_up()).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 1.5, 10.0), Deg(-90.0), Deg(0.0))
    }
}

/// cgmath builds OpenGL clip space with depth in -1..1; wgpu wants 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Copy, Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy: Deg<f32>, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}
