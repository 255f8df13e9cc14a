use abduction_scene::{
    camera::{Camera, Direction, Projection},
    flow::{Debounce, TOGGLE_DEBOUNCE, direction_for},
};
use cgmath::{Deg, Point3};
use instant::{Duration, Instant};
use winit::keyboard::KeyCode;

use crate::common::test_utils::assert_close;

mod common;

#[test]
fn default_camera_looks_down_negative_z() {
    let camera = Camera::default();
    let front = camera.front();
    assert_close(front.x, 0.0);
    assert_close(front.y, 0.0);
    assert_close(front.z, -1.0);
    assert_eq!(camera.position, Point3::new(0.0, 1.5, 10.0));
}

#[test]
fn movement_is_relative_to_the_view() {
    let mut camera = Camera::default();
    camera.advance(Direction::Forward, 1.0);
    assert_close(camera.position.z, 7.5);

    camera.advance(Direction::Left, 1.0);
    assert_close(camera.position.x, -2.5);

    camera.advance(Direction::Right, 2.0);
    camera.advance(Direction::Backward, 1.0);
    assert_close(camera.position.x, 2.5);
    assert_close(camera.position.z, 10.0);
    assert_close(camera.position.y, 1.5);
}

#[test]
fn opposite_directions_cancel() {
    for direction in Direction::ALL {
        let opposite = Direction::ALL
            .into_iter()
            .find(|d| d.unit() == -direction.unit())
            .unwrap();
        let mut camera = Camera::default();
        camera.advance(direction, 0.4);
        camera.advance(opposite, 0.4);
        assert_close(camera.position.x, 0.0);
        assert_close(camera.position.z, 10.0);
    }
}

#[test]
fn pitch_is_clamped() {
    let mut camera = Camera::default();
    camera.rotate(0.0, 10_000.0);
    assert_eq!(camera.pitch(), Deg(89.0));
    camera.rotate(0.0, -100_000.0);
    assert_eq!(camera.pitch(), Deg(-89.0));
}

#[test]
fn projection_survives_a_minimised_window() {
    let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);
    projection.resize(0, 0);
    let m = projection.matrix();
    assert!(m.x.x.is_finite() && m.y.y.is_finite());
}

#[test]
fn movement_keys_map_to_directions() {
    assert_eq!(direction_for(KeyCode::KeyW), Some(Direction::Forward));
    assert_eq!(direction_for(KeyCode::KeyS), Some(Direction::Backward));
    assert_eq!(direction_for(KeyCode::KeyA), Some(Direction::Left));
    assert_eq!(direction_for(KeyCode::KeyD), Some(Direction::Right));
    assert_eq!(direction_for(KeyCode::KeyH), None);
}

#[test]
fn toggles_inside_the_window_are_dropped() {
    let mut debounce = Debounce::new(TOGGLE_DEBOUNCE);
    let start = Instant::now();
    assert!(debounce.accept(start));
    assert!(!debounce.accept(start + Duration::from_millis(50)));
    assert!(debounce.accept(start + Duration::from_millis(150)));
    assert!(!debounce.accept(start + Duration::from_millis(200)));
}
