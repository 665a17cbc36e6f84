use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use cgmath::Point2;
use cube_scene::{
    Dimensions, HeadlessSurface, SceneApp,
    clock::Clock,
    config::SceneConfig,
    input::{InputEvent, PointerButton},
    settings::Settings,
};
use web_time::Duration;

const EPSILON: f32 = 1e-4;

fn app() -> SceneApp<HeadlessSurface> {
    SceneApp::new(
        HeadlessSurface::default(),
        &SceneConfig::default(),
        &Settings::default(),
    )
    .unwrap()
}

fn clock_at(secs: f32) -> Clock {
    let mut clock = Clock::manual();
    clock.set_elapsed(Duration::from_secs_f32(secs));
    clock
}

#[test]
fn cube_follows_elapsed_time() {
    let mut app = app();
    app.step(&clock_at(0.0)).unwrap();
    let transform = app.graph.cube.transform;
    assert!(transform.rotation.y.abs() < EPSILON);
    assert!((transform.position.y - 0.5).abs() < EPSILON);

    app.step(&clock_at(FRAC_PI_2)).unwrap();
    let transform = app.graph.cube.transform;
    assert!((transform.position.y - 1.0).abs() < EPSILON);
    assert!((transform.rotation.y - FRAC_PI_2 * FRAC_PI_3).abs() < EPSILON);
    assert_eq!(app.renderer.frames_rendered(), 2);
}

#[test]
fn disabled_animation_freezes_at_last_value() {
    let mut app = app();
    app.step(&clock_at(1.0)).unwrap();
    let frozen = app.graph.cube.transform;

    app.animation.enabled = false;
    app.step(&clock_at(2.0)).unwrap();
    app.step(&clock_at(3.0)).unwrap();
    assert_eq!(app.graph.cube.transform, frozen);
    assert_eq!(app.renderer.frames_rendered(), 3);

    app.animation.enabled = true;
    app.step(&clock_at(2.0)).unwrap();
    assert_ne!(app.graph.cube.transform, frozen);
}

#[test]
fn paused_scene_still_renders_and_orbits() {
    let mut app = app();
    app.step(&clock_at(0.5)).unwrap();
    let frozen = app.graph.cube.transform;
    let eye = app.camera.position;

    app.animation.play = false;
    app.camera_controls.auto_rotate = true;
    for frame in 0..10_u8 {
        app.step(&clock_at(1.0 + f32::from(frame))).unwrap();
    }
    assert_eq!(app.graph.cube.transform, frozen);
    assert_ne!(app.camera.position, eye);
    assert_eq!(app.renderer.frames_rendered(), 11);
}

#[test]
fn resize_updates_camera_aspect() {
    let mut app = app();
    app.renderer.set_display_size(Dimensions {
        width: 400,
        height: 400,
    });
    app.step(&clock_at(0.0)).unwrap();
    assert!((app.camera.aspect - 1.0).abs() < EPSILON);
    let frame = app.renderer.last_frame().unwrap();
    assert!((frame.camera_aspect - 1.0).abs() < EPSILON);
}

#[test]
fn dragging_the_cube_pauses_animation() {
    let mut app = app();
    app.drag_controls.enabled = true;
    app.step(&clock_at(0.0)).unwrap();

    let center = Point2::new(0.0, 0.0);
    app.push_input(InputEvent::PointerMoved { position: center });
    app.push_input(InputEvent::PointerPressed {
        button: PointerButton::Primary,
        position: center,
    });
    app.step(&clock_at(0.5)).unwrap();
    assert!(app.drag_controls.is_dragging());
    assert!(!app.animation.play);
    assert!(!app.camera_controls.enabled);

    app.push_input(InputEvent::PointerReleased {
        button: PointerButton::Primary,
        position: center,
    });
    app.step(&clock_at(1.0)).unwrap();
    assert!(!app.drag_controls.is_dragging());
    assert!(app.animation.play);
    assert!(app.camera_controls.enabled);
}

#[test]
fn pressing_beside_the_cube_orbits_instead() {
    let mut app = app();
    app.drag_controls.enabled = true;
    app.step(&clock_at(0.0)).unwrap();

    let corner = Point2::new(0.9, 0.9);
    app.push_input(InputEvent::PointerPressed {
        button: PointerButton::Primary,
        position: corner,
    });
    app.step(&clock_at(0.0)).unwrap();
    assert!(!app.drag_controls.is_dragging());
    assert!(app.camera_controls.is_rotating());
    assert!(app.animation.play);
}

#[test]
fn stepping_after_dispose_draws_nothing() {
    let mut app = app();
    app.step(&clock_at(0.0)).unwrap();
    app.dispose();
    app.step(&clock_at(1.0)).unwrap();
    let frame = app.renderer.last_frame().unwrap();
    assert!(frame.drawn.is_empty());
    assert_eq!(app.renderer.live_geometry_count(), 0);
}
