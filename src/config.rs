/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
use std::{env, path::PathBuf};

use cgmath::{Point3, Vector3};
use log::warn;

use crate::color::Color;

const ENV_HEADLESS: &str = "HEADLESS";
const ENV_SETTINGS: &str = "CUBE_SCENE_SETTINGS";
const ENV_HEADLESS_FRAMES: &str = "CUBE_SCENE_HEADLESS_FRAMES";

/// Fixed scene layout: camera, lights and initial control state.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub camera_fov: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub camera_position: Point3<f32>,
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub point_light_color: Color,
    pub point_light_intensity: f32,
    pub point_light_distance: f32,
    pub point_light_position: Vector3<f32>,
    pub point_light_helper_color: Color,
    pub orbit_damping: bool,
}

impl SceneConfig {
    pub const CAMERA_FOV: f32 = 75.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1_000.0;
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera_fov: Self::CAMERA_FOV,
            camera_near: Self::CAMERA_NEAR,
            camera_far: Self::CAMERA_FAR,
            camera_position: Point3::new(2.0, 2.0, 5.0),
            ambient_color: Color::WHITE,
            ambient_intensity: 0.4,
            point_light_color: Color::WHITE,
            point_light_intensity: 20.0,
            point_light_distance: 100.0,
            point_light_position: Vector3::new(-2.0, 2.0, 2.0),
            point_light_helper_color: Color::ORANGE,
            orbit_damping: true,
        }
    }
}

/// Process-level options read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    pub headless: bool,
    pub settings_path: PathBuf,
    pub headless_frames: usize,
}

impl LaunchConfig {
    pub const DEFAULT_SETTINGS_FILE: &'static str = "cube-scene-settings.json";
    pub const DEFAULT_HEADLESS_FRAMES: usize = 120;

    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let headless_frames = match lookup(ENV_HEADLESS_FRAMES) {
            None => Self::DEFAULT_HEADLESS_FRAMES,
            Some(value) => value.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring {ENV_HEADLESS_FRAMES}={value:?}, not a frame count");
                Self::DEFAULT_HEADLESS_FRAMES
            }),
        };
        Self {
            headless: lookup(ENV_HEADLESS).is_some(),
            settings_path: lookup(ENV_SETTINGS)
                .map_or_else(|| PathBuf::from(Self::DEFAULT_SETTINGS_FILE), PathBuf::from),
            headless_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> LaunchConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        LaunchConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert!(!config.headless);
        assert_eq!(
            config.settings_path,
            PathBuf::from(LaunchConfig::DEFAULT_SETTINGS_FILE)
        );
        assert_eq!(config.headless_frames, LaunchConfig::DEFAULT_HEADLESS_FRAMES);
    }

    #[test]
    fn environment_overrides() {
        let config = config_from(&[
            (ENV_HEADLESS, "true"),
            (ENV_SETTINGS, "/tmp/panel.json"),
            (ENV_HEADLESS_FRAMES, "3"),
        ]);
        assert!(config.headless);
        assert_eq!(config.settings_path, PathBuf::from("/tmp/panel.json"));
        assert_eq!(config.headless_frames, 3);
    }

    #[test]
    fn bad_frame_count_falls_back() {
        let config = config_from(&[(ENV_HEADLESS_FRAMES, "lots")]);
        assert_eq!(config.headless_frames, LaunchConfig::DEFAULT_HEADLESS_FRAMES);
    }
}
