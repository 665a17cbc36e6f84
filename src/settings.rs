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
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{color::Color, loading::LoadingManager, objects};

/// Everything the debug panel edits, as persisted between sessions.
///
/// Missing fields take their default value, so older files still load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cube: CubeSettings,
    pub animated: bool,
    pub auto_rotate: bool,
    pub drag_controls: bool,
    pub point_light_visible: bool,
    pub ambient_light_visible: bool,
    pub axes_visible: bool,
    pub point_light_helper_visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeSettings {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub wireframe: bool,
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for CubeSettings {
    fn default() -> Self {
        Self {
            position: [0.0, objects::CUBE_REST_HEIGHT, 0.0],
            rotation: [0.0; 3],
            wireframe: false,
            color: objects::CUBE_COLOR,
            metalness: objects::CUBE_METALNESS,
            roughness: objects::CUBE_ROUGHNESS,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cube: CubeSettings::default(),
            animated: true,
            auto_rotate: false,
            drag_controls: false,
            point_light_visible: true,
            ambient_light_visible: true,
            axes_visible: false,
            point_light_helper_visible: false,
        }
    }
}

impl Settings {
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("Cannot serialize settings")
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Malformed settings")
    }
}

/// File-backed storage for [`Settings`].
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored settings. A missing file yields `None` silently; a
    /// malformed one is reported through the loading manager's error hook.
    pub fn load(&self, loading: &mut LoadingManager) -> Option<Settings> {
        if !self.path.exists() {
            debug!("No settings stored at {}", self.path.display());
            return None;
        }
        let url = self.path.display().to_string();
        loading.load(&url, || {
            let json = fs::read_to_string(&self.path)
                .with_context(|| format!("Cannot read {url}"))?;
            Settings::from_json(&json)
        })
    }

    pub fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        fs::write(&self.path, settings.to_json()?)
            .with_context(|| format!("Cannot write {}", self.path.display()))?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }

    /// Forgets the stored settings. Clearing an empty store is fine.
    pub fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Settings reset, removed {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Cannot remove {}", self.path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customized() -> Settings {
        Settings {
            cube: CubeSettings {
                position: [1.5, 2.0, -0.5],
                rotation: [0.0, 0.0, std::f32::consts::FRAC_PI_4],
                wireframe: true,
                color: Color::from_rgb8(0x12, 0x34, 0x56),
                metalness: 0.1,
                roughness: 0.9,
            },
            animated: false,
            auto_rotate: true,
            drag_controls: true,
            axes_visible: true,
            ..Settings::default()
        }
    }

    #[test]
    fn json_keeps_every_field() {
        let settings = customized();
        let json = settings.to_json().unwrap();
        assert!(json.contains("\"#123456\""));
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"animated": false}"#).unwrap();
        assert!(!settings.animated);
        assert_eq!(settings.cube, CubeSettings::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Settings::from_json("{ not json").is_err());
        assert!(Settings::from_json(r#"{"cube": {"color": "chartreuse-ish"}}"#).is_err());
    }

    #[test]
    fn store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let mut loading = LoadingManager::default();
        assert_eq!(store.load(&mut loading), None);

        store.save(&customized()).unwrap();
        assert_eq!(store.load(&mut loading), Some(customized()));

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(&mut loading), None);
    }

    #[test]
    fn malformed_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2").unwrap();
        let store = SettingsStore::new(path);
        assert_eq!(store.load(&mut LoadingManager::default()), None);
    }
}
