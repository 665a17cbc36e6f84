/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

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

use log::{info, warn};
use pollster::FutureExt;
use web_time::Duration;

use crate::{
    clock::Clock,
    config::{LaunchConfig, SceneConfig},
    loading::LoadingManager,
    renderer::WgpuSurface,
    scene::SceneApp,
    settings::SettingsStore,
    stats::FrameStats,
    surface::{HeadlessSurface, RenderSurface},
    window::run_event_loop,
};

const GLOBAL_LOG_FILTER: log::LevelFilter = log::LevelFilter::Info;
const HEADLESS_FRAME_TIME: Duration = Duration::from_micros(16_667);

/// Entry point of the binary: sets up logging then runs either the window or the headless driver.
pub fn launch_app() -> anyhow::Result<()> {
    init_log()?;
    info!("Init app");
    let launch = LaunchConfig::from_env();
    if launch.headless {
        info!("Running in headless mode");
        run_headless(&launch)
    } else {
        run_event_loop(launch)
    }
}

fn init_log() -> anyhow::Result<()> {
    use fern::colors::{Color, ColoredLevelConfig};
    let colors = ColoredLevelConfig::new()
        .info(Color::Blue)
        .debug(Color::Green);
    fern::Dispatch::new()
        .level(GLOBAL_LOG_FILTER)
        .level_for(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}:{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                colors.color(record.level()),
                record.target(),
                record.line().unwrap_or_default(),
                message
            ));
        })
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

/// Steps the scene on a fixed frame time without opening a window.
///
/// Frames are rendered offscreen through wgpu; without a usable adapter the
/// scene still runs against the recording surface.
fn run_headless(launch: &LaunchConfig) -> anyhow::Result<()> {
    match WgpuSurface::offscreen(HeadlessSurface::DEFAULT_SIZE).block_on() {
        Ok(renderer) => drive_headless(renderer, launch),
        Err(err) => {
            warn!("No offscreen renderer ({err:#}), recording frames only");
            drive_headless(HeadlessSurface::default(), launch)
        }
    }
}

fn drive_headless<R: RenderSurface>(renderer: R, launch: &LaunchConfig) -> anyhow::Result<()> {
    let store = SettingsStore::new(&launch.settings_path);
    let mut loading = LoadingManager::default();
    let settings = store.load(&mut loading).unwrap_or_default();
    let mut app = SceneApp::with_loading(renderer, &SceneConfig::default(), &settings, loading)?;
    let mut clock = Clock::manual();
    let mut stats = FrameStats::default();
    for _ in 0..launch.headless_frames {
        clock.advance(HEADLESS_FRAME_TIME);
        if let Some(rate) = stats.record(clock.delta()) {
            info!("{:.1} FPS", rate.fps);
        }
        app.step(&clock)?;
    }
    info!(
        "Stepped {} frames over {:.2}s",
        launch.headless_frames,
        clock.elapsed_secs()
    );
    app.dispose();
    Ok(())
}
