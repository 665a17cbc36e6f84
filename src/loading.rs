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
use log::{error, info};

pub type StartHook = Box<dyn FnMut(&str, usize, usize)>;
pub type ProgressHook = Box<dyn FnMut(&str, usize, usize)>;
pub type LoadHook = Box<dyn FnMut()>;
pub type ErrorHook = Box<dyn FnMut(&str, &anyhow::Error)>;

/// Callbacks fired while items load. Advisory only: nothing here stops the loop.
pub struct LoadingHooks {
    pub on_start: StartHook,
    pub on_progress: ProgressHook,
    pub on_load: LoadHook,
    pub on_error: ErrorHook,
}

impl Default for LoadingHooks {
    fn default() -> Self {
        Self {
            on_start: Box::new(|url, _, _| info!("Loading started with {url}")),
            on_progress: Box::new(|url, loaded, total| {
                info!("Loading in progress: {url} -> {loaded} / {total}");
            }),
            on_load: Box::new(|| info!("Loaded!")),
            on_error: Box::new(|url, err| error!("Error while loading {url}: {err:#}")),
        }
    }
}

/// Counts items in flight and reports through [`LoadingHooks`].
#[derive(Default)]
pub struct LoadingManager {
    hooks: LoadingHooks,
    items_loaded: usize,
    items_total: usize,
    is_loading: bool,
}

impl LoadingManager {
    #[must_use]
    pub fn with_hooks(hooks: LoadingHooks) -> Self {
        Self {
            hooks,
            items_loaded: 0,
            items_total: 0,
            is_loading: false,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.items_loaded, self.items_total)
    }

    pub fn item_start(&mut self, url: &str) {
        self.items_total += 1;
        if !self.is_loading {
            (self.hooks.on_start)(url, self.items_loaded, self.items_total);
        }
        self.is_loading = true;
    }

    pub fn item_end(&mut self, url: &str) {
        self.items_loaded += 1;
        (self.hooks.on_progress)(url, self.items_loaded, self.items_total);
        if self.items_loaded == self.items_total {
            self.is_loading = false;
            (self.hooks.on_load)();
        }
    }

    pub fn item_error(&mut self, url: &str, err: &anyhow::Error) {
        (self.hooks.on_error)(url, err);
    }

    /// Runs `loader` as one tracked item. A failure goes to the error hook and yields `None`.
    pub fn load<T, F>(&mut self, url: &str, loader: F) -> Option<T>
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        self.item_start(url);
        let result = match loader() {
            Ok(value) => Some(value),
            Err(err) => {
                self.item_error(url, &err);
                None
            }
        };
        self.item_end(url);
        result
    }
}
