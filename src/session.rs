use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::audio::engine::PlayerEngine;
use crate::error::PlayerError;
use crate::skin::archive::Archive;
use crate::skin::assets::AssetSource;
use crate::skin::bundle::{ButtonKind, DrawCmd, SkinBundle, SliderId};

/// Pointer and drop events as reported by the input source. Coordinates are
/// window-relative pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },
    PointerMove { x: i32, y: i32 },
    DropFile(PathBuf),
}

/// Control-thread context: the audio engine plus the active skin. The
/// windowing layer feeds events in and pulls a draw list out each frame; it
/// never talks to the engine or archive directly.
pub struct PlayerSession {
    engine: PlayerEngine,
    skin: SkinBundle,
}

impl PlayerSession {
    pub fn new(engine: PlayerEngine) -> Self {
        Self {
            engine,
            skin: SkinBundle::empty(),
        }
    }

    pub fn engine(&self) -> &PlayerEngine {
        &self.engine
    }

    pub fn skin(&self) -> &SkinBundle {
        &self.skin
    }

    /// Per-frame draw list for the rendering surface.
    pub fn draw_list(&self) -> Vec<DrawCmd> {
        self.skin.draw_list()
    }

    /// Routes one input event. Errors from loads are logged and swallowed
    /// here; prior playback/skin state stays as the failure policy left it.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y } => {
                if let Some((slider, value)) = self.skin.pointer_down(x, y) {
                    self.apply_slider(slider, value);
                }
            }
            InputEvent::PointerMove { x, y } => {
                if let Some((slider, value)) = self.skin.pointer_move(x, y) {
                    self.apply_slider(slider, value);
                }
            }
            InputEvent::PointerUp { x, y } => {
                if let Some(action) = self.skin.pointer_up(x, y) {
                    self.dispatch_button(action);
                }
            }
            InputEvent::DropFile(path) => {
                let result = if is_skin_path(&path) {
                    self.reload_skin(&path)
                } else {
                    self.load_track(&path)
                };
                if let Err(e) = result {
                    warn!("Dropped file {} rejected: {e}", path.display());
                }
            }
        }
    }

    /// Replaces the skin from a `.wsz`/`.zip` bundle. If the archive cannot
    /// be opened the current skin is kept; individual missing assets inside
    /// a valid bundle degrade to placeholders.
    pub fn reload_skin(&mut self, path: &Path) -> Result<(), PlayerError> {
        let archive = Archive::open(path)?;
        let source = AssetSource::Bundle(archive);
        self.skin = SkinBundle::load(
            &source,
            self.skin.slider_value(SliderId::Volume),
            self.skin.slider_value(SliderId::Balance),
        );
        info!("Skin reloaded from {}", path.display());
        Ok(())
    }

    /// Loads a dropped audio file through the directory asset source.
    pub fn load_track(&mut self, path: &Path) -> Result<(), PlayerError> {
        let (dir, name) = split_path(path)?;
        self.engine.load(&AssetSource::Directory(dir), &name)
    }

    fn dispatch_button(&mut self, action: ButtonKind) {
        match action {
            ButtonKind::Previous => {
                if let Err(e) = self.engine.restart() {
                    warn!("Restart failed: {e}");
                }
            }
            ButtonKind::Pause => self.engine.toggle_pause(),
            ButtonKind::Stop => self.engine.stop(),
            // Play/Next/Eject need a playlist concept this player does not
            // have; their widgets exist for skin fidelity only.
            ButtonKind::Play | ButtonKind::Next | ButtonKind::Eject => {}
        }
    }

    fn apply_slider(&mut self, slider: SliderId, value: f32) {
        match slider {
            SliderId::Volume => self.engine.set_volume(value),
            SliderId::Balance => self.engine.set_balance(value),
        }
    }
}

/// `.wsz` and `.zip` drops are skin bundles; anything else is treated as a
/// track to play.
fn is_skin_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wsz") || ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

fn split_path(path: &Path) -> Result<(PathBuf, String), PlayerError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PlayerError::NotFound(path.display().to_string()))?
        .to_string();
    let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    Ok((dir, name))
}
