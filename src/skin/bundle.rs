use image::RgbaImage;
use log::warn;

use crate::skin::assets::AssetSource;

/// Classic skin window size; the main background covers it edge to edge.
pub const WINDOW_WIDTH: i32 = 275;
pub const WINDOW_HEIGHT: i32 = 116;

const PLACEHOLDER_IDLE: [u8; 4] = [255, 0, 0, 255];
const PLACEHOLDER_PRESSED: [u8; 4] = [0, 0, 255, 255];
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// Which decoded skin image a draw command samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureKind {
    Main,
    Buttons,
    Volume,
    Balance,
}

/// One item of the per-frame draw list handed to the rendering surface:
/// either a sub-rect of a skin texture or a solid placeholder color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawTarget {
    Texture { kind: TextureKind, src: Rect },
    Solid([u8; 4]),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCmd {
    pub target: DrawTarget,
    pub dst: Rect,
}

/// The closed set of control-button actions; dispatch is a match on this
/// tag, not an indirect call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonKind {
    Previous,
    Play,
    Pause,
    Stop,
    Next,
    Eject,
}

#[derive(Clone, Copy, Debug)]
struct Button {
    kind: ButtonKind,
    src_unpressed: Rect,
    src_pressed: Rect,
    dst: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliderId {
    Volume,
    Balance,
}

/// Slider geometry: a track rect drawn from a frame strip plus a draggable
/// knob whose x position encodes the value.
#[derive(Clone, Copy, Debug)]
struct Slider {
    id: SliderId,
    texture: TextureKind,
    dst: Rect,
    knob_w: i32,
    knob_h: i32,
    knob_src_unpressed: Rect,
    knob_src_pressed: Rect,
    frame_x_offset: i32,
    frame_y_offset: i32,
    frame_h: i32,
    num_frames: i32,
    value: f32,
}

impl Slider {
    fn knob_rect(&self) -> Rect {
        let travel = (self.dst.w - self.knob_w) as f32;
        let x = self.dst.x + (travel * self.value + 0.5) as i32;
        Rect::new(x, self.dst.y, self.knob_w, self.knob_h)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pressed {
    Button(usize),
    Knob(usize),
}

/// Decoded skin assets plus derived widget geometry, rebuilt wholesale on
/// each skin load. Every texture is independently optional; a widget with no
/// texture draws as a solid placeholder instead of aborting the skin.
pub struct SkinBundle {
    main: Option<RgbaImage>,
    buttons_tex: Option<RgbaImage>,
    volume_tex: Option<RgbaImage>,
    balance_tex: Option<RgbaImage>,
    buttons: [Button; 6],
    sliders: [Slider; 2],
    pressed: Option<Pressed>,
}

impl SkinBundle {
    /// A bundle with geometry but no textures; everything renders as solid
    /// placeholders until a skin is loaded.
    pub fn empty() -> Self {
        Self::build(None, None, None, None, 1.0, 0.5)
    }

    /// Loads the four skin bitmaps from `source`, keeping whatever decodes.
    /// Current slider values survive the reload so a skin swap does not jump
    /// the gains.
    pub fn load(source: &AssetSource, volume: f32, balance: f32) -> Self {
        Self::build(
            load_texture(source, "MAIN.BMP"),
            load_texture(source, "CBUTTONS.BMP"),
            load_texture(source, "VOLUME.BMP"),
            load_texture(source, "BALANCE.BMP"),
            volume,
            balance,
        )
    }

    fn build(
        main: Option<RgbaImage>,
        buttons_tex: Option<RgbaImage>,
        volume_tex: Option<RgbaImage>,
        balance_tex: Option<RgbaImage>,
        volume: f32,
        balance: f32,
    ) -> Self {
        // Sprite-sheet coordinates follow the classic skin layout: a row of
        // unpressed button faces at y=0 and their pressed faces at y=18.
        let button = |kind, w, h, dx, dy, sx, sy_pressed_h: i32| Button {
            kind,
            src_unpressed: Rect::new(sx, 0, w, h),
            src_pressed: Rect::new(sx, sy_pressed_h, w, h),
            dst: Rect::new(dx, dy, w, h),
        };
        let buttons = [
            button(ButtonKind::Previous, 23, 18, 16, 88, 0, 18),
            button(ButtonKind::Play, 23, 18, 39, 88, 23, 18),
            button(ButtonKind::Pause, 23, 18, 62, 88, 46, 18),
            button(ButtonKind::Stop, 23, 18, 85, 88, 69, 18),
            button(ButtonKind::Next, 22, 18, 108, 88, 92, 18),
            button(ButtonKind::Eject, 22, 16, 136, 89, 114, 16),
        ];

        let slider = |id, texture, w, dx, frame_x_offset, value| Slider {
            id,
            texture,
            dst: Rect::new(dx, 57, w, 13),
            knob_w: 14,
            knob_h: 11,
            knob_src_unpressed: Rect::new(15, 422, 14, 11),
            knob_src_pressed: Rect::new(0, 422, 14, 11),
            frame_x_offset,
            frame_y_offset: 0,
            frame_h: 15,
            num_frames: 28,
            value,
        };
        let sliders = [
            slider(SliderId::Volume, TextureKind::Volume, 68, 107, 0, volume),
            slider(SliderId::Balance, TextureKind::Balance, 38, 177, 9, balance),
        ];

        Self {
            main,
            buttons_tex,
            volume_tex,
            balance_tex,
            buttons,
            sliders,
            pressed: None,
        }
    }

    pub fn texture(&self, kind: TextureKind) -> Option<&RgbaImage> {
        match kind {
            TextureKind::Main => self.main.as_ref(),
            TextureKind::Buttons => self.buttons_tex.as_ref(),
            TextureKind::Volume => self.volume_tex.as_ref(),
            TextureKind::Balance => self.balance_tex.as_ref(),
        }
    }

    pub fn slider_value(&self, id: SliderId) -> f32 {
        self.sliders
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.value)
            .unwrap_or(0.0)
    }

    /// Begins a press on whatever widget is under the pointer. Buttons win
    /// over slider tracks. Grabbing a slider jumps the knob to the pointer,
    /// so the new value is returned just like a drag.
    pub fn pointer_down(&mut self, x: i32, y: i32) -> Option<(SliderId, f32)> {
        if self.pressed.is_some() {
            return None;
        }
        if let Some(i) = self.buttons.iter().position(|b| b.dst.contains(x, y)) {
            self.pressed = Some(Pressed::Button(i));
            return None;
        }
        if let Some(i) = self.sliders.iter().position(|s| s.dst.contains(x, y)) {
            self.pressed = Some(Pressed::Knob(i));
            return Some(self.drag_slider(i, x));
        }
        None
    }

    /// Updates a dragged slider knob. Returns the slider and its new value
    /// when one changed, so the caller can forward it to the gain atomics.
    pub fn pointer_move(&mut self, x: i32, _y: i32) -> Option<(SliderId, f32)> {
        match self.pressed {
            Some(Pressed::Knob(i)) => Some(self.drag_slider(i, x)),
            _ => None,
        }
    }

    /// Ends a press. A button fires only if the pointer is released inside
    /// its rect.
    pub fn pointer_up(&mut self, x: i32, y: i32) -> Option<ButtonKind> {
        match self.pressed.take() {
            Some(Pressed::Button(i)) if self.buttons[i].dst.contains(x, y) => {
                Some(self.buttons[i].kind)
            }
            _ => None,
        }
    }

    fn drag_slider(&mut self, index: usize, x: i32) -> (SliderId, f32) {
        let slider = &mut self.sliders[index];
        let new_value = (x - slider.dst.x) as f32 / slider.dst.w as f32;
        slider.value = new_value.clamp(0.0, 1.0);
        (slider.id, slider.value)
    }

    /// Flat draw list for one frame: background, buttons, slider tracks and
    /// knobs, in paint order. Missing textures become solid placeholders.
    pub fn draw_list(&self) -> Vec<DrawCmd> {
        let mut cmds = Vec::with_capacity(2 + self.buttons.len() + self.sliders.len() * 2);

        let window = Rect::new(0, 0, WINDOW_WIDTH, WINDOW_HEIGHT);
        cmds.push(DrawCmd {
            target: match self.main {
                Some(_) => DrawTarget::Texture {
                    kind: TextureKind::Main,
                    src: window,
                },
                None => DrawTarget::Solid(BACKGROUND),
            },
            dst: window,
        });

        for (i, btn) in self.buttons.iter().enumerate() {
            let pressed = self.pressed == Some(Pressed::Button(i));
            cmds.push(DrawCmd {
                target: match self.buttons_tex {
                    Some(_) => DrawTarget::Texture {
                        kind: TextureKind::Buttons,
                        src: if pressed { btn.src_pressed } else { btn.src_unpressed },
                    },
                    None => DrawTarget::Solid(if pressed {
                        PLACEHOLDER_PRESSED
                    } else {
                        PLACEHOLDER_IDLE
                    }),
                },
                dst: btn.dst,
            });
        }

        for (i, slider) in self.sliders.iter().enumerate() {
            let has_texture = self.texture(slider.texture).is_some();
            cmds.push(DrawCmd {
                target: if has_texture {
                    // Pick the strip frame that matches the current value.
                    let frame = ((slider.num_frames - 1) as f32 * slider.value) as i32;
                    DrawTarget::Texture {
                        kind: slider.texture,
                        src: Rect::new(
                            slider.frame_x_offset,
                            slider.frame_y_offset + frame * slider.frame_h,
                            slider.dst.w,
                            slider.dst.h,
                        ),
                    }
                } else {
                    let tint = (slider.value * 255.0) as u8;
                    DrawTarget::Solid([200, 0, tint, 255])
                },
                dst: slider.dst,
            });

            let knob_pressed = self.pressed == Some(Pressed::Knob(i));
            cmds.push(DrawCmd {
                target: if has_texture {
                    DrawTarget::Texture {
                        kind: slider.texture,
                        src: if knob_pressed {
                            slider.knob_src_pressed
                        } else {
                            slider.knob_src_unpressed
                        },
                    }
                } else {
                    DrawTarget::Solid(if knob_pressed {
                        PLACEHOLDER_PRESSED
                    } else {
                        PLACEHOLDER_IDLE
                    })
                },
                dst: slider.knob_rect(),
            });
        }

        cmds
    }
}

fn load_texture(source: &AssetSource, name: &str) -> Option<RgbaImage> {
    let bytes = match source.resolve(name) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Skin asset {name} unavailable: {e}");
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(decoded) => Some(decoded.to_rgba8()),
        Err(e) => {
            warn!("Skin asset {name} failed to decode: {e}");
            None
        }
    }
}
