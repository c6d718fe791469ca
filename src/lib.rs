//! Core of a skinned retro audio player: the real-time playback engine and
//! the minimal skin-archive reader. Window creation, sprite blitting and
//! event polling live behind the draw-list/input-event boundary in
//! [`session`].

pub mod audio;
pub mod error;
pub mod session;
pub mod skin;

pub use audio::engine::{PlayerEngine, SharedPlayback};
pub use audio::mixer::fill_output;
pub use audio::stream::AudioStream;
pub use error::PlayerError;
pub use session::{InputEvent, PlayerSession};
pub use skin::archive::Archive;
pub use skin::assets::AssetSource;
pub use skin::bundle::{DrawCmd, DrawTarget, SkinBundle};
