//! Where frames come from.
//!
//! The run loop never talks to the window directly: it asks a [`FrameHost`]
//! for the time, the keys pressed since the last frame, and a future that
//! resolves when the next frame may be drawn.

use std::future::Future;

use ::macroquad::prelude::KeyCode;

use crate::input::Key;

pub trait FrameHost {
    /// Seconds since the host started
    fn elapsed(&self) -> f64;

    /// Keys pressed since the previous call
    fn poll_keys(&mut self) -> Vec<Key>;

    /// Resolves once the current frame has been presented
    fn next_frame(&mut self) -> impl Future<Output = ()>;
}

/// Maps a window key code onto the keys the scene understands
pub fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Space => Some(Key::Space),
        KeyCode::R => Some(Key::R),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

/// Frames, time and keyboard from the macroquad window
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroquadHost;

impl FrameHost for MacroquadHost {
    fn elapsed(&self) -> f64 {
        ::macroquad::time::get_time()
    }

    fn poll_keys(&mut self) -> Vec<Key> {
        ::macroquad::input::get_keys_pressed()
            .into_iter()
            .filter_map(map_key)
            .collect()
    }

    fn next_frame(&mut self) -> impl Future<Output = ()> {
        ::macroquad::window::next_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(KeyCode::Left), Some(Key::ArrowLeft));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::Q), None);
    }
}
