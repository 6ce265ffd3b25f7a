use std::cell::RefCell;

use log::LevelFilter;
use wasm_bindgen::prelude::*;
use web_sys::DocumentReadyState;

pub mod audio;
pub mod canvas;
pub mod config;
pub mod contact;
pub mod dom;
pub mod error;
pub mod frame_loop;
pub mod logging;
pub mod nav;
pub mod player;
pub mod playlist;
pub mod visualizer;

use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::player::SharedPlayer;

thread_local! {
    static PLAYER: RefCell<Option<SharedPlayer>> = const { RefCell::new(None) };
}

/// Wire every feature of the page. A feature whose elements are missing is
/// logged and skipped; the others still come up.
pub fn run() -> Result<()> {
    let window = dom::window()?;
    let document = window.document().ok_or(SiteError::NoDocument)?;
    let config = SiteConfig::load(&document);

    if let Err(e) = nav::install(&window, &document, &config.elements, &config.nav) {
        log::error!("navigation setup failed: {e}");
    }

    let surface = canvas::install(&window, &document, &config.elements)
        .map_err(|e| log::error!("visualizer canvas unavailable: {e}"))
        .ok();
    match player::install(&window, &document, &config, surface) {
        Ok(player) => PLAYER.with(|slot| *slot.borrow_mut() = Some(player)),
        Err(e) => log::error!("player setup failed: {e}"),
    }

    if let Err(e) = contact::install(&document, &config.elements, &config.contact) {
        log::error!("contact form setup failed: {e}");
    }
    Ok(())
}

/// Load and play a playlist entry.
#[wasm_bindgen]
pub fn play_track(index: usize) -> std::result::Result<(), JsValue> {
    with_player(|player| player.borrow_mut().play_track(index))?;
    Ok(())
}

/// Stop the visualizer's redraw loop. Playback is unaffected.
#[wasm_bindgen]
pub fn stop_visualizer() {
    if let Err(e) = try_stop_visualizer() {
        log::warn!("cannot stop visualizer: {e}");
    }
}

fn try_stop_visualizer() -> Result<()> {
    with_player(|player| {
        player.borrow_mut().backend_mut().stop_visualizer();
        Ok(())
    })
}

fn with_player<T>(f: impl FnOnce(&SharedPlayer) -> Result<T>) -> Result<T> {
    PLAYER.with(|slot| match slot.borrow().as_ref() {
        Some(player) => f(player),
        None => Err(SiteError::PlayerUnavailable),
    })
}

// WASM entry point
#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init(LevelFilter::Info);

    let document = dom::document()?;
    if waits_for_dom(document.ready_state()) {
        dom::listen(&document, "DOMContentLoaded", |_| {
            if let Err(e) = run() {
                log::error!("page setup failed: {e}");
            }
        })?;
    } else {
        run()?;
    }
    Ok(())
}

/// Setup has to wait for `DOMContentLoaded` only while the document is still
/// parsing.
fn waits_for_dom(state: DocumentReadyState) -> bool {
    state == DocumentReadyState::Loading
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_is_deferred_only_while_loading() {
        assert!(waits_for_dom(DocumentReadyState::Loading));
        assert!(!waits_for_dom(DocumentReadyState::Interactive));
        assert!(!waits_for_dom(DocumentReadyState::Complete));
    }

    #[test]
    fn stopping_visualizer_without_player_reports_it() {
        let err = try_stop_visualizer().unwrap_err();
        assert!(matches!(err, SiteError::PlayerUnavailable));
    }
}
