//! DOM implementation of [`PlayerBackend`] and the player's page wiring.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlAudioElement, HtmlElement, Window};

use crate::audio::WebAudioGraph;
use crate::canvas::CanvasSurface;
use crate::config::{SiteConfig, Track};
use crate::dom;
use crate::error::Result;
use crate::frame_loop::AnimationLoop;
use crate::playlist::{Player, PlayerBackend};
use crate::visualizer::Visualizer;

const ITEM_CLASS: &str = "playlist-item";
const ACTIVE_CLASS: &str = "active";

pub type SharedPlayer = Rc<RefCell<Player<DomPlayer>>>;

pub struct DomPlayer {
    window: Window,
    document: Document,
    audio: HtmlAudioElement,
    title: HtmlElement,
    playlist: HtmlElement,
    entries: Vec<Element>,
    player: Weak<RefCell<Player<DomPlayer>>>,
    visualizer: Rc<RefCell<Visualizer<WebAudioGraph>>>,
    surface: Option<Rc<RefCell<CanvasSurface>>>,
    graph: Option<WebAudioGraph>,
    frame_loop: Option<AnimationLoop>,
}

impl DomPlayer {
    /// Stop the visualizer loop. The audio graph stays connected.
    pub fn stop_visualizer(&mut self) {
        if let Some(frame_loop) = self.frame_loop.take() {
            frame_loop.stop();
        }
    }

    fn add_entry(&self, index: usize, track: &Track) -> Result<Element> {
        let item = self.document.create_element("div")?;
        item.class_list().add_1(ITEM_CLASS)?;
        item.set_attribute("data-index", &index.to_string())?;
        let label = self.document.create_element("span")?;
        label.set_text_content(Some(&track.title));
        item.append_child(&label)?;
        self.playlist.append_child(&item)?;

        let player = self.player.clone();
        dom::listen(&item, "click", move |_| {
            let Some(player) = player.upgrade() else {
                return;
            };
            let result = player.borrow_mut().play_track(index);
            if let Err(e) = result {
                log::error!("failed to play track {index}: {e}");
            }
        })?;
        Ok(item)
    }
}

impl PlayerBackend for DomPlayer {
    fn set_source(&mut self, source_path: &str) -> Result<()> {
        self.audio.set_src(source_path);
        Ok(())
    }

    fn reload(&mut self) {
        self.audio.load();
    }

    fn play(&mut self) -> Result<()> {
        let promise = self.audio.play()?;
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("playback did not start: {e:?}");
            }
        });
        Ok(())
    }

    fn show_title(&mut self, title: &str) {
        self.title.set_text_content(Some(title));
    }

    fn render_playlist(&mut self, tracks: &[Track]) -> Result<()> {
        self.playlist.set_inner_html("");
        self.entries.clear();
        for (index, track) in tracks.iter().enumerate() {
            let item = self.add_entry(index, track)?;
            self.entries.push(item);
        }
        Ok(())
    }

    fn mark_active(&mut self, index: usize) -> Result<()> {
        for (i, item) in self.entries.iter().enumerate() {
            if i == index {
                item.class_list().add_1(ACTIVE_CLASS)?;
            } else {
                item.class_list().remove_1(ACTIVE_CLASS)?;
            }
        }
        Ok(())
    }

    fn resume_audio(&mut self) {
        if let Some(graph) = &self.graph {
            graph.resume();
        }
    }

    fn init_audio_graph(&mut self) -> Result<()> {
        let Some(surface) = self.surface.clone() else {
            log::warn!("no visualizer canvas; skipping audio analysis");
            return Ok(());
        };
        let graph = WebAudioGraph::connect(&self.audio, self.visualizer.borrow().config().fft_size)?;
        self.visualizer.borrow_mut().attach(graph.clone());
        // The media element now plays through the graph, so keep it for resume
        // even if the redraw loop cannot start.
        self.graph = Some(graph);

        let visualizer = self.visualizer.clone();
        let frame_loop = AnimationLoop::start(&self.window, move || {
            let mut surface = surface.borrow_mut();
            let drawn = visualizer.borrow_mut().render_frame(&mut *surface);
            if let Err(e) = drawn {
                log::warn!("visualizer frame failed: {e}");
            }
        })?;
        self.frame_loop = Some(frame_loop);
        Ok(())
    }
}

/// Build the player, mirror the media element's own play/pause, and load the
/// first track.
pub fn install(
    window: &Window,
    document: &Document,
    config: &SiteConfig,
    surface: Option<CanvasSurface>,
) -> Result<SharedPlayer> {
    let ids = &config.elements;
    let audio: HtmlAudioElement = dom::element_by_id(document, &ids.audio_player, "audio element")?;
    let title: HtmlElement = dom::element_by_id(document, &ids.track_title, "HTML element")?;
    let playlist: HtmlElement = dom::element_by_id(document, &ids.playlist, "HTML element")?;
    let visualizer = Rc::new(RefCell::new(Visualizer::new(config.visualizer.clone())));
    let surface = surface.map(|s| Rc::new(RefCell::new(s)));

    let player: SharedPlayer = Rc::new_cyclic(|weak| {
        RefCell::new(Player::new(
            config.tracks.clone(),
            DomPlayer {
                window: window.clone(),
                document: document.clone(),
                audio: audio.clone(),
                title,
                playlist,
                entries: Vec::new(),
                player: weak.clone(),
                visualizer,
                surface,
                graph: None,
                frame_loop: None,
            },
        ))
    });

    for (event, playing) in [("play", true), ("pause", false)] {
        let player = Rc::downgrade(&player);
        dom::listen(&audio, event, move |_| {
            if let Some(player) = player.upgrade() {
                player.borrow_mut().on_media_playing(playing);
            }
        })?;
    }

    let started = player.borrow_mut().start();
    if let Err(e) = started {
        log::error!("failed to load the first track: {e}");
    }
    Ok(player)
}
