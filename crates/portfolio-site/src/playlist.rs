//! Playlist and playback state.
//!
//! `Player` owns the track list and the playback state machine. Everything it
//! does to the page goes through a [`PlayerBackend`], so the state logic runs
//! the same against the DOM and against a test double.

use crate::config::Track;
use crate::error::{Result, SiteError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    TrackLoaded,
    Playing,
    Paused,
}

/// Lifecycle of the Web Audio graph; it is built once, on the first load.
///
/// A graph that fails to build is not retried. Playback carries on without
/// the visualizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioGraph {
    Uninitialized,
    Ready,
    Unavailable,
}

/// Page side of the player: the media element, title text and playlist UI.
pub trait PlayerBackend {
    fn set_source(&mut self, source_path: &str) -> Result<()>;
    /// Restart buffering of the current source.
    fn reload(&mut self);
    fn play(&mut self) -> Result<()>;
    /// Wake a suspended audio context so the analyser sees the output. Does
    /// nothing when no graph exists.
    fn resume_audio(&mut self);
    fn show_title(&mut self, title: &str);
    fn render_playlist(&mut self, tracks: &[Track]) -> Result<()>;
    /// Highlight entry `index` and clear every other entry.
    fn mark_active(&mut self, index: usize) -> Result<()>;
    /// Build the analysis graph and start the visualizer.
    fn init_audio_graph(&mut self) -> Result<()>;
}

pub struct Player<B> {
    tracks: Vec<Track>,
    current_index: Option<usize>,
    state: PlaybackState,
    graph: AudioGraph,
    backend: B,
}

impl<B: PlayerBackend> Player<B> {
    pub fn new(tracks: Vec<Track>, backend: B) -> Self {
        Self {
            tracks,
            current_index: None,
            state: PlaybackState::Idle,
            graph: AudioGraph::Uninitialized,
            backend,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|idx| self.tracks.get(idx))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn graph(&self) -> AudioGraph {
        self.graph
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Render the playlist and load (without playing) the first track.
    pub fn start(&mut self) -> Result<()> {
        if self.tracks.is_empty() {
            return Ok(());
        }
        self.backend.render_playlist(&self.tracks)?;
        self.load_track(0)?;
        log::info!("Playlist rendered and first track loaded. Click a playlist item to play.");
        Ok(())
    }

    pub fn load_track(&mut self, index: usize) -> Result<()> {
        let track = self
            .tracks
            .get(index)
            .ok_or(SiteError::IndexOutOfRange {
                index,
                len: self.tracks.len(),
            })?
            .clone();

        self.backend.set_source(&track.source_path)?;
        self.backend.reload();
        log::info!("Loading track: {} from: {}", track.title, track.source_path);
        self.backend.show_title(&track.title);
        self.backend.mark_active(index)?;
        self.current_index = Some(index);
        self.state = PlaybackState::TrackLoaded;

        self.ensure_audio_graph();
        Ok(())
    }

    /// Load a track and start playing it, as a playlist click does.
    pub fn play_track(&mut self, index: usize) -> Result<()> {
        self.load_track(index)?;
        self.backend.resume_audio();
        self.backend.play()?;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Mirror a `play`/`pause` reported by the media element itself.
    pub fn on_media_playing(&mut self, playing: bool) {
        if self.current_index.is_none() {
            return;
        }
        if playing {
            self.backend.resume_audio();
            self.state = PlaybackState::Playing;
        } else {
            self.state = PlaybackState::Paused;
        }
    }

    fn ensure_audio_graph(&mut self) {
        if self.graph != AudioGraph::Uninitialized {
            return;
        }
        match self.backend.init_audio_graph() {
            Ok(()) => {
                self.graph = AudioGraph::Ready;
                log::info!("audio graph ready");
            }
            Err(e) => {
                self.graph = AudioGraph::Unavailable;
                log::warn!("audio analysis unavailable, playing without visualizer: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_tracks;

    #[derive(Default)]
    struct FakeBackend {
        source: Option<String>,
        reloads: usize,
        plays: usize,
        resumes: usize,
        title: String,
        entries: Vec<String>,
        active: Vec<bool>,
        graph_inits: usize,
        graph_fails: bool,
    }

    impl PlayerBackend for FakeBackend {
        fn set_source(&mut self, source_path: &str) -> Result<()> {
            self.source = Some(source_path.to_string());
            Ok(())
        }

        fn reload(&mut self) {
            self.reloads += 1;
        }

        fn play(&mut self) -> Result<()> {
            self.plays += 1;
            Ok(())
        }

        fn resume_audio(&mut self) {
            self.resumes += 1;
        }

        fn show_title(&mut self, title: &str) {
            self.title = title.to_string();
        }

        fn render_playlist(&mut self, tracks: &[Track]) -> Result<()> {
            self.entries = tracks.iter().map(|t| t.title.clone()).collect();
            self.active = vec![false; tracks.len()];
            Ok(())
        }

        fn mark_active(&mut self, index: usize) -> Result<()> {
            for (i, flag) in self.active.iter_mut().enumerate() {
                *flag = i == index;
            }
            Ok(())
        }

        fn init_audio_graph(&mut self) -> Result<()> {
            self.graph_inits += 1;
            if self.graph_fails {
                return Err(SiteError::Js("AudioContext is not supported".into()));
            }
            Ok(())
        }
    }

    fn started_player() -> Player<FakeBackend> {
        let mut player = Player::new(default_tracks(), FakeBackend::default());
        player.start().unwrap();
        player
    }

    #[test]
    fn start_renders_list_and_loads_first_track_without_playing() {
        let player = started_player();
        let b = player.backend();
        assert_eq!(b.entries.len(), 4);
        assert_eq!(b.title, "Melodic Voyage");
        assert_eq!(b.reloads, 1);
        assert_eq!(b.plays, 0);
        assert_eq!(player.state(), PlaybackState::TrackLoaded);
        assert_eq!(player.current_track().map(|t| t.title.as_str()), Some("Melodic Voyage"));
    }

    #[test]
    fn start_with_empty_list_does_nothing() {
        let mut player = Player::new(Vec::new(), FakeBackend::default());
        player.start().unwrap();
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(player.backend().entries.is_empty());
        assert_eq!(player.graph(), AudioGraph::Uninitialized);
    }

    #[test]
    fn every_valid_index_shows_its_title_and_one_active_entry() {
        let mut player = started_player();
        let tracks = player.tracks().to_vec();
        for (i, track) in tracks.iter().enumerate() {
            player.load_track(i).unwrap();
            let b = player.backend();
            assert_eq!(b.title, track.title);
            assert_eq!(b.source.as_deref(), Some(track.source_path.as_str()));
            assert_eq!(b.active.iter().filter(|on| **on).count(), 1);
            assert!(b.active[i]);
            assert_eq!(player.current_index(), Some(i));
        }
    }

    #[test]
    fn out_of_range_index_is_rejected_before_touching_the_page() {
        let mut player = started_player();
        let err = player.load_track(4).unwrap_err();
        assert!(matches!(err, SiteError::IndexOutOfRange { index: 4, len: 4 }));
        assert_eq!(player.backend().title, "Melodic Voyage");
        assert_eq!(player.current_index(), Some(0));
    }

    #[test]
    fn audio_graph_is_built_once() {
        let mut player = started_player();
        player.load_track(2).unwrap();
        player.play_track(1).unwrap();
        assert_eq!(player.backend().graph_inits, 1);
        assert_eq!(player.graph(), AudioGraph::Ready);
    }

    #[test]
    fn play_track_loads_then_plays() {
        let mut player = started_player();
        player.play_track(3).unwrap();
        let b = player.backend();
        assert_eq!(b.plays, 1);
        assert_eq!(b.title, "Cyberpunk Plattforms");
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn native_controls_toggle_between_playing_and_paused() {
        let mut player = started_player();
        player.on_media_playing(true);
        assert_eq!(player.state(), PlaybackState::Playing);
        player.on_media_playing(false);
        assert_eq!(player.state(), PlaybackState::Paused);
        player.on_media_playing(true);
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn media_events_before_any_load_are_ignored() {
        let mut player = Player::new(default_tracks(), FakeBackend::default());
        player.on_media_playing(true);
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[test]
    fn failed_audio_graph_still_loads_and_plays() {
        let backend = FakeBackend {
            graph_fails: true,
            ..FakeBackend::default()
        };
        let mut player = Player::new(default_tracks(), backend);
        player.start().unwrap();
        assert_eq!(player.backend().title, "Melodic Voyage");
        assert_eq!(player.graph(), AudioGraph::Unavailable);

        player.play_track(1).unwrap();
        let b = player.backend();
        assert_eq!(b.plays, 1);
        assert_eq!(b.title, "Cybernetic Dreams");
        assert_eq!(b.graph_inits, 1);
        assert_eq!(b.resumes, 1);
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn playing_wakes_the_audio_context() {
        let mut player = started_player();
        player.on_media_playing(true);
        assert_eq!(player.backend().resumes, 1);
        player.on_media_playing(false);
        assert_eq!(player.backend().resumes, 1);
        player.play_track(2).unwrap();
        assert_eq!(player.backend().resumes, 2);
    }
}
