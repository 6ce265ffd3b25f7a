use wasm_bindgen_futures::JsFuture;
use web_sys::{AnalyserNode, AudioContext, AudioContextState, HtmlMediaElement, MediaElementAudioSourceNode};

use crate::error::Result;
use crate::visualizer::FrequencySource;

/// media element -> analyser -> speakers
#[derive(Clone)]
pub struct WebAudioGraph {
    ctx: AudioContext,
    analyser: AnalyserNode,
    // Kept so the source node lives as long as the graph.
    _source: MediaElementAudioSourceNode,
}

impl WebAudioGraph {
    pub fn connect(media: &HtmlMediaElement, fft_size: u32) -> Result<Self> {
        let ctx = AudioContext::new()?;
        let analyser = ctx.create_analyser()?;
        analyser.set_fft_size(fft_size);

        let source = ctx.create_media_element_source(media)?;
        source.connect_with_audio_node(&analyser)?;
        analyser.connect_with_audio_node(&ctx.destination())?;

        log::debug!(
            "analyser connected: fft size {}, {} bins",
            analyser.fft_size(),
            analyser.frequency_bin_count()
        );
        Ok(Self {
            ctx,
            analyser,
            _source: source,
        })
    }

    /// Browsers start a context created outside a user gesture suspended.
    pub fn resume(&self) {
        if self.ctx.state() != AudioContextState::Suspended {
            return;
        }
        match self.ctx.resume() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("audio context resume failed: {e:?}");
                }
            }),
            Err(e) => log::warn!("audio context resume failed: {e:?}"),
        }
    }
}

impl FrequencySource for WebAudioGraph {
    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn read_frequencies(&self, out: &mut [u8]) {
        self.analyser.get_byte_frequency_data(out);
    }
}
