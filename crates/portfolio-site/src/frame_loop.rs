//! Repeating per-frame task on `requestAnimationFrame`, with a stop hook.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::error::Result;

/// Bookkeeping shared by the scheduler callback and the loop's owner.
#[derive(Debug)]
pub struct LoopState {
    running: Cell<bool>,
    frames: Cell<u64>,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            running: Cell::new(true),
            frames: Cell::new(0),
        }
    }
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame if the loop is still running. Returns whether another
    /// frame should be scheduled.
    pub fn step<F: FnMut()>(&self, frame: &mut F) -> bool {
        if !self.running.get() {
            return false;
        }
        frame();
        self.frames.set(self.frames.get() + 1);
        self.running.get()
    }

    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

pub struct AnimationLoop {
    window: Window,
    state: Rc<LoopState>,
    pending: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl AnimationLoop {
    /// Schedule `frame` on every animation frame until [`stop`](Self::stop).
    pub fn start<F>(window: &Window, mut frame: F) -> Result<Self>
    where
        F: FnMut() + 'static,
    {
        let state = Rc::new(LoopState::new());
        let pending = Rc::new(Cell::new(None));
        let callback: FrameCallback = Rc::new(RefCell::new(None));

        let tick = {
            let state = state.clone();
            let pending = pending.clone();
            let callback = callback.clone();
            let window = window.clone();
            Closure::wrap(Box::new(move || {
                pending.set(None);
                if !state.step(&mut frame) {
                    return;
                }
                if let Some(cb) = callback.borrow().as_ref() {
                    match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        Ok(id) => pending.set(Some(id)),
                        Err(e) => log::error!("animation frame request failed: {e:?}"),
                    }
                }
            }) as Box<dyn FnMut()>)
        };

        let id = window.request_animation_frame(tick.as_ref().unchecked_ref())?;
        pending.set(Some(id));
        *callback.borrow_mut() = Some(tick);

        Ok(Self {
            window: window.clone(),
            state,
            pending,
            callback,
        })
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Stop scheduling frames. Safe to call from inside a frame.
    pub fn stop(&self) {
        self.state.stop();
        if let Some(id) = self.pending.take() {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                log::warn!("failed to cancel animation frame: {e:?}");
            }
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
        // The callback holds a handle to its own slot; dropping it breaks the cycle.
        self.callback.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_frames_until_stopped() {
        let state = LoopState::new();
        let mut count = 0;
        for _ in 0..5 {
            assert!(state.step(&mut || count += 1));
        }
        state.stop();
        assert!(!state.step(&mut || count += 1));
        assert_eq!(count, 5);
        assert_eq!(state.frames(), 5);
    }

    #[test]
    fn stop_from_inside_a_frame_ends_the_loop() {
        let state = Rc::new(LoopState::new());
        let inner = state.clone();
        let mut frame = move || {
            if inner.frames() == 2 {
                inner.stop();
            }
        };
        let mut ran = 0;
        while state.step(&mut frame) {
            ran += 1;
        }
        assert_eq!(state.frames(), 3);
        assert_eq!(ran, 2);
        assert!(!state.is_running());
    }
}
