//! Frame-paced waits built on the engine's clock.

use std::time::Duration;

use crate::clock::FrameClock;
use crate::engine::Engine;
use crate::error::{Hook, SequenceError};

impl<C: FrameClock> Engine<C> {
    /// Evaluate `test` now and then once per frame until it holds.
    /// Returns the number of frames waited.
    pub async fn wait_for(
        &self,
        mut test: impl FnMut() -> bool,
    ) -> Result<usize, SequenceError> {
        self.ensure_live()?;
        let mut frames = 0;
        while !test() {
            self.guarded(self.clock().next_frame()).await?;
            frames += 1;
        }
        Ok(frames)
    }

    /// [`Engine::wait_for`], then run `then` (contained).
    pub async fn wait_for_then(
        &self,
        test: impl FnMut() -> bool,
        then: impl FnOnce(),
    ) -> Result<usize, SequenceError> {
        let frames = self.wait_for(test).await?;
        self.reporter().call(Hook::Wait, then);
        Ok(frames)
    }

    pub async fn wait_for_ms(&self, ms: u64) -> Result<(), SequenceError> {
        self.ensure_live()?;
        self.guarded(self.clock().sleep(Duration::from_millis(ms))).await
    }

    /// [`Engine::wait_for_ms`], then run `then` (contained).
    pub async fn wait_for_ms_then(
        &self,
        ms: u64,
        then: impl FnOnce(),
    ) -> Result<(), SequenceError> {
        self.wait_for_ms(ms).await?;
        self.reporter().call(Hook::Wait, then);
        Ok(())
    }
}
