//! Scroll driver: forces lazy-loaded listing content into the DOM
//!
//! The loop keeps scrolling while the accumulated scroll offset is below the
//! content height measured after the previous step. Because the comparison
//! uses the height observed before the current scroll, one extra scroll may
//! happen once the bottom is reached. That step is harmless and kept.
//!
//! There is no iteration cap. A page whose height never stops growing keeps
//! this loop alive; bound it from outside (see `TimingConfig::scroll_timeout`).

use tracing::{debug, trace};

use super::settle::SettlePolicy;
use crate::infrastructure::error::SessionResult;
use crate::infrastructure::session::{RenderSession, content_height, scroll_by_script};

#[derive(Debug, Clone, Copy)]
pub struct ScrollDriver {
    step: u32,
    settle: SettlePolicy,
}

impl ScrollDriver {
    /// `step` must be non-zero; configuration validation guarantees it.
    pub const fn new(step: u32, settle: SettlePolicy) -> Self {
        Self { step, settle }
    }

    /// Scroll until the content height stops outrunning the scroll offset.
    /// Returns the last observed content height.
    pub async fn exhaust<S: RenderSession>(&self, session: &mut S) -> SessionResult<u64> {
        let step_script = scroll_by_script(self.step);
        let mut position: u64 = 0;
        let mut last_height = content_height(session).await?;
        let mut ticks: u32 = 0;

        while position < last_height {
            session.evaluate_script(&step_script).await?;
            position += u64::from(self.step);
            ticks += 1;

            last_height = self.await_height_change(session, last_height).await?;
            trace!("scroll tick {}: offset {} / height {}", ticks, position, last_height);
        }

        debug!("Scrolling converged after {} ticks at height {}", ticks, last_height);
        Ok(last_height)
    }

    /// Poll the content height until it differs from `previous` or the
    /// settle window closes, then report the latest reading.
    async fn await_height_change<S: RenderSession>(
        &self,
        session: &mut S,
        previous: u64,
    ) -> SessionResult<u64> {
        let deadline = self.settle.start();
        loop {
            let polling = deadline.tick().await;
            let height = content_height(session).await?;
            if height != previous || !polling {
                return Ok(height);
            }
        }
    }
}
