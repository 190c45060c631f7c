//! Bot-challenge interstitial detection and the wait-it-out loop.

use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use crate::error::ScraperError;

/// Lowercase substrings that identify a challenge screen in the page title
/// or rendered markup.
pub const CHALLENGE_MARKERS: &[&str] = &[
    "attention required",
    "checking your browser",
    "ddos protection",
    "ray id",
    "just a moment",
    "verify you are human",
    "cf-browser-verification",
    "please wait while we verify",
];

const MIN_POLL_MS: u64 = 2_000;
const MAX_POLL_MS: u64 = 5_000;

/// Read access to whatever page is currently loaded.
#[allow(async_fn_in_trait)]
pub trait PageProbe {
    async fn title(&self) -> Result<String, ScraperError>;
    async fn markup(&self) -> Result<String, ScraperError>;
}

/// `true` when either the title or the markup carries a challenge marker.
#[must_use]
pub fn is_challenge(title: &str, markup: &str) -> bool {
    let title = title.to_lowercase();
    let markup = markup.to_lowercase();
    CHALLENGE_MARKERS
        .iter()
        .any(|marker| title.contains(marker) || markup.contains(marker))
}

async fn challenged<P: PageProbe>(probe: &P) -> bool {
    let title = match probe.title().await {
        Ok(title) => title,
        Err(e) => {
            tracing::debug!(error = %e, "could not read page title; treating page as challenged");
            return true;
        }
    };
    match probe.markup().await {
        Ok(markup) => is_challenge(&title, &markup),
        Err(e) => {
            tracing::debug!(error = %e, "could not read page markup; treating page as challenged");
            true
        }
    }
}

/// Wait until the page is past any challenge screen.
///
/// Polls at uniformly random 2–5 s intervals. Returns `false` once `max_wait`
/// has elapsed with the challenge still showing; the caller must not scrape
/// the page in that case.
pub async fn await_stable<P: PageProbe>(probe: &P, max_wait: Duration) -> bool {
    let start = Instant::now();
    let mut polls = 0u32;

    loop {
        if !challenged(probe).await {
            if polls > 0 {
                tracing::info!(
                    waited_secs = start.elapsed().as_secs(),
                    "challenge screen cleared"
                );
            }
            return true;
        }

        let elapsed = start.elapsed();
        if elapsed >= max_wait {
            tracing::warn!(
                waited_secs = elapsed.as_secs(),
                "challenge screen still present at wait ceiling"
            );
            return false;
        }

        let backoff = Duration::from_millis(rand::rng().random_range(MIN_POLL_MS..=MAX_POLL_MS));
        let sleep_for = backoff.min(max_wait - elapsed);
        polls += 1;
        tracing::debug!(
            poll = polls,
            sleep = ?sleep_for,
            "challenge screen detected; waiting"
        );
        tokio::time::sleep(sleep_for).await;
    }
}
