use std::time::Duration;

use page_model::Surface;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::events::{PageInput, PreloadEvent};
use crate::site::Site;

/// Upper bound on a single idle wait when no timer is armed.
const IDLE_WAKE: Duration = Duration::from_secs(3600);

/// Drives a mounted site until `cancel` fires.
///
/// `origin` is the instant the site was mounted at, which is page-clock
/// zero; every carousel instant is an offset from it. Inputs and preload events are applied in
/// arrival order, and due timers always run before the next input so the
/// carousel sees events in page-clock order. On exit every timer is
/// cancelled and the site is handed back.
pub async fn run<S: Surface>(
    mut site: Site<S>,
    origin: Instant,
    mut inputs: Receiver<PageInput<S::Element>>,
    mut preloads: Receiver<PreloadEvent<S::Element>>,
    cancel: CancellationToken,
) -> Site<S> {
    let mut inputs_open = true;
    let mut preloads_open = true;

    loop {
        site.advance(origin.elapsed());
        let wake = site
            .next_deadline()
            .map_or_else(|| Instant::now() + IDLE_WAKE, |deadline| origin + deadline);

        select! {
            _ = cancel.cancelled() => break,
            maybe_input = inputs.recv(), if inputs_open => match maybe_input {
                Some(input) => {
                    let now = origin.elapsed();
                    site.advance(now);
                    let outcome = site.handle(input, now);
                    debug!(?outcome, at_ms = now.as_millis() as u64, "input handled");
                }
                None => {
                    debug!("input channel closed");
                    inputs_open = false;
                }
            },
            maybe_event = preloads.recv(), if preloads_open => match maybe_event {
                Some(event) => site.apply_preload(&event),
                None => {
                    debug!("preload channel closed");
                    preloads_open = false;
                }
            },
            _ = sleep_until(wake) => {}
        }
    }

    site.shutdown();
    info!(
        current = site.carousel().current_index(),
        total = site.carousel().total(),
        "page runtime stopped"
    );
    site
}
