use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{Id, JoinSet};
use tokio::time::{sleep_until, Instant};

use super::{ExplainSession, FetchRequest, FetchResponse, FetchTag};
use crate::core::popup::PopupSurface;
use crate::core::sources::SourceRouter;
use crate::shared::emit::Subscription;

/// Drive a session until the event subscription closes.
///
/// Fetches run as tasks on the current runtime; only the newest one is kept
/// alive. A fetch task that panics is reported to the session as a failure so
/// the popup never stays on its loading text.
pub async fn run<U: PopupSurface>(
    mut session: ExplainSession<U>,
    mut events: Subscription,
    router: Arc<SourceRouter>,
) -> ExplainSession<U> {
    let mut fetches: JoinSet<FetchResponse> = JoinSet::new();
    let mut tags: HashMap<Id, FetchTag> = HashMap::new();

    tracing::info!("explain session started");

    loop {
        let deadline = session.auto_hide_deadline();

        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };

                if let Some(request) = session.dispatch(event, Instant::now()) {
                    // Older fetches can only produce stale results now.
                    fetches.abort_all();
                    let tag = request.tag;
                    let handle = fetches.spawn(fetch(Arc::clone(&router), request));
                    tags.insert(handle.id(), tag);
                }
            }

            Some(joined) = fetches.join_next_with_id() => match joined {
                Ok((id, response)) => {
                    tags.remove(&id);
                    session.complete_fetch(response, Instant::now());
                }
                Err(e) => {
                    let tag = tags.remove(&e.id());
                    if e.is_panic() {
                        tracing::error!(?tag, "explanation fetch panicked");
                        if let Some(tag) = tag {
                            session.fail_fetch(tag, Instant::now());
                        }
                    }
                }
            },

            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                session.on_auto_hide(Instant::now());
            }
        }
    }

    fetches.shutdown().await;
    session.close();
    tracing::info!("explain session stopped");
    session
}

async fn fetch(router: Arc<SourceRouter>, request: FetchRequest) -> FetchResponse {
    let explanation = router.fetch(request.source, &request.query).await;
    FetchResponse {
        tag: request.tag,
        explanation,
    }
}
