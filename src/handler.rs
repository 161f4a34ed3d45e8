/// Answers `extract_post` requests from the popup.
///
/// A request is answered immediately when a usable post is already tracked.
/// Otherwise the handler waits for the page to change, racing a watch on the
/// document against a timer. Whichever side wins cancels the other, and the
/// request resolves exactly once.
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::dom::{PageDocument, Scheduler, StructuralChange};
use crate::extractor::extract;
use crate::locator::find_closest;
use crate::post_data::{ExtractRequest, ExtractResponse, ExtractedPostData};
use crate::tracker::{PostSetTracker, SharedPosts};

/// Locate-then-extract against the current live collection
struct Probe<D: PageDocument> {
    document: D,
    posts: SharedPosts<D::Node>,
    selector: String,
}

impl<D: PageDocument> Clone for Probe<D> {
    fn clone(&self) -> Self {
        Probe {
            document: self.document.clone(),
            posts: self.posts.clone(),
            selector: self.selector.clone(),
        }
    }
}

impl<D: PageDocument> Probe<D> {
    fn attempt(&self) -> Option<ExtractedPostData> {
        let posts = self.posts.borrow().snapshot();
        self.attempt_over(&posts)
    }

    /// Attempt with `changes` folded into a private copy of the collection.
    /// The tracker may see the same batch later, or already has; either way
    /// the copy is current.
    fn attempt_after(&self, changes: &[StructuralChange<D::Node>]) -> Option<ExtractedPostData> {
        let mut view = self.posts.borrow().clone();
        view.apply_changes(changes, &self.selector);
        self.attempt_over(&view.snapshot())
    }

    fn attempt_over(&self, posts: &[D::Node]) -> Option<ExtractedPostData> {
        let closest = find_closest(posts, self.document.viewport_height())?;
        extract(Some(&closest), &self.document.location_href()).filter(ExtractedPostData::is_usable)
    }
}

/// Both contenders of a deferred extraction plus the single reply slot
struct Race<Sub, Timer> {
    reply: Option<oneshot::Sender<ExtractResponse>>,
    watch: Option<Sub>,
    timer: Option<Timer>,
}

type SharedRace<Sub, Timer> = Rc<RefCell<Race<Sub, Timer>>>;

/// Resolve the race. Later calls are no-ops.
fn settle<Sub, Timer>(race: &SharedRace<Sub, Timer>, response: ExtractResponse) {
    let (reply, watch, timer) = {
        let mut race = race.borrow_mut();
        (race.reply.take(), race.watch.take(), race.timer.take())
    };
    drop(watch);
    drop(timer);

    if let Some(reply) = reply {
        if reply.send(response).is_err() {
            log::debug!("Extraction requester went away before the reply");
        }
    }
}

/// The eventual reply to one extraction request
pub struct PendingExtraction {
    receiver: oneshot::Receiver<ExtractResponse>,
}

impl PendingExtraction {
    fn ready(response: ExtractResponse) -> PendingExtraction {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(response);
        PendingExtraction { receiver }
    }

    /// The reply if it has already been decided
    pub fn try_take(&mut self) -> Option<ExtractResponse> {
        match self.receiver.try_recv() {
            Ok(response) => response,
            Err(_) => Some(ExtractResponse::failure()),
        }
    }
}

impl Future for PendingExtraction {
    type Output = ExtractResponse;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<ExtractResponse> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(response)) => Poll::Ready(response),
            // Both contenders were dropped without answering
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(ExtractResponse::failure()),
            Poll::Pending => Poll::Pending,
        }
    }
}

pub struct ExtractionRequestHandler<D: PageDocument, S: Scheduler> {
    probe: Probe<D>,
    scheduler: S,
    timeout_ms: u32,
}

impl<D: PageDocument, S: Scheduler> ExtractionRequestHandler<D, S> {
    /// Reads `tracker`'s collection, which stays shared across restarts
    pub fn new(document: D, scheduler: S, tracker: &PostSetTracker<D>, timeout_ms: u32) -> Self {
        ExtractionRequestHandler {
            probe: Probe {
                document,
                posts: tracker.posts(),
                selector: tracker.selector().to_string(),
            },
            scheduler,
            timeout_ms,
        }
    }

    /// Handle a runtime message; anything other than `extract_post` is not ours
    pub fn handle(&self, request: &ExtractRequest) -> Option<PendingExtraction> {
        if !request.is_extract_post() {
            return None;
        }
        Some(self.extract_post())
    }

    pub fn extract_post(&self) -> PendingExtraction {
        if let Some(data) = self.probe.attempt() {
            return PendingExtraction::ready(ExtractResponse::found(data));
        }

        log::debug!("No post yet, waiting up to {}ms", self.timeout_ms);
        self.wait_for_post()
    }

    fn wait_for_post(&self) -> PendingExtraction {
        let (sender, receiver) = oneshot::channel();
        let race: SharedRace<D::Subscription, S::Timer> = Rc::new(RefCell::new(Race {
            reply: Some(sender),
            watch: None,
            timer: None,
        }));
        let pending = PendingExtraction { receiver };

        let watch = {
            let race = race.clone();
            let probe = self.probe.clone();
            self.probe.document.observe_body(Box::new(move |changes| {
                if let Some(data) = probe.attempt_after(&changes) {
                    settle(&race, ExtractResponse::found(data));
                }
            }))
        };
        match watch {
            Ok(watch) => race.borrow_mut().watch = Some(watch),
            Err(e) => {
                log::warn!("Could not watch for late posts: {}", e);
                settle(&race, ExtractResponse::failure());
                return pending;
            }
        }

        let timer = {
            let race = race.clone();
            let timeout_ms = self.timeout_ms;
            self.scheduler.set_timeout(
                timeout_ms,
                Box::new(move || {
                    log::info!("No post found within {}ms", timeout_ms);
                    settle(&race, ExtractResponse::failure());
                }),
            )
        };
        match timer {
            Ok(timer) => race.borrow_mut().timer = Some(timer),
            Err(e) => {
                log::warn!("Could not arm extraction timeout: {}", e);
                settle(&race, ExtractResponse::failure());
            }
        }

        pending
    }
}
