/// Single-page-app route change detection.
///
/// LinkedIn swaps the feed without a page load, and content scripts get no
/// navigation event for that, so the URL is polled.
use crate::dom::{PageDocument, Scheduler};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationWatcher {
    last_href: String,
}

impl NavigationWatcher {
    pub fn new(initial_href: impl Into<String>) -> NavigationWatcher {
        NavigationWatcher {
            last_href: initial_href.into(),
        }
    }

    /// Record the current URL; true when it differs from the last one seen
    pub fn observe(&mut self, href: &str) -> bool {
        if href == self.last_href {
            return false;
        }
        self.last_href = href.to_string();
        true
    }
}

/// Poll `location.href` every `period_ms` and call `on_change` with the new URL.
/// Polling stops when the returned interval is dropped.
pub fn watch_navigation<D, S>(
    document: D,
    scheduler: &S,
    period_ms: u32,
    mut on_change: impl FnMut(&str) + 'static,
) -> Result<S::Interval>
where
    D: PageDocument,
    S: Scheduler,
{
    let mut watcher = NavigationWatcher::new(document.location_href());
    scheduler.set_interval(
        period_ms,
        Box::new(move || {
            let href = document.location_href();
            if watcher.observe(&href) {
                log::info!("Navigated to {}", href);
                on_change(&href);
            }
        }),
    )
}
