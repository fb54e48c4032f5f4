//! Incremental reveal of a list.
//!
//! A [`RevealController`] exposes a growing prefix of a list. Each load-more
//! step waits out an artificial latency before growing the prefix by one
//! page, so the view can show a loading affordance and stagger the entrance
//! of the freshly revealed page.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_INITIAL_COUNT: usize = 10;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_LOAD_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(50);

/// Class name given to items of the most recently revealed page.
///
pub const ENTRANCE_CLASS: &str = "reveal-enter";

static NEXT_CONTROLLER_ID: AtomicU64 = AtomicU64::new(1);

/// Future returned by a [`Delay`].
///
pub type DelayFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Source of the artificial load-more latency.
///
pub trait Delay: Send + Sync {
    fn wait(&self, duration: Duration) -> DelayFuture;
}

/// Sleeps on the tokio timer.
///
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    fn wait(&self, duration: Duration) -> DelayFuture {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Completes immediately.
///
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn wait(&self, _duration: Duration) -> DelayFuture {
        Box::pin(std::future::ready(()))
    }
}

/// Tuning for a [`RevealController`].
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealConfig {
    pub initial_count: usize,
    pub page_size: usize,
    pub load_delay: Duration,
    pub stagger: Duration,
}

impl Default for RevealConfig {
    fn default() -> Self {
        RevealConfig {
            initial_count: DEFAULT_INITIAL_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
            load_delay: DEFAULT_LOAD_DELAY,
            stagger: DEFAULT_STAGGER,
        }
    }
}

impl RevealConfig {
    /// Build a configuration, filling omitted counts with the defaults.
    ///
    pub fn with_counts(initial_count: Option<usize>, page_size: Option<usize>) -> Self {
        RevealConfig {
            initial_count: initial_count.unwrap_or(DEFAULT_INITIAL_COUNT),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            ..RevealConfig::default()
        }
    }
}

/// Entrance styling of one item.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemStyle {
    pub animation_delay: Option<Duration>,
}

/// Handle for one outstanding load-more step.
///
/// Completing a ticket that was cancelled, or that was issued before a
/// reset, does nothing.
///
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    controller: u64,
    serial: u64,
}

/// Grows a visible prefix of `items` one page at a time.
///
#[derive(Debug)]
pub struct RevealController<T> {
    id: u64,
    items: Arc<[T]>,
    config: RevealConfig,
    visible_count: usize,
    pending: HashSet<u64>,
    next_serial: u64,
}

impl<T> RevealController<T> {
    pub fn new(items: Arc<[T]>, config: RevealConfig) -> Self {
        RevealController {
            id: NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed),
            items,
            config,
            visible_count: config.initial_count,
            pending: HashSet::new(),
            next_serial: 0,
        }
    }

    pub fn items(&self) -> &Arc<[T]> {
        &self.items
    }

    /// Swap in a fresh copy of the same logical list. The revealed prefix
    /// and outstanding steps carry over; call [`reset`](Self::reset) when the
    /// list itself changes.
    ///
    pub fn set_items(&mut self, items: Arc<[T]>) {
        self.items = items;
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// The revealed prefix; never longer than the list.
    ///
    pub fn visible_items(&self) -> &[T] {
        &self.items[..self.visible_count.min(self.items.len())]
    }

    pub fn has_more(&self) -> bool {
        self.visible_count < self.items.len()
    }

    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Start a load-more step. Loading is reported until the returned ticket
    /// (and any other outstanding one) is completed or cancelled.
    ///
    pub fn handle_load_more(&mut self) -> LoadTicket {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.pending.insert(serial);
        LoadTicket {
            controller: self.id,
            serial,
        }
    }

    /// Finish a load-more step after its delay. Returns whether the ticket
    /// was still live.
    ///
    pub fn complete_load(&mut self, ticket: LoadTicket) -> bool {
        if !self.take(&ticket) {
            return false;
        }
        let grown = (self.visible_count + self.config.page_size).min(self.items.len());
        self.visible_count = self.visible_count.max(grown);
        true
    }

    /// Drop a load-more step without revealing anything.
    ///
    pub fn cancel_load(&mut self, ticket: &LoadTicket) -> bool {
        self.take(ticket)
    }

    fn take(&mut self, ticket: &LoadTicket) -> bool {
        ticket.controller == self.id && self.pending.remove(&ticket.serial)
    }

    /// Wait out the configured delay on `delay`, then reveal the next page.
    ///
    pub async fn load_more(&mut self, delay: &dyn Delay) {
        let ticket = self.handle_load_more();
        delay.wait(self.config.load_delay).await;
        self.complete_load(ticket);
    }

    /// Return to the initial prefix and forget outstanding steps.
    ///
    pub fn reset(&mut self) {
        self.visible_count = self.config.initial_count;
        self.pending.clear();
    }

    /// Offset of `index` within the most recently revealed page.
    ///
    fn entrance_offset(&self, index: usize) -> Option<usize> {
        let window_start = self.visible_count.saturating_sub(self.config.page_size);
        (window_start..self.visible_count)
            .contains(&index)
            .then(|| index - window_start)
    }

    pub fn is_entering(&self, index: usize) -> bool {
        self.entrance_offset(index).is_some()
    }

    pub fn item_class_name(&self, index: usize) -> &'static str {
        if self.is_entering(index) {
            ENTRANCE_CLASS
        } else {
            ""
        }
    }

    pub fn item_style(&self, index: usize) -> ItemStyle {
        ItemStyle {
            animation_delay: self
                .entrance_offset(index)
                .map(|offset| self.config.stagger * offset as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(len: usize) -> Arc<[usize]> {
        (0..len).collect()
    }

    fn controller(len: usize, initial_count: usize, page_size: usize) -> RevealController<usize> {
        RevealController::new(
            items(len),
            RevealConfig::with_counts(Some(initial_count), Some(page_size)),
        )
    }

    #[test]
    fn defaults_fill_omitted_counts() {
        let config = RevealConfig::with_counts(None, Some(3));
        assert_eq!(config.initial_count, DEFAULT_INITIAL_COUNT);
        assert_eq!(config.page_size, 3);
        assert_eq!(config.load_delay, DEFAULT_LOAD_DELAY);
    }

    #[test]
    fn initial_prefix() {
        for initial_count in 0..=8 {
            let reveal = controller(8, initial_count, 4);
            assert_eq!(reveal.visible_items().len(), initial_count);
            assert_eq!(reveal.has_more(), initial_count < 8);
            assert!(!reveal.is_loading());
        }
    }

    #[test]
    fn initial_count_past_end_clamps_slice() {
        let reveal = controller(3, 10, 10);
        assert_eq!(reveal.visible_items(), &[0, 1, 2]);
        assert!(!reveal.has_more());
    }

    #[test]
    fn load_more_marks_loading_until_completed() {
        let mut reveal = controller(12, 5, 5);
        let ticket = reveal.handle_load_more();
        assert!(reveal.is_loading());
        assert_eq!(reveal.visible_count(), 5);
        assert!(reveal.complete_load(ticket));
        assert!(!reveal.is_loading());
        assert_eq!(reveal.visible_count(), 10);
    }

    #[tokio::test]
    async fn reveals_twelve_items_in_three_steps() {
        let mut reveal = controller(12, 5, 5);
        assert_eq!(reveal.visible_items().len(), 5);
        assert!(reveal.has_more());

        reveal.load_more(&NoDelay).await;
        assert_eq!(reveal.visible_items().len(), 10);
        assert!(reveal.has_more());

        reveal.load_more(&NoDelay).await;
        assert_eq!(reveal.visible_items().len(), 12);
        assert_eq!(reveal.visible_count(), 12);
        assert!(!reveal.has_more());

        reveal.load_more(&NoDelay).await;
        assert_eq!(reveal.visible_count(), 12);
        assert!(!reveal.has_more());
        assert!(!reveal.is_loading());
    }

    #[tokio::test]
    async fn visible_count_never_decreases() {
        let mut reveal = controller(23, 0, 7);
        let mut previous = reveal.visible_count();
        for _ in 0..6 {
            reveal.load_more(&NoDelay).await;
            assert!(reveal.visible_count() >= previous);
            assert!(reveal.visible_count() <= 23);
            previous = reveal.visible_count();
        }
        assert!(!reveal.has_more());
    }

    #[tokio::test]
    async fn tokio_delay_waits_before_revealing() {
        let mut reveal = RevealController::new(
            items(4),
            RevealConfig {
                initial_count: 1,
                page_size: 2,
                load_delay: Duration::from_millis(5),
                stagger: DEFAULT_STAGGER,
            },
        );
        reveal.load_more(&TokioDelay).await;
        assert_eq!(reveal.visible_count(), 3);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut reveal = controller(30, 5, 5);
        let done = reveal.handle_load_more();
        reveal.complete_load(done);
        let in_flight = reveal.handle_load_more();

        reveal.reset();
        assert_eq!(reveal.visible_count(), 5);
        assert!(!reveal.is_loading());

        assert!(!reveal.complete_load(in_flight));
        assert_eq!(reveal.visible_count(), 5);
    }

    #[test]
    fn set_items_keeps_revealed_prefix() {
        let mut reveal = controller(15, 10, 5);
        let ticket = reveal.handle_load_more();
        reveal.complete_load(ticket);
        let in_flight = reveal.handle_load_more();

        reveal.set_items(items(20));
        assert_eq!(reveal.visible_count(), 15);
        assert!(reveal.has_more());
        assert!(reveal.complete_load(in_flight));
        assert_eq!(reveal.visible_count(), 20);

        reveal.set_items(items(12));
        assert_eq!(reveal.visible_items().len(), 12);
        assert!(!reveal.has_more());
    }

    #[test]
    fn cancelled_ticket_is_a_no_op() {
        let mut reveal = controller(30, 5, 5);
        let ticket = reveal.handle_load_more();
        assert!(reveal.cancel_load(&ticket));
        assert!(!reveal.is_loading());
        assert!(!reveal.complete_load(ticket));
        assert_eq!(reveal.visible_count(), 5);
    }

    #[test]
    fn ticket_from_another_controller_is_ignored() {
        let mut first = controller(30, 5, 5);
        let mut second = controller(30, 5, 5);
        let ticket = first.handle_load_more();
        second.handle_load_more();
        assert!(!second.complete_load(ticket));
        assert_eq!(second.visible_count(), 5);
        assert!(second.is_loading());
    }

    #[test]
    fn overlapping_loads_stay_loading_until_last_completes() {
        let mut reveal = controller(30, 5, 5);
        let first = reveal.handle_load_more();
        let second = reveal.handle_load_more();
        reveal.complete_load(first);
        assert!(reveal.is_loading());
        reveal.complete_load(second);
        assert!(!reveal.is_loading());
        assert_eq!(reveal.visible_count(), 15);
    }

    #[test]
    fn entrance_window_is_latest_page() {
        let mut reveal = controller(30, 5, 5);
        let ticket = reveal.handle_load_more();
        reveal.complete_load(ticket);

        for index in 0..5 {
            assert_eq!(reveal.item_class_name(index), "");
            assert_eq!(reveal.item_style(index), ItemStyle::default());
        }
        for k in 0..5 {
            let index = 5 + k;
            assert_eq!(reveal.item_class_name(index), ENTRANCE_CLASS);
            assert_eq!(
                reveal.item_style(index).animation_delay,
                Some(DEFAULT_STAGGER * k as u32)
            );
        }
        assert_eq!(reveal.item_class_name(10), "");
        assert_eq!(reveal.item_class_name(usize::MAX), "");
    }

    #[test]
    fn entrance_window_with_short_initial_prefix() {
        let reveal = controller(30, 3, 5);
        assert!(reveal.is_entering(0));
        assert!(reveal.is_entering(2));
        assert!(!reveal.is_entering(3));
        assert_eq!(
            reveal.item_style(2).animation_delay,
            Some(DEFAULT_STAGGER * 2)
        );
    }
}
