//! Keeps a rendered page consistent with the active language.
//!
//! After every language change the synchronizer rewrites localized node
//! content, moves the "active" marker to the matching language control and
//! flips the text direction. Every write is skipped when the target already
//! holds the wanted value, so repainting an unchanged page mutates nothing.

use crate::i18n::{Language, LocaleState, Subscriber};
use crate::view::{LanguageControl, Page, ViewNode};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// What one repaint pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepaintOutcome {
    /// Nodes whose slot was rewritten
    pub updated: usize,

    /// Nodes whose slot already held the translation
    pub unchanged: usize,

    /// Nodes left alone because their key has no translation
    pub untranslated: usize,
}

/// What one full sync (repaint, indicator, direction) did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub repaint: RepaintOutcome,
    pub controls_changed: usize,
    pub direction_changed: bool,
}

impl SyncOutcome {
    /// Nothing visible changed.
    pub fn is_noop(&self) -> bool {
        self.repaint.updated == 0 && self.controls_changed == 0 && !self.direction_changed
    }
}

pub struct ViewSynchronizer {
    state: Arc<LocaleState>,
    page: Mutex<Page>,
}

impl ViewSynchronizer {
    pub fn new(state: Arc<LocaleState>, page: Page) -> Self {
        Self {
            state,
            page: Mutex::new(page),
        }
    }

    /// Rewrite each node with its translation in the active language.
    ///
    /// A node whose key resolves to itself (a miss) keeps its current content.
    pub fn repaint(&self, nodes: &mut [ViewNode]) -> RepaintOutcome {
        let mut outcome = RepaintOutcome::default();

        for node in nodes.iter_mut() {
            let text = self.state.translate(&node.key);
            if text == node.key {
                outcome.untranslated += 1;
                continue;
            }

            let slot = node.content_mut();
            if *slot == text {
                outcome.unchanged += 1;
            } else {
                *slot = text;
                outcome.updated += 1;
            }
        }

        outcome
    }

    /// Mark exactly the control for `language` as active and clear the others.
    /// Returns how many controls changed.
    pub fn update_active_indicator(controls: &mut [LanguageControl], language: Language) -> usize {
        let mut changed = 0;
        for control in controls.iter_mut() {
            let active = control.lang == language.code();
            if control.active != active {
                control.active = active;
                changed += 1;
            }
        }
        changed
    }

    /// Set the page direction from the language alone. Returns whether it changed.
    pub fn update_direction(page: &mut Page, language: Language) -> bool {
        let direction = language.direction();
        if page.direction == direction {
            return false;
        }
        page.direction = direction;
        true
    }

    /// Bring the whole page in line with `language`.
    pub fn sync(&self, language: Language) -> SyncOutcome {
        let mut page = self.page.lock().unwrap_or_else(PoisonError::into_inner);

        let repaint = self.repaint(&mut page.nodes);
        let controls_changed = Self::update_active_indicator(&mut page.controls, language);
        let direction_changed = Self::update_direction(&mut page, language);

        let outcome = SyncOutcome {
            repaint,
            controls_changed,
            direction_changed,
        };
        debug!("Synced page to {}: {:?}", language, outcome);
        outcome
    }

    /// Subscribe this synchronizer to language changes.
    ///
    /// The subscriber holds only a weak reference, so the state does not keep
    /// the synchronizer alive. Keep the returned handle to detach.
    pub fn attach(self: &Arc<Self>) -> Subscriber {
        let weak = Arc::downgrade(self);
        let subscriber: Subscriber = Arc::new(move |language: Language| -> anyhow::Result<()> {
            if let Some(synchronizer) = weak.upgrade() {
                synchronizer.sync(language);
            }
            Ok(())
        });
        self.state.subscribe(Arc::clone(&subscriber));
        subscriber
    }

    pub fn detach(&self, subscriber: &Subscriber) -> bool {
        self.state.unsubscribe(subscriber)
    }

    /// Copy of the current page.
    pub fn page(&self) -> Page {
        self.page
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
