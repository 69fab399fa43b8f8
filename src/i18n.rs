//! Translation lookup.
//!
//! Bundles map a language code to a tree of strings. Keys are dot-delimited
//! paths into that tree: `t("nav.home")` resolves `{"nav": {"home": "..."}}`.
//! A key that does not resolve to a string comes back unchanged.
//!
//! The current language is the one piece of persistent state: it is
//! validated on every read and falls back to `"en"` when it names a language
//! without a bundle. Changing it notifies every subscriber; mounted elements
//! subscribe and re-render.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

/// Language used when the stored language has no bundle.
pub const FALLBACK_LANGUAGE: &str = "en";

new_key_type! {
    /// Handle returned by [`I18n::subscribe`].
    pub struct SubscriptionId;
}

/// A node in a translation bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Translation {
    Text(String),
    Group(BTreeMap<String, Translation>),
}

impl From<&str> for Translation {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// All strings for one language.
pub type Bundle = BTreeMap<String, Translation>;

/// Errors from loading translation bundles.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("invalid translation bundle for `{language}`: {source}")]
    InvalidBundle {
        language: String,
        #[source]
        source: serde_json::Error,
    },
}

type Subscriber = Rc<dyn Fn()>;

struct I18nState {
    bundles: BTreeMap<String, Bundle>,
    stored_language: Option<String>,
    subscribers: SlotMap<SubscriptionId, Subscriber>,
}

/// Shared handle to the translation lookup. Cloning shares state.
#[derive(Clone)]
pub struct I18n {
    state: Rc<RefCell<I18nState>>,
}

impl I18n {
    /// Create a lookup seeded with the built-in English strings.
    pub fn new() -> Self {
        let i18n = Self {
            state: Rc::new(RefCell::new(I18nState {
                bundles: BTreeMap::new(),
                stored_language: None,
                subscribers: SlotMap::with_key(),
            })),
        };
        i18n.add_translations(FALLBACK_LANGUAGE, default_bundle());
        i18n
    }

    /// Create a lookup with a previously stored language.
    ///
    /// The language is validated on read, so its bundle may be added later.
    pub fn with_stored_language(lang: &str) -> Self {
        let i18n = Self::new();
        i18n.state.borrow_mut().stored_language = Some(lang.to_owned());
        i18n
    }

    /// The language lookups currently use.
    ///
    /// A stored language without a bundle is cleared and the fallback
    /// returned.
    pub fn current_language(&self) -> String {
        let mut state = self.state.borrow_mut();
        match state.stored_language.clone() {
            Some(lang) if state.bundles.contains_key(&lang) => lang,
            Some(_) => {
                state.stored_language = None;
                FALLBACK_LANGUAGE.to_owned()
            }
            None => FALLBACK_LANGUAGE.to_owned(),
        }
    }

    /// Switch language and notify subscribers.
    ///
    /// An unknown language stores the fallback instead.
    pub fn set_language(&self, lang: &str) {
        let subscribers: Vec<Subscriber> = {
            let mut state = self.state.borrow_mut();
            let stored = if state.bundles.contains_key(lang) {
                lang
            } else {
                debug!(lang, "no bundle for language, using fallback");
                FALLBACK_LANGUAGE
            };
            state.stored_language = Some(stored.to_owned());
            state.subscribers.values().cloned().collect()
        };
        trace!(count = subscribers.len(), "language changed");
        for subscriber in subscribers {
            subscriber();
        }
    }

    /// Translate `key` in the current language.
    pub fn t(&self, key: &str) -> String {
        let lang = self.current_language();
        self.t_in(&lang, key)
    }

    /// Translate `key` in a specific language.
    pub fn t_in(&self, lang: &str, key: &str) -> String {
        let state = self.state.borrow();
        let Some(bundle) = state.bundles.get(lang) else {
            return key.to_owned();
        };

        let mut segments = key.split('.');
        let Some(first) = segments.next() else {
            return key.to_owned();
        };
        let mut node = bundle.get(first);
        for segment in segments {
            node = match node {
                Some(Translation::Group(group)) => group.get(segment),
                _ => None,
            };
        }
        match node {
            Some(Translation::Text(text)) => text.clone(),
            _ => key.to_owned(),
        }
    }

    /// Merge top-level entries into a language's bundle. Later entries win.
    pub fn add_translations(&self, lang: &str, bundle: Bundle) {
        let mut state = self.state.borrow_mut();
        state
            .bundles
            .entry(lang.to_owned())
            .or_default()
            .extend(bundle);
    }

    /// Parse a JSON object and merge it like [`add_translations`](Self::add_translations).
    pub fn add_translations_json(&self, lang: &str, json: &str) -> Result<(), TranslationError> {
        let bundle: Bundle =
            serde_json::from_str(json).map_err(|source| TranslationError::InvalidBundle {
                language: lang.to_owned(),
                source,
            })?;
        self.add_translations(lang, bundle);
        Ok(())
    }

    /// Languages with a bundle, sorted.
    pub fn languages(&self) -> Vec<String> {
        self.state.borrow().bundles.keys().cloned().collect()
    }

    /// Call `callback` after every language change.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> SubscriptionId {
        self.state.borrow_mut().subscribers.insert(Rc::new(callback))
    }

    /// Stop notifying a subscriber. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.borrow_mut().subscribers.remove(id).is_some()
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for I18n {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("I18n")
            .field("languages", &state.bundles.keys().collect::<Vec<_>>())
            .field("stored_language", &state.stored_language)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

/// Strings the router needs for its placeholders.
fn default_bundle() -> Bundle {
    [
        ("error", "Error"),
        ("error_invalid_component_or_layout", "Invalid component or layout"),
        ("error_loading_page", "Error loading page"),
        ("page_not_found", "Page Not Found"),
        ("page_not_found_description", "The requested page could not be found."),
    ]
    .into_iter()
    .map(|(key, text)| (key.to_owned(), Translation::from(text)))
    .collect()
}
