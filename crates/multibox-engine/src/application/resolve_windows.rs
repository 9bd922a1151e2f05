//! WindowResolver: builds the managed window list and answers focus queries.
//!
//! The resolver is a thin orchestration layer over the [`WindowQuery`] trait,
//! which abstracts the external window-enumeration mechanism. Two id spaces
//! are involved: the ids returned by a name search are container ids suitable
//! for focus tracking and activation, while the injection mechanism needs
//! leaf ids obtained by running the configured id-query template once per
//! discovered window ([`WindowResolver::map_names_to_ids`]).
//!
//! Failure semantics: any query that fails or produces unparseable output
//! surfaces a [`ResolutionError`]; callers log it and treat the affected
//! window set as empty rather than crashing the event loop. An empty match
//! is a valid, warn-level result.

use std::sync::Arc;

use async_trait::async_trait;
use multibox_core::{WindowId, WindowList};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for window resolution operations.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The name search could not produce a usable id list.
    #[error("window search failed for pattern {pattern:?}: {reason}")]
    Search { pattern: String, reason: String },

    /// The id-query template could not translate a discovered id.
    #[error("window id translation failed for id {id}: {reason}")]
    Translate { id: WindowId, reason: String },

    /// The focus query failed.
    #[error("focus query failed: {reason}")]
    Focus { reason: String },

    /// Window activation failed.
    #[error("window activation failed for id {id}: {reason}")]
    Activate { id: WindowId, reason: String },
}

/// Trait abstracting the external window enumeration mechanism.
///
/// The production implementation shells out to `xdotool`; test
/// implementations answer from fixed tables.
#[async_trait]
pub trait WindowQuery: Send + Sync {
    /// Returns all window ids matching `pattern`, in discovery order.
    /// An empty list is a valid result.
    async fn search(&self, pattern: &str) -> Result<Vec<WindowId>, String>;

    /// Returns the id of the window currently holding input focus.
    async fn focused_window(&self) -> Result<WindowId, String>;

    /// Gives input focus to `window`.
    async fn activate(&self, window: WindowId) -> Result<(), String>;

    /// Runs the id-query `template` (with `{id}` substituted) and returns the
    /// translated id.
    async fn translate_id(&self, template: &str, window: WindowId) -> Result<WindowId, String>;
}

/// The window resolution use case.
pub struct WindowResolver {
    query: Arc<dyn WindowQuery>,
}

impl WindowResolver {
    /// Creates a resolver over the given query mechanism.
    pub fn new(query: Arc<dyn WindowQuery>) -> Self {
        Self { query }
    }

    /// Resolves all windows matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::Search`] when the query mechanism fails;
    /// an empty match logs a warning and returns an empty list.
    pub async fn resolve(&self, pattern: &str) -> Result<Vec<WindowId>, ResolutionError> {
        let ids = self
            .query
            .search(pattern)
            .await
            .map_err(|reason| ResolutionError::Search {
                pattern: pattern.to_string(),
                reason,
            })?;
        if ids.is_empty() {
            warn!(pattern, "no windows matched pattern");
        } else {
            debug!(pattern, ?ids, "resolved windows");
        }
        Ok(ids)
    }

    /// Builds the canonical window list: master window(s) first, then slaves
    /// in discovery order, duplicates removed.
    ///
    /// # Errors
    ///
    /// Propagates [`ResolutionError::Search`] from either pattern.
    pub async fn build_window_list(
        &self,
        master_pattern: &str,
        slave_pattern: &str,
    ) -> Result<WindowList, ResolutionError> {
        let master = self.resolve(master_pattern).await?;
        let slaves = self.resolve(slave_pattern).await?;
        Ok(WindowList::from_parts(master, slaves))
    }

    /// Translates every window matching `pattern` through the id-query
    /// `template`, producing the leaf ids the injection mechanism accepts.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::Translate`] on the first id the template
    /// cannot translate.
    pub async fn map_names_to_ids(
        &self,
        template: &str,
        pattern: &str,
    ) -> Result<Vec<WindowId>, ResolutionError> {
        let found = self.resolve(pattern).await?;
        let mut ids = Vec::with_capacity(found.len());
        for id in found {
            let translated = self
                .query
                .translate_id(template, id)
                .await
                .map_err(|reason| ResolutionError::Translate { id, reason })?;
            ids.push(translated);
        }
        Ok(ids)
    }

    /// Returns the focus index of the currently focused window within `list`,
    /// or `None` when the focused window is not tracked.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::Focus`] when the focus query itself fails.
    pub async fn current_focus(
        &self,
        list: &WindowList,
    ) -> Result<Option<usize>, ResolutionError> {
        let focused = self
            .query
            .focused_window()
            .await
            .map_err(|reason| ResolutionError::Focus { reason })?;
        let index = list.position(focused);
        match index {
            Some(index) => debug!(window = focused, index, "current focus"),
            None => warn!(window = focused, "focused window is not tracked"),
        }
        Ok(index)
    }

    /// Gives input focus to `window`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::Activate`] when the activation call fails.
    pub async fn activate(&self, window: WindowId) -> Result<(), ResolutionError> {
        self.query
            .activate(window)
            .await
            .map_err(|reason| ResolutionError::Activate { id: window, reason })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
