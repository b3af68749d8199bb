use crate::catalog::Emotion;
use crate::counter::CounterStore;
use crate::errors::WidgetError;
use crate::storage::KeyValueStore;
use crate::ui::{Renderer, RESET_CONTROL_ID};
use tracing::{error, info};

/// Route a tile posts to when it is clicked.
pub fn avatar_action(emotion: &Emotion) -> String {
    format!("/avatars/{}/click", emotion.label)
}

/// Turns tile clicks and reset clicks into store mutations followed by a
/// renderer refresh. A failed mutation never reaches the renderer.
pub struct InteractionHandler<S> {
    store: CounterStore<S>,
    renderer: Renderer,
    reset_enabled: bool,
}

impl<S: KeyValueStore> InteractionHandler<S> {
    /// Wires the handler to an already painted renderer. A page without a
    /// reset control leaves reset disabled; avatar clicks keep working.
    pub fn wire(store: CounterStore<S>, renderer: Renderer) -> Self {
        let reset_enabled = renderer.template().has_reset_control();
        if !reset_enabled {
            error!("reset control #{RESET_CONTROL_ID} not found; reset disabled");
        }
        Self {
            store,
            renderer,
            reset_enabled,
        }
    }

    pub fn avatar_clicked(&mut self, label: &str) -> Result<u64, WidgetError> {
        let count = self.store.increment(label)?;
        self.renderer
            .render_counts(self.store.catalog(), self.store.get_all());
        self.renderer.mark_activated(label);
        Ok(count)
    }

    pub fn reset_clicked(&mut self) -> Result<(), WidgetError> {
        if !self.reset_enabled {
            return Err(WidgetError::MissingControl(RESET_CONTROL_ID));
        }
        info!("resetting all counts");
        self.store.reset_all()?;
        self.renderer
            .render_counts(self.store.catalog(), self.store.get_all());
        self.renderer.clear_all_activated_marks();
        Ok(())
    }

    pub fn reset_enabled(&self) -> bool {
        self.reset_enabled
    }

    pub fn store(&self) -> &CounterStore<S> {
        &self.store
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn page_html(&self) -> String {
        self.renderer.to_html()
    }

    pub fn into_store(self) -> CounterStore<S> {
        self.store
    }
}
