use crate::catalog::Catalog;
use crate::config::Config;
use crate::counter::{CounterStore, LoadOutcome};
use crate::interaction::{avatar_action, InteractionHandler};
use crate::state::AppState;
use crate::storage::{FileStore, KeyValueStore};
use crate::ui::{PageTemplate, Renderer};
use std::sync::Arc;
use tokio::fs;
use tracing::info;

/// Startup sequence: load counts, paint the avatars, paint the counts, wire
/// the controls.
pub fn bootstrap_widget<S: KeyValueStore>(
    catalog: Arc<Catalog>,
    storage: S,
    template: PageTemplate,
) -> (InteractionHandler<S>, LoadOutcome) {
    let (store, outcome) = CounterStore::new(Arc::clone(&catalog), storage);

    let mut renderer = Renderer::new(template);
    renderer.render_avatars(&catalog, avatar_action);
    renderer.render_counts(&catalog, store.get_all());

    (InteractionHandler::wire(store, renderer), outcome)
}

/// Builds the application state for the HTTP host from `config`.
pub async fn bootstrap(config: &Config) -> Result<AppState, std::io::Error> {
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let template = match &config.template_path {
        Some(path) => {
            info!("using page template {}", path.display());
            PageTemplate::new(fs::read_to_string(path).await?)
        }
        None => PageTemplate::default(),
    };

    let storage = FileStore::open(&config.data_path);
    let (handler, outcome) = bootstrap_widget(Arc::new(Catalog::default()), storage, template);
    match &outcome {
        LoadOutcome::Fresh => info!("no saved counts, starting at zero"),
        LoadOutcome::Restored { dropped } if dropped.is_empty() => info!("restored saved counts"),
        LoadOutcome::Restored { dropped } => {
            info!("restored saved counts, ignored unknown emotions {dropped:?}")
        }
        LoadOutcome::Recovered(err) => info!("saved counts unusable ({err}), starting at zero"),
    }

    Ok(AppState::new(handler, config.assets_dir.clone()))
}
