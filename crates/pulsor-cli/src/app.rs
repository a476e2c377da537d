//! Registry wiring for the `pulsor` binary.
//!
//! Once the `sidebar` fragment has loaded, `sidebar:loaded` is pulsed and
//! its callbacks render the configured sidebar buttons.

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;
use pulsor_core::{Callback, PulseFn, Pulser, PulserOptions, Recorder, Registry};
use pulsor_fragment::{install_fetch_fragment, install_fetch_template, DirectorySource, FETCH_FRAGMENT};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Alias pulsed once the sidebar fragment has loaded.
pub const SIDEBAR_LOADED: &str = "sidebar:loaded";

/// Fragment name of the sidebar.
pub const SIDEBAR_FRAGMENT: &str = "sidebar";

struct SidebarButton {
    classes: &'static [&'static str],
    label: &'static str,
}

const SIDEBAR_BUTTONS: &[SidebarButton] = &[SidebarButton {
    classes: &["sidebar-button"],
    label: "Example 1",
}];

/// A configured registry plus the output of its sidebar callbacks.
pub struct App {
    pub registry: Registry,
    loaded: Pulser,
    sidebar: Arc<Mutex<Vec<String>>>,
}

impl App {
    /// Build the registry and install every configured pulser.
    ///
    /// # Errors
    ///
    /// Returns an error if a pulser cannot be registered.
    pub fn build(config: &Config, recorder: Arc<dyn Recorder>) -> Result<Self> {
        let registry = Registry::with_recorder(recorder);
        let fragments = &config.fragments;

        if fragments.fetch_fragment {
            install_fetch_fragment(&registry, Arc::new(DirectorySource::new(fragments.fragment_dir())))
                .context("Failed to install fragment loader")?;
        }
        if fragments.fetch_template {
            install_fetch_template(&registry, Arc::new(DirectorySource::new(fragments.template_dir())))
                .context("Failed to install template loader")?;
        }

        let sidebar = Arc::new(Mutex::new(Vec::new()));
        let loaded = install_sidebar(&registry, &sidebar)?;

        Ok(Self {
            registry,
            loaded,
            sidebar,
        })
    }

    /// Load one fragment or template through the pulser at `alias`.
    ///
    /// A sidebar fragment that resolved to markup pulses `sidebar:loaded`.
    ///
    /// # Errors
    ///
    /// Returns an error if `alias` is not registered or a pulse fails.
    pub async fn load(&self, alias: &str, name: &str) -> Result<Value> {
        let loader = self
            .registry
            .get_handle(alias)
            .with_context(|| format!("'{alias}' is disabled in the configuration"))?;
        let markup = loader
            .pulse(vec![Value::from(name)])
            .await
            .map_err(|e| anyhow!("Failed to load '{name}': {e}"))?;

        if alias == FETCH_FRAGMENT && name == SIDEBAR_FRAGMENT && !markup.is_null() {
            self.loaded
                .pulse(Vec::new())
                .await
                .map_err(|e| anyhow!("'{SIDEBAR_LOADED}' failed: {e}"))?;
        }
        Ok(markup)
    }

    /// Buttons rendered by the sidebar callbacks so far.
    #[must_use]
    pub fn sidebar_buttons(&self) -> Vec<String> {
        self.sidebar.lock().clone()
    }
}

fn install_sidebar(registry: &Registry, sidebar: &Arc<Mutex<Vec<String>>>) -> Result<Pulser> {
    let primary = PulseFn::sync(|_| {
        info!("Pulsed sidebar loaded");
        Ok(Value::Null)
    })
    .named("sidebar_loaded");

    let pulser = registry.create_pulser(SIDEBAR_LOADED, Some(primary), PulserOptions::new())?;

    let target = Arc::clone(sidebar);
    pulser
        .bind(&Callback::sync(move |_| {
            let mut buttons = target.lock();
            for button in SIDEBAR_BUTTONS {
                buttons.push(render_button(button.classes, button.label));
            }
            Ok(())
        }))?
        .bind(&Callback::sync(|_| {
            info!("Sidebar buttons installed");
            Ok(())
        }))?;

    Ok(pulser)
}

fn render_button(classes: &[&str], label: &str) -> String {
    format!("<button class=\"{}\">{}</button>", classes.join(" "), label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FragmentsConfig;
    use pulsor_core::NoopRecorder;
    use pulsor_fragment::FETCH_TEMPLATE;
    use serde_json::json;
    use std::path::Path;

    fn config(root: &Path) -> Config {
        Config {
            fragments: FragmentsConfig {
                root: root.display().to_string(),
                ..FragmentsConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_render_button() {
        assert_eq!(
            render_button(&["a", "b"], "Go"),
            "<button class=\"a b\">Go</button>"
        );
    }

    #[tokio::test]
    async fn test_sidebar_fragment_pulses_loaded() {
        let root = std::env::temp_dir().join(format!("pulsor-cli-{}", std::process::id()));
        tokio::fs::create_dir_all(&root).await.unwrap();
        tokio::fs::write(root.join("sidebar.html"), "<template><aside></aside></template>")
            .await
            .unwrap();
        tokio::fs::write(root.join("footer.html"), "<footer></footer>")
            .await
            .unwrap();

        let app = App::build(&config(&root), Arc::new(NoopRecorder)).unwrap();
        assert_eq!(app.registry.list(), vec![FETCH_FRAGMENT, FETCH_TEMPLATE, SIDEBAR_LOADED]);
        assert_eq!(app.registry.info(SIDEBAR_LOADED).unwrap().callback_count, 2);

        let footer = app.load(FETCH_FRAGMENT, "footer").await.unwrap();
        assert_eq!(footer, json!("<footer></footer>"));
        assert!(app.sidebar_buttons().is_empty());

        let sidebar = app.load(FETCH_FRAGMENT, SIDEBAR_FRAGMENT).await.unwrap();
        assert_eq!(sidebar, json!("<aside></aside>"));
        assert_eq!(
            app.sidebar_buttons(),
            vec!["<button class=\"sidebar-button\">Example 1</button>"]
        );

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_sidebar_renders_nothing() {
        let root = std::env::temp_dir().join(format!("pulsor-cli-empty-{}", std::process::id()));
        tokio::fs::create_dir_all(&root).await.unwrap();
        tokio::fs::write(root.join("template.sidebar.html"), "<template><nav></nav></template>")
            .await
            .unwrap();

        let app = App::build(&config(&root), Arc::new(NoopRecorder)).unwrap();
        let markup = app.load(FETCH_FRAGMENT, SIDEBAR_FRAGMENT).await.unwrap();
        assert_eq!(markup, Value::Null);
        assert!(app.sidebar_buttons().is_empty());

        // Templates never count as the sidebar loading
        let template = app.load(FETCH_TEMPLATE, SIDEBAR_FRAGMENT).await.unwrap();
        assert_eq!(template, json!("<nav></nav>"));
        assert!(app.sidebar_buttons().is_empty());

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_disabled_loader() {
        let mut config = Config::default();
        config.fragments.fetch_fragment = false;

        let app = App::build(&config, Arc::new(NoopRecorder)).unwrap();
        let err = app.load(FETCH_FRAGMENT, "header").await.unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_loaders_can_be_disabled() {
        let mut config = Config::default();
        config.fragments.fetch_fragment = false;
        config.fragments.fetch_template = false;

        let app = App::build(&config, Arc::new(NoopRecorder)).unwrap();
        assert_eq!(app.registry.list(), vec![SIDEBAR_LOADED]);
    }
}
