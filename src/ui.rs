use crate::catalog::{capitalize, Catalog, Emotion};
use crate::counter::CounterMap;
use std::fmt::Write as _;
use tracing::{error, warn};

const AVATARS_SLOT: &str = "{{AVATARS}}";
const COUNTS_SLOT: &str = "{{COUNTS}}";
const RESET_SLOT: &str = "{{RESET}}";

/// Id of the reset control in the rendered page.
pub const RESET_CONTROL_ID: &str = "reset-button";

/// Page skeleton the rendered fragments are placed into. A slot missing from
/// the template means the matching element is absent from the page.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    source: String,
}

impl PageTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        let template = Self {
            source: source.into(),
        };
        for (slot, present) in [
            (AVATARS_SLOT, template.has_avatars_container()),
            (COUNTS_SLOT, template.has_counts_container()),
        ] {
            if !present {
                warn!("page template has no {slot} slot");
            }
        }
        template
    }

    pub fn has_avatars_container(&self) -> bool {
        self.source.contains(AVATARS_SLOT)
    }

    pub fn has_counts_container(&self) -> bool {
        self.source.contains(COUNTS_SLOT)
    }

    pub fn has_reset_control(&self) -> bool {
        self.source.contains(RESET_SLOT)
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::new(INDEX_HTML)
    }
}

/// One avatar tile. `action` is the hook the page invokes when the tile is
/// activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub label: String,
    pub image_ref: String,
    pub action: String,
    pub activated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
    pub label: String,
    pub display_label: String,
    pub count: u64,
}

/// Holds the visible tiles and count rows. Both lists are rebuilt wholesale;
/// the activated marks are presentation state only.
#[derive(Debug, Default)]
pub struct Renderer {
    template: PageTemplate,
    tiles: Vec<Tile>,
    rows: Vec<CountRow>,
}

impl Renderer {
    pub fn new(template: PageTemplate) -> Self {
        Self {
            template,
            tiles: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Rebuilds every tile in catalog order. New tiles start unmarked.
    pub fn render_avatars<F>(&mut self, catalog: &Catalog, on_avatar_activated: F)
    where
        F: Fn(&Emotion) -> String,
    {
        self.tiles = catalog
            .iter()
            .map(|emotion| Tile {
                label: emotion.label.clone(),
                image_ref: emotion.image_ref.clone(),
                action: on_avatar_activated(emotion),
                activated: false,
            })
            .collect();
    }

    pub fn render_counts(&mut self, catalog: &Catalog, counts: &CounterMap) {
        self.rows = catalog
            .iter()
            .map(|emotion| CountRow {
                label: emotion.label.clone(),
                display_label: emotion.display_label(),
                count: counts.get(&emotion.label).copied().unwrap_or_default(),
            })
            .collect();
    }

    /// Returns `false` when no tile carries `label`.
    pub fn mark_activated(&mut self, label: &str) -> bool {
        match self.tiles.iter_mut().find(|tile| tile.label == label) {
            Some(tile) => {
                tile.activated = true;
                true
            }
            None => {
                error!(label, "no avatar tile to mark");
                false
            }
        }
    }

    pub fn clear_all_activated_marks(&mut self) {
        for tile in &mut self.tiles {
            tile.activated = false;
        }
    }

    pub fn is_activated(&self, label: &str) -> bool {
        self.tiles
            .iter()
            .any(|tile| tile.label == label && tile.activated)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn rows(&self) -> &[CountRow] {
        &self.rows
    }

    pub fn template(&self) -> &PageTemplate {
        &self.template
    }

    pub fn to_html(&self) -> String {
        self.template
            .source
            .replace(AVATARS_SLOT, &self.avatars_html())
            .replace(COUNTS_SLOT, &self.counts_html())
            .replace(RESET_SLOT, &reset_html())
    }

    fn avatars_html(&self) -> String {
        let mut out = String::new();
        for tile in &self.tiles {
            let class = if tile.activated { "avatar clicked" } else { "avatar" };
            let label = escape(&tile.label);
            let _ = write!(
                out,
                r#"
        <form class="avatar-form" method="post" action="{action}">
          <button class="{class}" data-emotion="{label}" type="submit">
            <img src="{src}" alt="{label} avatar" />
            <span class="avatar-name">{label}</span>
          </button>
        </form>"#,
                action = escape(&tile.action),
                src = escape(&tile.image_ref),
            );
        }
        out
    }

    fn counts_html(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            let _ = write!(
                out,
                r#"
        <div class="count-item">
          <span>{label}</span>
          <span class="count-value">{count}</span>
        </div>"#,
                label = escape(&summary_label(&row.label)),
                count = row.count,
            );
        }
        out
    }
}

fn reset_html() -> String {
    format!(
        r#"<form method="post" action="/reset">
        <button id="{RESET_CONTROL_ID}" class="btn-reset" type="submit">Reset all counts</button>
      </form>"#
    )
}

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Display form of a label in the summary list.
pub fn summary_label(label: &str) -> String {
    format!("{}:", capitalize(label))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>How are you feeling?</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --mark: #3b82f6;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    h2 {
      margin: 0;
      font-size: 1.4rem;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
      font-size: 1rem;
    }

    #avatars-container {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 16px;
    }

    .avatar-form {
      margin: 0;
    }

    .avatar {
      width: 100%;
      appearance: none;
      background: white;
      border: 3px solid transparent;
      border-radius: 18px;
      padding: 14px;
      display: grid;
      gap: 8px;
      justify-items: center;
      cursor: pointer;
      font: inherit;
      color: inherit;
      transition: transform 150ms ease, border-color 150ms ease;
    }

    .avatar:active {
      transform: scale(0.97);
    }

    .avatar.clicked {
      border-color: var(--mark);
    }

    .avatar img {
      width: 72px;
      height: 72px;
      object-fit: cover;
      border-radius: 50%;
    }

    .avatar-name {
      text-transform: capitalize;
      font-weight: 500;
    }

    #click-counts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 12px;
    }

    .count-item {
      background: white;
      border-radius: 14px;
      padding: 12px 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: flex;
      justify-content: space-between;
    }

    .count-value {
      font-weight: 600;
      color: var(--accent-2);
    }

    .btn-reset {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(255, 107, 74, 0.3);
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(12px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>How are you feeling?</h1>
      <p class="subtitle">Tap an avatar each time the feeling shows up.</p>
    </header>

    <section id="avatars-container">{{AVATARS}}
    </section>

    <section>
      <h2>Your counts</h2>
      <div id="click-counts">{{COUNTS}}
      </div>
    </section>

    <section class="actions">
      {{RESET}}
    </section>
  </main>
</body>
</html>
"#;
