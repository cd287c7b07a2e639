//! Scaffold a component library in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command in `root`.
pub fn run(root: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing swatchbook...");

    let components_dir = root.join("src/components");

    // Check if components already exists
    if components_dir.exists() && !yes {
        tracing::warn!("src/components/ directory already exists. Use --yes to overwrite.");
        return Ok(());
    }

    let files = [
        ("swatchbook.toml", DEFAULT_CONFIG),
        ("src/components/button/button.yaml", DEFAULT_BUTTON_DATA),
        ("src/components/button/macro.njk", DEFAULT_BUTTON_MACRO),
        ("src/components/globals/README.md", DEFAULT_GLOBALS_README),
        ("src/examples/typography/index.njk", DEFAULT_TYPOGRAPHY_EXAMPLE),
        ("public/app.css", DEFAULT_STYLES),
    ];

    for (relative, content) in files {
        write_file(root, relative, content, yes)?;
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'swatchbook serve' to start the server.");

    Ok(())
}

fn write_file(root: &Path, relative: &str, content: &str, overwrite: bool) -> Result<()> {
    let path = root.join(relative);
    if path.exists() && !overwrite {
        tracing::debug!("Keeping existing {}", relative);
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write {}", relative))?;
    tracing::info!("Created {}", relative);

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Swatchbook configuration

[paths]
components = "src/components"
examples = "src/examples"
public = "public"
# views = "views"

[catalog]
exclude = ["globals", "all", "icons"]

[templates]
macro_prefix = ""
# every-request, watch or cached
reload = "every-request"

[server]
host = "127.0.0.1"
port = 3000
robots_header = true
"#;

const DEFAULT_BUTTON_DATA: &str = r#"params:
  - name: text
    type: string
    required: true
    description: Text for the button.
  - name: disabled
    type: boolean
    required: false
    description: Whether the button is disabled.

accessibility_criteria: |
  The button must be reachable and operable with the keyboard.

examples:
  - name: default
    data:
      text: Save and continue
  - name: disabled
    data:
      text: Disabled button
      disabled: true
"#;

const DEFAULT_BUTTON_MACRO: &str = r#"{% macro button(params) %}
<button type="submit" class="button"{% if params.disabled %} disabled aria-disabled="true"{% endif %}>
  {{ params.text }}
</button>
{% endmacro %}
"#;

const DEFAULT_GLOBALS_README: &str = r#"Shared styles and helpers. This directory is hidden from the index.
"#;

const DEFAULT_TYPOGRAPHY_EXAMPLE: &str = r#"{% extends "layout.njk" %}

{% block title %}Typography - Swatchbook{% endblock %}

{% block body %}
<h1>Typography</h1>
<p>Body copy, headings and lists in one place.</p>
{% endblock %}
"#;

const DEFAULT_STYLES: &str = r#".button {
  font: inherit;
  padding: 0.5rem 1rem;
}
"#;
