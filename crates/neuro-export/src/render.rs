use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ExportError;

pub const NARRATIVE_TEMPLATE: &str = "narrative.qmd";
pub const PLACEHOLDER_TEMPLATE: &str = "placeholder.qmd";

const NARRATIVE: &str = r#"<summary>

{{ text | trim }}

</summary>
"#;

const PLACEHOLDER: &str = r#"<summary>

::: {.callout-warning}
**Needs manual narrative.** Automated drafting for {{ title }} did not produce usable text{% if failures %} after {{ failures | length }} attempts{% endif %}.
{% for failure in failures %}
- {{ failure }}
{%- endfor %}
:::

</summary>
"#;

/// The built-in narrative templates.
pub fn builtin_templates() -> Result<Tera, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (NARRATIVE_TEMPLATE, NARRATIVE),
        (PLACEHOLDER_TEMPLATE, PLACEHOLDER),
    ])
    .map_err(|e| ExportError::TemplateParse(e.to_string()))?;
    Ok(tera)
}

/// Render a named template with any serializable value as its context.
pub fn render(tera: &Tera, template_name: &str, data: &impl Serialize) -> Result<String, ExportError> {
    let value = serde_json::to_value(data)?;
    let context =
        Context::from_value(value).map_err(|e| ExportError::TemplateRender(e.to_string()))?;
    Ok(tera.render(template_name, &context)?)
}
