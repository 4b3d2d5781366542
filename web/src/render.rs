//! Handlebars implementation of the macro renderer.
//!
//! Each macro a handler may call is registered as a template of the same
//! name. Strict mode is on, so a context missing a field fails loudly.

use handlebars::Handlebars;
use town_core::error::RenderError;
use town_core::render::{MacroRenderer, Markup};

const DISPLAY_FORM: &str = r#"<div class="display-form" data-form="{{form.name}}">
<h2>{{title}}</h2>
<p class="form-title">{{form.title}}</p>
<p class="email"><a href="mailto:{{email}}">{{email}}</a></p>
<dl class="fields">
{{#each fields}}<dt>{{label}}</dt><dd>{{value}}</dd>
{{/each}}</dl>
</div>"#;

const RESERVATIONS: &str = r#"<div class="reservations" data-resource="{{resource.name}}">
<h2>{{resource.title}}</h2>
<ul>
{{#each reservations}}<li class="reservation{{#if accepted}} accepted{{/if}}">
<span class="start">{{start}}</span> - <span class="end">{{end}}</span>
<span class="quota">{{quota}}</span> <span class="email">{{email}}</span>
</li>
{{/each}}</ul>
</div>"#;

const DISPLAY_EVENT: &str = r#"<div class="display-event" data-state="{{event.state}}">
<h2>{{event.title}}</h2>
<p class="location">{{event.location}}</p>
<p class="time">{{event.start}} - {{event.end}}</p>
<div class="description">{{event.description}}</div>
{{#if event.submitter_email}}<p class="submitter">{{event.submitter_email}}</p>{{/if}}
</div>"#;

/// Renders ticket summaries with Handlebars.
#[derive(Debug, Clone)]
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Renderer with the built-in `display_form`, `reservations` and
    /// `display_event` macros.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if a built-in template fails to parse.
    pub fn new() -> Result<Self, RenderError> {
        let mut renderer = Self {
            handlebars: Handlebars::new(),
        };
        renderer.handlebars.set_strict_mode(true);

        renderer.register("display_form", DISPLAY_FORM)?;
        renderer.register("reservations", RESERVATIONS)?;
        renderer.register("display_event", DISPLAY_EVENT)?;

        Ok(renderer)
    }

    /// Registers (or replaces) the macro `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if the template fails to parse.
    pub fn register(&mut self, name: &str, template: &str) -> Result<(), RenderError> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| RenderError::Template(format!("{name}: {e}")))
    }
}

impl MacroRenderer for HandlebarsRenderer {
    fn render_macro(&self, name: &str, context: &serde_json::Value) -> Result<Markup, RenderError> {
        if !self.handlebars.has_template(name) {
            return Err(RenderError::UnknownMacro(name.to_string()));
        }

        self.handlebars
            .render(name, context)
            .map(Markup::new)
            .map_err(|e| RenderError::Template(format!("{name}: {e}")))
    }
}
