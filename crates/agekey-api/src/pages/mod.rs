//! Server-rendered HTML pages.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::Html,
    routing::get,
};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::{ApiState, error::ApiError};

const TEMPLATES: [(&str, &str); 3] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("callback.html", include_str!("../../templates/callback.html")),
];

/// Compiled page templates. HTML escaping is on for every template.
#[derive(Clone, Debug)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);

        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        Ok(Self { env: Arc::new(env) })
    }

    pub fn render<C: Serialize>(&self, name: &str, ctx: C) -> Result<Html<String>, ApiError> {
        let html = self.env.get_template(name)?.render(ctx)?;
        Ok(Html(html))
    }
}

pub fn routes() -> Router<ApiState> {
    Router::new().route("/", get(index))
}

async fn index(State(state): State<ApiState>) -> Result<Html<String>, ApiError> {
    state
        .templates
        .render("index.html", context! { configured => state.configured })
}
