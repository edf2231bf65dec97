use std::sync::Arc;

use minijinja::Environment;
use serde::Serialize;

/// Templates are compiled into the binary. Names ending in `.html` are
/// auto-escaped.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("form.html", include_str!("../templates/form.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("create.html", include_str!("../templates/create.html")),
    ("view.html", include_str!("../templates/view.html")),
];

#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    pub fn load() -> crate::AppResult<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Templates { env: Arc::new(env) })
    }

    pub fn render(&self, name: &str, context: impl Serialize) -> crate::AppResult<String> {
        Ok(self.env.get_template(name)?.render(context)?)
    }
}
