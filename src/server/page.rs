//! Trigger page served at `GET /`.

use std::marker::PhantomData;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// Variables for the trigger page.
pub struct PageVars {
    pub version: &'static str,
    pub mods: Vec<String>,
}

impl TemplateVars for PageVars {
    fn apply(&self, content: &str) -> String {
        let mods: String = self
            .mods
            .iter()
            .map(|name| format!("<li>{}</li>", escape(name)))
            .collect();
        content
            .replace("__VERSION__", &escape(self.version))
            .replace("__MODS__", &mods)
    }
}

/// Trigger page: one button that POSTs to `/hot-reload`.
pub const TRIGGER_HTML: Template<PageVars> = Template::new(
    r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Mod Hot Reload</title></head>
<body>
<h3>Mod Hot Reload</h3>
<button onclick="fetch('/hot-reload',{method:'POST'}).then(r=>r.text()).then(t=>{document.getElementById('status').textContent=t})">Hot Reload</button>
<p id="status"></p>
<ul>__MODS__</ul>
<small>modreload __VERSION__</small>
</body></html>
"#,
);

/// Escape text for an HTML body.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_mods() {
        let html = TRIGGER_HTML.render(&PageVars {
            version: "0.1.0",
            mods: vec!["Alpha".to_string(), "<Beta>".to_string()],
        });
        assert!(html.contains("<li>Alpha</li>"));
        assert!(html.contains("<li>&lt;Beta&gt;</li>"));
        assert!(html.contains("modreload 0.1.0"));
        assert!(html.contains("/hot-reload"));
    }
}
