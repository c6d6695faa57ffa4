//! Page shell
//!
//! Header with the harness title and logout control, theme toggle, toast
//! region and the shared stylesheet.

use crate::session::Session;
use crate::track::MAP_STYLE;

pub const APP_TITLE: &str = "Voxx Test Harness";

/// How long a toast stays on screen
const TOAST_MILLIS: u32 = 3500;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

impl ToastKind {
    fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast-success",
            ToastKind::Warning => "toast-warning",
            ToastKind::Error => "toast-error",
        }
    }
}

/// Transient notification shown in the bottom-right corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// Wrap `body` in the full page shell
pub fn page(title: &str, session: &Session, body: &str, toast: Option<&Toast>) -> String {
    let logout = if session.is_authenticated() {
        r#"<form method="post" action="/auth/logout" class="inline">
        <button type="submit" class="btn btn-outline btn-sm">Logout</button>
      </form>"#
    } else {
        ""
    };

    let toast_html = toast
        .map(|t| {
            format!(
                r#"<div id="toast" class="toast {}" role="status">{}</div>"#,
                t.kind.class(),
                escape(&t.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en" data-theme="light">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <style>{style}{map_style}</style>
  <script>
    (function () {{
      var theme = localStorage.getItem('voxx_theme');
      if (!theme && window.matchMedia && window.matchMedia('(prefers-color-scheme: dark)').matches) theme = 'dark';
      document.documentElement.dataset.theme = theme || 'light';
    }})();
  </script>
</head>
<body>
  <button type="button" id="theme-toggle" class="btn btn-outline btn-sm theme-toggle">Theme</button>
  <main class="container">
    <div class="header">
      <a href="/"><h3>{app_title}</h3></a>
      {logout}
    </div>
    {body}
  </main>
  {toast}
  <script>{script}</script>
</body>
</html>
"#,
        title = escape(title),
        style = STYLE,
        map_style = MAP_STYLE,
        app_title = APP_TITLE,
        logout = logout,
        body = body,
        toast = toast_html,
        script = page_script(),
    )
}

fn page_script() -> String {
    format!(
        r#"
document.getElementById('theme-toggle').addEventListener('click', function () {{
  var next = document.documentElement.dataset.theme === 'dark' ? 'light' : 'dark';
  document.documentElement.dataset.theme = next;
  localStorage.setItem('voxx_theme', next);
}});
document.querySelectorAll('form[data-busy]').forEach(function (form) {{
  form.addEventListener('submit', function () {{
    var button = form.querySelector('button[type=submit]');
    if (!button) return;
    button.disabled = true;
    if (button.dataset.loading) button.textContent = button.dataset.loading;
  }});
}});
var toast = document.getElementById('toast');
if (toast) setTimeout(function () {{ toast.remove(); }}, {millis});
"#,
        millis = TOAST_MILLIS
    )
}

const STYLE: &str = r#"
:root { --bg: #ffffff; --fg: #0a0a0a; --muted: #f4f4f5; --muted-fg: #71717a; --border: #e4e4e7; --primary: #18181b; --primary-fg: #fafafa; --danger: #ef4444; --ok: #16a34a; }
[data-theme="dark"] { --bg: #0a0a0a; --fg: #fafafa; --muted: #27272a; --muted-fg: #a1a1aa; --border: #27272a; --primary: #fafafa; --primary-fg: #18181b; }
* { box-sizing: border-box; }
body { margin: 0; min-width: 360px; background: var(--bg); color: var(--fg); font-family: ui-sans-serif, system-ui, sans-serif; }
a { color: inherit; }
.container { max-width: 1400px; margin: 0 auto; padding: 1rem; min-height: 100vh; }
.header { display: flex; align-items: center; justify-content: space-between; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 1.5rem; margin: 1.5rem 0; }
.card { border: 1px solid var(--border); border-radius: .75rem; padding: 1.25rem; height: fit-content; }
.card h2 { margin: 0 0 1rem; font-size: 1.1rem; }
.field { display: flex; flex-direction: column; gap: .35rem; margin-bottom: .9rem; }
.row { display: flex; gap: .5rem; align-items: center; flex-wrap: wrap; }
label { font-size: .875rem; font-weight: 500; }
input, select { height: 2.25rem; padding: 0 .6rem; border: 1px solid var(--border); border-radius: .375rem; background: var(--bg); color: var(--fg); }
.btn { display: inline-flex; align-items: center; justify-content: center; height: 2.25rem; padding: 0 1rem; border-radius: .375rem; border: none; background: var(--primary); color: var(--primary-fg); font-weight: 500; cursor: pointer; width: 100%; }
.btn:disabled { opacity: .5; cursor: not-allowed; }
.btn-outline { background: var(--bg); color: var(--fg); border: 1px solid var(--border); }
.btn-sm { height: 1.75rem; font-size: .8rem; width: fit-content; }
.inline { display: inline; }
.error { color: var(--danger); font-size: .875rem; }
.success { color: var(--ok); font-size: .875rem; }
.muted { color: var(--muted-fg); font-size: .875rem; }
.tabs { display: flex; gap: .25rem; margin-bottom: .5rem; }
.tabs span { flex: 1; text-align: center; padding: .3rem; border-radius: .375rem; background: var(--muted); font-size: .85rem; }
.tabs span.active { background: var(--bg); border: 1px solid var(--border); }
table { width: 100%; border-collapse: collapse; font-size: .875rem; }
th { background: var(--muted); text-align: left; }
th, td { border: 1px solid var(--border); padding: .5rem; }
.scroll { max-height: 10rem; overflow-y: auto; }
pre { margin: 0; max-height: 80vh; overflow: auto; border: 1px solid var(--border); border-radius: .375rem; padding: .5rem; font-size: .8rem; background: var(--muted); }
.split { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.theme-toggle { position: absolute; top: .5rem; right: .5rem; z-index: 50; }
.toast { position: fixed; right: 1rem; bottom: 1rem; padding: .75rem 1rem; border-radius: .5rem; color: #fff; box-shadow: 0 10px 20px rgba(0,0,0,.2); }
.toast-success { background: #16a34a; }
.toast-warning { background: #d97706; }
.toast-error { background: #dc2626; }
"#;
