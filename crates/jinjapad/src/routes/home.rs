//! The single-page front-end.
//!
//! Everything on the page talks to the JSON endpoints; the server only renders
//! the static shell.

use axum::response::IntoResponse;
use maud::{DOCTYPE, PreEscaped, html};

use crate::render::filters::FILTER_NAMES;

/// Render the home page.
pub async fn home_page() -> impl IntoResponse {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "jinjapad" }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                header class="bar" {
                    h1 { "jinjapad" }
                    span class="tag" id="input-format" {}
                    span class="tag" id="result-type" {}
                }
                main class="grid" {
                    section class="pane" {
                        div class="pane-head" {
                            label for="input" { "Input (JSON or YAML)" }
                            select id="fixtures" title="Load an input file" {
                                option value="" { "input files..." }
                            }
                        }
                        textarea id="input" spellcheck="false" placeholder="{\"name\": \"world\"}" {}
                    }
                    section class="pane" {
                        div class="pane-head" {
                            label for="expr" { "Template" }
                            button id="render" type="button" { "Render" }
                        }
                        textarea id="expr" spellcheck="false" placeholder="Hello {{ data.name }}!" {}
                    }
                    section class="pane wide" {
                        div class="pane-head" { span { "Result" } }
                        pre id="result" {}
                    }
                    section class="pane wide" {
                        div class="pane-head" {
                            span { "History " span id="history-size" {} }
                            button id="clear-history" type="button" { "Clear" }
                        }
                        ol id="history" reversed {}
                    }
                }
                footer class="footer" {
                    details {
                        summary { "Extra filters" }
                        p class="filters" {
                            @for name in FILTER_NAMES {
                                code { (name) } " "
                            }
                        }
                    }
                }
                script { (PreEscaped(PAGE_JS)) }
            }
        }
    }
}

const PAGE_CSS: &str = r#"
:root{--bg:#fafafa;--fg:#1a1a1a;--fg2:#555;--border:#ddd;--accent:#b5462c;--err:#c0392b;--mono:ui-monospace,SFMono-Regular,Menlo,monospace}
*{box-sizing:border-box;margin:0}
body{font-family:system-ui,sans-serif;background:var(--bg);color:var(--fg)}
.bar{display:flex;align-items:center;gap:.75rem;padding:.75rem 1rem;border-bottom:1px solid var(--border)}
.bar h1{font-size:1.2rem;font-weight:700}
.tag{font-family:var(--mono);font-size:.75rem;color:var(--fg2)}
.grid{display:grid;grid-template-columns:1fr 1fr;gap:1rem;padding:1rem}
.pane{display:flex;flex-direction:column;gap:.4rem;min-width:0}
.wide{grid-column:1/3}
.pane-head{display:flex;justify-content:space-between;align-items:center;font-size:.85rem;color:var(--fg2)}
textarea,pre{font-family:var(--mono);font-size:.85rem;border:1px solid var(--border);border-radius:4px;padding:.5rem;background:#fff}
textarea{min-height:16rem;resize:vertical}
pre{min-height:6rem;white-space:pre-wrap;word-break:break-word}
pre.error{color:var(--err)}
#history{font-family:var(--mono);font-size:.8rem;max-height:16rem;overflow:auto;padding-left:2rem}
#history li{cursor:pointer;padding:.15rem 0}
#history li:hover{color:var(--accent)}
.footer{padding:0 1rem 1rem;font-size:.8rem;color:var(--fg2)}
.filters code{font-family:var(--mono)}
"#;

const PAGE_JS: &str = r#"
const $ = (id) => document.getElementById(id);
const form = (obj) => new URLSearchParams(obj).toString();

async function render() {
  const res = await fetch('/render', {
    method: 'POST',
    headers: {'Content-Type': 'application/x-www-form-urlencoded'},
    body: form({json: $('input').value, expr: $('expr').value}),
  });
  const text = await res.text();
  $('result').textContent = text;
  $('result').classList.toggle('error', !res.ok);
  $('input-format').textContent = res.headers.get('X-Input-Format') || '';
  $('result-type').textContent = res.headers.get('X-Result-Type') || '';
  if (res.ok) loadHistory();
}

async function loadHistory() {
  const entries = await (await fetch('/history')).json();
  const max = (await (await fetch('/history/maxsize')).json()).max_size;
  $('history-size').textContent = `(${entries.length}/${max})`;
  const list = $('history');
  list.replaceChildren();
  for (const entry of entries.reverse()) {
    const li = document.createElement('li');
    li.textContent = `${entry.datetime}  ${entry.expr.split('\n')[0]}`;
    li.onclick = () => { $('input').value = entry.input; $('expr').value = entry.expr; };
    list.appendChild(li);
  }
}

async function loadFixtures() {
  const names = await (await fetch('/input-files')).json();
  const select = $('fixtures');
  const current = select.value;
  select.replaceChildren(select.options[0]);
  for (const name of names) {
    const opt = document.createElement('option');
    opt.value = opt.textContent = name;
    select.appendChild(opt);
  }
  select.value = names.includes(current) ? current : '';
}

$('fixtures').onchange = async (ev) => {
  if (!ev.target.value) return;
  const res = await fetch('/input-file-content?' + form({filename: ev.target.value}));
  if (res.ok) $('input').value = await res.text();
};

$('render').onclick = render;
$('expr').addEventListener('keydown', (ev) => {
  if (ev.key === 'Enter' && (ev.ctrlKey || ev.metaKey)) render();
});

$('clear-history').onclick = async () => {
  await fetch('/history/clear', {method: 'POST'});
  loadHistory();
};

(async () => {
  const settings = await (await fetch('/settings?section=input_files')).json();
  const seconds = parseFloat(settings.refresh_interval) || 1;
  loadHistory();
  loadFixtures();
  setInterval(loadFixtures, seconds * 1000);
})();
"#;
