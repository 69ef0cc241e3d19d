//! Server-rendered chat page.

use std::fmt::Write;

use crate::agent::AgentEvent;
use crate::chat::{ChatRole, ChatTurn, DEFAULT_QUESTION};

pub const PAGE_TITLE: &str = "Text To Maths Problem Solver And Data Search Assistant";
pub const PAGE_ICON: &str = "🧮";
pub const HEADING: &str = "CrackMaths - Text To Maths Problem Solver.";
pub const BUSY_MESSAGE: &str = "Still working on your previous question. This page refreshes on its own.";

/// Seconds between refreshes of the busy page.
const BUSY_REFRESH_SECS: u32 = 2;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; min-height: 100vh; }
aside { width: 18rem; padding: 1.5rem; background: #f0f2f6; }
main { flex: 1; padding: 1.5rem 3rem; max-width: 52rem; }
.custom-title {
    border: 2px solid pink;
    background-color: #222;
    color: white;
    padding: 10px;
    text-align: center;
    transition: all 0.3s ease-in-out;
    margin-bottom: 20px;
}
.custom-title:hover {
    transform: scale(1.1);
    color: red;
    border-color: red;
    background-color: white;
}
.transcript { max-height: 60vh; overflow-y: auto; }
.turn { padding: 0.75rem 1rem; margin: 0.5rem 0; border-radius: 0.5rem; white-space: pre-wrap; }
.turn.user { background: #e8f0fe; }
.turn.assistant { background: #f7f7f7; }
.turn .role { font-weight: bold; margin-right: 0.5rem; }
.banner { padding: 0.75rem 1rem; border-radius: 0.5rem; margin: 0.75rem 0; white-space: pre-wrap; }
.banner.info { background: #e7f1fb; color: #0b4f8a; }
.banner.warning { background: #fff8e1; color: #8a6d0b; }
.banner.success { background: #e6f4ea; color: #1e6b34; }
.banner.error { background: #fdecea; color: #8a1c12; }
details.step { border-left: 3px solid #ccc; padding-left: 0.75rem; margin: 0.25rem 0; }
details.step pre { white-space: pre-wrap; }
textarea { width: 100%; min-height: 6rem; }
"#;

/// Submits the question to `/api/ask` and renders the SSE steps as they
/// arrive. Without fetch streaming the form posts to `/ask` as usual.
const LIVE_SCRIPT: &str = r#"<script>
(function () {
  var form = document.getElementById('ask-form');
  if (!form || !window.fetch || !window.TextDecoder || !window.ReadableStream) return;
  var result = document.getElementById('result');
  var transcript = document.querySelector('.transcript');

  function el(tag, cls, text) {
    var node = document.createElement(tag);
    if (cls) node.className = cls;
    if (text !== undefined) node.textContent = text;
    return node;
  }
  function turn(role, text) {
    var node = el('div', 'turn ' + role);
    node.appendChild(el('span', 'role', role === 'user' ? '🧑' : '🤖'));
    node.appendChild(document.createTextNode(text));
    transcript.appendChild(node);
  }
  function step(summary, body) {
    var node = el('details', 'step');
    node.appendChild(el('summary', null, summary));
    node.appendChild(el('pre', null, body));
    result.appendChild(node);
  }
  function handle(ev) {
    switch (ev.type) {
      case 'thought': step('🤔 Thinking', ev.content); break;
      case 'tool_call': step('🛠️ ' + ev.tool, ev.input); break;
      case 'tool_result': step('✅ ' + ev.tool + ' result', ev.output); break;
      case 'parse_error': step('⚠️ Unparseable step', ev.message); break;
      case 'answer':
        result.appendChild(el('h3', null, 'Response:'));
        result.appendChild(el('div', 'banner success', ev.content));
        turn('assistant', ev.content);
        break;
      case 'error': result.appendChild(el('div', 'banner error', ev.message)); break;
    }
  }

  form.addEventListener('submit', function (e) {
    var question = form.elements.question.value;
    if (!question.trim()) return;
    e.preventDefault();
    fetch('/api/ask', {
      method: 'POST',
      headers: {'Content-Type': 'application/json'},
      body: JSON.stringify({question: question})
    }).then(function (res) {
      if (!res.ok || !res.body) { form.submit(); return; }
      result.textContent = '';
      turn('user', question);
      var reader = res.body.getReader();
      var decoder = new TextDecoder();
      var buf = '';
      function pump() {
        return reader.read().then(function (chunk) {
          if (chunk.done) return;
          buf += decoder.decode(chunk.value, {stream: true});
          var idx;
          while ((idx = buf.indexOf('\n\n')) >= 0) {
            var frame = buf.slice(0, idx);
            buf = buf.slice(idx + 2);
            var data = frame.split('\n')
              .filter(function (l) { return l.indexOf('data:') === 0; })
              .map(function (l) { return l.slice(5).trim(); })
              .join('');
            if (data) handle(JSON.parse(data));
          }
          return pump();
        });
      }
      return pump();
    }).catch(function (err) {
      result.appendChild(el('div', 'banner error', String(err)));
    });
  });
})();
</script>
"#;

/// Inline status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Info(String),
    Warning(String),
    Success(String),
    Error(String),
}

impl Banner {
    fn class(&self) -> &'static str {
        match self {
            Banner::Info(_) => "info",
            Banner::Warning(_) => "warning",
            Banner::Success(_) => "success",
            Banner::Error(_) => "error",
        }
    }

    fn text(&self) -> &str {
        match self {
            Banner::Info(t) | Banner::Warning(t) | Banner::Success(t) | Banner::Error(t) => t,
        }
    }
}

/// Everything one render needs.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    /// A turn is in flight; render a self-refreshing placeholder.
    pub busy: bool,
    pub has_credential: bool,
    pub turns: &'a [ChatTurn],
    /// Text area content; the default question when `None`.
    pub question: Option<&'a str>,
    pub banner: Option<Banner>,
    pub steps: &'a [AgentEvent],
    /// Final answer of the turn just processed.
    pub response: Option<&'a str>,
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn render_banner(out: &mut String, banner: &Banner) {
    let _ = write!(
        out,
        r#"<div class="banner {}">{}</div>"#,
        banner.class(),
        escape_html(banner.text())
    );
}

fn render_turn(out: &mut String, turn: &ChatTurn) {
    let (class, label) = match turn.role {
        ChatRole::User => ("user", "🧑"),
        ChatRole::Assistant => ("assistant", "🤖"),
    };
    let _ = write!(
        out,
        r#"<div class="turn {class}"><span class="role">{label}</span>{}</div>"#,
        escape_html(&turn.content)
    );
}

fn render_step(out: &mut String, step: &AgentEvent) {
    let (summary, body) = match step {
        AgentEvent::Thought { content } => ("🤔 Thinking".to_string(), content.clone()),
        AgentEvent::ToolCall { tool, input } => (format!("🛠️ {}", tool), input.clone()),
        AgentEvent::ToolResult { tool, output } => (format!("✅ {} result", tool), output.clone()),
        AgentEvent::ParseError { message } => ("⚠️ Unparseable step".to_string(), message.clone()),
        // Answers and errors are shown as banners instead.
        AgentEvent::Answer { .. } | AgentEvent::Error { .. } => return,
    };
    let _ = write!(
        out,
        r#"<details class="step"><summary>{}</summary><pre>{}</pre></details>"#,
        escape_html(&summary),
        escape_html(&body)
    );
}

/// Render the full page.
pub fn render(view: &PageView<'_>) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
{refresh}<title>{title}</title>
<link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>{icon}</text></svg>">
<style>{style}</style>
</head>
<body>
<aside>
<form method="post" action="/credential">
<label for="api_key">Groq API Key</label>
<input type="password" id="api_key" name="api_key" autocomplete="off" placeholder="{placeholder}">
<button type="submit">Save</button>
</form>
</aside>
<main>
<h1 class="custom-title">{heading}</h1>
"#,
        refresh = if view.busy {
            format!("<meta http-equiv=\"refresh\" content=\"{}\">\n", BUSY_REFRESH_SECS)
        } else {
            String::new()
        },
        title = escape_html(PAGE_TITLE),
        icon = PAGE_ICON,
        style = STYLE,
        placeholder = if view.has_credential { "key saved" } else { "" },
        heading = escape_html(HEADING),
    );

    if view.busy {
        render_banner(&mut out, &Banner::Info(BUSY_MESSAGE.to_string()));
        out.push_str("</main>\n</body>\n</html>\n");
        return out;
    }

    if !view.has_credential {
        render_banner(&mut out, view.banner.as_ref().unwrap_or(&Banner::Info(
            crate::chat::MISSING_CREDENTIAL_MESSAGE.to_string(),
        )));
        out.push_str("</main>\n</body>\n</html>\n");
        return out;
    }

    out.push_str(r#"<section class="transcript">"#);
    for turn in view.turns {
        render_turn(&mut out, turn);
    }
    out.push_str("</section>\n");

    out.push_str(r#"<div id="result">"#);
    if !view.steps.is_empty() {
        out.push_str(r#"<section class="steps">"#);
        for step in view.steps {
            render_step(&mut out, step);
        }
        out.push_str("</section>\n");
    }

    if let Some(response) = view.response {
        out.push_str("<h3>Response:</h3>");
        render_banner(&mut out, &Banner::Success(response.to_string()));
    } else if let Some(banner) = &view.banner {
        render_banner(&mut out, banner);
    }
    out.push_str("</div>\n");

    let _ = write!(
        out,
        r#"<form id="ask-form" method="post" action="/ask">
<label for="question">Enter your question:</label>
<textarea id="question" name="question">{}</textarea>
<button type="submit">Find my answer</button>
</form>
</main>
"#,
        escape_html(view.question.unwrap_or(DEFAULT_QUESTION))
    );
    out.push_str(LIVE_SCRIPT);
    out.push_str("</body>\n</html>\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{GREETING, MISSING_CREDENTIAL_MESSAGE};

    fn turns() -> Vec<ChatTurn> {
        vec![
            ChatTurn::new(ChatRole::Assistant, GREETING),
            ChatTurn::new(ChatRole::User, "Is 2 < 3?"),
            ChatTurn::new(ChatRole::Assistant, "Yes"),
        ]
    }

    #[test]
    fn test_missing_credential_shows_only_info() {
        let turns = turns();
        let html = render(&PageView {
            has_credential: false,
            turns: &turns,
            ..Default::default()
        });
        assert!(html.contains(MISSING_CREDENTIAL_MESSAGE));
        assert!(html.contains(r#"class="banner info""#));
        assert!(!html.contains(r#"<section class="transcript">"#));
        assert!(!html.contains("Find my answer"));
        assert!(!html.contains("<textarea"));
    }

    #[test]
    fn test_transcript_in_insertion_order_and_escaped() {
        let turns = turns();
        let html = render(&PageView {
            has_credential: true,
            turns: &turns,
            ..Default::default()
        });
        let greeting = html.find(&escape_html(GREETING)).unwrap();
        let question = html.find("Is 2 &lt; 3?").unwrap();
        let answer = html.find(r#"class="turn assistant"><span class="role">🤖</span>Yes"#).unwrap();
        assert!(greeting < question && question < answer);
        assert!(html.contains(&escape_html(DEFAULT_QUESTION)));
        assert!(html.contains("Find my answer"));
    }

    #[test]
    fn test_rerender_is_identical() {
        let turns = turns();
        let view = PageView {
            has_credential: true,
            turns: &turns,
            ..Default::default()
        };
        assert_eq!(render(&view), render(&view));
    }

    #[test]
    fn test_steps_are_collapsed_and_response_is_success() {
        let turns = turns();
        let steps = vec![
            AgentEvent::ToolCall {
                tool: "Calculator".into(),
                input: "2+2".into(),
            },
            AgentEvent::Answer {
                content: "4".into(),
            },
        ];
        let html = render(&PageView {
            has_credential: true,
            turns: &turns,
            steps: &steps,
            response: Some("4"),
            ..Default::default()
        });
        assert!(html.contains(r#"<details class="step"><summary>🛠️ Calculator</summary>"#));
        assert!(!html.contains("<details class=\"step\" open"));
        assert!(html.contains(r#"<h3>Response:</h3><div class="banner success">4</div>"#));
    }

    #[test]
    fn test_busy_page_refreshes_without_transcript() {
        let html = render(&PageView {
            busy: true,
            ..Default::default()
        });
        assert!(html.contains(r#"<meta http-equiv="refresh" content="2">"#));
        assert!(html.contains(BUSY_MESSAGE));
        assert!(!html.contains(r#"<section class="transcript">"#));
        assert!(!html.contains("<textarea"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_form_streams_through_api_ask() {
        let turns = turns();
        let html = render(&PageView {
            has_credential: true,
            turns: &turns,
            ..Default::default()
        });
        assert!(html.contains(r#"<form id="ask-form" method="post" action="/ask">"#));
        assert!(html.contains(r#"<div id="result"></div>"#));
        assert!(html.contains("fetch('/api/ask'"));
        assert!(!html.contains("http-equiv=\"refresh\""));
        let script = html.find("<script>").unwrap();
        assert!(html.find(r#"id="ask-form""#).unwrap() < script);
    }

    #[test]
    fn test_warning_banner() {
        let turns = turns();
        let html = render(&PageView {
            has_credential: true,
            turns: &turns,
            question: Some(""),
            banner: Some(Banner::Warning("Please enter the question".into())),
            ..Default::default()
        });
        assert!(html.contains(r#"<div class="banner warning">Please enter the question</div>"#));
        assert!(html.contains("<textarea id=\"question\" name=\"question\"></textarea>"));
    }
}
