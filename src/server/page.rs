use crate::analysis::AnalysisTask;
use html_escape::{encode_double_quoted_attribute, encode_text};

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{TITLE}}</title>
<style>
  body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 820px; margin: 2em auto; padding: 0 1em; color: #222; }
  h1 { font-size: 1.6em; }
  details { margin-bottom: 1em; color: #555; }
  label { display: block; margin: 1em 0 0.3em; font-weight: 600; }
  select, input[type=file] { width: 100%; }
  #preview { max-width: 100%; margin-top: 1em; display: none; }
  #response { white-space: pre-wrap; border: 1px solid #ddd; border-radius: 6px; padding: 1em; min-height: 3em; margin-top: 1em; }
  .error { color: #b00020; }
  .success { color: #1b5e20; }
  .hidden { display: none; }
</style>
</head>
<body>
<h1>{{TITLE}}</h1>
<details>
  <summary>About</summary>
  <p>Upload a JPEG or PNG image, choose one of the analysis tasks and the
  image is sent to the hosted vision model together with the task
  instruction. The reply can be streamed as it is generated.</p>
</details>
<p>Upload an image and select the image analysis task.</p>
<form id="generate-form">
  <label for="image">Upload an Image</label>
  <input type="file" id="image" name="image" accept="image/jpeg,image/png,.jpg,.jpeg,.png">
  <img id="preview" alt="Uploaded Image">
  <label for="task">Select an image analysis task:</label>
  <select id="task" name="task">
{{OPTIONS}}
  </select>
  <label><input type="checkbox" id="stream" checked> Begin streaming the AI response as soon as it is available.</label>
  <p><button type="submit" id="generate">Generate Response</button> <span id="spinner" class="hidden">Processing...</span></p>
</form>
<div id="status"></div>
<div id="response"></div>
<script>
const form = document.getElementById('generate-form');
const imageInput = document.getElementById('image');
const preview = document.getElementById('preview');
const streamBox = document.getElementById('stream');
const statusEl = document.getElementById('status');
const responseEl = document.getElementById('response');
const spinner = document.getElementById('spinner');
const button = document.getElementById('generate');

fetch('/api/preferences').then(r => r.json()).then(p => { streamBox.checked = p.stream; });

streamBox.addEventListener('change', () => {
  fetch('/api/preferences', {
    method: 'PUT',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ stream: streamBox.checked })
  });
});

imageInput.addEventListener('change', () => {
  const file = imageInput.files[0];
  if (!file) { preview.style.display = 'none'; return; }
  preview.src = URL.createObjectURL(file);
  preview.style.display = 'block';
});

function showStatus(text, cls) {
  statusEl.textContent = text;
  statusEl.className = cls || '';
}

async function readEvents(response) {
  const reader = response.body.getReader();
  const decoder = new TextDecoder();
  let buffer = '';
  let eventName = 'message';
  let data = [];
  for (;;) {
    const { value, done } = await reader.read();
    if (done) break;
    buffer += decoder.decode(value, { stream: true });
    let newline;
    while ((newline = buffer.indexOf('\n')) >= 0) {
      const line = buffer.slice(0, newline).replace(/\r$/, '');
      buffer = buffer.slice(newline + 1);
      if (line === '') {
        if (data.length) handleEvent(eventName, data.join('\n'));
        eventName = 'message';
        data = [];
      } else if (line.startsWith('event:')) {
        eventName = line.slice(6).trim();
      } else if (line.startsWith('data:')) {
        data.push(line.slice(5).replace(/^ /, ''));
      }
    }
  }
}

function handleEvent(name, raw) {
  let payload;
  try { payload = JSON.parse(raw); } catch (e) { return; }
  if (name === 'delta') {
    responseEl.textContent = payload.text;
  } else if (name === 'done') {
    responseEl.textContent = payload.text;
    showStatus('Response generated!', 'success');
  } else if (name === 'error') {
    showStatus(payload.error, 'error');
  }
}

form.addEventListener('submit', async (event) => {
  event.preventDefault();
  const data = new FormData();
  if (imageInput.files[0]) data.append('image', imageInput.files[0]);
  data.append('task', document.getElementById('task').value);
  data.append('stream', streamBox.checked ? 'true' : 'false');

  responseEl.textContent = '';
  showStatus('');
  spinner.classList.remove('hidden');
  button.disabled = true;
  try {
    const response = await fetch('/api/generate', { method: 'POST', body: data });
    const type = response.headers.get('content-type') || '';
    if (!response.ok) {
      const body = await response.json().catch(() => ({ error: response.statusText }));
      showStatus(body.error, 'error');
    } else if (type.startsWith('text/event-stream')) {
      await readEvents(response);
    } else {
      const body = await response.json();
      responseEl.textContent = 'AI Response: ' + body.content;
      showStatus('Response generated!', 'success');
    }
  } catch (e) {
    showStatus('An error occurred: ' + e, 'error');
  } finally {
    spinner.classList.add('hidden');
    button.disabled = false;
  }
});
</script>
</body>
</html>
"#;

/// Renders the single-page UI for the given model.
pub fn render(model: &str) -> String {
    let title = format!("Multimodal Image Analysis with {}", model);
    let options: Vec<String> = AnalysisTask::ALL
        .iter()
        .map(|task| {
            format!(
                "    <option value=\"{}\" title=\"{}\">{}</option>",
                encode_double_quoted_attribute(task.id()),
                encode_double_quoted_attribute(task.instruction()),
                encode_text(task.label())
            )
        })
        .collect();

    TEMPLATE
        .replace("{{TITLE}}", &encode_text(&title))
        .replace("{{OPTIONS}}", &options.join("\n"))
}
