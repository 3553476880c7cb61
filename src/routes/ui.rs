use axum::{response::Html, routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Document Analyzer</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 760px; margin: 2rem auto; color: #1d1d1f; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    .chat-container { max-height: 400px; overflow-y: auto; border: 1px solid #e6e6e6; border-radius: 10px; padding: 10px; background: #f5f5f5; }
    .user-message, .ai-message { padding: 10px; margin: 5px 10px; border-radius: 10px; max-width: 70%; white-space: pre-wrap; }
    .user-message { background: #d1ffd1; margin-left: auto; }
    .ai-message { background: #ffffff; margin-right: auto; }
    .status { margin-top: 0.5rem; }
    .status.ok { color: #1a7f37; }
    .status.warn { color: #9a6700; }
    .status.error { color: #cf222e; }
    input[type=text] { width: 100%; padding: 0.5rem; box-sizing: border-box; }
    button { margin-top: 0.75rem; padding: 0.6rem 1rem; }
    #chatSection { display: none; }
  </style>
</head>
<body>
  <h1>Document Analyzer</h1>

  <div class="card">
    <h2>Upload a PDF or DOCX file</h2>
    <input id="fileInput" type="file" accept=".pdf,.docx,application/pdf,application/vnd.openxmlformats-officedocument.wordprocessingml.document" />
    <button id="uploadBtn">Upload</button>
    <div id="uploadStatus" class="status"></div>
  </div>

  <div class="card" id="chatSection">
    <h2>Chat with the Document</h2>
    <div id="chat" class="chat-container"></div>
    <label for="question">Your question:</label>
    <input id="question" type="text" />
    <button id="sendBtn">Send</button>
    <div id="chatStatus" class="status"></div>
  </div>

  <script>
    const chat = document.getElementById('chat');
    const chatSection = document.getElementById('chatSection');
    const uploadStatus = document.getElementById('uploadStatus');
    const chatStatus = document.getElementById('chatStatus');
    const questionInput = document.getElementById('question');

    function setStatus(el, kind, text) {
      el.className = 'status ' + kind;
      el.textContent = text;
    }

    function render(entries) {
      chat.replaceChildren();
      for (const entry of entries) {
        const bubble = document.createElement('div');
        bubble.className = entry.role === 'user' ? 'user-message' : 'ai-message';
        bubble.textContent = entry.content;
        chat.appendChild(bubble);
      }
      chat.scrollTop = chat.scrollHeight;
    }

    async function refresh() {
      const doc = await fetch('/api/document');
      if (doc.ok) {
        const info = await doc.json();
        if (info.has_text) {
          chatSection.style.display = 'block';
          setStatus(uploadStatus, 'ok', 'Loaded ' + info.filename);
        }
      }
      const history = await fetch('/api/chat/history');
      if (history.ok) {
        render((await history.json()).entries);
      }
    }

    document.getElementById('uploadBtn').addEventListener('click', async () => {
      const fileInput = document.getElementById('fileInput');
      if (!fileInput.files.length) {
        setStatus(uploadStatus, 'warn', 'Select a file first.');
        return;
      }
      const formData = new FormData();
      formData.append('file', fileInput.files[0]);
      setStatus(uploadStatus, '', 'Processing...');
      const res = await fetch('/api/document', { method: 'POST', body: formData });
      const json = await res.json();
      if (!res.ok) {
        setStatus(uploadStatus, 'error', json.error);
        return;
      }
      if (json.has_text) {
        setStatus(uploadStatus, 'ok', 'Document successfully uploaded and processed!');
        chatSection.style.display = 'block';
      } else {
        setStatus(uploadStatus, 'warn', 'No readable text was found in ' + json.filename + '.');
        chatSection.style.display = 'none';
      }
    });

    const sendBtn = document.getElementById('sendBtn');
    sendBtn.addEventListener('click', async () => {
      const question = questionInput.value;
      if (question.trim() === '') {
        setStatus(chatStatus, 'warn', 'Please enter a question.');
        return;
      }
      sendBtn.disabled = true;
      setStatus(chatStatus, '', 'Thinking...');
      try {
        const res = await fetch('/api/chat', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ question })
        });
        const json = await res.json();
        if (res.ok) {
          render(json.history);
          questionInput.value = '';
          setStatus(chatStatus, 'ok', 'Answer generated successfully!');
        } else {
          setStatus(chatStatus, res.status === 400 ? 'warn' : 'error', json.error);
          await refresh();
        }
      } catch (err) {
        setStatus(chatStatus, 'error', 'Request failed: ' + err);
      } finally {
        sendBtn.disabled = false;
      }
    });

    refresh();
  </script>
</body>
</html>"#)
}
