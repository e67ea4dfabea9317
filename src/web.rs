use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::panel::ControlPanel;

pub mod handlers;

pub type SharedPanel = Arc<RwLock<ControlPanel>>;

pub async fn start_web_server(
    panel: SharedPanel,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = Router::new()
        // Panel API
        .route("/api/panel", get(handlers::get_panel))
        .route("/api/control", post(handlers::set_control))
        .route("/api/refresh", post(handlers::refresh_panel))
        .route("/api/stream", get(handlers::stream_redirect))
        .route("/api/shutdown", post(handlers::shutdown_device))
        // Web interface
        .route("/", get(serve_panel_page))
        .layer(CorsLayer::permissive())
        .with_state(panel);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🌐 Panel web server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn serve_panel_page() -> Html<&'static str> {
    Html(PANEL_PAGE)
}

const PANEL_PAGE: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Camera Panel</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #2c2c2c;
            color: #ffffff;
        }
        .container {
            max-width: 900px;
            margin: 0 auto;
            background: #3a3a3a;
            padding: 20px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.3);
        }
        h1 { text-align: center; margin-bottom: 20px; }
        .stream-box {
            width: 100%;
            background: #000;
            border-radius: 4px;
            overflow: hidden;
            margin-bottom: 20px;
        }
        .stream-box img { width: 100%; display: block; }
        .folder {
            border: 1px solid #555;
            border-radius: 8px;
            padding: 15px;
            background: #4a4a4a;
            margin-bottom: 15px;
        }
        .folder h2 { margin: 0 0 10px 0; font-size: 16px; color: #cccccc; }
        .control-row {
            display: flex;
            justify-content: space-between;
            align-items: center;
            padding: 6px 0;
            border-bottom: 1px solid #555;
        }
        .control-row:last-child { border-bottom: none; }
        .control-row label { flex: 1; }
        .control-row input[type=range] { flex: 2; }
        .control-row output { width: 70px; text-align: right; }
        select, input { background: #2c2c2c; color: #fff; border: 1px solid #666; }
        .actions { display: flex; gap: 10px; }
        .btn {
            padding: 8px 16px;
            border: none;
            border-radius: 4px;
            cursor: pointer;
            font-size: 14px;
            background: #007bff;
            color: white;
        }
        .btn-danger { background: #dc3545; }
        .btn:hover { opacity: 0.8; }
        .offline { text-align: center; color: #cccccc; font-style: italic; padding: 40px; }
    </style>
</head>
<body>
    <div class="container">
        <h1>📷 Camera Panel</h1>

        <div class="stream-box"><img id="stream" src="/api/stream" alt="live stream"></div>

        <div class="folder">
            <h2>misc</h2>
            <div class="actions">
                <button class="btn" onclick="refreshPanel()">🔄 refresh</button>
                <button class="btn" onclick="reloadImage()">🖼️ reload image</button>
                <button class="btn btn-danger" onclick="shutdownDevice()">🛑 shutdown</button>
            </div>
        </div>

        <div class="folder" id="panel-folder">
            <h2>panel</h2>
            <div id="panel-controls" class="offline">Loading...</div>
        </div>

        <div class="folder" id="camera-folder">
            <h2>camera</h2>
            <div id="camera-controls" class="offline">Loading...</div>
        </div>
    </div>

    <script>
        let bound = false;

        async function loadPanel() {
            const response = await fetch('/api/panel');
            const body = await response.json();
            if (response.status !== 200) {
                document.getElementById('panel-controls').textContent =
                    'Device not reachable yet, use refresh to retry';
                return;
            }
            if (body.data.title) document.title = body.data.title;
            if (!bound) {
                bindControls(body.data.controls);
                bound = true;
            } else {
                updateControls(body.data.controls);
            }
        }

        function bindControls(controls) {
            document.getElementById('panel-controls').textContent = '';
            document.getElementById('camera-controls').textContent = '';
            for (const control of controls) {
                const target = control.scope === 'camera' ? 'camera-controls' : 'panel-controls';
                document.getElementById(target).appendChild(renderControl(control));
            }
        }

        function renderControl(control) {
            const row = document.createElement('div');
            row.className = 'control-row';
            const label = document.createElement('label');
            label.textContent = control.name;
            row.appendChild(label);

            let input;
            if (control.kind.type === 'toggle') {
                input = document.createElement('input');
                input.type = 'checkbox';
                input.checked = control.value;
                input.onchange = () => sendControl(control.name, input.checked);
            } else if (control.kind.type === 'range') {
                input = document.createElement('input');
                input.type = 'range';
                input.min = control.kind.min;
                input.max = control.kind.max;
                input.step = control.kind.step;
                input.value = control.value;
                const out = document.createElement('output');
                out.textContent = control.value;
                input.oninput = () => { out.textContent = input.value; };
                input.onchange = () => sendControl(control.name, parseInt(input.value, 10));
                row.appendChild(input);
                row.appendChild(out);
                input.dataset.name = control.name;
                input.dataset.kind = 'range';
                return row;
            } else {
                input = document.createElement('select');
                for (const option of control.kind.options) {
                    const el = document.createElement('option');
                    el.value = option;
                    el.textContent = option;
                    if (String(option) === String(control.value)) el.selected = true;
                    input.appendChild(el);
                }
                const numeric = control.kind.type === 'int_select';
                input.onchange = () =>
                    sendControl(control.name, numeric ? parseInt(input.value, 10) : input.value);
            }
            input.dataset.name = control.name;
            input.dataset.kind = control.kind.type;
            row.appendChild(input);
            return row;
        }

        function updateControls(controls) {
            for (const control of controls) {
                const input = document.querySelector(`[data-name="${control.name}"]`);
                if (!input) continue;
                if (input.type === 'checkbox') {
                    input.checked = control.value;
                } else {
                    input.value = control.value;
                    const out = input.parentElement.querySelector('output');
                    if (out) out.textContent = control.value;
                }
            }
        }

        async function sendControl(name, value) {
            await fetch('/api/control', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ name, value })
            });
        }

        async function refreshPanel() {
            await fetch('/api/refresh', { method: 'POST' });
            await loadPanel();
        }

        function reloadImage() {
            document.getElementById('stream').src = '/api/stream?' + Date.now();
        }

        async function shutdownDevice() {
            await fetch('/api/shutdown', { method: 'POST' });
        }

        loadPanel();
    </script>
</body>
</html>
"#;
