// Single-page dashboard. Symbols and chart come from /api/v1/dashboard, the
// table from /api/v1/prices (every row, so column sorts cover the whole
// snapshot). The figure JSON is handed straight to plotly.js.

use axum::response::Html;

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Binance 24h Movers</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #0e1117;
            color: #fafafa;
            padding: 24px 32px;
        }
        h2, h4 { color: #21c354; margin: 12px 0; }
        label { display: block; margin: 8px 0 4px; color: #a3a8b8; }
        select {
            background: #262730;
            color: #fafafa;
            border: 1px solid #3b3d4a;
            border-radius: 4px;
            padding: 6px 10px;
            min-width: 240px;
        }
        #error {
            display: none;
            margin: 12px 0;
            padding: 12px 16px;
            background: #3e1c1c;
            border: 1px solid #ff4b4b;
            border-radius: 4px;
            color: #ffbdbd;
        }
        #status { color: #a3a8b8; margin: 8px 0; min-height: 1.2em; }
        .table-wrap { max-height: 420px; overflow: auto; border: 1px solid #262730; margin: 12px 0; }
        table { border-collapse: collapse; width: 100%; font-size: 13px; }
        th, td { padding: 4px 8px; text-align: right; white-space: nowrap; }
        th { position: sticky; top: 0; background: #262730; cursor: pointer; user-select: none; }
        th:first-child, td:first-child { text-align: left; }
        tr:nth-child(even) td { background: #161a23; }
        td.up { color: #21c354; }
        td.down { color: #ff4b4b; }
    </style>
</head>
<body>
    <h2>Binance largest 24h price changes</h2>

    <label for="symbol">Select symbol</label>
    <select id="symbol"></select>

    <div id="error"></div>
    <div id="status"></div>

    <div class="table-wrap">
        <table>
            <thead><tr id="table-head"></tr></thead>
            <tbody id="table-body"></tbody>
        </table>
    </div>

    <h4 id="chart-title"></h4>
    <div id="chart"></div>

    <script>
        const COLUMNS = [
            'symbol', 'priceChange', 'priceChangePercent', 'weightedAvgPrice',
            'prevClosePrice', 'lastPrice', 'lastQty', 'bidPrice', 'bidQty',
            'askPrice', 'askQty', 'openPrice', 'highPrice', 'lowPrice',
            'volume', 'quoteVolume', 'openTime', 'closeTime', 'firstId',
            'lastId', 'count'
        ];

        let rows = [];
        let sortState = { key: 'priceChange', desc: true };

        function setStatus(text) {
            document.getElementById('status').textContent = text;
        }

        function showError(message) {
            const el = document.getElementById('error');
            el.textContent = 'Failed to load market data: ' + message;
            el.style.display = 'block';
            document.getElementById('chart-title').textContent = '';
            document.getElementById('table-body').innerHTML = '';
            Plotly.purge('chart');
        }

        function clearError() {
            const el = document.getElementById('error');
            el.textContent = '';
            el.style.display = 'none';
        }

        function renderHead() {
            const head = document.getElementById('table-head');
            head.innerHTML = '';
            for (const col of COLUMNS) {
                const th = document.createElement('th');
                const arrow = sortState.key === col ? (sortState.desc ? ' ▼' : ' ▲') : '';
                th.textContent = col + arrow;
                th.addEventListener('click', () => {
                    sortState = { key: col, desc: sortState.key === col ? !sortState.desc : true };
                    renderTable();
                });
                head.appendChild(th);
            }
        }

        function renderTable() {
            renderHead();
            const { key, desc } = sortState;
            const sorted = [...rows].sort((a, b) => {
                const x = a[key], y = b[key];
                const ord = typeof x === 'string' ? x.localeCompare(y) : x - y;
                return desc ? -ord : ord;
            });
            const body = document.getElementById('table-body');
            body.innerHTML = '';
            for (const row of sorted) {
                const tr = document.createElement('tr');
                for (const col of COLUMNS) {
                    const td = document.createElement('td');
                    td.textContent = row[col];
                    if (col === 'priceChange' || col === 'priceChangePercent') {
                        td.className = row[col] > 0 ? 'up' : (row[col] < 0 ? 'down' : '');
                    }
                    tr.appendChild(td);
                }
                body.appendChild(tr);
            }
        }

        function renderSymbols(symbols, selected) {
            const select = document.getElementById('symbol');
            select.innerHTML = '';
            for (const sym of symbols) {
                const opt = document.createElement('option');
                opt.value = sym;
                opt.textContent = sym;
                select.appendChild(opt);
            }
            if (!symbols.includes(selected)) {
                const opt = document.createElement('option');
                opt.value = selected;
                opt.textContent = selected;
                select.appendChild(opt);
            }
            select.value = selected;
        }

        async function getJson(url) {
            const resp = await fetch(url);
            const body = await resp.json();
            if (!resp.ok) {
                throw new Error(body.error ? body.error.message : resp.statusText);
            }
            return body;
        }

        async function load(symbol) {
            const params = new URLSearchParams({ limit: '1' });
            if (symbol) params.set('symbol', symbol);
            setStatus('Loading...');
            try {
                const [dash, table] = await Promise.all([
                    getJson('/api/v1/dashboard?' + params.toString()),
                    getJson('/api/v1/prices'),
                ]);
                clearError();
                rows = table;
                renderSymbols(dash.symbols, dash.selected);
                renderTable();
                document.getElementById('chart-title').textContent = dash.selected + ' price chart';
                Plotly.react('chart', dash.figure.data, dash.figure.layout, { responsive: true });
                setStatus('Updated ' + new Date(dash.generated_at).toLocaleTimeString());
            } catch (e) {
                setStatus('');
                showError(e.message);
            }
        }

        document.getElementById('symbol').addEventListener('change', (e) => load(e.target.value));
        window.onload = () => load(null);
    </script>
</body>
</html>
"##;
