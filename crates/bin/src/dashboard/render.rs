//! Server-side HTML for the dashboard.

use frontier::OptimizationResult;
use frontier::optim::Objective;
use frontier::output::{format_percent, format_ratio};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; display: flex; min-height: 100vh; color: #1f2933; }
aside { width: 18rem; padding: 1.5rem; background: #f3f4f6; }
main { flex: 1; padding: 1.5rem 2rem; }
label { display: block; margin-top: 1rem; font-size: 0.9rem; }
input, select { width: 100%; padding: 0.4rem; margin-top: 0.25rem; box-sizing: border-box; }
button { margin-top: 1.5rem; width: 100%; padding: 0.6rem; background: #2563eb; color: #fff; border: 0; border-radius: 4px; cursor: pointer; }
table { border-collapse: collapse; min-width: 20rem; }
th, td { text-align: left; padding: 0.4rem 0.8rem; border-bottom: 1px solid #e5e7eb; }
.metrics { display: flex; gap: 2rem; }
.metric { padding: 1rem; background: #f9fafb; border-radius: 6px; min-width: 10rem; }
.metric .value { font-size: 1.6rem; font-weight: 600; }
.success { padding: 0.8rem; background: #dcfce7; border-radius: 4px; }
.error { padding: 0.8rem; background: #fee2e2; color: #991b1b; border-radius: 4px; }
"#;

/// Values echoed back into the form.
#[derive(Debug, Clone, Default)]
pub(crate) struct FormValues {
    pub(crate) tickers: String,
    pub(crate) start: String,
    pub(crate) end: String,
    pub(crate) objective: Option<Objective>,
}

/// Escape text for use in HTML element content and quoted attributes.
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

fn objective_options(selected: Objective) -> String {
    [Objective::MaxSharpe, Objective::MinVolatility]
        .iter()
        .map(|o| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                o.as_str(),
                if *o == selected { " selected" } else { "" },
                o.label()
            )
        })
        .collect()
}

fn form(values: &FormValues) -> String {
    format!(
        r#"<aside>
<form method="get" action="/optimize">
<label>Enter Stock Tickers<input type="text" name="tickers" value="{tickers}" placeholder="AAPL, MSFT, GOOGL"></label>
<label>Start Date<input type="date" name="start" value="{start}"></label>
<label>End Date<input type="date" name="end" value="{end}"></label>
<label>Objective<select name="objective">{options}</select></label>
<button type="submit">Optimize Portfolio</button>
</form>
</aside>"#,
        tickers = escape_html(&values.tickers),
        start = escape_html(&values.start),
        end = escape_html(&values.end),
        options = objective_options(values.objective.unwrap_or(Objective::MaxSharpe)),
    )
}

fn page(values: &FormValues, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Portfolio Optimizer</title>
<style>{STYLE}</style>
</head>
<body>
{form}
<main>
<h1>Portfolio Optimizer</h1>
<p>Enter stock tickers separated by comma (e.g. <code>AAPL, MSFT, GOOGL</code>)<br>
&amp; for Indian stocks enter suffix as <code>.NS</code> (e.g. <code>RELIANCE.NS, TCS.NS</code>)</p>
{content}
</main>
</body>
</html>"#,
        form = form(values),
    )
}

/// The empty form.
pub(crate) fn index_page(values: &FormValues) -> String {
    page(values, "")
}

/// A failed run: one banner carrying the error text.
pub(crate) fn error_page(values: &FormValues, message: &str) -> String {
    let banner = format!(
        r#"<div class="error">Something went wrong: {}</div>"#,
        escape_html(message)
    );
    page(values, &banner)
}

/// A successful run: weights table, allocation chart and metrics.
pub(crate) fn result_page(values: &FormValues, result: &OptimizationResult) -> String {
    let mut content = String::new();
    let _ = writeln!(
        content,
        r#"<div class="success">Portfolio optimized successfully ({}, {} daily returns).</div>"#,
        escape_html(result.objective.label()),
        result.observations
    );

    content.push_str("<h2>Optimized Portfolio Weights</h2>\n");
    content.push_str(&weights_table(result));
    content.push_str("<h2>Portfolio Allocation</h2>\n");
    content.push_str(&bar_chart(&result.tickers, &result.weights));
    content.push_str("<h2>Portfolio Metrics</h2>\n");
    content.push_str(&metrics(result));

    page(values, &content)
}

fn weights_table(result: &OptimizationResult) -> String {
    let mut html = String::from("<table>\n<tr><th>Stock</th><th>Weight (%)</th></tr>\n");
    for (ticker, weight) in result.tickers.iter().zip(&result.weights) {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{:.2}</td></tr>",
            escape_html(ticker),
            weight * 100.0
        );
    }
    html.push_str("</table>\n");
    html
}

fn metrics(result: &OptimizationResult) -> String {
    let cards = [
        (
            "Expected Return",
            format_percent(result.metrics.expected_annual_return),
        ),
        ("Volatility", format_percent(result.metrics.annual_volatility)),
        ("Sharpe Ratio", format_ratio(result.metrics.sharpe_ratio)),
    ];

    let mut html = String::from(r#"<div class="metrics">"#);
    for (label, value) in cards {
        let _ = write!(
            html,
            r#"<div class="metric"><div>{label}</div><div class="value">{value}</div></div>"#
        );
    }
    html.push_str("</div>\n");
    html
}

/// Vertical bar chart of weights in percent, as inline SVG.
pub(crate) fn bar_chart(tickers: &[String], weights: &[f64]) -> String {
    const WIDTH: f64 = 640.0;
    const HEIGHT: f64 = 320.0;
    const MARGIN: f64 = 32.0;
    const COLORS: [&str; 6] = ["#2563eb", "#f97316", "#16a34a", "#dc2626", "#9333ea", "#0891b2"];

    let n = tickers.len().max(1) as f64;
    let plot_height = HEIGHT - 2.0 * MARGIN;
    let slot = (WIDTH - 2.0 * MARGIN) / n;
    let bar_width = slot * 0.7;
    let max_weight = weights.iter().copied().fold(0.0_f64, f64::max);
    let scale = if max_weight > 0.0 {
        plot_height / max_weight
    } else {
        0.0
    };

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Portfolio allocation">"#
    );
    let baseline = HEIGHT - MARGIN;
    let _ = write!(
        svg,
        r##"<line x1="{MARGIN}" y1="{baseline}" x2="{x2}" y2="{baseline}" stroke="#9ca3af"/>"##,
        x2 = WIDTH - MARGIN
    );

    for (i, (ticker, weight)) in tickers.iter().zip(weights).enumerate() {
        let height = weight.max(0.0) * scale;
        let x = MARGIN + i as f64 * slot + (slot - bar_width) / 2.0;
        let y = baseline - height;
        let center = x + bar_width / 2.0;
        let _ = write!(
            svg,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{color}"><title>{label}: {pct:.2}%</title></rect><text x="{center:.1}" y="{ty:.1}" text-anchor="middle" font-size="12">{pct:.2}</text><text x="{center:.1}" y="{ly:.1}" text-anchor="middle" font-size="12">{label}</text>"#,
            color = COLORS[i % COLORS.len()],
            label = escape_html(ticker),
            pct = weight * 100.0,
            ty = y - 4.0,
            ly = baseline + 16.0,
        );
    }

    svg.push_str("</svg>\n");
    svg
}
