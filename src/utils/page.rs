use crate::models::{ResolvedForm, TimeSeries};

/// The single HTML page: the chart form plus either a chart or an error
pub struct Page<'a> {
    pub symbols: &'a [String],
    pub form: &'a ResolvedForm,
    pub chart_url: Option<&'a str>,
    pub error: Option<&'a str>,
}

impl<'a> Page<'a> {
    /// Create a page for a form with no result yet
    pub fn new(symbols: &'a [String], form: &'a ResolvedForm) -> Self {
        Page {
            symbols,
            form,
            chart_url: None,
            error: None,
        }
    }

    pub fn with_chart(mut self, chart_url: Option<&'a str>) -> Self {
        self.chart_url = chart_url;
        self
    }

    pub fn with_error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    /// Render the full document
    pub fn render(&self) -> String {
        let result = match (self.error, self.chart_url) {
            (Some(error), _) => format!(r#"<div class="error">{}</div>"#, escape_html(error)),
            (None, Some(url)) => format!(
                r#"<div class="chart"><img src="{}" alt="{} stock chart"></div>"#,
                escape_html(url),
                escape_html(&self.form.symbol)
            ),
            (None, None) => String::new(),
        };

        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Stock Data Visualizer</title>
    <style>
        body {{ font-family: sans-serif; max-width: 1280px; margin: 2rem auto; padding: 0 1rem; }}
        form {{ display: grid; grid-template-columns: max-content 16rem; gap: 0.6rem 1rem; align-items: center; }}
        .error {{ margin-top: 1.5rem; padding: 0.8rem; background: #fdecea; color: #8a1c12; border-radius: 4px; }}
        .chart img {{ margin-top: 1.5rem; max-width: 100%; }}
    </style>
</head>
<body>
    <h1>Stock Data Visualizer</h1>
    <form method="post" action="/">
        <label for="stock_symbol">Stock symbol</label>
        {symbol_input}
        <label for="chart_type">Chart type</label>
        <select id="chart_type" name="chart_type">
            {chart_options}
        </select>
        <label for="time_series">Time series</label>
        <select id="time_series" name="time_series">
            {series_options}
        </select>
        <label for="start_date">Start date</label>
        <input type="date" id="start_date" name="start_date" value="{start_date}" required>
        <label for="end_date">End date</label>
        <input type="date" id="end_date" name="end_date" value="{end_date}" required>
        <span></span>
        <button type="submit">Generate chart</button>
    </form>
    {result}
</body>
</html>"##,
            symbol_input = self.render_symbol_input(),
            chart_options = self.render_chart_options(),
            series_options = self.render_series_options(),
            start_date = escape_html(&self.form.start_date),
            end_date = escape_html(&self.form.end_date),
            result = result,
        )
    }

    /// A select when a symbol list is available, a free text box otherwise
    fn render_symbol_input(&self) -> String {
        if self.symbols.is_empty() {
            return format!(
                r#"<input type="text" id="stock_symbol" name="stock_symbol" value="{}" required>"#,
                escape_html(&self.form.symbol)
            );
        }

        let mut options: Vec<String> = self
            .symbols
            .iter()
            .map(|s| option(s, s, *s == self.form.symbol))
            .collect();

        // Keep a submitted symbol that is not in the list selected
        let symbol = self.form.symbol.as_str();
        if !symbol.is_empty() && !self.symbols.iter().any(|s| s == symbol) {
            options.insert(0, option(symbol, symbol, true));
        }
        format!(
            r#"<select id="stock_symbol" name="stock_symbol">{}</select>"#,
            options.join("")
        )
    }

    fn render_chart_options(&self) -> String {
        [("line", "Line"), ("bar", "Bar")]
            .iter()
            .map(|(value, label)| option(value, label, self.form.chart_type == *value))
            .collect()
    }

    fn render_series_options(&self) -> String {
        TimeSeries::ALL
            .iter()
            .map(|series| {
                let value = series.descriptor().function;
                option(value, series.label(), self.form.time_series == value)
            })
            .collect()
    }
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    )
}

/// Escape text for use in element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
