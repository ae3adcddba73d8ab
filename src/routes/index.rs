use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Form;
use tracing::info;

use crate::models::ChartForm;
use crate::services::{request_service, symbol_service};
use crate::utils::Page;
use crate::AppState;

/// GET / - empty form with defaults
pub async fn show_form(State(state): State<Arc<AppState>>) -> Html<String> {
    let symbols = symbol_service::load_symbols(&state.config.symbols_csv);
    let form = request_service::resolve_form(ChartForm::default(), &symbols);

    Html(Page::new(&symbols, &form).render())
}

/// POST / - generate a chart for the submitted form
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(submitted): Form<ChartForm>,
) -> Html<String> {
    let symbols = symbol_service::load_symbols(&state.config.symbols_csv);
    let form = request_service::resolve_form(submitted, &symbols);
    info!(
        "📈 Chart requested: symbol={} type={} series={} range={}..{}",
        form.symbol, form.chart_type, form.time_series, form.start_date, form.end_date
    );

    let outcome = request_service::handle_submission(&state, &form).await;

    Html(
        Page::new(&symbols, &form)
            .with_chart(outcome.chart_url.as_deref())
            .with_error(outcome.error.as_deref())
            .render(),
    )
}
