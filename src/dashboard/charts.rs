//! Chart generation and rendering for the dashboard.
//!
//! The monthly chart is a stacked bar chart with one series per service and
//! one category per month. Charts are generated as JSON configuration for the
//! ECharts library and rendered with an HTML container and the JavaScript that
//! initializes it.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, ItemStyle,
        JsFunction, Tooltip, Trigger,
    },
    series::bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{
    aggregation::MonthServiceMatrix,
    html::HeadElement,
    service::{display_name, service_color},
};

/// The path of the ECharts library under the static route.
pub(super) const ECHARTS_SCRIPT: &str = "/static/echarts.6.0.0.min.js";

/// A chart container and the ECharts options to draw in it.
pub(super) struct DashboardChart {
    /// The ID of the container element.
    pub id: &'static str,
    /// ECharts options serialized as JSON.
    pub options: String,
}

pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html! {
        section id="charts" class="mb-4 w-full"
        {
            @for chart in charts {
                div id=(chart.id) class="h-[420px] w-full rounded-md bg-white dark:bg-gray-100" {}
            }
        }
    }
}

/// Draws every chart once the page has loaded.
///
/// Charts switch between the light and dark theme with the system color
/// scheme and resize with the window.
const INIT_CHART_JS: &str = r#"function initChart(id, option) {
    const chart = echarts.init(document.getElementById(id));
    chart.setOption(option);
    window.addEventListener('resize', () => chart.resize());

    const scheme = window.matchMedia('(prefers-color-scheme: dark)');
    const applyScheme = () => chart.setTheme(scheme.matches ? 'dark' : 'default');
    scheme.addEventListener('change', applyScheme);
    applyScheme();
}"#;

pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let calls: String = charts
        .iter()
        .map(|chart| format!("    initChart(\"{}\", {});\n", chart.id, chart.options))
        .collect();

    HeadElement::ScriptSource(PreEscaped(format!(
        "{INIT_CHART_JS}\n\ndocument.addEventListener('DOMContentLoaded', () => {{\n{calls}}});"
    )))
}

/// The month labels of the chart's x axis, e.g. "Ene".
fn month_labels(matrix: &MonthServiceMatrix) -> Vec<String> {
    matrix
        .months
        .iter()
        .map(|month| month.month.short_name().to_owned())
        .collect()
}

/// A stacked bar chart of the expenses of one year by month and service.
///
/// Services keep the order of `matrix.services`, and the well known services
/// keep the same color every year.
pub(super) fn monthly_services_chart(matrix: &MonthServiceMatrix) -> Chart {
    let mut chart = Chart::new()
        .title(
            Title::new()
                .text(format!("Gastos de {}", matrix.year))
                .subtext("Por mes y servicio")
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(month_labels(matrix)),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        );

    for service in &matrix.services {
        let data: Vec<f64> = matrix
            .series(service)
            .iter()
            .map(|amount| amount.as_f64())
            .collect();

        let mut series = bar::Bar::new()
            .name(display_name(service))
            .stack("Gastos")
            .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
            .data(data);

        if let Some(color) = service_color(service) {
            series = series.item_style(ItemStyle::new().color(color));
        }

        chart = chart.series(series);
    }

    chart
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('es-AR', {
              style: 'currency',
              currency: 'ARS'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
