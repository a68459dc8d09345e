//! The category breakdown chart.
//!
//! The chart is built as an ECharts configuration and rendered as a container
//! with an inline script that initialises it, so that it is redrawn whenever
//! the summary partial is swapped in.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{Color, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::{
    dashboard::aggregation::{CategoryTotal, aggregate_by_category},
    expense::Expense,
};

const CATEGORY_CHART_ID: &str = "category-chart";

/// Render the spending by category chart, or a placeholder if there are no expenses.
pub(super) fn category_chart_view(expenses: &[Expense], dark_mode: bool) -> Markup {
    let totals = aggregate_by_category(expenses);

    if totals.is_empty() {
        return html! {
            p class="py-16 text-center text-gray-500 dark:text-gray-400"
            {
                "Add expenses to see the breakdown by category"
            }
        };
    }

    let script = chart_script(CATEGORY_CHART_ID, &category_chart(&totals), dark_mode);

    html! {
        div id=(CATEGORY_CHART_ID) class="min-h-[380px] w-full" {}
        script { (script) }
    }
}

fn category_chart(totals: &[CategoryTotal]) -> Chart {
    let colors: Vec<Color> = totals.iter().map(|total| Color::from(total.color)).collect();
    let data: Vec<(f64, &str)> = totals
        .iter()
        .map(|total| (total.total, total.category.label()))
        .collect();

    Chart::new()
        .title(Title::new().text("Spending by Category").left("center"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().bottom("0"))
        .color(colors)
        .series(
            Pie::new()
                .name("Spending")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

fn chart_script(id: &str, chart: &Chart, dark_mode: bool) -> PreEscaped<String> {
    let theme = if dark_mode { "'dark'" } else { "null" };

    PreEscaped(format!(
        r#"(function() {{
            const chartDom = document.getElementById("{id}");
            const chart = echarts.init(chartDom, {theme});
            chart.setOption({chart});
            window.addEventListener('resize', chart.resize);
        }})();"#
    ))
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use super::{category_chart, category_chart_view};
    use crate::{
        dashboard::aggregation::aggregate_by_category,
        expense::{Category, test_expenses::create_expense},
    };

    #[test]
    fn shows_placeholder_without_expenses() {
        let html = Html::parse_fragment(&category_chart_view(&[], false).into_string());

        assert!(
            html.select(&Selector::parse("#category-chart").unwrap())
                .next()
                .is_none()
        );
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Add expenses to see the breakdown by category"));
    }

    #[test]
    fn renders_chart_container_and_script() {
        let expenses = vec![create_expense(10.0, Category::Food, date!(2025 - 03 - 05))];

        let html = Html::parse_fragment(&category_chart_view(&expenses, false).into_string());

        assert!(
            html.select(&Selector::parse("#category-chart").unwrap())
                .next()
                .is_some()
        );
        let script = html
            .select(&Selector::parse("script").unwrap())
            .next()
            .expect("expected chart script");
        let script = script.inner_html();
        assert!(script.contains("Spending by Category"));
        assert!(script.contains("echarts.init(chartDom, null)"));
    }

    #[test]
    fn uses_dark_theme_in_dark_mode() {
        let expenses = vec![create_expense(10.0, Category::Food, date!(2025 - 03 - 05))];

        let markup = category_chart_view(&expenses, true).into_string();

        assert!(markup.contains("echarts.init(chartDom, 'dark')"));
    }

    #[test]
    fn chart_has_one_slice_per_category_in_palette_order() {
        let date = date!(2025 - 03 - 05);
        let expenses = vec![
            create_expense(10.0, Category::Food, date),
            create_expense(20.0, Category::Shopping, date),
            create_expense(5.0, Category::Food, date),
        ];

        let options = category_chart(&aggregate_by_category(&expenses)).to_string();
        let options: serde_json::Value = serde_json::from_str(&options).unwrap();

        assert_eq!(options["color"][0], "#2563eb");
        assert_eq!(options["color"][1], "#7c3aed");
        let data = options["series"][0]["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "Food");
        assert_eq!(data[0]["value"], 15.0);
        assert_eq!(data[1]["name"], "Shopping");
    }
}
