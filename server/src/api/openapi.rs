//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{counters, health, stats, weather};
use crate::data::types::{CounterRow, WeatherPoint};
use crate::domain::stats::types::{
    DailyYearStats, DayValue, EvolutionStats, GroupStat, HourShare, HourlyDistribution,
    MonthValue, MonthlyStats, PendingDayValue, WeekComparison, WeekProfile, WeekdayHours,
    WeekdayTotal, WeekdayTotals, WeekdayWeekendSplit, YearProgress, YearlyProgressStats,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Compteurs API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Bicycle and pedestrian counter statistics for Montpellier"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "counters", description = "Counter metadata for the map view"),
        (name = "stats", description = "Aggregated traffic statistics"),
        (name = "weather", description = "Hourly weather observations for the counter zone")
    ),
    paths(
        // Health
        health::health,
        // Counters
        counters::list_counters,
        // Stats
        stats::daily_stats,
        stats::weekday_stats,
        stats::weekly_stats,
        stats::monthly_stats,
        stats::yearly_stats,
        stats::evolution_stats,
        stats::split_stats,
        stats::hourly_stats,
        stats::week_profile_stats,
        // Weather
        weather::get_weather,
    ),
    components(schemas(
        // Health
        health::HealthResponse,
        // Counters
        CounterRow,
        counters::ListCountersResponse,
        // Stats
        DayValue,
        DailyYearStats,
        WeekdayTotal,
        WeekdayTotals,
        PendingDayValue,
        WeekComparison,
        MonthValue,
        MonthlyStats,
        YearProgress,
        YearlyProgressStats,
        EvolutionStats,
        GroupStat,
        WeekdayWeekendSplit,
        HourShare,
        HourlyDistribution,
        WeekdayHours,
        WeekProfile,
        // Weather
        WeatherPoint,
        weather::WeatherResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Compteurs API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_all_stat_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/v1/health",
            "/api/v1/counters",
            "/api/v1/stats/daily",
            "/api/v1/stats/weekdays",
            "/api/v1/stats/weekly",
            "/api/v1/stats/monthly",
            "/api/v1/stats/yearly",
            "/api/v1/stats/evolution",
            "/api/v1/stats/split",
            "/api/v1/stats/hourly",
            "/api/v1/stats/week-profile",
            "/api/v1/weather",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }
}
