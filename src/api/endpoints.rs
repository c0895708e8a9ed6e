/// WeatherFlow Tempest REST API
pub const TEMPEST_API: &str = "https://swd.weatherflow.com/swd/rest";
/// National Weather Service API
pub const NWS_API: &str = "https://api.weather.gov";
/// Google generative language API
pub const GEMINI_API: &str = "https://generativelanguage.googleapis.com";

// Tempest
pub const STATIONS: &str = "/stations";
pub const BETTER_FORECAST: &str = "/better_forecast";

// NWS
pub const ALERTS_ACTIVE: &str = "/alerts/active";

// Gemini
pub const GENERATE_CONTENT: &str = "/v1beta/models";

/// Unit selectors sent with every forecast request (imperial throughout)
pub const IMPERIAL_UNITS: &[(&str, &str)] = &[
    ("units_temp", "f"),
    ("units_wind", "mph"),
    ("units_pressure", "inhg"),
    ("units_precip", "in"),
    ("units_distance", "mi"),
];
