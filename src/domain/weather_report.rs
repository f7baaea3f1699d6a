use chrono::NaiveDate;

/// Current conditions plus a daily forecast for one location, as reported by the weather provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    /// Local date and time at the location, as the provider formats it ("2024-06-05 10:30")
    pub local_time: String,
    pub current: CurrentConditions,
    /// Ordered as returned by the provider, starting with today
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub wind_kph: f64,
    pub humidity: f64,
    pub icon_url: String,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub icon_url: String,
    pub condition: String,
    pub avg_temperature_c: f64,
    pub max_wind_kph: f64,
    pub avg_humidity: f64,
}

/// The provider hands out protocol-relative icon links ("//cdn.weatherapi.com/...").
pub fn normalize_icon_url(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{}", icon)
    } else {
        icon.to_string()
    }
}
