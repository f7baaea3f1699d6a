//! Turns a [`WeatherReport`] into the body of the daily email. No I/O happens here.

use htmlescape::encode_minimal;

use crate::domain::weather_report::WeatherReport;

const TITLE: &str = "Daily Weather Update";

#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub title: String,
    pub location: String,
    pub current: DigestBlock,
    /// One block per forecast day, in provider order
    pub forecast: Vec<DigestBlock>,
}

/// A heading, an icon and a few `label: value` lines.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestBlock {
    pub heading: String,
    pub icon_url: String,
    pub caption: Option<String>,
    pub lines: Vec<String>,
}

pub fn render(report: &WeatherReport) -> Digest {
    let current = DigestBlock {
        heading: format!("Date: {}", report.local_time),
        icon_url: report.current.icon_url.clone(),
        caption: Some(report.current.condition.clone()),
        lines: vec![
            format!("Temperature: {:.1}°C", report.current.temperature_c),
            format!("Wind Speed: {:.1} kph", report.current.wind_kph),
            format!("Humidity: {:.0}%", report.current.humidity),
        ],
    };

    let forecast = report
        .forecast
        .iter()
        .map(|day| DigestBlock {
            heading: day.date.format("%Y-%m-%d").to_string(),
            icon_url: day.icon_url.clone(),
            caption: Some(day.condition.clone()),
            lines: vec![
                format!("Temperature: {:.1}°C", day.avg_temperature_c),
                format!("Wind Speed: {:.1} kph", day.max_wind_kph),
                format!("Humidity: {:.0}%", day.avg_humidity),
            ],
        })
        .collect();

    Digest {
        title: TITLE.to_string(),
        location: report.location.clone(),
        current,
        forecast,
    }
}

impl Digest {
    pub fn html(&self) -> String {
        let mut html = String::from(
            r#"<style>
    body { font-family: Arial, sans-serif; }
    h1 { color: #333; }
    h2 { color: #666; }
    p { color: #999; }
    img { width: 50px; height: 50px; }
</style>
"#,
        );

        html.push_str(&format!("<h1>{}</h1>\n", encode_minimal(&self.title)));
        html.push_str(&format!("<h2>{}</h2>\n", encode_minimal(&self.location)));
        html.push_str(&format!("<p>{}</p>\n", encode_minimal(&self.current.heading)));
        push_block_body(&mut html, &self.current);
        html.push_str("<h2>Forecast</h2>\n");
        for block in &self.forecast {
            html.push_str(&format!("<h3>{}</h3>\n", encode_minimal(&block.heading)));
            push_block_body(&mut html, block);
        }

        html
    }

    pub fn plain_text(&self) -> String {
        let mut text = format!("{}\n{}\n{}\n", self.title, self.location, self.current.heading);

        push_block_text(&mut text, &self.current);
        text.push_str("\nForecast\n");
        for block in &self.forecast {
            text.push_str(&format!("\n{}\n", block.heading));
            push_block_text(&mut text, block);
        }

        text
    }
}

fn push_block_body(html: &mut String, block: &DigestBlock) {
    html.push_str(&format!(
        "<img src=\"{}\" alt=\"Weather icon\" />\n",
        encode_minimal(&block.icon_url)
    ));
    if let Some(caption) = &block.caption {
        html.push_str(&format!("<p>{}</p>\n", encode_minimal(caption)));
    }
    for line in &block.lines {
        html.push_str(&format!("<p>{}</p>\n", encode_minimal(line)));
    }
}

fn push_block_text(text: &mut String, block: &DigestBlock) {
    if let Some(caption) = &block.caption {
        text.push_str(&format!("{}\n", caption));
    }
    for line in &block.lines {
        text.push_str(&format!("{}\n", line));
    }
}
