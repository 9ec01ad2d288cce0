use chrono::{DateTime, Duration, Utc};
use minifb::{Key, Window, WindowOptions};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::models::PriceSeries;
use crate::services::histogram::{Histogram, RETURN_BINS};
use crate::utils::errors::DashboardError;
use crate::utils::text::capitalize;

/// Figure size in pixels (10 x 8 inches at 100 dpi)
pub const FIGURE_WIDTH: u32 = 1000;
pub const FIGURE_HEIGHT: u32 = 800;

const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const BAR_ALPHA: f64 = 0.75;
const GRID_ALPHA: f64 = 0.15;
const CAPTION_FONT: (&str, f64) = ("sans-serif", 22.0);

/// Draw the two-panel dashboard and show it until the window is closed
///
/// The caller must not pass an empty series.
pub fn render_dashboard(series: &PriceSeries, coin_id: &str) -> Result<(), DashboardError> {
    let frame = render_frame(series, coin_id, FIGURE_WIDTH, FIGURE_HEIGHT)?;
    debug!("Rendered {}x{} frame", FIGURE_WIDTH, FIGURE_HEIGHT);

    let title = format!("{} dashboard", capitalize(coin_id));
    show_window(&frame, &title, FIGURE_WIDTH, FIGURE_HEIGHT)
}

/// Render the dashboard into an RGB byte buffer
pub fn render_frame(
    series: &PriceSeries,
    coin_id: &str,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, DashboardError> {
    let mut buffer = vec![0u8; width as usize * height as usize * 3];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_dashboard(&root, series, coin_id)?;
        root.present()
            .map_err(|e| drawing_error("present frame", e))?;
    }

    Ok(buffer)
}

/// Price trend on top, return distribution below
pub fn draw_dashboard<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &PriceSeries,
    coin_id: &str,
) -> Result<(), DashboardError> {
    root.fill(&WHITE)
        .map_err(|e| drawing_error("fill canvas", e))?;

    let panels = root.split_evenly((2, 1));
    draw_price_panel(&panels[0], series, coin_id)?;
    draw_return_panel(&panels[1], series)?;

    Ok(())
}

fn draw_price_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    series: &PriceSeries,
    coin_id: &str,
) -> Result<(), DashboardError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first.timestamp, last.timestamp),
        _ => return Err(DashboardError::Render("price series is empty".to_string())),
    };
    let (min_price, max_price) = series
        .price_bounds()
        .ok_or_else(|| DashboardError::Render("price series is empty".to_string()))?;

    let (x_min, x_max) = time_axis_range(first, last);
    let (y_min, y_max) = price_axis_range(min_price, max_price);
    let label_format = date_label_format(x_min, x_max);

    let mut chart = ChartBuilder::on(area)
        .caption(price_title(coin_id), CAPTION_FONT.into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| drawing_error("build price chart", e))?;

    chart
        .configure_mesh()
        .y_desc("Price (USD)")
        .x_labels(8)
        .x_label_formatter(&|ts: &DateTime<Utc>| ts.format(label_format).to_string())
        .y_label_formatter(&|price: &f64| format!("{:.2}", price))
        .bold_line_style(BLACK.mix(GRID_ALPHA).stroke_width(1))
        .light_line_style(WHITE.mix(0.0))
        .draw()
        .map_err(|e| drawing_error("draw price mesh", e))?;

    chart
        .draw_series(LineSeries::new(
            series.points().iter().map(|p| (p.timestamp, p.price)),
            LINE_COLOR.stroke_width(2),
        ))
        .map_err(|e| drawing_error("draw price line", e))?;

    Ok(())
}

fn draw_return_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    series: &PriceSeries,
) -> Result<(), DashboardError> {
    let histogram = Histogram::from_values(&series.returns(), RETURN_BINS);
    let (x_min, x_max) = histogram.range();
    let y_max = frequency_axis_max(histogram.max_count());

    let mut chart = ChartBuilder::on(area)
        .caption("Distribution of daily returns (%)", CAPTION_FONT.into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0u32..y_max)
        .map_err(|e| drawing_error("build histogram", e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Daily % change")
        .y_desc("Frequency")
        .x_label_formatter(&|pct: &f64| format!("{:.1}", pct))
        .bold_line_style(BLACK.mix(GRID_ALPHA).stroke_width(1))
        .light_line_style(WHITE.mix(0.0))
        .draw()
        .map_err(|e| drawing_error("draw histogram mesh", e))?;

    chart
        .draw_series(histogram.bars().map(|(left, right, count)| {
            Rectangle::new([(left, 0), (right, count)], LINE_COLOR.mix(BAR_ALPHA).filled())
        }))
        .map_err(|e| drawing_error("draw histogram bars", e))?;

    // Outline
    chart
        .draw_series(histogram.bars().map(|(left, right, count)| {
            Rectangle::new([(left, 0), (right, count)], BLACK.stroke_width(1))
        }))
        .map_err(|e| drawing_error("draw histogram outlines", e))?;

    Ok(())
}

/// Open a native window on `frame` and block until it is closed or Escape is pressed
fn show_window(frame: &[u8], title: &str, width: u32, height: u32) -> Result<(), DashboardError> {
    let pixels = rgb_to_argb(frame);
    let (width, height) = (width as usize, height as usize);

    let mut window = Window::new(title, width, height, WindowOptions::default())
        .map_err(|e| DashboardError::Display(format!("Failed to open window: {}", e)))?;
    window.set_target_fps(30);

    info!("Showing dashboard; close the window or press Esc to exit");

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&pixels, width, height)
            .map_err(|e| DashboardError::Display(format!("Failed to update window: {}", e)))?;
    }

    Ok(())
}

fn drawing_error(action: &str, e: impl std::fmt::Display) -> DashboardError {
    DashboardError::Render(format!("Failed to {}: {}", action, e))
}

/// "<Coin> price (USD)"
pub fn price_title(coin_id: &str) -> String {
    format!("{} price (USD)", capitalize(coin_id))
}

/// Pack RGB triples into the 0RGB words the window expects
pub fn rgb_to_argb(frame: &[u8]) -> Vec<u32> {
    frame
        .chunks_exact(3)
        .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32)
        .collect()
}

/// Price axis bounds with 10% padding, never below zero
pub fn price_axis_range(min_price: f64, max_price: f64) -> (f64, f64) {
    // Flat series still get a visible band
    let price_range = (max_price - min_price)
        .max(max_price.abs() * 0.01)
        .max(1e-8);
    let padding = price_range * 0.1;
    ((min_price - padding).max(0.0), max_price + padding)
}

/// Time axis bounds; a single sample gets a one-day window around it
pub fn time_axis_range(first: DateTime<Utc>, last: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    if first < last {
        (first, last)
    } else {
        (first - Duration::hours(12), first + Duration::hours(12))
    }
}

/// Date label format picked from the visible time span
pub fn date_label_format(start: DateTime<Utc>, end: DateTime<Utc>) -> &'static str {
    let span = end - start;
    if span <= Duration::days(2) {
        "%b %d %H:%M"
    } else if span <= Duration::days(180) {
        "%b %d"
    } else {
        "%Y-%m-%d"
    }
}

/// Frequency axis top with a little headroom above the tallest bar
pub fn frequency_axis_max(max_count: u32) -> u32 {
    (max_count as f64 * 1.05).ceil().max(1.0) as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::TimeZone;

    /// `days` daily rows with a wobbling price starting from 100
    fn sample_series(days: usize) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2023, 11, 14, 0, 0, 0).unwrap();
        let mut previous = 100.0;
        let points = (0..days)
            .map(|i| {
                let price = previous * (1.0 + ((i % 7) as f64 - 3.0) / 100.0);
                let point = PricePoint {
                    timestamp: start + Duration::days(i as i64 + 1),
                    price,
                    pct_return: (price - previous) / previous * 100.0,
                };
                previous = price;
                point
            })
            .collect();
        PriceSeries::new(points)
    }

    #[test]
    fn test_price_title_capitalizes_coin() {
        assert_eq!(price_title("bitcoin"), "Bitcoin price (USD)");
        assert_eq!(price_title("ethereum"), "Ethereum price (USD)");
    }

    #[test]
    fn test_price_axis_range_pads_and_clamps() {
        let (lo, hi) = price_axis_range(100.0, 200.0);
        assert!((lo - 90.0).abs() < 1e-9);
        assert!((hi - 210.0).abs() < 1e-9);

        let (lo, _) = price_axis_range(0.5, 100.0);
        assert_eq!(lo, 0.0);

        let (lo, hi) = price_axis_range(42.0, 42.0);
        assert!(lo < 42.0 && hi > 42.0);
    }

    #[test]
    fn test_time_axis_range_single_sample() {
        let ts = Utc.with_ymd_and_hms(2023, 11, 15, 0, 0, 0).unwrap();
        let (lo, hi) = time_axis_range(ts, ts);
        assert_eq!(hi - lo, Duration::days(1));

        let later = ts + Duration::days(3);
        assert_eq!(time_axis_range(ts, later), (ts, later));
    }

    #[test]
    fn test_frequency_axis_has_headroom() {
        assert!(frequency_axis_max(0) >= 1);
        assert!(frequency_axis_max(10) > 10);
    }

    #[test]
    fn test_rgb_to_argb() {
        let frame = [255, 0, 0, 0, 128, 255];
        assert_eq!(rgb_to_argb(&frame), vec![0x00FF_0000, 0x0000_80FF]);
    }

    fn assert_frame_drawn(days: usize) {
        let frame = render_frame(&sample_series(days), "bitcoin", FIGURE_WIDTH, FIGURE_HEIGHT).unwrap();

        assert_eq!(frame.len(), (FIGURE_WIDTH * FIGURE_HEIGHT * 3) as usize);
        // Background is white, so any non-white pixel means something was drawn
        assert!(frame.chunks_exact(3).any(|px| px != [255, 255, 255]));
    }

    #[test]
    fn test_render_frame_single_row() {
        assert_frame_drawn(1);
    }

    #[test]
    fn test_render_frame_month_of_rows() {
        assert_frame_drawn(30);
    }

    #[test]
    fn test_render_frame_max_window() {
        assert_frame_drawn(89);
    }

    #[test]
    fn test_date_label_format_follows_span() {
        let start = Utc.with_ymd_and_hms(2023, 11, 14, 0, 0, 0).unwrap();
        assert_eq!(date_label_format(start, start + Duration::days(1)), "%b %d %H:%M");
        assert_eq!(date_label_format(start, start + Duration::days(30)), "%b %d");
        assert_eq!(date_label_format(start, start + Duration::days(365)), "%Y-%m-%d");
    }

    #[test]
    fn test_render_frame_rejects_empty_series() {
        let err = render_frame(&PriceSeries::default(), "bitcoin", 200, 160).unwrap_err();
        assert!(matches!(err, DashboardError::Render(_)));
    }
}
