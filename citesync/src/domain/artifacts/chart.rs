//! Citations-per-year bar chart
//!
//! Renders straight into an RGB buffer and encodes PNG. There is no font
//! dependency: year labels use a 3x5 digit bitmap scaled up. Output is a
//! pure function of the record's time series and the options, so the same
//! metrics always produce the same bytes.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

use super::error::ArtifactError;
use crate::core::constants::{MAX_CHART_SIDE, MIN_CHART_SIDE};
use crate::domain::metrics::MetricsRecord;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([68, 68, 68]);
const BAR: Rgb<u8> = Rgb([76, 114, 176]);
const LABEL: Rgb<u8> = Rgb([34, 34, 34]);

const MARGIN_LEFT: u32 = 24;
const MARGIN_RIGHT: u32 = 16;
const MARGIN_TOP: u32 = 16;
const LABEL_SCALE: u32 = 2;
const LABEL_GAP: u32 = 6;

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;

/// 3x5 glyph rows; bit 2 is the left column
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];
const MINUS_GLYPH: [u8; 5] = [0b000, 0b000, 0b111, 0b000, 0b000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl ChartOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn margin_bottom(&self) -> u32 {
        LABEL_GAP * 2 + GLYPH_HEIGHT * LABEL_SCALE
    }

    /// y of the x-axis line; bars stand on the row above it
    fn baseline(&self) -> u32 {
        self.height - self.margin_bottom()
    }

    fn plot_width(&self) -> u32 {
        self.width - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height(&self) -> u32 {
        self.baseline() - MARGIN_TOP
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Slot centre and bar rectangle for each point, scaled to the tallest bar
fn layout(points: &[(i32, u64)], options: &ChartOptions) -> Vec<(u32, Rect)> {
    let max = points.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let slot = f64::from(options.plot_width()) / points.len().max(1) as f64;
    let bar_width = ((slot * 0.7) as u32).max(1);
    let plot_height = f64::from(options.plot_height());

    points
        .iter()
        .enumerate()
        .map(|(i, (_, count))| {
            let center = MARGIN_LEFT + (slot * (i as f64 + 0.5)) as u32;
            let height = if max == 0 {
                0
            } else {
                (*count as f64 / max as f64 * plot_height).round() as u32
            };
            let rect = Rect {
                x: center.saturating_sub(bar_width / 2),
                y: options.baseline() - height,
                width: bar_width,
                height,
            };
            (center, rect)
        })
        .collect()
}

fn fill_rect(img: &mut RgbImage, rect: Rect, color: Rgb<u8>) {
    let x_end = (rect.x + rect.width).min(img.width());
    let y_end = (rect.y + rect.height).min(img.height());
    for y in rect.y..y_end {
        for x in rect.x..x_end {
            img.put_pixel(x, y, color);
        }
    }
}

fn glyph(ch: char) -> Option<[u8; 5]> {
    match ch {
        '-' => Some(MINUS_GLYPH),
        _ => ch.to_digit(10).map(|d| DIGIT_GLYPHS[d as usize]),
    }
}

fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    n * GLYPH_WIDTH * scale + (n - 1) * scale
}

fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, scale: u32, color: Rgb<u8>) {
    let advance = (GLYPH_WIDTH + 1) * scale;
    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else {
            continue;
        };
        let origin_x = x + i as u32 * advance;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    let rect = Rect {
                        x: origin_x + col * scale,
                        y: y + row as u32 * scale,
                        width: scale,
                        height: scale,
                    };
                    fill_rect(img, rect, color);
                }
            }
        }
    }
}

/// Render the record's time series as a PNG bar chart.
///
/// A placeholder or empty series renders as a single zero bar for the
/// placeholder year.
pub fn to_chart_image(
    record: &MetricsRecord,
    options: &ChartOptions,
) -> Result<Vec<u8>, ArtifactError> {
    let side_ok = |side: u32| (MIN_CHART_SIDE..=MAX_CHART_SIDE).contains(&side);
    if !side_ok(options.width) || !side_ok(options.height) {
        return Err(ArtifactError::InvalidChartSize {
            width: options.width,
            height: options.height,
            min: MIN_CHART_SIDE,
            max: MAX_CHART_SIDE,
        });
    }

    let points = record.time_series().points();
    let bars = layout(&points, options);

    let mut img = RgbImage::from_pixel(options.width, options.height, BACKGROUND);

    for (_, rect) in &bars {
        fill_rect(&mut img, *rect, BAR);
    }

    // Axes
    fill_rect(
        &mut img,
        Rect {
            x: MARGIN_LEFT - 1,
            y: MARGIN_TOP,
            width: 1,
            height: options.plot_height() + 1,
        },
        AXIS,
    );
    fill_rect(
        &mut img,
        Rect {
            x: MARGIN_LEFT - 1,
            y: options.baseline(),
            width: options.plot_width() + 1,
            height: 1,
        },
        AXIS,
    );

    // Year labels, thinned out when they would overlap
    let slot = f64::from(options.plot_width()) / points.len().max(1) as f64;
    let widest = points
        .iter()
        .map(|(year, _)| text_width(&year.to_string(), LABEL_SCALE))
        .max()
        .unwrap_or(0);
    let stride = ((f64::from(widest + LABEL_SCALE * 2) / slot).ceil() as usize).max(1);
    let label_y = options.baseline() + LABEL_GAP;

    for (i, ((year, _), (center, _))) in points.iter().zip(&bars).enumerate() {
        if i % stride != 0 {
            continue;
        }
        let text = year.to_string();
        let x = center.saturating_sub(text_width(&text, LABEL_SCALE) / 2);
        draw_text(&mut img, x, label_y, &text, LABEL_SCALE, LABEL);
    }

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| ArtifactError::Encode(format!("PNG chart: {}", e)))?;

    tracing::trace!(
        bars = points.len(),
        label_stride = stride,
        bytes = buf.get_ref().len(),
        "Chart rendered"
    );

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, PLACEHOLDER_YEAR};
    use crate::domain::metrics::TimeSeries;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn record(series: TimeSeries) -> MetricsRecord {
        MetricsRecord::new(
            BTreeMap::new(),
            series,
            Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(),
        )
    }

    fn yearly(points: &[(i32, u64)]) -> TimeSeries {
        TimeSeries::Yearly(points.iter().copied().collect())
    }

    fn default_options() -> ChartOptions {
        ChartOptions::new(DEFAULT_CHART_WIDTH, DEFAULT_CHART_HEIGHT)
    }

    #[test]
    fn test_chart_dimensions_and_format() {
        let rec = record(yearly(&[(2019, 40), (2020, 55), (2021, 60)]));
        let png = to_chart_image(&rec, &default_options()).unwrap();

        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (DEFAULT_CHART_WIDTH, DEFAULT_CHART_HEIGHT));
    }

    #[test]
    fn test_chart_is_deterministic() {
        let rec = record(yearly(&[(2019, 40), (2020, 55), (2021, 60)]));
        let again = record(yearly(&[(2019, 40), (2020, 55), (2021, 60)]));
        let a = to_chart_image(&rec, &default_options()).unwrap();
        let b = to_chart_image(&again, &default_options()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bars_scale_to_tallest() {
        let options = default_options();
        let bars = layout(&[(2019, 30), (2020, 60), (2021, 0)], &options);

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[1].1.y, MARGIN_TOP);
        assert_eq!(bars[1].1.height, options.plot_height());
        assert_eq!(bars[0].1.height, (options.plot_height() as f64 / 2.0).round() as u32);
        assert_eq!(bars[2].1.height, 0);
        assert!(bars[0].0 < bars[1].0 && bars[1].0 < bars[2].0);
    }

    #[test]
    fn test_tallest_bar_pixels_are_drawn() {
        let rec = record(yearly(&[(2020, 10), (2021, 20)]));
        let options = default_options();
        let png = to_chart_image(&rec, &options).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();

        let (center, rect) = layout(&[(2020, 10), (2021, 20)], &options)[1];
        assert_eq!(*decoded.get_pixel(center, rect.y), BAR);
        assert_eq!(*decoded.get_pixel(center, MARGIN_TOP.saturating_sub(2)), BACKGROUND);
    }

    #[test]
    fn test_placeholder_renders_single_zero_bar() {
        let placeholder = to_chart_image(&record(TimeSeries::Placeholder), &default_options()).unwrap();
        let explicit = to_chart_image(
            &record(yearly(&[(PLACEHOLDER_YEAR, 0)])),
            &default_options(),
        )
        .unwrap();
        let empty = to_chart_image(&record(yearly(&[])), &default_options()).unwrap();

        assert_eq!(placeholder, explicit);
        assert_eq!(placeholder, empty);

        // The year label is drawn below the axis
        let decoded = image::load_from_memory(&placeholder).unwrap().to_rgb8();
        let options = default_options();
        let label_row_has_ink = (options.baseline() + LABEL_GAP
            ..options.baseline() + LABEL_GAP + GLYPH_HEIGHT * LABEL_SCALE)
            .any(|y| (0..options.width).any(|x| *decoded.get_pixel(x, y) == LABEL));
        assert!(label_row_has_ink);
    }

    #[test]
    fn test_chart_too_small() {
        let rec = record(TimeSeries::Placeholder);
        let err = to_chart_image(&rec, &ChartOptions::new(32, 480)).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidChartSize { width: 32, .. }));
    }

    #[test]
    fn test_chart_too_large_is_rejected_before_allocating() {
        let rec = record(TimeSeries::Placeholder);
        let err = to_chart_image(&rec, &ChartOptions::new(640, MAX_CHART_SIDE + 1)).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::InvalidChartSize { height, max, .. } if height == MAX_CHART_SIDE + 1 && max == MAX_CHART_SIDE
        ));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("2021", 1), 4 * 3 + 3);
        assert_eq!(text_width("2021", 2), 2 * (4 * 3 + 3));
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(glyph('0'), Some(DIGIT_GLYPHS[0]));
        assert_eq!(glyph('-'), Some(MINUS_GLYPH));
        assert_eq!(glyph('x'), None);
    }
}
