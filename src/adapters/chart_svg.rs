//! SVG line chart of month-end adjusted closes.

use crate::domain::monthly::MonthlyPoint;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const PADDING: f64 = 50.0;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn empty_chart(title: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
  <rect width="100%" height="100%" fill="white"/>
  <text x="{cx:.1}" y="{ty:.1}" text-anchor="middle" font-size="16">{title}</text>
  <text x="{cx:.1}" y="{cy:.1}" text-anchor="middle" font-size="14" fill="gray">No monthly data available.</text>
</svg>
"#,
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        cy = HEIGHT / 2.0,
        ty = PADDING / 2.0,
        title = escape(title),
    )
}

pub fn monthly_chart_svg(symbol: &str, monthly: &[MonthlyPoint]) -> String {
    let title = format!("{} Monthly Performance", symbol);
    let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
        return empty_chart(&title);
    };

    let min_price = monthly
        .iter()
        .map(|p| p.adjusted_close)
        .fold(f64::INFINITY, f64::min);
    let max_price = monthly
        .iter()
        .map(|p| p.adjusted_close)
        .fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max_price - min_price;
    let scale_y = if range > 0.0 {
        plot_height / range
    } else {
        0.0
    };
    let scale_x = if monthly.len() > 1 {
        plot_width / (monthly.len() - 1) as f64
    } else {
        0.0
    };
    // Flat series sit on the vertical midline.
    let offset_y = if range > 0.0 { 0.0 } else { plot_height / 2.0 };

    let points: Vec<String> = monthly
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let x = PADDING + i as f64 * scale_x;
            let y = HEIGHT - PADDING - offset_y - (point.adjusted_close - min_price) * scale_y;
            format!("{:.1},{:.1}", x, y)
        })
        .collect();

    let axis_bottom = HEIGHT - PADDING;
    let axis_right = WIDTH - PADDING;

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
  <rect width="100%" height="100%" fill="white"/>
  <text x="{cx:.1}" y="{ty:.1}" text-anchor="middle" font-size="16">{title}</text>
  <line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{ab:.0}" stroke="black"/>
  <line x1="{p:.0}" y1="{ab:.0}" x2="{ar:.0}" y2="{ab:.0}" stroke="black"/>
  <text x="{cx:.1}" y="{xl:.1}" text-anchor="middle" font-size="12">Date</text>
  <text x="12" y="{cy:.1}" text-anchor="middle" font-size="12" transform="rotate(-90 12 {cy:.1})">Price</text>
  <text x="{p:.0}" y="{dl:.1}" font-size="10">{first_label}</text>
  <text x="{ar:.0}" y="{dl:.1}" text-anchor="end" font-size="10">{last_label}</text>
  <text x="{yl:.1}" y="{p:.0}" text-anchor="end" font-size="10">{max:.2}</text>
  <text x="{yl:.1}" y="{ab:.0}" text-anchor="end" font-size="10">{min:.2}</text>
  <polyline fill="none" stroke="blue" stroke-width="1.5" points="{points}"/>
</svg>
"#,
        w = WIDTH,
        h = HEIGHT,
        p = PADDING,
        ab = axis_bottom,
        ar = axis_right,
        cx = WIDTH / 2.0,
        cy = HEIGHT / 2.0,
        ty = PADDING / 2.0,
        xl = HEIGHT - 8.0,
        dl = axis_bottom + 15.0,
        yl = PADDING - 4.0,
        max = max_price,
        min = min_price,
        title = escape(&title),
        first_label = escape(&first.formatted_label),
        last_label = escape(&last.formatted_label),
        points = points.join(" "),
    )
}
