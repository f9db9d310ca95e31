//! 가격 이력 선 그래프 (PNG).

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

pub const CHART_WIDTH: u32 = 640;
pub const CHART_HEIGHT: u32 = 320;
const MARGIN: u32 = 24;

const BACKGROUND: Rgb<u8> = Rgb([252, 248, 240]);
const GRID: Rgb<u8> = Rgb([225, 218, 205]);
const AXIS: Rgb<u8> = Rgb([120, 110, 95]);

/// 시리즈 색상 (티어 순서)
const PALETTE: [Rgb<u8>; 3] = [
    Rgb([240, 170, 40]),
    Rgb([220, 90, 50]),
    Rgb([130, 60, 160]),
];

/// 시리즈별 가격 이력을 PNG로 렌더링
///
/// 모든 시리즈는 같은 세로 축(전체 최소~최대)을 공유한다. 점이 하나 이하인 시리즈는 건너뛴다.
pub fn render_price_chart(series: &[Vec<f64>]) -> Result<Vec<u8>, image::ImageError> {
    let mut img = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);
    draw_frame(&mut img);

    let (min, max) = value_range(series);
    let span = (max - min).max(f64::EPSILON);
    let plot_w = f64::from(CHART_WIDTH - 2 * MARGIN);
    let plot_h = f64::from(CHART_HEIGHT - 2 * MARGIN);

    for (index, values) in series.iter().enumerate() {
        if values.len() < 2 {
            continue;
        }
        let color = PALETTE[index % PALETTE.len()];
        let step = plot_w / (values.len() - 1) as f64;
        let points: Vec<(i64, i64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let x = f64::from(MARGIN) + step * i as f64;
                let y = f64::from(MARGIN) + plot_h * (1.0 - (v - min) / span);
                (x.round() as i64, y.round() as i64)
            })
            .collect();
        for pair in points.windows(2) {
            draw_line(&mut img, pair[0], pair[1], color);
            draw_line(&mut img, (pair[0].0, pair[0].1 + 1), (pair[1].0, pair[1].1 + 1), color);
        }
    }

    let mut output = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut output, ImageFormat::Png)?;
    Ok(output.into_inner())
}

fn value_range(series: &[Vec<f64>]) -> (f64, f64) {
    let mut values = series.iter().flatten().copied().filter(|v| v.is_finite());
    let Some(first) = values.next() else {
        return (0.0, 1.0);
    };
    values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn draw_frame(img: &mut RgbImage) {
    let left = MARGIN;
    let right = CHART_WIDTH - MARGIN;
    let top = MARGIN;
    let bottom = CHART_HEIGHT - MARGIN;

    for row in 1..4 {
        let y = top + (bottom - top) * row / 4;
        for x in left..=right {
            img.put_pixel(x, y, GRID);
        }
    }
    for x in left..=right {
        img.put_pixel(x, bottom, AXIS);
    }
    for y in top..=bottom {
        img.put_pixel(left, y, AXIS);
    }
}

/// Bresenham 직선. 이미지 밖 픽셀은 버린다.
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x >= 0 && y >= 0 && x < i64::from(img.width()) && y < i64::from(img.height()) {
            img.put_pixel(x as u32, y as u32, color);
        }
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
