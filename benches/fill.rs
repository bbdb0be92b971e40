use criterion::{black_box, criterion_group, criterion_main, Criterion};
use raster_painter::{Canvas, Painter, RasterConfig, Rgba8};
use std::f64::consts::PI;

fn curved_path(p: &mut Painter<Canvas>) {
    p.move_to(10.0, 10.0);
    p.cubic_to(20.0, 30.0, 120.0, 250.0, 200.0, 150.0);
    p.conic_to(240.0, 40.0, 60.0, 20.0);
    p.close_path();
}

fn bench_fills(c: &mut Criterion) {
    let mut p = Painter::new(Canvas::new(256, 256));
    p.set_brush(Rgba8::new(200, 50, 127, 150));

    c.bench_function("fill_curved_path", |b| {
        b.iter(|| {
            curved_path(&mut p);
            p.fill();
        })
    });

    c.bench_function("fill_circle", |b| {
        b.iter(|| {
            p.arc(128.0, 128.0, black_box(100.0), 0.0, 2.0 * PI);
            p.fill();
        })
    });

    c.bench_function("fill_integer_rect", |b| {
        b.iter(|| {
            p.rectangle(8.0, 8.0, black_box(248.0), 248.0);
            p.fill();
        })
    });

    let config = RasterConfig::default().with_orthogonal_pass(false);
    let mut single = match Painter::with_config(Canvas::new(256, 256), config) {
        Ok(p) => p,
        Err(e) => panic!("bench config rejected: {}", e),
    };
    c.bench_function("fill_curved_path_single_pass", |b| {
        b.iter(|| {
            curved_path(&mut single);
            single.fill();
        })
    });
}

fn bench_stroke(c: &mut Criterion) {
    let mut p = Painter::new(Canvas::new(256, 256));
    c.bench_function("stroke_curved_path", |b| {
        b.iter(|| {
            curved_path(&mut p);
            p.stroke();
        })
    });
}

criterion_group!(benches, bench_fills, bench_stroke);
criterion_main!(benches);
