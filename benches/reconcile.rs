//! Benchmarks for the canvas reconciliation engine.
//!
//! The interesting comparison is a cold frame (every node created) against a
//! warm frame (every node reused in place), which is the optimization the
//! engine exists for.

use boxel::prelude::*;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

fn draw_frame(canvas: &mut Canvas, count: usize) {
    for i in 0..count {
        let offset = (i % 10) as f64 * 10.0;
        canvas.rect(
            Rect::new(offset, (i / 10) as f64 * 10.0, 8.0, 8.0),
            &Fill::solid(Color::BLUE),
        );
    }
    canvas.text("frame label", None, Point::new(2.0, 2.0), &Fill::solid(Color::BLACK));
    canvas.line(Point::ORIGIN, Point::new(100.0, 100.0), &Stroke::new(Color::RED));
}

fn bench_cold_frame(c: &mut Criterion) {
    c.bench_function("cold_frame_100_rects", |b| {
        b.iter_batched(
            || Canvas::new(Size::new(100.0, 100.0)),
            |mut canvas| {
                canvas.clear();
                draw_frame(&mut canvas, 100);
                canvas.flush();
                canvas
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_warm_frame(c: &mut Criterion) {
    c.bench_function("warm_frame_100_rects", |b| {
        let mut canvas = Canvas::new(Size::new(100.0, 100.0));
        canvas.clear();
        draw_frame(&mut canvas, 100);
        canvas.flush();

        b.iter(|| {
            canvas.clear();
            draw_frame(&mut canvas, 100);
            canvas.flush();
        });
    });
}

fn bench_shrinking_frames(c: &mut Criterion) {
    c.bench_function("alternating_frame_sizes", |b| {
        let mut canvas = Canvas::new(Size::new(100.0, 100.0));
        let mut big = true;

        b.iter(|| {
            canvas.clear();
            draw_frame(&mut canvas, if big { 100 } else { 50 });
            canvas.flush();
            big = !big;
        });
    });
}

criterion_group!(
    benches,
    bench_cold_frame,
    bench_warm_frame,
    bench_shrinking_frames
);
criterion_main!(benches);
